//! rlpager - Streaming Terminal Pager
//!
//! Views a file, or whatever is piped into stdin, while it is still growing.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use rlpager::ingest::{self, LineSource};
use rlpager::store::LineStore;
use rlpager::{Application, SearchOptions};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("rlpager")
        .version(rlpager::VERSION)
        .about("A streaming terminal pager with incremental search")
        .long_about(
            "rlpager pages files and piped command output. Content is ingested \
             in the background, so navigation and search are available while \
             the input is still arriving.",
        )
        .arg(
            Arg::new("file")
                .help("Path to the file to view; reads stdin when omitted")
                .index(1),
        )
        .arg(
            Arg::new("chop-long-lines")
                .short('S')
                .long("chop-long-lines")
                .help("Truncate long lines instead of wrapping them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore-case")
                .short('i')
                .long("ignore-case")
                .help("Case-insensitive search patterns")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let chop = matches.get_flag("chop-long-lines");
    let options = SearchOptions {
        case_insensitive: matches.get_flag("ignore-case"),
    };

    let (source, title): (Box<dyn LineSource>, String) =
        match matches.get_one::<String>("file") {
            Some(file) => {
                let path = PathBuf::from(file);
                if !path.is_file() {
                    anyhow::bail!("not a readable file: {}", path.display());
                }
                let title = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                (Box::new(ingest::open_path(&path).await?), title)
            }
            None => {
                if std::io::stdin().is_terminal() {
                    anyhow::bail!("missing filename and stdin is a terminal (try --help)");
                }
                (Box::new(ingest::from_stdin()), "(stdin)".to_string())
            }
        };

    let store = Arc::new(LineStore::new());
    let ingestion = tokio::spawn(ingest::ingest(source, Arc::clone(&store)));

    let app = Application::new(store, title, !chop, options)?;
    app.run().await?;

    ingestion.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn version_constant_is_set() {
        assert!(!rlpager::VERSION.is_empty());
    }
}
