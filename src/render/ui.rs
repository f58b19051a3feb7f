//! Terminal rendering with ratatui.
//!
//! The UI is a thin projection of pager state: the visible rows with match
//! highlights, and a one-row status line whose contents follow the pager
//! mode. All composition is done in plain helpers so it stays testable
//! without a terminal.

use crate::error::{PagerError, Result};
use crate::pager::{Pager, PagerMode};
use crate::search::HitPosition;
use crate::store::LineIndex;
use crate::viewport::RowPos;
use ratatui::crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Styles for highlights and the status line.
#[derive(Debug, Clone, Copy)]
pub struct ColorTheme {
    pub search_match: Style,
    pub current_match: Style,
    pub status: Style,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            search_match: Style::default().bg(Color::Yellow).fg(Color::Black),
            current_match: Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::REVERSED),
            status: Style::default().bg(Color::Blue).fg(Color::White),
        }
    }
}

pub struct TerminalUi {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
    title: String,
}

impl TerminalUi {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            terminal: None,
            theme: ColorTheme::default(),
            title: title.into(),
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()
            .map_err(|err| PagerError::terminal(format!("enable raw mode: {err}")))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .map_err(|err| PagerError::terminal(format!("enter alternate screen: {err}")))?;
        self.terminal = Some(Terminal::new(CrosstermBackend::new(stdout))?);
        Ok(())
    }

    pub fn cleanup(&mut self) -> Result<()> {
        if self.terminal.take().is_some() {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
        }
        Ok(())
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        Ok(ratatui::crossterm::terminal::size()?)
    }

    pub fn render(&mut self, pager: &Pager) -> Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };

        let rows = pager.visible_rows()?;
        let content: Vec<Line> = rows
            .iter()
            .map(|(pos, text)| highlighted_row(pager, &self.theme, *pos, text))
            .collect();
        let status = status_text(pager, &self.title)?;
        let status_style = self.theme.status;

        terminal.draw(move |frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(frame.size());

            frame.render_widget(Paragraph::new(content), chunks[0]);
            frame.render_widget(Paragraph::new(status).style(status_style), chunks[1]);
        })?;
        Ok(())
    }
}

impl Drop for TerminalUi {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// One display row with match highlights applied. The current hit is styled
/// distinctly from other matches on screen.
fn highlighted_row<'a>(
    pager: &Pager,
    theme: &ColorTheme,
    pos: RowPos,
    text: &'a str,
) -> Line<'a> {
    let Some(pattern) = pager.search_pattern() else {
        return Line::from(text);
    };
    let matches = pattern.row_matches(text);
    if matches.is_empty() {
        return Line::from(text);
    }

    let current = pager.current_hit();
    let mut spans = Vec::new();
    let mut last_end = 0;
    for (start, end) in matches {
        if start > last_end {
            spans.push(Span::raw(&text[last_end..start]));
        }
        if end > start && end <= text.len() {
            let is_current =
                current == Some(HitPosition::new(LineIndex::new(pos.line), pos.sub_row, start));
            let style = if is_current {
                theme.current_match
            } else {
                theme.search_match
            };
            spans.push(Span::styled(&text[start..end], style));
        }
        last_end = end;
    }
    if last_end < text.len() {
        spans.push(Span::raw(&text[last_end..]));
    }
    Line::from(spans)
}

/// Status line contents for the current mode.
fn status_text(pager: &Pager, title: &str) -> Result<String> {
    if let Some(message) = pager.message() {
        return Ok(message.to_string());
    }
    match pager.mode() {
        PagerMode::Searching { direction } => {
            Ok(format!("{}{}", direction.to_char(), pager.pattern_text()))
        }
        PagerMode::GotoLine { buffer } => Ok(format!(":{buffer}")),
        PagerMode::NotFound => Ok("Pattern not found".to_string()),
        PagerMode::Viewing => {
            let store = pager.store();
            let length = store.len();
            let streaming = if store.is_complete() { "" } else { " (streaming)" };
            let percent = pager
                .progress_percent()?
                .map(|p| format!(" {p}%"))
                .unwrap_or_default();
            Ok(format!("{title} | {length} lines{streaming}{percent}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchDirection;
    use crate::store::LineStore;
    use crate::viewport::Viewport;
    use std::sync::Arc;

    fn pager(text: &str) -> Pager {
        let store = Arc::new(LineStore::from_text(text));
        Pager::new(store, Viewport::new(80, 3, true))
    }

    #[test]
    fn status_shows_prompt_while_searching() {
        let mut p = pager("a\nb\n");
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("ab").unwrap();
        assert_eq!(status_text(&p, "demo").unwrap(), "/ab");

        p.cancel_search();
        p.start_search(SearchDirection::Backward);
        assert_eq!(status_text(&p, "demo").unwrap(), "?");
    }

    #[test]
    fn status_shows_not_found() {
        let mut p = pager("a\nb\n");
        p.set_search_pattern("zzz", SearchDirection::Forward).unwrap();
        p.scroll_to_next_search_hit().unwrap();
        assert_eq!(status_text(&p, "demo").unwrap(), "Pattern not found");
    }

    #[test]
    fn status_shows_position_while_viewing() {
        let p = pager("a\nb\n");
        assert_eq!(status_text(&p, "demo").unwrap(), "demo | 2 lines 100%");
    }

    #[test]
    fn status_flags_a_growing_stream() {
        let store = Arc::new(LineStore::new());
        store.append("a");
        let p = Pager::new(store, Viewport::new(80, 3, true));
        assert!(status_text(&p, "demo").unwrap().contains("(streaming)"));
    }

    #[test]
    fn status_shows_goto_buffer() {
        let mut p = pager("a\nb\n");
        p.start_goto_line();
        p.update_goto_buffer("12".to_string());
        assert_eq!(status_text(&p, "demo").unwrap(), ":12");
    }

    #[test]
    fn compile_errors_take_over_the_status_line() {
        let mut p = pager("a\nb\n");
        p.start_search(SearchDirection::Forward);
        p.type_search_pattern("(").unwrap();
        assert!(status_text(&p, "demo").unwrap().contains("("));
        assert_ne!(status_text(&p, "demo").unwrap(), "/(");
    }

    #[test]
    fn highlight_spans_split_the_row() {
        let mut p = pager("xx hit yy hit\n");
        p.set_search_pattern("hit", SearchDirection::Forward).unwrap();
        let theme = ColorTheme::default();
        let line = highlighted_row(&p, &theme, RowPos::new(0, 0), "xx hit yy hit");
        assert_eq!(line.spans.len(), 4);
        assert_eq!(line.spans[1].content, "hit");
        assert_eq!(line.spans[3].content, "hit");
    }

    #[test]
    fn current_hit_is_styled_distinctly() {
        let mut p = pager("hit hit\n");
        p.set_search_pattern("hit", SearchDirection::Forward).unwrap();
        p.apply_scan_result(
            crate::pager::ScanKind::Next,
            Some(HitPosition::new(crate::store::LineIndex::new(0), 0, 4)),
        )
        .unwrap();

        let theme = ColorTheme::default();
        let line = highlighted_row(&p, &theme, RowPos::new(0, 0), "hit hit");
        let styled: Vec<_> = line
            .spans
            .iter()
            .filter(|s| s.content == "hit")
            .map(|s| s.style)
            .collect();
        assert_eq!(styled.len(), 2);
        assert_eq!(styled[0], theme.search_match);
        assert_eq!(styled[1], theme.current_match);
    }
}
