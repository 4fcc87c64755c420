use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::Status;
use crate::theme::ThemeColors;

const KEY_HINTS: &str = " /:search  t:tree  ?:help ";

/// Keep the last columns of `s` that fit in `width`, marking the cut with `...`.
fn truncate_left(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    let budget = width - 3;
    let mut used = 0;
    let mut tail: Vec<char> = Vec::new();
    for c in s.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        tail.push(c);
    }
    let tail: String = tail.into_iter().rev().collect();
    format!("...{}", tail)
}

/// Bottom bar: header path plus search state, or the current status message,
/// or the search prompt while a query is being typed.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    theme: &'a ThemeColors,
    status: Option<&'a Status>,
    search_status: Option<&'a str>,
    prompt: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            theme,
            status: None,
            search_status: None,
            prompt: None,
        }
    }

    pub fn status(mut self, status: Option<&'a Status>) -> Self {
        self.status = status;
        self
    }

    pub fn search_status(mut self, text: &'a str) -> Self {
        if !text.is_empty() {
            self.search_status = Some(text);
        }
        self
    }

    pub fn prompt(mut self, input: Option<&'a str>) -> Self {
        self.prompt = input;
        self
    }

    fn fill_line(&self, text: &str, style: Style, width: usize) -> Line<'static> {
        let shown = truncate_left(text, width);
        let pad = width.saturating_sub(shown.width());
        Line::from(Span::styled(format!("{}{}", shown, " ".repeat(pad)), style))
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        let base = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);

        if let Some(input) = self.prompt {
            let line = self.fill_line(&format!("/{}", input), base, width);
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        if let Some(status) = self.status {
            let (text, style) = match status {
                Status::Error(msg) => (
                    format!(" {}", msg),
                    Style::default()
                        .bg(self.theme.error_fg)
                        .fg(self.theme.status_fg),
                ),
                Status::Info(msg) => (format!(" {}", msg), base.fg(self.theme.info_fg)),
            };
            let line = self.fill_line(&text, style, width);
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        // Normal bar: [path] ... [search status] [key hints]
        let right = match self.search_status {
            Some(search) => format!(" {} ", search),
            None => KEY_HINTS.to_string(),
        };
        let right_style = if self.search_status.is_some() {
            base.fg(self.theme.accent_fg).add_modifier(Modifier::BOLD)
        } else {
            base.fg(self.theme.dim_fg)
        };

        let right_width = right.width().min(width);
        let path_budget = width.saturating_sub(right_width).saturating_sub(1);
        let path_display = format!(" {}", truncate_left(self.path_str, path_budget));
        let gap = width
            .saturating_sub(path_display.width())
            .saturating_sub(right_width);

        let line = Line::from(vec![
            Span::styled(path_display, base),
            Span::styled(" ".repeat(gap), base),
            Span::styled(right, right_style),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
