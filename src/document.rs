use std::fs;
use std::path::{Path, PathBuf};

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthChar;

use crate::error::{AppError, Result};

pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Turns raw document text into styled terminal text.
pub trait Renderer {
    /// Render `raw`, hard-wrapping at `wrap_width` display columns (0 disables wrapping).
    fn render(&self, raw: &str, wrap_width: usize) -> Result<Text<'static>>;
}

/// Renders each raw line as one unstyled line.
#[cfg(test)]
pub struct PlainRenderer;

#[cfg(test)]
impl Renderer for PlainRenderer {
    fn render(&self, raw: &str, _wrap_width: usize) -> Result<Text<'static>> {
        Ok(Text::from(
            raw.lines()
                .map(|l| Line::from(l.to_string()))
                .collect::<Vec<_>>(),
        ))
    }
}

/// Markdown renderer backed by syntect highlighting.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
    tab_width: usize,
}

impl MarkdownRenderer {
    pub fn new(theme_name: &str, tab_width: usize) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: load_theme(Some(theme_name)),
            tab_width: tab_width.max(1),
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, raw: &str, wrap_width: usize) -> Result<Text<'static>> {
        let syntax = self
            .syntax_set
            .find_syntax_by_name("Markdown")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut lines: Vec<Line<'static>> = Vec::new();
        for raw_line in LinesWithEndings::from(raw) {
            let line = expand_tabs(raw_line, self.tab_width);
            let ranges = highlighter
                .highlight_line(&line, &self.syntax_set)
                .map_err(|e| AppError::Render(e.to_string()))?;

            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    if text.is_empty() {
                        return None;
                    }
                    Some(Span::styled(text.to_string(), convert_style(style)))
                })
                .collect();
            lines.extend(wrap_spans(spans, wrap_width));
        }
        Ok(Text::from(lines))
    }
}

/// Load a theme from the built-in theme set by name, with fallback.
pub fn load_theme(theme_name: Option<&str>) -> Theme {
    let mut ts = ThemeSet::load_defaults();
    let name = theme_name.unwrap_or(DEFAULT_SYNTAX_THEME);
    match ts.themes.remove(name) {
        Some(theme) => theme,
        None => ts
            .themes
            .remove(DEFAULT_SYNTAX_THEME)
            .unwrap_or_default(),
    }
}

fn convert_style(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

/// Replace tabs with spaces up to the next tab stop.
pub fn expand_tabs(line: &str, tab_width: usize) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + tab_width);
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = tab_width - column % tab_width;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(ch);
            column += ch.width().unwrap_or(0);
        }
    }
    out
}

/// Split one logical line of spans into display rows of at most `width` columns.
fn wrap_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![Line::from(spans)];
    }

    let mut rows = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    for span in spans {
        let mut chunk = String::new();
        for ch in span.content.chars() {
            let w = ch.width().unwrap_or(0);
            if used > 0 && used + w > width {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            chunk.push(ch);
            used += w;
        }
        if !chunk.is_empty() {
            current.push(Span::styled(chunk, span.style));
        }
    }
    rows.push(Line::from(current));
    rows
}

/// Flatten rendered text to plain lines joined by `\n`, without styling.
pub fn plain_text(text: &Text<'_>) -> String {
    let joined = text
        .lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n");
    strip_ansi(&joined)
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            result.push(c);
            continue;
        }
        while let Some(&next) = chars.peek() {
            chars.next();
            if next.is_ascii_alphabetic() {
                break;
            }
        }
    }
    result
}

/// Absolute path of a root-relative, slash-separated document path.
pub fn document_path(root: &Path, rel_path: &str) -> PathBuf {
    rel_path
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Read a document as text, replacing invalid UTF-8.
pub fn read_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read the document at `rel_path` under `root`, returning its absolute path too.
pub fn read_document(root: &Path, rel_path: &str) -> Result<(PathBuf, String)> {
    let path = document_path(root, rel_path);
    let content = read_file(&path)?;
    Ok((path, content))
}

/// Header text for a document: `root/rel`, or `root/` for the root itself.
pub fn compose_display_path(root: &str, rel: &str) -> String {
    match (root.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (false, true) => format!("{}/", root),
        (false, false) => format!("{}/{}", root.trim_end_matches('/'), rel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new(DEFAULT_SYNTAX_THEME, 4)
    }

    #[test]
    fn render_keeps_line_structure() {
        let text = renderer().render("# Title\n\nbody text\n", 0).unwrap();
        assert_eq!(plain_text(&text), "# Title\n\nbody text");
    }

    #[test]
    fn render_empty_document() {
        let text = renderer().render("", 80).unwrap();
        assert_eq!(plain_text(&text), "");
    }

    #[test]
    fn render_wraps_at_width() {
        let text = renderer().render("abcdefghij\n", 4).unwrap();
        assert_eq!(plain_text(&text), "abcd\nefgh\nij");
    }

    #[test]
    fn render_wraps_by_display_width() {
        let text = renderer().render("日本語テキスト\n", 6).unwrap();
        assert_eq!(plain_text(&text), "日本語\nテキス\nト");
    }

    #[test]
    fn render_expands_tabs() {
        let text = renderer().render("a\tb\n", 0).unwrap();
        assert_eq!(plain_text(&text), "a   b");
    }

    #[test]
    fn render_applies_theme_colors() {
        let text = renderer().render("# Title\n", 0).unwrap();
        let span = &text.lines[0].spans[0];
        assert!(matches!(span.style.fg, Some(Color::Rgb(..))));
    }

    #[test]
    fn expand_tabs_aligns_to_stops() {
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("ab\tx", 4), "ab  x");
        assert_eq!(expand_tabs("abcd\tx", 4), "abcd    x");
        assert_eq!(expand_tabs("no tabs", 4), "no tabs");
    }

    #[test]
    fn load_theme_invalid_falls_back() {
        let fallback = load_theme(Some("nonexistent-theme"));
        let default = load_theme(None);
        assert_eq!(fallback.name, default.name);
    }

    #[test]
    fn strip_ansi_removes_codes() {
        assert_eq!(strip_ansi("hello"), "hello");
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(strip_ansi("\x1b[1;32mbold green\x1b[0m"), "bold green");
    }

    #[test]
    fn plain_text_strips_escape_sequences() {
        let text = Text::from(vec![
            Line::from(vec![Span::raw("\x1b[1mHello"), Span::raw(" world\x1b[0m")]),
            Line::from("again"),
        ]);
        assert_eq!(plain_text(&text), "Hello world\nagain");
    }

    #[test]
    fn read_document_is_lossy() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("guides")).unwrap();
        let mut f = File::create(dir.path().join("guides/a.md")).unwrap();
        f.write_all(b"ok \xff end").unwrap();

        let (path, content) = read_document(dir.path(), "guides/a.md").unwrap();
        assert_eq!(path, dir.path().join("guides").join("a.md"));
        assert_eq!(content, "ok \u{fffd} end");
    }

    #[test]
    fn read_document_missing_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_document(dir.path(), "gone.md"),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn compose_display_path_shapes() {
        assert_eq!(compose_display_path("docs", "a/b.md"), "docs/a/b.md");
        assert_eq!(compose_display_path("docs", ""), "docs/");
        assert_eq!(compose_display_path("", "a.md"), "a.md");
    }
}
