use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::theme::ThemeColors;

/// A single keybinding entry for display.
struct KeyEntry {
    key: &'static str,
    description: &'static str,
}

/// A category of keybindings.
struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const TREE_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "j / ↓",
        description: "Move down",
    },
    KeyEntry {
        key: "k / ↑",
        description: "Move up",
    },
    KeyEntry {
        key: "l / → / Enter",
        description: "Expand directory or open document",
    },
    KeyEntry {
        key: "h / ←",
        description: "Collapse directory or go to parent",
    },
    KeyEntry {
        key: "gg / G",
        description: "Jump to first / last row",
    },
    KeyEntry {
        key: "Ctrl+D / Ctrl+U",
        description: "Half page down / up",
    },
    KeyEntry {
        key: "Ctrl+J / Ctrl+K",
        description: "Scroll document one line",
    },
    KeyEntry {
        key: "Ctrl+F / Ctrl+B",
        description: "Scroll document half a page",
    },
];

const CONTENT_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "j / ↓",
        description: "Scroll down",
    },
    KeyEntry {
        key: "k / ↑",
        description: "Scroll up",
    },
    KeyEntry {
        key: "Ctrl+D / Ctrl+U",
        description: "Half page down / up",
    },
    KeyEntry {
        key: "PgDn / PgUp",
        description: "Page down / up",
    },
    KeyEntry {
        key: "gg / G",
        description: "Jump to top / bottom",
    },
];

const SEARCH_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "/",
        description: "Search the document",
    },
    KeyEntry {
        key: "Enter / Esc",
        description: "Run / cancel the search prompt",
    },
    KeyEntry {
        key: "n / N",
        description: "Next / previous match",
    },
];

const GENERAL_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "Ctrl+H / Ctrl+L",
        description: "Focus tree / document",
    },
    KeyEntry {
        key: "t",
        description: "Toggle tree panel",
    },
    KeyEntry {
        key: "?",
        description: "Toggle this help overlay",
    },
    KeyEntry {
        key: "q / Ctrl+C",
        description: "Quit",
    },
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Tree Panel",
        entries: TREE_KEYS,
    },
    KeyCategory {
        name: "Document",
        entries: CONTENT_KEYS,
    },
    KeyCategory {
        name: "Search",
        entries: SEARCH_KEYS,
    },
    KeyCategory {
        name: "General",
        entries: GENERAL_KEYS,
    },
];

/// Help overlay widget showing all keybindings.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors) -> Self {
        Self { theme }
    }

    /// Build all the lines for the help content.
    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();

        for category in CATEGORIES {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("── {} ", category.name),
                    Style::default()
                        .fg(self.theme.accent_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("─".repeat(30), Style::default().fg(self.theme.dim_fg)),
            ]));

            for entry in category.entries {
                let key_padded = format!("  {:<18}", entry.key);
                lines.push(Line::from(vec![
                    Span::styled(
                        key_padded,
                        Style::default()
                            .fg(self.theme.info_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        entry.description.to_string(),
                        Style::default().fg(self.theme.tree_fg),
                    ),
                ]));
            }

            lines.push(Line::from(""));
        }

        lines.push(Line::from(vec![Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(self.theme.dim_fg),
        )]));

        lines
    }

    /// Get total number of content lines.
    pub fn total_lines() -> usize {
        CATEGORIES
            .iter()
            .map(|category| category.entries.len() + 2)
            .sum::<usize>()
            + 1
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Center the overlay, sized to its content where the terminal allows.
        let overlay_width = area.width.min(64);
        let overlay_height = area.height.min(Self::total_lines() as u16 + 2);

        let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
        let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
        let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

        Clear.render(overlay_area, buf);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .style(Style::default().bg(self.theme.dialog_bg));

        let inner = block.inner(overlay_area);
        block.render(overlay_area, buf);

        for (i, line) in self
            .build_content_lines()
            .iter()
            .take(inner.height as usize)
            .enumerate()
        {
            let line_y = inner.y + i as u16;
            buf.set_line(inner.x + 1, line_y, line, inner.width.saturating_sub(2));
        }
    }
}
