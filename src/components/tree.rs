use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::tree::{FlatLine, TreeState};
use crate::theme::ThemeColors;

/// Tree panel: the visible rows of the document tree with the selection highlighted.
pub struct TreeWidget<'a> {
    tree_state: &'a TreeState,
    theme: &'a ThemeColors,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree_state: &'a TreeState, theme: &'a ThemeColors) -> Self {
        Self {
            tree_state,
            theme,
            focused: false,
            block: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    fn line_style(&self, line: &FlatLine, is_selected: bool) -> Style {
        if is_selected {
            return if self.focused {
                Style::default()
                    .bg(self.theme.tree_selected_bg)
                    .fg(self.theme.tree_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .bg(self.theme.tree_selected_inactive_bg)
                    .fg(self.theme.tree_fg)
            };
        }
        if line.depth == 0 {
            Style::default()
                .fg(self.theme.accent_fg)
                .add_modifier(Modifier::BOLD)
        } else if line.is_dir {
            Style::default()
                .fg(self.theme.tree_dir_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.tree_fg)
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let lines = &self.tree_state.flat_lines;
        if lines.is_empty() || inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        let selected = self.tree_state.selected_index;
        let range = self.tree_state.view.visible_range();
        let start = range.start;

        for (i, line) in lines[range].iter().enumerate() {
            let y = inner_area.y + i as u16;
            if y >= inner_area.y + inner_area.height {
                break;
            }
            let is_selected = start + i == selected;
            let style = self.line_style(line, is_selected);

            // Pad the selected row so its highlight spans the panel.
            let content = if is_selected {
                format!("{:<width$}", line.label, width = inner_area.width as usize)
            } else {
                line.label.clone()
            };
            let row = Line::from(Span::styled(content, style));
            buf.set_line(inner_area.x, y, &row, inner_area.width);
        }
    }
}
