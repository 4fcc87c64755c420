use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Widget},
};

use crate::theme::ThemeColors;
use crate::viewport::Viewport;

/// Document pane: the slice of rendered text inside the viewport.
pub struct ContentWidget<'a> {
    text: &'a Text<'static>,
    view: &'a Viewport,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> ContentWidget<'a> {
    pub fn new(text: &'a Text<'static>, view: &'a Viewport, theme: &'a ThemeColors) -> Self {
        Self {
            text,
            view,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }
}

impl<'a> Widget for ContentWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.text.lines.is_empty() {
            let line = Line::from(Span::styled(
                "(empty document)",
                Style::default().fg(self.theme.dim_fg),
            ));
            buf.set_line(inner.x, inner.y, &line, inner.width);
            return;
        }

        let range = self.view.visible_range();
        let end = range.end.min(self.text.lines.len());
        let start = range.start.min(end);

        for (i, line) in self.text.lines[start..end].iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            buf.set_line(inner.x, y, line, inner.width);
        }
    }
}
