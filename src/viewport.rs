use std::ops::Range;

/// Vertical scroll window over a sequence of rows.
///
/// The offset is always clamped so the window never scrolls past the last row.
#[derive(Debug, Default, Clone)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    offset: usize,
    total_lines: usize,
}

impl Viewport {
    #[cfg(test)]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_lines: 0,
        }
    }

    /// Resize the window, re-clamping the current offset.
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Update the number of rows being scrolled over.
    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }

    #[cfg(test)]
    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height)
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.set_offset(self.offset.saturating_add(lines));
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.set_offset(self.offset.saturating_sub(lines));
    }

    /// Half the window height, never less than one row.
    pub fn half_page(&self) -> usize {
        (self.height / 2).max(1)
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down(self.half_page());
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up(self.half_page());
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Rows currently inside the window.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height).min(self.total_lines);
        self.offset.min(end)..end
    }

    /// Scroll the minimum amount needed for `row` to be inside the window.
    pub fn ensure_visible(&mut self, row: usize) {
        if self.height == 0 {
            return;
        }
        if row < self.offset {
            self.set_offset(row);
            return;
        }
        let bottom = self.offset + self.height - 1;
        if row > bottom {
            self.set_offset(row + 1 - self.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(height: usize, total: usize) -> Viewport {
        let mut vp = Viewport::new(40, height);
        vp.set_total_lines(total);
        vp
    }

    #[test]
    fn offset_is_clamped_to_last_page() {
        let mut vp = viewport(10, 25);
        vp.set_offset(100);
        assert_eq!(vp.offset(), 15);
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut vp = viewport(10, 4);
        vp.scroll_down(3);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn shrinking_content_reclamps_offset() {
        let mut vp = viewport(10, 50);
        vp.set_offset(30);
        vp.set_total_lines(20);
        assert_eq!(vp.offset(), 10);
    }

    #[test]
    fn half_page_moves_by_half_height() {
        let mut vp = viewport(10, 100);
        vp.half_page_down();
        assert_eq!(vp.offset(), 5);
        vp.half_page_up();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn half_page_of_tiny_window_is_one() {
        let vp = viewport(1, 100);
        assert_eq!(vp.half_page(), 1);
    }

    #[test]
    fn goto_top_and_bottom() {
        let mut vp = viewport(10, 30);
        vp.goto_bottom();
        assert_eq!(vp.offset(), 20);
        vp.goto_top();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn ensure_visible_scrolls_down_minimally() {
        let mut vp = viewport(5, 30);
        vp.ensure_visible(7);
        assert_eq!(vp.offset(), 3);
        assert_eq!(vp.visible_range(), 3..8);
    }

    #[test]
    fn ensure_visible_scrolls_up_to_row() {
        let mut vp = viewport(5, 30);
        vp.set_offset(10);
        vp.ensure_visible(4);
        assert_eq!(vp.offset(), 4);
    }

    #[test]
    fn ensure_visible_inside_window_is_noop() {
        let mut vp = viewport(5, 30);
        vp.set_offset(10);
        vp.ensure_visible(12);
        assert_eq!(vp.offset(), 10);
    }

    #[test]
    fn zero_height_ignores_ensure_visible() {
        let mut vp = viewport(0, 30);
        vp.ensure_visible(12);
        assert_eq!(vp.offset(), 0);
    }
}
