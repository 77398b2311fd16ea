/// Keeps the inline viewport pinned to the newest lines of a frame.
#[derive(Debug, Clone, Default)]
pub struct TailScroll {
    offset: usize,
    total_lines: usize,
    viewport_height: usize,
}

impl TailScroll {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offset: 0,
            total_lines: 0,
            viewport_height: 0,
        }
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub const fn hidden_lines(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub const fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Records a new frame size and moves to its bottom. Returns the offset.
    pub const fn follow(&mut self, total_lines: usize, viewport_height: usize) -> usize {
        self.total_lines = total_lines;
        self.viewport_height = viewport_height;
        self.offset = self.max_offset();
        self.offset
    }

    pub const fn reset(&mut self) {
        *self = Self::new();
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_top() {
        let scroll = TailScroll::new();
        assert_eq!(scroll.offset(), 0);
        assert!(scroll.is_at_bottom());
    }

    #[test]
    fn content_that_fits_is_not_scrolled() {
        let mut scroll = TailScroll::new();
        assert_eq!(scroll.follow(5, 10), 0);
    }

    #[test]
    fn follows_growing_content() {
        let mut scroll = TailScroll::new();
        assert_eq!(scroll.follow(20, 10), 10);
        assert_eq!(scroll.follow(25, 10), 15);
        assert_eq!(scroll.hidden_lines(), 15);
        assert!(scroll.is_at_bottom());
    }

    #[test]
    fn shrinking_content_clamps() {
        let mut scroll = TailScroll::new();
        scroll.follow(100, 10);
        assert_eq!(scroll.follow(12, 10), 2);
    }

    #[test]
    fn reset_clears_state() {
        let mut scroll = TailScroll::new();
        scroll.follow(40, 10);
        scroll.reset();
        assert_eq!(scroll.offset(), 0);
    }
}
