//! Scrolling primitives
//!
//! [`Viewport`] scrolls a block of pre-rendered lines; [`ListCursor`] tracks
//! a selection in a list and keeps it on screen.

use ratatui::{buffer::Buffer, layout::Rect, text::Line, widgets::Widget};

/// Scrollable block of lines
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    lines: Vec<Line<'static>>,
    offset: usize,
    height: usize,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content, keeping the offset within range
    pub fn set_content(&mut self, lines: Vec<Line<'static>>) {
        self.lines = lines;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.height
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    pub fn line_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub fn line_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn page_down(&mut self) {
        self.line_down(self.height.max(1));
    }

    pub fn page_up(&mut self) {
        self.line_up(self.height.max(1));
    }
}

impl Widget for &Viewport {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (i, line) in self.lines.iter().skip(self.offset).take(area.height as usize).enumerate() {
            buf.set_line(area.x, area.y + i as u16, line, area.width);
        }
    }
}

/// Selection and scroll offset of a list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    pub selected: usize,
    pub scroll: usize,
}

impl ListCursor {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn down(&mut self, len: usize, height: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
        self.ensure_visible(height);
    }

    pub fn up(&mut self, height: usize) {
        self.selected = self.selected.saturating_sub(1);
        self.ensure_visible(height);
    }

    /// Clamp to a list that may have shrunk
    pub fn clamp(&mut self, len: usize, height: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.ensure_visible(height);
    }

    fn ensure_visible(&mut self, height: usize) {
        let height = height.max(1);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + height {
            self.scroll = self.selected + 1 - height;
        }
    }
}
