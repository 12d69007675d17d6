//! Footer rendering
//!
//! Displays the keybinding hints of whatever currently has focus.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::Styles;

/// A key and what it does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpEntry {
    pub key: &'static str,
    pub desc: &'static str,
}

impl HelpEntry {
    pub const fn new(key: &'static str, desc: &'static str) -> Self {
        Self { key, desc }
    }
}

/// Footer widget showing keybinding hints
pub struct Footer<'a> {
    pub help: &'a [HelpEntry],
    pub styles: &'a Styles,
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        // Clear the footer area
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_char(' ').set_style(self.styles.footer);
        }

        let mut spans = vec![Span::styled(" ", self.styles.footer)];
        for (i, entry) in self.help.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" • ", self.styles.footer));
            }
            spans.push(Span::styled(entry.key, self.styles.help_key));
            spans.push(Span::styled(format!(" {}", entry.desc), self.styles.help_desc));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

/// Render the footer bar
pub fn render_footer(buf: &mut Buffer, area: Rect, help: &[HelpEntry], styles: &Styles) {
    Footer { help, styles }.render(area, buf);
}
