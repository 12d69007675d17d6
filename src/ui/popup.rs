//! Popup overlays
//!
//! Centered message box for permission and not-found notices.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use super::Styles;
use crate::syntax::wrap_words;

/// Render a centered popup overlay, returning its inner area
fn render_centered_popup(buf: &mut Buffer, area: Rect, width: u16, height: u16, title: &str, styles: &Styles) -> Rect {
    // Calculate centered position
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, width.min(area.width), height.min(area.height));

    // Clear the popup area
    Clear.render(popup_area, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles.border_focus)
        .title(Span::styled(format!(" {} ", title), styles.popup_title))
        .style(styles.popup);

    let inner = block.inner(popup_area);
    block.render(popup_area, buf);

    inner
}

/// Render a message popup with a dismiss hint
pub fn render_message_popup(buf: &mut Buffer, area: Rect, title: &str, message: &str, styles: &Styles) {
    let width = 60.min(area.width.saturating_sub(4)).max(12);
    let text_width = width.saturating_sub(4) as usize;
    let lines = wrap_words(message, text_width);
    let height = (lines.len() as u16 + 4).min(area.height);

    let inner = render_centered_popup(buf, area, width, height, title, styles);

    for (i, line) in lines.iter().enumerate() {
        let y = inner.y + i as u16;
        if y >= inner.y + inner.height {
            break;
        }
        buf.set_line(inner.x + 1, y, &Line::styled(line.as_str(), styles.error), inner.width.saturating_sub(1));
    }

    if inner.height > 0 {
        let hint = Line::from(vec![
            Span::styled("esc", styles.popup_title),
            Span::styled(" dismiss", styles.popup),
        ]);
        buf.set_line(inner.x + 1, inner.y + inner.height - 1, &hint, inner.width.saturating_sub(1));
    }
}
