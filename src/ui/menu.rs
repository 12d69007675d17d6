//! Repository menu
//!
//! Bordered list of catalog entries with a selector on the highlighted one.
//! The highlighted entry's note goes on the bottom row when the list leaves
//! it free.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use unicode_width::UnicodeWidthStr;

use super::Styles;
use super::header::truncate_with_tail;
use super::viewport::ListCursor;

/// Menu width in columns, borders included
pub const MENU_WIDTH: u16 = 28;

/// Menu widget
pub struct Menu<'a> {
    /// Display names, in catalog order
    pub names: &'a [&'a str],
    pub cursor: ListCursor,
    /// Note of the highlighted entry
    pub note: Option<&'a str>,
    pub focused: bool,
    pub styles: &'a Styles,
}

impl Widget for Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.styles.border_focus
        } else {
            self.styles.border
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Repositories ", self.styles.popup_title));

        let inner = block.inner(area);
        block.render(area, buf);

        let visible_height = inner.height as usize;
        let name_width = (inner.width as usize).saturating_sub(3);

        for (i, name) in self.names.iter().skip(self.cursor.scroll).take(visible_height).enumerate() {
            let y = inner.y + i as u16;
            let is_cursor = i + self.cursor.scroll == self.cursor.selected;
            let style = if is_cursor {
                self.styles.menu_cursor
            } else {
                self.styles.menu_item
            };

            let name = truncate_with_tail(name, name_width, "…");
            let pad = name_width.saturating_sub(name.width());
            let line = Line::from(vec![
                Span::styled(if is_cursor { " > " } else { "   " }, self.styles.selector),
                Span::styled(name, style),
                Span::styled(" ".repeat(pad), style),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }

        let shown = self.names.len().saturating_sub(self.cursor.scroll);
        if let Some(note) = self.note.filter(|n| !n.is_empty() && shown < visible_height) {
            let note = truncate_with_tail(note, (inner.width as usize).saturating_sub(1), "…");
            let y = inner.bottom().saturating_sub(1);
            buf.set_line(inner.x, y, &Line::styled(format!(" {}", note), self.styles.menu_note), inner.width);
        }
    }
}

/// Render the repository menu
pub fn render_menu(
    buf: &mut Buffer,
    area: Rect,
    names: &[&str],
    cursor: ListCursor,
    note: Option<&str>,
    focused: bool,
    styles: &Styles,
) {
    Menu {
        names,
        cursor,
        note,
        focused,
        styles,
    }
    .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(buf: &Buffer) -> Vec<String> {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| (area.left()..area.right()).map(|x| buf[(x, y)].symbol()).collect())
            .collect()
    }

    fn draw(names: &[&str], note: Option<&str>) -> Vec<String> {
        let area = Rect::new(0, 0, MENU_WIDTH, 6);
        let mut buf = Buffer::empty(area);
        render_menu(&mut buf, area, names, ListCursor::default(), note, true, &Styles::new());
        rows(&buf)
    }

    #[test]
    fn test_note_on_bottom_row() {
        let rows = draw(&["Home", "demo"], Some("Server settings"));
        assert!(rows[1].contains(" > Home"));
        assert!(rows[4].starts_with("│ Server settings "));
    }

    #[test]
    fn test_long_note_is_truncated() {
        let rows = draw(&["Home"], Some("a note far too long to fit inside the menu box"));
        assert!(rows[4].contains("…│"));
    }

    #[test]
    fn test_note_needs_a_free_row() {
        let rows = draw(&["a", "b", "c", "d"], Some("Server settings"));
        assert!(!rows.iter().any(|r| r.contains("Server settings")));
        assert!(rows[4].contains("d"));
    }
}
