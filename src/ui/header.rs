//! Header rendering
//!
//! The one-line server title bar and the per-repository header (title plus
//! clone command).

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::Styles;
use crate::access::CONFIG_REPO;

/// Longest repository title shown in a header
pub const REPO_NAME_MAX_WIDTH: usize = 32;
/// Columns taken by the borders and padding of the two header boxes
const FRAME_WIDTH: usize = 7;

/// Title bar showing the server name
pub struct TitleBar<'a> {
    pub name: &'a str,
    pub styles: &'a Styles,
}

impl Widget for TitleBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        // Clear the header area
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_char(' ').set_style(self.styles.title);
        }

        let line = Line::from(Span::styled(format!(" {} ", self.name), self.styles.title));
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

/// Render the server title bar
pub fn render_header(buf: &mut Buffer, area: Rect, name: &str, styles: &Styles) {
    TitleBar { name, styles }.render(area, buf);
}

/// Truncate to `max` columns, ending with `tail` when cut
pub fn truncate_with_tail(s: &str, max: usize, tail: &str) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub(tail.width());
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(tail);
    out
}

/// Break `s` into lines of at most `width` columns, ignoring word boundaries
pub fn hard_wrap(s: &str, width: usize) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            used = 0;
        }
        used += w;
        current.push(c);
    }
    lines.push(current);
    lines
}

/// `ssh://host[:port]/name`, the port left out when it is 22
pub fn ssh_address(host: &str, port: u16, name: &str) -> String {
    if port == 22 {
        format!("ssh://{}/{}", host, name)
    } else {
        format!("ssh://{}:{}/{}", host, port, name)
    }
}

/// Laid-out header of one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHeader {
    pub title: String,
    pub note: Vec<String>,
}

impl RepoHeader {
    /// Lay out the header for `name` within `width` columns
    pub fn new(name: &str, host: &str, port: u16, width: u16) -> Self {
        let title = if name == CONFIG_REPO { "Home" } else { name };
        let title = truncate_with_tail(title, REPO_NAME_MAX_WIDTH, "…");

        let note = if name == CONFIG_REPO {
            Vec::new()
        } else {
            let command = format!("git clone {}", ssh_address(host, port, name));
            let note_width = (width as usize).saturating_sub(title.width() + FRAME_WIDTH).max(1);
            hard_wrap(&command, note_width)
        };

        Self { title, note }
    }

    /// Rows taken including borders
    pub fn height(&self) -> u16 {
        self.note.len().max(1) as u16 + 2
    }
}

/// Header widget: title box and clone-command box side by side
pub struct RepoHeaderWidget<'a> {
    pub header: &'a RepoHeader,
    pub active: bool,
    pub styles: &'a Styles,
}

impl Widget for RepoHeaderWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.active {
            self.styles.border_focus
        } else {
            self.styles.border
        };
        let title_width = (self.header.title.width() as u16 + 4).min(area.width);
        let title_area = Rect { width: title_width, ..area };
        let note_area = Rect {
            x: area.x + title_width,
            width: area.width - title_width,
            ..area
        };

        let title_block = Block::default().borders(Borders::ALL).border_style(border);
        let inner = title_block.inner(title_area);
        title_block.render(title_area, buf);
        buf.set_line(
            inner.x + 1,
            inner.y,
            &Line::styled(self.header.title.as_str(), self.styles.repo_title),
            inner.width.saturating_sub(1),
        );

        let note_block = Block::default()
            .borders(Borders::TOP | Borders::RIGHT | Borders::BOTTOM)
            .border_style(border);
        let inner = note_block.inner(note_area);
        note_block.render(note_area, buf);
        for (i, line) in self.header.note.iter().enumerate().take(inner.height as usize) {
            buf.set_line(
                inner.x + 1,
                inner.y + i as u16,
                &Line::styled(line.as_str(), self.styles.repo_note),
                inner.width.saturating_sub(1),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ssh_address() {
        assert_eq!(ssh_address("example.com", 22, "demo"), "ssh://example.com/demo");
        assert_eq!(ssh_address("localhost", 23231, "demo"), "ssh://localhost:23231/demo");
    }

    #[test]
    fn test_truncate_with_tail() {
        assert_eq!(truncate_with_tail("short", 32, "…"), "short");
        let long = "a".repeat(40);
        let cut = truncate_with_tail(&long, 32, "…");
        assert_eq!(cut.width(), 32);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_hard_wrap() {
        assert_eq!(hard_wrap("abcdefg", 3), vec!["abc", "def", "g"]);
        assert!(hard_wrap("", 3).is_empty());
    }

    #[test]
    fn test_config_header_is_home_without_command() {
        let header = RepoHeader::new("config", "localhost", 23231, 80);
        assert_eq!(header.title, "Home");
        assert!(header.note.is_empty());
        assert_eq!(header.height(), 3);
    }

    #[test]
    fn test_narrow_width_wraps_clone_command() {
        let wide = RepoHeader::new("demo", "localhost", 23231, 200);
        assert_eq!(wide.note, vec!["git clone ssh://localhost:23231/demo"]);
        assert_eq!(wide.height(), 3);

        // 4 title columns + frame leaves 20 for the note
        let narrow = RepoHeader::new("demo", "localhost", 23231, 31);
        assert_eq!(narrow.note, vec!["git clone ssh://loca", "lhost:23231/demo"]);
        assert_eq!(narrow.height(), 4);
    }
}
