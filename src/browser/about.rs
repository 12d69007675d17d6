//! About page: the repository readme

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use super::{MAX_RENDER_WIDTH, Nav, PageView, SessionContext};
use crate::error::Result;
use crate::git::Repo;
use crate::syntax::render_or_plain;
use crate::ui::{HelpEntry, Styles, Viewport};

pub struct AboutPage {
    readme: String,
    viewport: Viewport,
}

impl AboutPage {
    pub fn new(readme: String) -> Self {
        Self {
            readme,
            viewport: Viewport::new(),
        }
    }

    #[cfg(test)]
    pub fn readme(&self) -> &str {
        &self.readme
    }

    #[cfg(test)]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

impl PageView for AboutPage {
    fn set_size(&mut self, width: u16, height: u16, ctx: &SessionContext) {
        self.viewport.set_height(height as usize);

        // Wrapping depends on the width, so render again
        let width = width.min(MAX_RENDER_WIDTH);
        let lines = render_or_plain(ctx.highlighter.as_ref(), &self.readme, "markdown", width);
        self.viewport.set_content(lines);
    }

    fn enter(&mut self, _repo: &dyn Repo, _ctx: &SessionContext) -> Result<()> {
        Ok(())
    }

    fn handle(&mut self, nav: Nav, _repo: &dyn Repo, _ctx: &SessionContext) -> Result<()> {
        match nav {
            Nav::Down => self.viewport.line_down(1),
            Nav::Up => self.viewport.line_up(1),
            Nav::PageDown => self.viewport.page_down(),
            Nav::PageUp => self.viewport.page_up(),
            Nav::Select | Nav::Back => {}
        }
        Ok(())
    }

    fn help(&self) -> Vec<HelpEntry> {
        vec![HelpEntry::new("j/k", "scroll"), HelpEntry::new("f/b", "pgdown/pgup")]
    }

    fn render(&self, area: Rect, buf: &mut Buffer, _styles: &Styles) {
        (&self.viewport).render(area, buf);
    }
}
