//! Repository browser
//!
//! A [`BrowserSession`] is the page state machine for one repository. All
//! three pages are built up front and kept alive, so the log cursor and the
//! tree path survive switching away and back.
//!
//! ```text
//!        A          L          T
//!   ┌─────────┐ ┌─────────┐ ┌─────────┐
//!   │  About  │ │   Log   │ │  Tree   │
//!   └─────────┘ │ list ⇄  │ │ tree ⇄  │
//!               │ detail  │ │ file    │
//!               └─────────┘ └─────────┘
//! ```

mod about;
mod log;
mod tree;

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Widget},
};

pub use about::AboutPage;
pub use log::LogPage;
pub use tree::TreePage;

use crate::config::{Config, Limits};
use crate::error::Result;
use crate::git::Repo;
use crate::syntax::Highlighter;
use crate::ui::{HelpEntry, RepoHeader, RepoHeaderWidget, Styles};

/// Widest text rendering for readmes and commit details
pub const MAX_RENDER_WIDTH: u16 = 120;

/// Everything a session needs besides the repository itself
pub struct SessionContext {
    pub host: String,
    pub port: u16,
    pub limits: Limits,
    pub styles: Styles,
    pub highlighter: Arc<Highlighter>,
}

impl SessionContext {
    pub fn from_config(config: &Config, styles: Styles, highlighter: Arc<Highlighter>) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            limits: config.limits,
            styles,
            highlighter,
        }
    }
}

/// Top-level pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    About,
    Log,
    Tree,
}

impl Page {
    const ALL: [Page; 3] = [Page::About, Page::Log, Page::Tree];

    fn index(self) -> usize {
        self as usize
    }

    fn key(self) -> HelpEntry {
        match self {
            Page::About => HelpEntry::new("A", "about"),
            Page::Log => HelpEntry::new("L", "log"),
            Page::Tree => HelpEntry::new("T", "tree"),
        }
    }
}

/// Terminal size and the space reserved around the page body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub outer_width: u16,
    pub outer_height: u16,
    pub width_margin: u16,
    pub height_margin: u16,
}

impl Geometry {
    pub fn inner_width(&self) -> u16 {
        self.outer_width.saturating_sub(self.width_margin)
    }

    pub fn inner_height(&self) -> u16 {
        self.outer_height.saturating_sub(self.height_margin)
    }
}

/// Navigation intents shared by the pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nav {
    Down,
    Up,
    PageDown,
    PageUp,
    Select,
    Back,
}

impl Nav {
    pub(crate) fn from_key(key: &KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Nav::Down),
            KeyCode::Char('k') | KeyCode::Up => Some(Nav::Up),
            KeyCode::Char('f') | KeyCode::PageDown => Some(Nav::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Nav::PageUp),
            KeyCode::Enter => Some(Nav::Select),
            KeyCode::Esc => Some(Nav::Back),
            _ => None,
        }
    }
}

/// Behavior common to the three pages
pub(crate) trait PageView {
    /// Content area changed
    fn set_size(&mut self, width: u16, height: u16, ctx: &SessionContext);

    /// Page became active
    fn enter(&mut self, repo: &dyn Repo, ctx: &SessionContext) -> Result<()>;

    fn handle(&mut self, nav: Nav, repo: &dyn Repo, ctx: &SessionContext) -> Result<()>;

    /// Keys meaningful in the current sub-state
    fn help(&self) -> Vec<HelpEntry>;

    fn render(&self, area: Rect, buf: &mut Buffer, styles: &Styles);
}

/// Page state machine for one repository
pub struct BrowserSession {
    repo: Arc<dyn Repo>,
    ctx: Arc<SessionContext>,
    page: Page,
    header: RepoHeader,
    geometry: Geometry,
    /// Height reserved outside this session (title bar, footer, borders)
    base_height_margin: u16,
    /// Pages whose size predates the last geometry change
    stale: [bool; 3],
    about: AboutPage,
    log: LogPage,
    tree: TreePage,
}

impl BrowserSession {
    /// Build a session with all pages, starting on About.
    ///
    /// `readme` replaces the repository's own readme when given.
    pub fn new(
        repo: Arc<dyn Repo>,
        readme: Option<String>,
        ctx: Arc<SessionContext>,
        outer_width: u16,
        outer_height: u16,
        width_margin: u16,
        height_margin: u16,
    ) -> Self {
        let readme = readme.unwrap_or_else(|| repo.readme());
        let header = RepoHeader::new(repo.name(), &ctx.host, ctx.port, outer_width.saturating_sub(width_margin));
        let geometry = Geometry {
            outer_width,
            outer_height,
            width_margin,
            height_margin: height_margin + header.height(),
        };

        let mut session = Self {
            about: AboutPage::new(readme),
            log: LogPage::new(repo.as_ref()),
            tree: TreePage::new(repo.as_ref()),
            repo,
            ctx,
            page: Page::About,
            header,
            geometry,
            base_height_margin: height_margin,
            stale: [true; 3],
        };
        for page in Page::ALL {
            session.apply_geometry(page);
        }
        session
    }

    pub fn name(&self) -> &str {
        self.repo.name()
    }

    #[cfg(test)]
    pub fn page(&self) -> Page {
        self.page
    }

    #[cfg(test)]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[cfg(test)]
    pub fn header(&self) -> &RepoHeader {
        &self.header
    }

    #[cfg(test)]
    pub fn about(&self) -> &AboutPage {
        &self.about
    }

    #[cfg(test)]
    pub fn log(&self) -> &LogPage {
        &self.log
    }

    #[cfg(test)]
    pub fn tree(&self) -> &TreePage {
        &self.tree
    }

    fn page_mut(&mut self, page: Page) -> &mut dyn PageView {
        match page {
            Page::About => &mut self.about,
            Page::Log => &mut self.log,
            Page::Tree => &mut self.tree,
        }
    }

    fn page_ref(&self, page: Page) -> &dyn PageView {
        match page {
            Page::About => &self.about,
            Page::Log => &self.log,
            Page::Tree => &self.tree,
        }
    }

    fn apply_geometry(&mut self, page: Page) {
        if !self.stale[page.index()] {
            return;
        }
        let (width, height) = (self.geometry.inner_width(), self.geometry.inner_height());
        let ctx = Arc::clone(&self.ctx);
        self.page_mut(page).set_size(width, height, &ctx);
        self.stale[page.index()] = false;
    }

    /// New terminal size. The header is laid out again, since a narrower
    /// terminal can wrap the clone command onto more rows.
    pub fn resize(&mut self, outer_width: u16, outer_height: u16) {
        self.header = RepoHeader::new(
            self.repo.name(),
            &self.ctx.host,
            self.ctx.port,
            outer_width.saturating_sub(self.geometry.width_margin),
        );
        self.geometry = Geometry {
            outer_width,
            outer_height,
            width_margin: self.geometry.width_margin,
            height_margin: self.base_height_margin + self.header.height(),
        };
        self.stale = [true; 3];
        self.apply_geometry(self.page);
    }

    /// Switch pages. Switching to the current page does nothing.
    pub fn set_page(&mut self, page: Page) -> Result<()> {
        if page == self.page {
            return Ok(());
        }
        tracing::debug!(repo = self.repo.name(), ?page, "switching page");
        self.page = page;
        self.apply_geometry(page);

        let repo = Arc::clone(&self.repo);
        let ctx = Arc::clone(&self.ctx);
        self.page_mut(page).enter(repo.as_ref(), &ctx)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return Ok(());
        }
        match key.code {
            KeyCode::Char('A') => return self.set_page(Page::About),
            KeyCode::Char('L') => return self.set_page(Page::Log),
            KeyCode::Char('T') => return self.set_page(Page::Tree),
            _ => {}
        }

        let Some(nav) = Nav::from_key(&key) else {
            return Ok(());
        };
        let repo = Arc::clone(&self.repo);
        let ctx = Arc::clone(&self.ctx);
        self.page_mut(self.page).handle(nav, repo.as_ref(), &ctx)
    }

    /// Keys for the other pages, then those of the active page's sub-state
    pub fn active_help(&self) -> Vec<HelpEntry> {
        let mut help: Vec<HelpEntry> = Page::ALL
            .into_iter()
            .filter(|p| *p != self.page)
            .map(Page::key)
            .collect();
        help.extend(self.page_ref(self.page).help());
        help
    }

    /// Draw the header and the active page into `area`
    pub fn render(&self, area: Rect, buf: &mut Buffer, active: bool) {
        let styles = &self.ctx.styles;
        let header_height = self.header.height().min(area.height);
        let header_area = Rect { height: header_height, ..area };
        RepoHeaderWidget {
            header: &self.header,
            active,
            styles,
        }
        .render(header_area, buf);

        let body_area = Rect {
            y: area.y + header_height,
            height: area.height - header_height,
            ..area
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if active { styles.border_focus } else { styles.border });
        let inner = block.inner(body_area);
        block.render(body_area, buf);

        self.page_ref(self.page).render(inner, buf, styles);
    }
}
