//! Catalog session and event loop
//!
//! A [`CatalogSession`] belongs to one viewer. It holds the access-filtered
//! menu and the browser of whichever repository is open, and routes every
//! key and resize to whichever of the two has focus.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Widget},
};

use crate::access::{AccessPolicy, Viewer};
use crate::browser::{BrowserSession, SessionContext};
use crate::catalog::{CatalogError, MenuEntry, build_menu};
use crate::config::Config;
use crate::error::Error;
use crate::git::RepoSource;
use crate::syntax::Highlighter;
use crate::ui::{HelpEntry, ListCursor, MENU_WIDTH, Styles, render_footer, render_header, render_menu, render_message_popup};

/// Rows outside a repository body: title bar, footer and body borders
const HEIGHT_MARGIN: u16 = 4;
/// Columns outside a repository body: the menu and body borders
const WIDTH_MARGIN: u16 = MENU_WIDTH + 2;

/// Which box receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Menu,
    Repo,
}

/// Everything one viewer's session needs
pub struct CatalogSession {
    // Window dimensions
    width: u16,
    height: u16,

    config: Arc<Config>,
    source: Arc<dyn RepoSource>,
    ctx: Arc<SessionContext>,

    menu: Vec<MenuEntry>,
    cursor: ListCursor,
    /// Menu index of the repository on display
    active: Option<usize>,
    focus: Focus,
    message: Option<String>,
}

impl CatalogSession {
    /// Build the catalog for `viewer` and open the initial repository.
    ///
    /// An empty catalog is not an error here: the session starts with a
    /// message instead. A malformed control readme template is.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        viewer: Viewer,
        config: Arc<Config>,
        policy: &AccessPolicy,
        source: Arc<dyn RepoSource>,
        highlighter: Arc<Highlighter>,
        width: u16,
        height: u16,
        initial_repo: Option<&str>,
    ) -> std::result::Result<Self, Error> {
        let (menu, message) = match build_menu(&config, policy, source.as_ref(), &viewer) {
            Ok(menu) => (menu, None),
            Err(CatalogError::Empty { entries }) => {
                tracing::info!(viewer = ?policy.user_names(&viewer), "no readable repositories");
                (entries, Some("No repositories available.".to_string()))
            }
            Err(CatalogError::Build(err)) => return Err(err),
        };

        let ctx = Arc::new(SessionContext::from_config(&config, Styles::new(), highlighter));
        let mut session = Self {
            width,
            height,
            config,
            source,
            ctx,
            menu,
            cursor: ListCursor::default(),
            active: None,
            focus: Focus::Menu,
            message,
        };

        let initial = initial_repo.and_then(|name| session.menu.iter().position(|e| e.repo == name));
        match initial {
            Some(index) => {
                session.select(index);
                session.open_selected();
                if session.active == Some(index) {
                    session.focus = Focus::Repo;
                }
            }
            None => {
                if initial_repo.is_some() {
                    tracing::info!(repo = ?initial_repo, "initial repository not in catalog");
                }
                if session.menu.first().is_some_and(MenuEntry::readable) {
                    session.open_selected();
                }
            }
        }
        Ok(session)
    }

    #[cfg(test)]
    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    #[cfg(test)]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    #[cfg(test)]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The browser currently on display
    pub fn active_session(&self) -> Option<&BrowserSession> {
        self.active.and_then(|i| self.menu.get(i)).and_then(|e| e.session.as_ref())
    }

    fn active_session_mut(&mut self) -> Option<&mut BrowserSession> {
        self.active.and_then(|i| self.menu.get_mut(i)).and_then(|e| e.session.as_mut())
    }

    fn menu_height(&self) -> usize {
        self.height.saturating_sub(HEIGHT_MARGIN) as usize
    }

    fn select(&mut self, index: usize) {
        self.cursor.selected = index;
        self.cursor.clamp(self.menu.len(), self.menu_height());
    }

    /// Open the highlighted entry, building its browser on first use
    fn open_selected(&mut self) {
        let index = self.cursor.selected;
        let Some(entry) = self.menu.get(index) else {
            return;
        };
        if !entry.readable() {
            tracing::info!(repo = %entry.repo, "permission denied");
            self.message = Some(format!("You don't have permission to view {}.", entry.name));
            return;
        }

        if entry.session.is_none() {
            let repo = match self.source.open(&entry.repo) {
                Ok(repo) => repo,
                Err(err) => {
                    tracing::warn!(repo = %entry.repo, error = %err, "failed to open repository");
                    self.message = Some(err.to_string());
                    return;
                }
            };
            let session = BrowserSession::new(
                repo,
                entry.readme.clone(),
                Arc::clone(&self.ctx),
                self.width,
                self.height,
                WIDTH_MARGIN,
                HEIGHT_MARGIN,
            );
            tracing::debug!(repo = %entry.repo, "opened repository");
            self.menu[index].session = Some(session);
        } else if let Some(session) = self.menu[index].session.as_mut() {
            // It may have missed resizes while hidden
            session.resize(self.width, self.height);
        }

        self.active = Some(index);
    }

    /// New terminal size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let menu_height = self.menu_height();
        self.cursor.clamp(self.menu.len(), menu_height);
        if let Some(session) = self.active_session_mut() {
            session.resize(width, height);
        }
    }

    /// Handle keyboard input. Returns true if the session should end.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => return true,
            _ => {}
        }

        if self.message.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.message = None;
            }
            return false;
        }

        if key.code == KeyCode::Tab {
            self.focus = match self.focus {
                Focus::Menu if self.active.is_some() => Focus::Repo,
                _ => Focus::Menu,
            };
            return false;
        }

        match self.focus {
            Focus::Menu => self.handle_menu_key(key),
            Focus::Repo => self.handle_repo_key(key),
        }
        false
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let height = self.menu_height();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor.down(self.menu.len(), height),
            KeyCode::Char('k') | KeyCode::Up => self.cursor.up(height),
            KeyCode::Enter => {
                self.open_selected();
                if self.active == Some(self.cursor.selected) {
                    self.focus = Focus::Repo;
                }
            }
            _ => {}
        }
    }

    fn handle_repo_key(&mut self, key: KeyEvent) {
        let Some(session) = self.active_session_mut() else {
            self.focus = Focus::Menu;
            return;
        };
        if let Err(err) = session.handle_key(key) {
            tracing::warn!(repo = session.name(), error = %err, "repository operation failed");
            self.message = Some(err.to_string());
        }
    }

    /// Footer entries for the current focus
    pub fn help(&self) -> Vec<HelpEntry> {
        if self.message.is_some() {
            return vec![HelpEntry::new("esc", "dismiss"), HelpEntry::new("q", "quit")];
        }
        let mut help = match (self.focus, self.active_session()) {
            (Focus::Repo, Some(session)) => session.active_help(),
            _ => vec![HelpEntry::new("j/k", "move"), HelpEntry::new("enter", "open")],
        };
        if self.active.is_some() {
            help.push(HelpEntry::new("tab", "section"));
        }
        help.push(HelpEntry::new("q", "quit"));
        help
    }

    /// Render the whole screen
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: title (1) + content + footer (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(MENU_WIDTH), Constraint::Min(0)])
            .split(chunks[1]);

        let styles = &self.ctx.styles;
        let buf = frame.buffer_mut();
        render_header(buf, chunks[0], &self.config.name, styles);

        let names: Vec<&str> = self.menu.iter().map(|e| e.name.as_str()).collect();
        let note = self.menu.get(self.cursor.selected).map(|e| e.note.as_str());
        render_menu(buf, content[0], &names, self.cursor, note, self.focus == Focus::Menu, styles);

        match self.active_session() {
            Some(session) => session.render(content[1], buf, self.focus == Focus::Repo),
            None => render_placeholder(buf, content[1], styles),
        }

        render_footer(buf, chunks[2], &self.help(), styles);

        if let Some(message) = &self.message {
            render_message_popup(buf, area, "Notice", message, styles);
        }
    }

    /// Run the terminal event loop until the viewer quits
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        self.resize(size.width, size.height);

        let result = self.event_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(std::time::Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Resize(w, h) => self.resize(w, h),
                    _ => {}
                }
            }
        }
    }
}

fn render_placeholder(buf: &mut ratatui::buffer::Buffer, area: Rect, styles: &Styles) {
    let block = Block::default().borders(Borders::ALL).border_style(styles.border);
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height > 0 {
        buf.set_line(
            inner.x + 1,
            inner.y,
            &Line::styled("Select a repository", styles.menu_note),
            inner.width.saturating_sub(1),
        );
    }
}
