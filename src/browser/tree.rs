//! Tree page: directory listing and file preview

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::{Nav, PageView, SessionContext};
use crate::error::Result;
use crate::git::{EntryMode, Repo, TreeEntry, join_path, parent_path};
use crate::syntax::render_or_plain;
use crate::ui::{HelpEntry, ListCursor, Styles, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeView {
    Tree,
    File,
}

pub struct TreePage {
    /// Directory being listed, "" for the root
    path: String,
    entries: Vec<TreeEntry>,
    cursor: ListCursor,
    view: TreeView,
    /// File shown in the file view
    file_path: String,
    file: Viewport,
    width: u16,
    height: u16,
}

impl TreePage {
    /// Build the page listing the root directory
    pub fn new(repo: &dyn Repo) -> Self {
        let mut page = Self {
            path: String::new(),
            entries: Vec::new(),
            cursor: ListCursor::default(),
            view: TreeView::Tree,
            file_path: String::new(),
            file: Viewport::new(),
            width: 0,
            height: 0,
        };
        if let Err(err) = page.relist(repo) {
            tracing::warn!(repo = repo.name(), error = %err, "failed to list root");
        }
        page
    }

    #[cfg(test)]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn cursor(&self) -> ListCursor {
        self.cursor
    }

    #[cfg(test)]
    pub fn view(&self) -> TreeView {
        self.view
    }

    #[cfg(test)]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    #[cfg(test)]
    pub fn file(&self) -> &Viewport {
        &self.file
    }

    /// List `path` and make it current, cursor on the first entry
    fn list_at(&mut self, repo: &dyn Repo, path: String) -> Result<()> {
        self.entries = repo.tree(&path)?;
        self.path = path;
        self.cursor.reset();
        Ok(())
    }

    /// List the current path again
    fn relist(&mut self, repo: &dyn Repo) -> Result<()> {
        self.entries = repo.tree(&self.path)?;
        self.cursor.clamp(self.entries.len(), self.height as usize);
        Ok(())
    }

    fn open_file(&mut self, repo: &dyn Repo, path: String, ctx: &SessionContext) -> Result<()> {
        let content = repo.read_file(&path)?;
        let lines = if content.contains(&0) {
            vec![Line::styled(format!("(binary file, {} bytes)", content.len()), ctx.styles.menu_note)]
        } else {
            let language = ctx.highlighter.match_by_name(&path).unwrap_or_default();
            let text = String::from_utf8_lossy(&content);
            render_or_plain(ctx.highlighter.as_ref(), &text, &language, self.width)
        };
        tracing::debug!(repo = repo.name(), path = %path, "opened file");

        self.file.set_content(lines);
        self.file.goto_top();
        self.file_path = path;
        self.view = TreeView::File;
        Ok(())
    }

    fn select(&mut self, repo: &dyn Repo, ctx: &SessionContext) -> Result<()> {
        let Some(entry) = self.entries.get(self.cursor.selected) else {
            return Ok(());
        };
        let target = join_path(&self.path, &entry.name);
        match entry.mode {
            EntryMode::Directory => self.list_at(repo, target),
            EntryMode::File => self.open_file(repo, target, ctx),
            EntryMode::Other => Ok(()),
        }
    }
}

impl PageView for TreePage {
    fn set_size(&mut self, width: u16, height: u16, _ctx: &SessionContext) {
        self.width = width;
        self.height = height;
        self.file.set_height(height as usize);
        self.cursor.clamp(self.entries.len(), height as usize);
    }

    fn enter(&mut self, repo: &dyn Repo, _ctx: &SessionContext) -> Result<()> {
        if self.view == TreeView::Tree {
            self.relist(repo)?;
        }
        Ok(())
    }

    fn handle(&mut self, nav: Nav, repo: &dyn Repo, ctx: &SessionContext) -> Result<()> {
        match (self.view, nav) {
            (TreeView::Tree, Nav::Down) => self.cursor.down(self.entries.len(), self.height as usize),
            (TreeView::Tree, Nav::Up) => self.cursor.up(self.height as usize),
            (TreeView::Tree, Nav::Select) => self.select(repo, ctx)?,
            (TreeView::Tree, Nav::Back) => {
                let parent = parent_path(&self.path);
                self.list_at(repo, parent)?;
            }
            (TreeView::File, Nav::Down) => self.file.line_down(1),
            (TreeView::File, Nav::Up) => self.file.line_up(1),
            (TreeView::File, Nav::PageDown) => self.file.page_down(),
            (TreeView::File, Nav::PageUp) => self.file.page_up(),
            (TreeView::File, Nav::Back) => self.view = TreeView::Tree,
            _ => {}
        }
        Ok(())
    }

    fn help(&self) -> Vec<HelpEntry> {
        match self.view {
            TreeView::Tree => vec![
                HelpEntry::new("j/k", "move"),
                HelpEntry::new("enter", "open"),
                HelpEntry::new("esc", "up"),
            ],
            TreeView::File => vec![
                HelpEntry::new("j/k", "scroll"),
                HelpEntry::new("f/b", "pgdown/pgup"),
                HelpEntry::new("esc", "back"),
            ],
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer, styles: &Styles) {
        if self.view == TreeView::File {
            (&self.file).render(area, buf);
            return;
        }

        let visible = self
            .entries
            .iter()
            .enumerate()
            .skip(self.cursor.scroll)
            .take(area.height as usize);
        for (row, (i, entry)) in visible.enumerate() {
            let y = area.y + row as u16;
            let active = i == self.cursor.selected;
            let (name, style) = match entry.mode {
                EntryMode::Directory => (format!("{}/", entry.name), styles.tree_dir),
                _ => (entry.name.clone(), styles.tree_file),
            };
            let line = Line::from(vec![
                Span::styled(if active { " > " } else { "   " }, styles.selector),
                Span::styled(name, style),
            ]);
            buf.set_line(area.x, y, &line, area.width);
            if active {
                for x in area.x..area.x + area.width {
                    buf[(x, y)].set_style(styles.tree_cursor);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::tests::context;
    use crate::git::GitRepo;
    use crate::test_support::{commit, init_repo};
    use pretty_assertions::assert_eq;

    fn fixture() -> (tempfile::TempDir, GitRepo) {
        let dir = tempfile::tempdir().unwrap();
        let git = init_repo(dir.path());
        commit(
            &git,
            &[
                ("README.md", Some("# r\n")),
                ("src/lib.rs", Some("pub fn f() {}\n")),
                ("src/util/mod.rs", Some("\n")),
                ("blob.bin", Some("a\0b")),
                ("docs/guide.md", Some("guide\n")),
            ],
            "Init",
            100,
        );
        let repo = GitRepo::new("r", dir.path());
        (dir, repo)
    }

    fn names(page: &TreePage) -> Vec<&str> {
        page.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_root_listing_is_sorted() {
        let (_dir, repo) = fixture();
        let page = TreePage::new(&repo);
        assert_eq!(page.path(), "");
        assert_eq!(names(&page), vec!["docs", "src", "README.md", "blob.bin"]);
    }

    #[test]
    fn test_enter_directory_resets_cursor_and_back_goes_up() {
        let (_dir, repo) = fixture();
        let ctx = context();
        let mut page = TreePage::new(&repo);
        page.set_size(40, 10, &ctx);

        page.handle(Nav::Down, &repo, &ctx).unwrap();
        page.handle(Nav::Select, &repo, &ctx).unwrap();
        assert_eq!(page.path(), "src");
        assert_eq!(page.cursor().selected, 0);
        assert_eq!(names(&page), vec!["util", "lib.rs"]);

        page.handle(Nav::Select, &repo, &ctx).unwrap();
        assert_eq!(page.path(), "src/util");

        page.handle(Nav::Back, &repo, &ctx).unwrap();
        assert_eq!(page.path(), "src");
        page.handle(Nav::Back, &repo, &ctx).unwrap();
        assert_eq!(page.path(), "");

        // The parent of the root is the root
        page.handle(Nav::Back, &repo, &ctx).unwrap();
        assert_eq!(page.path(), "");
        assert_eq!(names(&page), vec!["docs", "src", "README.md", "blob.bin"]);
    }

    #[test]
    fn test_open_file_and_back_keeps_path() {
        let (_dir, repo) = fixture();
        let ctx = context();
        let mut page = TreePage::new(&repo);
        page.set_size(40, 10, &ctx);

        page.handle(Nav::Down, &repo, &ctx).unwrap();
        page.handle(Nav::Select, &repo, &ctx).unwrap();
        page.handle(Nav::Down, &repo, &ctx).unwrap();
        page.handle(Nav::Select, &repo, &ctx).unwrap();

        assert_eq!(page.view(), TreeView::File);
        assert_eq!(page.file_path(), "src/lib.rs");
        assert_eq!(page.file().offset(), 0);
        let first: String = page.file().lines()[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "pub fn f() {}");

        page.handle(Nav::Back, &repo, &ctx).unwrap();
        assert_eq!(page.view(), TreeView::Tree);
        assert_eq!(page.path(), "src");
        assert_eq!(page.cursor().selected, 1);
    }

    #[test]
    fn test_binary_file_is_summarized() {
        let (_dir, repo) = fixture();
        let ctx = context();
        let mut page = TreePage::new(&repo);
        page.set_size(40, 10, &ctx);
        for _ in 0..3 {
            page.handle(Nav::Down, &repo, &ctx).unwrap();
        }
        page.handle(Nav::Select, &repo, &ctx).unwrap();
        assert_eq!(page.file().lines().len(), 1);
        assert_eq!(page.file().lines()[0].spans[0].content, "(binary file, 3 bytes)");
    }

    #[test]
    fn test_help_follows_view() {
        let (_dir, repo) = fixture();
        let ctx = context();
        let mut page = TreePage::new(&repo);
        page.set_size(40, 10, &ctx);
        assert_eq!(page.help()[1], HelpEntry::new("enter", "open"));

        for _ in 0..2 {
            page.handle(Nav::Down, &repo, &ctx).unwrap();
        }
        page.handle(Nav::Select, &repo, &ctx).unwrap();
        assert_eq!(page.help()[1], HelpEntry::new("f/b", "pgdown/pgup"));
    }
}
