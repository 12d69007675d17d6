//! Log page: commit list and commit detail

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::{MAX_RENDER_WIDTH, Nav, PageView, SessionContext};
use crate::error::Result;
use crate::git::{Commit, Repo, sort_commits};
use crate::ui::diffstat::render_diff;
use crate::ui::{HelpEntry, ListCursor, Styles, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogView {
    List,
    Detail,
}

pub struct LogPage {
    commits: Vec<Commit>,
    cursor: ListCursor,
    view: LogView,
    detail: Viewport,
    width: u16,
    height: u16,
}

impl LogPage {
    /// Build the page with the repository's current history.
    ///
    /// A failed fetch leaves the list empty; it is retried on entering the page.
    pub fn new(repo: &dyn Repo) -> Self {
        let mut page = Self {
            commits: Vec::new(),
            cursor: ListCursor::default(),
            view: LogView::List,
            detail: Viewport::new(),
            width: 0,
            height: 0,
        };
        if let Err(err) = page.reload(repo) {
            tracing::warn!(repo = repo.name(), error = %err, "failed to load commits");
        }
        page
    }

    #[cfg(test)]
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    #[cfg(test)]
    pub fn cursor(&self) -> ListCursor {
        self.cursor
    }

    #[cfg(test)]
    pub fn view(&self) -> LogView {
        self.view
    }

    #[cfg(test)]
    pub fn detail(&self) -> &Viewport {
        &self.detail
    }

    #[cfg(test)]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn selected(&self) -> Option<&Commit> {
        self.commits.get(self.cursor.selected)
    }

    /// Fetch and re-sort the whole history
    fn reload(&mut self, repo: &dyn Repo) -> Result<()> {
        let mut commits = repo.commits()?;
        sort_commits(&mut commits);
        self.commits = commits;
        self.cursor.clamp(self.commits.len(), self.height as usize);
        Ok(())
    }

    /// Compose the detail view of the selected commit
    fn compose_detail(&self, repo: &dyn Repo, ctx: &SessionContext) -> Result<Vec<Line<'static>>> {
        let Some(commit) = self.selected() else {
            return Ok(Vec::new());
        };
        let styles = &ctx.styles;
        let width = self.width.min(MAX_RENDER_WIDTH);

        let mut lines = vec![
            Line::styled(format!("commit {}", commit.hash), styles.commit_hash),
            Line::styled(format!("Author: {}", commit.author), styles.commit_author),
            Line::styled(format!("Date:   {}", commit.formatted_date()), styles.commit_date),
        ];
        lines.extend(
            commit
                .message
                .trim()
                .lines()
                .map(|l| Line::styled(l.to_string(), styles.commit_body)),
        );

        let diff = repo.diff(commit, &ctx.limits)?;
        let rendered = render_diff(&diff, ctx.highlighter.as_ref(), width, styles);

        lines.push(Line::default());
        lines.extend(rendered.histogram);
        if let Some(body) = rendered.body {
            lines.push(Line::default());
            lines.extend(body);
        } else if let Some(reason) = rendered.omitted {
            lines.push(Line::default());
            lines.push(Line::styled(format!("Diff not shown: {}", reason), styles.menu_note));
        }
        Ok(lines)
    }
}

impl PageView for LogPage {
    fn set_size(&mut self, width: u16, height: u16, _ctx: &SessionContext) {
        self.width = width;
        self.height = height;
        self.detail.set_height(height as usize);
        self.cursor.clamp(self.commits.len(), height as usize);
    }

    fn enter(&mut self, repo: &dyn Repo, _ctx: &SessionContext) -> Result<()> {
        self.reload(repo)
    }

    fn handle(&mut self, nav: Nav, repo: &dyn Repo, ctx: &SessionContext) -> Result<()> {
        match (self.view, nav) {
            (LogView::List, Nav::Down) => self.cursor.down(self.commits.len(), self.height as usize),
            (LogView::List, Nav::Up) => self.cursor.up(self.height as usize),
            (LogView::List, Nav::Select) => {
                if self.selected().is_some() {
                    let lines = self.compose_detail(repo, ctx)?;
                    self.detail.set_content(lines);
                    self.detail.goto_top();
                    self.view = LogView::Detail;
                }
            }
            (LogView::Detail, Nav::Down) => self.detail.line_down(1),
            (LogView::Detail, Nav::Up) => self.detail.line_up(1),
            (LogView::Detail, Nav::PageDown) => self.detail.page_down(),
            (LogView::Detail, Nav::PageUp) => self.detail.page_up(),
            (LogView::Detail, Nav::Back) => self.view = LogView::List,
            _ => {}
        }
        Ok(())
    }

    fn help(&self) -> Vec<HelpEntry> {
        match self.view {
            LogView::List => vec![HelpEntry::new("j/k", "move"), HelpEntry::new("enter", "select")],
            LogView::Detail => vec![
                HelpEntry::new("j/k", "scroll"),
                HelpEntry::new("f/b", "pgdown/pgup"),
                HelpEntry::new("esc", "back"),
            ],
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer, styles: &Styles) {
        if self.view == LogView::Detail {
            (&self.detail).render(area, buf);
            return;
        }

        let visible = self
            .commits
            .iter()
            .enumerate()
            .skip(self.cursor.scroll)
            .take(area.height as usize);
        for (row, (i, commit)) in visible.enumerate() {
            let active = i == self.cursor.selected;
            let line = Line::from(vec![
                Span::styled(if active { " > " } else { "   " }, styles.selector),
                Span::styled(format!("{} ", commit.short_hash()), styles.log_hash),
                Span::styled(
                    commit.subject().to_string(),
                    if active { styles.log_active } else { styles.log_inactive },
                ),
            ]);
            buf.set_line(area.x, area.y + row as u16, &line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::tests::{context, highlighter};
    use crate::config::{Config, Limits};
    use crate::git::{GitRepo, Repo};
    use crate::test_support::{commit, init_repo, store_with_repos};
    use pretty_assertions::assert_eq;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_commits_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        store_with_repos(dir.path());
        let repo = GitRepo::new("demo", &dir.path().join("demo"));
        let page = LogPage::new(&repo);
        let subjects: Vec<&str> = page.commits().iter().map(|c| c.subject()).collect();
        assert_eq!(subjects, vec!["Say hi", "Initial commit"]);
    }

    #[test]
    fn test_detail_composition() {
        let dir = tempfile::tempdir().unwrap();
        store_with_repos(dir.path());
        let repo = GitRepo::new("demo", &dir.path().join("demo"));
        let ctx = context();
        let mut page = LogPage::new(&repo);
        page.set_size(80, 10, &ctx);

        page.handle(Nav::Select, &repo, &ctx).unwrap();
        assert_eq!(page.view(), LogView::Detail);

        let lines: Vec<String> = page.detail().lines().iter().map(text).collect();
        let hash = &page.commits()[0].hash;
        assert_eq!(lines[0], format!("commit {}", hash));
        assert_eq!(lines[1], "Author: Test User <test@example.com>");
        assert_eq!(lines[2], "Date:   Sun Sep 13 12:28:20 2020 +0000");
        assert_eq!(lines[3], "Say hi");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], " src/main.rs | 4 +++-");
        assert!(lines.iter().any(|l| l == "diff --git a/src/main.rs b/src/main.rs"));
        assert!(lines.iter().any(|l| l == "+    println!(\"hi\");"));
    }

    #[test]
    fn test_detail_over_line_limit_omits_body() {
        let dir = tempfile::tempdir().unwrap();
        store_with_repos(dir.path());
        let repo = GitRepo::new("demo", &dir.path().join("demo"));
        let config = Config {
            limits: Limits {
                max_diff_files: 10,
                max_diff_lines: 2,
            },
            ..Config::default()
        };
        let ctx = SessionContext::from_config(&config, Styles::new(), highlighter());
        let mut page = LogPage::new(&repo);
        page.set_size(80, 40, &ctx);
        page.handle(Nav::Select, &repo, &ctx).unwrap();

        let lines: Vec<String> = page.detail().lines().iter().map(text).collect();
        assert_eq!(lines[5], " src/main.rs | 4 +++-");
        assert_eq!(lines.last().unwrap(), "Diff not shown: 4 diff lines exceed the limit of 2");
        assert!(!lines.iter().any(|l| l.starts_with("diff --git")));
    }

    #[test]
    fn test_detail_resets_scroll_and_back_returns_to_list() {
        let dir = tempfile::tempdir().unwrap();
        store_with_repos(dir.path());
        let repo = GitRepo::new("demo", &dir.path().join("demo"));
        let ctx = context();
        let mut page = LogPage::new(&repo);
        page.set_size(80, 3, &ctx);

        page.handle(Nav::Select, &repo, &ctx).unwrap();
        page.handle(Nav::PageDown, &repo, &ctx).unwrap();
        assert!(page.detail().offset() > 0);

        page.handle(Nav::Back, &repo, &ctx).unwrap();
        assert_eq!(page.view(), LogView::List);
        page.handle(Nav::Down, &repo, &ctx).unwrap();
        page.handle(Nav::Select, &repo, &ctx).unwrap();
        assert_eq!(page.detail().offset(), 0);

        let lines: Vec<String> = page.detail().lines().iter().map(text).collect();
        assert_eq!(lines[3], "Initial commit");
    }

    #[test]
    fn test_root_commit_shows_only_additions() {
        let dir = tempfile::tempdir().unwrap();
        store_with_repos(dir.path());
        let repo = GitRepo::new("demo", &dir.path().join("demo"));
        let ctx = context();
        let mut page = LogPage::new(&repo);
        page.set_size(80, 40, &ctx);
        page.handle(Nav::Down, &repo, &ctx).unwrap();
        page.handle(Nav::Select, &repo, &ctx).unwrap();

        let lines: Vec<String> = page.detail().lines().iter().map(text).collect();
        assert!(lines.contains(&" README.md   | 3 +++".to_string()));
        assert!(lines.contains(&" src/main.rs | 1 +".to_string()));
        assert!(lines.contains(&"--- /dev/null".to_string()));
    }

    #[test]
    fn test_reentering_refetches() {
        let dir = tempfile::tempdir().unwrap();
        let git = init_repo(dir.path());
        commit(&git, &[("a", Some("a\n"))], "First", 100);
        let repo = GitRepo::new("r", dir.path());
        let ctx = context();
        let mut page = LogPage::new(&repo);
        assert_eq!(page.commits().len(), 1);

        commit(&git, &[("a", Some("b\n"))], "Second", 200);
        page.enter(&repo, &ctx).unwrap();
        assert_eq!(page.commits()[0].subject(), "Second");
    }

    #[test]
    fn test_empty_history_select_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let repo = GitRepo::new("empty", dir.path());
        let ctx = context();
        let mut page = LogPage::new(&repo);
        page.handle(Nav::Select, &repo, &ctx).unwrap();
        assert_eq!(page.view(), LogView::List);
        assert!(repo.commits().unwrap().is_empty());
    }
}
