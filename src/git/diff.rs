//! Git diff computation
//!
//! Diffs a commit against its first parent (or the empty tree for a root
//! commit) and parses the output into structured data for display.

use git2::{Delta, Diff, DiffDelta, DiffFormat, DiffOptions, Oid, Patch, Repository};

use crate::config::Limits;
use crate::error::{Error, Result};

/// Type of a diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Line exists in both old and new (context line)
    Context,
    /// Line was added
    Added,
    /// Line was removed
    Removed,
}

impl LineType {
    fn prefix(self) -> char {
        match self {
            LineType::Context => ' ',
            LineType::Added => '+',
            LineType::Removed => '-',
        }
    }
}

/// A single line in a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub line_type: LineType,
    /// The content of the line (without +/- prefix or newline)
    pub content: String,
}

/// A hunk (section) of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub new_start: u32,
    /// The header text (@@...@@)
    pub header: String,
    pub lines: Vec<DiffLine>,
}

/// How a file changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Other,
}

/// Diff for a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path to the file (new path if renamed)
    pub path: String,
    /// Old path (if renamed/moved)
    pub old_path: Option<String>,
    pub status: DiffStatus,
    /// Lines added
    pub added: usize,
    /// Lines removed
    pub removed: usize,
    pub hunks: Vec<Hunk>,
    pub is_binary: bool,
}

impl FileDiff {
    pub fn new(path: &str, status: DiffStatus) -> Self {
        Self {
            path: path.to_string(),
            old_path: None,
            status,
            added: 0,
            removed: 0,
            hunks: Vec::new(),
            is_binary: false,
        }
    }

    /// Unified patch text for this file
    pub fn to_patch(&self) -> String {
        let old = self.old_path.as_deref().unwrap_or(&self.path);
        let mut out = format!("diff --git a/{} b/{}\n", old, self.path);

        if self.is_binary {
            out.push_str(&format!("Binary files a/{} and b/{} differ\n", old, self.path));
            return out;
        }
        if self.hunks.is_empty() {
            return out;
        }

        match self.status {
            DiffStatus::Added => out.push_str("--- /dev/null\n"),
            _ => out.push_str(&format!("--- a/{}\n", old)),
        }
        match self.status {
            DiffStatus::Deleted => out.push_str("+++ /dev/null\n"),
            _ => out.push_str(&format!("+++ b/{}\n", self.path)),
        }

        for hunk in &self.hunks {
            out.push_str(&hunk.header);
            out.push('\n');
            for line in &hunk.lines {
                out.push(line.line_type.prefix());
                out.push_str(&line.content);
                out.push('\n');
            }
        }
        out
    }
}

/// Unified patch text for a whole commit
pub fn patch_text(files: &[FileDiff]) -> String {
    files.iter().map(FileDiff::to_patch).collect()
}

/// Changed files of a commit. Hunks are only loaded when the diff is
/// within the configured limits.
#[derive(Debug, Clone, Default)]
pub struct CommitDiff {
    pub files: Vec<FileDiff>,
    /// Why hunks were not loaded
    pub omitted: Option<String>,
}

/// Diff a commit against its first parent.
///
/// A root commit is diffed against the empty tree, so every file shows as
/// added. Later parents of a merge are never diffed.
///
/// Per-file counts are always filled in. Hunk lines are read only after the
/// file and line counts have been checked against `limits`.
pub fn compute_commit_diff(repo: &Repository, hash: &str, limits: &Limits) -> Result<CommitDiff> {
    let oid = Oid::from_str(hash).map_err(|_| Error::NotFound(format!("commit {hash}")))?;
    let commit = repo.find_commit(oid)?;
    let tree = commit.tree()?;

    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let mut opts = DiffOptions::new();
    opts.context_lines(3);

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

    if diff.deltas().len() > limits.max_diff_files {
        let omitted = format!(
            "{} changed files exceed the limit of {}",
            diff.deltas().len(),
            limits.max_diff_files
        );
        return Ok(CommitDiff {
            files: summarize(&diff)?.0,
            omitted: Some(omitted),
        });
    }

    let (mut files, lines) = summarize(&diff)?;
    if lines > limits.max_diff_lines {
        let omitted = format!("{} diff lines exceed the limit of {}", lines, limits.max_diff_lines);
        return Ok(CommitDiff {
            files,
            omitted: Some(omitted),
        });
    }

    let omitted = if load_hunks(&diff, &mut files, limits.max_diff_lines)? {
        None
    } else {
        Some(format!("diff exceeds the limit of {} lines", limits.max_diff_lines))
    };
    Ok(CommitDiff { files, omitted })
}

fn delta_status(status: Delta) -> DiffStatus {
    match status {
        Delta::Added => DiffStatus::Added,
        Delta::Deleted => DiffStatus::Deleted,
        Delta::Modified => DiffStatus::Modified,
        Delta::Renamed => DiffStatus::Renamed,
        _ => DiffStatus::Other,
    }
}

fn delta_path(delta: &DiffDelta) -> String {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// One hunk-less `FileDiff` per delta with its line counts, plus the number
/// of hunk lines across all files. Each patch is dropped after counting.
fn summarize(diff: &Diff) -> Result<(Vec<FileDiff>, usize)> {
    let mut files = Vec::with_capacity(diff.deltas().len());
    let mut lines = 0;

    for idx in 0..diff.deltas().len() {
        let Some(patch) = Patch::from_diff(diff, idx)? else {
            if let Some(delta) = diff.get_delta(idx) {
                let mut file = FileDiff::new(&delta_path(&delta), delta_status(delta.status()));
                file.is_binary = delta.flags().is_binary();
                files.push(file);
            }
            continue;
        };

        let delta = patch.delta();
        let path = delta_path(&delta);
        let mut file = FileDiff::new(&path, delta_status(delta.status()));
        file.old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().to_string())
            .filter(|p| p != &path);
        file.is_binary = delta.flags().is_binary();

        let (context, added, removed) = patch.line_stats()?;
        file.added = added;
        file.removed = removed;
        lines += context + added + removed;
        files.push(file);
    }

    Ok((files, lines))
}

/// Read hunks into `files`, which come from [`summarize`] on the same diff.
///
/// Stops as soon as more than `budget` hunk lines have been seen; the hunks
/// read so far are then discarded and `false` is returned.
fn load_hunks(diff: &Diff, files: &mut [FileDiff], budget: usize) -> Result<bool> {
    let mut current: Option<usize> = None;
    let mut seen = 0;
    let mut exceeded = false;

    let printed = diff.print(DiffFormat::Patch, |delta, hunk, line| {
        let path = delta_path(&delta);
        if current.is_none_or(|i| files[i].path != path) {
            current = files.iter().position(|f| f.path == path);
        }
        let Some(file) = current.map(|i| &mut files[i]) else {
            return true;
        };

        // Start a new hunk when the position changes
        if let Some(h) = hunk {
            let is_new_hunk = file
                .hunks
                .last()
                .is_none_or(|c| c.old_start != h.old_start() || c.new_start != h.new_start());
            if is_new_hunk {
                file.hunks.push(Hunk {
                    old_start: h.old_start(),
                    new_start: h.new_start(),
                    header: String::from_utf8_lossy(h.header()).trim().to_string(),
                    lines: Vec::new(),
                });
            }
        }

        let line_type = match line.origin() {
            '+' => LineType::Added,
            '-' => LineType::Removed,
            ' ' => LineType::Context,
            _ => return true, // Skip file headers and binary markers
        };

        seen += 1;
        if seen > budget {
            exceeded = true;
            return false;
        }

        if let Some(h) = file.hunks.last_mut() {
            h.lines.push(DiffLine {
                line_type,
                content: String::from_utf8_lossy(line.content())
                    .trim_end_matches(['\n', '\r'])
                    .to_string(),
            });
        }
        true
    });

    if exceeded {
        for file in files.iter_mut() {
            file.hunks.clear();
        }
        return Ok(false);
    }
    printed?;
    Ok(true)
}
