//! Git operations module
//!
//! Provides read-only access to repositories:
//! - Repository discovery and the repository capability trait
//! - Commit listing
//! - First-parent diff computation
//! - Directory listing and file reads

mod commits;
mod diff;
mod repo;
mod source;
mod tree;

pub use commits::{Commit, sort_commits};
pub use diff::{CommitDiff, FileDiff, patch_text};
#[cfg(test)]
pub use diff::DiffStatus;
#[cfg(test)]
pub use repo::GitRepo;
pub use repo::Repo;
pub use source::{GitRepoSource, RepoSource};
pub use tree::{EntryMode, TreeEntry, join_path, parent_path};
