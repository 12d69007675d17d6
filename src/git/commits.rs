//! Commit listing
//!
//! Walks the history reachable from HEAD and orders it newest first by
//! author time.

use chrono::{DateTime, FixedOffset, TimeZone};
use git2::Repository;

use crate::error::Result;

/// Represents a git commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full commit hash
    pub hash: String,
    /// Author as `Name <email>`
    pub author: String,
    /// Author time, seconds since the epoch
    pub author_time: i64,
    /// Committer time, seconds since the epoch
    pub commit_time: i64,
    /// Committer time zone offset in minutes
    pub commit_offset: i32,
    /// Full commit message
    pub message: String,
    /// Parent hashes, first parent first
    pub parents: Vec<String>,
}

impl Commit {
    pub fn from_git(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();
        let committer = commit.committer();
        Self {
            hash: commit.id().to_string(),
            author: format!(
                "{} <{}>",
                author.name().unwrap_or("Unknown"),
                author.email().unwrap_or("")
            ),
            author_time: author.when().seconds(),
            commit_time: committer.when().seconds(),
            commit_offset: committer.when().offset_minutes(),
            message: String::from_utf8_lossy(commit.message_bytes()).to_string(),
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        }
    }

    /// Abbreviated hash (7 characters)
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Commit time in the committer's own zone
    pub fn commit_date(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.commit_offset * 60)?;
        offset.timestamp_opt(self.commit_time, 0).single()
    }

    /// Commit time in the fixed header format, e.g. `Sun Sep 13 12:26:40 2020 +0000`
    pub fn formatted_date(&self) -> String {
        self.commit_date()
            .map(|d| d.format("%a %b %e %H:%M:%S %Y %z").to_string())
            .unwrap_or_else(|| self.commit_time.to_string())
    }
}

/// Order commits newest first by author time.
///
/// A full re-sort; the ordering is never maintained incrementally.
pub fn sort_commits(commits: &mut [Commit]) {
    commits.sort_by(|a, b| b.author_time.cmp(&a.author_time));
}

/// List all commits reachable from HEAD, newest first
pub fn list_commits(repo: &Repository) -> Result<Vec<Commit>> {
    // An unborn HEAD means an empty history, not an error
    let head_oid = match repo.head() {
        Ok(head) => match head.target() {
            Some(oid) => oid,
            None => return Ok(Vec::new()),
        },
        Err(_) => return Ok(Vec::new()),
    };

    let mut revwalk = repo.revwalk()?;
    revwalk.push(head_oid)?;

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result?;
        let commit = repo.find_commit(oid)?;
        commits.push(Commit::from_git(&commit));
    }

    sort_commits(&mut commits);
    Ok(commits)
}
