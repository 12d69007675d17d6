//! Tree listing
//!
//! Lists one directory level of the HEAD tree, directories first.

use std::cmp::Ordering;
use std::path::Path;

use git2::{ErrorCode, FileMode, ObjectType, Repository, Tree, TreeWalkMode, TreeWalkResult};

use crate::error::{Error, Result};

/// Kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Directory,
    File,
    /// Symlinks, submodules, executables-as-links and the like
    Other,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub mode: EntryMode,
    /// Blob id for regular files
    pub blob: Option<String>,
}

impl TreeEntry {
    pub fn is_dir(&self) -> bool {
        self.mode == EntryMode::Directory
    }
}

/// Directories before files, then by name
pub fn compare_entries(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

/// Join a directory path and an entry name. The root is the empty path.
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Parent of a path. The parent of the root is the root.
pub fn parent_path(path: &str) -> String {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

fn head_tree(repo: &Repository) -> Result<Tree<'_>> {
    Ok(repo.head()?.peel_to_tree()?)
}

fn subtree<'r>(repo: &'r Repository, path: &str) -> Result<Tree<'r>> {
    let root = head_tree(repo)?;
    if path.is_empty() {
        return Ok(root);
    }
    let entry = root
        .get_path(Path::new(path))
        .map_err(|_| Error::NotFound(path.to_string()))?;
    if entry.kind() != Some(ObjectType::Tree) {
        return Err(Error::NotFound(format!("{} is not a directory", path)));
    }
    Ok(entry.to_object(repo)?.peel_to_tree()?)
}

/// List the directory at `path` in the HEAD tree.
///
/// The walk visits only the top level; subtrees are reported but skipped.
/// Names that are not UTF-8 are listed with replacement characters.
pub fn list_directory(repo: &Repository, path: &str) -> Result<Vec<TreeEntry>> {
    // A repository without commits has an empty root
    if path.is_empty() && repo.head().is_err_and(|e| e.code() == ErrorCode::UnbornBranch) {
        return Ok(Vec::new());
    }
    let tree = subtree(repo, path)?;
    let mut entries = Vec::new();

    tree.walk(TreeWalkMode::PreOrder, |_, entry| {
        let mode = match entry.filemode() {
            m if m == i32::from(FileMode::Tree) => EntryMode::Directory,
            m if m == i32::from(FileMode::Blob) || m == i32::from(FileMode::BlobExecutable) => {
                EntryMode::File
            }
            _ => EntryMode::Other,
        };
        entries.push(TreeEntry {
            name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
            mode,
            blob: (mode == EntryMode::File).then(|| entry.id().to_string()),
        });

        if mode == EntryMode::Directory {
            TreeWalkResult::Skip
        } else {
            TreeWalkResult::Ok
        }
    })?;

    entries.sort_by(compare_entries);
    Ok(entries)
}

/// Read a file from the HEAD tree
pub fn read_file(repo: &Repository, path: &str) -> Result<Vec<u8>> {
    let root = head_tree(repo)?;
    let entry = root
        .get_path(Path::new(path))
        .map_err(|_| Error::NotFound(path.to_string()))?;
    let blob = repo
        .find_blob(entry.id())
        .map_err(|_| Error::NotFound(format!("{} is not a file", path)))?;
    Ok(blob.content().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{commit, init_repo};
    use git2::{Oid, Signature, Time};

    fn names(entries: &[TreeEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn fixture() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit(
            &repo,
            &[
                ("zeta.txt", Some("z\n")),
                ("Alpha.md", Some("a\n")),
                ("beta/one.rs", Some("1\n")),
                ("beta/two/deep.rs", Some("2\n")),
                ("alpha/x.txt", Some("x\n")),
                ("Makefile", Some("all:\n")),
            ],
            "Root",
            100,
        );
        (dir, repo)
    }

    #[test]
    fn test_directories_first_then_names() {
        let (_dir, repo) = fixture();
        let entries = list_directory(&repo, "").unwrap();
        assert_eq!(names(&entries), vec!["alpha", "beta", "Alpha.md", "Makefile", "zeta.txt"]);
        assert!(entries[0].is_dir() && entries[0].blob.is_none());
        assert_eq!(entries[2].mode, EntryMode::File);
        assert!(entries[2].blob.is_some());
    }

    #[test]
    fn test_listing_is_one_level() {
        let (_dir, repo) = fixture();
        let entries = list_directory(&repo, "beta").unwrap();
        assert_eq!(names(&entries), vec!["two", "one.rs"]);
    }

    #[test]
    fn test_relisting_is_stable() {
        let (_dir, repo) = fixture();
        let first = list_directory(&repo, "beta").unwrap();
        let second = list_directory(&repo, "beta").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_or_file_path_is_not_found() {
        let (_dir, repo) = fixture();
        assert!(list_directory(&repo, "nope").unwrap_err().is_not_found());
        assert!(list_directory(&repo, "zeta.txt").unwrap_err().is_not_found());
    }

    #[test]
    fn test_read_file_and_blob_id() {
        let (_dir, repo) = fixture();
        assert_eq!(read_file(&repo, "beta/two/deep.rs").unwrap(), b"2\n");
        assert!(read_file(&repo, "beta/missing.rs").unwrap_err().is_not_found());

        let entries = list_directory(&repo, "").unwrap();
        let zeta = entries.iter().find(|e| e.name == "zeta.txt").unwrap();
        let oid = Oid::from_str(zeta.blob.as_ref().unwrap()).unwrap();
        assert_eq!(repo.find_blob(oid).unwrap().content(), b"z\n");
    }

    #[test]
    fn test_non_utf8_name_is_listed_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let blob = repo.blob(b"x\n").unwrap();
        let mut builder = repo.treebuilder(None).unwrap();
        builder.insert(vec![b'f', 0xff, b'o'], blob, 0o100644).unwrap();
        builder.insert("ok.txt", blob, 0o100644).unwrap();
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();
        let sig = Signature::new("Test User", "test@example.com", &Time::new(100, 0)).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Odd name", &tree, &[]).unwrap();

        let entries = list_directory(&repo, "").unwrap();
        assert_eq!(names(&entries), vec!["f\u{FFFD}o", "ok.txt"]);
        assert!(entries.iter().all(|e| e.mode == EntryMode::File));
    }

    #[test]
    fn test_unborn_head_lists_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        assert!(list_directory(&repo, "").unwrap().is_empty());
    }

    #[test]
    fn test_paths() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "b"), "a/b");
        assert_eq!(parent_path("a/b/c"), "a/b");
        assert_eq!(parent_path("a"), "");
        assert_eq!(parent_path(""), "");
    }

    #[test]
    fn test_compare_entries() {
        let dir = TreeEntry { name: "z".to_string(), mode: EntryMode::Directory, blob: None };
        let file = TreeEntry { name: "a".to_string(), mode: EntryMode::File, blob: None };
        let other = TreeEntry { name: "b".to_string(), mode: EntryMode::Other, blob: None };
        assert_eq!(compare_entries(&dir, &file), Ordering::Less);
        assert_eq!(compare_entries(&file, &other), Ordering::Less);
        assert_eq!(compare_entries(&other, &dir), Ordering::Greater);
    }
}
