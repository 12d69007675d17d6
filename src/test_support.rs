//! Fixtures shared by unit tests: scratch git repositories and SSH keys.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use git2::{Oid, Repository, Signature, Time};

use crate::access::{PublicKey, Viewer};

/// An ed25519 authorized-keys line whose key bytes are all `seed`
pub fn key_line(seed: u8) -> String {
    let mut blob = Vec::new();
    for part in [b"ssh-ed25519".as_slice(), &[seed; 32]] {
        blob.extend_from_slice(&(part.len() as u32).to_be_bytes());
        blob.extend_from_slice(part);
    }
    format!("ssh-ed25519 {} user{seed}@host", STANDARD.encode(blob))
}

pub fn viewer_key(seed: u8) -> Viewer {
    Viewer::Key(PublicKey::parse(&key_line(seed)).unwrap())
}

/// Initialize a repository with a working directory at `path`
pub fn init_repo(path: &Path) -> Repository {
    Repository::init(path).unwrap()
}

/// Commit a set of file changes on top of HEAD.
///
/// `None` content removes the file. `time` is both author and committer time.
pub fn commit(repo: &Repository, files: &[(&str, Option<&str>)], message: &str, time: i64) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full = workdir.join(path);
        match content {
            Some(content) => {
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&full, content).unwrap();
                index.add_path(Path::new(path)).unwrap();
            }
            None => {
                let _ = fs::remove_file(&full);
                index.remove_path(Path::new(path)).unwrap();
            }
        }
    }
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::new("Test User", "test@example.com", &Time::new(time, 0)).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// A repository store directory holding `demo` and `config` repositories
pub fn store_with_repos(root: &Path) {
    let demo = init_repo(&root.join("demo"));
    commit(
        &demo,
        &[
            ("README.md", Some("# Demo\n\nA demo repository.\n")),
            ("src/main.rs", Some("fn main() {}\n")),
        ],
        "Initial commit",
        1_600_000_000,
    );
    commit(
        &demo,
        &[("src/main.rs", Some("fn main() {\n    println!(\"hi\");\n}\n"))],
        "Say hi",
        1_600_000_100,
    );

    let config = init_repo(&root.join("config"));
    commit(
        &config,
        &[("README.md", Some("# Home\n\ngit clone ssh://{{.Host}}:{{.Port}}/config\n"))],
        "Config",
        1_600_000_000,
    );
}
