//! Access control
//!
//! Decides, per viewer and per repository, what the viewer may do. Keys are
//! matched by comparing their decoded wire-format blobs, never by user name.

use std::collections::HashSet;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::Config;
use crate::error::Error;

/// Identity of the server's own control repository
pub const CONFIG_REPO: &str = "config";

/// Permission tier, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
    NoAccess,
    ReadOnly,
    ReadWrite,
    Admin,
}

impl AccessLevel {
    /// Parse an anonymous access level from configuration.
    ///
    /// Anything other than `no-access`, `read-only` or `read-write` degrades
    /// to `NoAccess`, including `admin-access`.
    pub fn parse_anonymous(value: &str) -> Self {
        match value.trim() {
            "no-access" => AccessLevel::NoAccess,
            "read-only" => AccessLevel::ReadOnly,
            "read-write" => AccessLevel::ReadWrite,
            other => {
                tracing::warn!(value = other, "unknown anon-access level, denying anonymous access");
                AccessLevel::NoAccess
            }
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessLevel::NoAccess => "no-access",
            AccessLevel::ReadOnly => "read-only",
            AccessLevel::ReadWrite => "read-write",
            AccessLevel::Admin => "admin-access",
        };
        f.write_str(s)
    }
}

/// An SSH public key as found in an authorized-keys line
#[derive(Clone)]
pub struct PublicKey {
    algorithm: String,
    blob: Vec<u8>,
}

impl PublicKey {
    /// Parse `<algorithm> <base64 blob> [comment]`
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let algorithm = parts.next().ok_or("empty key")?;
        let data = parts.next().ok_or("missing key data")?;

        let blob = STANDARD
            .decode(data)
            .map_err(|err| format!("invalid base64: {err}"))?;

        // The blob starts with the algorithm name as an SSH string
        let embedded = read_ssh_string(&blob).ok_or("truncated key blob")?;
        if embedded != algorithm.as_bytes() {
            return Err(format!(
                "key type mismatch: line says {algorithm}, blob says {}",
                String::from_utf8_lossy(embedded)
            ));
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            blob,
        })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Base64 of the key blob, as written in authorized-keys files
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.blob)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.blob == other.blob
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_base64();
        let tail = &encoded[encoded.len().saturating_sub(12)..];
        write!(f, "PublicKey({} …{})", self.algorithm, tail)
    }
}

fn read_ssh_string(buf: &[u8]) -> Option<&[u8]> {
    let len_bytes: [u8; 4] = buf.get(..4)?.try_into().ok()?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    buf.get(4..4 + len)
}

/// The identity attempting to browse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Key(PublicKey),
}

/// What the policy needs to know about a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDescriptor {
    pub identity: String,
    pub private: bool,
}

#[derive(Debug, Clone)]
struct RegisteredUser {
    name: String,
    admin: bool,
    collab_repos: HashSet<String>,
    keys: Vec<PublicKey>,
}

/// Resolves access levels from the parsed credential registry
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    anon_access: AccessLevel,
    allow_keyless: bool,
    repos: Vec<RepoDescriptor>,
    users: Vec<RegisteredUser>,
    malformed: Vec<(String, String)>,
}

impl AccessPolicy {
    /// Build the policy, parsing every stored key once.
    ///
    /// Malformed keys are logged and skipped; the rest of the registry stays
    /// usable.
    pub fn from_config(config: &Config) -> Self {
        let mut malformed = Vec::new();
        let users = config
            .users
            .iter()
            .map(|user| {
                let keys = user
                    .public_keys
                    .iter()
                    .filter_map(|line| match PublicKey::parse(line.trim()) {
                        Ok(key) => Some(key),
                        Err(reason) => {
                            tracing::warn!(user = %user.name, key = %line.trim(), %reason, "malformed authorized key");
                            malformed.push((user.name.clone(), reason));
                            None
                        }
                    })
                    .collect();
                RegisteredUser {
                    name: user.name.clone(),
                    admin: user.admin,
                    collab_repos: user.collab_repos.iter().cloned().collect(),
                    keys,
                }
            })
            .collect();

        let repos = config
            .repos
            .iter()
            .map(|r| RepoDescriptor {
                identity: r.repo.clone(),
                private: r.private,
            })
            .collect();

        Self {
            anon_access: config.anon_access,
            allow_keyless: config.allow_keyless,
            repos,
            users,
            malformed,
        }
    }

    /// Errors for every stored key that failed to parse
    pub fn malformed(&self) -> Vec<Error> {
        self.malformed
            .iter()
            .map(|(user, reason)| Error::Policy {
                user: user.clone(),
                reason: reason.clone(),
            })
            .collect()
    }

    /// Descriptor for a repository identity, using configured flags if any
    pub fn descriptor(&self, identity: &str) -> RepoDescriptor {
        self.repos
            .iter()
            .find(|r| r.identity == identity)
            .cloned()
            .unwrap_or_else(|| RepoDescriptor {
                identity: identity.to_string(),
                private: false,
            })
    }

    /// Access level of `viewer` on the repository named `identity`
    pub fn resolve_repo(&self, identity: &str, viewer: &Viewer) -> AccessLevel {
        self.resolve(&self.descriptor(identity), viewer)
    }

    /// Access level of `viewer` on `repo`
    pub fn resolve(&self, repo: &RepoDescriptor, viewer: &Viewer) -> AccessLevel {
        let private = repo.private || repo.identity == CONFIG_REPO;
        let matched: Vec<&RegisteredUser> = match viewer {
            Viewer::Anonymous => Vec::new(),
            Viewer::Key(key) => self
                .users
                .iter()
                .filter(|u| u.keys.iter().any(|k| k == key))
                .collect(),
        };

        if matched.iter().any(|u| u.admin) {
            return AccessLevel::Admin;
        }
        if matched.iter().any(|u| u.collab_repos.contains(&repo.identity)) {
            return AccessLevel::ReadWrite;
        }
        if !matched.is_empty() && !private {
            return AccessLevel::ReadOnly;
        }

        if private && self.anon_access != AccessLevel::ReadWrite {
            return AccessLevel::NoAccess;
        }
        match self.anon_access {
            AccessLevel::ReadOnly => AccessLevel::ReadOnly,
            AccessLevel::ReadWrite => AccessLevel::ReadWrite,
            AccessLevel::NoAccess | AccessLevel::Admin => AccessLevel::NoAccess,
        }
    }

    /// Whether keyless (password) sessions are admitted
    pub fn allows_keyless(&self) -> bool {
        self.anon_access != AccessLevel::NoAccess && self.allow_keyless
    }

    /// Whether a key-authenticated viewer is admitted at all
    pub fn allows_key(&self, viewer: &Viewer) -> bool {
        self.resolve_repo("", viewer) != AccessLevel::NoAccess
    }

    /// Registered user names matching a viewer, for logging
    pub fn user_names(&self, viewer: &Viewer) -> Vec<&str> {
        match viewer {
            Viewer::Anonymous => Vec::new(),
            Viewer::Key(key) => self
                .users
                .iter()
                .filter(|u| u.keys.contains(key))
                .map(|u| u.name.as_str())
                .collect(),
        }
    }
}
