//! Repository catalog
//!
//! Builds the per-viewer menu: configured repositories first, in their
//! configured order, then anything else discovered in the store. Entries the
//! viewer cannot read are left out, except the `config` repository which is
//! always listed.

use std::fmt;

use thiserror::Error;

use crate::access::{AccessLevel, AccessPolicy, CONFIG_REPO, Viewer};
use crate::browser::BrowserSession;
use crate::config::{Config, DEFAULT_README};
use crate::error::{Error, Result};
use crate::git::RepoSource;

/// One repository in the menu
pub struct MenuEntry {
    /// Display name
    pub name: String,
    /// Repository identity
    pub repo: String,
    /// Configured one-line description, empty for discovered repositories
    pub note: String,
    /// Fixed at build time for this viewer
    pub access: AccessLevel,
    /// Pre-rendered readme; only the control repository has one
    pub readme: Option<String>,
    /// Built the first time the entry is opened
    pub session: Option<BrowserSession>,
}

impl MenuEntry {
    fn new(name: &str, repo: &str, note: &str, access: AccessLevel) -> Self {
        Self {
            name: name.to_string(),
            repo: repo.to_string(),
            note: note.to_string(),
            access,
            readme: None,
            session: None,
        }
    }

    pub fn readable(&self) -> bool {
        self.access > AccessLevel::NoAccess
    }
}

impl fmt::Debug for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuEntry")
            .field("name", &self.name)
            .field("repo", &self.repo)
            .field("access", &self.access)
            .field("readme", &self.readme.as_ref().map(String::len))
            .field("session", &self.session.is_some())
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Nothing readable for this viewer. Carries whatever entries remain
    /// (at most the control repository).
    #[error("no repositories available")]
    Empty { entries: Vec<MenuEntry> },

    #[error(transparent)]
    Build(#[from] Error),
}

/// Build the menu for `viewer`
pub fn build_menu(
    config: &Config,
    policy: &AccessPolicy,
    source: &dyn RepoSource,
    viewer: &Viewer,
) -> std::result::Result<Vec<MenuEntry>, CatalogError> {
    let discovered = source.list_all()?;
    let mut entries: Vec<MenuEntry> = Vec::new();

    let configured = config
        .repos
        .iter()
        .map(|r| (r.name.as_str(), r.repo.as_str(), r.note.as_str(), true));
    let found = discovered.iter().map(|r| (r.as_str(), r.as_str(), "", false));

    for (name, repo, note, is_configured) in configured.chain(found) {
        if entries.iter().any(|e| e.repo == repo) {
            continue;
        }
        if is_configured && !discovered.iter().any(|d| d == repo) {
            tracing::warn!(repo, "configured repository not found in store");
            continue;
        }

        let access = policy.resolve_repo(repo, viewer);
        if access == AccessLevel::NoAccess && repo != CONFIG_REPO {
            continue;
        }

        let mut entry = MenuEntry::new(name, repo, note, access);
        if repo == CONFIG_REPO {
            entry.readme = Some(control_readme(config, source)?);
        }
        entries.push(entry);
    }

    tracing::debug!(
        viewer = ?policy.user_names(viewer),
        entries = entries.len(),
        "built catalog"
    );

    if entries.iter().any(MenuEntry::readable) {
        Ok(entries)
    } else {
        Err(CatalogError::Empty { entries })
    }
}

/// The control repository readme with server fields filled in
fn control_readme(config: &Config, source: &dyn RepoSource) -> Result<String> {
    let readme = source.open(CONFIG_REPO)?.readme();
    let readme = if readme.trim().is_empty() {
        DEFAULT_README.to_string()
    } else {
        readme
    };
    templatize(&readme, config)
}

/// Substitute `{{.Name}}`, `{{.Host}}` and `{{.Port}}`
pub fn templatize(text: &str, config: &Config) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| Error::Template(format!("unclosed action at byte {}", text.len() - rest.len() + start)))?;

        match after[..end].trim() {
            ".Name" => out.push_str(&config.name),
            ".Host" => out.push_str(&config.host),
            ".Port" => out.push_str(&config.port.to_string()),
            field => return Err(Error::Template(format!("unknown field {:?}", field))),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
