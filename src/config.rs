//! Server configuration
//!
//! Loaded from a YAML file. Every field has a default so a partial file,
//! or no file at all, still yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::access::AccessLevel;
use crate::error::Result;

/// Welcome readme for the control repository, used when it has none
pub const DEFAULT_README: &str = "# Soft Serve\n\n Welcome! You can configure your Soft Serve server by cloning this repo and pushing changes.\n\n```\ngit clone ssh://{{.Host}}:{{.Port}}/config\n```";

/// A repository listed in the menu
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct RepoConfig {
    /// Display name
    pub name: String,
    /// Repository identity in the store
    pub repo: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub note: String,
}

/// A registered user
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserConfig {
    pub name: String,
    pub admin: bool,
    pub public_keys: Vec<String>,
    pub collab_repos: Vec<String>,
}

/// Bounds on diff rendering work
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Limits {
    /// Most changed files a diff body is rendered for
    pub max_diff_files: usize,
    /// Most raw diff lines a diff body is rendered for
    pub max_diff_lines: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_diff_files: 100,
            max_diff_lines: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Server name shown in the title bar
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(deserialize_with = "deserialize_anon_access")]
    pub anon_access: AccessLevel,
    pub allow_keyless: bool,
    /// Directory holding the repositories
    pub repo_path: PathBuf,
    pub repos: Vec<RepoConfig>,
    pub users: Vec<UserConfig>,
    pub limits: Limits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "Soft Serve".to_string(),
            host: "localhost".to_string(),
            port: 23231,
            anon_access: AccessLevel::ReadOnly,
            allow_keyless: true,
            repo_path: PathBuf::from(".repos"),
            repos: vec![RepoConfig {
                name: "Home".to_string(),
                repo: "config".to_string(),
                private: true,
                note: "Configuration and content repo for this server".to_string(),
            }],
            users: Vec::new(),
            limits: Limits::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from YAML text
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load the configuration at `path`, or the default one if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let mut config = Self::parse(&text)?;

        // Relative repo paths are relative to the config file
        if config.repo_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.repo_path = dir.join(&config.repo_path);
            }
        }

        tracing::info!(
            path = %path.display(),
            repos = config.repos.len(),
            users = config.users.len(),
            "loaded config"
        );
        Ok(config)
    }
}

/// Default config file location for this platform
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "softview")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("config.yaml"))
}

/// Default log file location for this platform
pub fn default_log_path() -> PathBuf {
    ProjectDirs::from("", "", "softview")
        .map(|dirs| dirs.data_local_dir().join("softview.log"))
        .unwrap_or_else(|| PathBuf::from("softview.log"))
}

fn deserialize_anon_access<'de, D>(deserializer: D) -> std::result::Result<AccessLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(AccessLevel::parse_anonymous(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.repos[0].repo, "config");
        assert!(config.repos[0].private);
    }

    #[test]
    fn test_parse_full_config() {
        let text = r#"
name: Test Server
host: git.example.com
port: 22
anon-access: no-access
allow-keyless: false
repos:
  - name: Home
    repo: config
    private: true
  - name: Demo
    repo: demo
    note: "a demo"
users:
  - name: Alice
    admin: true
    public-keys:
      - ssh-ed25519 AAAA alice
  - name: Bob
    collab-repos:
      - demo
limits:
  max-diff-files: 5
"#;
        let config = Config::parse(text).unwrap();
        assert_eq!(config.name, "Test Server");
        assert_eq!(config.port, 22);
        assert_eq!(config.anon_access, AccessLevel::NoAccess);
        assert!(!config.allow_keyless);
        assert_eq!(config.repos.len(), 2);
        assert!(config.repos[0].private);
        assert!(!config.repos[1].private);
        assert_eq!(config.repos[1].note, "a demo");
        assert_eq!(config.users[1].collab_repos, vec!["demo".to_string()]);
        assert!(config.users[1].public_keys.is_empty());
        assert_eq!(config.limits.max_diff_files, 5);
        assert_eq!(config.limits.max_diff_lines, 1000);
    }

    #[test]
    fn test_unknown_anon_access_degrades() {
        let config = Config::parse("anon-access: everyone\n").unwrap();
        assert_eq!(config.anon_access, AccessLevel::NoAccess);

        let config = Config::parse("anon-access: admin-access\n").unwrap();
        assert_eq!(config.anon_access, AccessLevel::NoAccess);
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        assert!(Config::parse("repos: [unclosed").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_resolves_relative_repo_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "repo-path: repos\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.repo_path, dir.path().join("repos"));
    }
}
