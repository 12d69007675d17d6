//! softview - access-gated terminal browser for git repositories
//!
//! Presents the repositories of a store as a menu, filtered by what the
//! viewer's key (or lack of one) may read, with a readme, commit log and
//! file tree for each.
//!
//! # Usage
//!
//! ```bash
//! softview                              # Anonymous, default config
//! softview -c server.yaml -k ~/.ssh/id_ed25519.pub
//! softview --repo config                # Open a repository right away
//! ```

mod access;
mod app;
mod browser;
mod catalog;
mod config;
mod error;
mod git;
mod syntax;
#[cfg(test)]
mod test_support;
mod ui;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use access::{AccessPolicy, PublicKey, Viewer};
use config::Config;
use git::{GitRepoSource, RepoSource};
use syntax::Highlighter;

/// Access-gated terminal browser for git repositories
#[derive(Parser, Debug)]
#[command(name = "softview")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Public key file identifying the viewer (anonymous if omitted)
    #[arg(short, long)]
    key: Option<PathBuf>,

    /// Repository to open on start
    #[arg(short, long)]
    repo: Option<String>,

    /// Log file (logs never go to the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("SOFTVIEW_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;
    Ok(())
}

fn read_viewer(path: Option<&Path>) -> Result<Viewer> {
    let Some(path) = path else {
        return Ok(Viewer::Anonymous);
    };
    let line = fs::read_to_string(path).with_context(|| format!("reading key {}", path.display()))?;
    let key = PublicKey::parse(line.trim()).map_err(|reason| anyhow::anyhow!("{}: {}", path.display(), reason))?;
    tracing::debug!(algorithm = key.algorithm(), path = %path.display(), "loaded viewer key");
    Ok(Viewer::Key(key))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(config::default_log_path);
    init_tracing(&log_path)?;

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let config = Config::load(&config_path).with_context(|| format!("loading {}", config_path.display()))?;
    let policy = AccessPolicy::from_config(&config);
    for err in policy.malformed() {
        tracing::warn!(error = %err, "ignoring key");
    }

    // Gate the session the way the server gates a connection
    let viewer = read_viewer(args.key.as_deref())?;
    let admitted = match &viewer {
        Viewer::Anonymous => policy.allows_keyless(),
        key @ Viewer::Key(_) => policy.allows_key(key),
    };
    if !admitted {
        tracing::info!(key = args.key.is_some(), "session refused");
        bail!("access denied");
    }
    tracing::info!(users = ?policy.user_names(&viewer), "session admitted");

    let source: Arc<dyn RepoSource> = Arc::new(GitRepoSource::new(&config.repo_path));
    let highlighter = Arc::new(Highlighter::new());
    let (width, height) = crossterm::terminal::size()?;

    let mut session = app::CatalogSession::new(
        viewer,
        Arc::new(config),
        &policy,
        source,
        highlighter,
        width,
        height,
        args.repo.as_deref(),
    )?;
    session.run()?;

    tracing::info!("session ended");
    Ok(())
}
