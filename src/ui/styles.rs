//! UI styles
//!
//! Defines consistent styling for the entire application. A single
//! [`Styles`] value is built at session start and handed to every widget.

use ratatui::style::{Color, Modifier, Style};

/// Color palette
pub mod colors {
    use ratatui::style::Color;

    // Base colors
    pub const FG: Color = Color::White;
    pub const DIM: Color = Color::DarkGray;

    // Title bar
    pub const TITLE_BG: Color = Color::Rgb(108, 80, 255);
    pub const TITLE_FG: Color = Color::Rgb(255, 253, 245);

    // Repo header
    pub const REPO_TITLE: Color = Color::Rgb(255, 95, 210);
    pub const REPO_NOTE: Color = Color::Rgb(133, 133, 133);

    // Footer
    pub const FOOTER_BG: Color = Color::Rgb(40, 44, 52);
    pub const FOOTER_FG: Color = Color::DarkGray;

    // Stats
    pub const STATS_ADDED: Color = Color::Green;
    pub const STATS_REMOVED: Color = Color::Red;

    // Selection
    pub const SELECTOR: Color = Color::Rgb(255, 95, 210);
    pub const CURSOR_BG: Color = Color::Rgb(60, 60, 80);

    // Log
    pub const HASH: Color = Color::Rgb(163, 163, 163);
    pub const AUTHOR: Color = Color::Rgb(135, 175, 255);
    pub const DATE: Color = Color::Rgb(175, 175, 135);

    // Tree
    pub const DIRECTORY: Color = Color::Rgb(0, 175, 255);

    // Borders
    pub const BORDER: Color = Color::DarkGray;
    pub const BORDER_FOCUS: Color = Color::Rgb(255, 95, 210);

    // Popup
    pub const POPUP_BG: Color = Color::Rgb(30, 34, 42);
    pub const ERROR: Color = Color::Rgb(255, 95, 95);
}

/// Collection of styles used throughout the UI
#[derive(Debug, Clone)]
pub struct Styles {
    // Title bar / footer
    pub title: Style,
    pub footer: Style,

    // Repo header
    pub repo_title: Style,
    pub repo_note: Style,

    // Menu
    pub menu_item: Style,
    pub menu_cursor: Style,
    pub menu_note: Style,

    // Log list and commit detail
    pub selector: Style,
    pub log_hash: Style,
    pub log_active: Style,
    pub log_inactive: Style,
    pub commit_hash: Style,
    pub commit_author: Style,
    pub commit_date: Style,
    pub commit_body: Style,

    // Stats
    pub stats_added: Style,
    pub stats_removed: Style,

    // Tree
    pub tree_dir: Style,
    pub tree_file: Style,
    pub tree_cursor: Style,

    // Borders
    pub border: Style,
    pub border_focus: Style,

    // Popup
    pub popup: Style,
    pub popup_title: Style,
    pub error: Style,

    // Help
    pub help_key: Style,
    pub help_desc: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self::new()
    }
}

impl Styles {
    /// Create a new Styles instance with default values
    pub fn new() -> Self {
        Self {
            title: Style::default()
                .bg(colors::TITLE_BG)
                .fg(colors::TITLE_FG)
                .add_modifier(Modifier::BOLD),
            footer: Style::default().bg(colors::FOOTER_BG).fg(colors::FOOTER_FG),

            repo_title: Style::default()
                .fg(colors::REPO_TITLE)
                .add_modifier(Modifier::BOLD),
            repo_note: Style::default().fg(colors::REPO_NOTE),

            menu_item: Style::default().fg(colors::FG),
            menu_cursor: Style::default()
                .bg(colors::CURSOR_BG)
                .fg(colors::FG)
                .add_modifier(Modifier::BOLD),
            menu_note: Style::default().fg(colors::DIM),

            selector: Style::default().fg(colors::SELECTOR),
            log_hash: Style::default().fg(colors::HASH),
            log_active: Style::default()
                .fg(colors::FG)
                .add_modifier(Modifier::BOLD),
            log_inactive: Style::default().fg(colors::REPO_NOTE),
            commit_hash: Style::default().fg(colors::HASH),
            commit_author: Style::default().fg(colors::AUTHOR),
            commit_date: Style::default().fg(colors::DATE),
            commit_body: Style::default().fg(colors::FG),

            stats_added: Style::default()
                .fg(colors::STATS_ADDED)
                .add_modifier(Modifier::BOLD),
            stats_removed: Style::default()
                .fg(colors::STATS_REMOVED)
                .add_modifier(Modifier::BOLD),

            tree_dir: Style::default()
                .fg(colors::DIRECTORY)
                .add_modifier(Modifier::BOLD),
            tree_file: Style::default().fg(colors::FG),
            tree_cursor: Style::default().bg(colors::CURSOR_BG),

            border: Style::default().fg(colors::BORDER),
            border_focus: Style::default().fg(colors::BORDER_FOCUS),

            popup: Style::default().bg(colors::POPUP_BG).fg(colors::FG),
            popup_title: Style::default()
                .fg(colors::BORDER_FOCUS)
                .add_modifier(Modifier::BOLD),
            error: Style::default()
                .fg(colors::ERROR)
                .add_modifier(Modifier::BOLD),

            help_key: Style::default()
                .bg(colors::FOOTER_BG)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            help_desc: Style::default().bg(colors::FOOTER_BG).fg(colors::FOOTER_FG),
        }
    }
}
