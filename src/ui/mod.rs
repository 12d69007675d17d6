//! UI module
//!
//! Contains all terminal UI components:
//! - Styles for consistent theming
//! - Title bar, repository header and footer
//! - Repository menu
//! - Scrolling viewport and list cursor
//! - Diffstat histogram
//! - Message popup

mod styles;
pub mod diffstat;
pub mod footer;
pub mod header;
mod menu;
mod popup;
pub mod viewport;

pub use styles::Styles;
pub use footer::{HelpEntry, render_footer};
pub use header::{RepoHeader, RepoHeaderWidget, render_header};
pub use menu::{MENU_WIDTH, render_menu};
pub use popup::render_message_popup;
pub use viewport::{ListCursor, Viewport};
