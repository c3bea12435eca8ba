//! Utility functions shared by the feed, app and UI layers.
//!
//! - **Launching**: feed URLs are checked before they reach the opener or player
//! - **Text processing**: width-aware truncation, control-character stripping,
//!   HTML-to-text and `pubDate` formatting
//! - **Tasks**: panic capture for spawned background work
//!
//! # Examples
//!
//! ```
//! use reel::util::{format_pub_date, launchable_url, truncate_to_width};
//!
//! assert!(launchable_url("https://archive.org/details/item").is_ok());
//! assert_eq!(format_pub_date("Tue, 10 Jun 2003 04:00:00 GMT"), "Jun 10, 2003");
//! assert_eq!(truncate_to_width("Giant Bomb Archive", 8), "Giant B…");
//! ```

mod launch;
mod task;
mod text;

pub use launch::{launchable_url, LaunchBlocked};
pub use task::catch_task_panic;
pub use text::{format_pub_date, html_to_text, strip_control_chars, truncate_to_width};
