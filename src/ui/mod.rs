//! Terminal user interface.
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - keyboard handling for the list, player view and overlays
//! - `render` - layout, header, pagination bar and page-jump prompt
//! - `browse` - record list with preview pane
//! - `player` - detail view of the selected record
//! - `status` - status bar
//! - `help` - key table overlay

mod browse;
mod help;
mod input;
mod loop_runner;
mod player;
mod render;
mod status;

pub use loop_runner::{run, Action};
