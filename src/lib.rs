//! Terminal browser for video collections published as archive RSS/MRSS feeds.
//!
//! - [`feed`] fetches one page of a collection and parses it into [`feed::VideoRecord`]s
//! - [`gallery`] tracks the current page, the selection and in-flight loads
//! - [`app`] drives page loads and playback on top of the gallery
//! - [`ui`] is the ratatui front-end

pub mod app;
pub mod config;
pub mod feed;
pub mod gallery;
pub mod ui;
pub mod util;
