//! Pagination and selection state for the video gallery.
//!
//! [`Gallery`] is a synchronous state machine. A page load is split into
//! [`Gallery::begin_load`], which hands out a [`PageRequest`] carrying a
//! monotonically increasing generation, and [`Gallery::complete_load`], which
//! applies an outcome only if its request is still the latest one issued.
//! Overlapping loads therefore resolve to the most recently requested page no
//! matter in which order the responses arrive.
//!
//! The async side (spawning the fetch, delivering the outcome) lives in
//! [`crate::app`].

use crate::feed::{FetchError, VideoRecord, PAGE_SIZE};
use thiserror::Error;

/// Largest page number accepted from the page-jump prompt.
pub const MAX_PAGE: u32 = 100_000;

/// What the presentation layer renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// 1-based page whose records are currently shown.
    pub current_page: u32,
    /// True iff the last successful load returned a full page. A final page
    /// with exactly [`PAGE_SIZE`] items still reports `true`.
    pub has_more: bool,
    pub selected: Option<VideoRecord>,
    /// Records of `current_page` in feed order.
    pub records: Vec<VideoRecord>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            has_more: false,
            selected: None,
            records: Vec::new(),
        }
    }
}

/// Ticket for one in-flight page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct Gallery {
    state: PageState,
    loading: bool,
    last_error: Option<String>,
    generation: u64,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.state.records
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more
    }

    pub fn selected(&self) -> Option<&VideoRecord> {
        self.state.selected.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Generation of the most recently issued request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks a load of `page` as started and issues its ticket.
    ///
    /// Any request issued earlier becomes stale. Navigating away drops the
    /// selection right away, whether or not the load later succeeds.
    pub fn begin_load(&mut self, page: u32) -> PageRequest {
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        self.last_error = None;
        self.state.selected = None;
        PageRequest {
            page,
            generation: self.generation,
        }
    }

    /// Applies the outcome of `request`.
    ///
    /// Returns false, leaving every field untouched, when `request` is not the
    /// latest one issued. Otherwise `loading` is cleared; on success the
    /// records, page and `has_more` are replaced and the selection cleared, and
    /// on failure only `last_error` changes.
    pub fn complete_load(
        &mut self,
        request: PageRequest,
        outcome: Result<Vec<VideoRecord>, FetchError>,
    ) -> bool {
        if request.generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = request.generation,
                page = request.page,
                "Ignoring stale page load"
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(records) => {
                self.state.has_more = records.len() >= PAGE_SIZE;
                self.state.records = records;
                self.state.current_page = request.page;
                self.state.selected = None;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(page = request.page, error = %e, "Page load failed");
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    /// Page that "next" should load, if there may be one.
    pub fn next_page(&self) -> Option<u32> {
        if !self.state.has_more {
            return None;
        }
        self.state.current_page.checked_add(1)
    }

    /// Page that "previous" should load, unless already on the first page.
    pub fn previous_page(&self) -> Option<u32> {
        (self.state.current_page > 1).then(|| self.state.current_page - 1)
    }

    pub fn select(&mut self, record: Option<VideoRecord>) {
        self.state.selected = record;
    }
}

/// Target of an explicit page jump. Pages below 1 (or beyond `u32`) are ignored.
pub fn jump_target(page: i64) -> Option<u32> {
    if page < 1 {
        return None;
    }
    u32::try_from(page).ok()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageInputError {
    #[error("Enter a page number")]
    Empty,
    #[error("Not a page number: {0}")]
    NotANumber(String),
}

/// Validates text typed into the page-jump prompt.
///
/// Whitespace is trimmed. Values below 1 become 1 and values above
/// [`MAX_PAGE`] become `MAX_PAGE`; anything that is not an integer is rejected.
pub fn parse_page_input(input: &str) -> Result<u32, PageInputError> {
    use std::num::IntErrorKind;

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PageInputError::Empty);
    }

    let value = match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => return Ok(MAX_PAGE),
            IntErrorKind::NegOverflow => return Ok(1),
            _ => return Err(PageInputError::NotANumber(trimmed.to_string())),
        },
    };

    Ok(value.clamp(1, MAX_PAGE as i64) as u32)
}
