//! Application state and the navigation operations the UI invokes.
//!
//! [`App`] wraps the [`Gallery`] state machine with everything the terminal
//! front-end needs around it: the archive client, the list cursor, the status
//! line and overlay flags. Page loads run as spawned tasks that report back
//! through [`AppEvent::PageLoaded`]; [`App::apply_event`] hands the outcome to
//! the gallery, which drops it if a newer load has been issued since.

use crate::config::Config;
use crate::feed::{build_http_client, ArchiveClient, FetchError, VideoRecord};
use crate::gallery::{jump_target, Gallery, PageRequest};
use crate::util::{catch_task_panic, launchable_url};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::process::{ExitStatus, Stdio};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A page fetch finished, successfully or not.
    PageLoaded {
        request: PageRequest,
        outcome: Result<Vec<VideoRecord>, FetchError>,
    },
    /// An external player command exited.
    PlayerExited {
        title: String,
        result: Result<ExitStatus, String>,
    },
}

pub struct App {
    pub client: ArchiveClient,
    pub gallery: Gallery,
    /// Player command from config; `None` uses the system opener.
    pub player: Option<String>,
    /// Highlighted row in the record list.
    pub cursor: usize,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Text typed into the page-jump prompt while it is open.
    pub page_prompt: Option<String>,
    pub show_help: bool,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config.validate().context("Invalid configuration")?;
        let http = build_http_client().context("Failed to build HTTP client")?;
        let client = ArchiveClient::new(http, endpoint, config.collection.trim())
            .with_timeout(config.request_timeout());

        Ok(Self {
            client,
            gallery: Gallery::new(),
            player: config.player.clone().filter(|p| !p.trim().is_empty()),
            cursor: 0,
            status_message: None,
            page_prompt: None,
            show_help: false,
            needs_redraw: true,
            spinner_frame: 0,
        })
    }

    pub fn collection(&self) -> &str {
        self.client.collection()
    }

    // ========================================================================
    // Page navigation
    // ========================================================================

    /// Starts loading `page` in the background.
    ///
    /// The result arrives as [`AppEvent::PageLoaded`] on `event_tx`. Every call
    /// supersedes loads still in flight.
    pub fn load_page(&mut self, page: u32, event_tx: &mpsc::Sender<AppEvent>) {
        let request = self.gallery.begin_load(page);
        let client = self.client.clone();
        let tx = event_tx.clone();

        tracing::debug!(page, generation = request.generation, "Spawning page load");

        tokio::spawn(async move {
            let outcome = match catch_task_panic(client.fetch_page(request.page)).await {
                Ok(outcome) => outcome,
                Err(panic_msg) => {
                    tracing::error!(page = request.page, error = %panic_msg, "Page load task panicked");
                    Err(FetchError::Interrupted(panic_msg))
                }
            };

            if let Err(e) = tx.send(AppEvent::PageLoaded { request, outcome }).await {
                tracing::warn!(error = %e, "Failed to deliver page load (receiver dropped)");
            }
        });
    }

    /// Reloads the current page.
    pub fn retry(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        let page = self.gallery.current_page();
        self.load_page(page, event_tx);
    }

    /// Loads the next page. Returns false (and does nothing) when the last
    /// page was not full.
    pub fn go_to_next(&mut self, event_tx: &mpsc::Sender<AppEvent>) -> bool {
        match self.gallery.next_page() {
            Some(page) => {
                self.load_page(page, event_tx);
                true
            }
            None => false,
        }
    }

    /// Loads the previous page. Returns false (and does nothing) on page 1.
    pub fn go_to_previous(&mut self, event_tx: &mpsc::Sender<AppEvent>) -> bool {
        match self.gallery.previous_page() {
            Some(page) => {
                self.load_page(page, event_tx);
                true
            }
            None => false,
        }
    }

    /// Loads `page` if it is at least 1; anything else is ignored.
    pub fn go_to_page(&mut self, page: i64, event_tx: &mpsc::Sender<AppEvent>) -> bool {
        match jump_target(page) {
            Some(page) => {
                self.load_page(page, event_tx);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select(&mut self, record: Option<VideoRecord>) {
        self.gallery.select(record);
    }

    /// Record under the list cursor.
    pub fn cursor_record(&self) -> Option<&VideoRecord> {
        self.gallery.records().get(self.cursor)
    }

    /// Selects the record under the cursor, opening the player view.
    pub fn select_cursor(&mut self) {
        let record = self.cursor_record().cloned();
        if record.is_some() {
            self.select(record);
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.gallery.records().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    pub fn cursor_to_end(&mut self, last: bool) {
        self.cursor = if last {
            self.gallery.records().len().saturating_sub(1)
        } else {
            0
        };
    }

    // ========================================================================
    // Background events
    // ========================================================================

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PageLoaded { request, outcome } => {
                let succeeded = outcome.is_ok();
                if self.gallery.complete_load(request, outcome) && succeeded {
                    self.cursor = 0;
                }
            }
            AppEvent::PlayerExited { title, result } => match result {
                Ok(status) if status.success() => {
                    tracing::debug!(title = %title, "Player exited");
                }
                Ok(status) => {
                    tracing::warn!(title = %title, status = %status, "Player exited with failure");
                    self.set_status(format!("Player exited with {}", status));
                }
                Err(e) => {
                    tracing::warn!(title = %title, error = %e, "Failed waiting for player");
                    self.set_status(format!("Player failed: {}", e));
                }
            },
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Plays the selected record's video, or explains why it cannot.
    pub fn play_selected(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        let Some(record) = self.gallery.selected().cloned() else {
            return;
        };
        if !record.has_video() {
            self.set_status("Video file not available, press o to view on archive.org");
            return;
        }
        let url = match launchable_url(&record.video_url) {
            Ok(url) => url,
            Err(blocked) => {
                self.set_status(blocked.to_string());
                return;
            }
        };

        match self.player.clone() {
            Some(command) => self.spawn_player(&command, url.as_str(), &record.title, event_tx),
            None => match open::that(url.as_str()) {
                Ok(()) => self.set_status(format!("Opening {}...", record.title)),
                Err(e) => self.set_status(format!("Failed to open video: {}", e)),
            },
        }
    }

    /// Opens the external page of `record` in the browser.
    pub fn open_link(&mut self, record: &VideoRecord) {
        match launchable_url(&record.link) {
            Err(blocked) => self.set_status(blocked.to_string()),
            Ok(url) => match open::that(url.as_str()) {
                Ok(()) => self.set_status("Opening in browser..."),
                Err(e) => self.set_status(format!("Failed to open browser: {}", e)),
            },
        }
    }

    fn spawn_player(
        &mut self,
        command: &str,
        url: &str,
        title: &str,
        event_tx: &mpsc::Sender<AppEvent>,
    ) {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return;
        };

        let spawned = tokio::process::Command::new(program)
            .args(parts)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                tracing::info!(program, url, "Started player");
                self.set_status(format!("Playing {}", title));
                let tx = event_tx.clone();
                let title = title.to_string();
                tokio::spawn(async move {
                    let result = child.wait().await.map_err(|e| e.to_string());
                    if let Err(e) = tx.send(AppEvent::PlayerExited { title, result }).await {
                        tracing::debug!(error = %e, "Player exit not delivered (receiver dropped)");
                    }
                });
            }
            Err(e) => {
                tracing::warn!(program, error = %e, "Failed to start player");
                self.set_status(format!("Failed to start {}: {}", program, e));
            }
        }
    }

    // ========================================================================
    // Status line
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
