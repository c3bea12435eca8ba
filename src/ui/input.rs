//! Keyboard input handling.
//!
//! Overlays capture keys first (help, then the page-jump prompt); otherwise
//! keys go to the list or the player view depending on whether a record is
//! selected.

use crate::app::{App, AppEvent};
use crate::gallery::parse_page_input;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::Action;

/// Longest text accepted in the page-jump prompt.
const MAX_PROMPT_LEN: usize = 12;

pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }

    if app.page_prompt.is_some() {
        handle_prompt_input(app, code, event_tx);
        return Action::Continue;
    }

    if app.gallery.selected().is_some() {
        handle_player_input(app, code, event_tx)
    } else {
        handle_gallery_input(app, code, event_tx)
    }
}

fn handle_help_input(app: &mut App, code: KeyCode) {
    if matches!(
        code,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
    ) {
        app.show_help = false;
    }
}

fn handle_prompt_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(input) = app.page_prompt.as_mut() else {
        return;
    };

    match code {
        KeyCode::Esc => app.page_prompt = None,
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(c) if !c.is_control() && input.chars().count() < MAX_PROMPT_LEN => {
            input.push(c);
        }
        KeyCode::Enter => match parse_page_input(input) {
            Ok(page) => {
                app.page_prompt = None;
                app.go_to_page(i64::from(page), event_tx);
            }
            // Keep the prompt open so the input can be corrected
            Err(e) => app.set_status(e.to_string()),
        },
        _ => {}
    }
}

/// Keys shared by the list and player views.
fn handle_navigation(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    match code {
        KeyCode::Char('n') | KeyCode::Right => {
            if !app.go_to_next(event_tx) {
                app.set_status("No more pages");
            }
        }
        KeyCode::Char('p') | KeyCode::Left => {
            if !app.go_to_previous(event_tx) {
                app.set_status("Already on the first page");
            }
        }
        KeyCode::Char('g') => app.page_prompt = Some(String::new()),
        KeyCode::Char('r') => app.retry(event_tx),
        KeyCode::Char('?') => app.show_help = true,
        _ => return false,
    }
    true
}

fn handle_gallery_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    if handle_navigation(app, code, event_tx) {
        return Action::Continue;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::PageUp => app.move_cursor(-10),
        KeyCode::Home => app.cursor_to_end(false),
        KeyCode::End | KeyCode::Char('G') => app.cursor_to_end(true),
        KeyCode::Enter => app.select_cursor(),
        KeyCode::Char('o') => {
            if let Some(record) = app.cursor_record().cloned() {
                app.open_link(&record);
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_player_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    if handle_navigation(app, code, event_tx) {
        return Action::Continue;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => app.select(None),
        KeyCode::Char(' ') | KeyCode::Enter => app.play_selected(event_tx),
        KeyCode::Char('o') => {
            if let Some(record) = app.gallery.selected().cloned() {
                app.open_link(&record);
            }
        }
        _ => {}
    }
    Action::Continue
}
