//! Render dispatch for the TUI.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{browse, help, player, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

const SPINNER: [&str; super::loop_runner::SPINNER_FRAMES] =
    ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.gallery.selected() {
        Some(record) => player::render(f, record, chunks[1]),
        None => browse::render(f, app, chunks[1]),
    }
    render_pagination(f, app, chunks[2]);
    status::render(f, app, chunks[3]);

    if let Some(input) = &app.page_prompt {
        render_page_prompt(f, input);
    }

    if app.show_help {
        help::render(f);
    }
}

/// Collection name on the left, load state on the right.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let gallery = &app.gallery;

    let (state_text, state_style) = if gallery.loading() {
        (
            format!("{} Loading page...", SPINNER[app.spinner_frame % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(error) = gallery.last_error() {
        (
            format!("{} (press r to retry)", error),
            Style::default().fg(Color::Red),
        )
    } else {
        let page = gallery.state();
        (
            format!("{} videos on page {}", page.records.len(), page.current_page),
            Style::default().fg(Color::DarkGray),
        )
    };

    let line = Line::from(vec![
        Span::styled(
            app.collection().to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(state_text, state_style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_pagination(f: &mut Frame, app: &App, area: Rect) {
    let page = app.gallery.state();
    let enabled = Style::default().fg(Color::White);
    let disabled = Style::default().fg(Color::DarkGray);

    let prev_style = if page.current_page > 1 {
        enabled
    } else {
        disabled
    };
    let next_style = if page.has_more { enabled } else { disabled };

    let line = Line::from(vec![
        Span::styled("← [p]rev", prev_style),
        Span::raw("   "),
        Span::styled(
            format!("Page {}", page.current_page),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("[n]ext →", next_style),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_page_prompt(f: &mut Frame, input: &str) {
    let area = f.area();
    let width = 32u16.min(area.width.saturating_sub(4));
    let height = 5u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 16 || overlay.height < 4 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(format!("> {}_\n\n(Enter) Go  (Esc) Cancel", input)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Go to page "),
    );
    f.render_widget(paragraph, overlay);
}
