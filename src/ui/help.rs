//! Help overlay with the key table.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const SECTIONS: [(&str, &[(&str, &str)]); 3] = [
    (
        "General",
        &[
            ("n / →", "Next page"),
            ("p / ←", "Previous page"),
            ("g", "Go to page"),
            ("r", "Reload current page"),
            ("?", "Toggle help"),
            ("q / Ctrl+c", "Quit"),
        ],
    ),
    (
        "Video List",
        &[
            ("j / ↓", "Move down"),
            ("k / ↑", "Move up"),
            ("Home / End", "First / last video"),
            ("Enter", "Show video"),
            ("o", "Open archive page"),
        ],
    ),
    (
        "Video",
        &[
            ("Space / Enter", "Play"),
            ("o", "Open archive page"),
            ("Esc / b", "Back to list"),
        ],
    ),
];

pub fn render(f: &mut Frame) {
    let overlay = centered_rect(70, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (label, bindings) in SECTIONS {
        if !rows.is_empty() {
            rows.push(Row::new(vec![String::new(), String::new()]));
        }
        rows.push(Row::new(vec![
            Line::from(Span::styled(
                format!("-- {} --", label),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ]));
        for (key, action) in bindings {
            rows.push(Row::new(vec![format!("  {}", key), action.to_string()]));
        }
    }

    let widths = [Constraint::Length(18), Constraint::Min(20)];
    let table = Table::new(rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (? to close) "),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        );

    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
