use crate::app::App;
use crate::feed::VideoRecord;
use crate::util::{format_pub_date, html_to_text, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Width reserved for the date column.
const DATE_WIDTH: usize = 14;

/// Render the record list with a preview of the highlighted record.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_list(f, app, chunks[0]);
    render_preview(f, app.cursor_record(), chunks[1]);
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let records = app.gallery.records();

    let items: Vec<ListItem> = if records.is_empty() {
        let msg = if app.gallery.loading() {
            "Loading..."
        } else if app.gallery.last_error().is_some() {
            "No videos loaded"
        } else {
            "No videos on this page"
        };
        vec![ListItem::new(Span::styled(msg, Style::default().fg(Color::DarkGray)))]
    } else {
        // Borders, highlight symbol, marker and date column
        let title_width = (area.width as usize).saturating_sub(6 + DATE_WIDTH);
        records
            .iter()
            .map(|record| {
                let title = strip_control_chars(&record.title);
                let marker = if record.has_video() {
                    Span::styled("▶ ", Style::default().fg(Color::Green))
                } else {
                    Span::styled("· ", Style::default().fg(Color::DarkGray))
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::raw(truncate_to_width(&title, title_width).into_owned()),
                    Span::styled(
                        format!("  {}", format_pub_date(&record.published_at)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title("Videos"),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !records.is_empty() {
        state.select(Some(app.cursor.min(records.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_preview(f: &mut Frame, record: Option<&VideoRecord>, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default().borders(Borders::ALL).title("Preview");
    let Some(record) = record else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            strip_control_chars(&record.title).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_pub_date(&record.published_at).into_owned(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let description = html_to_text(&record.description);
    if description.is_empty() {
        lines.push(Line::from(Span::styled(
            "No description",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.extend(
            strip_control_chars(&description)
                .lines()
                .map(|l| Line::from(l.to_string())),
        );
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
