//! Detail view for the selected record.

use crate::feed::VideoRecord;
use crate::util::{format_pub_date, html_to_text, strip_control_chars};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, record: &VideoRecord, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            strip_control_chars(&record.title).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_pub_date(&record.published_at).into_owned(),
            label,
        )),
        Line::from(""),
    ];

    if record.has_video() {
        lines.push(Line::from(vec![
            Span::styled("Video  ", label),
            Span::styled(
                strip_control_chars(&record.video_url).into_owned(),
                Style::default().fg(Color::Green),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            "[Space/Enter] play",
            Style::default().fg(Color::Cyan),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Video file not available",
            Style::default().fg(Color::Yellow),
        )));
    }

    lines.push(Line::from(vec![
        Span::styled("Page   ", label),
        Span::raw(strip_control_chars(&record.link).into_owned()),
    ]));
    if !record.thumbnail_url.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Thumb  ", label),
            Span::raw(strip_control_chars(&record.thumbnail_url).into_owned()),
        ]));
    }
    lines.push(Line::from(""));

    let description = html_to_text(&record.description);
    let text = Text::from_iter(
        lines.into_iter().chain(
            strip_control_chars(&description)
                .lines()
                .map(|l| Line::from(l.to_string()))
                .collect::<Vec<_>>(),
        ),
    );

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Video"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
