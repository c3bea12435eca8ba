use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.page_prompt.is_some() {
        Cow::Borrowed("Type a page number | ENTER go | ESC cancel")
    } else if app.gallery.selected().is_some() {
        Cow::Borrowed("[Space]play [o]pen page [b]ack [n/p]page [g]o to [?]help [q]uit")
    } else {
        Cow::Borrowed("[j/k]move [Enter]select [o]pen [n/p]page [g]o to [r]etry [?]help [q]uit")
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
