//! Client screens.

mod code_entry;
mod finished;
mod quiz;
mod waiting;

use ratatui::prelude::*;
use ratatui::widgets::Block;

use crate::session::{Notice, NoticeKind};

use super::state::{ClientApp, Screen};

/// Render the client UI based on the current screen.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.screen() {
        Screen::CodeEntry => code_entry::render(frame, area, app),
        Screen::Waiting => waiting::render(frame, area, app),
        Screen::Quiz => quiz::render(frame, area, app),
        Screen::Finished => finished::render(frame, area, app),
    }
}

fn title() -> Line<'static> {
    Line::from(Span::styled("QUIZ PORTAL", Style::default().fg(Color::Cyan).bold()))
}

fn notice_line(notice: Option<&Notice>) -> Line<'_> {
    let Some(notice) = notice else {
        return Line::from("");
    };

    let color = match notice.kind {
        NoticeKind::Info => Color::Yellow,
        NoticeKind::Success => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    Line::from(Span::styled(notice.text.as_str(), Style::default().fg(color).bold()))
}

fn controls(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}
