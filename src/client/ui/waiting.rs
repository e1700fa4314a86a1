//! Countdown until the quiz opens.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::client::state::ClientApp;
use crate::session::Phase;

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let snapshot = &app.snapshot;

    let chunks = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(13),
        Constraint::Percentage(30),
    ])
    .split(area);

    let course = snapshot
        .course_name
        .clone()
        .or_else(|| snapshot.quiz_code.clone())
        .unwrap_or_default();

    let (label, clock) = match snapshot.countdown {
        Some((Phase::LoginOpens, countdown)) => ("Login opens in", countdown.to_string()),
        Some((_, countdown)) => ("Quiz starts in", countdown.to_string()),
        None => ("Waiting for the quiz", String::new()),
    };

    let mut content = vec![
        Line::from(""),
        super::title(),
        Line::from(""),
        Line::from(Span::styled(course, Style::default().fg(Color::Green).bold())),
        Line::from(""),
        Line::from(Span::styled(label, Style::default().fg(Color::White))),
        Line::from(Span::styled(clock, Style::default().fg(Color::Yellow).bold())),
        Line::from(""),
    ];

    if let Some(window) = &snapshot.window {
        let local = window.start_time.with_timezone(&chrono::Local);
        content.push(Line::from(Span::styled(
            format!("Starts at {}", local.format("%d %b %Y %H:%M")),
            Style::default().fg(Color::DarkGray),
        )));
    }

    content.push(super::notice_line(snapshot.notice.as_ref()));
    content.push(Line::from(""));
    content.push(super::controls("[Esc] other code  ·  [Q] to quit"));

    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), chunks[1]);
}
