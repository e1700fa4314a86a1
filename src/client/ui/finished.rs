//! Terminal screen for completed and failed sessions.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::client::state::ClientApp;
use crate::session::QuizStatus;

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let snapshot = &app.snapshot;

    let chunks = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Length(10),
        Constraint::Percentage(35),
    ])
    .split(area);

    let headline = if snapshot.status == QuizStatus::Completed {
        Span::styled("Quiz submitted", Style::default().fg(Color::Green).bold())
    } else {
        Span::styled("Quiz unavailable", Style::default().fg(Color::Red).bold())
    };

    let mut content = vec![Line::from(""), super::title(), Line::from(""), Line::from(headline)];

    if snapshot.status == QuizStatus::Completed {
        content.push(Line::from(format!(
            "{} of {} questions answered",
            app.answered_count(),
            app.total_questions()
        )));
    } else {
        content.push(Line::from(""));
    }

    content.push(super::notice_line(snapshot.notice.as_ref()));
    content.push(Line::from(""));
    content.push(super::controls("[Enter] new code  ·  [Q] to quit"));

    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), chunks[1]);
}
