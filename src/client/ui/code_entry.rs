//! Quiz code prompt.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::client::state::ClientApp;

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Percentage(35),
    ])
    .split(area);

    frame.render_widget(Paragraph::new(super::title()).alignment(Alignment::Center), chunks[1]);
    frame.render_widget(
        Paragraph::new("Enter the quiz code").alignment(Alignment::Center).fg(Color::White),
        chunks[2],
    );

    let input_area = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(36),
        Constraint::Fill(1),
    ])
    .split(chunks[3])[1];

    let input = Paragraph::new(format!("{}_", app.code_input))
        .style(Style::default().fg(Color::Yellow).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(input, input_area);

    let footer = vec![
        super::notice_line(app.snapshot.notice.as_ref()),
        super::controls("[Enter] to join  ·  [Esc] to quit"),
    ];
    frame.render_widget(Paragraph::new(footer).alignment(Alignment::Center), chunks[4]);
}
