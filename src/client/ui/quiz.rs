//! Active quiz screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::ClientApp;
use crate::models::Question;

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let Some(question) = app.current_question() else {
        let waiting = Paragraph::new("Loading questions...")
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(waiting, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Progress and timer
        Constraint::Length(7), // Question text
        Constraint::Min(6),    // Options
        Constraint::Length(1), // Notice
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], app);
    render_question_text(frame, chunks[1], question);
    render_options(frame, chunks[2], question, app.selected_option, app.recorded_choice());

    frame.render_widget(
        Paragraph::new(super::notice_line(app.snapshot.notice.as_ref())).alignment(Alignment::Center),
        chunks[3],
    );

    let controls = Paragraph::new(
        "j/k select  ·  h/l question  ·  Enter answer  ·  f finish  ·  x dismiss  ·  q quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[4]);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let remaining = app
        .snapshot
        .countdown
        .map(|(_, countdown)| countdown.to_string())
        .unwrap_or_else(|| "--:--".to_string());

    let line = Line::from(vec![
        Span::styled(
            format!("Question {} of {}", app.current_index + 1, app.total_questions()),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!("   answered {}   ", app.answered_count()),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("⏱ {remaining}"), Style::default().fg(Color::Yellow).bold()),
    ]);

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_question_text(frame: &mut Frame, area: Rect, question: &Question) {
    let mut title = String::from(" Question ");
    if let Some(marks) = question.marks {
        title = format!(" Question ({marks} marks) ");
    }

    let widget = Paragraph::new(question.text.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title)
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, question: &Question, selected: usize, recorded: Option<usize>) {
    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let is_selected = i == selected;
            let prefix = if is_selected { "> " } else { "  " };
            let label = option_label(i);

            let style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else if recorded == Some(i) {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };

            let mut spans = vec![
                Span::styled(prefix, style),
                Span::styled(format!("{label}) "), style),
                Span::styled(opt.as_str(), style),
            ];
            if recorded == Some(i) {
                spans.push(Span::styled("  ✓", Style::default().fg(Color::Green)));
            }
            Line::from(spans)
        })
        .collect();

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map(char::from)
        .unwrap_or('?')
}
