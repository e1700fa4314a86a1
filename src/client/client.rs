//! Terminal front end for a quiz session.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing::info;

use crate::error::Result;
use crate::session::{Command, SessionHandle};
use crate::terminal::TerminalGuard;

use super::state::{ClientApp, Screen};
use super::ui;

/// Run the quiz client until the student quits.
///
/// With `initial_code` the code is submitted straight away.
pub async fn run(handle: SessionHandle, initial_code: Option<String>) -> Result<()> {
    let mut app = ClientApp::new(initial_code.as_deref());

    if let Some(code) = initial_code.filter(|c| !c.trim().is_empty()) {
        handle.send(Command::SubmitCode(code.trim().to_string()));
    }

    let mut snapshots = handle.subscribe();
    app.update(snapshots.borrow_and_update().clone());
    let mut guard = TerminalGuard::enter()?;

    loop {
        if app.should_quit {
            break;
        }

        if snapshots.has_changed().unwrap_or(false) {
            app.update(snapshots.borrow_and_update().clone());
        }

        guard.terminal().draw(|frame| ui::render(frame, &app))?;

        // Handle input with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if let Some(command) = handle_input(&mut app, key.code) {
                    if !handle.send(command) {
                        break;
                    }
                }
            }
        }
    }

    info!("quiz client closed");
    handle.shutdown();
    Ok(())
}

/// Maps a key press to a session command, updating local view state.
fn handle_input(app: &mut ClientApp, key: KeyCode) -> Option<Command> {
    match app.screen() {
        Screen::CodeEntry => match key {
            KeyCode::Char('q') | KeyCode::Char('Q') if app.code_input.is_empty() => {
                app.should_quit = true;
                None
            }
            KeyCode::Char(c) => {
                app.code_input_push(c);
                None
            }
            KeyCode::Backspace => {
                app.code_input_pop();
                None
            }
            KeyCode::Enter if !app.code_input.is_empty() => Some(Command::SubmitCode(app.code_input.clone())),
            KeyCode::Esc => {
                app.should_quit = true;
                None
            }
            _ => None,
        },
        Screen::Waiting => match key {
            KeyCode::Esc => Some(Command::Reset),
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                app.should_quit = true;
                None
            }
            _ => None,
        },
        Screen::Quiz => match key {
            KeyCode::Up | KeyCode::Char('k') => {
                app.select_previous_option();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.select_next_option();
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                app.previous_question();
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                app.next_question();
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => app.current_question().map(|q| Command::Answer {
                question_id: q.id,
                choice: app.selected_option,
            }),
            KeyCode::Char('f') | KeyCode::Char('F') => Some(Command::Finish),
            KeyCode::Char('x') => Some(Command::DismissNotice),
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                app.should_quit = true;
                None
            }
            _ => None,
        },
        Screen::Finished => match key {
            KeyCode::Enter | KeyCode::Char('n') => {
                app.code_input.clear();
                Some(Command::Reset)
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                app.should_quit = true;
                None
            }
            _ => None,
        },
    }
}
