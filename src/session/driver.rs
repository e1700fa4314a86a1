//! Runs a [`SessionController`] on its own task.
//!
//! The task owns the controller outright. A one-second ticker and the
//! command channel are multiplexed with `select!`, so a transition's fetch
//! always resolves before the next tick or command is looked at. Aborting
//! the task (or dropping the handle) cancels every timer of the session.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::api::QuizBackend;
use crate::models::QuestionId;

use super::clock::Clock;
use super::controller::{SessionController, SessionSnapshot};

const TICK: Duration = Duration::from_secs(1);

/// Requests from the UI to the session task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SubmitCode(String),
    Answer { question_id: QuestionId, choice: usize },
    Finish,
    DismissNotice,
    Reset,
}

pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn spawn<B, C>(controller: SessionController<B>, clock: C) -> Self
    where
        B: QuizBackend + 'static,
        C: Clock + 'static,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let (tx, snapshots) = watch::channel(controller.snapshot(clock.now()));
        let task = tokio::spawn(run(controller, clock, rx, tx));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Queues a command. Returns `false` once the session task has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<B: QuizBackend, C: Clock>(
    mut controller: SessionController<B>,
    clock: C,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    let mut ticker = time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => controller.tick(clock.now()).await,
            command = commands.recv() => {
                let Some(command) = command else { break };
                apply(&mut controller, command, &clock).await;
            }
        }

        if snapshots.send(controller.snapshot(clock.now())).is_err() {
            break;
        }
    }

    debug!("quiz session task stopped");
}

async fn apply<B: QuizBackend, C: Clock>(controller: &mut SessionController<B>, command: Command, clock: &C) {
    match command {
        Command::SubmitCode(code) => controller.submit_code(&code, clock.now()).await,
        Command::Answer { question_id, choice } => {
            // Failures are surfaced through the notice.
            let _ = controller.submit_answer(question_id, choice, clock.now()).await;
        }
        Command::Finish => controller.finish().await,
        Command::DismissNotice => controller.dismiss_notice(),
        Command::Reset => controller.reset(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use chrono::{DateTime, TimeDelta, Utc};
    use tokio::time::Instant;

    use super::*;
    use crate::session::controller::QuizStatus;
    use crate::session::testing::{FakeBackend, FakeQuestions, FakeWindow, at, questions, window};

    /// Wall clock that follows tokio's (paused) clock.
    struct TokioClock {
        base: DateTime<Utc>,
        started: Instant,
    }

    impl TokioClock {
        fn starting_at(base: DateTime<Utc>) -> Self {
            Self {
                base,
                started: Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap_or_default();
            self.base + elapsed
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_runs_quiz_to_completion() {
        let backend = Arc::new(FakeBackend::with_window(FakeWindow::NotStarted(window(2, 4, 8))));
        backend.push_questions(FakeQuestions::Available(questions(2)));
        let controller = SessionController::new(Arc::clone(&backend), Duration::from_secs(30));
        let handle = SessionHandle::spawn(controller, TokioClock::starting_at(at(0)));

        assert!(handle.send(Command::SubmitCode("QZ1".to_string())));
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(handle.snapshot().status, QuizStatus::Waiting);

        time::sleep(Duration::from_secs(4)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, QuizStatus::Active);
        assert_eq!(snapshot.questions.len(), 2);

        assert!(handle.send(Command::Answer { question_id: 1, choice: 3 }));
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.snapshot().answers.get(1), Some(3));

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(handle.snapshot().status, QuizStatus::Completed);
        assert_eq!(backend.question_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.finalize_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_timers() {
        let backend = Arc::new(FakeBackend::with_window(FakeWindow::NotStarted(window(1, 2, 60))));
        backend.push_questions(FakeQuestions::Available(questions(1)));
        let controller = SessionController::new(Arc::clone(&backend), Duration::from_secs(30));
        let handle = SessionHandle::spawn(controller, TokioClock::starting_at(at(0)));

        handle.send(Command::SubmitCode("QZ1".to_string()));
        time::sleep(Duration::from_millis(500)).await;
        handle.shutdown();

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.question_calls.load(Ordering::SeqCst), 0);
        assert!(!handle.send(Command::Finish));
    }
}
