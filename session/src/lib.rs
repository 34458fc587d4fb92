// ═══════════════════════════════════════════════════════════════════════
// Session actor — single-writer ownership of a GameSession
//
// One worker thread owns the state and drains a command queue. Player
// submits, timer ticks, views, and log reads all funnel through the same
// queue, so there are no torn reads and no lost updates: every reply
// reflects a fully-applied prefix of commands. The handle is cheap to
// clone and safe to share across threads.
// ═══════════════════════════════════════════════════════════════════════

use intrigue_engine::log::visible_log;
use intrigue_engine::processor;
use intrigue_engine::scheduler;
use intrigue_engine::visibility;
use intrigue_engine::{
    Action, ActionError, ActionLogEntry, Effect, GameSession, LogFilter, PlayerId, RedactedState,
};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The worker thread has shut down; the handle is dead.
    #[error("session worker has shut down")]
    Closed,

    #[error(transparent)]
    Action(#[from] ActionError),
}

enum Command {
    Submit {
        actor: PlayerId,
        action: Action,
        reply: Sender<Result<Effect, ActionError>>,
    },
    View {
        observer: PlayerId,
        reply: Sender<Result<RedactedState, ActionError>>,
    },
    Log {
        observer: PlayerId,
        filter: LogFilter,
        reply: Sender<Vec<ActionLogEntry>>,
    },
    Tick {
        seconds: u32,
    },
    Snapshot {
        reply: Sender<GameSession>,
    },
    Shutdown,
}

/// Clonable handle to a running session worker.
#[derive(Clone)]
pub struct SessionHandle {
    tx: Sender<Command>,
}

impl SessionHandle {
    /// Start a worker thread owning the given session. The returned join
    /// handle yields the final state once the worker shuts down.
    pub fn spawn(session: GameSession) -> (SessionHandle, JoinHandle<GameSession>) {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || run(session, rx, None));
        (SessionHandle { tx }, worker)
    }

    /// Like `spawn`, but the worker also drives the phase countdown from
    /// the wall clock, so phases expire without explicit ticks.
    pub fn spawn_realtime(session: GameSession) -> (SessionHandle, JoinHandle<GameSession>) {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || run(session, rx, Some(Instant::now())));
        (SessionHandle { tx }, worker)
    }

    /// Submit one player action and wait for the engine's verdict.
    pub fn submit(&self, actor: PlayerId, action: Action) -> Result<Effect, SessionError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(Command::Submit {
                actor,
                action,
                reply,
            })
            .map_err(|_| SessionError::Closed)?;
        Ok(rx.recv().map_err(|_| SessionError::Closed)??)
    }

    /// The redacted view the given observer is allowed to see.
    pub fn view(&self, observer: PlayerId) -> Result<RedactedState, SessionError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(Command::View { observer, reply })
            .map_err(|_| SessionError::Closed)?;
        Ok(rx.recv().map_err(|_| SessionError::Closed)??)
    }

    /// The action log as visible to the given observer.
    pub fn log(
        &self,
        observer: PlayerId,
        filter: LogFilter,
    ) -> Result<Vec<ActionLogEntry>, SessionError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(Command::Log {
                observer,
                filter,
                reply,
            })
            .map_err(|_| SessionError::Closed)?;
        rx.recv().map_err(|_| SessionError::Closed)
    }

    /// Advance the phase countdown by the given number of seconds.
    pub fn tick(&self, seconds: u32) -> Result<(), SessionError> {
        self.tx
            .send(Command::Tick { seconds })
            .map_err(|_| SessionError::Closed)
    }

    /// A consistent snapshot of the full authoritative state, e.g. for
    /// persistence. Not for clients: snapshots are unredacted.
    pub fn snapshot(&self) -> Result<GameSession, SessionError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(Command::Snapshot { reply })
            .map_err(|_| SessionError::Closed)?;
        rx.recv().map_err(|_| SessionError::Closed)
    }

    /// Ask the worker to stop. Join the spawn handle to collect the final
    /// state.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.tx
            .send(Command::Shutdown)
            .map_err(|_| SessionError::Closed)
    }
}

/// Worker loop. With a clock, elapsed wall time is folded into the
/// countdown before every command and once per idle second.
fn run(mut session: GameSession, rx: Receiver<Command>, clock: Option<Instant>) -> GameSession {
    tracing::info!(players = session.players.len(), "session worker started");
    let mut last = clock;

    loop {
        let command = if last.is_some() {
            match rx.recv_timeout(Duration::from_secs(1)) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        };

        if let Some(mark) = &mut last {
            let elapsed = mark.elapsed().as_secs() as u32;
            if elapsed > 0 {
                scheduler::tick(&mut session, elapsed);
                *mark += Duration::from_secs(u64::from(elapsed));
            }
        }

        match command {
            Some(Command::Submit {
                actor,
                action,
                reply,
            }) => {
                let result = processor::submit(&mut session, actor, action);
                if let Err(error) = &result {
                    tracing::debug!(actor = actor.0, %error, "action rejected");
                }
                let _ = reply.send(result);
            }
            Some(Command::View { observer, reply }) => {
                let _ = reply.send(visibility::view(&session, observer));
            }
            Some(Command::Log {
                observer,
                filter,
                reply,
            }) => {
                let _ = reply.send(visible_log(&session, observer, filter));
            }
            Some(Command::Tick { seconds }) => {
                scheduler::tick(&mut session, seconds);
            }
            Some(Command::Snapshot { reply }) => {
                let _ = reply.send(session.clone());
            }
            Some(Command::Shutdown) => break,
            None => {} // idle wakeup, clock already applied
        }
    }

    tracing::info!(turn = session.turn, "session worker stopped");
    session
}

// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use intrigue_engine::setup::{create_session, default_roster};
    use intrigue_engine::types::Phase;
    use intrigue_engine::GameConfig;

    fn start() -> (SessionHandle, JoinHandle<GameSession>) {
        SessionHandle::spawn(create_session(
            default_roster(),
            GameConfig::default(),
            42,
        ))
    }

    #[test]
    fn submits_and_views_round_trip() {
        let (handle, worker) = start();
        handle
            .submit(
                PlayerId(1),
                Action::Spy {
                    target: PlayerId(2),
                    tier: intrigue_engine::IntelTier::Resources,
                },
            )
            .unwrap();

        let view = handle.view(PlayerId(1)).unwrap();
        assert_eq!(view.my_reports.len(), 1);

        handle.shutdown().unwrap();
        let final_state = worker.join().unwrap();
        assert_eq!(final_state.reports.len(), 1);
    }

    #[test]
    fn engine_rejections_pass_through() {
        let (handle, worker) = start();
        let err = handle
            .submit(
                PlayerId(1),
                Action::Spy {
                    target: PlayerId(1),
                    tier: intrigue_engine::IntelTier::Identity,
                },
            )
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Action(ActionError::SelfTargetForbidden)
        );
        handle.shutdown().unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn racing_submits_conserve_gold() {
        let (handle, worker) = start();
        let total_before: u32 = handle
            .snapshot()
            .unwrap()
            .players
            .values()
            .map(|p| p.gold)
            .sum();

        // Ten threads hammer the queue with bribes; every transfer is
        // serialized by the worker, so no gold is created or destroyed.
        let threads: Vec<_> = (1..=10u32)
            .map(|actor| {
                let handle = handle.clone();
                thread::spawn(move || {
                    let target = if actor == 10 { 1 } else { actor + 1 };
                    let _ = handle.submit(
                        PlayerId(actor),
                        Action::Bribe {
                            target: PlayerId(target),
                        },
                    );
                })
            })
            .collect();
        for t in threads {
            let _ = t.join();
        }

        let total_after: u32 = handle
            .snapshot()
            .unwrap()
            .players
            .values()
            .map(|p| p.gold)
            .sum();
        assert_eq!(total_before, total_after);

        handle.shutdown().unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn explicit_ticks_advance_phases() {
        let (handle, worker) = start();
        handle.tick(180).unwrap();
        let view = handle.view(PlayerId(1)).unwrap();
        assert_eq!(view.phase, Phase::Voting);
        assert_eq!(view.time_remaining, 120);

        // A full remaining turn lands back in planning.
        handle.tick(150).unwrap();
        let view = handle.view(PlayerId(1)).unwrap();
        assert_eq!(view.turn, 2);
        assert_eq!(view.phase, Phase::Planning);

        handle.shutdown().unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn dead_handle_reports_closed() {
        let (handle, worker) = start();
        handle.shutdown().unwrap();
        worker.join().unwrap();
        assert_eq!(handle.view(PlayerId(1)).unwrap_err(), SessionError::Closed);
    }
}
