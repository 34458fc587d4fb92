// ═══════════════════════════════════════════════════════════════════════
// Action log — immutable, append-only record of everything that happened
//
// Entries are tagged public/private at append time. Private entries are
// visible only to their actor (spy deployments carry a second, redacted
// public entry so the deployment is auditable without deanonymizing the
// spy). System-generated entries (executions, revolt resolutions) have
// no actor.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{GameSession, Phase, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Spy,
    AllianceProposed,
    AllianceAccepted,
    AllianceDissolved,
    Accusation,
    Vote,
    Bribe,
    Inspect,
    RevoltProposed,
    RevoltConfirmed,
    RevoltResolved,
    Execution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: u64,
    pub turn: u32,
    pub phase: Phase,
    /// None for system entries and redacted entries.
    pub actor: Option<PlayerId>,
    pub target: Option<PlayerId>,
    pub kind: ActionKind,
    pub detail: String,
    pub public: bool,
}

impl ActionLogEntry {
    /// Public entries are visible to everyone; private entries only to
    /// the player who performed them.
    pub fn visible_to(&self, viewer: PlayerId) -> bool {
        self.public || self.actor == Some(viewer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFilter {
    All,
    Public,
    Private,
}

impl GameSession {
    pub fn push_log(
        &mut self,
        actor: Option<PlayerId>,
        target: Option<PlayerId>,
        kind: ActionKind,
        detail: impl Into<String>,
        public: bool,
    ) {
        self.next_log += 1;
        let entry = ActionLogEntry {
            id: self.next_log,
            turn: self.turn,
            phase: self.phase,
            actor,
            target,
            kind,
            detail: detail.into(),
            public,
        };
        self.log.push(entry);
    }
}

/// Ordered log entries visible to a viewer under the given filter.
/// Private entries appear only where the viewer is the actor.
pub fn visible_log(session: &GameSession, viewer: PlayerId, filter: LogFilter) -> Vec<ActionLogEntry> {
    session
        .log
        .iter()
        .filter(|e| e.visible_to(viewer))
        .filter(|e| match filter {
            LogFilter::All => true,
            LogFilter::Public => e.public,
            LogFilter::Private => !e.public,
        })
        .cloned()
        .collect()
}
