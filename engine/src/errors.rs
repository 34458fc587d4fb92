// ═══════════════════════════════════════════════════════════════════════
// Error taxonomy
//
// Validation and conflict errors are rejected synchronously and never
// mutate state. Scheduler-driven re-resolution of already-resolved
// trials is a silent no-op, not an error. CorruptState is the only
// fatal class: the session halts and rejects all further mutation.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::Phase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ActionError {
    #[error("insufficient funds: need {required} gold, have {available}")]
    InsufficientFunds { required: u32, available: u32 },

    #[error("invalid target")]
    InvalidTarget,

    #[error("target has been executed")]
    TargetExecuted,

    #[error("actor has been executed")]
    ActorExecuted,

    #[error("action cannot target yourself")]
    SelfTargetForbidden,

    #[error("an identical action is still within its cooldown window")]
    DuplicatePending,

    #[error("action not allowed during the {0} phase")]
    ActionNotAllowedInPhase(Phase),

    #[error("a trial is already active against that player")]
    TrialAlreadyActive,

    #[error("trial not found")]
    TrialNotFound,

    #[error("trial is not open for voting")]
    TrialNotOpen,

    #[error("not eligible to vote in this trial")]
    NotEligibleToVote,

    #[error("alliance proposal not found or expired")]
    ProposalNotFound,

    #[error("alliance not found")]
    AllianceNotFound,

    #[error("players are not allied")]
    NotAllied,

    #[error("duplicate ally ids in revolt proposal")]
    DuplicateAllies,

    #[error("revolt attempt not found")]
    RevoltNotFound,

    #[error("revolt conditions not met")]
    RevoltConditionsNotMet,

    #[error("revolt attempt already resolved")]
    RevoltAlreadyResolved,

    #[error("an unresolved revolt attempt already exists for this initiator")]
    RevoltPending,

    #[error("the session has ended")]
    SessionEnded,

    #[error("session state is corrupt: {0}")]
    CorruptState(String),
}

pub type ActionResult<T> = Result<T, ActionError>;
