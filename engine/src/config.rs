// ═══════════════════════════════════════════════════════════════════════
// Session configuration — economy costs, revolt thresholds, phase timing
// ═══════════════════════════════════════════════════════════════════════

use crate::log::ActionKind;
use crate::types::Phase;
use serde::{Deserialize, Serialize};

/// Per-session tunables. Defaults match the reference client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    // Economy
    /// Tier-0 spy deployment cost; each tier adds `spy_tier_increment`.
    pub spy_base_cost: u32,
    pub spy_tier_increment: u32,
    pub alliance_proposal_cost: u32,
    /// Filing cost for an accusation, debited from the accuser.
    pub accusation_cost: u32,
    pub bribe_cost: u32,

    // Cooldowns (in turns)
    pub bribe_cooldown_turns: u32,
    /// Default cooldown for other targeted actions.
    pub action_cooldown_turns: u32,
    /// Alliance proposals expire silently after this many turns.
    pub proposal_ttl_turns: u32,

    // Revolt thresholds — all three must be met simultaneously to confirm.
    pub revolt_min_gold: u32,
    pub revolt_min_allies: usize,
    pub revolt_min_power: u32,

    // Phase durations (seconds)
    pub planning_seconds: u32,
    pub voting_seconds: u32,
    pub resolution_seconds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            spy_base_cost: 50,
            spy_tier_increment: 25,
            alliance_proposal_cost: 100,
            accusation_cost: 150,
            bribe_cost: 200,
            bribe_cooldown_turns: 2,
            action_cooldown_turns: 1,
            proposal_ttl_turns: 1,
            revolt_min_gold: 500,
            revolt_min_allies: 2,
            revolt_min_power: 30,
            planning_seconds: 180,
            voting_seconds: 120,
            resolution_seconds: 30,
        }
    }
}

impl GameConfig {
    pub fn phase_seconds(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Planning => self.planning_seconds,
            Phase::Voting => self.voting_seconds,
            Phase::Resolution => self.resolution_seconds,
        }
    }

    /// Cooldown window for an action kind, in turns. Zero means the
    /// action may repeat freely (re-votes are last-write-wins, inspection
    /// is a pure read).
    pub fn cooldown_turns(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Bribe => self.bribe_cooldown_turns,
            ActionKind::Vote | ActionKind::Inspect => 0,
            ActionKind::Spy
            | ActionKind::AllianceProposed
            | ActionKind::AllianceAccepted
            | ActionKind::AllianceDissolved
            | ActionKind::Accusation
            | ActionKind::RevoltProposed
            | ActionKind::RevoltConfirmed => self.action_cooldown_turns,
            // System-generated kinds never go through the cooldown check.
            ActionKind::RevoltResolved | ActionKind::Execution => 0,
        }
    }
}
