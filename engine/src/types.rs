// ═══════════════════════════════════════════════════════════════════════
// Core types — entities, ids, and the authoritative session state
// ═══════════════════════════════════════════════════════════════════════

use crate::config::GameConfig;
use crate::log::{ActionKind, ActionLogEntry};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Entity ids ─────────────────────────────────────────────────────────
// Compact, copyable ids. Entities live in id-keyed arenas inside
// GameSession and are referenced by id everywhere, never by direct
// reference.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllianceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProposalId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrialId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RevoltId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player-{}", self.0)
    }
}

impl std::fmt::Display for AllianceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "alliance-{}", self.0)
    }
}

// ── Enums ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    Alive,
    Executed,
}

/// A player's hidden agenda. Never exposed to other players except
/// through a tier-3 espionage report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Loyal,
    Neutral,
    Revolt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Planning,
    Voting,
    Resolution,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Planning => write!(f, "planning"),
            Phase::Voting => write!(f, "voting"),
            Phase::Resolution => write!(f, "resolution"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Guilty,
    Innocent,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Guilty => write!(f, "guilty"),
            Verdict::Innocent => write!(f, "innocent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialStatus {
    Charging,
    Voting,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialOutcome {
    Convicted,
    Acquitted,
    /// The accused died before the verdict; the trial closes without one.
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevoltStatus {
    Proposed,
    Confirmed,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevoltOutcome {
    Succeeded,
    Failed,
    /// Never confirmed before the turn ended; no committed effects.
    Abandoned,
}

/// Espionage disclosure tiers, strictly increasing. Each tier includes
/// everything the tiers below it disclose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntelTier {
    /// Tier 0: public identity and status.
    Identity,
    /// Tier 1: + exact gold, power, spy count.
    Resources,
    /// Tier 2: + alliance memberships.
    Alliances,
    /// Tier 3: + hidden intent.
    Intent,
}

impl IntelTier {
    pub const ALL: [IntelTier; 4] = [
        IntelTier::Identity,
        IntelTier::Resources,
        IntelTier::Alliances,
        IntelTier::Intent,
    ];

    pub fn level(self) -> u32 {
        match self {
            IntelTier::Identity => 0,
            IntelTier::Resources => 1,
            IntelTier::Alliances => 2,
            IntelTier::Intent => 3,
        }
    }
}

// ── Player ─────────────────────────────────────────────────────────────

/// Board position in percentage coordinates (the client lays players out
/// around the throne).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Anonymous display title, e.g. "The Crimson Duke".
    pub title: String,
    pub gold: u32,
    pub power: u32,
    pub spy_count: u32,
    /// Vote strength in trials. Zeroed on execution.
    pub influence_weight: u32,
    pub status: PlayerStatus,
    /// Hidden from everyone else (tier-3 intel only).
    pub intent: Intent,
    pub position: Position,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive
    }
}

// ── Alliance ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alliance {
    pub id: AllianceId,
    pub name: String,
    pub color: String,
    pub emblem: String,
    pub members: BTreeSet<PlayerId>,
}

/// A pending alliance proposal. Visible only to the two parties; expires
/// silently if not accepted within the configured window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllianceProposal {
    pub id: ProposalId,
    pub proposer: PlayerId,
    pub target: PlayerId,
    /// When set, acceptance joins the target to this existing alliance
    /// instead of founding a new one. The proposer must be a member.
    pub into_alliance: Option<AllianceId>,
    /// Turn the proposal was made on.
    pub turn: u32,
}

// ── Trial ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trial {
    pub id: TrialId,
    pub accuser: PlayerId,
    pub accused: PlayerId,
    pub charge: String,
    pub status: TrialStatus,
    /// One vote per eligible voter; re-voting overwrites (last-write-wins).
    pub votes: BTreeMap<PlayerId, Verdict>,
    pub outcome: Option<TrialOutcome>,
}

impl Trial {
    pub fn is_active(&self) -> bool {
        self.status != TrialStatus::Resolved
    }
}

// ── Revolt ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevoltAttempt {
    pub id: RevoltId,
    pub initiator: PlayerId,
    pub allies: BTreeSet<PlayerId>,
    /// Aggregates as of the last proposal/confirmation check.
    pub total_gold: u32,
    pub total_power: u32,
    /// Percentage in [0, 95].
    pub success_chance: u8,
    pub status: RevoltStatus,
    pub outcome: Option<RevoltOutcome>,
}

impl RevoltAttempt {
    /// Initiator plus allies.
    pub fn participants(&self) -> Vec<PlayerId> {
        let mut ids = vec![self.initiator];
        ids.extend(self.allies.iter().copied());
        ids
    }

    pub fn is_resolved(&self) -> bool {
        self.status == RevoltStatus::Resolved
    }
}

// ── Espionage ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub gold: u32,
    pub power: u32,
    pub spy_count: u32,
}

/// What a report disclosed, snapshotted at deploy time. Content is
/// strictly cumulative: tier N carries everything below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContent {
    pub title: String,
    pub status: PlayerStatus,
    pub influence_weight: u32,
    /// Tier >= 1.
    pub resources: Option<ResourceSnapshot>,
    /// Tier >= 2.
    pub alliances: Option<Vec<AllianceId>>,
    /// Tier 3 only.
    pub intent: Option<Intent>,
}

/// Visible only to the owning spy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspionageReport {
    pub id: ReportId,
    pub owner: PlayerId,
    pub target: PlayerId,
    pub tier: IntelTier,
    pub turn: u32,
    pub content: ReportContent,
}

// ── Session outcome ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// A revolt succeeded; the session ends with the initiator as ruler.
    NewRegime { ruler: PlayerId },
    /// Everyone else was executed.
    LastSurvivor { winner: PlayerId },
    /// Externally terminated, or nobody left alive.
    Terminated,
}

// ── Cooldown ledger ────────────────────────────────────────────────────

/// Records the turn an (actor, target, kind) action last applied, so a
/// duplicate inside the kind's cooldown window can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStamp {
    pub actor: PlayerId,
    pub target: PlayerId,
    pub kind: ActionKind,
    pub turn: u32,
}

// ── Game session ───────────────────────────────────────────────────────

/// The single authoritative state object for one game session. All
/// mutation goes through the action processor and the scheduler; clients
/// only ever see projections of it (visibility::view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub turn: u32,
    pub phase: Phase,
    /// Countdown in seconds until the current phase ends.
    pub phase_remaining: u32,
    pub config: GameConfig,

    pub players: BTreeMap<PlayerId, Player>,
    pub alliances: BTreeMap<AllianceId, Alliance>,
    pub proposals: BTreeMap<ProposalId, AllianceProposal>,
    pub trials: BTreeMap<TrialId, Trial>,
    pub revolts: BTreeMap<RevoltId, RevoltAttempt>,
    pub reports: BTreeMap<ReportId, EspionageReport>,

    /// Append-only action log.
    pub log: Vec<ActionLogEntry>,
    pub cooldowns: Vec<CooldownStamp>,

    pub outcome: Option<SessionOutcome>,
    /// Set when an invariant violation is detected; every further
    /// mutation is rejected pending manual inspection.
    pub halted: bool,

    // Deterministic RNG
    pub seed: u64,
    pub rng_counter: u64,

    // Id counters
    pub next_alliance: u32,
    pub next_proposal: u32,
    pub next_trial: u32,
    pub next_revolt: u32,
    pub next_report: u32,
    pub next_log: u64,
}

impl GameSession {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Display title for log lines; falls back to the raw id.
    pub fn title_of(&self, id: PlayerId) -> String {
        self.players
            .get(&id)
            .map(|p| p.title.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// The session accepts no further actions once an outcome is set or
    /// corruption halted it.
    pub fn is_over(&self) -> bool {
        self.outcome.is_some() || self.halted
    }

    /// All alliances the player currently belongs to.
    pub fn alliances_of(&self, id: PlayerId) -> Vec<AllianceId> {
        self.alliances
            .values()
            .filter(|a| a.members.contains(&id))
            .map(|a| a.id)
            .collect()
    }

    /// Two players are allies iff both ids appear in the same alliance's
    /// member set. Symmetric by construction.
    pub fn is_ally_of(&self, a: PlayerId, b: PlayerId) -> bool {
        a != b
            && self
                .alliances
                .values()
                .any(|al| al.members.contains(&a) && al.members.contains(&b))
    }

    /// Highest-tier report the owner holds on the target, if any.
    pub fn best_report(&self, owner: PlayerId, target: PlayerId) -> Option<&EspionageReport> {
        self.reports
            .values()
            .filter(|r| r.owner == owner && r.target == target)
            .max_by_key(|r| r.tier)
    }

    /// The trial currently open against a player, if one exists. At most
    /// one can be active at a time.
    pub fn active_trial_against(&self, accused: PlayerId) -> Option<TrialId> {
        self.trials
            .values()
            .find(|t| t.accused == accused && t.is_active())
            .map(|t| t.id)
    }

    /// The unresolved revolt attempt led by a player, if any.
    pub fn unresolved_revolt_by(&self, initiator: PlayerId) -> Option<RevoltId> {
        self.revolts
            .values()
            .find(|r| r.initiator == initiator && !r.is_resolved())
            .map(|r| r.id)
    }

    /// Debit gold from a player. Checked before any other mutation so the
    /// cost and its effect apply as one unit.
    pub fn charge(&mut self, id: PlayerId, cost: u32) -> Result<(), crate::errors::ActionError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(crate::errors::ActionError::InvalidTarget)?;
        if player.gold < cost {
            return Err(crate::errors::ActionError::InsufficientFunds {
                required: cost,
                available: player.gold,
            });
        }
        player.gold -= cost;
        Ok(())
    }

    /// Draw a percentage roll in [0, 100). Seed-deterministic: the same
    /// session seed and draw ordinal always produce the same roll.
    pub fn draw_percent(&mut self) -> u8 {
        let mut rng = ChaCha8Rng::seed_from_u64(
            self.seed
                .wrapping_add(self.rng_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        );
        self.rng_counter += 1;
        rng.gen_range(0..100)
    }

    // ── Cooldown ledger ────────────────────────────────────────────

    pub fn last_action_turn(
        &self,
        actor: PlayerId,
        target: PlayerId,
        kind: ActionKind,
    ) -> Option<u32> {
        self.cooldowns
            .iter()
            .filter(|s| s.actor == actor && s.target == target && s.kind == kind)
            .map(|s| s.turn)
            .max()
    }

    pub fn stamp_action(&mut self, actor: PlayerId, target: PlayerId, kind: ActionKind) {
        let turn = self.turn;
        if let Some(existing) = self
            .cooldowns
            .iter_mut()
            .find(|s| s.actor == actor && s.target == target && s.kind == kind)
        {
            existing.turn = turn;
        } else {
            self.cooldowns.push(CooldownStamp {
                actor,
                target,
                kind,
                turn,
            });
        }
    }

    // ── Id allocation ──────────────────────────────────────────────

    pub fn alloc_alliance_id(&mut self) -> AllianceId {
        self.next_alliance += 1;
        AllianceId(self.next_alliance)
    }

    pub fn alloc_proposal_id(&mut self) -> ProposalId {
        self.next_proposal += 1;
        ProposalId(self.next_proposal)
    }

    pub fn alloc_trial_id(&mut self) -> TrialId {
        self.next_trial += 1;
        TrialId(self.next_trial)
    }

    pub fn alloc_revolt_id(&mut self) -> RevoltId {
        self.next_revolt += 1;
        RevoltId(self.next_revolt)
    }

    pub fn alloc_report_id(&mut self) -> ReportId {
        self.next_report += 1;
        ReportId(self.next_report)
    }
}
