// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
// Information in a session is split between:
//   PUBLIC  — titles, statuses, influence weights, trials and their
//             votes, public log entries, the turn/phase clock
//   PRIVATE — a player's own exact resources and intent, their
//             espionage reports, proposals they are party to, revolt
//             attempts they participate in
//   HIDDEN  — everyone else's exact resources (only coarse, rounded
//             figures are public) and hidden intent
//
// This module projects the authoritative state into the view a specific
// player is legally allowed to see. Clients MUST only receive
// RedactedState, never the raw GameSession. The projection is pure: it
// is re-derivable at any time from persistent state plus the observer's
// own reports, and holds no state of its own.
// ═══════════════════════════════════════════════════════════════════════

use crate::errors::{ActionError, ActionResult};
use crate::trial;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The view of the session a specific player is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedState {
    pub viewer: PlayerId,
    pub turn: u32,
    pub phase: Phase,
    /// Seconds until the current phase ends.
    pub time_remaining: u32,
    pub outcome: Option<SessionOutcome>,

    pub players: Vec<PlayerView>,
    /// Alliances the viewer can see into: their own in full, plus what
    /// tier-2 intel revealed about others.
    pub alliances: Vec<AllianceView>,
    /// Trials are public, votes included.
    pub trials: Vec<TrialView>,
    /// Only attempts the viewer participates in, until resolution.
    pub revolts: Vec<RevoltAttempt>,
    /// Pending proposals the viewer is party to.
    pub proposals: Vec<AllianceProposal>,
    /// The viewer's own espionage reports.
    pub my_reports: Vec<EspionageReport>,
}

/// Per-player projection. Exact for the viewer themselves; coarse or
/// report-substituted for everyone else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub title: String,
    pub status: PlayerStatus,
    pub influence_weight: u32,
    pub position: Position,
    /// Rounded to the nearest 100 for other alive players unless a
    /// tier >= 1 report substitutes the exact snapshot.
    pub gold: u32,
    pub gold_exact: bool,
    /// Rounded to the nearest 5 under the same rule.
    pub power: u32,
    pub power_exact: bool,
    /// Hidden for others without a tier >= 1 report.
    pub spy_count: Option<u32>,
    /// None = membership hidden from this observer.
    pub alliances: Option<Vec<AllianceId>>,
    /// Tier-3 intel only (always present for the viewer themselves).
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllianceView {
    pub id: AllianceId,
    pub name: String,
    pub color: String,
    pub emblem: String,
    /// Members this observer knows of. Complete when the observer is a
    /// member; otherwise just the players tier-2 intel tied to it.
    pub members: Vec<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialView {
    pub id: TrialId,
    pub accuser: PlayerId,
    pub accused: PlayerId,
    pub charge: String,
    pub status: TrialStatus,
    pub votes: Vec<(PlayerId, Verdict)>,
    pub guilty_weight: u32,
    pub innocent_weight: u32,
    pub outcome: Option<TrialOutcome>,
}

/// Public information about a player, as returned by the inspect action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: PlayerId,
    pub title: String,
    pub status: PlayerStatus,
    pub influence_weight: u32,
    pub position: Position,
}

pub fn public_profile(session: &GameSession, id: PlayerId) -> Option<PublicProfile> {
    session.player(id).map(|p| PublicProfile {
        id: p.id,
        title: p.title.clone(),
        status: p.status,
        influence_weight: p.influence_weight,
        position: p.position,
    })
}

/// Round to the nearest multiple of `step` (never exact for onlookers).
fn round_to(value: u32, step: u32) -> u32 {
    ((value + step / 2) / step) * step
}

/// Build the redacted view for a specific observer.
pub fn view(session: &GameSession, observer: PlayerId) -> ActionResult<RedactedState> {
    if session.player(observer).is_none() {
        return Err(ActionError::InvalidTarget);
    }

    let mut players = Vec::with_capacity(session.players.len());
    for player in session.players.values() {
        players.push(project_player(session, observer, player));
    }

    // Alliances the observer belongs to are fully visible. Tier-2 intel
    // adds the alliances it named, but only ties the reported target to
    // them.
    let mut alliances: BTreeMap<AllianceId, AllianceView> = BTreeMap::new();
    for alliance in session.alliances.values() {
        if alliance.members.contains(&observer) {
            alliances.insert(
                alliance.id,
                AllianceView {
                    id: alliance.id,
                    name: alliance.name.clone(),
                    color: alliance.color.clone(),
                    emblem: alliance.emblem.clone(),
                    members: alliance.members.iter().copied().collect(),
                },
            );
        }
    }
    for report in session.reports.values() {
        if report.owner != observer {
            continue;
        }
        let Some(reported) = &report.content.alliances else {
            continue;
        };
        for id in reported {
            let Some(alliance) = session.alliances.get(id) else {
                continue; // dissolved since the report was filed
            };
            let entry = alliances.entry(*id).or_insert_with(|| AllianceView {
                id: *id,
                name: alliance.name.clone(),
                color: alliance.color.clone(),
                emblem: alliance.emblem.clone(),
                members: Vec::new(),
            });
            if !entry.members.contains(&report.target) {
                entry.members.push(report.target);
            }
        }
    }

    let trials = session
        .trials
        .values()
        .map(|t| {
            let (guilty_weight, innocent_weight) = trial::tally(session, t);
            TrialView {
                id: t.id,
                accuser: t.accuser,
                accused: t.accused,
                charge: t.charge.clone(),
                status: t.status,
                votes: t.votes.iter().map(|(v, c)| (*v, *c)).collect(),
                guilty_weight,
                innocent_weight,
                outcome: t.outcome,
            }
        })
        .collect();

    let revolts = session
        .revolts
        .values()
        .filter(|r| r.initiator == observer || r.allies.contains(&observer))
        .cloned()
        .collect();

    let proposals = session
        .proposals
        .values()
        .filter(|p| p.proposer == observer || p.target == observer)
        .cloned()
        .collect();

    let my_reports = session
        .reports
        .values()
        .filter(|r| r.owner == observer)
        .cloned()
        .collect();

    Ok(RedactedState {
        viewer: observer,
        turn: session.turn,
        phase: session.phase,
        time_remaining: session.phase_remaining,
        outcome: session.outcome,
        players,
        alliances: alliances.into_values().collect(),
        trials,
        revolts,
        proposals,
        my_reports,
    })
}

fn project_player(session: &GameSession, observer: PlayerId, player: &Player) -> PlayerView {
    let is_self = player.id == observer;

    if is_self || !player.is_alive() {
        // Own values are always exact; executed players hold nothing by
        // invariant, so their zeros are public and exact.
        return PlayerView {
            id: player.id,
            title: player.title.clone(),
            status: player.status,
            influence_weight: player.influence_weight,
            position: player.position,
            gold: player.gold,
            gold_exact: true,
            power: player.power,
            power_exact: true,
            spy_count: Some(player.spy_count),
            alliances: Some(session.alliances_of(player.id)),
            intent: is_self.then_some(player.intent),
        };
    }

    let report = session.best_report(observer, player.id);
    let resources = report.and_then(|r| r.content.resources);

    let (gold, gold_exact, power, power_exact, spy_count) = match resources {
        Some(snap) => (snap.gold, true, snap.power, true, Some(snap.spy_count)),
        None => (
            round_to(player.gold, 100),
            false,
            round_to(player.power, 5),
            false,
            None,
        ),
    };

    // Membership of others is visible through a shared alliance or
    // tier >= 2 intel.
    let shared: Vec<AllianceId> = session
        .alliances
        .values()
        .filter(|a| a.members.contains(&observer) && a.members.contains(&player.id))
        .map(|a| a.id)
        .collect();
    let alliances = match report.and_then(|r| r.content.alliances.clone()) {
        Some(reported) => Some(reported),
        None if !shared.is_empty() => Some(shared),
        None => None,
    };

    let intent = report.and_then(|r| r.content.intent);

    PlayerView {
        id: player.id,
        title: player.title.clone(),
        status: player.status,
        influence_weight: player.influence_weight,
        position: player.position,
        gold,
        gold_exact,
        power,
        power_exact,
        spy_count,
        alliances,
        intent,
    }
}
