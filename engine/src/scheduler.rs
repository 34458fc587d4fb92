// ═══════════════════════════════════════════════════════════════════════
// Turn scheduler — timed phases and boundary effects
//
// planning -> voting -> resolution -> planning (next turn), each driven
// by a countdown. Boundaries are the only points where a trial can be
// force-resolved without full participation, and where confirmed revolts
// are put to the sword. All timer-driven mutation funnels through here,
// on the same single writer as player actions.
// ═══════════════════════════════════════════════════════════════════════

use crate::alliance;
use crate::revolt;
use crate::trial;
use crate::types::*;

/// Advance the countdown by `elapsed` seconds, crossing as many phase
/// boundaries as that covers. Ticking a finished or halted session does
/// nothing.
pub fn tick(session: &mut GameSession, mut elapsed: u32) {
    while elapsed > 0 && !session.is_over() {
        if elapsed < session.phase_remaining {
            session.phase_remaining -= elapsed;
            return;
        }
        elapsed -= session.phase_remaining;
        advance_phase(session);
    }
}

/// Force the current phase to its end, applying boundary effects.
pub fn advance_phase(session: &mut GameSession) {
    if session.is_over() {
        return;
    }

    let from = session.phase;
    match session.phase {
        Phase::Planning => {
            open_charged_trials(session);
            session.phase = Phase::Voting;
        }
        Phase::Voting => {
            force_resolve_trials(session);
            resolve_confirmed_revolts(session);
            session.phase = Phase::Resolution;
        }
        Phase::Resolution => {
            begin_next_turn(session);
        }
    }
    session.phase_remaining = session.config.phase_seconds(session.phase);

    if let Err(detail) = verify_invariants(session) {
        tracing::error!(%detail, "invariant violation; halting session");
        session.halted = true;
        return;
    }
    tracing::info!(turn = session.turn, from = %from, to = %session.phase, "phase advanced");
}

/// planning -> voting: charges filed during planning open for votes.
fn open_charged_trials(session: &mut GameSession) {
    let charged: Vec<TrialId> = session
        .trials
        .values()
        .filter(|t| t.status == TrialStatus::Charging)
        .map(|t| t.id)
        .collect();
    for id in charged {
        trial::open_voting(session, id);
    }
}

/// voting -> resolution: every open trial resolves on whatever votes it
/// has; unvoted weight counts toward neither side.
fn force_resolve_trials(session: &mut GameSession) {
    let open: Vec<TrialId> = session
        .trials
        .values()
        .filter(|t| t.is_active())
        .map(|t| t.id)
        .collect();
    for id in open {
        trial::resolve_trial(session, id);
    }
}

/// voting -> resolution: confirmed revolts get their one draw.
fn resolve_confirmed_revolts(session: &mut GameSession) {
    let confirmed: Vec<RevoltId> = session
        .revolts
        .values()
        .filter(|r| r.status == RevoltStatus::Confirmed)
        .map(|r| r.id)
        .collect();
    for id in confirmed {
        if session.is_over() {
            break;
        }
        // Already-resolved attempts (e.g. collapsed by an execution in
        // this same sweep) are skipped; resolution stays idempotent.
        let _ = revolt::resolve(session, id);
    }
}

/// resolution -> planning: abandon what never committed, then advance
/// the turn counter.
fn begin_next_turn(session: &mut GameSession) {
    // Revolt attempts never confirmed this turn are abandoned silently;
    // they created no committed effects.
    for attempt in session.revolts.values_mut() {
        if attempt.status == RevoltStatus::Proposed {
            attempt.status = RevoltStatus::Resolved;
            attempt.outcome = Some(RevoltOutcome::Abandoned);
        }
    }

    session.turn += 1;
    session.phase = Phase::Planning;
    alliance::expire_proposals(session);
}

/// Detect session-level corruption: the executed-player and alliance
/// invariants must hold after every boundary. A violation is the only
/// fatal error class.
pub fn verify_invariants(session: &GameSession) -> Result<(), String> {
    for player in session.players.values() {
        if player.status == PlayerStatus::Executed {
            if player.gold != 0 || player.power != 0 || player.spy_count != 0 {
                return Err(format!("executed {} still holds resources", player.id));
            }
            if !session.alliances_of(player.id).is_empty() {
                return Err(format!("executed {} still holds alliance membership", player.id));
            }
        }
    }
    for alliance in session.alliances.values() {
        if alliance.members.is_empty() {
            return Err(format!("alliance {} is empty but unpruned", alliance.id));
        }
        for member in &alliance.members {
            match session.player(*member) {
                Some(p) if p.is_alive() => {}
                _ => {
                    return Err(format!(
                        "alliance {} lists a dead or unknown member {member}",
                        alliance.id
                    ))
                }
            }
        }
    }
    Ok(())
}
