// ═══════════════════════════════════════════════════════════════════════
// Revolts — coalition attempts against the throne
//
// propose -> confirm -> resolve. Confirmation requires the gold, ally,
// and power thresholds simultaneously. The success chance is a weighted
// sum of the three ratios-to-threshold; the input ratios are deliberately
// uncapped (over-threshold resources can compensate for a weak ratio,
// matching the reference client) but the sum is capped at 95 so failure
// always stays possible. Resolution draws exactly once.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::GameConfig;
use crate::errors::{ActionError, ActionResult};
use crate::log::ActionKind;
use crate::trial::{apply_execution, check_session_end};
use crate::types::*;
use std::collections::BTreeSet;

/// min(95, floor(gold_ratio*30 + ally_ratio*30 + power_ratio*40)).
pub fn success_chance(config: &GameConfig, gold: u32, allies: usize, power: u32) -> u8 {
    let gold_ratio = f64::from(gold) / f64::from(config.revolt_min_gold.max(1));
    let ally_ratio = allies as f64 / config.revolt_min_allies.max(1) as f64;
    let power_ratio = f64::from(power) / f64::from(config.revolt_min_power.max(1));
    let raw = (gold_ratio * 30.0 + ally_ratio * 30.0 + power_ratio * 40.0).floor();
    raw.clamp(0.0, 95.0) as u8
}

/// Sum the coalition's current gold and power.
fn aggregates(session: &GameSession, initiator: PlayerId, allies: &BTreeSet<PlayerId>) -> (u32, u32) {
    let mut gold = 0u32;
    let mut power = 0u32;
    for id in std::iter::once(initiator).chain(allies.iter().copied()) {
        if let Some(p) = session.player(id) {
            gold += p.gold;
            power += p.power;
        }
    }
    (gold, power)
}

/// Propose a revolt with the given coalition. Every ally must be alive,
/// distinct, and share at least one alliance with the initiator. Only
/// one unresolved attempt per initiator at a time.
pub fn propose(
    session: &mut GameSession,
    initiator: PlayerId,
    ally_ids: &[PlayerId],
) -> ActionResult<RevoltAttempt> {
    if session.unresolved_revolt_by(initiator).is_some() {
        return Err(ActionError::RevoltPending);
    }

    let mut allies = BTreeSet::new();
    for &id in ally_ids {
        if id == initiator {
            return Err(ActionError::SelfTargetForbidden);
        }
        if !allies.insert(id) {
            return Err(ActionError::DuplicateAllies);
        }
        let player = session.player(id).ok_or(ActionError::InvalidTarget)?;
        if !player.is_alive() {
            return Err(ActionError::TargetExecuted);
        }
        if !session.is_ally_of(initiator, id) {
            return Err(ActionError::NotAllied);
        }
    }

    let (total_gold, total_power) = aggregates(session, initiator, &allies);
    let chance = success_chance(&session.config, total_gold, allies.len(), total_power);

    let id = session.alloc_revolt_id();
    let attempt = RevoltAttempt {
        id,
        initiator,
        allies,
        total_gold,
        total_power,
        success_chance: chance,
        status: RevoltStatus::Proposed,
        outcome: None,
    };
    session.revolts.insert(id, attempt.clone());
    Ok(attempt)
}

/// Confirm a proposed revolt. Aggregates are recomputed from current
/// resources; all three thresholds must hold simultaneously or the
/// confirmation fails with RevoltConditionsNotMet.
pub fn confirm(
    session: &mut GameSession,
    actor: PlayerId,
    attempt_id: RevoltId,
) -> ActionResult<u8> {
    let (initiator, allies, status) = {
        let attempt = session
            .revolts
            .get(&attempt_id)
            .ok_or(ActionError::RevoltNotFound)?;
        (attempt.initiator, attempt.allies.clone(), attempt.status)
    };
    if initiator != actor {
        return Err(ActionError::InvalidTarget);
    }
    match status {
        RevoltStatus::Proposed => {}
        RevoltStatus::Confirmed => return Err(ActionError::DuplicatePending),
        RevoltStatus::Resolved => return Err(ActionError::RevoltAlreadyResolved),
    }

    // An ally executed since the proposal no longer counts.
    let live_allies: BTreeSet<PlayerId> = allies
        .iter()
        .copied()
        .filter(|id| session.player(*id).is_some_and(|p| p.is_alive()))
        .collect();
    let (gold, power) = aggregates(session, initiator, &live_allies);
    let config = &session.config;
    let met = gold >= config.revolt_min_gold
        && live_allies.len() >= config.revolt_min_allies
        && power >= config.revolt_min_power;
    if !met {
        return Err(ActionError::RevoltConditionsNotMet);
    }

    let chance = success_chance(&session.config, gold, live_allies.len(), power);
    let attempt = session
        .revolts
        .get_mut(&attempt_id)
        .ok_or(ActionError::RevoltNotFound)?;
    attempt.allies = live_allies;
    attempt.total_gold = gold;
    attempt.total_power = power;
    attempt.success_chance = chance;
    attempt.status = RevoltStatus::Confirmed;
    Ok(chance)
}

/// Resolve a confirmed revolt: one irreversible draw against the stored
/// chance. Success ends the session with the initiator as ruler; failure
/// executes the whole coalition. A resolved attempt cannot be resolved
/// again.
pub fn resolve(session: &mut GameSession, attempt_id: RevoltId) -> ActionResult<RevoltOutcome> {
    let (initiator, participants, chance, status) = {
        let attempt = session
            .revolts
            .get(&attempt_id)
            .ok_or(ActionError::RevoltNotFound)?;
        (
            attempt.initiator,
            attempt.participants(),
            attempt.success_chance,
            attempt.status,
        )
    };
    if status == RevoltStatus::Resolved {
        return Err(ActionError::RevoltAlreadyResolved);
    }

    let roll = session.draw_percent();
    let succeeded = roll < chance;
    let outcome = if succeeded {
        RevoltOutcome::Succeeded
    } else {
        RevoltOutcome::Failed
    };
    tracing::info!(
        revolt = attempt_id.0,
        roll,
        chance,
        success = succeeded,
        "revolt resolved"
    );

    // Mark resolved before applying punishments so the execution effect
    // does not re-collapse this attempt.
    if let Some(attempt) = session.revolts.get_mut(&attempt_id) {
        attempt.status = RevoltStatus::Resolved;
        attempt.outcome = Some(outcome);
    }

    let title = session.title_of(initiator);
    if succeeded {
        session.outcome = Some(SessionOutcome::NewRegime { ruler: initiator });
        session.push_log(
            None,
            Some(initiator),
            ActionKind::RevoltResolved,
            format!("the revolt succeeded; {title} seizes the throne and a new regime begins"),
            true,
        );
    } else {
        session.push_log(
            None,
            Some(initiator),
            ActionKind::RevoltResolved,
            format!("a revolt led by {title} failed; the conspirators face the headsman"),
            true,
        );
        for id in participants {
            let name = session.title_of(id);
            session.push_log(
                None,
                Some(id),
                ActionKind::Execution,
                format!("{name} was executed for joining a failed revolt"),
                true,
            );
            apply_execution(session, id);
        }
        // One end-of-session check after the whole coalition has fallen:
        // a coalition of everyone leaves nobody to crown.
        check_session_end(session);
    }
    Ok(outcome)
}
