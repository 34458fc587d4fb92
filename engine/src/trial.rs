// ═══════════════════════════════════════════════════════════════════════
// Trials — the accusation-to-verdict cycle
//
// State machine: Charging -> Voting -> Resolved. A charge filed during
// the voting phase opens for votes immediately; filed during planning it
// rests in Charging until the planning->voting boundary. Tallying is
// influence-weighted; guilty must strictly exceed innocent (ties acquit).
// Resolution is terminal and idempotent.
// ═══════════════════════════════════════════════════════════════════════

use crate::alliance;
use crate::errors::{ActionError, ActionResult};
use crate::log::ActionKind;
use crate::types::*;
use std::collections::BTreeMap;

/// File a formal accusation. Debits the filing cost from the accuser.
/// The processor has already verified both parties are alive and
/// distinct.
pub fn file_charge(
    session: &mut GameSession,
    accuser: PlayerId,
    accused: PlayerId,
    charge: String,
) -> ActionResult<TrialId> {
    if session.active_trial_against(accused).is_some() {
        return Err(ActionError::TrialAlreadyActive);
    }

    session.charge(accuser, session.config.accusation_cost)?;

    let status = if session.phase == Phase::Voting {
        TrialStatus::Voting
    } else {
        TrialStatus::Charging
    };
    let id = session.alloc_trial_id();
    session.trials.insert(
        id,
        Trial {
            id,
            accuser,
            accused,
            charge,
            status,
            votes: BTreeMap::new(),
            outcome: None,
        },
    );
    Ok(id)
}

/// Every alive player except the accused may vote.
pub fn eligible_voters(session: &GameSession, trial: &Trial) -> Vec<PlayerId> {
    session
        .alive_players()
        .filter(|p| p.id != trial.accused)
        .map(|p| p.id)
        .collect()
}

/// Cast or overwrite a vote. Last write wins until the trial resolves.
/// When the final eligible voter has voted, the trial resolves at once.
pub fn cast_vote(
    session: &mut GameSession,
    voter: PlayerId,
    trial_id: TrialId,
    verdict: Verdict,
) -> ActionResult<()> {
    let (status, accused) = {
        let trial = session
            .trials
            .get(&trial_id)
            .ok_or(ActionError::TrialNotFound)?;
        (trial.status, trial.accused)
    };
    if status != TrialStatus::Voting {
        return Err(ActionError::TrialNotOpen);
    }
    if accused == voter {
        return Err(ActionError::NotEligibleToVote);
    }

    let eligible: Vec<PlayerId> = session
        .alive_players()
        .filter(|p| p.id != accused)
        .map(|p| p.id)
        .collect();
    let all_voted = {
        let trial = session
            .trials
            .get_mut(&trial_id)
            .ok_or(ActionError::TrialNotFound)?;
        trial.votes.insert(voter, verdict);
        eligible.iter().all(|id| trial.votes.contains_key(id))
    };

    if all_voted {
        resolve_trial(session, trial_id);
    }
    Ok(())
}

/// Weighted tally over currently-alive voters. Votes cast by players who
/// have since been executed carry no weight.
pub fn tally(session: &GameSession, trial: &Trial) -> (u32, u32) {
    let mut guilty = 0u32;
    let mut innocent = 0u32;
    for (voter, verdict) in &trial.votes {
        let Some(player) = session.player(*voter) else {
            continue;
        };
        if !player.is_alive() {
            continue;
        }
        match verdict {
            Verdict::Guilty => guilty += player.influence_weight,
            Verdict::Innocent => innocent += player.influence_weight,
        }
    }
    (guilty, innocent)
}

/// Open a charging trial for votes (planning -> voting boundary).
pub fn open_voting(session: &mut GameSession, trial_id: TrialId) {
    if let Some(trial) = session.trials.get_mut(&trial_id) {
        if trial.status == TrialStatus::Charging {
            trial.status = TrialStatus::Voting;
        }
    }
}

/// Resolve a trial by tally. Missing votes count toward neither side.
/// Resolving an already-resolved trial is a no-op so scheduler retries
/// stay idempotent.
pub fn resolve_trial(session: &mut GameSession, trial_id: TrialId) {
    let Some(trial) = session.trials.get(&trial_id) else {
        return;
    };
    if trial.status == TrialStatus::Resolved {
        return;
    }

    let (guilty, innocent) = tally(session, trial);
    let accused = trial.accused;
    let accused_alive = session.player(accused).is_some_and(|p| p.is_alive());

    // Ties acquit: execution requires strictly more guilty weight.
    let outcome = if !accused_alive {
        TrialOutcome::Voided
    } else if guilty > innocent {
        TrialOutcome::Convicted
    } else {
        TrialOutcome::Acquitted
    };

    if let Some(trial) = session.trials.get_mut(&trial_id) {
        trial.status = TrialStatus::Resolved;
        trial.outcome = Some(outcome);
    }

    let title = session.title_of(accused);
    match outcome {
        TrialOutcome::Convicted => {
            tracing::info!(trial = trial_id.0, guilty, innocent, "trial convicted");
            session.push_log(
                None,
                Some(accused),
                ActionKind::Execution,
                format!("{title} was found guilty ({guilty} to {innocent}) and executed"),
                true,
            );
            execute_player(session, accused);
        }
        TrialOutcome::Acquitted => {
            tracing::info!(trial = trial_id.0, guilty, innocent, "trial acquitted");
            session.push_log(
                None,
                Some(accused),
                ActionKind::Vote,
                format!("{title} was acquitted ({guilty} to {innocent})"),
                true,
            );
        }
        TrialOutcome::Voided => {}
    }
}

/// The execution effect, shared by guilty verdicts and failed revolts.
/// Terminal: resources zeroed, every alliance membership removed, votes
/// voided, and the player becomes an illegal target and actor forever.
pub fn execute_player(session: &mut GameSession, id: PlayerId) {
    apply_execution(session, id);
    check_session_end(session);
}

/// The raw execution effect without the session-end check. Callers
/// punishing a whole coalition apply this per player and evaluate the
/// end once afterwards, so a doomed participant is never crowned winner
/// mid-sweep.
pub(crate) fn apply_execution(session: &mut GameSession, id: PlayerId) {
    let Some(player) = session.player_mut(id) else {
        return;
    };
    if !player.is_alive() {
        return;
    }
    player.status = PlayerStatus::Executed;
    player.gold = 0;
    player.power = 0;
    player.spy_count = 0;
    player.influence_weight = 0;

    alliance::drop_player(session, id);

    // Their votes in still-open trials no longer count; drop them so the
    // recorded vote set only ever names eligible voters.
    for trial in session.trials.values_mut() {
        if trial.is_active() {
            trial.votes.remove(&id);
        }
    }

    // Trials against the executed player close without a verdict.
    let voided: Vec<TrialId> = session
        .trials
        .values()
        .filter(|t| t.accused == id && t.is_active())
        .map(|t| t.id)
        .collect();
    for trial_id in voided {
        if let Some(trial) = session.trials.get_mut(&trial_id) {
            trial.status = TrialStatus::Resolved;
            trial.outcome = Some(TrialOutcome::Voided);
        }
    }

    // Unresolved revolts that counted on this player collapse.
    let collapsed: Vec<RevoltId> = session
        .revolts
        .values()
        .filter(|r| !r.is_resolved() && (r.initiator == id || r.allies.contains(&id)))
        .map(|r| r.id)
        .collect();
    for revolt_id in collapsed {
        if let Some(revolt) = session.revolts.get_mut(&revolt_id) {
            revolt.status = RevoltStatus::Resolved;
            revolt.outcome = Some(RevoltOutcome::Abandoned);
        }
    }

    tracing::info!(player = id.0, "player executed");
}

/// End the session when a single survivor remains (or nobody does).
pub fn check_session_end(session: &mut GameSession) {
    if session.outcome.is_some() {
        return;
    }
    let mut alive = session.alive_players().map(|p| p.id);
    let (first, second) = (alive.next(), alive.next());
    drop(alive);
    match (first, second) {
        (Some(winner), None) => {
            session.outcome = Some(SessionOutcome::LastSurvivor { winner });
            let title = session.title_of(winner);
            session.push_log(
                None,
                Some(winner),
                ActionKind::Execution,
                format!("{title} stands alone; the session ends"),
                true,
            );
        }
        (None, _) => {
            session.outcome = Some(SessionOutcome::Terminated);
        }
        _ => {}
    }
}
