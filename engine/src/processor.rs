// ═══════════════════════════════════════════════════════════════════════
// Action processor — the single entry point for every player action
//
// Flow: validate the actor, the phase, the target, and the cooldown
// window, then dispatch to the owning sub-engine. Sub-engines validate
// their own domain rules and debit costs, so a rejected action never
// mutates state and a cost debit always lands together with its effect.
// Every accepted action appends to the immutable log, tagged
// public/private per kind.
// ═══════════════════════════════════════════════════════════════════════

use crate::alliance;
use crate::errors::{ActionError, ActionResult};
use crate::espionage;
use crate::log::ActionKind;
use crate::revolt;
use crate::trial;
use crate::types::*;
use crate::visibility::PublicProfile;
use serde::{Deserialize, Serialize};

/// Every action a player can submit, as a tagged variant so dispatch is
/// exhaustiveness-checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Action {
    Spy {
        target: PlayerId,
        tier: IntelTier,
    },
    AlliancePropose {
        target: PlayerId,
        /// Extend this existing alliance instead of founding a new one.
        into_alliance: Option<AllianceId>,
    },
    AllianceAccept {
        proposal: ProposalId,
    },
    AllianceDissolve {
        alliance: AllianceId,
    },
    Accuse {
        target: PlayerId,
        charge: String,
    },
    Vote {
        trial: TrialId,
        choice: Verdict,
    },
    Bribe {
        target: PlayerId,
    },
    /// Free read of a player's public profile; legal even against the
    /// executed.
    Inspect {
        target: PlayerId,
    },
    ProposeRevolt {
        allies: Vec<PlayerId>,
    },
    ConfirmRevolt {
        attempt: RevoltId,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Spy { .. } => ActionKind::Spy,
            Action::AlliancePropose { .. } => ActionKind::AllianceProposed,
            Action::AllianceAccept { .. } => ActionKind::AllianceAccepted,
            Action::AllianceDissolve { .. } => ActionKind::AllianceDissolved,
            Action::Accuse { .. } => ActionKind::Accusation,
            Action::Vote { .. } => ActionKind::Vote,
            Action::Bribe { .. } => ActionKind::Bribe,
            Action::Inspect { .. } => ActionKind::Inspect,
            Action::ProposeRevolt { .. } => ActionKind::RevoltProposed,
            Action::ConfirmRevolt { .. } => ActionKind::RevoltConfirmed,
        }
    }

    /// The directly targeted player, where the action has one.
    fn target(&self) -> Option<PlayerId> {
        match self {
            Action::Spy { target, .. }
            | Action::AlliancePropose { target, .. }
            | Action::Accuse { target, .. }
            | Action::Bribe { target }
            | Action::Inspect { target } => Some(*target),
            _ => None,
        }
    }
}

/// What an accepted action did, returned to the submitting client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Effect {
    ReportFiled(EspionageReport),
    ProposalSent(ProposalId),
    AllianceFormed(AllianceId),
    AllianceLeft(AllianceId),
    TrialOpened(TrialId),
    VoteRecorded(TrialId),
    BribeDelivered { target: PlayerId, amount: u32 },
    Inspected(PublicProfile),
    RevoltProposed { attempt: RevoltId, success_chance: u8 },
    RevoltConfirmed { attempt: RevoltId, success_chance: u8 },
}

/// Which kinds are legal in which phase. Resolution belongs to the
/// scheduler; revolts are plotted during planning only; votes only make
/// sense while trials are open.
fn allowed_in_phase(kind: ActionKind, phase: Phase) -> bool {
    match phase {
        Phase::Planning => kind != ActionKind::Vote,
        Phase::Voting => !matches!(kind, ActionKind::RevoltProposed | ActionKind::RevoltConfirmed),
        Phase::Resolution => kind == ActionKind::Inspect,
    }
}

/// Validate and apply a single player action.
pub fn submit(session: &mut GameSession, actor: PlayerId, action: Action) -> ActionResult<Effect> {
    if session.halted {
        return Err(ActionError::CorruptState("session is halted".into()));
    }
    if session.outcome.is_some() {
        return Err(ActionError::SessionEnded);
    }

    let kind = action.kind();
    let actor_alive = session
        .player(actor)
        .ok_or(ActionError::InvalidTarget)?
        .is_alive();
    if !actor_alive {
        return Err(ActionError::ActorExecuted);
    }
    if !allowed_in_phase(kind, session.phase) {
        return Err(ActionError::ActionNotAllowedInPhase(session.phase));
    }

    if let Some(target) = action.target() {
        if target == actor && kind != ActionKind::Inspect {
            return Err(ActionError::SelfTargetForbidden);
        }
        let target_player = session.player(target).ok_or(ActionError::InvalidTarget)?;
        if !target_player.is_alive() && kind != ActionKind::Inspect {
            return Err(ActionError::TargetExecuted);
        }
        let cooldown = session.config.cooldown_turns(kind);
        if cooldown > 0 {
            if let Some(last) = session.last_action_turn(actor, target, kind) {
                if last + cooldown > session.turn {
                    return Err(ActionError::DuplicatePending);
                }
            }
        }
    }

    let effect = dispatch(session, actor, &action)?;

    if let Some(target) = action.target() {
        session.stamp_action(actor, target, kind);
    }
    tracing::debug!(actor = actor.0, ?kind, "action applied");
    Ok(effect)
}

fn dispatch(session: &mut GameSession, actor: PlayerId, action: &Action) -> ActionResult<Effect> {
    let actor_title = session.title_of(actor);
    match action {
        Action::Spy { target, tier } => {
            let report = espionage::deploy(session, actor, *target, *tier)?;
            let target_title = session.title_of(*target);
            session.push_log(
                Some(actor),
                Some(*target),
                ActionKind::Spy,
                format!(
                    "deployed a tier-{} spy against {target_title}",
                    tier.level()
                ),
                false,
            );
            // Redacted companion entry: auditable, but names nobody.
            session.push_log(
                None,
                None,
                ActionKind::Spy,
                "a spy was deployed, target unknown",
                true,
            );
            Ok(Effect::ReportFiled(report))
        }

        Action::AlliancePropose {
            target,
            into_alliance,
        } => {
            let id = alliance::propose(session, actor, *target, *into_alliance)?;
            let target_title = session.title_of(*target);
            session.push_log(
                Some(actor),
                Some(*target),
                ActionKind::AllianceProposed,
                format!("proposed an alliance to {target_title}"),
                false,
            );
            Ok(Effect::ProposalSent(id))
        }

        Action::AllianceAccept { proposal } => {
            let proposer = session
                .proposals
                .get(proposal)
                .map(|p| p.proposer)
                .ok_or(ActionError::ProposalNotFound)?;
            let id = alliance::accept(session, actor, *proposal)?;
            let name = session
                .alliances
                .get(&id)
                .map(|a| a.name.clone())
                .unwrap_or_default();
            let proposer_title = session.title_of(proposer);
            session.push_log(
                Some(actor),
                Some(proposer),
                ActionKind::AllianceAccepted,
                format!("{actor_title} and {proposer_title} sealed an alliance ({name})"),
                true,
            );
            Ok(Effect::AllianceFormed(id))
        }

        Action::AllianceDissolve { alliance: id } => {
            let name = session
                .alliances
                .get(id)
                .map(|a| a.name.clone())
                .ok_or(ActionError::AllianceNotFound)?;
            alliance::dissolve(session, actor, *id)?;
            session.push_log(
                Some(actor),
                None,
                ActionKind::AllianceDissolved,
                format!("{actor_title} left {name}"),
                true,
            );
            Ok(Effect::AllianceLeft(*id))
        }

        Action::Accuse { target, charge } => {
            let id = trial::file_charge(session, actor, *target, charge.clone())?;
            let target_title = session.title_of(*target);
            session.push_log(
                Some(actor),
                Some(*target),
                ActionKind::Accusation,
                format!("{actor_title} accused {target_title} of treason: {charge}"),
                true,
            );
            Ok(Effect::TrialOpened(id))
        }

        Action::Vote {
            trial: trial_id,
            choice,
        } => {
            let accused = session
                .trials
                .get(trial_id)
                .map(|t| t.accused)
                .ok_or(ActionError::TrialNotFound)?;
            trial::cast_vote(session, actor, *trial_id, *choice)?;
            let accused_title = session.title_of(accused);
            session.push_log(
                Some(actor),
                Some(accused),
                ActionKind::Vote,
                format!("{actor_title} voted {choice} in the trial of {accused_title}"),
                true,
            );
            Ok(Effect::VoteRecorded(*trial_id))
        }

        Action::Bribe { target } => {
            let amount = session.config.bribe_cost;
            session.charge(actor, amount)?;
            if let Some(p) = session.player_mut(*target) {
                p.gold += amount;
            }
            let target_title = session.title_of(*target);
            session.push_log(
                Some(actor),
                Some(*target),
                ActionKind::Bribe,
                format!("offered a bribe of {amount} gold to {target_title}"),
                false,
            );
            Ok(Effect::BribeDelivered {
                target: *target,
                amount,
            })
        }

        Action::Inspect { target } => {
            let profile = crate::visibility::public_profile(session, *target)
                .ok_or(ActionError::InvalidTarget)?;
            Ok(Effect::Inspected(profile))
        }

        Action::ProposeRevolt { allies } => {
            let attempt = revolt::propose(session, actor, allies)?;
            session.push_log(
                Some(actor),
                None,
                ActionKind::RevoltProposed,
                format!(
                    "plotted a revolt with {} allies ({}% estimated success)",
                    attempt.allies.len(),
                    attempt.success_chance
                ),
                false,
            );
            Ok(Effect::RevoltProposed {
                attempt: attempt.id,
                success_chance: attempt.success_chance,
            })
        }

        Action::ConfirmRevolt { attempt } => {
            let chance = revolt::confirm(session, actor, *attempt)?;
            session.push_log(
                Some(actor),
                None,
                ActionKind::RevoltConfirmed,
                format!("committed to the revolt ({chance}% estimated success)"),
                false,
            );
            Ok(Effect::RevoltConfirmed {
                attempt: *attempt,
                success_chance: chance,
            })
        }
    }
}
