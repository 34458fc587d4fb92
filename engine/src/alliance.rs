// ═══════════════════════════════════════════════════════════════════════
// Alliance ledger — two-phase formation, unilateral dissolution
//
// Membership is symmetric and mutual: a player is never added without
// their own accept. Proposals are visible only to the two parties and
// expire silently at the turn boundary. Empty alliances are pruned.
// ═══════════════════════════════════════════════════════════════════════

use crate::errors::{ActionError, ActionResult};
use crate::types::*;
use std::collections::BTreeSet;

/// Heraldry assigned to newly founded alliances, cycled in order.
const HERALD_TABLE: [(&str, &str, &str); 8] = [
    ("The Crimson Pact", "#DC2626", "red-shield"),
    ("The Golden Circle", "#D97706", "gold-coin"),
    ("The Shadow Council", "#7C3AED", "dark-moon"),
    ("The Ivory Concord", "#E7E5E4", "white-tower"),
    ("The Verdant Oath", "#16A34A", "green-laurel"),
    ("The Obsidian Court", "#1E293B", "black-raven"),
    ("The Silver Compact", "#94A3B8", "silver-star"),
    ("The Sable Crown", "#451A03", "dark-crown"),
];

/// File an alliance proposal. Costs the configured gold; the debit and
/// the proposal are one unit. With `into_alliance` set, acceptance will
/// extend that alliance (the proposer must already be a member).
pub fn propose(
    session: &mut GameSession,
    proposer: PlayerId,
    target: PlayerId,
    into_alliance: Option<AllianceId>,
) -> ActionResult<ProposalId> {
    if let Some(alliance_id) = into_alliance {
        let alliance = session
            .alliances
            .get(&alliance_id)
            .ok_or(ActionError::AllianceNotFound)?;
        if !alliance.members.contains(&proposer) {
            return Err(ActionError::NotAllied);
        }
        if alliance.members.contains(&target) {
            return Err(ActionError::InvalidTarget);
        }
    } else if session.is_ally_of(proposer, target) {
        // Already sharing an alliance; a fresh two-member pact would be
        // redundant.
        return Err(ActionError::DuplicatePending);
    }

    session.charge(proposer, session.config.alliance_proposal_cost)?;

    let id = session.alloc_proposal_id();
    let turn = session.turn;
    session.proposals.insert(
        id,
        AllianceProposal {
            id,
            proposer,
            target,
            into_alliance,
            turn,
        },
    );
    Ok(id)
}

/// Accept a pending proposal. Only the proposal's target may accept, and
/// both parties must still be alive. Creates a fresh two-member alliance
/// or extends the named one.
pub fn accept(
    session: &mut GameSession,
    acceptor: PlayerId,
    proposal_id: ProposalId,
) -> ActionResult<AllianceId> {
    let proposal = session
        .proposals
        .get(&proposal_id)
        .cloned()
        .ok_or(ActionError::ProposalNotFound)?;
    if proposal.target != acceptor {
        return Err(ActionError::ProposalNotFound);
    }
    let proposer_alive = session
        .player(proposal.proposer)
        .is_some_and(|p| p.is_alive());
    if !proposer_alive {
        return Err(ActionError::TargetExecuted);
    }

    let alliance_id = match proposal.into_alliance {
        Some(existing) => {
            let alliance = session
                .alliances
                .get_mut(&existing)
                .ok_or(ActionError::AllianceNotFound)?;
            // The proposer may have left or been removed since proposing.
            if !alliance.members.contains(&proposal.proposer) {
                return Err(ActionError::NotAllied);
            }
            alliance.members.insert(acceptor);
            existing
        }
        None => {
            let id = session.alloc_alliance_id();
            let (name, color, emblem) = HERALD_TABLE[(id.0 as usize - 1) % HERALD_TABLE.len()];
            let members: BTreeSet<PlayerId> =
                [proposal.proposer, acceptor].into_iter().collect();
            session.alliances.insert(
                id,
                Alliance {
                    id,
                    name: name.to_string(),
                    color: color.to_string(),
                    emblem: emblem.to_string(),
                    members,
                },
            );
            id
        }
    };

    session.proposals.remove(&proposal_id);
    Ok(alliance_id)
}

/// Leave an alliance. Unilateral and immediate; always public. Prunes
/// the alliance if it ends up empty.
pub fn dissolve(
    session: &mut GameSession,
    member: PlayerId,
    alliance_id: AllianceId,
) -> ActionResult<()> {
    let alliance = session
        .alliances
        .get_mut(&alliance_id)
        .ok_or(ActionError::AllianceNotFound)?;
    if !alliance.members.remove(&member) {
        return Err(ActionError::NotAllied);
    }
    prune_empty(session);
    Ok(())
}

/// Drop expired proposals. Called after the turn counter advances; a
/// proposal made on turn T with TTL k survives through turn T+k-1.
/// Expiry is silent — no log entry.
pub fn expire_proposals(session: &mut GameSession) {
    let turn = session.turn;
    let ttl = session.config.proposal_ttl_turns;
    session.proposals.retain(|_, p| p.turn + ttl > turn);
}

pub fn prune_empty(session: &mut GameSession) {
    session.alliances.retain(|_, a| !a.members.is_empty());
}

/// Remove a player from every alliance and every pending proposal.
/// Used by the execution effect.
pub fn drop_player(session: &mut GameSession, id: PlayerId) {
    for alliance in session.alliances.values_mut() {
        alliance.members.remove(&id);
    }
    prune_empty(session);
    session
        .proposals
        .retain(|_, p| p.proposer != id && p.target != id);
}
