// ═══════════════════════════════════════════════════════════════════════
// Espionage — spy deployments and tiered intelligence reports
//
// Reports snapshot the target at deploy time; the visibility filter
// substitutes those exact values for the observer who owns the report.
// Deployments are private. The target is never notified synchronously,
// but a redacted public log entry keeps deployments auditable.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::GameConfig;
use crate::errors::ActionResult;
use crate::types::*;

/// cost(tier) = base + tier * increment (50 + 25*tier by default).
pub fn spy_cost(config: &GameConfig, tier: IntelTier) -> u32 {
    config.spy_base_cost + config.spy_tier_increment * tier.level()
}

/// Deploy a spy against a target. The processor has already verified the
/// target is alive and distinct from the spy; this checks funds, debits,
/// snapshots, and files the report in one unit.
pub fn deploy(
    session: &mut GameSession,
    spy: PlayerId,
    target: PlayerId,
    tier: IntelTier,
) -> ActionResult<EspionageReport> {
    let cost = spy_cost(&session.config, tier);
    let content = snapshot(session, target, tier)?;

    session.charge(spy, cost)?;
    if let Some(p) = session.player_mut(spy) {
        p.spy_count += 1;
    }

    let id = session.alloc_report_id();
    let report = EspionageReport {
        id,
        owner: spy,
        target,
        tier,
        turn: session.turn,
        content,
    };
    session.reports.insert(id, report.clone());
    Ok(report)
}

/// Snapshot what the given tier discloses about the target. Strictly
/// cumulative: every field unlocked below the tier is filled in.
fn snapshot(session: &GameSession, target: PlayerId, tier: IntelTier) -> ActionResult<ReportContent> {
    let player = session
        .player(target)
        .ok_or(crate::errors::ActionError::InvalidTarget)?;

    let resources = (tier >= IntelTier::Resources).then(|| ResourceSnapshot {
        gold: player.gold,
        power: player.power,
        spy_count: player.spy_count,
    });
    let alliances = (tier >= IntelTier::Alliances).then(|| session.alliances_of(target));
    let intent = (tier >= IntelTier::Intent).then_some(player.intent);

    Ok(ReportContent {
        title: player.title.clone(),
        status: player.status,
        influence_weight: player.influence_weight,
        resources,
        alliances,
        intent,
    })
}
