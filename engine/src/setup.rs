// ═══════════════════════════════════════════════════════════════════════
// Session setup — creates the initial GameSession for a roster
// ═══════════════════════════════════════════════════════════════════════

use crate::config::GameConfig;
use crate::types::*;
use std::collections::BTreeMap;

/// Starting configuration for one player.
#[derive(Debug, Clone)]
pub struct PlayerSeed {
    pub title: String,
    pub gold: u32,
    pub power: u32,
    pub spy_count: u32,
    pub influence_weight: u32,
    pub intent: Intent,
    pub position: Position,
}

impl PlayerSeed {
    pub fn new(
        title: &str,
        gold: u32,
        power: u32,
        spy_count: u32,
        influence_weight: u32,
        intent: Intent,
        position: (u8, u8),
    ) -> Self {
        PlayerSeed {
            title: title.to_string(),
            gold,
            power,
            spy_count,
            influence_weight,
            intent,
            position: Position {
                x: position.0,
                y: position.1,
            },
        }
    }
}

/// The ten-noble roster used by the reference client, arranged around
/// the throne.
pub fn default_roster() -> Vec<PlayerSeed> {
    vec![
        PlayerSeed::new("The Crimson Duke", 450, 12, 2, 3, Intent::Revolt, (50, 15)),
        PlayerSeed::new("The Silver Baroness", 320, 8, 1, 2, Intent::Loyal, (75, 25)),
        PlayerSeed::new("The Golden Merchant", 680, 5, 3, 4, Intent::Neutral, (85, 50)),
        PlayerSeed::new("The Iron General", 280, 18, 0, 5, Intent::Loyal, (75, 75)),
        PlayerSeed::new("The Jade Diplomat", 410, 7, 2, 3, Intent::Neutral, (50, 85)),
        PlayerSeed::new("The Obsidian Lord", 520, 14, 1, 4, Intent::Revolt, (25, 75)),
        PlayerSeed::new("The Sapphire Scholar", 290, 4, 4, 2, Intent::Neutral, (15, 50)),
        PlayerSeed::new("The Amber Assassin", 380, 11, 2, 2, Intent::Revolt, (25, 25)),
        PlayerSeed::new("The Pearl Priestess", 340, 6, 1, 3, Intent::Loyal, (35, 35)),
        PlayerSeed::new("The Bronze Chancellor", 300, 9, 1, 2, Intent::Neutral, (65, 35)),
    ]
}

/// Create the initial session state for a roster. Seed controls every
/// revolt draw for reproducibility.
pub fn create_session(seeds: Vec<PlayerSeed>, config: GameConfig, seed: u64) -> GameSession {
    assert!(seeds.len() >= 3, "A session needs at least 3 players");

    let mut players = BTreeMap::new();
    for (i, s) in seeds.into_iter().enumerate() {
        let id = PlayerId(i as u32 + 1);
        players.insert(
            id,
            Player {
                id,
                title: s.title,
                gold: s.gold,
                power: s.power,
                spy_count: s.spy_count,
                influence_weight: s.influence_weight,
                status: PlayerStatus::Alive,
                intent: s.intent,
                position: s.position,
            },
        );
    }

    let phase_remaining = config.planning_seconds;
    GameSession {
        turn: 1,
        phase: Phase::Planning,
        phase_remaining,
        config,
        players,
        alliances: BTreeMap::new(),
        proposals: BTreeMap::new(),
        trials: BTreeMap::new(),
        revolts: BTreeMap::new(),
        reports: BTreeMap::new(),
        log: Vec::new(),
        cooldowns: Vec::new(),
        outcome: None,
        halted: false,
        seed,
        rng_counter: 0,
        next_alliance: 0,
        next_proposal: 0,
        next_trial: 0,
        next_revolt: 0,
        next_report: 0,
        next_log: 0,
    }
}
