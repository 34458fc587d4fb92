// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for running demo sessions
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use intrigue_engine::setup::{create_session, default_roster};
use intrigue_engine::types::{IntelTier, PlayerId, Verdict};
use intrigue_engine::{Action, Effect, GameConfig, LogFilter};
use intrigue_session::{SessionError, SessionHandle};

#[derive(Parser)]
#[command(name = "intrigue-runner", about = "Court Intrigue session engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted demo session: alliances, espionage, a trial, and a
    /// revolt, then print the log and one player's redacted view
    Demo {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Player whose redacted view to print at the end (1-10)
        #[arg(short, long, default_value_t = 1)]
        observer: u32,
        /// Print the final redacted view as pretty JSON
        #[arg(short, long, default_value_t = false)]
        json: bool,
    },
    /// Print the default ten-noble roster
    Roster,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Demo {
            seed,
            observer,
            json,
        } => cmd_demo(seed, PlayerId(observer), json),
        Commands::Roster => {
            cmd_roster();
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("Session error: {e}");
        std::process::exit(1);
    }
}

fn cmd_roster() {
    println!("=== Default roster ===\n");
    for (i, seed) in default_roster().iter().enumerate() {
        println!(
            "  {:>2}. {:22} gold: {:>4}  power: {:>2}  spies: {}  influence: {}",
            i + 1,
            seed.title,
            seed.gold,
            seed.power,
            seed.spy_count,
            seed.influence_weight
        );
    }
}

fn cmd_demo(seed: u64, observer: PlayerId, json: bool) -> Result<(), SessionError> {
    println!("=== Court Intrigue demo session (seed {seed}) ===\n");

    let session = create_session(default_roster(), GameConfig::default(), seed);
    let (handle, worker) = SessionHandle::spawn(session);

    // Turn 1, planning: the Crimson Duke builds a coalition.
    let proposal = match handle.submit(
        PlayerId(1),
        Action::AlliancePropose {
            target: PlayerId(6),
            into_alliance: None,
        },
    )? {
        Effect::ProposalSent(id) => id,
        other => unreachable!("propose returned {other:?}"),
    };
    let alliance = match handle.submit(PlayerId(6), Action::AllianceAccept { proposal })? {
        Effect::AllianceFormed(id) => id,
        other => unreachable!("accept returned {other:?}"),
    };
    let proposal = match handle.submit(
        PlayerId(1),
        Action::AlliancePropose {
            target: PlayerId(8),
            into_alliance: Some(alliance),
        },
    )? {
        Effect::ProposalSent(id) => id,
        other => unreachable!("propose returned {other:?}"),
    };
    handle.submit(PlayerId(8), Action::AllianceAccept { proposal })?;

    // The Silver Baroness wants to know what the Duke is really up to.
    handle.submit(
        PlayerId(2),
        Action::Spy {
            target: PlayerId(1),
            tier: IntelTier::Intent,
        },
    )?;

    // The Golden Merchant drags the Bronze Chancellor before the court.
    let trial = match handle.submit(
        PlayerId(3),
        Action::Accuse {
            target: PlayerId(10),
            charge: "selling court secrets".into(),
        },
    )? {
        Effect::TrialOpened(id) => id,
        other => unreachable!("accuse returned {other:?}"),
    };

    // Planning runs out; the trial opens for votes.
    handle.tick(180)?;
    handle.submit(PlayerId(4), Action::Vote { trial, choice: Verdict::Guilty })?;
    handle.submit(PlayerId(5), Action::Vote { trial, choice: Verdict::Innocent })?;
    handle.submit(PlayerId(2), Action::Vote { trial, choice: Verdict::Innocent })?;

    // Finish the turn; turn 2 begins.
    handle.tick(150)?;

    // Turn 2: the coalition moves against the throne.
    let attempt = match handle.submit(
        PlayerId(1),
        Action::ProposeRevolt {
            allies: vec![PlayerId(6), PlayerId(8)],
        },
    )? {
        Effect::RevoltProposed { attempt, .. } => attempt,
        other => unreachable!("revolt proposal returned {other:?}"),
    };
    match handle.submit(PlayerId(1), Action::ConfirmRevolt { attempt })? {
        Effect::RevoltConfirmed { success_chance, .. } => {
            println!("The coalition commits to revolt ({success_chance}% estimated success)\n")
        }
        other => unreachable!("revolt confirmation returned {other:?}"),
    }

    // Run the turn out; the revolt resolves at the voting boundary.
    handle.tick(330)?;

    println!("--- Events visible to {observer} ---");
    for entry in handle.log(observer, LogFilter::All)? {
        let tag = if entry.public { "public " } else { "private" };
        println!(
            "  [turn {} {:10} {tag}] {}",
            entry.turn, entry.phase.to_string(), entry.detail
        );
    }

    let view = handle.view(observer)?;
    println!("\n--- Final state as seen by {} ---", observer);
    match view.outcome {
        Some(outcome) => println!("  Session over: {outcome:?}"),
        None => println!("  Session continues (turn {}, {} phase)", view.turn, view.phase),
    }
    if json {
        match serde_json::to_string_pretty(&view) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("view serialization failed: {e}"),
        }
    } else {
        for player in &view.players {
            let exact = if player.gold_exact { "" } else { "~" };
            println!(
                "  {:22} {:?}  gold: {exact}{:<4}  influence: {}",
                player.title, player.status, player.gold, player.influence_weight
            );
        }
    }

    handle.shutdown()?;
    let _ = worker.join();
    Ok(())
}
