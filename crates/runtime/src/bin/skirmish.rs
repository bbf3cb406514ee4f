//! Scripted two-faction skirmish driven entirely by the planner.
use anyhow::{Context, Result};
use tactics_core::{CombatPhase, Position, TurnAdvance};
use tactics_runtime::{CombatSession, SessionConfig, SquadStrength, UnitDamageResolver, planner};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env();
    let max_rounds = config.max_rounds;
    let mut session = CombatSession::new(config, Box::new(UnitDamageResolver::default()));

    let roster = [
        ("Iron Guard", true, [(0, 0), (0, 2)]),
        ("Ash Raiders", false, [(7, 1), (7, 3)]),
    ];
    let mut factions = Vec::new();
    for (name, is_player, placements) in roster {
        let faction = session.factions().create_faction(name, is_player);
        for (i, (x, y)) in placements.into_iter().enumerate() {
            let field = session.battlefield_mut();
            let squad = field.spawn_squad(format!("{name} {}", i + 1));
            field.world.insert(squad, SquadStrength::new(4, 10))?;
            session
                .factions()
                .add_squad_to_faction(faction, squad, Position::new(x, y))
                .with_context(|| format!("placing {name} squad"))?;
        }
        factions.push(faction);
    }

    session.start(&factions)?;

    while session.phase() == CombatPhase::Active {
        match planner::play_turn(&mut session)?.advance {
            TurnAdvance::NewRound { round, .. } if round > max_rounds => {
                tracing::warn!(max_rounds, "round limit reached");
                break;
            }
            _ => {}
        }
    }

    let result = session.end_combat()?;
    match result.victor {
        Some(victor) => tracing::info!(%victor, rounds = result.rounds_completed, "battle won"),
        None => tracing::info!(rounds = result.rounds_completed, "battle ended without a victor"),
    }

    println!("{}", session.report().to_json()?);
    Ok(())
}
