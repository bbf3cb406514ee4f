use tactics_core::{CombatPhase, FactionId, Position, TurnAdvance};
use tactics_runtime::{CombatSession, SessionConfig, SquadStrength, UnitDamageResolver, planner};

fn battle(seed: u64) -> (CombatSession, Vec<FactionId>) {
    let mut session = CombatSession::new(
        SessionConfig::default().with_seed(seed),
        Box::new(UnitDamageResolver::default()),
    );

    let strong = session.factions().create_faction("Strong", true);
    let weak = session.factions().create_faction("Weak", false);
    for (faction, units, spots) in [
        (strong, 6, [(0, 0), (0, 2)]),
        (weak, 2, [(6, 0), (6, 2)]),
    ] {
        for (x, y) in spots {
            let squad = session.battlefield_mut().spawn_squad("squad");
            session
                .battlefield_mut()
                .world
                .insert(squad, SquadStrength::new(units, 10))
                .unwrap();
            session
                .factions()
                .add_squad_to_faction(faction, squad, Position::new(x, y))
                .unwrap();
        }
    }
    session.start(&[strong, weak]).unwrap();
    (session, vec![strong, weak])
}

fn fight(session: &mut CombatSession) -> u32 {
    let mut rounds = 1;
    while session.phase() == CombatPhase::Active && rounds <= 20 {
        if let TurnAdvance::NewRound { round, .. } = planner::play_turn(session).unwrap().advance {
            rounds = round;
        }
    }
    rounds
}

#[test]
fn stronger_faction_wins_a_planned_battle() {
    let (mut session, factions) = battle(7);
    fight(&mut session);

    assert_eq!(session.phase(), CombatPhase::Resolving);
    let result = session.end_combat().unwrap();
    assert_eq!(result.victor, Some(factions[0]));
    assert!(!session.attacks().is_empty());
}

#[test]
fn planned_battles_are_reproducible() {
    let (mut first, _) = battle(99);
    let (mut second, _) = battle(99);
    fight(&mut first);
    fight(&mut second);
    assert_eq!(first.report(), second.report());
}

#[test]
fn squads_close_distance_before_attacking() {
    let (mut session, factions) = battle(3);
    while session.current_faction() != Some(factions[0]) {
        session.end_faction_turn().unwrap();
    }

    let summary = planner::play_turn(&mut session).unwrap();
    assert_eq!(summary.executed, 2);
    assert_ne!(summary.advance, TurnAdvance::Resolving);
    assert_eq!(session.current_faction(), Some(factions[1]));
    assert!(session.attacks().is_empty());
    let world = &session.battlefield().world;
    let positions: Vec<_> = tactics_core::combat::queries::squads_for_faction(world, factions[0])
        .into_iter()
        .filter_map(|squad| tactics_core::combat::queries::squad_position(world, squad))
        .collect();
    assert_eq!(positions, vec![Position::new(3, 0), Position::new(3, 2)]);
}
