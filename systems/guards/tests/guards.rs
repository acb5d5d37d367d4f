use std::time::Duration;

use heist_core::{
    BribePolicy, CoordSpace, Event, GridSurface, GuardId, GuardMode, Offset, Position, Symbol,
    SurfaceRules,
};
use heist_system_guards::{Guard, GuardConfig};
use proptest::prelude::*;

const PATROL_TICK: Duration = Duration::from_millis(150);
const CHASE_TICK: Duration = Duration::from_millis(100);

fn open_grid(columns: usize, rows: usize) -> GridSurface {
    let rows = vec![" ".repeat(columns); rows];
    GridSurface::from_rows(rows.as_slice(), Offset::ZERO, SurfaceRules::default())
        .expect("valid grid")
}

fn mode_changes(events: &[Event]) -> Vec<(GuardMode, GuardMode)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::GuardModeChanged { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

fn captures(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::PlayerCaptured { .. }))
        .count()
}

#[test]
fn spotted_player_is_chased_then_guard_returns_to_its_route() {
    let grid = open_grid(15, 15);
    let waypoint = Position::new(5, 9);
    let mut guard = Guard::new(
        GuardId::new(1),
        Position::new(5, 5),
        vec![waypoint, Position::new(5, 2)],
        GuardConfig::default(),
    );
    let mut events = Vec::new();

    let update = guard.update(&grid, Position::new(6, 6), PATROL_TICK, &mut events);
    assert_eq!(guard.mode(), GuardMode::Alerted);
    assert!(events.contains(&Event::PlayerSpotted {
        guard: GuardId::new(1),
        at: Position::new(6, 6),
    }));
    assert_eq!(update.moved_to, Some(Position::new(5, 6)));
    assert!(update.captured);

    // The player slips away behind the guard and out of its aggro box.
    let hidden = Position::new(14, 0);
    let update = guard.update(&grid, hidden, CHASE_TICK, &mut events);
    assert_eq!(update.moved_to, Some(Position::new(6, 6)));
    assert_eq!(guard.mode(), GuardMode::Alerted);

    let _ = guard.update(&grid, hidden, CHASE_TICK, &mut events);
    assert_eq!(guard.mode(), GuardMode::Returning);

    for _ in 0..20 {
        if guard.mode() == GuardMode::Patrolling {
            break;
        }
        let _ = guard.update(&grid, hidden, PATROL_TICK, &mut events);
    }

    assert_eq!(guard.mode(), GuardMode::Patrolling);
    assert_eq!(guard.position(), waypoint);
    assert_eq!(
        mode_changes(&events),
        vec![
            (GuardMode::Patrolling, GuardMode::Alerted),
            (GuardMode::Alerted, GuardMode::Returning),
            (GuardMode::Returning, GuardMode::Patrolling),
        ]
    );
}

#[test]
fn alert_wears_off_when_the_target_cannot_be_reached() {
    let grid = GridSurface::from_rows(
        &[
            "     ", //
            "     ", //
            "#####", //
            "     ",
        ],
        Offset::ZERO,
        SurfaceRules::new(
            [heist_core::SymbolKind::Empty],
            [heist_core::SymbolKind::Empty, heist_core::SymbolKind::Gate],
        ),
    )
    .expect("valid grid");
    let config = GuardConfig {
        alert_duration_ms: 500,
        ..GuardConfig::default()
    };
    let mut guard = Guard::new(GuardId::new(2), Position::new(2, 0), Vec::new(), config);
    let mut events = Vec::new();

    // Gates are see-through here, so the guard spots the player it cannot reach.
    let player = Position::new(2, 3);
    let _ = guard.update(&grid, player, PATROL_TICK, &mut events);
    assert_eq!(guard.mode(), GuardMode::Alerted);

    let mut idle_steps = 0;
    let away = Position::new(40, 40);
    while guard.mode() == GuardMode::Alerted {
        let update = guard.update(&grid, away, CHASE_TICK, &mut events);
        assert_eq!(update.moved_to, None);
        idle_steps += 1;
        assert!(idle_steps <= 5, "alert never expired");
    }

    assert_eq!(idle_steps, 5);
    assert_eq!(guard.mode(), GuardMode::Returning);
}

#[test]
fn bribed_guard_neither_sees_nor_captures() {
    let grid = open_grid(12, 12);
    let mut guard = Guard::new(
        GuardId::new(3),
        Position::new(5, 5),
        Vec::new(),
        GuardConfig::default(),
    );
    let mut events = Vec::new();
    guard.bribe(BribePolicy::Once, &mut events);

    let adjacent = Position::new(5, 6);
    for _ in 0..4 {
        let _ = guard.update(&grid, adjacent, PATROL_TICK, &mut events);
    }
    assert_eq!(captures(&events), 0);
    assert_eq!(guard.mode(), GuardMode::Patrolling);
    assert!(guard.is_bribed());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PlayerSpotted { .. })));

    let update = guard.update(&grid, adjacent, PATROL_TICK, &mut events);
    assert!(events.contains(&Event::BribeExpired {
        guard: GuardId::new(3)
    }));
    assert!(update.captured);
    assert!(guard.bribed_before());
    assert_eq!(guard.mode(), GuardMode::Alerted);
}

#[test]
fn bribe_calls_off_an_active_chase() {
    let grid = open_grid(12, 12);
    let mut guard = Guard::new(
        GuardId::new(4),
        Position::new(5, 5),
        vec![Position::new(5, 1)],
        GuardConfig::default(),
    );
    let mut events = Vec::new();
    let _ = guard.update(&grid, Position::new(5, 8), PATROL_TICK, &mut events);
    assert_eq!(guard.mode(), GuardMode::Alerted);

    events.clear();
    guard.bribe(BribePolicy::Unlimited, &mut events);
    assert_eq!(guard.mode(), GuardMode::Returning);
    assert_eq!(
        mode_changes(&events),
        vec![(GuardMode::Alerted, GuardMode::Returning)]
    );
    assert_eq!(guard.snapshot().last_known, None);
}

#[test]
fn unlimited_bribes_never_use_up_the_allowance() {
    let grid = open_grid(12, 12);
    let mut guard = Guard::new(
        GuardId::new(5),
        Position::new(5, 5),
        Vec::new(),
        GuardConfig::default(),
    );
    let mut events = Vec::new();
    guard.bribe(BribePolicy::Unlimited, &mut events);

    for _ in 0..6 {
        let _ = guard.update(&grid, Position::new(0, 0), PATROL_TICK, &mut events);
    }
    assert!(!guard.is_bribed());
    assert!(!guard.bribed_before());
}

#[test]
fn walls_hide_the_player() {
    let mut grid = open_grid(12, 12);
    let _ = grid.set_symbol(Position::new(5, 7), CoordSpace::Screen, Symbol::Wall('█'));
    let mut guard = Guard::new(
        GuardId::new(6),
        Position::new(5, 5),
        Vec::new(),
        GuardConfig::default(),
    );
    let mut events = Vec::new();

    let _ = guard.update(&grid, Position::new(5, 9), PATROL_TICK, &mut events);
    assert_eq!(guard.mode(), GuardMode::Patrolling);
    assert!(events.is_empty());
}

proptest! {
    #[test]
    fn accumulator_carries_the_remainder(steps in proptest::collection::vec(1u64..=150, 1..60)) {
        let grid = open_grid(40, 3);
        let mut guard = Guard::new(
            GuardId::new(7),
            Position::new(0, 1),
            vec![Position::new(39, 1), Position::new(0, 1)],
            GuardConfig::default(),
        );
        let mut events = Vec::new();
        let mut stepped = 0u64;
        let mut total = 0u64;

        for millis in steps {
            total += millis;
            if guard.update(&grid, Position::new(500, 500), Duration::from_millis(millis), &mut events).stepped {
                stepped += 1;
            }
            prop_assert!(guard.accumulated() < PATROL_TICK);
        }

        prop_assert_eq!(
            Duration::from_millis(stepped * 150) + guard.accumulated(),
            Duration::from_millis(total)
        );
    }
}
