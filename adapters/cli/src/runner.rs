//! Drives a world with a scripted player until the heist resolves.

use std::time::Duration;

use anyhow::{Context, Result};
use heist_core::{BribeRejection, Command, CoordSpace, Event, GuardId, Position, Symbol};
use heist_system_guards::GuardSnapshot;
use heist_world::{self as world, query, World};
use tracing::{debug, info};

use crate::scenario::Scenario;

/// How a scripted session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The player walked through the unlocked exit.
    Escaped,
    /// A guard caught the player and refused a bribe.
    Arrested {
        guard: GuardId,
        reason: BribeRejection,
    },
    /// The tick budget ran out first.
    OutOfTime,
}

/// Totals gathered over a session.
#[derive(Clone, Debug)]
pub(crate) struct Summary {
    pub(crate) outcome: Outcome,
    pub(crate) ticks: u64,
    pub(crate) player: Position,
    pub(crate) loot: u32,
    pub(crate) captures: u32,
    pub(crate) bribes: u32,
    pub(crate) bribe_spent: u32,
    pub(crate) guards: Vec<GuardSnapshot>,
}

/// Scripted player walking a precomputed tile path.
#[derive(Debug)]
struct Player {
    path: Vec<Position>,
    index: usize,
    step: Duration,
    accumulator: Duration,
}

impl Player {
    fn new(path: Vec<Position>, step: Duration) -> Self {
        Self {
            path,
            index: 0,
            step,
            accumulator: Duration::ZERO,
        }
    }

    fn position(&self) -> Position {
        self.path.get(self.index).copied().unwrap_or_default()
    }

    /// Moves one tile along the path when enough time has passed and the next
    /// tile is open. Returns the tile entered.
    fn advance(&mut self, world: &World, dt: Duration) -> Option<Position> {
        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < self.step {
            return None;
        }
        self.accumulator -= self.step;

        let next = *self.path.get(self.index + 1)?;
        if !query::surface(world).is_walkable(next) {
            debug!(x = next.x(), y = next.y(), "player waiting on blocked tile");
            return None;
        }
        self.index += 1;
        Some(next)
    }
}

/// Runs `scenario` for at most `ticks` ticks of `tick` each.
pub(crate) fn run(scenario: &Scenario, ticks: u64, tick: Duration) -> Result<(World, Summary)> {
    let mut world =
        World::load(&scenario.level, &scenario.world).context("failed to load level")?;
    let offset = query::surface(&world).offset();
    let path = scenario
        .player
        .tiles(scenario.level.player_start)
        .into_iter()
        .map(|tile| offset.to_screen(tile))
        .collect();
    let mut player = Player::new(path, Duration::from_millis(scenario.player.step_ms));

    let mut summary = Summary {
        outcome: Outcome::OutOfTime,
        ticks: 0,
        player: player.position(),
        loot: 0,
        captures: 0,
        bribes: 0,
        bribe_spent: 0,
        guards: Vec::new(),
    };
    let mut events = Vec::new();

    while summary.ticks < ticks {
        summary.ticks += 1;

        if let Some(entered) = player.advance(&world, tick) {
            if interact(&mut world, entered, &mut events) {
                info!(ticks = summary.ticks, "player escaped");
                summary.outcome = Outcome::Escaped;
                break;
            }
        }

        world::apply(
            &mut world,
            Command::Tick {
                dt: tick,
                player: player.position(),
            },
            &mut events,
        );

        let mut captors: Vec<GuardId> = events
            .drain(..)
            .filter_map(|event| match event {
                Event::PlayerCaptured { guard } => Some(guard),
                _ => None,
            })
            .collect();
        captors.dedup();

        for guard in captors {
            summary.captures += 1;
            world::apply(&mut world, Command::BribeGuard { guard }, &mut events);

            for event in events.drain(..) {
                match event {
                    Event::GuardBribed { cost, .. } => {
                        summary.bribes += 1;
                        summary.bribe_spent += cost;
                    }
                    Event::BribeRejected { reason, .. } => {
                        info!(guard = guard.get(), ?reason, "player arrested");
                        summary.outcome = Outcome::Arrested { guard, reason };
                    }
                    _ => {}
                }
            }
        }

        if matches!(summary.outcome, Outcome::Arrested { .. }) {
            break;
        }
    }

    summary.player = player.position();
    summary.loot = query::loot(&world);
    summary.guards = query::guards(&world);
    Ok((world, summary))
}

/// Picks up whatever lies on `at`. Returns `true` when `at` is the open exit.
fn interact(world: &mut World, at: Position, events: &mut Vec<Event>) -> bool {
    let command = match query::surface(world).symbol_at(at, CoordSpace::Screen) {
        Some(Symbol::Key) => Command::CollectKey { at },
        Some(Symbol::Treasure) => Command::CollectTreasure { at },
        Some(Symbol::LeverOff | Symbol::LeverOn) => Command::ToggleLever { at },
        Some(Symbol::Exit) => return !query::key_progress(world).exit_locked,
        _ => return false,
    };

    debug!(?command, "player interaction");
    world::apply(world, command, events);
    events.clear();
    false
}
