#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Heist.
//!
//! The world owns the grid, the guards, the levers and the exit lock of the
//! loaded level. All mutation flows through [`apply`]; read access goes
//! through the [`query`] module.

mod config;
mod level;
mod levers;
mod lock;

use heist_core::{
    BribePolicy, BribeRejection, Command, CoordSpace, Difficulty, Event, GridSurface, GuardId,
    Position, Symbol, TREASURE_VALUE,
};
use heist_system_guards::Guard;
use tracing::{debug, info, warn};

pub use config::{ConfigError, WorldConfig};
pub use level::{GuardBlueprint, LevelBlueprint, LevelError, LeverBlueprint};

use crate::{levers::Lever, lock::LevelLock};

/// Loaded level together with everything needed to reset it.
#[derive(Debug)]
pub struct World {
    surface: GridSurface,
    guards: Vec<Guard>,
    levers: Vec<Lever>,
    lock: LevelLock,
    initial_cells: Vec<Symbol>,
    initial_levers: Vec<Lever>,
    initial_lock: LevelLock,
    exit: Position,
    player_start: Position,
    difficulty: Difficulty,
    bribes_paid: u32,
    loot: u32,
    tick_index: u64,
}

impl World {
    /// Validates the blueprint and builds a playable level from it.
    pub fn load(blueprint: &LevelBlueprint, config: &WorldConfig) -> Result<Self, LevelError> {
        let level = blueprint.build(config)?;
        let offset = level.surface.offset();

        info!(
            columns = level.surface.columns(),
            rows = level.surface.rows(),
            guards = level.guards.len(),
            levers = level.levers.len(),
            "level loaded"
        );

        Ok(Self {
            initial_cells: level.surface.cells().to_vec(),
            initial_levers: level.levers.clone(),
            initial_lock: level.lock.clone(),
            surface: level.surface,
            guards: level.guards,
            levers: level.levers,
            lock: level.lock,
            exit: offset.to_screen(blueprint.exit),
            player_start: offset.to_screen(blueprint.player_start),
            difficulty: config.difficulty,
            bribes_paid: 0,
            loot: 0,
            tick_index: 0,
        })
    }

    fn guard_mut(&mut self, id: GuardId) -> Option<&mut Guard> {
        self.guards.iter_mut().find(|guard| guard.id() == id)
    }

    fn tick(&mut self, dt: std::time::Duration, player: Position, out: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out.push(Event::TimeAdvanced { dt });

        for guard in &mut self.guards {
            let update = guard.update(&self.surface, player, dt, out);

            if let Some(to) = update.moved_to {
                if self.surface.symbol_at(to, CoordSpace::Screen) == Some(Symbol::LeverOn) {
                    let _ = levers::toggle_at(&mut self.levers, &mut self.surface, to, out);
                }
            }

            if update.captured {
                info!(
                    guard = guard.id().get(),
                    x = player.x(),
                    y = player.y(),
                    "player captured"
                );
            }
        }
    }

    fn bribe(&mut self, id: GuardId, out: &mut Vec<Event>) {
        let policy = self.difficulty.bribe_policy();
        let cost = self.difficulty.bribe_cost(self.bribes_paid);
        let loot = self.loot;
        let Some(guard) = self.guard_mut(id) else {
            reject_bribe(id, BribeRejection::UnknownGuard, out);
            return;
        };

        let verdict = match (policy, cost) {
            (BribePolicy::Never, _) | (_, None) => Err(BribeRejection::NotAllowed),
            _ if guard.is_bribed() => Err(BribeRejection::AlreadyBribed),
            (BribePolicy::Once, _) if guard.bribed_before() => Err(BribeRejection::AlreadyBribed),
            (_, Some(cost)) if loot < cost => Err(BribeRejection::InsufficientFunds),
            (_, Some(cost)) => Ok(cost),
        };
        let cost = match verdict {
            Ok(cost) => cost,
            Err(reason) => {
                reject_bribe(id, reason, out);
                return;
            }
        };

        out.push(Event::GuardBribed { guard: id, cost });
        guard.bribe(policy, out);
        self.loot = self.loot.saturating_sub(cost);
        self.bribes_paid = self.bribes_paid.saturating_add(1);
        info!(guard = id.get(), cost, "guard bribed");
    }

    fn collect_key(&mut self, at: Position, out: &mut Vec<Event>) {
        if self.surface.symbol_at(at, CoordSpace::Screen) != Some(Symbol::Key) {
            warn!(x = at.x(), y = at.y(), "no key piece to collect");
            return;
        }

        out.push(Event::KeyCollected { at });
        if self.lock.collect(&mut self.surface, at) {
            info!("exit unlocked");
            out.push(Event::ExitUnlocked);
        }
    }

    fn collect_treasure(&mut self, at: Position, out: &mut Vec<Event>) {
        if self.surface.symbol_at(at, CoordSpace::Screen) != Some(Symbol::Treasure) {
            warn!(x = at.x(), y = at.y(), "no treasure to collect");
            return;
        }

        let _ = self.surface.set_symbol(at, CoordSpace::Screen, Symbol::Empty);
        self.loot = self.loot.saturating_add(TREASURE_VALUE);
        out.push(Event::TreasureCollected {
            at,
            value: TREASURE_VALUE,
        });
    }

    fn reset(&mut self, out: &mut Vec<Event>) {
        let _ = self.surface.restore(&self.initial_cells);
        self.levers.clone_from(&self.initial_levers);
        self.lock.clone_from(&self.initial_lock);
        self.surface.set_exit_locked(self.lock.is_locked());
        for guard in &mut self.guards {
            guard.reset();
        }
        self.loot = 0;

        info!("level reset");
        out.push(Event::LevelReset);
    }

    fn flush_tile_changes(&mut self, out: &mut Vec<Event>) {
        out.extend(self.surface.drain_changes().map(|change| Event::TileChanged {
            at: change.position,
            symbol: change.symbol,
        }));
    }
}

fn reject_bribe(guard: GuardId, reason: BribeRejection, out: &mut Vec<Event>) {
    warn!(guard = guard.get(), ?reason, "bribe rejected");
    out.push(Event::BribeRejected { guard, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt, player } => world.tick(dt, player, out_events),
        Command::BribeGuard { guard } => world.bribe(guard, out_events),
        Command::SetDifficulty { difficulty } => {
            debug!(?difficulty, "difficulty changed");
            world.difficulty = difficulty;
            out_events.push(Event::DifficultyChanged { difficulty });
        }
        Command::ToggleLever { at } => {
            if !levers::toggle_at(&mut world.levers, &mut world.surface, at, out_events) {
                warn!(x = at.x(), y = at.y(), "no lever to toggle");
                out_events.push(Event::LeverMissing { at });
            }
        }
        Command::CollectKey { at } => world.collect_key(at, out_events),
        Command::CollectTreasure { at } => world.collect_treasure(at, out_events),
        Command::ResetLevel => world.reset(out_events),
    }

    world.flush_tile_changes(out_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use heist_core::{Difficulty, GridSurface, GuardId, LeverId, Position};
    use heist_system_guards::GuardSnapshot;

    use super::World;

    /// Provides read-only access to the level grid.
    #[must_use]
    pub fn surface(world: &World) -> &GridSurface {
        &world.surface
    }

    /// Captures every guard in update order.
    #[must_use]
    pub fn guards(world: &World) -> Vec<GuardSnapshot> {
        world.guards.iter().map(|guard| guard.snapshot()).collect()
    }

    /// Captures a single guard.
    #[must_use]
    pub fn guard(world: &World, id: GuardId) -> Option<GuardSnapshot> {
        world
            .guards
            .iter()
            .find(|guard| guard.id() == id)
            .map(|guard| guard.snapshot())
    }

    /// Ordered screen-space patrol route of a guard.
    #[must_use]
    pub fn patrol(world: &World, id: GuardId) -> Option<&[Position]> {
        world
            .guards
            .iter()
            .find(|guard| guard.id() == id)
            .map(|guard| guard.patrol())
    }

    /// Reports whether each lever is switched on, in blueprint order.
    #[must_use]
    pub fn levers(world: &World) -> Vec<(LeverId, bool)> {
        world
            .levers
            .iter()
            .map(|lever| (lever.id(), lever.is_on()))
            .collect()
    }

    /// Progress toward unlocking the exit.
    #[must_use]
    pub fn key_progress(world: &World) -> KeyProgress {
        KeyProgress {
            revealed: world.lock.revealed(),
            hidden: world.lock.hidden(),
            exit_locked: world.surface.is_exit_locked(),
        }
    }

    /// Screen-space position of the exit.
    #[must_use]
    pub fn exit(world: &World) -> Position {
        world.exit
    }

    /// Screen-space position the player enters the level at.
    #[must_use]
    pub fn player_start(world: &World) -> Position {
        world.player_start
    }

    /// Difficulty currently in effect.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Price of the next bribe, or `None` when bribes are not allowed.
    #[must_use]
    pub fn next_bribe_cost(world: &World) -> Option<u32> {
        world.difficulty.bribe_cost(world.bribes_paid)
    }

    /// Value of the treasure collected since the level was loaded or reset,
    /// less the bribes paid out of it.
    #[must_use]
    pub fn loot(world: &World) -> u32 {
        world.loot
    }

    /// Number of ticks processed since the level was loaded.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Key pieces left before the exit opens.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct KeyProgress {
        /// Pieces currently visible on the grid.
        pub revealed: u32,
        /// Pieces that have not appeared yet.
        pub hidden: usize,
        /// Whether the exit is still locked.
        pub exit_locked: bool,
    }
}
