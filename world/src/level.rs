//! Level data supplied by loaders and its validation.

use std::collections::HashSet;

use heist_core::{
    CoordSpace, GridSurface, GuardId, LeverId, Offset, Position, SurfaceError, Symbol,
};
use heist_system_guards::Guard;
use heist_system_patrol::{order_waypoints, PatrolError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::WorldConfig, levers::Lever, lock::LevelLock};

/// Static description of a level as produced by a level loader.
///
/// Every position is level-local: `(0, 0)` is the first glyph of the first
/// row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBlueprint {
    /// One glyph string per grid row.
    pub rows: Vec<String>,
    /// Location of the exit tile.
    pub exit: Position,
    /// Where the player enters the level.
    pub player_start: Position,
    /// Guards in update order.
    #[serde(default)]
    pub guards: Vec<GuardBlueprint>,
    /// Levers and the gates wired to them.
    #[serde(default)]
    pub levers: Vec<LeverBlueprint>,
    /// Key pieces revealed one by one once the visible ones are collected.
    #[serde(default)]
    pub hidden_keys: Vec<Position>,
}

/// Guard placement within a [`LevelBlueprint`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardBlueprint {
    /// Identifier chosen by the level author.
    pub id: GuardId,
    /// Tile the guard starts on.
    pub origin: Position,
    /// Patrol waypoints in any order.
    #[serde(default)]
    pub waypoints: Vec<Position>,
}

/// Lever placement within a [`LevelBlueprint`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverBlueprint {
    /// Identifier chosen by the level author.
    pub id: LeverId,
    /// Tile holding the lever glyph.
    pub position: Position,
    /// Tiles flipped between gate and floor when the lever is pulled.
    #[serde(default)]
    pub gates: Vec<Position>,
}

/// Defects in level data detected while loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The grid rows could not form a rectangular surface.
    #[error("invalid level grid")]
    Surface(#[from] SurfaceError),
    /// The exit lies outside the grid.
    #[error("exit {0:?} lies outside the grid")]
    ExitOutOfBounds(Position),
    /// The player start lies outside the grid.
    #[error("player start {0:?} lies outside the grid")]
    PlayerStartOutOfBounds(Position),
    /// Two guards share an identifier.
    #[error("guard id {0:?} is used more than once")]
    DuplicateGuard(GuardId),
    /// A guard starts outside the grid.
    #[error("guard {guard:?} starts outside the grid at {at:?}")]
    GuardOutOfBounds {
        /// Offending guard.
        guard: GuardId,
        /// Level-local origin of the guard.
        at: Position,
    },
    /// A guard starts on a tile it cannot stand on.
    #[error("guard {guard:?} starts on a blocked tile at {at:?}")]
    GuardOnBlockedTile {
        /// Offending guard.
        guard: GuardId,
        /// Level-local origin of the guard.
        at: Position,
    },
    /// A patrol waypoint lies outside the grid.
    #[error("guard {guard:?} has a waypoint outside the grid at {at:?}")]
    WaypointOutOfBounds {
        /// Offending guard.
        guard: GuardId,
        /// Level-local waypoint.
        at: Position,
    },
    /// A guard's waypoints could not be chained into a route.
    #[error("patrol of guard {guard:?} cannot be sequenced")]
    Patrol {
        /// Offending guard.
        guard: GuardId,
        /// Failure reported by the sequencer.
        #[source]
        source: PatrolError,
    },
    /// Two levers share an identifier.
    #[error("lever id {0:?} is used more than once")]
    DuplicateLever(LeverId),
    /// A lever lies outside the grid.
    #[error("lever {lever:?} lies outside the grid at {at:?}")]
    LeverOutOfBounds {
        /// Offending lever.
        lever: LeverId,
        /// Level-local lever position.
        at: Position,
    },
    /// A gate wired to a lever lies outside the grid.
    #[error("lever {lever:?} controls a gate outside the grid at {at:?}")]
    GateOutOfBounds {
        /// Lever the gate is wired to.
        lever: LeverId,
        /// Level-local gate position.
        at: Position,
    },
    /// A hidden key piece lies outside the grid.
    #[error("hidden key piece {0:?} lies outside the grid")]
    KeyOutOfBounds(Position),
}

/// Validated runtime pieces assembled from a blueprint.
#[derive(Debug)]
pub(crate) struct Level {
    pub(crate) surface: GridSurface,
    pub(crate) guards: Vec<Guard>,
    pub(crate) levers: Vec<Lever>,
    pub(crate) lock: LevelLock,
}

impl LevelBlueprint {
    /// Number of columns implied by the first row.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.rows.first().map_or(0, |row| row.chars().count())
    }

    pub(crate) fn build(&self, config: &WorldConfig) -> Result<Level, LevelError> {
        let columns = u32::try_from(self.columns()).unwrap_or(u32::MAX);
        let rows = u32::try_from(self.rows.len()).unwrap_or(u32::MAX);
        let offset = Offset::centered(config.viewport, columns, rows);
        let mut surface =
            GridSurface::from_rows(self.rows.as_slice(), offset, config.surface.clone())?;

        if !surface.contains(self.exit, CoordSpace::Local) {
            return Err(LevelError::ExitOutOfBounds(self.exit));
        }
        if !surface.contains(self.player_start, CoordSpace::Local) {
            return Err(LevelError::PlayerStartOutOfBounds(self.player_start));
        }

        let guards = self.build_guards(&surface, config)?;
        let levers = self.build_levers(&surface)?;

        if let Some(key) = self
            .hidden_keys
            .iter()
            .find(|key| !surface.contains(**key, CoordSpace::Local))
        {
            return Err(LevelError::KeyOutOfBounds(*key));
        }

        let revealed = surface
            .cells()
            .iter()
            .filter(|cell| **cell == Symbol::Key)
            .count();
        let mut lock = LevelLock::new(
            u32::try_from(revealed).unwrap_or(u32::MAX),
            self.hidden_keys.iter().copied(),
        );
        lock.reveal_if_exhausted(&mut surface);
        surface.set_exit_locked(lock.is_locked());
        let _ = surface.drain_changes().count();

        Ok(Level {
            surface,
            guards,
            levers,
            lock,
        })
    }

    fn build_guards(
        &self,
        surface: &GridSurface,
        config: &WorldConfig,
    ) -> Result<Vec<Guard>, LevelError> {
        let offset = surface.offset();
        let mut seen = HashSet::with_capacity(self.guards.len());
        let mut guards = Vec::with_capacity(self.guards.len());

        for blueprint in &self.guards {
            let id = blueprint.id;
            if !seen.insert(id) {
                return Err(LevelError::DuplicateGuard(id));
            }
            if !surface.contains(blueprint.origin, CoordSpace::Local) {
                return Err(LevelError::GuardOutOfBounds {
                    guard: id,
                    at: blueprint.origin,
                });
            }
            if !surface.is_walkable(offset.to_screen(blueprint.origin)) {
                return Err(LevelError::GuardOnBlockedTile {
                    guard: id,
                    at: blueprint.origin,
                });
            }
            if let Some(waypoint) = blueprint
                .waypoints
                .iter()
                .find(|waypoint| !surface.contains(**waypoint, CoordSpace::Local))
            {
                return Err(LevelError::WaypointOutOfBounds {
                    guard: id,
                    at: *waypoint,
                });
            }

            let route = order_waypoints(blueprint.origin, &blueprint.waypoints)
                .map_err(|source| LevelError::Patrol { guard: id, source })?;
            let patrol = route.into_iter().map(|point| offset.to_screen(point)).collect();

            guards.push(Guard::new(
                id,
                offset.to_screen(blueprint.origin),
                patrol,
                config.guards,
            ));
        }

        Ok(guards)
    }

    fn build_levers(&self, surface: &GridSurface) -> Result<Vec<Lever>, LevelError> {
        let mut seen = HashSet::with_capacity(self.levers.len());
        let mut levers = Vec::with_capacity(self.levers.len());

        for blueprint in &self.levers {
            let id = blueprint.id;
            if !seen.insert(id) {
                return Err(LevelError::DuplicateLever(id));
            }
            let Some(symbol) = surface.symbol_at(blueprint.position, CoordSpace::Local) else {
                return Err(LevelError::LeverOutOfBounds {
                    lever: id,
                    at: blueprint.position,
                });
            };
            if let Some(gate) = blueprint
                .gates
                .iter()
                .find(|gate| !surface.contains(**gate, CoordSpace::Local))
            {
                return Err(LevelError::GateOutOfBounds {
                    lever: id,
                    at: *gate,
                });
            }

            levers.push(Lever::new(
                id,
                blueprint.position,
                blueprint.gates.clone(),
                symbol == Symbol::LeverOn,
            ));
        }

        Ok(levers)
    }
}
