#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Guard behaviour: patrol routes, chasing the player and returning to the
//! route, throttled by a per-guard movement accumulator.
//!
//! Guards never write to the grid. They read it through [`TileQuery`] and
//! report everything that happened as [`Event`] values; the world decides
//! what those events mean for the level.

mod config;

use std::time::Duration;

use heist_core::{BribePolicy, Direction, Event, GuardId, GuardMode, Position, TileQuery};
use heist_system_pathfinding::find_next_step;
use heist_system_perception::can_see;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use config::GuardConfig;

/// Outcome of a single [`Guard::update`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuardUpdate {
    /// Whether the accumulator crossed its threshold and the guard acted.
    pub stepped: bool,
    /// Tile the guard moved onto, if it moved.
    pub moved_to: Option<Position>,
    /// Whether the guard is close enough to arrest the player.
    pub captured: bool,
}

/// Serializable view of a guard's observable state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuardSnapshot {
    /// Identifier assigned by the level data.
    pub id: GuardId,
    /// Screen-space tile the guard stands on.
    pub position: Position,
    /// Direction the guard faces.
    pub facing: Direction,
    /// Current movement state.
    pub mode: GuardMode,
    /// Index of the patrol waypoint the guard is heading for.
    pub patrol_index: usize,
    /// Whether a bribe currently suppresses the guard.
    pub bribed: bool,
    /// Whether the guard already used up its bribe allowance.
    pub bribed_before: bool,
    /// Last position the guard saw the player at, while alerted.
    pub last_known: Option<Position>,
}

#[derive(Clone, Copy, Debug)]
struct Bribe {
    remaining: Duration,
    policy: BribePolicy,
}

/// Single guard patrolling a level.
#[derive(Clone, Debug)]
pub struct Guard {
    id: GuardId,
    origin: Position,
    position: Position,
    facing: Direction,
    patrol: Vec<Position>,
    patrol_index: usize,
    mode: GuardMode,
    accumulator: Duration,
    alert_remaining: Duration,
    bribe: Option<Bribe>,
    bribed_before: bool,
    last_known: Option<Position>,
    config: GuardConfig,
}

impl Guard {
    /// Creates a guard standing on `origin` with an already ordered patrol.
    ///
    /// Both the origin and the patrol waypoints are in screen space.
    #[must_use]
    pub fn new(id: GuardId, origin: Position, patrol: Vec<Position>, config: GuardConfig) -> Self {
        Self {
            id,
            origin,
            position: origin,
            facing: Direction::default(),
            patrol,
            patrol_index: 0,
            mode: GuardMode::default(),
            accumulator: Duration::ZERO,
            alert_remaining: Duration::ZERO,
            bribe: None,
            bribed_before: false,
            last_known: None,
            config,
        }
    }

    /// Identifier of the guard.
    #[must_use]
    pub const fn id(&self) -> GuardId {
        self.id
    }

    /// Current screen-space position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Position the guard occupies after [`Guard::reset`].
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Direction the guard faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Marker glyph drawn for the guard.
    #[must_use]
    pub const fn marker(&self) -> char {
        self.facing.glyph()
    }

    /// Current movement state.
    #[must_use]
    pub const fn mode(&self) -> GuardMode {
        self.mode
    }

    /// Ordered patrol waypoints.
    #[must_use]
    pub fn patrol(&self) -> &[Position] {
        &self.patrol
    }

    /// Time accumulated toward the next step.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Whether a bribe currently suppresses perception and capture.
    #[must_use]
    pub const fn is_bribed(&self) -> bool {
        self.bribe.is_some()
    }

    /// Whether the guard has used up its bribe allowance.
    #[must_use]
    pub const fn bribed_before(&self) -> bool {
        self.bribed_before
    }

    /// Captures the observable state of the guard.
    #[must_use]
    pub fn snapshot(&self) -> GuardSnapshot {
        GuardSnapshot {
            id: self.id,
            position: self.position,
            facing: self.facing,
            mode: self.mode,
            patrol_index: self.patrol_index,
            bribed: self.is_bribed(),
            bribed_before: self.bribed_before,
            last_known: self.last_known,
        }
    }

    /// Advances the guard by `dt` of simulated time.
    pub fn update<Q>(
        &mut self,
        surface: &Q,
        player: Position,
        dt: Duration,
        out: &mut Vec<Event>,
    ) -> GuardUpdate
    where
        Q: TileQuery + ?Sized,
    {
        let mut update = GuardUpdate::default();

        self.tick_bribe(dt, out);
        self.tick_alert(dt, out);

        let threshold = self.step_interval();
        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator >= threshold {
            self.accumulator -= threshold;
            update.stepped = true;
            update.moved_to = self.step(surface, player, out);
        }

        if !self.is_bribed() && player.chebyshev_distance(self.position) <= 1 {
            out.push(Event::PlayerCaptured { guard: self.id });
            update.captured = true;
        }

        update
    }

    /// Starts the bribe overlay and calls off any chase in progress.
    pub fn bribe(&mut self, policy: BribePolicy, out: &mut Vec<Event>) {
        self.bribe = Some(Bribe {
            remaining: self.config.bribe_duration(),
            policy,
        });
        if self.mode == GuardMode::Alerted {
            self.last_known = None;
            self.set_mode(GuardMode::Returning, out);
        }
    }

    /// Restores the guard to the state it had when the level loaded.
    pub fn reset(&mut self) {
        self.position = self.origin;
        self.facing = Direction::default();
        self.patrol_index = 0;
        self.mode = GuardMode::default();
        self.accumulator = Duration::ZERO;
        self.alert_remaining = Duration::ZERO;
        self.bribe = None;
        self.bribed_before = false;
        self.last_known = None;
    }

    fn step_interval(&self) -> Duration {
        match self.mode {
            GuardMode::Alerted => self.config.chase_interval(),
            GuardMode::Patrolling | GuardMode::Returning => self.config.patrol_interval(),
        }
    }

    fn tick_bribe(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let Some(bribe) = self.bribe.as_mut() else {
            return;
        };

        bribe.remaining = bribe.remaining.saturating_sub(dt);
        if !bribe.remaining.is_zero() {
            return;
        }

        if bribe.policy != BribePolicy::Unlimited {
            self.bribed_before = true;
        }
        self.bribe = None;
        debug!(guard = self.id.get(), "bribe wore off");
        out.push(Event::BribeExpired { guard: self.id });
    }

    fn tick_alert(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.mode != GuardMode::Alerted {
            return;
        }

        self.alert_remaining = self.alert_remaining.saturating_sub(dt);
        if self.alert_remaining.is_zero() {
            self.last_known = None;
            self.set_mode(GuardMode::Returning, out);
        }
    }

    fn step<Q>(&mut self, surface: &Q, player: Position, out: &mut Vec<Event>) -> Option<Position>
    where
        Q: TileQuery + ?Sized,
    {
        let spotted = !self.is_bribed()
            && can_see(
                surface,
                self.position,
                self.facing,
                player,
                &self.config.aggro,
            );
        if spotted {
            self.last_known = Some(player);
            self.alert_remaining = self.config.alert_duration();
            if self.mode != GuardMode::Alerted {
                out.push(Event::PlayerSpotted {
                    guard: self.id,
                    at: player,
                });
                self.set_mode(GuardMode::Alerted, out);
            }
        }

        match self.mode {
            GuardMode::Alerted => {
                let Some(target) = self.last_known else {
                    self.set_mode(GuardMode::Returning, out);
                    return None;
                };
                if self.position == target {
                    if !spotted {
                        self.last_known = None;
                        self.set_mode(GuardMode::Returning, out);
                    }
                    return None;
                }
                let next = find_next_step(surface, self.position, target)?;
                Some(self.move_to(next, out))
            }
            GuardMode::Returning => {
                let target = self.current_waypoint();
                if self.position == target {
                    self.set_mode(GuardMode::Patrolling, out);
                    return None;
                }
                let next = find_next_step(surface, self.position, target)?;
                Some(self.move_to(next, out))
            }
            GuardMode::Patrolling => {
                let target = self.current_waypoint();
                if self.position == target {
                    if !self.patrol.is_empty() {
                        self.patrol_index = (self.patrol_index + 1) % self.patrol.len();
                    }
                    return None;
                }
                let next = self.patrol_step(surface, target)?;
                Some(self.move_to(next, out))
            }
        }
    }

    fn current_waypoint(&self) -> Position {
        self.patrol
            .get(self.patrol_index)
            .copied()
            .unwrap_or(self.origin)
    }

    /// One step along the first axis still differing from `target`, columns
    /// before rows. A blocked step leaves the guard waiting.
    fn patrol_step<Q>(&self, surface: &Q, target: Position) -> Option<Position>
    where
        Q: TileQuery + ?Sized,
    {
        let dx = (target.x() - self.position.x()).signum();
        let dy = (target.y() - self.position.y()).signum();
        let next = if dx != 0 {
            self.position.translate(dx, 0)
        } else {
            self.position.translate(0, dy)
        };

        surface.is_walkable(next).then_some(next)
    }

    fn move_to(&mut self, next: Position, out: &mut Vec<Event>) -> Position {
        if let Some(direction) = Direction::between(self.position, next) {
            self.facing = direction;
        }
        out.push(Event::GuardMoved {
            guard: self.id,
            from: self.position,
            to: next,
            facing: self.facing,
        });
        self.position = next;
        next
    }

    fn set_mode(&mut self, mode: GuardMode, out: &mut Vec<Event>) {
        if self.mode == mode {
            return;
        }

        debug!(guard = self.id.get(), from = ?self.mode, to = ?mode, "guard mode changed");
        out.push(Event::GuardModeChanged {
            guard: self.id,
            from: self.mode,
            to: mode,
        });
        self.mode = mode;
    }
}
