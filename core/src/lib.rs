#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Heist simulation.
//!
//! This crate defines the message surface that connects the game controller,
//! the authoritative world, and the guard systems. Controllers submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what happened. The grid surface that every perception and
//! pathfinding query runs against also lives here, so the algorithm crates
//! only ever depend on this crate.

mod surface;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use surface::{
    CoordSpace, GridSurface, Neighbors, Offset, SearchTile, SurfaceError, SurfaceRules,
    TileChange, TileQuery, Viewport, DEFAULT_DECORATIONS,
};

/// Value awarded for every treasure tile collected by the player.
pub const TREASURE_VALUE: u32 = 100;

/// Location on the grid expressed as integer column and row coordinates.
///
/// Positions are used in both level-local and screen space; which one a value
/// belongs to is decided by the API that receives it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position shifted by the provided deltas.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the adjacent position in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.translate(dx, dy)
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the Chebyshev (king-move) distance between two positions.
    #[must_use]
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Reports whether the positions share exactly one axis.
    ///
    /// Coincident positions share both axes and are therefore not aligned.
    #[must_use]
    pub fn is_axis_aligned_with(self, other: Position) -> bool {
        (self.x == other.x) != (self.y == other.y)
    }
}

/// Cardinal directions a guard can face and move in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    #[default]
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// Unit column and row delta of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Marker drawn for a guard facing this direction.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Up => '^',
            Self::Right => '>',
            Self::Down => 'v',
            Self::Left => '<',
        }
    }

    /// Direction of a single orthogonal step between adjacent positions.
    #[must_use]
    pub fn between(from: Position, to: Position) -> Option<Self> {
        let column_diff = from.x().abs_diff(to.x());
        let row_diff = from.y().abs_diff(to.y());
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.x() > from.x() {
                Some(Self::Right)
            } else {
                Some(Self::Left)
            }
        } else if to.y() > from.y() {
            Some(Self::Down)
        } else {
            Some(Self::Up)
        }
    }
}

/// Static tile stored in a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Open floor.
    Empty,
    /// Solid wall drawn with the captured glyph.
    Wall(char),
    /// Level exit, impassable while the level lock is engaged.
    Exit,
    /// Decorative entrance marker.
    Entrance,
    /// Revealed key piece.
    Key,
    /// Collectable treasure.
    Treasure,
    /// Lever in the off position.
    LeverOff,
    /// Lever in the on position.
    LeverOn,
    /// Closed gate controlled by a lever.
    Gate,
    /// Furniture or scenery drawn with the captured glyph.
    Decoration(char),
}

impl Symbol {
    /// Glyph used for an empty cell.
    pub const EMPTY_GLYPH: char = ' ';
    /// Glyph used for the level exit.
    pub const EXIT_GLYPH: char = 'Ð';
    /// Glyph used for the entrance marker.
    pub const ENTRANCE_GLYPH: char = '≡';
    /// Glyph used for key pieces.
    pub const KEY_GLYPH: char = '¶';
    /// Glyph used for treasure.
    pub const TREASURE_GLYPH: char = '$';
    /// Glyph used for levers in the off position.
    pub const LEVER_OFF_GLYPH: char = '\\';
    /// Glyph used for levers in the on position.
    pub const LEVER_ON_GLYPH: char = '/';
    /// Glyph used for closed gates.
    pub const GATE_GLYPH: char = '#';
    /// Decorative floor glyph.
    pub const FLOOR_GLYPH: char = '░';

    /// Decodes a canonical glyph; anything unrecognised becomes a wall.
    ///
    /// Decorations depend on level configuration and are decoded by
    /// [`SurfaceRules::decode`](crate::SurfaceRules::decode).
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Self {
        match glyph {
            Self::EMPTY_GLYPH => Self::Empty,
            Self::EXIT_GLYPH => Self::Exit,
            Self::ENTRANCE_GLYPH => Self::Entrance,
            Self::KEY_GLYPH => Self::Key,
            Self::TREASURE_GLYPH => Self::Treasure,
            Self::LEVER_OFF_GLYPH => Self::LeverOff,
            Self::LEVER_ON_GLYPH => Self::LeverOn,
            Self::GATE_GLYPH => Self::Gate,
            other => Self::Wall(other),
        }
    }

    /// Glyph used to draw the symbol.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => Self::EMPTY_GLYPH,
            Self::Wall(glyph) | Self::Decoration(glyph) => glyph,
            Self::Exit => Self::EXIT_GLYPH,
            Self::Entrance => Self::ENTRANCE_GLYPH,
            Self::Key => Self::KEY_GLYPH,
            Self::Treasure => Self::TREASURE_GLYPH,
            Self::LeverOff => Self::LEVER_OFF_GLYPH,
            Self::LeverOn => Self::LEVER_ON_GLYPH,
            Self::Gate => Self::GATE_GLYPH,
        }
    }

    /// Field-less kind of the symbol, used by surface rules.
    #[must_use]
    pub const fn kind(self) -> SymbolKind {
        match self {
            Self::Empty => SymbolKind::Empty,
            Self::Wall(_) => SymbolKind::Wall,
            Self::Exit => SymbolKind::Exit,
            Self::Entrance => SymbolKind::Entrance,
            Self::Key => SymbolKind::Key,
            Self::Treasure => SymbolKind::Treasure,
            Self::LeverOff => SymbolKind::LeverOff,
            Self::LeverOn => SymbolKind::LeverOn,
            Self::Gate => SymbolKind::Gate,
            Self::Decoration(_) => SymbolKind::Decoration,
        }
    }

    /// Reports whether the symbol is a lever in either position.
    #[must_use]
    pub const fn is_lever(self) -> bool {
        matches!(self, Self::LeverOff | Self::LeverOn)
    }
}

/// Discriminant of a [`Symbol`] without its glyph payload.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SymbolKind {
    /// See [`Symbol::Empty`].
    Empty,
    /// See [`Symbol::Wall`].
    Wall,
    /// See [`Symbol::Exit`].
    Exit,
    /// See [`Symbol::Entrance`].
    Entrance,
    /// See [`Symbol::Key`].
    Key,
    /// See [`Symbol::Treasure`].
    Treasure,
    /// See [`Symbol::LeverOff`].
    LeverOff,
    /// See [`Symbol::LeverOn`].
    LeverOn,
    /// See [`Symbol::Gate`].
    Gate,
    /// See [`Symbol::Decoration`].
    Decoration,
}

/// Identifier assigned to a guard by the level data.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GuardId(u32);

impl GuardId {
    /// Creates a new guard identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier assigned to a lever by the level data.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LeverId(u32);

impl LeverId {
    /// Creates a new lever identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Movement state of a guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardMode {
    /// Walking the patrol route at patrol speed.
    #[default]
    Patrolling,
    /// Chasing the last known player position at chase speed.
    Alerted,
    /// Walking back to the current patrol waypoint.
    Returning,
}

/// Difficulty tier chosen by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Unlimited bribes with the cheapest price increase.
    VeryEasy,
    /// Same bribe rules as [`Difficulty::VeryEasy`].
    Easy,
    /// Each guard can be bribed once.
    #[default]
    Normal,
    /// Same bribe rules as [`Difficulty::Normal`].
    Hard,
    /// Guards cannot be bribed.
    VeryHard,
    /// Guards cannot be bribed.
    Ironman,
}

impl Difficulty {
    /// Bribe rules that apply at this difficulty.
    #[must_use]
    pub const fn bribe_policy(self) -> BribePolicy {
        match self {
            Self::VeryEasy | Self::Easy => BribePolicy::Unlimited,
            Self::Normal | Self::Hard => BribePolicy::Once,
            Self::VeryHard | Self::Ironman => BribePolicy::Never,
        }
    }

    /// Amount the bribe price grows by every time the player is caught.
    #[must_use]
    pub const fn bribe_cost_step(self) -> u32 {
        match self {
            Self::VeryEasy | Self::Easy => 50,
            _ => 100,
        }
    }

    /// Price of the next bribe, or `None` when bribes are not allowed.
    #[must_use]
    pub fn bribe_cost(self, times_caught: u32) -> Option<u32> {
        if self.bribe_policy() == BribePolicy::Never {
            return None;
        }

        Some(
            self.bribe_cost_step()
                .saturating_mul(times_caught)
                .saturating_add(100),
        )
    }
}

/// How often a single guard may be bribed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BribePolicy {
    /// Guards accept any number of bribes.
    Unlimited,
    /// Guards accept one bribe and arrest the player afterwards.
    Once,
    /// Guards never accept bribes.
    Never,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock and updates every guard.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Screen-space position of the player during this tick.
        player: Position,
    },
    /// Applies a successful bribe to the guard that caught the player.
    BribeGuard {
        /// Guard receiving the bribe.
        guard: GuardId,
    },
    /// Changes the difficulty used for subsequent bribes.
    SetDifficulty {
        /// Difficulty to activate.
        difficulty: Difficulty,
    },
    /// Toggles the lever located at the provided screen position.
    ToggleLever {
        /// Screen-space position of the lever.
        at: Position,
    },
    /// Collects the key piece located at the provided screen position.
    CollectKey {
        /// Screen-space position of the key piece.
        at: Position,
    },
    /// Collects the treasure located at the provided screen position.
    CollectTreasure {
        /// Screen-space position of the treasure.
        at: Position,
    },
    /// Restores the level to the state it had when it was loaded.
    ResetLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a guard moved between two adjacent tiles.
    GuardMoved {
        /// Guard that moved.
        guard: GuardId,
        /// Screen-space tile the guard left.
        from: Position,
        /// Screen-space tile the guard entered.
        to: Position,
        /// Direction the guard faces after the move.
        facing: Direction,
    },
    /// Announces that a guard switched movement state.
    GuardModeChanged {
        /// Guard that changed state.
        guard: GuardId,
        /// State before the transition.
        from: GuardMode,
        /// State after the transition.
        to: GuardMode,
    },
    /// Reports that a guard spotted the player and became alerted.
    PlayerSpotted {
        /// Guard that spotted the player.
        guard: GuardId,
        /// Screen-space position where the player was seen.
        at: Position,
    },
    /// Reports that a guard is close enough to arrest the player.
    PlayerCaptured {
        /// Guard responsible for the capture.
        guard: GuardId,
    },
    /// Confirms that a guard accepted a bribe.
    GuardBribed {
        /// Guard that was bribed.
        guard: GuardId,
        /// Loot paid for the bribe.
        cost: u32,
    },
    /// Announces that a guard's bribe wore off.
    BribeExpired {
        /// Guard whose perception is restored.
        guard: GuardId,
    },
    /// Reports that a bribe request was refused.
    BribeRejected {
        /// Guard targeted by the bribe.
        guard: GuardId,
        /// Specific reason the bribe failed.
        reason: BribeRejection,
    },
    /// Confirms that a lever switched position.
    LeverToggled {
        /// Lever that was toggled.
        lever: LeverId,
        /// Whether the lever is now on.
        on: bool,
    },
    /// Reports that a toggle was requested where no lever is registered.
    LeverMissing {
        /// Screen-space position provided in the request.
        at: Position,
    },
    /// Confirms that the player collected a key piece.
    KeyCollected {
        /// Screen-space position of the collected piece.
        at: Position,
    },
    /// Announces that the last key piece was collected and the exit opened.
    ExitUnlocked,
    /// Confirms that the player collected treasure.
    TreasureCollected {
        /// Screen-space position of the collected treasure.
        at: Position,
        /// Value of the collected treasure.
        value: u32,
    },
    /// Notifies presentation layers that a grid cell changed.
    TileChanged {
        /// Screen-space position of the changed cell.
        at: Position,
        /// Symbol now stored in the cell.
        symbol: Symbol,
    },
    /// Announces that the active difficulty changed.
    DifficultyChanged {
        /// Difficulty now in effect.
        difficulty: Difficulty,
    },
    /// Announces that the level was restored to its loaded state.
    LevelReset,
}

/// Reasons a bribe request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BribeRejection {
    /// No guard with the provided identifier exists.
    UnknownGuard,
    /// The active difficulty does not allow bribes.
    NotAllowed,
    /// The guard already took its single allowed bribe.
    AlreadyBribed,
    /// The collected loot does not cover the bribe price.
    InsufficientFunds,
}
