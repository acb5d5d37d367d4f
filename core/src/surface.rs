//! Tile storage and the walkability and transparency queries built on it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Position, Symbol, SymbolKind};

const DEFAULT_PASSABLE: [SymbolKind; 7] = [
    SymbolKind::Empty,
    SymbolKind::Decoration,
    SymbolKind::Exit,
    SymbolKind::Key,
    SymbolKind::Treasure,
    SymbolKind::LeverOff,
    SymbolKind::LeverOn,
];

/// Coordinate system a position is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoordSpace {
    /// Relative to the top-left cell of the level data.
    Local,
    /// Level-local coordinates shifted by the centering offset.
    Screen,
}

/// Terminal area the level is centered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Width of the drawable area in character cells.
    pub width: u32,
    /// Height of the drawable area in character cells.
    pub height: u32,
    /// Rows at the bottom of the viewport reserved for the status bar.
    pub hud_rows: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 180,
            height: 56,
            hud_rows: 5,
        }
    }
}

/// Translation between level-local and screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    x: i32,
    y: i32,
}

impl Offset {
    /// Offset that leaves coordinates untouched.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates an explicit offset.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset that centers a `columns` × `rows` grid inside the viewport.
    #[must_use]
    pub fn centered(viewport: Viewport, columns: u32, rows: u32) -> Self {
        let usable_height = viewport.height.saturating_sub(viewport.hud_rows);
        Self {
            x: half(viewport.width) - half(columns),
            y: half(usable_height) - half(rows),
        }
    }

    /// Horizontal shift applied to local coordinates.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical shift applied to local coordinates.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Converts a level-local position into screen space.
    #[must_use]
    pub const fn to_screen(self, local: Position) -> Position {
        local.translate(self.x, self.y)
    }

    /// Converts a screen position into level-local space.
    #[must_use]
    pub const fn to_local(self, screen: Position) -> Position {
        screen.translate(-self.x, -self.y)
    }
}

fn half(value: u32) -> i32 {
    i32::try_from(value / 2).unwrap_or(i32::MAX)
}

/// Glyphs decoded as [`Symbol::Decoration`] unless configured otherwise.
pub const DEFAULT_DECORATIONS: [char; 1] = [Symbol::FLOOR_GLYPH];

/// Symbol kinds that can be walked on and seen through.
///
/// The two sets are configured independently: scenery such as counters can be
/// walked around but not seen past, and a level may mark such tiles walkable
/// while keeping them opaque. Glyphs listed in `decorations` decode as
/// [`Symbol::Decoration`] instead of walls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceRules {
    walkable: BTreeSet<SymbolKind>,
    transparent: BTreeSet<SymbolKind>,
    decorations: BTreeSet<char>,
}

impl SurfaceRules {
    /// Creates rules from explicit walkable and transparent kinds.
    #[must_use]
    pub fn new(
        walkable: impl IntoIterator<Item = SymbolKind>,
        transparent: impl IntoIterator<Item = SymbolKind>,
    ) -> Self {
        Self {
            walkable: walkable.into_iter().collect(),
            transparent: transparent.into_iter().collect(),
            decorations: DEFAULT_DECORATIONS.into_iter().collect(),
        }
    }

    /// Replaces the glyphs decoded as decorations.
    #[must_use]
    pub fn with_decorations(mut self, glyphs: impl IntoIterator<Item = char>) -> Self {
        self.decorations = glyphs.into_iter().collect();
        self
    }

    /// Decodes a level glyph, honouring the configured decoration glyphs.
    #[must_use]
    pub fn decode(&self, glyph: char) -> Symbol {
        if self.decorations.contains(&glyph) {
            Symbol::Decoration(glyph)
        } else {
            Symbol::from_glyph(glyph)
        }
    }

    /// Reports whether guards and the player may stand on the kind.
    #[must_use]
    pub fn walks_on(&self, kind: SymbolKind) -> bool {
        self.walkable.contains(&kind)
    }

    /// Reports whether line of sight passes through the kind.
    #[must_use]
    pub fn sees_through(&self, kind: SymbolKind) -> bool {
        self.transparent.contains(&kind)
    }
}

impl Default for SurfaceRules {
    fn default() -> Self {
        Self::new(DEFAULT_PASSABLE, DEFAULT_PASSABLE)
    }
}

/// Record of a single cell write, drained by the world into redraw events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileChange {
    /// Screen-space position of the written cell.
    pub position: Position,
    /// Symbol stored in the cell after the write.
    pub symbol: Symbol,
}

/// Errors raised while constructing a [`GridSurface`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// The level contained no rows or no columns.
    #[error("level grid is empty")]
    Empty,
    /// A row did not match the width of the first row.
    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The dense cell buffer did not match the declared dimensions.
    #[error("grid of {columns}x{rows} requires {expected} cells, found {found}")]
    CellCountMismatch {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
        /// Number of cells implied by the dimensions.
        expected: usize,
        /// Number of cells provided.
        found: usize,
    },
}

/// Read-only tile queries consumed by pathfinding, perception and guards.
///
/// Every position handed to these methods is in screen space. Positions that
/// fall outside the grid are never walkable and never transparent.
pub trait TileQuery {
    /// Reports whether a guard or the player may enter the tile.
    fn is_walkable(&self, position: Position) -> bool;

    /// Reports whether line of sight passes through the tile.
    fn is_transparent(&self, position: Position) -> bool;

    /// Walkable orthogonal neighbours of `tile`, scored toward `goal`.
    ///
    /// Candidates are produced in north, south, west, east order.
    fn neighbors_of(&self, tile: SearchTile, goal: Position) -> Neighbors {
        let mut neighbors = Neighbors::default();
        let origin = tile.position;
        let candidates = [
            origin.translate(0, -1),
            origin.translate(0, 1),
            origin.translate(-1, 0),
            origin.translate(1, 0),
        ];

        for candidate in candidates {
            if !self.is_walkable(candidate) {
                continue;
            }

            neighbors.push(SearchTile {
                position: candidate,
                cost: tile.cost.saturating_add(1),
                heuristic: candidate.manhattan_distance(goal),
            });
        }

        neighbors
    }
}

/// Ephemeral search node scored by path cost and distance to the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SearchTile {
    /// Screen-space position of the node.
    pub position: Position,
    /// Number of steps taken from the search origin.
    pub cost: u32,
    /// Manhattan distance from the node to the goal.
    pub heuristic: u32,
}

impl SearchTile {
    /// Creates the origin node of a search toward `goal`.
    #[must_use]
    pub fn origin(position: Position, goal: Position) -> Self {
        Self {
            position,
            cost: 0,
            heuristic: position.manhattan_distance(goal),
        }
    }

    /// Combined ordering key of the node.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.cost.saturating_add(self.heuristic)
    }
}

/// Fixed-capacity iterator over up to four neighbouring search tiles.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<SearchTile>; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, tile: SearchTile) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(tile);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = SearchTile;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Dense symbol grid of a single level together with its centering offset.
#[derive(Clone, Debug)]
pub struct GridSurface {
    columns: u32,
    rows: u32,
    cells: Vec<Symbol>,
    offset: Offset,
    rules: SurfaceRules,
    exit_locked: bool,
    changes: Vec<TileChange>,
}

impl GridSurface {
    /// Creates a surface from a dense row-major cell buffer.
    pub fn new(
        columns: u32,
        rows: u32,
        cells: Vec<Symbol>,
        offset: Offset,
        rules: SurfaceRules,
    ) -> Result<Self, SurfaceError> {
        if columns == 0 || rows == 0 {
            return Err(SurfaceError::Empty);
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX);
        if cells.len() != expected {
            return Err(SurfaceError::CellCountMismatch {
                columns,
                rows,
                expected,
                found: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cells,
            offset,
            rules,
            exit_locked: false,
            changes: Vec::new(),
        })
    }

    /// Creates a surface by decoding one glyph string per row.
    pub fn from_rows<S: AsRef<str>>(
        rows: &[S],
        offset: Offset,
        rules: SurfaceRules,
    ) -> Result<Self, SurfaceError> {
        let Some(first) = rows.first() else {
            return Err(SurfaceError::Empty);
        };
        let expected = first.as_ref().chars().count();

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let found = row.as_ref().chars().count();
            if found != expected {
                return Err(SurfaceError::RaggedRow {
                    row: index,
                    expected,
                    found,
                });
            }
            cells.extend(row.as_ref().chars().map(|glyph| rules.decode(glyph)));
        }

        let columns = u32::try_from(expected).map_err(|_| SurfaceError::Empty)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| SurfaceError::Empty)?;
        Self::new(columns, row_count, cells, offset, rules)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Offset translating local coordinates into screen space.
    #[must_use]
    pub const fn offset(&self) -> Offset {
        self.offset
    }

    /// Walkability and transparency rules of the surface.
    #[must_use]
    pub const fn rules(&self) -> &SurfaceRules {
        &self.rules
    }

    /// Dense row-major snapshot of every cell.
    #[must_use]
    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// Reports whether the exit is currently locked.
    #[must_use]
    pub const fn is_exit_locked(&self) -> bool {
        self.exit_locked
    }

    /// Engages or releases the exit lock.
    pub fn set_exit_locked(&mut self, locked: bool) {
        self.exit_locked = locked;
    }

    /// Converts a position in the provided space into screen space.
    #[must_use]
    pub const fn to_screen(&self, position: Position, space: CoordSpace) -> Position {
        match space {
            CoordSpace::Local => self.offset.to_screen(position),
            CoordSpace::Screen => position,
        }
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub fn contains(&self, position: Position, space: CoordSpace) -> bool {
        self.index(position, space).is_some()
    }

    /// Reports whether a guard or the player may enter the screen position.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        match self.symbol_at(position, CoordSpace::Screen) {
            Some(Symbol::Exit) if self.exit_locked => false,
            Some(symbol) => self.rules.walks_on(symbol.kind()),
            None => false,
        }
    }

    /// Reports whether line of sight passes through the screen position.
    #[must_use]
    pub fn is_transparent(&self, position: Position) -> bool {
        self.symbol_at(position, CoordSpace::Screen)
            .is_some_and(|symbol| self.rules.sees_through(symbol.kind()))
    }

    /// Symbol stored at the position, or `None` outside the grid.
    #[must_use]
    pub fn symbol_at(&self, position: Position, space: CoordSpace) -> Option<Symbol> {
        self.index(position, space)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the symbol at the position and returns the previous one.
    ///
    /// Writes outside the grid are ignored and return `None`. Every successful
    /// write is recorded as a [`TileChange`].
    pub fn set_symbol(
        &mut self,
        position: Position,
        space: CoordSpace,
        symbol: Symbol,
    ) -> Option<Symbol> {
        let index = self.index(position, space)?;
        let slot = self.cells.get_mut(index)?;
        let previous = std::mem::replace(slot, symbol);
        self.changes.push(TileChange {
            position: self.to_screen(position, space),
            symbol,
        });
        Some(previous)
    }

    /// Restores every cell from a snapshot taken by [`GridSurface::cells`].
    ///
    /// Returns `false` and leaves the grid untouched when the snapshot has a
    /// different size.
    pub fn restore(&mut self, snapshot: &[Symbol]) -> bool {
        if snapshot.len() != self.cells.len() {
            return false;
        }

        let width = usize::try_from(self.columns).unwrap_or(usize::MAX);
        for (index, (cell, original)) in self.cells.iter_mut().zip(snapshot).enumerate() {
            if cell == original {
                continue;
            }

            *cell = *original;
            let local = Position::new(
                i32::try_from(index % width).unwrap_or(i32::MAX),
                i32::try_from(index / width).unwrap_or(i32::MAX),
            );
            self.changes.push(TileChange {
                position: self.offset.to_screen(local),
                symbol: *original,
            });
        }

        true
    }

    /// Removes and yields every change recorded since the previous drain.
    pub fn drain_changes(&mut self) -> std::vec::Drain<'_, TileChange> {
        self.changes.drain(..)
    }

    fn index(&self, position: Position, space: CoordSpace) -> Option<usize> {
        let local = match space {
            CoordSpace::Local => position,
            CoordSpace::Screen => self.offset.to_local(position),
        };
        let column = u32::try_from(local.x()).ok()?;
        let row = u32::try_from(local.y()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl TileQuery for GridSurface {
    fn is_walkable(&self, position: Position) -> bool {
        GridSurface::is_walkable(self, position)
    }

    fn is_transparent(&self, position: Position) -> bool {
        GridSurface::is_transparent(self, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn surface(rows: &[&str], offset: Offset) -> GridSurface {
        GridSurface::from_rows(rows, offset, SurfaceRules::default()).expect("valid grid")
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let error = GridSurface::from_rows(&["   ", "  "], Offset::ZERO, SurfaceRules::default())
            .expect_err("ragged grid");
        assert_eq!(
            error,
            SurfaceError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn from_rows_rejects_empty_grid() {
        let rows: [&str; 0] = [];
        let error = GridSurface::from_rows(&rows, Offset::ZERO, SurfaceRules::default())
            .expect_err("empty grid");
        assert_eq!(error, SurfaceError::Empty);
    }

    #[test]
    fn walls_and_gates_block_movement() {
        let grid = surface(&["█ #", "¶$/"], Offset::ZERO);
        assert!(!grid.is_walkable(Position::new(0, 0)));
        assert!(grid.is_walkable(Position::new(1, 0)));
        assert!(!grid.is_walkable(Position::new(2, 0)));
        assert!(grid.is_walkable(Position::new(0, 1)));
        assert!(grid.is_walkable(Position::new(1, 1)));
        assert!(grid.is_walkable(Position::new(2, 1)));
    }

    #[test]
    fn locked_exit_is_impassable_but_transparent() {
        let mut grid = surface(&[" Ð"], Offset::ZERO);
        let exit = Position::new(1, 0);
        assert!(grid.is_walkable(exit));

        grid.set_exit_locked(true);
        assert!(!grid.is_walkable(exit));
        assert!(grid.is_transparent(exit));
    }

    #[test]
    fn transparency_is_configured_independently() {
        let rules = SurfaceRules::new(
            [SymbolKind::Empty, SymbolKind::Decoration],
            [SymbolKind::Empty],
        );
        let cells = vec![Symbol::Empty, Symbol::Decoration('|')];
        let grid = GridSurface::new(2, 1, cells, Offset::ZERO, rules).expect("valid grid");
        let counter = Position::new(1, 0);
        assert!(grid.is_walkable(counter));
        assert!(!grid.is_transparent(counter));
    }

    #[test]
    fn decorative_floor_is_open_ground() {
        let grid = surface(&["░ ", "█░"], Offset::ZERO);
        let floor = Position::new(0, 0);
        assert_eq!(
            grid.symbol_at(floor, CoordSpace::Local),
            Some(Symbol::Decoration('░'))
        );
        assert!(grid.is_walkable(floor));
        assert!(grid.is_transparent(floor));
        assert_eq!(
            grid.symbol_at(Position::new(0, 1), CoordSpace::Local),
            Some(Symbol::Wall('█'))
        );
    }

    #[test]
    fn decoration_glyphs_are_configurable() {
        let rules = SurfaceRules::new(
            [SymbolKind::Empty, SymbolKind::Decoration],
            [SymbolKind::Empty],
        )
        .with_decorations(['|']);
        let grid = GridSurface::from_rows(&["|░"], Offset::ZERO, rules).expect("valid grid");

        let counter = Position::new(0, 0);
        assert_eq!(
            grid.symbol_at(counter, CoordSpace::Local),
            Some(Symbol::Decoration('|'))
        );
        assert!(grid.is_walkable(counter));
        assert!(!grid.is_transparent(counter));
        assert_eq!(
            grid.symbol_at(Position::new(1, 0), CoordSpace::Local),
            Some(Symbol::Wall('░'))
        );
    }

    #[test]
    fn offset_translates_between_spaces() {
        let grid = surface(&["  ", " $"], Offset::new(10, 4));
        assert_eq!(
            grid.symbol_at(Position::new(11, 5), CoordSpace::Screen),
            Some(Symbol::Treasure)
        );
        assert_eq!(
            grid.symbol_at(Position::new(1, 1), CoordSpace::Local),
            Some(Symbol::Treasure)
        );
        assert!(!grid.is_walkable(Position::new(0, 0)));
        assert!(grid.is_walkable(Position::new(10, 4)));
    }

    #[test]
    fn centered_offset_reserves_hud_rows() {
        let viewport = Viewport {
            width: 180,
            height: 56,
            hud_rows: 5,
        };
        assert_eq!(Offset::centered(viewport, 41, 11), Offset::new(70, 20));
    }

    #[test]
    fn set_symbol_records_screen_space_changes() {
        let mut grid = surface(&["¶ "], Offset::new(3, 2));
        let previous = grid.set_symbol(Position::new(0, 0), CoordSpace::Local, Symbol::Empty);
        assert_eq!(previous, Some(Symbol::Key));
        assert_eq!(
            grid.set_symbol(Position::new(9, 9), CoordSpace::Local, Symbol::Key),
            None
        );

        let changes: Vec<_> = grid.drain_changes().collect();
        assert_eq!(
            changes,
            vec![TileChange {
                position: Position::new(3, 2),
                symbol: Symbol::Empty,
            }]
        );
        assert_eq!(grid.drain_changes().count(), 0);
    }

    #[test]
    fn restore_reverts_only_modified_cells() {
        let mut grid = surface(&["$ #"], Offset::ZERO);
        let snapshot = grid.cells().to_vec();
        let _ = grid.set_symbol(Position::new(0, 0), CoordSpace::Screen, Symbol::Empty);
        let _ = grid.set_symbol(Position::new(2, 0), CoordSpace::Screen, Symbol::Empty);
        let _ = grid.drain_changes().count();

        assert!(grid.restore(&snapshot));
        assert_eq!(grid.cells(), snapshot.as_slice());
        assert_eq!(grid.drain_changes().count(), 2);
        assert!(!grid.restore(&snapshot[..1]));
    }

    #[test]
    fn neighbors_are_scored_and_ordered() {
        let grid = surface(&["   ", "  █", "   "], Offset::ZERO);
        let goal = Position::new(2, 2);
        let origin = SearchTile::origin(Position::new(1, 1), goal);
        let neighbors: Vec<_> = grid.neighbors_of(origin, goal).collect();

        let positions: Vec<_> = neighbors.iter().map(|tile| tile.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(1, 0),
                Position::new(1, 2),
                Position::new(0, 1),
            ]
        );
        assert!(neighbors.iter().all(|tile| tile.cost == 1));
        assert_eq!(neighbors[1].heuristic, 1);
    }

    proptest! {
        #[test]
        fn positions_outside_the_grid_fail_closed(x in -50i32..50, y in -50i32..50) {
            let grid = surface(&["    ", "    ", "    "], Offset::new(2, 3));
            let local = grid.offset().to_local(Position::new(x, y));
            let inside = (0..4).contains(&local.x()) && (0..3).contains(&local.y());
            prop_assert_eq!(grid.is_walkable(Position::new(x, y)), inside);
            prop_assert_eq!(grid.is_transparent(Position::new(x, y)), inside);
        }
    }
}
