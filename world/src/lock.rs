//! Key pieces that keep the level exit shut.

use std::collections::VecDeque;

use heist_core::{CoordSpace, GridSurface, Position, Symbol};

/// Revealed and still hidden key pieces of a level.
///
/// The exit stays locked while any revealed piece remains on the grid. Hidden
/// pieces appear one at a time, each once every revealed piece was collected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LevelLock {
    revealed: u32,
    hidden: VecDeque<Position>,
}

impl LevelLock {
    /// Creates a lock with `revealed` pieces on the grid and `hidden` local
    /// positions waiting to appear.
    pub(crate) fn new(revealed: u32, hidden: impl IntoIterator<Item = Position>) -> Self {
        Self {
            revealed,
            hidden: hidden.into_iter().collect(),
        }
    }

    pub(crate) const fn is_locked(&self) -> bool {
        self.revealed > 0
    }

    pub(crate) const fn revealed(&self) -> u32 {
        self.revealed
    }

    pub(crate) fn hidden(&self) -> usize {
        self.hidden.len()
    }

    /// Places the next hidden piece when no revealed piece is left.
    pub(crate) fn reveal_if_exhausted(&mut self, surface: &mut GridSurface) {
        if self.revealed > 0 {
            return;
        }

        if let Some(next) = self.hidden.pop_front() {
            let _ = surface.set_symbol(next, CoordSpace::Local, Symbol::Key);
            self.revealed += 1;
        }
    }

    /// Removes the key piece at the screen position and updates the exit.
    ///
    /// Returns `true` when this collection opened the exit.
    pub(crate) fn collect(&mut self, surface: &mut GridSurface, at: Position) -> bool {
        let was_locked = self.is_locked();
        let _ = surface.set_symbol(at, CoordSpace::Screen, Symbol::Empty);
        self.revealed = self.revealed.saturating_sub(1);
        self.reveal_if_exhausted(surface);
        surface.set_exit_locked(self.is_locked());

        was_locked && !self.is_locked()
    }
}
