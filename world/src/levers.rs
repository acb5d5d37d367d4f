//! Levers and the gates they open and close.

use heist_core::{CoordSpace, Event, GridSurface, LeverId, Position, Symbol};
use tracing::debug;

/// Lever together with the gates it controls, all in local coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Lever {
    id: LeverId,
    position: Position,
    gates: Vec<Position>,
    on: bool,
}

impl Lever {
    pub(crate) fn new(id: LeverId, position: Position, gates: Vec<Position>, on: bool) -> Self {
        Self {
            id,
            position,
            gates,
            on,
        }
    }

    pub(crate) const fn id(&self) -> LeverId {
        self.id
    }

    pub(crate) const fn is_on(&self) -> bool {
        self.on
    }

    /// Flips the lever and every gate wired to it.
    fn toggle(&mut self, surface: &mut GridSurface, out: &mut Vec<Event>) {
        self.on = !self.on;

        for gate in &self.gates {
            let flipped = match surface.symbol_at(*gate, CoordSpace::Local) {
                Some(Symbol::Gate) => Symbol::Empty,
                Some(_) => Symbol::Gate,
                None => continue,
            };
            let _ = surface.set_symbol(*gate, CoordSpace::Local, flipped);
        }

        let symbol = if self.on {
            Symbol::LeverOn
        } else {
            Symbol::LeverOff
        };
        let _ = surface.set_symbol(self.position, CoordSpace::Local, symbol);

        debug!(lever = self.id.get(), on = self.on, "lever toggled");
        out.push(Event::LeverToggled {
            lever: self.id,
            on: self.on,
        });
    }
}

/// Toggles the lever standing on the screen position `at`.
///
/// Returns `false` without touching the grid when no lever is registered
/// there.
pub(crate) fn toggle_at(
    levers: &mut [Lever],
    surface: &mut GridSurface,
    at: Position,
    out: &mut Vec<Event>,
) -> bool {
    let local = surface.offset().to_local(at);
    let Some(lever) = levers.iter_mut().find(|lever| lever.position == local) else {
        return false;
    };

    lever.toggle(surface, out);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use heist_core::{Offset, SurfaceRules};

    #[test]
    fn toggling_flips_lever_and_gates() {
        let mut surface = GridSurface::from_rows(
            &["\\ # "],
            Offset::new(10, 10),
            SurfaceRules::default(),
        )
        .expect("valid grid");
        let mut levers = vec![Lever::new(
            LeverId::new(1),
            Position::new(0, 0),
            vec![Position::new(2, 0), Position::new(3, 0)],
            false,
        )];
        let mut events = Vec::new();

        assert!(toggle_at(&mut levers, &mut surface, Position::new(10, 10), &mut events));
        assert!(levers[0].is_on());
        let cells: String = surface.cells().iter().map(|cell| cell.glyph()).collect();
        assert_eq!(cells, "/  #");
        assert_eq!(
            events,
            vec![Event::LeverToggled {
                lever: LeverId::new(1),
                on: true
            }]
        );

        assert!(toggle_at(&mut levers, &mut surface, Position::new(10, 10), &mut events));
        let cells: String = surface.cells().iter().map(|cell| cell.glyph()).collect();
        assert_eq!(cells, "\\ # ");
    }

    #[test]
    fn unknown_position_is_ignored() {
        let mut surface =
            GridSurface::from_rows(&["\\ "], Offset::ZERO, SurfaceRules::default())
                .expect("valid grid");
        let mut levers = vec![Lever::new(LeverId::new(1), Position::new(0, 0), Vec::new(), false)];
        let mut events = Vec::new();

        assert!(!toggle_at(&mut levers, &mut surface, Position::new(1, 0), &mut events));
        assert!(events.is_empty());
        assert_eq!(surface.drain_changes().count(), 0);
    }
}
