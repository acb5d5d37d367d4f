//! Plain-text frames of the level with guards and the player drawn on top.

use heist_core::{CoordSpace, Position};
use heist_world::{query, World};

/// Glyph drawn for the player.
pub(crate) const PLAYER_GLYPH: char = '@';

/// Renders the level as one string per row.
pub(crate) fn frame(world: &World, player: Position) -> Vec<String> {
    let surface = query::surface(world);
    let offset = surface.offset();
    let guards = query::guards(world);
    let columns = i32::try_from(surface.columns()).unwrap_or(i32::MAX);
    let rows = i32::try_from(surface.rows()).unwrap_or(i32::MAX);

    (0..rows)
        .map(|y| {
            (0..columns)
                .map(|x| {
                    let screen = offset.to_screen(Position::new(x, y));
                    if screen == player {
                        return PLAYER_GLYPH;
                    }
                    if let Some(guard) = guards.iter().find(|guard| guard.position == screen) {
                        return guard.facing.glyph();
                    }
                    surface
                        .symbol_at(screen, CoordSpace::Screen)
                        .map_or(' ', |symbol| symbol.glyph())
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use heist_core::Position;
    use heist_world::{LevelBlueprint, WorldConfig};

    use super::*;

    #[test]
    fn frame_overlays_player_on_the_grid() {
        let blueprint = LevelBlueprint {
            rows: vec!["█████".to_owned(), "█ $Ð█".to_owned(), "█████".to_owned()],
            exit: Position::new(3, 1),
            player_start: Position::new(1, 1),
            ..LevelBlueprint::default()
        };
        let world = World::load(&blueprint, &WorldConfig::default()).expect("valid level");
        let player = query::player_start(&world);

        assert_eq!(
            frame(&world, player),
            vec!["█████".to_owned(), "█@$Ð█".to_owned(), "█████".to_owned()]
        );
    }
}
