//! Scripted sessions read from TOML files.

use anyhow::{ensure, Context, Result};
use heist_core::Position;
use heist_world::{LevelBlueprint, WorldConfig};
use serde::Deserialize;

/// Bundled scenario used when no file is given on the command line.
pub(crate) const BUNDLED: &str = include_str!("../scenarios/heist.toml");

/// Level, world settings and the route the scripted player follows.
#[derive(Debug, Deserialize)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) world: WorldConfig,
    pub(crate) level: LevelBlueprint,
    #[serde(default)]
    pub(crate) player: PlayerScript,
}

/// Route of the scripted player in level-local coordinates.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct PlayerScript {
    pub(crate) step_ms: u64,
    pub(crate) route: Vec<Position>,
}

impl Default for PlayerScript {
    fn default() -> Self {
        Self {
            step_ms: 120,
            route: Vec::new(),
        }
    }
}

impl Scenario {
    pub(crate) fn from_toml_str(source: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(source).context("failed to parse scenario")?;
        scenario
            .world
            .validate()
            .context("invalid world settings")?;
        ensure!(scenario.player.step_ms > 0, "player step_ms must be positive");
        Ok(scenario)
    }
}

impl PlayerScript {
    /// Every tile visited from `start` through each route point in turn.
    ///
    /// Legs are walked one tile at a time, columns before rows.
    pub(crate) fn tiles(&self, start: Position) -> Vec<Position> {
        let mut tiles = vec![start];
        let mut current = start;

        for target in &self.route {
            while current != *target {
                let dx = (target.x() - current.x()).signum();
                current = if dx != 0 {
                    current.translate(dx, 0)
                } else {
                    current.translate(0, (target.y() - current.y()).signum())
                };
                tiles.push(current);
            }
        }

        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_scenario_parses() {
        let scenario = Scenario::from_toml_str(BUNDLED).expect("bundled scenario");
        assert_eq!(scenario.level.guards.len(), 2);
        assert_eq!(scenario.level.levers.len(), 1);
        assert_eq!(scenario.player.step_ms, 120);
        assert_eq!(scenario.level.columns(), 17);
    }

    #[test]
    fn route_expands_into_single_tile_steps() {
        let script = PlayerScript {
            step_ms: 100,
            route: vec![Position::new(2, 0), Position::new(2, 2), Position::new(0, 1)],
        };
        assert_eq!(
            script.tiles(Position::new(0, 0)),
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(2, 1),
                Position::new(2, 2),
                Position::new(1, 2),
                Position::new(0, 2),
                Position::new(0, 1),
            ]
        );
    }

    #[test]
    fn zero_player_speed_is_rejected() {
        let source = BUNDLED.replace("step_ms = 120", "step_ms = 0");
        assert!(Scenario::from_toml_str(&source).is_err());
    }
}
