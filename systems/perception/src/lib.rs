#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Guard perception: a directional aggro box followed by a Bresenham
//! line-of-sight test against the grid's transparency query.

use heist_core::{Direction, Position, TileQuery};
use serde::{Deserialize, Serialize};

/// Directional rectangle in which a guard attempts to spot the player.
///
/// A guard facing up or down sees `horizontal_reach` tiles to either side,
/// `vertical_reach` tiles ahead and `rear_reach` tiles behind. A guard facing
/// left or right sees `vertical_reach` tiles to either side,
/// `horizontal_reach` tiles ahead and `rear_reach` tiles behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggroBox {
    /// Reach along the vertical axis.
    pub vertical_reach: u32,
    /// Reach along the horizontal axis.
    pub horizontal_reach: u32,
    /// Reach behind the guard.
    pub rear_reach: u32,
}

impl Default for AggroBox {
    fn default() -> Self {
        Self {
            vertical_reach: 5,
            horizontal_reach: 10,
            rear_reach: 1,
        }
    }
}

impl AggroBox {
    /// Reports whether `target` falls inside the box of a guard at
    /// `observer` facing `facing`.
    #[must_use]
    pub fn contains(&self, observer: Position, facing: Direction, target: Position) -> bool {
        let dx = i64::from(target.x()) - i64::from(observer.x());
        let dy = i64::from(target.y()) - i64::from(observer.y());
        let vertical = i64::from(self.vertical_reach);
        let horizontal = i64::from(self.horizontal_reach);
        let rear = i64::from(self.rear_reach);

        match facing {
            Direction::Up => dx.abs() <= horizontal && (-vertical..=rear).contains(&dy),
            Direction::Down => dx.abs() <= horizontal && (-rear..=vertical).contains(&dy),
            Direction::Right => (-rear..=horizontal).contains(&dx) && dy.abs() <= vertical,
            Direction::Left => (-horizontal..=rear).contains(&dx) && dy.abs() <= vertical,
        }
    }
}

/// Tiles crossed by the straight line between two positions.
///
/// Both endpoints are included and the tiles are ordered from `from` to `to`.
/// The same set of tiles is produced regardless of argument order.
#[must_use]
pub fn line_between(from: Position, to: Position) -> Vec<Position> {
    let (mut x0, mut y0) = (i64::from(from.x()), i64::from(from.y()));
    let (mut x1, mut y1) = (i64::from(to.x()), i64::from(to.y()));

    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }

    let reversed = x0 > x1;
    if reversed {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let delta_x = x1 - x0;
    let delta_y = (y1 - y0).abs();
    let y_step = if y0 < y1 { 1 } else { -1 };
    let mut error = delta_x / 2;
    let mut y = y0;

    let mut tiles = Vec::with_capacity(usize::try_from(delta_x + 1).unwrap_or(0));
    for x in x0..=x1 {
        let (column, row) = if steep { (y, x) } else { (x, y) };
        tiles.push(Position::new(narrow(column), narrow(row)));
        error -= delta_y;
        if error < 0 {
            y += y_step;
            error += delta_x;
        }
    }

    if reversed {
        tiles.reverse();
    }
    tiles
}

// Values originate from i32 coordinates and stay between the endpoints.
fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Reports whether a guard at `observer` facing `facing` can see `target`.
///
/// The target must sit inside the aggro box and every tile on the line
/// between the two, endpoints included, must be transparent.
#[must_use]
pub fn can_see<Q>(
    surface: &Q,
    observer: Position,
    facing: Direction,
    target: Position,
    aggro: &AggroBox,
) -> bool
where
    Q: TileQuery + ?Sized,
{
    if !aggro.contains(observer, facing, target) {
        return false;
    }

    line_between(observer, target)
        .into_iter()
        .all(|tile| surface.is_transparent(tile))
}
