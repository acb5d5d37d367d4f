use heist_core::{GridSurface, Offset, Position, SurfaceRules};
use heist_system_pathfinding::{find_next_step, find_path};
use proptest::prelude::*;

const COLUMNS: i32 = 9;
const ROWS: i32 = 7;

fn open_grid(offset: Offset) -> GridSurface {
    let row = " ".repeat(COLUMNS as usize);
    let rows = vec![row; ROWS as usize];
    GridSurface::from_rows(rows.as_slice(), offset, SurfaceRules::default()).expect("valid grid")
}

fn walk(grid: &GridSurface, start: Position, goal: Position) -> Vec<Position> {
    let mut visited = vec![start];
    let mut current = start;
    while current != goal {
        let next = find_next_step(grid, current, goal).expect("reachable goal");
        assert_eq!(current.manhattan_distance(next), 1, "steps must be orthogonal");
        visited.push(next);
        current = next;
        assert!(visited.len() <= (COLUMNS * ROWS) as usize, "walk did not converge");
    }
    visited
}

proptest! {
    #[test]
    fn repeated_steps_cover_the_manhattan_distance(
        sx in 0..COLUMNS, sy in 0..ROWS, gx in 0..COLUMNS, gy in 0..ROWS,
    ) {
        let offset = Offset::new(4, 2);
        let grid = open_grid(offset);
        let start = offset.to_screen(Position::new(sx, sy));
        let goal = offset.to_screen(Position::new(gx, gy));

        let visited = walk(&grid, start, goal);
        prop_assert_eq!(visited.len() - 1, start.manhattan_distance(goal) as usize);
    }
}

#[test]
fn enclosed_goal_is_unreachable_from_every_outside_tile() {
    let rows = [
        "       ", //
        "  ███  ", //
        "  █$█  ", //
        "  ███  ", //
        "       ",
    ];
    let grid =
        GridSurface::from_rows(&rows, Offset::ZERO, SurfaceRules::default()).expect("valid grid");
    let goal = Position::new(3, 2);

    for y in 0..5 {
        for x in 0..7 {
            let start = Position::new(x, y);
            if !grid.is_walkable(start) || start == goal {
                continue;
            }
            assert_eq!(find_next_step(&grid, start, goal), None, "from {start:?}");
            assert_eq!(find_path(&grid, start, goal), None, "from {start:?}");
        }
    }
}

#[test]
fn locked_exit_is_never_routed_through() {
    let rows = [
        "   ", //
        "█Ð█", //
        "   ",
    ];
    let mut grid =
        GridSurface::from_rows(&rows, Offset::ZERO, SurfaceRules::default()).expect("valid grid");
    let start = Position::new(1, 0);
    let goal = Position::new(1, 2);
    assert_eq!(find_next_step(&grid, start, goal), Some(Position::new(1, 1)));

    grid.set_exit_locked(true);
    assert_eq!(find_next_step(&grid, start, goal), None);
}

#[test]
fn goal_outside_the_grid_is_unreachable() {
    let grid = open_grid(Offset::ZERO);
    assert_eq!(
        find_next_step(&grid, Position::new(0, 0), Position::new(-1, 0)),
        None
    );
}
