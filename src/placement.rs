use crate::grid::Grid;
use crate::rng::Rng;
use crate::types::Vec2;

const PLACEMENT_ATTEMPTS: usize = 256;
const ENEMY_MIN_SEPARATION: i32 = 3;

fn chebyshev(a: Vec2, b: Vec2) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

fn random_interior_cell(grid: &Grid, rng: &mut Rng) -> Vec2 {
    Vec2::new(
        rng.int(1, grid.width() - 2),
        rng.int(1, grid.height() - 2),
    )
}

fn is_open(grid: &Grid, start: Vec2, goal: Vec2, pos: Vec2) -> bool {
    grid.is_floor(pos.x, pos.y) && pos != start && pos != goal
}

fn well_separated(pos: Vec2, placed: &[Vec2]) -> bool {
    placed
        .iter()
        .all(|other| chebyshev(pos, *other) >= ENEMY_MIN_SEPARATION)
}

/// Rejection-sampled enemy cells: floor only, never the start or goal,
/// pairwise Chebyshev distance >= 3. Attempts are capped; once the cap is
/// hit the separation rule is relaxed (cells stay distinct), and as a last
/// resort the remaining floor cells are scanned in order. A config that
/// passed validation always receives the full count.
pub fn place_enemies(
    grid: &Grid,
    start: Vec2,
    goal: Vec2,
    count: usize,
    rng: &mut Rng,
) -> Vec<Vec2> {
    let mut placed = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(pos) = pick_enemy_cell(grid, start, goal, &placed, rng) else {
            break;
        };
        placed.push(pos);
    }
    placed
}

fn pick_enemy_cell(
    grid: &Grid,
    start: Vec2,
    goal: Vec2,
    placed: &[Vec2],
    rng: &mut Rng,
) -> Option<Vec2> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let pos = random_interior_cell(grid, rng);
        if is_open(grid, start, goal, pos) && well_separated(pos, placed) {
            return Some(pos);
        }
    }

    // Separation relaxed; enemies still get distinct cells.
    for _ in 0..PLACEMENT_ATTEMPTS {
        let pos = random_interior_cell(grid, rng);
        if is_open(grid, start, goal, pos) && !placed.contains(&pos) {
            return Some(pos);
        }
    }

    grid.floor_cells()
        .into_iter()
        .find(|pos| is_open(grid, start, goal, *pos) && !placed.contains(pos))
}

/// Pickup cells share the wall/start/goal exclusions but have no
/// separation rule, from each other or from enemies.
pub fn place_pickups(
    grid: &Grid,
    start: Vec2,
    goal: Vec2,
    count: usize,
    rng: &mut Rng,
) -> Vec<Vec2> {
    let mut placed = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(pos) = pick_pickup_cell(grid, start, goal, rng) else {
            break;
        };
        placed.push(pos);
    }
    placed
}

fn pick_pickup_cell(grid: &Grid, start: Vec2, goal: Vec2, rng: &mut Rng) -> Option<Vec2> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let pos = random_interior_cell(grid, rng);
        if is_open(grid, start, goal, pos) {
            return Some(pos);
        }
    }
    grid.floor_cells()
        .into_iter()
        .find(|pos| is_open(grid, start, goal, *pos))
}
