use crate::grid::Grid;
use crate::rng::Rng;
use crate::types::{Direction, Vec2};

/// One wander tick for every enemy, in index order. Enemies move
/// independently and may share a cell afterwards.
pub fn step_enemies(enemies: &mut [Vec2], grid: &Grid, rng: &mut Rng) {
    for enemy in enemies.iter_mut() {
        *enemy = random_step(*enemy, grid, rng);
    }
}

/// Uniform pick among the adjacent strictly-interior floor cells; a
/// walled-in enemy stays put.
pub fn random_step(pos: Vec2, grid: &Grid, rng: &mut Rng) -> Vec2 {
    let mut candidates = Vec::with_capacity(4);
    for dir in Direction::ALL {
        let next = dir.offset(pos);
        if grid.in_interior(next.x, next.y) && grid.is_floor(next.x, next.y) {
            candidates.push(next);
        }
    }
    if candidates.is_empty() {
        pos
    } else {
        candidates[rng.pick_index(candidates.len())]
    }
}
