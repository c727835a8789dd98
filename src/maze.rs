use crate::grid::Grid;
use crate::rng::Rng;
use crate::types::Vec2;

/// Randomized depth-first backtracking carver.
///
/// Carves with 2-cell steps from `start` (odd coordinates), opening the
/// connecting cell between the current cell and each newly visited
/// neighbor. Dimensions must be odd and at least 5; `GameConfig::validate`
/// enforces that before any maze is generated.
pub fn generate_maze(width: i32, height: i32, start: Vec2, rng: &mut Rng) -> Grid {
    let mut grid = Grid::solid(width, height);
    let mut stack = vec![start];
    grid.set_floor(start.x, start.y);

    while let Some(current) = stack.pop() {
        let mut directions = [(0, 2), (0, -2), (2, 0), (-2, 0)];
        rng.shuffle(&mut directions);

        for (dx, dy) in directions {
            let next_x = current.x + dx;
            let next_y = current.y + dy;
            if grid.in_interior(next_x, next_y) && grid.is_wall(next_x, next_y) {
                grid.set_floor(next_x, next_y);
                grid.set_floor(current.x + dx / 2, current.y + dy / 2);
                stack.push(Vec2::new(next_x, next_y));
            }
        }
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLAYER_START;

    fn floor_count(grid: &Grid) -> usize {
        grid.floor_cells().len()
    }

    #[test]
    fn border_cells_stay_wall() {
        for seed in 0..100u32 {
            let mut rng = Rng::new(seed);
            let grid = generate_maze(21, 21, PLAYER_START, &mut rng);
            for x in 0..21 {
                assert!(grid.is_wall(x, 0));
                assert!(grid.is_wall(x, 20));
            }
            for y in 0..21 {
                assert!(grid.is_wall(0, y));
                assert!(grid.is_wall(20, y));
            }
        }
    }

    #[test]
    fn every_floor_cell_is_reachable_from_start() {
        for seed in 0..100u32 {
            let mut rng = Rng::new(seed);
            let grid = generate_maze(21, 21, PLAYER_START, &mut rng);
            let reachable = grid.reachable_from(PLAYER_START);
            assert_eq!(
                reachable.len(),
                floor_count(&grid),
                "disconnected floor cells: seed={seed}"
            );
        }
    }

    #[test]
    fn goal_is_reachable_in_default_maze() {
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let grid = generate_maze(21, 21, PLAYER_START, &mut rng);
            let reachable = grid.reachable_from(PLAYER_START);
            assert!(reachable.contains(&(19, 19)), "goal unreachable: seed={seed}");
        }
    }

    #[test]
    fn carved_maze_is_perfect() {
        // A perfect maze over a*b nodes has exactly a*b + (a*b - 1)
        // floor cells; any extra cell would close a loop.
        for (width, height) in [(5, 5), (9, 7), (21, 21), (31, 15)] {
            let a = ((width - 1) / 2) as usize;
            let b = ((height - 1) / 2) as usize;
            for seed in 0..50u32 {
                let mut rng = Rng::new(seed);
                let grid = generate_maze(width, height, PLAYER_START, &mut rng);
                assert_eq!(floor_count(&grid), 2 * a * b - 1);
            }
        }
    }

    #[test]
    fn no_floor_lands_on_even_even_coordinates() {
        for seed in 0..50u32 {
            let mut rng = Rng::new(seed);
            let grid = generate_maze(21, 21, PLAYER_START, &mut rng);
            for cell in grid.floor_cells() {
                assert!(cell.x % 2 == 1 || cell.y % 2 == 1);
            }
        }
    }

    #[test]
    fn same_seed_carves_the_same_maze() {
        for seed in [0u32, 1, 42, 9_999] {
            let mut rng_a = Rng::new(seed);
            let mut rng_b = Rng::new(seed);
            let a = generate_maze(21, 21, PLAYER_START, &mut rng_a);
            let b = generate_maze(21, 21, PLAYER_START, &mut rng_b);
            assert_eq!(a, b);
        }
    }
}
