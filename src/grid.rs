use std::collections::{HashSet, VecDeque};

use crate::types::Vec2;

pub const WALL: char = '#';
pub const FLOOR: char = '.';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Vec<char>>,
}

impl Grid {
    /// A grid of the given size with every cell set to wall.
    pub fn solid(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![WALL; width as usize]; height as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Strictly inside the border ring.
    pub fn in_interior(&self, x: i32, y: i32) -> bool {
        x > 0 && y > 0 && x < self.width - 1 && y < self.height - 1
    }

    /// Out-of-bounds cells read as wall so callers can probe neighbors
    /// near the border without their own bounds checks.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        self.cells[y as usize][x as usize] == WALL
    }

    pub fn is_floor(&self, x: i32, y: i32) -> bool {
        !self.is_wall(x, y)
    }

    pub fn set_floor(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            self.cells[y as usize][x as usize] = FLOOR;
        }
    }

    pub fn rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect()
    }

    pub fn floor_cells(&self) -> Vec<Vec2> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_floor(x, y) {
                    out.push(Vec2::new(x, y));
                }
            }
        }
        out
    }

    pub fn reachable_from(&self, start: Vec2) -> HashSet<(i32, i32)> {
        let mut out = HashSet::new();
        if !self.is_floor(start.x, start.y) {
            return out;
        }

        let mut queue = VecDeque::new();
        out.insert((start.x, start.y));
        queue.push_back((start.x, start.y));

        while let Some((x, y)) = queue.pop_front() {
            for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                if !self.is_floor(nx, ny) {
                    continue;
                }
                if out.insert((nx, ny)) {
                    queue.push_back((nx, ny));
                }
            }
        }

        out
    }
}
