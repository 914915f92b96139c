/*
* A live cell dies if it has fewer than two live neighbors.
* A live cell with two or three live neighbors lives on to the next generation.
* A live cell with more than three live neighbors dies.
* A dead cell will be brought back to life if it has exactly three live neighbors.
*/
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::grid::CellState::{Alive, Dead};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Dead,
    Alive,
}

impl CellState {
    pub fn is_alive(self) -> bool {
        self == Alive
    }
}

/// A fixed-size board holding the current generation and a scratch buffer
/// for the next one.
///
/// Cells are stored row-major and addressed as (x, y) with the origin in the
/// top-left corner. Edges do not wrap: positions outside the board count as
/// dead when neighbors are tallied.
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
    scratch: Vec<CellState>,
    rng: StdRng,
    spawn_probability: f64,
}

impl Grid {
    /// Create an all-dead grid. The RNG is seeded from the config so a fixed
    /// seed makes the whole run deterministic, re-randomization included.
    pub fn new(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let cell_count = config.width * config.height;
        Grid {
            width: config.width,
            height: config.height,
            cells: vec![Dead; cell_count],
            scratch: vec![Dead; cell_count],
            rng,
            spawn_probability: config.spawn_probability,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Replace the board with a fresh random pattern.
    pub fn randomize(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = if self.rng.random_bool(self.spawn_probability) {
                Alive
            } else {
                Dead
            };
        }
    }

    pub fn get(&self, x: usize, y: usize) -> CellState {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) out of bounds"
        );
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, state: CellState) {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) out of bounds"
        );
        self.cells[y * self.width + x] = state;
    }

    /// Compute a cell's state in the next generation from the current board.
    pub fn next_state(&self, x: usize, y: usize) -> CellState {
        let alive_neighbors = self.alive_neighbors(x, y);

        // Apply Game of Life rules
        match (self.get(x, y), alive_neighbors) {
            (Alive, 2..=3) => Alive, // Survives
            (Dead, 3) => Alive,      // Becomes alive
            _ => Dead,               // Dies or remains dead
        }
    }

    /// Advance the whole board by one generation.
    pub fn step(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.scratch[y * self.width + x] = self.next_state(x, y);
            }
        }
        std::mem::swap(&mut self.cells, &mut self.scratch);
    }

    /// Count the number of alive neighbors for a cell.
    fn alive_neighbors(&self, x: usize, y: usize) -> usize {
        let mut count = 0;

        for dy in [-1isize, 0, 1] {
            for dx in [-1isize, 0, 1] {
                if dx == 0 && dy == 0 {
                    // Skip the current cell
                    continue;
                }

                let neighbor_x = x as isize + dx;
                let neighbor_y = y as isize + dy;
                if neighbor_x < 0
                    || neighbor_y < 0
                    || neighbor_x >= self.width as isize
                    || neighbor_y >= self.height as isize
                {
                    continue;
                }

                if self.cells[neighbor_y as usize * self.width + neighbor_x as usize] == Alive {
                    count += 1;
                }
            }
        }

        count
    }

    /// Visit every live cell of the current generation in row-major order.
    pub fn for_each_live(&self, mut f: impl FnMut(usize, usize)) {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[y * self.width + x] == Alive {
                    f(x, y);
                }
            }
        }
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }
}
