/// Simulation parameters, fixed for the lifetime of a grid.
///
/// The defaults reproduce the reference setup: a 640x480 pixel window at
/// five pixels per cell, one cell in ten starting alive.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Edge length of a rendered cell, in pixels.
    pub cell_size: u32,
    /// Independent per-cell probability of starting alive.
    pub spawn_probability: f64,
    /// Fixed RNG seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 128,
            height: 96,
            cell_size: 5,
            spawn_probability: 0.1,
            seed: None,
        }
    }
}

impl Config {
    /// Window size in pixels: one `cell_size` square per cell.
    pub fn window_size(&self) -> (u32, u32) {
        (
            self.width as u32 * self.cell_size,
            self.height as u32 * self.cell_size,
        )
    }
}
