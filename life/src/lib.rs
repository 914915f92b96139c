//! Conway's Game of Life on a fixed-size, non-wrapping grid.

pub mod config;
pub mod grid;

pub use config::Config;
pub use grid::{CellState, Grid};
