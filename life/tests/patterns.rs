use life::CellState::Alive;
use life::{Config, Grid};

fn grid_with(width: usize, height: usize, cells: &[(usize, usize)]) -> Grid {
    let mut grid = Grid::new(&Config {
        width,
        height,
        seed: Some(42),
        ..Config::default()
    });
    for &(x, y) in cells {
        grid.set(x, y, Alive);
    }
    grid
}

fn assert_alive(grid: &Grid, cells: &[(usize, usize)]) {
    for &(x, y) in cells {
        assert!(grid.get(x, y).is_alive(), "expected alive at ({x}, {y})");
    }
}

fn assert_dead(grid: &Grid, cells: &[(usize, usize)]) {
    for &(x, y) in cells {
        assert!(!grid.get(x, y).is_alive(), "expected dead at ({x}, {y})");
    }
}

fn collect_live(grid: &Grid) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    grid.for_each_live(|x, y| out.push((x, y)));
    out
}

#[test]
fn isolated_cell_dies_out() {
    let mut grid = grid_with(5, 5, &[(2, 2)]);

    grid.step();

    assert_eq!(grid.population(), 0);
}

#[test]
fn block_is_a_still_life() {
    let block = [(2, 2), (3, 2), (2, 3), (3, 3)];
    let mut grid = grid_with(6, 6, &block);

    grid.step();

    assert_alive(&grid, &block);
    assert_eq!(grid.population(), 4);

    grid.step();

    assert_alive(&grid, &block);
    assert_eq!(grid.population(), 4);
}

#[test]
fn block_in_grid_corner_survives() {
    let block = [(0, 0), (1, 0), (0, 1), (1, 1)];
    let mut grid = grid_with(4, 4, &block);

    grid.step();

    assert_alive(&grid, &block);
    assert_eq!(grid.population(), 4);
}

#[test]
fn blinker_oscillates() {
    let mut grid = grid_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);

    grid.step();

    assert_alive(&grid, &[(2, 1), (2, 2), (2, 3)]);
    assert_dead(&grid, &[(1, 2), (3, 2)]);
    assert_eq!(grid.population(), 3);

    grid.step();

    assert_alive(&grid, &[(1, 2), (2, 2), (3, 2)]);
    assert_dead(&grid, &[(2, 1), (2, 3)]);
    assert_eq!(grid.population(), 3);
}

#[test]
fn randomize_tracks_spawn_probability() {
    let config = Config {
        width: 200,
        height: 200,
        seed: Some(7),
        ..Config::default()
    };
    let mut grid = Grid::new(&config);

    grid.randomize();

    let fraction = grid.population() as f64 / (200.0 * 200.0);
    assert!(
        (fraction - config.spawn_probability).abs() < 0.01,
        "live fraction {fraction} too far from {}",
        config.spawn_probability
    );
}

#[test]
fn seeded_runs_are_reproducible() {
    let config = Config {
        width: 64,
        height: 48,
        seed: Some(1234),
        ..Config::default()
    };
    let mut first = Grid::new(&config);
    let mut second = Grid::new(&config);

    first.randomize();
    second.randomize();
    assert_eq!(collect_live(&first), collect_live(&second));

    for _ in 0..10 {
        first.step();
        second.step();
    }
    assert_eq!(collect_live(&first), collect_live(&second));
}
