//! ASCII rendering of mazes and learned routes

use qmaze::{cli::output::render_maze, maze::Maze, types::Position};

#[test]
fn bare_maze_renders_endpoints() {
    let maze = Maze::parse(&["..#", "...", "#.."]).unwrap();
    assert_eq!(render_maze(&maze, &[]), "S.#\n...\n#.G");
}

#[test]
fn route_cells_are_starred() {
    let maze = Maze::open(3).unwrap();
    let path = [
        Position::new(0, 0),
        Position::new(1, 0),
        Position::new(1, 1),
        Position::new(1, 2),
        Position::new(2, 2),
    ];
    assert_eq!(render_maze(&maze, &path), "S*.\n.*.\n.*G");
}

#[test]
fn endpoints_outrank_route_markers() {
    let maze = Maze::open(2).unwrap();
    let path = [
        Position::new(0, 0),
        Position::new(1, 0),
        Position::new(1, 1),
    ];
    assert_eq!(render_maze(&maze, &path), "S*\n.G");
}
