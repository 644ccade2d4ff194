use std::fmt;

use crate::maze::{Maze, cell_index};

/// Result of a per-axis move attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved_x: bool,
    pub moved_y: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    /// Grid units
    pub x: f64,
    /// Grid units
    pub y: f64,
    /// Degrees, always in [0, 360)
    angle: f64,
}

impl Player {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self {
            x,
            y,
            angle: normalize_degrees(angle),
        }
    }

    /// Places a player at the maze spawn, facing angle 0.
    pub fn at_spawn(maze: &Maze) -> Self {
        let (x, y) = maze.spawn();
        Self::new(x, y, 0.0)
    }

    #[inline]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = normalize_degrees(angle);
    }

    pub fn turn(&mut self, delta: f64) {
        self.angle = normalize_degrees(self.angle + delta);
    }

    /// Moves along the facing direction without collision checks.
    pub fn move_forward(&mut self, distance: f64) {
        let (dx, dy) = self.direction_vector();
        self.x += distance * dx;
        self.y += distance * dy;
    }

    #[inline]
    pub fn direction_vector(&self) -> (f64, f64) {
        let rad = self.angle.to_radians();
        (rad.cos(), rad.sin())
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (x - self.x).hypot(y - self.y)
    }

    /// Square hitbox test: false if any corner of the `radius` half-width
    /// square around `(x, y)` truncates onto a wall cell. Conservative near
    /// corners compared to a circle.
    pub fn can_move_to(&self, x: f64, y: f64, maze: &Maze, radius: f64) -> bool {
        let corners = [
            (x - radius, y - radius),
            (x + radius, y - radius),
            (x - radius, y + radius),
            (x + radius, y + radius),
        ];
        corners
            .iter()
            .all(|&(cx, cy)| !maze.is_wall(cell_index(cx), cell_index(cy)))
    }

    /// Applies a movement delta one axis at a time, x first, so a blocked
    /// axis does not stop sliding along the other.
    pub fn try_move(&mut self, dx: f64, dy: f64, maze: &Maze, radius: f64) -> MoveOutcome {
        let mut outcome = MoveOutcome::default();

        let new_x = self.x + dx;
        if self.can_move_to(new_x, self.y, maze, radius) {
            self.x = new_x;
            outcome.moved_x = true;
        }

        let new_y = self.y + dy;
        if self.can_move_to(self.x, new_y, maze, radius) {
            self.y = new_y;
            outcome.moved_y = true;
        }

        outcome
    }

    /// True when the truncated position lies on the exit cell.
    pub fn on_exit(&self, maze: &Maze) -> bool {
        maze.is_exit(cell_index(self.x), cell_index(self.y))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Player(x={:.2}, y={:.2}, angle={:.1}°)",
            self.x, self.y, self.angle
        )
    }
}

/// Wraps any angle into [0, 360).
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}
