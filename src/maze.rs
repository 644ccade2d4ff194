//! Grid maze: fixed rectangular grid of cell codes plus a spawn point.

use std::fmt;

use crate::error::{GameError, Result};

pub const OPEN: u8 = 0;
pub const WALL: u8 = 1;
pub const EXIT: u8 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    fn template(self) -> (&'static [&'static str], (f64, f64)) {
        match self {
            Difficulty::Easy => (EASY, (1.5, 1.5)),
            Difficulty::Medium => (MEDIUM, (1.5, 1.5)),
            Difficulty::Hard => (HARD, (1.5, 1.5)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[rustfmt::skip]
const EASY: &[&str] = &[
    "1111111111",
    "1000000001",
    "1011110101",
    "1010000101",
    "1010111101",
    "1010100001",
    "1010101111",
    "1000100001",
    "1110111901",
    "1111111111",
];

#[rustfmt::skip]
const MEDIUM: &[&str] = &[
    "111111111111111",
    "100000100000001",
    "101110101111101",
    "101000001000101",
    "101011111010101",
    "100010000010001",
    "111010111011111",
    "100010101000001",
    "101110101110101",
    "101000100010101",
    "101011101010101",
    "100010001010001",
    "111110111011101",
    "100000100000091",
    "111111111111111",
];

#[rustfmt::skip]
const HARD: &[&str] = &[
    "11111111111111111111",
    "10000000000000100001",
    "10111010111110101101",
    "10100010100010101001",
    "10101110101010101011",
    "10100000001010001001",
    "10101011111011111101",
    "10001010000010000001",
    "11111010111110111011",
    "10000010100000100001",
    "10111110101111101101",
    "10100000101000001001",
    "10101111101011111011",
    "10101000001010000001",
    "10101011111010111111",
    "10001010000010000001",
    "11101010111110101101",
    "10001000100000101001",
    "10111111101111101091",
    "11111111111111111111",
];

/// Immutable maze grid. Cells are stored row-major.
#[derive(Clone, Debug)]
pub struct Maze {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    spawn: (f64, f64),
}

impl Maze {
    /// Builds the maze for a difficulty from its static template.
    pub fn new(difficulty: Difficulty) -> Result<Self> {
        let (template, spawn) = difficulty.template();
        let rows = parse_rows(template)?;
        Self::from_rows(rows, spawn)
    }

    /// Builds a maze from explicit rows of cell codes.
    ///
    /// Rows must be non-empty, equally long and contain only [`OPEN`],
    /// [`WALL`] or [`EXIT`]. The spawn point must sit inside a non-wall cell.
    pub fn from_rows(rows: Vec<Vec<u8>>, spawn: (f64, f64)) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(GameError::MalformedGrid("grid is empty".into()));
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GameError::MalformedGrid(format!(
                    "row {} has {} columns, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            if let Some(x) = row.iter().position(|&c| !matches!(c, OPEN | WALL | EXIT)) {
                return Err(GameError::MalformedGrid(format!(
                    "unknown cell code {} at ({}, {})",
                    row[x], x, y
                )));
            }
            cells.extend_from_slice(row);
        }

        let maze = Self {
            width,
            height,
            cells,
            spawn,
        };

        let (sx, sy) = spawn;
        if !sx.is_finite() || !sy.is_finite() || maze.is_wall(sx as i64, sy as i64) {
            return Err(GameError::MalformedGrid(format!(
                "spawn ({:.2}, {:.2}) is not inside an open cell",
                sx, sy
            )));
        }

        Ok(maze)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn spawn(&self) -> (f64, f64) {
        self.spawn
    }

    /// Cell code at integer coordinates, `None` outside the grid.
    #[inline]
    pub fn cell(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.cells[y as usize * self.width + x as usize])
    }

    /// Anything outside the grid counts as wall.
    #[inline]
    pub fn is_wall(&self, x: i64, y: i64) -> bool {
        self.cell(x, y).is_none_or(|c| c == WALL)
    }

    /// Anything outside the grid is never an exit.
    #[inline]
    pub fn is_exit(&self, x: i64, y: i64) -> bool {
        self.cell(x, y) == Some(EXIT)
    }
}

/// Truncates a continuous coordinate to its cell index (toward zero).
#[inline]
pub fn cell_index(v: f64) -> i64 {
    v as i64
}

fn parse_rows(template: &[&str]) -> Result<Vec<Vec<u8>>> {
    template
        .iter()
        .enumerate()
        .map(|(y, line)| {
            line.chars()
                .enumerate()
                .map(|(x, ch)| {
                    ch.to_digit(10).map(|d| d as u8).ok_or_else(|| {
                        GameError::MalformedGrid(format!("bad template char {:?} at ({}, {})", ch, x, y))
                    })
                })
                .collect::<Result<Vec<u8>>>()
        })
        .collect()
}
