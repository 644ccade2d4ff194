//! First-person maze game on a 2.5D raycaster.
//!
//! The core is [`maze`], [`player`] and [`raycaster`]: each frame the
//! raycaster marches a fan of rays through the grid and hands an ordered
//! list of [`RayHit`]s (one per screen column) to a [`renderer`].
//! [`quality`] holds the live field of view / ray count / depth, which an
//! FPS-driven policy may change between frames.

pub mod canvas;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod maze;
pub mod movement;
pub mod player;
pub mod quality;
pub mod raycaster;
pub mod renderer;
pub mod scaler;

pub use config::GameConfig;
pub use error::{GameError, Result};
pub use game::{Game, GameState};
pub use maze::{Difficulty, Maze};
pub use movement::{MovementKeys, MovementProfile, compute_movement};
pub use player::Player;
pub use quality::{AdaptivePolicy, PerfChange, QualityHandle, QualityParams};
pub use raycaster::{RayHit, Raycaster};
