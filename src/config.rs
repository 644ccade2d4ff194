//! Game configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! [raycast]
//! num_rays = 200
//! max_depth = 18.0
//!
//! [player]
//! radius = 0.25
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{GameError, Result};
use crate::movement::Tuning;
use crate::quality::{AdaptivePolicy, QualityParams};
use crate::raycaster::MAX_STEP;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub raycast: RaycastConfig,
    pub player: PlayerConfig,
    pub adaptation: AdaptationConfig,
}

/// Window and internal framebuffer
#[derive(Clone, Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: usize,

    #[serde(default = "default_height")]
    pub height: usize,

    #[serde(default = "default_title")]
    pub title: String,

    /// Frame pacing target
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RaycastConfig {
    /// Field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f64,

    #[serde(default = "default_num_rays")]
    pub num_rays: usize,

    /// Grid units
    #[serde(default = "default_max_depth")]
    pub max_depth: f64,

    /// March step in grid units
    #[serde(default = "default_step")]
    pub step: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlayerConfig {
    /// Grid units per second
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Degrees per second
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f64,

    /// Half-width of the collision square
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Use accelerating movement instead of the difficulty profile
    #[serde(default)]
    pub smooth_movement: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AdaptationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_low_fps")]
    pub low_fps: f64,

    #[serde(default = "default_high_fps")]
    pub high_fps: f64,

    #[serde(default = "default_reduced_rays")]
    pub reduced_rays: usize,

    #[serde(default = "default_reduced_depth")]
    pub reduced_depth: f64,

    #[serde(default = "default_increased_rays")]
    pub increased_rays: usize,

    #[serde(default = "default_increased_depth")]
    pub increased_depth: f64,

    /// Below this FPS the fast renderer is preferred
    #[serde(default = "default_fast_renderer_fps")]
    pub fast_renderer_fps: f64,
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    600
}
fn default_title() -> String {
    "3D Maze".to_string()
}
fn default_target_fps() -> f64 {
    60.0
}
fn default_fov() -> f64 {
    60.0
}
fn default_num_rays() -> usize {
    120
}
fn default_max_depth() -> f64 {
    15.0
}
fn default_step() -> f64 {
    0.02
}
fn default_speed() -> f64 {
    Tuning::default().speed
}
fn default_turn_speed() -> f64 {
    Tuning::default().turn_speed
}
fn default_radius() -> f64 {
    0.2
}
fn default_enabled() -> bool {
    true
}
fn default_low_fps() -> f64 {
    30.0
}
fn default_high_fps() -> f64 {
    55.0
}
fn default_reduced_rays() -> usize {
    60
}
fn default_reduced_depth() -> f64 {
    8.0
}
fn default_increased_rays() -> usize {
    150
}
fn default_increased_depth() -> f64 {
    20.0
}
fn default_fast_renderer_fps() -> f64 {
    35.0
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            target_fps: default_target_fps(),
        }
    }
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            num_rays: default_num_rays(),
            max_depth: default_max_depth(),
            step: default_step(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            turn_speed: default_turn_speed(),
            radius: default_radius(),
            smooth_movement: false,
        }
    }
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            low_fps: default_low_fps(),
            high_fps: default_high_fps(),
            reduced_rays: default_reduced_rays(),
            reduced_depth: default_reduced_depth(),
            increased_rays: default_increased_rays(),
            increased_depth: default_increased_depth(),
            fast_renderer_fps: default_fast_renderer_fps(),
        }
    }
}

impl GameConfig {
    /// Reads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width < 160 || self.window.height < 120 {
            return Err(GameError::Config(format!(
                "window must be at least 160x120, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !(self.window.target_fps.is_finite() && self.window.target_fps > 0.0) {
            return Err(GameError::Config(format!(
                "target_fps must be positive, got {}",
                self.window.target_fps
            )));
        }

        self.quality()?;
        let step = self.raycast.step;
        if !step.is_finite() || step <= 0.0 || step > MAX_STEP {
            return Err(GameError::InvalidStep(step));
        }

        let p = &self.player;
        if !(p.speed.is_finite() && p.speed >= 0.0 && p.turn_speed.is_finite() && p.turn_speed >= 0.0) {
            return Err(GameError::Config("player speeds must be non-negative".into()));
        }
        if !(p.radius.is_finite() && (0.0..0.5).contains(&p.radius)) {
            return Err(GameError::Config(format!(
                "player radius must be within [0, 0.5), got {}",
                p.radius
            )));
        }

        let fast = self.adaptation.fast_renderer_fps;
        if !(fast.is_finite() && fast >= 0.0) {
            return Err(GameError::Config(format!(
                "fast_renderer_fps must be non-negative, got {}",
                fast
            )));
        }

        self.policy().validate()
    }

    /// Initial quality parameters.
    pub fn quality(&self) -> Result<QualityParams> {
        QualityParams::new(self.raycast.fov, self.raycast.num_rays, self.raycast.max_depth)
    }

    pub fn policy(&self) -> AdaptivePolicy {
        let a = &self.adaptation;
        AdaptivePolicy {
            low_fps: a.low_fps,
            high_fps: a.high_fps,
            reduced_rays: a.reduced_rays,
            reduced_depth: a.reduced_depth,
            increased_rays: a.increased_rays,
            increased_depth: a.increased_depth,
        }
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            speed: self.player.speed,
            turn_speed: self.player.turn_speed,
        }
    }
}
