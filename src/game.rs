//! Game flow: menu, level lifecycle and the per-frame update.
//!
//! Holds no windowing state; the binary feeds it key presses, held-key
//! snapshots, frame times and FPS samples, then asks it to draw.

use std::fmt;

use tracing::{debug, error, info};

use crate::canvas::Canvas;
use crate::config::GameConfig;
use crate::error::Result;
use crate::input::MenuKey;
use crate::maze::{Difficulty, Maze};
use crate::movement::{Movement, MovementKeys, Tuning};
use crate::player::Player;
use crate::quality::{AdaptivePolicy, PerfChange, QualityHandle};
use crate::raycaster::{RayHit, Raycaster};
use crate::renderer::{self, MENU_OPTIONS, RendererKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
    Completed,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameState::Menu => "Menu",
            GameState::Playing => "Playing",
            GameState::Paused => "Paused",
            GameState::Completed => "Completed",
        };
        f.write_str(s)
    }
}

/// Everything that lives exactly as long as one level.
pub struct Level {
    pub difficulty: Difficulty,
    pub maze: Maze,
    pub player: Player,
    pub movement: Movement,
}

pub struct Game {
    state: GameState,
    selected: usize,
    level: Option<Level>,
    completed: Option<Difficulty>,
    quality: QualityHandle,
    raycaster: Raycaster,
    policy: AdaptivePolicy,
    adaptation_enabled: bool,
    renderer: RendererKind,
    fast_renderer_fps: f64,
    tuning: Tuning,
    radius: f64,
    smooth_movement: bool,
    fps: f64,
    running: bool,
}

impl Game {
    pub fn new(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        let quality = QualityHandle::new(config.quality()?);
        let raycaster = Raycaster::with_step(quality.clone(), config.raycast.step)?;

        Ok(Self {
            state: GameState::Menu,
            selected: 0,
            level: None,
            completed: None,
            quality,
            raycaster,
            policy: config.policy(),
            adaptation_enabled: config.adaptation.enabled,
            renderer: RendererKind::Quality,
            fast_renderer_fps: config.adaptation.fast_renderer_fps,
            tuning: config.tuning(),
            radius: config.player.radius,
            smooth_movement: config.player.smooth_movement,
            fps: 0.0,
            running: true,
        })
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    pub fn quality(&self) -> &QualityHandle {
        &self.quality
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.renderer
    }

    /// Builds the maze and player and enters Playing.
    pub fn start_level(&mut self, difficulty: Difficulty) -> Result<()> {
        let maze = Maze::new(difficulty)?;
        let player = Player::at_spawn(&maze);
        let movement = if self.smooth_movement {
            Movement::smooth()
        } else {
            Movement::for_difficulty(difficulty)
        };

        info!(
            "Starting {} level: {}x{} grid, spawn {}, {}",
            difficulty,
            maze.width(),
            maze.height(),
            player,
            movement
        );

        self.level = Some(Level {
            difficulty,
            maze,
            player,
            movement,
        });
        self.completed = None;
        self.set_state(GameState::Playing);
        Ok(())
    }

    fn end_level(&mut self) {
        self.level = None;
        self.set_state(GameState::Menu);
    }

    fn set_state(&mut self, state: GameState) {
        if self.state != state {
            info!("State {} -> {}", self.state, state);
            self.state = state;
        }
    }

    /// Reacts to a discrete key press according to the current state.
    pub fn handle_key(&mut self, key: MenuKey) {
        match (self.state, key) {
            (GameState::Menu, MenuKey::Up) => {
                self.selected = (self.selected + MENU_OPTIONS - 1) % MENU_OPTIONS;
            }
            (GameState::Menu, MenuKey::Down) => {
                self.selected = (self.selected + 1) % MENU_OPTIONS;
            }
            (GameState::Menu, MenuKey::Enter | MenuKey::Space) => self.confirm_menu(),

            (GameState::Playing, MenuKey::Escape) => self.end_level(),
            (GameState::Playing, MenuKey::Space) => self.set_state(GameState::Paused),

            (GameState::Paused, MenuKey::Space) => self.set_state(GameState::Playing),
            (GameState::Paused, MenuKey::Escape) => self.end_level(),

            (GameState::Completed, MenuKey::Space | MenuKey::Enter) => {
                self.set_state(GameState::Menu);
            }

            _ => {}
        }
    }

    fn confirm_menu(&mut self) {
        match Difficulty::ALL.get(self.selected) {
            Some(&difficulty) => {
                if let Err(e) = self.start_level(difficulty) {
                    error!("Failed to start {} level: {}", difficulty, e);
                    self.end_level();
                }
            }
            None => {
                info!("Quit selected");
                self.running = false;
            }
        }
    }

    /// One frame of simulation. Only does anything while Playing.
    pub fn update(&mut self, keys: &MovementKeys, dt: f64) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(level) = self.level.as_mut() else {
            return;
        };

        let delta = level
            .movement
            .step(keys, level.player.angle(), dt, &self.tuning);
        level
            .player
            .try_move(delta.dx, delta.dy, &level.maze, self.radius);
        level.player.turn(delta.dangle);

        if level.player.on_exit(&level.maze) {
            info!("{} level completed at {}", level.difficulty, level.player);
            self.completed = Some(level.difficulty);
            self.level = None;
            self.set_state(GameState::Completed);
        }
    }

    /// Records a measured frame rate and, while Playing, adapts quality and
    /// swaps the view renderer accordingly.
    pub fn adapt_performance(&mut self, fps: f64) -> PerfChange {
        self.fps = fps;
        if !self.adaptation_enabled || self.state != GameState::Playing {
            return PerfChange::Unchanged;
        }

        let change = self.quality.adapt(fps, &self.policy);
        let kind = RendererKind::after(change)
            .unwrap_or_else(|| RendererKind::for_fps(fps, self.fast_renderer_fps));
        if kind != self.renderer {
            info!("Renderer {:?} -> {:?} at {:.1} FPS", self.renderer, kind, fps);
            self.renderer = kind;
        }
        let q = self.raycaster.performance_info();
        debug!(
            "{:.1} FPS: {:?}, {} rays, depth {:.1}, {}",
            fps,
            change,
            q.num_rays(),
            q.max_depth(),
            self.renderer.renderer().name()
        );
        change
    }

    /// Current fan, empty when no level is loaded.
    pub fn cast_rays(&self) -> Vec<RayHit> {
        match &self.level {
            Some(level) => self.raycaster.cast_rays(&level.player, &level.maze),
            None => Vec::new(),
        }
    }

    /// Draws the current state into the framebuffer.
    pub fn render(&self, canvas: &mut Canvas<'_>) {
        match self.state {
            GameState::Menu => renderer::render_menu(canvas, self.selected),
            GameState::Playing | GameState::Paused => {
                let view = self.renderer.renderer();
                let rays = self.cast_rays();
                view.render_view(canvas, &rays);
                if let Some(level) = &self.level {
                    view.render_compass(canvas, level.player.angle());
                }
                if self.state == GameState::Paused {
                    renderer::render_pause_overlay(canvas);
                }
            }
            GameState::Completed => renderer::render_completion(canvas, self.completed),
        }
    }

    /// Short human-readable status, used for the window title and logs.
    pub fn status_line(&self) -> String {
        match self.state {
            GameState::Menu => {
                let option = Difficulty::ALL
                    .get(self.selected)
                    .map_or("quit", |d| d.name());
                format!("Menu: {}", option)
            }
            GameState::Playing | GameState::Paused => {
                let q = self.raycaster.performance_info();
                let movement = self.level.as_ref().map_or("-", |l| l.movement.name());
                format!(
                    "{} | FPS: {:.1} | Rays: {} | Renderer: {} | Movement: {}",
                    self.state,
                    self.fps,
                    q.num_rays(),
                    self.renderer.renderer().name(),
                    movement
                )
            }
            GameState::Completed => match self.completed {
                Some(d) => format!("Level completed! Difficulty: {}", d),
                None => "Level completed!".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(&GameConfig::default()).unwrap()
    }

    #[test]
    fn menu_selection_wraps() {
        let mut g = game();
        assert_eq!(g.state(), GameState::Menu);
        g.handle_key(MenuKey::Up);
        assert_eq!(g.selected(), 3);
        g.handle_key(MenuKey::Down);
        g.handle_key(MenuKey::Down);
        assert_eq!(g.selected(), 1);
        assert_eq!(g.status_line(), "Menu: medium");
    }

    #[test]
    fn quit_option_stops_running() {
        let mut g = game();
        g.handle_key(MenuKey::Up);
        g.handle_key(MenuKey::Enter);
        assert!(!g.is_running());
        assert_eq!(g.state(), GameState::Menu);
    }

    #[test]
    fn pause_and_escape_flow() {
        let mut g = game();
        g.handle_key(MenuKey::Space);
        assert_eq!(g.state(), GameState::Playing);
        assert!(g.level().is_some());

        g.handle_key(MenuKey::Space);
        assert_eq!(g.state(), GameState::Paused);
        let before = g.level().unwrap().player.clone();
        let forward = MovementKeys {
            forward: true,
            ..MovementKeys::default()
        };
        g.update(&forward, 0.1);
        assert_eq!(g.level().unwrap().player, before);

        g.handle_key(MenuKey::Space);
        assert_eq!(g.state(), GameState::Playing);
        g.handle_key(MenuKey::Escape);
        assert_eq!(g.state(), GameState::Menu);
        assert!(g.level().is_none());
    }

    #[test]
    fn moving_forward_advances_player() {
        let mut g = game();
        g.start_level(Difficulty::Easy).unwrap();
        let forward = MovementKeys {
            forward: true,
            ..MovementKeys::default()
        };
        g.update(&forward, 0.1);
        let p = &g.level().unwrap().player;
        // easy profile: 3.0 * 1.3 * 0.1 along +x
        assert!((p.x - 1.89).abs() < 1e-9);
        assert!((p.y - 1.5).abs() < 1e-9);
    }

    #[test]
    fn reaching_exit_completes_level() {
        let mut g = game();
        g.start_level(Difficulty::Easy).unwrap();
        // put the player next to the exit at (7, 8), facing it
        let level = g.level_mut().unwrap();
        level.player.set_position(7.5, 7.5);
        level.player.set_angle(90.0);
        let forward = MovementKeys {
            forward: true,
            ..MovementKeys::default()
        };
        for _ in 0..20 {
            g.update(&forward, 0.05);
        }
        assert_eq!(g.state(), GameState::Completed);
        assert!(g.level().is_none());
        assert_eq!(g.status_line(), "Level completed! Difficulty: easy");

        g.handle_key(MenuKey::Enter);
        assert_eq!(g.state(), GameState::Menu);
    }

    #[test]
    fn adaptation_only_while_playing() {
        let mut g = game();
        assert_eq!(g.adapt_performance(10.0), PerfChange::Unchanged);
        assert_eq!(g.quality().snapshot().num_rays(), 120);

        g.start_level(Difficulty::Medium).unwrap();
        assert_eq!(g.adapt_performance(10.0), PerfChange::Reduced);
        assert_eq!(g.renderer_kind(), RendererKind::Fast);
        assert_eq!(g.cast_rays().len(), 60);

        assert_eq!(g.adapt_performance(90.0), PerfChange::Increased);
        assert_eq!(g.renderer_kind(), RendererKind::Quality);
        assert_eq!(g.cast_rays().len(), 150);
        assert!(g.status_line().contains("Rays: 150"));
    }

    #[test]
    fn fast_renderer_between_policy_and_renderer_thresholds() {
        let mut g = game();
        g.start_level(Difficulty::Easy).unwrap();

        // above low_fps (30) so quality stays, but below fast_renderer_fps (35)
        assert_eq!(g.adapt_performance(32.0), PerfChange::Unchanged);
        assert_eq!(g.renderer_kind(), RendererKind::Fast);
        assert_eq!(g.cast_rays().len(), 120);
        assert!(g.status_line().contains("Renderer: FastRenderer"));

        assert_eq!(g.adapt_performance(45.0), PerfChange::Unchanged);
        assert_eq!(g.renderer_kind(), RendererKind::Quality);
    }

    #[test]
    fn renderer_threshold_comes_from_config() {
        let config = GameConfig::from_toml("[adaptation]\nfast_renderer_fps = 50.0\n").unwrap();
        let mut g = Game::new(&config).unwrap();
        g.start_level(Difficulty::Easy).unwrap();
        assert_eq!(g.adapt_performance(45.0), PerfChange::Unchanged);
        assert_eq!(g.renderer_kind(), RendererKind::Fast);
    }

    #[test]
    fn render_runs_for_every_state() {
        let mut g = game();
        let (w, h) = (800, 600);
        let mut buf = vec![0u32; w * h];
        g.render(&mut Canvas::new(&mut buf, w, h));
        g.start_level(Difficulty::Hard).unwrap();
        g.render(&mut Canvas::new(&mut buf, w, h));
        g.handle_key(MenuKey::Space);
        g.render(&mut Canvas::new(&mut buf, w, h));
        assert_eq!(g.state(), GameState::Paused);
    }
}
