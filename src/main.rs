use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use maze_raycaster::canvas::Canvas;
use maze_raycaster::input::{menu_key, movement_keys};
use maze_raycaster::scaler::{ScaleLut, blit_nearest, build_scale_lut};
use maze_raycaster::{Game, GameConfig, Result};

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    game: Game,
    title: String,
    shown_title: String,

    // FPS sampling
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal framebuffer at the configured resolution
    fb: Vec<u32>,
    fb_w: usize,
    fb_h: usize,

    scale_lut: ScaleLut,

    // Input and pacing
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
    next_frame: Instant,
    frame_interval: Duration,
}

impl App {
    fn new(config: &GameConfig) -> Result<Self> {
        let game = Game::new(config)?;
        let (fb_w, fb_h) = (config.window.width, config.window.height);
        let now = Instant::now();

        Ok(Self {
            window: None,
            surface: None,
            game,
            title: config.window.title.clone(),
            shown_title: String::new(),

            frame_counter: 0,
            last_fps_print: now,

            fb: vec![0; fb_w * fb_h],
            fb_w,
            fb_h,

            scale_lut: ScaleLut::empty(),

            keys_down: HashSet::new(),
            last_tick: now,
            next_frame: now,
            frame_interval: Duration::from_secs_f64(1.0 / config.window.target_fps),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.fb_w as f64, self.fb_h as f64));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let surface = match softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()))
        {
            Ok(surface) => surface,
            Err(e) => {
                error!("Failed to create softbuffer surface: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_lut(size.width as usize, size.height as usize);
        info!(
            "Window {}x{}, internal framebuffer {}x{}",
            size.width, size.height, self.fb_w, self.fb_h
        );

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        self.last_tick = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::Focused(false) => {
                // held keys would otherwise stick while unfocused
                self.keys_down.clear();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    match state {
                        ElementState::Pressed => {
                            self.keys_down.insert(code);
                            if !repeat {
                                if let Some(key) = menu_key(code) {
                                    self.game.handle_key(key);
                                }
                            }
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&code);
                        }
                    }
                }
                if !self.game.is_running() {
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (dw, dh) = (size.width as usize, size.height as usize);
                let (Some(nw), Some(nh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return; // Minimized window, skip drawing
                };

                if let Err(e) = surface.resize(nw, nh) {
                    error!("Surface resize failed: {}", e);
                    return;
                }
                if self.scale_lut.dst_size() != (dw, dh) {
                    self.scale_lut = build_scale_lut(dw, dh, self.fb_w, self.fb_h);
                }

                self.game
                    .render(&mut Canvas::new(&mut self.fb, self.fb_w, self.fb_h));

                let mut buf = match surface.buffer_mut() {
                    Ok(buf) => buf,
                    Err(e) => {
                        error!("Surface buffer unavailable: {}", e);
                        return;
                    }
                };
                blit_nearest(&mut buf, dw, &self.fb, self.fb_w, &self.scale_lut);
                if let Err(e) = buf.present() {
                    warn!("Present failed: {}", e);
                }

                self.sample_fps();
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame = now + self.frame_interval;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }
}

impl App {
    fn tick(&mut self) {
        // Compute dt with cap to avoid huge jumps if the app was paused
        let now = Instant::now();
        let mut dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        if dt > Duration::from_millis(100) {
            dt = Duration::from_millis(100);
        }

        let keys = movement_keys(&self.keys_down);
        self.game.update(&keys, dt.as_secs_f64());
        self.refresh_title();
    }

    fn sample_fps(&mut self) {
        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f64();
        if elapsed >= 1.0 {
            let fps = self.frame_counter as f64 / elapsed;
            self.game.adapt_performance(fps);
            self.frame_counter = 0;
            self.last_fps_print = now;
            self.refresh_title();
        }
    }

    fn refresh_title(&mut self) {
        let title = format!("{} - {}", self.title, self.game.status_line());
        if title != self.shown_title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.shown_title = title;
        }
    }

    fn rebuild_lut(&mut self, dst_w: usize, dst_h: usize) {
        self.scale_lut = build_scale_lut(dst_w, dst_h, self.fb_w, self.fb_h);
    }
}

fn load_config() -> Result<GameConfig> {
    if let Some(arg) = std::env::args().nth(1) {
        let path = Path::new(&arg);
        info!("Loading configuration from {:?}", path);
        return GameConfig::load(path);
    }

    let default_path = Path::new("maze.toml");
    if default_path.exists() {
        info!("Loading configuration from maze.toml");
        GameConfig::load(default_path)
    } else {
        info!("Using default configuration");
        Ok(GameConfig::default())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("maze_raycaster=info")),
        )
        .init();

    let config = load_config()?;
    info!(
        "Raycast: fov {:.0}°, {} rays, depth {:.1}, step {}",
        config.raycast.fov, config.raycast.num_rays, config.raycast.max_depth, config.raycast.step
    );

    // about_to_wait switches to WaitUntil to pace frames at the target rate
    let event_loop = EventLoop::new()?;

    let mut app = App::new(&config)?;
    event_loop.run_app(&mut app)?;
    info!("Bye");
    Ok(())
}
