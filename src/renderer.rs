use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::canvas::{Canvas, pack_rgb};
use crate::maze::Difficulty;
use crate::movement::MovementProfile;
use crate::quality::PerfChange;
use crate::raycaster::RayHit;

const CEILING: (u8, u8, u8) = (80, 80, 120);
const FLOOR: (u8, u8, u8) = (40, 40, 40);
const DARK_GRAY: (u8, u8, u8) = (64, 64, 64);
const WHITE: (u8, u8, u8) = (255, 255, 255);
const GRAY: (u8, u8, u8) = (100, 100, 100);
const RED: (u8, u8, u8) = (255, 0, 0);
const GREEN: (u8, u8, u8) = (0, 255, 0);
const YELLOW: (u8, u8, u8) = (255, 255, 0);
const BLACK: (u8, u8, u8) = (0, 0, 0);

#[inline]
fn rgb(c: (u8, u8, u8)) -> u32 {
    pack_rgb(c.0, c.1, c.2)
}

/// Which view renderer is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererKind {
    Fast,
    Quality,
}

impl RendererKind {
    /// Fast below `threshold` FPS, quality otherwise.
    pub fn for_fps(fps: f64, threshold: f64) -> Self {
        if fps < threshold {
            RendererKind::Fast
        } else {
            RendererKind::Quality
        }
    }

    /// Renderer to switch to after a quality adaptation, if any.
    pub fn after(change: PerfChange) -> Option<Self> {
        match change {
            PerfChange::Reduced => Some(RendererKind::Fast),
            PerfChange::Increased => Some(RendererKind::Quality),
            PerfChange::Unchanged => None,
        }
    }

    pub fn renderer(self) -> &'static dyn ViewRenderer {
        match self {
            RendererKind::Fast => &FastRenderer,
            RendererKind::Quality => &QualityRenderer,
        }
    }
}

/// Paints a ray fan and the compass overlay.
pub trait ViewRenderer: Sync {
    fn name(&self) -> &'static str;
    fn render_view(&self, canvas: &mut Canvas<'_>, rays: &[RayHit]);
    fn render_compass(&self, canvas: &mut Canvas<'_>, angle: f64);
}

/// One wall column span in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Strip {
    x0: usize,
    x1: usize,
    top: usize,
    bottom: usize,
    color: u32,
}

/// Vertical extent of a wall at `distance`, centred on the horizon.
pub fn wall_span(distance: f64, height: usize) -> Option<(usize, usize)> {
    if distance.is_nan() || distance <= 0.0 || height == 0 {
        return None;
    }
    let wall_h = ((height as f64 / distance) as usize).clamp(1, height);
    let top = (height - wall_h) / 2;
    Some((top, top + wall_h))
}

fn build_strips(
    rays: &[RayHit],
    width: usize,
    height: usize,
    min_strip: usize,
    shade: impl Fn(&RayHit) -> u32,
) -> Vec<Strip> {
    if rays.is_empty() || width == 0 {
        return Vec::new();
    }
    let strip_w = width as f64 / rays.len() as f64;
    rays.iter()
        .enumerate()
        .filter(|(_, ray)| ray.hit)
        .filter_map(|(i, ray)| {
            let (top, bottom) = wall_span(ray.distance, height)?;
            let x0 = (i as f64 * strip_w) as usize;
            let x1 = (x0 + (strip_w as usize).max(min_strip)).min(width);
            Some(Strip {
                x0,
                x1,
                top,
                bottom,
                color: shade(ray),
            })
        })
        .collect()
}

/// Fills rows in parallel: background by `row_color`, then any strip
/// covering that row.
fn paint(canvas: &mut Canvas<'_>, strips: &[Strip], row_color: impl Fn(usize) -> u32 + Sync) {
    let width = canvas.width();
    canvas
        .pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            row.fill(row_color(y));
            for s in strips {
                if y >= s.top && y < s.bottom {
                    row[s.x0..s.x1].fill(s.color);
                }
            }
        });
}

fn compass_arrow(center: (i32, i32), len: i32, angle: f64) -> (i32, i32) {
    let rad = angle.to_radians();
    (
        center.0 + (len as f64 * rad.sin()) as i32,
        center.1 - (len as f64 * rad.cos()) as i32,
    )
}

/// Flat sky/floor, coarse shading, strips at least 2 px wide.
pub struct FastRenderer;

impl ViewRenderer for FastRenderer {
    fn name(&self) -> &'static str {
        "FastRenderer"
    }

    fn render_view(&self, canvas: &mut Canvas<'_>, rays: &[RayHit]) {
        let (w, h) = (canvas.width(), canvas.height());
        let strips = build_strips(rays, w, h, 2, |ray| {
            let b = (255 - (ray.distance * 25.0) as i32).max(30);
            pack_rgb(b as u8, (b / 2) as u8, (b / 4) as u8)
        });
        let (sky, floor) = (rgb(CEILING), rgb(FLOOR));
        let mid = h / 2;
        paint(canvas, &strips, |y| if y < mid { sky } else { floor });
    }

    fn render_compass(&self, canvas: &mut Canvas<'_>, angle: f64) {
        let center = (canvas.width() as i32 - 60, 60);
        let radius = 25;
        canvas.fill_circle(center, radius, rgb(DARK_GRAY));
        canvas.ring(center, radius, 2, rgb(WHITE));
        canvas.line(center, compass_arrow(center, radius - 8, angle), 3, rgb(RED));
    }
}

/// Gradient sky/floor, per-hit colour variation, detailed compass.
pub struct QualityRenderer;

impl ViewRenderer for QualityRenderer {
    fn name(&self) -> &'static str {
        "QualityRenderer"
    }

    fn render_view(&self, canvas: &mut Canvas<'_>, rays: &[RayHit]) {
        let (w, h) = (canvas.width(), canvas.height());
        let strips = build_strips(rays, w, h, 1, |ray| {
            let b = (255 - (ray.distance * 12.0) as i32).max(50);
            let v = ((ray.wall_x + ray.wall_y) * 30.0) as i32 % 50;
            let mut r = (b + v).min(255);
            let mut g = (b / 2 + v / 2).min(255);
            let mut bl = (b / 4 + v / 4).min(255);
            if ray.hit_vertical {
                // east/west faces slightly darker
                r = r * 7 / 8;
                g = g * 7 / 8;
                bl = bl * 7 / 8;
            }
            pack_rgb(r as u8, g as u8, bl as u8)
        });

        let mid = (h / 2).max(1);
        let floor = FLOOR;
        paint(canvas, &strips, |y| {
            if y < mid {
                let progress = y as f64 / mid as f64;
                pack_rgb(30, 50, (80.0 + progress * 40.0) as u8)
            } else {
                let shade = ((y - mid) as f64 * 0.1) as u32;
                let ch = |c: u8| (c as u32 + shade).min(255) as u8;
                pack_rgb(ch(floor.0), ch(floor.1), ch(floor.2))
            }
        });
    }

    fn render_compass(&self, canvas: &mut Canvas<'_>, angle: f64) {
        let center = (canvas.width() as i32 - 80, 80);
        let radius = 40;
        canvas.fill_circle(center, radius, rgb(DARK_GRAY));
        canvas.ring(center, radius, 2, rgb(WHITE));

        for cardinal in [0.0, 90.0, 180.0, 270.0] {
            let tick = compass_arrow(center, radius - 15, cardinal);
            let size = if cardinal == 0.0 { 4 } else { 2 };
            canvas.fill_circle(tick, size, rgb(WHITE));
        }

        let tip = compass_arrow(center, radius - 10, angle);
        canvas.line(center, tip, 3, rgb(RED));
        canvas.fill_circle(tip, 3, rgb(RED));
    }
}

pub const MENU_OPTIONS: usize = 4;

/// Main menu: three difficulty bars plus quit, selection highlighted.
pub fn render_menu(canvas: &mut Canvas<'_>, selected: usize) {
    canvas.clear(rgb(BLACK));
    let cx = canvas.width() as i32 / 2;

    canvas.fill_rect(cx - 150, 146, 300, 8, rgb(WHITE));

    for i in 0..MENU_OPTIONS {
        let y = 232 + i as i32 * 60;
        let color = if i == selected { rgb(YELLOW) } else { rgb(WHITE) };
        canvas.fill_rect(cx - 120, y, 240, 36, color);

        if let Some(&difficulty) = Difficulty::ALL.get(i) {
            // pip count marks the difficulty
            for p in 0..=i as i32 {
                canvas.fill_circle((cx - 20 * i as i32 + 40 * p, y + 18), 7, rgb(BLACK));
            }
            let info_color = if i == selected { rgb(YELLOW) } else { rgb(GRAY) };
            let speed = MovementProfile::for_difficulty(difficulty).coefficients().0;
            let bar = (160.0 * speed) as i32;
            canvas.fill_rect(cx - bar / 2, 470 + i as i32 * 20, bar, 8, info_color);
        } else {
            canvas.line((cx - 10, y + 8), (cx + 10, y + 28), 3, rgb(RED));
            canvas.line((cx + 10, y + 8), (cx - 10, y + 28), 3, rgb(RED));
        }
    }
}

/// Darkens the current view and draws a pause glyph.
pub fn render_pause_overlay(canvas: &mut Canvas<'_>) {
    canvas.darken();
    let (cx, cy) = (canvas.width() as i32 / 2, canvas.height() as i32 / 2);
    canvas.fill_rect(cx - 30, cy - 60, 20, 80, rgb(WHITE));
    canvas.fill_rect(cx + 10, cy - 60, 20, 80, rgb(WHITE));
}

/// Completion screen: green check mark and the finished difficulty.
pub fn render_completion(canvas: &mut Canvas<'_>, difficulty: Option<Difficulty>) {
    canvas.clear(rgb(BLACK));
    let (cx, cy) = (canvas.width() as i32 / 2, canvas.height() as i32 / 2);
    canvas.line((cx - 50, cy - 50), (cx - 15, cy - 15), 9, rgb(GREEN));
    canvas.line((cx - 15, cy - 15), (cx + 55, cy - 85), 9, rgb(GREEN));

    if let Some(d) = difficulty {
        let level = Difficulty::ALL.iter().position(|&x| x == d).unwrap_or(0) as i32;
        for p in 0..=level {
            canvas.fill_circle((cx - 20 * level + 40 * p, cy + 30), 8, rgb(WHITE));
        }
    }
}
