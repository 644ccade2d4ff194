//! Fixed-step ray marching through the maze grid.
//!
//! One cast produces a fan of [`RayHit`]s, one per screen column, spanning
//! `[angle - fov/2, angle + fov/2)` with uniform spacing.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::{GameError, Result};
use crate::maze::{Maze, cell_index};
use crate::player::Player;
use crate::quality::{QualityHandle, QualityParams};

/// Default march step in grid units.
pub const DEFAULT_STEP: f64 = 0.02;

/// Largest accepted march step; coarser steps tunnel through thin walls.
pub const MAX_STEP: f64 = 0.1;

/// Geometry of one ray. Index in the returned fan is the screen column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Fisheye-corrected distance, or `max_depth` when nothing was hit.
    pub distance: f64,
    /// Absolute ray angle in degrees.
    pub angle: f64,
    pub wall_x: f64,
    pub wall_y: f64,
    /// Offset along the hit face, in [0, 1).
    pub texture_u: f64,
    /// Crossed a vertical grid line (east/west facing wall).
    pub hit_vertical: bool,
    /// False for the open-sky sentinel.
    pub hit: bool,
}

impl RayHit {
    /// Open-sky sentinel: no wall within `max_depth`.
    pub fn open_sky(angle: f64, max_depth: f64) -> Self {
        Self {
            distance: max_depth,
            angle,
            wall_x: 0.0,
            wall_y: 0.0,
            texture_u: 0.0,
            hit_vertical: false,
            hit: false,
        }
    }
}

pub struct Raycaster {
    quality: QualityHandle,
    step: f64,
}

impl Raycaster {
    pub fn new(quality: QualityHandle) -> Self {
        Self {
            quality,
            step: DEFAULT_STEP,
        }
    }

    pub fn with_step(quality: QualityHandle, step: f64) -> Result<Self> {
        if !step.is_finite() || step <= 0.0 || step > MAX_STEP {
            return Err(GameError::InvalidStep(step));
        }
        Ok(Self { quality, step })
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn quality(&self) -> &QualityHandle {
        &self.quality
    }

    /// Parameters the next cast would use.
    pub fn performance_info(&self) -> QualityParams {
        self.quality.snapshot()
    }

    /// Casts the full fan from the player's viewpoint.
    ///
    /// Parameters are snapshotted once, so the fan always has exactly the
    /// `num_rays` seen at the start, with one angular step throughout.
    pub fn cast_rays(&self, player: &Player, maze: &Maze) -> Vec<RayHit> {
        let params = self.quality.snapshot();
        let num_rays = params.num_rays();
        if num_rays == 0 {
            return Vec::new();
        }

        let view = player.angle();
        let start_angle = view - params.half_fov();
        let delta = params.delta_angle();
        let origin = player.position();
        let max_depth = params.max_depth();

        // indexed collect keeps column order
        (0..num_rays)
            .into_par_iter()
            .map(|i| {
                let angle = start_angle + i as f64 * delta;
                let mut ray = self.cast_single_ray(origin, angle, max_depth, maze);
                if ray.hit {
                    ray.distance *= (angle - view).to_radians().cos();
                }
                ray
            })
            .collect()
    }

    /// Marches one ray; the returned distance is not fisheye-corrected.
    pub fn cast_single_ray(
        &self,
        origin: (f64, f64),
        angle: f64,
        max_depth: f64,
        maze: &Maze,
    ) -> RayHit {
        if max_depth.is_nan() || max_depth <= 0.0 {
            return RayHit::open_sky(angle, max_depth.max(0.0));
        }

        let rad = angle.to_radians();
        let (dx, dy) = (rad.cos(), rad.sin());
        let (ox, oy) = origin;
        let steps = (max_depth / self.step) as usize;

        for i in 0..steps {
            let distance = i as f64 * self.step;
            let x = ox + dx * distance;
            let y = oy + dy * distance;

            if !maze.is_wall(cell_index(x), cell_index(y)) {
                continue;
            }

            let prev_x = ox + dx * (distance - self.step);
            // crossing both grid lines in one step still counts as vertical
            let hit_vertical = cell_index(prev_x) != cell_index(x);
            let texture_u = if hit_vertical {
                fractional(y)
            } else {
                fractional(x)
            };

            return RayHit {
                distance,
                angle,
                wall_x: x,
                wall_y: y,
                texture_u,
                hit_vertical,
                hit: true,
            };
        }

        RayHit::open_sky(angle, max_depth)
    }
}

#[inline]
fn fractional(v: f64) -> f64 {
    let f = v.rem_euclid(1.0);
    if f >= 1.0 { 0.0 } else { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn room() -> Maze {
        Maze::from_rows(
            vec![
                vec![1, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 1],
                vec![1, 0, 9, 0, 1],
                vec![1, 1, 1, 1, 1],
            ],
            (1.5, 1.5),
        )
        .unwrap()
    }

    fn caster(fov: f64, rays: usize, depth: f64) -> Raycaster {
        Raycaster::new(QualityHandle::new(
            QualityParams::new(fov, rays, depth).unwrap(),
        ))
    }

    #[test]
    fn fan_has_exact_count_and_uniform_spacing() {
        let maze = room();
        let player = Player::new(1.5, 1.5, 45.0);
        let rc = caster(60.0, 120, 15.0);

        let rays = rc.cast_rays(&player, &maze);
        assert_eq!(rays.len(), 120);
        assert_relative_eq!(rays[0].angle, 15.0);
        for pair in rays.windows(2) {
            assert_abs_diff_eq!(pair[1].angle - pair[0].angle, 0.5, epsilon = 1e-9);
        }
        assert!(rays.last().unwrap().angle < 75.0);
    }

    #[test]
    fn center_ray_is_not_corrected() {
        let maze = room();
        let player = Player::new(1.5, 1.5, 0.0);
        let rc = caster(60.0, 2, 15.0);

        let rays = rc.cast_rays(&player, &maze);
        // second ray sits exactly on the view angle
        assert_relative_eq!(rays[1].angle, 0.0);
        let raw = rc.cast_single_ray((1.5, 1.5), 0.0, 15.0, &maze);
        assert_relative_eq!(rays[1].distance, raw.distance);
    }

    #[test]
    fn off_axis_rays_are_shortened_by_cosine() {
        let maze = room();
        let player = Player::new(2.5, 1.5, 0.0);
        let rc = caster(60.0, 4, 15.0);

        let rays = rc.cast_rays(&player, &maze);
        let raw = rc.cast_single_ray((2.5, 1.5), rays[0].angle, 15.0, &maze);
        assert_relative_eq!(
            rays[0].distance,
            raw.distance * (rays[0].angle).to_radians().cos(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn east_wall_hit_is_vertical() {
        let maze = room();
        let rc = caster(0.0, 1, 15.0);
        let ray = rc.cast_single_ray((1.5, 1.5), 0.0, 15.0, &maze);

        assert!(ray.hit && ray.hit_vertical);
        assert_abs_diff_eq!(ray.distance, 2.5, epsilon = 0.021);
        assert_abs_diff_eq!(ray.texture_u, 0.5, epsilon = 1e-9);
        assert!(ray.wall_x >= 4.0);
    }

    #[test]
    fn north_wall_hit_is_horizontal() {
        let maze = room();
        let rc = caster(0.0, 1, 15.0);
        let ray = rc.cast_single_ray((2.25, 1.5), 270.0, 15.0, &maze);

        assert!(ray.hit && !ray.hit_vertical);
        assert_abs_diff_eq!(ray.distance, 0.5, epsilon = 0.021);
        assert_abs_diff_eq!(ray.texture_u, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn open_sky_sentinel_when_depth_runs_out() {
        let maze = room();
        let rc = caster(0.0, 1, 1.0);
        // east wall is 2.5 away, beyond max depth
        let ray = rc.cast_single_ray((1.5, 1.5), 0.0, 1.0, &maze);
        assert!(!ray.hit);
        assert_relative_eq!(ray.distance, 1.0);
        assert!(!ray.hit_vertical);
        assert_eq!(ray.texture_u, 0.0);
        assert_eq!((ray.wall_x, ray.wall_y), (0.0, 0.0));

        let fan = rc.cast_rays(&Player::new(1.5, 1.5, 0.0), &maze);
        assert_eq!(fan.len(), 1);
        assert_relative_eq!(fan[0].distance, 1.0);
    }

    #[test]
    fn non_positive_depth_degenerates_to_sentinel() {
        let maze = room();
        let rc = caster(0.0, 1, 1.0);
        let ray = rc.cast_single_ray((1.5, 1.5), 0.0, -3.0, &maze);
        assert!(!ray.hit);
        assert_eq!(ray.distance, 0.0);
    }

    #[test]
    fn picks_up_parameter_changes_between_casts() {
        let maze = room();
        let player = Player::new(1.5, 1.5, 0.0);
        let rc = caster(60.0, 10, 15.0);
        assert_eq!(rc.cast_rays(&player, &maze).len(), 10);

        rc.quality().set_num_rays(7).unwrap();
        let rays = rc.cast_rays(&player, &maze);
        assert_eq!(rays.len(), 7);
        assert_abs_diff_eq!(rays[1].angle - rays[0].angle, 60.0 / 7.0, epsilon = 1e-9);
    }

    #[test]
    fn step_validation() {
        let q = QualityHandle::new(QualityParams::new(60.0, 10, 15.0).unwrap());
        assert!(Raycaster::with_step(q.clone(), 0.01).is_ok());
        assert!(matches!(
            Raycaster::with_step(q.clone(), 0.0),
            Err(GameError::InvalidStep(_))
        ));
        assert!(Raycaster::with_step(q.clone(), 0.5).is_err());
        assert!(Raycaster::with_step(q, f64::NAN).is_err());
    }

    #[test]
    fn corner_crossing_is_classified_by_x_only() {
        // Known approximation: a step that changes both cells is reported as a
        // vertical hit even when the ray really entered through a horizontal face.
        let maze = Maze::from_rows(
            vec![vec![1, 1, 1], vec![1, 0, 1], vec![1, 1, 1]],
            (1.5, 1.5),
        )
        .unwrap();
        let rc = Raycaster::with_step(
            QualityHandle::new(QualityParams::new(0.0, 1, 5.0).unwrap()),
            0.1,
        )
        .unwrap();
        let ray = rc.cast_single_ray((1.5, 1.5), 45.0, 5.0, &maze);
        assert!(ray.hit);
        assert!(ray.hit_vertical);
    }
}
