//! Movement profiles: turn a key snapshot and frame time into a
//! `(dx, dy, dangle)` delta. Collision is applied by the caller.

use std::fmt;

use crate::maze::Difficulty;

/// Snapshot of the six movement intents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl MovementKeys {
    pub fn any(&self) -> bool {
        self.forward
            || self.backward
            || self.strafe_left
            || self.strafe_right
            || self.turn_left
            || self.turn_right
    }
}

/// Base speeds shared by every profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    /// Grid units per second
    pub speed: f64,
    /// Degrees per second
    pub turn_speed: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            speed: 3.0,
            turn_speed: 120.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementDelta {
    pub dx: f64,
    pub dy: f64,
    pub dangle: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementProfile {
    Easy,
    Normal,
    Hard,
}

impl MovementProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => MovementProfile::Easy,
            Difficulty::Medium => MovementProfile::Normal,
            Difficulty::Hard => MovementProfile::Hard,
        }
    }

    /// (speed multiplier, turn multiplier, inertia factor)
    pub fn coefficients(self) -> (f64, f64, f64) {
        match self {
            MovementProfile::Easy => (1.3, 1.2, 1.0),
            MovementProfile::Normal => (1.0, 1.0, 1.0),
            MovementProfile::Hard => (0.7, 0.8, 0.8),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MovementProfile::Easy => "Easy Movement (Fast)",
            MovementProfile::Normal => "Normal Movement",
            MovementProfile::Hard => "Hard Movement (Slow + Inertia)",
        }
    }
}

/// Direct movement for a profile. Pure: same inputs, same delta.
pub fn compute_movement(
    profile: MovementProfile,
    keys: &MovementKeys,
    angle: f64,
    dt: f64,
    tuning: &Tuning,
) -> MovementDelta {
    let (speed_mul, turn_mul, inertia) = profile.coefficients();
    let speed = tuning.speed * speed_mul * dt;
    let turn = tuning.turn_speed * turn_mul * dt;

    let rad = angle.to_radians();
    let (cos_a, sin_a) = (rad.cos(), rad.sin());
    let mut d = MovementDelta::default();

    if keys.forward {
        d.dx += speed * cos_a;
        d.dy += speed * sin_a;
    }
    if keys.backward {
        d.dx -= speed * cos_a;
        d.dy -= speed * sin_a;
    }
    if keys.turn_left {
        d.dangle -= turn;
    }
    if keys.turn_right {
        d.dangle += turn;
    }
    if keys.strafe_left {
        d.dx -= speed * sin_a;
        d.dy += speed * cos_a;
    }
    if keys.strafe_right {
        d.dx += speed * sin_a;
        d.dy -= speed * cos_a;
    }

    d.dx *= inertia;
    d.dy *= inertia;
    d.dangle *= inertia;
    d
}

/// Accelerating movement with friction. Keeps velocity between frames and
/// ignores strafing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothMovement {
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub angular_velocity: f64,
    pub acceleration: f64,
    pub friction: f64,
}

impl Default for SmoothMovement {
    fn default() -> Self {
        Self {
            velocity_x: 0.0,
            velocity_y: 0.0,
            angular_velocity: 0.0,
            acceleration: 8.0,
            friction: 0.85,
        }
    }
}

impl SmoothMovement {
    pub fn step(
        &mut self,
        keys: &MovementKeys,
        angle: f64,
        dt: f64,
        tuning: &Tuning,
    ) -> MovementDelta {
        let max_speed = tuning.speed * dt;
        let max_turn = tuning.turn_speed * dt;
        let rad = angle.to_radians();

        let (mut target_dx, mut target_dy, mut target_turn) = (0.0, 0.0, 0.0);
        if keys.forward {
            target_dx += max_speed * rad.cos();
            target_dy += max_speed * rad.sin();
        }
        if keys.backward {
            target_dx -= max_speed * rad.cos();
            target_dy -= max_speed * rad.sin();
        }
        if keys.turn_left {
            target_turn -= max_turn;
        }
        if keys.turn_right {
            target_turn += max_turn;
        }

        let blend = self.acceleration * dt;
        self.velocity_x += (target_dx - self.velocity_x) * blend;
        self.velocity_y += (target_dy - self.velocity_y) * blend;
        self.angular_velocity += (target_turn - self.angular_velocity) * blend;

        if !keys.forward && !keys.backward {
            self.velocity_x *= self.friction;
            self.velocity_y *= self.friction;
        }
        if !keys.turn_left && !keys.turn_right {
            self.angular_velocity *= self.friction;
        }

        MovementDelta {
            dx: self.velocity_x,
            dy: self.velocity_y,
            dangle: self.angular_velocity,
        }
    }
}

/// Active movement mode of a level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Movement {
    Direct(MovementProfile),
    Smooth(SmoothMovement),
}

impl Movement {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Movement::Direct(MovementProfile::for_difficulty(difficulty))
    }

    pub fn smooth() -> Self {
        Movement::Smooth(SmoothMovement::default())
    }

    pub fn step(
        &mut self,
        keys: &MovementKeys,
        angle: f64,
        dt: f64,
        tuning: &Tuning,
    ) -> MovementDelta {
        match self {
            Movement::Direct(profile) => compute_movement(*profile, keys, angle, dt, tuning),
            Movement::Smooth(state) => state.step(keys, angle, dt, tuning),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Movement::Direct(profile) => profile.name(),
            Movement::Smooth(_) => "Smooth Movement (Acceleration)",
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn keys() -> MovementKeys {
        MovementKeys::default()
    }

    #[test]
    fn idle_keys_produce_no_delta() {
        let d = compute_movement(MovementProfile::Normal, &keys(), 30.0, 0.016, &Tuning::default());
        assert_eq!(d, MovementDelta::default());
        assert!(!keys().any());
    }

    #[test]
    fn forward_follows_heading() {
        let k = MovementKeys {
            forward: true,
            ..keys()
        };
        let d = compute_movement(MovementProfile::Normal, &k, 90.0, 0.5, &Tuning::default());
        assert_abs_diff_eq!(d.dx, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.dy, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn strafe_directions() {
        let left = MovementKeys {
            strafe_left: true,
            ..keys()
        };
        let d = compute_movement(MovementProfile::Normal, &left, 0.0, 1.0, &Tuning::default());
        assert_abs_diff_eq!(d.dx, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.dy, 3.0, epsilon = 1e-12);

        let right = MovementKeys {
            strafe_right: true,
            ..keys()
        };
        let d = compute_movement(MovementProfile::Normal, &right, 0.0, 1.0, &Tuning::default());
        assert_abs_diff_eq!(d.dy, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn profiles_scale_speed_and_turn() {
        let k = MovementKeys {
            forward: true,
            turn_right: true,
            ..keys()
        };
        let t = Tuning::default();
        let easy = compute_movement(MovementProfile::Easy, &k, 0.0, 1.0, &t);
        let hard = compute_movement(MovementProfile::Hard, &k, 0.0, 1.0, &t);
        assert_abs_diff_eq!(easy.dx, 3.9, epsilon = 1e-9);
        assert_abs_diff_eq!(easy.dangle, 144.0, epsilon = 1e-9);
        // 0.7 speed then 0.8 inertia
        assert_abs_diff_eq!(hard.dx, 3.0 * 0.7 * 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(hard.dangle, 120.0 * 0.8 * 0.8, epsilon = 1e-9);

        let turn_left = MovementKeys {
            turn_left: true,
            ..keys()
        };
        let d = compute_movement(MovementProfile::Normal, &turn_left, 0.0, 0.5, &t);
        assert_abs_diff_eq!(d.dangle, -60.0, epsilon = 1e-9);
    }

    #[test]
    fn difficulty_maps_to_profile() {
        assert_eq!(
            MovementProfile::for_difficulty(Difficulty::Easy),
            MovementProfile::Easy
        );
        assert_eq!(
            MovementProfile::for_difficulty(Difficulty::Medium),
            MovementProfile::Normal
        );
        assert_eq!(
            Movement::for_difficulty(Difficulty::Hard).name(),
            "Hard Movement (Slow + Inertia)"
        );
    }

    #[test]
    fn smooth_accelerates_then_coasts() {
        let mut m = Movement::smooth();
        let t = Tuning::default();
        let fwd = MovementKeys {
            forward: true,
            ..keys()
        };

        let first = m.step(&fwd, 0.0, 0.1, &t);
        let second = m.step(&fwd, 0.0, 0.1, &t);
        assert!(first.dx > 0.0 && second.dx > first.dx);
        assert!(second.dx <= 0.3 + 1e-12);

        let coast = m.step(&keys(), 0.0, 0.1, &t);
        assert!(coast.dx > 0.0 && coast.dx < second.dx);

        let strafe = MovementKeys {
            strafe_left: true,
            ..keys()
        };
        let mut fresh = SmoothMovement::default();
        assert_eq!(fresh.step(&strafe, 0.0, 0.1, &t), MovementDelta::default());
    }
}
