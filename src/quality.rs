//! Raycast quality parameters and the adaptive policy that tunes them.
//!
//! The parameters live behind a [`QualityHandle`] so the frame driver (or a
//! separate monitoring task) can adjust them between frames while the
//! raycaster takes one consistent snapshot per cast.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::error::{GameError, Result};

/// Field of view, ray count and max depth governing one cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityParams {
    fov: f64,
    num_rays: usize,
    max_depth: f64,
}

impl QualityParams {
    pub fn new(fov: f64, num_rays: usize, max_depth: f64) -> Result<Self> {
        validate_fov(fov)?;
        validate_num_rays(num_rays)?;
        validate_max_depth(max_depth)?;
        Ok(Self {
            fov,
            num_rays,
            max_depth,
        })
    }

    /// Degrees
    #[inline]
    pub fn fov(&self) -> f64 {
        self.fov
    }

    #[inline]
    pub fn num_rays(&self) -> usize {
        self.num_rays
    }

    #[inline]
    pub fn max_depth(&self) -> f64 {
        self.max_depth
    }

    #[inline]
    pub fn half_fov(&self) -> f64 {
        self.fov / 2.0
    }

    /// Angular step between neighbouring rays, in degrees.
    #[inline]
    pub fn delta_angle(&self) -> f64 {
        self.fov / self.num_rays as f64
    }
}

fn validate_fov(fov: f64) -> Result<()> {
    // wider fans put edge rays behind the player and the cosine turns negative
    if fov.is_finite() && (0.0..180.0).contains(&fov) {
        Ok(())
    } else {
        Err(GameError::InvalidFov(fov))
    }
}

fn validate_num_rays(num_rays: usize) -> Result<()> {
    if num_rays == 0 {
        return Err(GameError::InvalidRayCount);
    }
    Ok(())
}

fn validate_max_depth(max_depth: f64) -> Result<()> {
    if max_depth.is_finite() && max_depth > 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidMaxDepth(max_depth))
    }
}

/// What an adaptation step did to the parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerfChange {
    Reduced,
    Increased,
    Unchanged,
}

/// Frame-rate thresholds and the parameter sets to switch to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdaptivePolicy {
    pub low_fps: f64,
    pub high_fps: f64,
    pub reduced_rays: usize,
    pub reduced_depth: f64,
    pub increased_rays: usize,
    pub increased_depth: f64,
}

impl Default for AdaptivePolicy {
    fn default() -> Self {
        Self {
            low_fps: 30.0,
            high_fps: 55.0,
            reduced_rays: 60,
            reduced_depth: 8.0,
            increased_rays: 150,
            increased_depth: 20.0,
        }
    }
}

impl AdaptivePolicy {
    pub fn validate(&self) -> Result<()> {
        validate_num_rays(self.reduced_rays)?;
        validate_num_rays(self.increased_rays)?;
        validate_max_depth(self.reduced_depth)?;
        validate_max_depth(self.increased_depth)?;
        if self.low_fps.is_nan() || self.high_fps.is_nan() || self.low_fps > self.high_fps {
            return Err(GameError::Config(format!(
                "adaptation low_fps ({}) must not exceed high_fps ({})",
                self.low_fps, self.high_fps
            )));
        }
        Ok(())
    }

    pub fn classify(&self, fps: f64) -> PerfChange {
        if fps < self.low_fps {
            PerfChange::Reduced
        } else if fps > self.high_fps {
            PerfChange::Increased
        } else {
            PerfChange::Unchanged
        }
    }
}

/// Shared, cloneable handle to the live quality parameters.
#[derive(Clone, Debug)]
pub struct QualityHandle {
    inner: Arc<RwLock<QualityParams>>,
}

impl QualityHandle {
    pub fn new(params: QualityParams) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    /// Consistent copy of the current parameters.
    pub fn snapshot(&self) -> QualityParams {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn replace(&self, params: QualityParams) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = params;
    }

    pub fn set_num_rays(&self, num_rays: usize) -> Result<()> {
        validate_num_rays(num_rays)?;
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .num_rays = num_rays;
        Ok(())
    }

    pub fn set_max_depth(&self, max_depth: f64) -> Result<()> {
        validate_max_depth(max_depth)?;
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .max_depth = max_depth;
        Ok(())
    }

    /// Applies the policy for a measured frame rate. Field of view is never
    /// touched.
    pub fn adapt(&self, fps: f64, policy: &AdaptivePolicy) -> PerfChange {
        let change = policy.classify(fps);
        let (rays, depth) = match change {
            PerfChange::Reduced => (policy.reduced_rays, policy.reduced_depth),
            PerfChange::Increased => (policy.increased_rays, policy.increased_depth),
            PerfChange::Unchanged => return change,
        };

        let mut params = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if params.num_rays != rays || params.max_depth != depth {
            info!(
                "Quality {:?} at {:.1} FPS: rays {} -> {}, depth {:.1} -> {:.1}",
                change, fps, params.num_rays, rays, params.max_depth, depth
            );
            params.num_rays = rays.max(1);
            params.max_depth = depth;
        }
        change
    }
}
