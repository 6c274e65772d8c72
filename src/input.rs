use strum_macros::Display;

use crate::geometry::{Point, Viewport};

/// One device-orientation reading, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    /// Front-to-back tilt
    pub beta: f64,
    /// Left-to-right tilt
    pub gamma: f64,
}

impl OrientationSample {
    pub fn new(beta: f64, gamma: f64) -> Self {
        Self { beta, gamma }
    }
}

/// Result of the host's one-time orientation access request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OrientationPermission {
    Granted,
    Denied,
    /// Platform does not gate orientation access
    Unsupported,
}

impl OrientationPermission {
    pub fn allows_events(&self) -> bool {
        !matches!(self, OrientationPermission::Denied)
    }
}

/// Turns an orientation reading into the point targets are checked against
pub trait AimMapper {
    fn aim_point(&self, sample: OrientationSample, viewport: Viewport) -> Point;
}

/// Aim stays at the viewport center; tilt only triggers a recheck
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedCenterAim;

impl AimMapper for FixedCenterAim {
    fn aim_point(&self, _sample: OrientationSample, viewport: Viewport) -> Point {
        viewport.center()
    }
}
