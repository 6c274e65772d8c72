use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::{Point, Viewport};
use crate::target::{Target, TargetId};

/// Geometry parameters for newly spawned targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnConfig {
    pub base_size: f64,
    pub size_jitter: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            base_size: 80.0,
            size_jitter: 40.0,
        }
    }
}

/// Creates targets with randomized size, position and hue
#[derive(Debug)]
pub struct Spawner {
    config: SpawnConfig,
    rng: StdRng,
    next_id: u64,
}

impl Spawner {
    pub fn new(config: SpawnConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic spawner for reproducible runs and tests
    pub fn seeded(config: SpawnConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SpawnConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            next_id: 1,
        }
    }

    /// Build the next target. Size lands in [base, base + jitter) and the
    /// whole circle fits inside the viewport whenever the viewport is large
    /// enough to hold it.
    pub fn spawn(&mut self, viewport: Viewport) -> Target {
        let size = self.config.base_size + self.rng.gen::<f64>() * self.config.size_jitter;

        // A viewport smaller than the target pins it to the top-left corner
        let x = self.rng.gen::<f64>() * (viewport.width - size).max(0.0);
        let y = self.rng.gen::<f64>() * (viewport.height - size).max(0.0);
        let hue = self.rng.gen::<f64>() * 360.0;

        let id = TargetId(self.next_id);
        self.next_id += 1;

        Target::new(id, Point::new(x + size / 2.0, y + size / 2.0), size, hue)
    }
}
