/// run configuration for the evolution core.
/// every field has a default, so hosts only spell out what they change.
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dna::ShapeSpace;
use crate::error::{EvolveError, EvolveResult};
use crate::fitness::DistanceMetric;
use crate::mutation_config::MutateConfig;

/// contrast-seeded initialization knobs
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastSettings {
    /// half-width of the sliding std-dev window (window is 2r+1 pixels wide)
    pub window_radius: u32,
    /// minimum luma std-dev for a pixel to count as high-contrast
    pub threshold: f32,
}

impl Default for ContrastSettings {
    fn default() -> Self {
        Self { window_radius: 2, threshold: 24.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// individuals per generation, constant across the run
    pub population_size: usize,
    /// planned run length; drives the coarse → fine schedules (the host decides when to stop)
    pub generations: u64,
    /// tournament size for parent selection (larger = more selection pressure)
    pub tournament_size: usize,
    /// fraction of the population kept by `survive`, in (0, 1]
    pub survive_fraction: f64,
    pub min_shapes: usize,
    pub max_shapes: usize,
    /// upper bound of the initial shape count (start simple, let mutation grow it)
    pub seed_shapes: usize,
    /// canvas is canvas_size × canvas_size pixels
    pub canvas_size: u32,
    /// best survivors exempt from mutation (0 = every individual mutates)
    pub elite_count: usize,
    /// place initial shapes on high-contrast target regions
    pub seeded_init: bool,
    pub contrast: ContrastSettings,
    pub metric: DistanceMetric,
    /// fixed seed for reproducible runs; `None` draws one from the OS
    pub seed: Option<u64>,
    pub mutation: MutateConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 1000,
            tournament_size: 3,
            survive_fraction: 0.5,
            min_shapes: 2,
            max_shapes: 100,
            seed_shapes: 2,
            canvas_size: 200,
            elite_count: 0,
            seeded_init: false,
            contrast: ContrastSettings::default(),
            metric: DistanceMetric::default(),
            seed: None,
            mutation: MutateConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// parse from JSON; missing fields take their defaults. does not validate.
    pub fn from_json(json: &str) -> EvolveResult<Self> {
        serde_json::from_str(json).map_err(|e| EvolveError::ConfigParse(e.to_string()))
    }

    /// read and parse a JSON file. does not validate.
    pub fn load(path: impl AsRef<Path>) -> EvolveResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| EvolveError::ConfigIo(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> EvolveResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EvolveError::ConfigParse(e.to_string()))
    }

    /// survivors kept by `survive(fraction)`: floor, with at least one
    #[inline]
    pub fn survivors_for(&self, fraction: f64) -> usize {
        ((fraction * self.population_size as f64).floor() as usize).max(1)
    }

    /// sampling and clamping limits for individual shapes
    pub fn shape_space(&self) -> ShapeSpace {
        ShapeSpace {
            canvas_size: self.canvas_size,
            min_radius: self.mutation.min_radius,
            max_radius: self.mutation.max_radius,
            alpha_min: self.mutation.alpha_min,
            alpha_max: self.mutation.alpha_max,
            p_circle: self.mutation.p_circle,
        }
    }

    /// reject anything the core can't run with. nothing is clamped here.
    pub fn validate(&self) -> EvolveResult<()> {
        let invalid = |msg: String| Err(EvolveError::InvalidConfiguration(msg));

        if self.population_size == 0 {
            return invalid("population_size must be positive".to_string());
        }
        if self.canvas_size == 0 {
            return invalid("canvas_size must be positive".to_string());
        }
        if !(self.survive_fraction > 0.0 && self.survive_fraction <= 1.0) {
            return invalid(format!("survive_fraction must be in (0, 1], got {}", self.survive_fraction));
        }
        if self.min_shapes > self.max_shapes {
            return invalid(format!(
                "min_shapes ({}) must not exceed max_shapes ({})",
                self.min_shapes, self.max_shapes
            ));
        }
        if self.max_shapes == 0 {
            return invalid("max_shapes must be positive".to_string());
        }
        if self.seed_shapes < self.min_shapes || self.seed_shapes > self.max_shapes {
            return invalid(format!(
                "seed_shapes ({}) must lie in [min_shapes, max_shapes] = [{}, {}]",
                self.seed_shapes, self.min_shapes, self.max_shapes
            ));
        }
        if self.tournament_size == 0 {
            return invalid("tournament_size must be at least 1".to_string());
        }

        // the survivor pool must be able to host a tournament, and breeding
        // needs two parents whenever survivors don't already fill the population
        let survivors = self.survivors_for(self.survive_fraction);
        if self.tournament_size > survivors {
            return invalid(format!(
                "tournament_size ({}) exceeds the {survivors} survivors of a population of {} at fraction {}",
                self.tournament_size, self.population_size, self.survive_fraction
            ));
        }
        if survivors < 2 && survivors < self.population_size {
            return invalid(format!(
                "survive_fraction {} keeps {survivors} survivor(s); breeding needs at least 2",
                self.survive_fraction
            ));
        }
        if self.elite_count > survivors {
            return invalid(format!(
                "elite_count ({}) exceeds the {survivors} survivors",
                self.elite_count
            ));
        }
        if !self.contrast.threshold.is_finite() || self.contrast.threshold < 0.0 {
            return invalid(format!("contrast threshold must be non-negative, got {}", self.contrast.threshold));
        }

        self.mutation.validate()
    }
}
