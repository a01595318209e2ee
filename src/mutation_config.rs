use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvolveError, EvolveResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutateConfig {
    // mutation kind weights, exactly one kind per call
    pub p_geometry: f64,   // jitter one shape's coordinates / radius
    pub p_color: f64,      // jitter one shape's RGBA
    pub p_structural: f64, // add or remove a shape
    // remainder = reorder (shuffle z-order)

    // two-phase step sizes: coarse in the first half of the run, fine after
    pub coarse_sigma: f64,
    pub fine_sigma: f64,
    pub alpha_sigma_scale: f64, // alpha noise = sigma * scale

    // per-field probability of jitter, derived from evaluations per individual
    pub rate_early: f64,
    pub rate_late: f64,

    // structural bias: chance that a structural mutation adds rather than removes
    pub p_add_early: f64,
    pub p_add_late: f64,

    // chance that a freshly sampled shape is a circle instead of a triangle
    pub p_circle: f64,

    // translucency band (out of 255)
    pub alpha_min: u8,
    pub alpha_max: u8,

    // circle radius band (pixels)
    pub min_radius: i32,
    pub max_radius: i32,
}

impl Default for MutateConfig {
    fn default() -> Self {
        Self {
            p_geometry: 0.50,
            p_color: 0.40,
            p_structural: 0.05,
            // remainder: 5% reorder

            coarse_sigma: 10.0, // ±10 pixels, same as the classic point jitter
            fine_sigma: 2.0,
            alpha_sigma_scale: 0.5,

            rate_early: 0.2,
            rate_late: 0.05,

            p_add_early: 0.7,
            p_add_late: 0.5,

            p_circle: 0.5,

            alpha_min: 10,
            alpha_max: 100,

            min_radius: 2,
            max_radius: 40,
        }
    }
}

/// the four mutually exclusive mutation kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Geometry,
    Color,
    Structural,
    Reorder,
}

impl MutateConfig {
    /// weighted choice of a mutation kind
    pub fn pick_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> MutationKind {
        let roll = rng.random::<f64>();
        if roll < self.p_geometry {
            MutationKind::Geometry
        } else if roll < self.p_geometry + self.p_color {
            MutationKind::Color
        } else if roll < self.p_geometry + self.p_color + self.p_structural {
            MutationKind::Structural
        } else {
            MutationKind::Reorder
        }
    }

    /// step size: coarse while `generation < max_generations / 2`, fine after
    #[inline]
    pub fn sigma_for(&self, generation: u64, max_generations: u64) -> f64 {
        if generation < max_generations / 2 {
            self.coarse_sigma
        } else {
            self.fine_sigma
        }
    }

    /// per-field jitter probability. driven by evaluations per individual rather
    /// than the generation counter so irregular batch sizes don't skew it.
    #[inline]
    pub fn rate_for(&self, evals: u64, population_size: usize, max_generations: u64) -> f64 {
        let per_individual = evals / population_size.max(1) as u64;
        if per_individual < max_generations / 2 {
            self.rate_early
        } else {
            self.rate_late
        }
    }

    /// chance that a structural mutation adds a shape
    #[inline]
    pub fn add_probability(&self, generation: u64, max_generations: u64) -> f64 {
        if generation < max_generations / 2 {
            self.p_add_early
        } else {
            self.p_add_late
        }
    }

    pub fn validate(&self) -> EvolveResult<()> {
        let weights = [self.p_geometry, self.p_color, self.p_structural];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() > 1.0 {
            return Err(EvolveError::InvalidConfiguration(format!(
                "mutation weights must be non-negative and sum to at most 1, got {weights:?}"
            )));
        }
        for (name, p) in [
            ("rate_early", self.rate_early),
            ("rate_late", self.rate_late),
            ("p_add_early", self.p_add_early),
            ("p_add_late", self.p_add_late),
            ("p_circle", self.p_circle),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EvolveError::InvalidConfiguration(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }
        for (name, s) in [
            ("coarse_sigma", self.coarse_sigma),
            ("fine_sigma", self.fine_sigma),
            ("alpha_sigma_scale", self.alpha_sigma_scale),
        ] {
            if !s.is_finite() || s < 0.0 {
                return Err(EvolveError::InvalidConfiguration(format!(
                    "{name} must be finite and non-negative, got {s}"
                )));
            }
        }
        // never fully transparent or fully opaque, so overlaps stay blendable
        if self.alpha_min == 0 || self.alpha_max == 255 || self.alpha_min > self.alpha_max {
            return Err(EvolveError::InvalidConfiguration(format!(
                "translucency band must satisfy 0 < alpha_min <= alpha_max < 255, got [{}, {}]",
                self.alpha_min, self.alpha_max
            )));
        }
        if self.min_radius < 1 || self.min_radius > self.max_radius {
            return Err(EvolveError::InvalidConfiguration(format!(
                "radius band must satisfy 1 <= min_radius <= max_radius, got [{}, {}]",
                self.min_radius, self.max_radius
            )));
        }
        Ok(())
    }
}
