//! Mutation operators

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::sync::Arc;

use crate::dna::{Genome, Shape, ShapeSpace};
use crate::mutation_config::{MutateConfig, MutationKind};
use crate::operators::{MutationContext, Mutator};
use crate::settings::EvolutionConfig;

/// Shape-list mutator
///
/// Applies exactly one mutation kind per call (geometry jitter, color jitter,
/// add/remove, or reorder) so each step stays small. Every touched field is
/// clamped back into range afterwards.
#[derive(Clone, Debug)]
pub struct ShapeMutator {
    pub cfg: MutateConfig,
    pub space: ShapeSpace,
    pub min_shapes: usize,
    pub max_shapes: usize,
}

impl ShapeMutator {
    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self {
            cfg: config.mutation.clone(),
            space: config.shape_space(),
            min_shapes: config.min_shapes,
            max_shapes: config.max_shapes,
        }
    }

    /// move coordinates / radius of one shape
    fn jitter_geometry<R: Rng + ?Sized>(&self, shape: &mut Shape, noise: &Normal<f64>, rate: f64, rng: &mut R) {
        let mut nudge = |v: &mut i32| {
            if rng.random::<f64>() < rate {
                *v = (*v as f64 + noise.sample(rng)).round() as i32;
            }
        };
        match shape {
            Shape::Triangle { vertices, .. } => {
                for (x, y) in vertices.iter_mut() {
                    nudge(x);
                    nudge(y);
                }
            }
            Shape::Circle { center, radius, .. } => {
                nudge(&mut center.0);
                nudge(&mut center.1);
                nudge(radius);
            }
        }
        shape.clamp(&self.space);
    }

    /// shift RGB at the full step, alpha at a smaller one
    fn jitter_color<R: Rng + ?Sized>(&self, shape: &mut Shape, sigma: f64, rng: &mut R) {
        let (Ok(rgb_noise), Ok(alpha_noise)) = (
            Normal::new(0.0, sigma),
            Normal::new(0.0, sigma * self.cfg.alpha_sigma_scale),
        ) else {
            return;
        };
        let color = shape.color_mut();
        for c in color[..3].iter_mut() {
            *c = (*c as f64 + rgb_noise.sample(rng)).round().clamp(0.0, 255.0) as u8;
        }
        color[3] = (color[3] as f64 + alpha_noise.sample(rng))
            .round()
            .clamp(self.space.alpha_min as f64, self.space.alpha_max as f64) as u8;
        shape.clamp(&self.space);
    }

    /// add a fresh shape or drop one, respecting the shape-count bounds
    fn add_or_remove<R: Rng + ?Sized>(&self, genome: &mut Genome, ctx: &MutationContext, rng: &mut R) {
        let len = genome.len();
        let add = match (len < self.max_shapes, len > self.min_shapes) {
            (true, true) => rng.random::<f64>() < self.cfg.add_probability(ctx.generation, ctx.max_generations),
            (true, false) => true,
            (false, true) => false,
            (false, false) => return,
        };
        if add {
            genome.shapes.push(Arc::new(Shape::random(rng, &self.space)));
        } else {
            let idx = rng.random_range(0..len);
            genome.shapes.remove(idx);
        }
    }
}

impl Mutator for ShapeMutator {
    fn mutate<R: Rng + ?Sized>(&self, genome: &Genome, ctx: &MutationContext, rng: &mut R) -> Genome {
        profiling::scope!("ShapeMutator::mutate");
        let mut child = genome.clone();
        let sigma = self.cfg.sigma_for(ctx.generation, ctx.max_generations);

        match self.cfg.pick_kind(rng) {
            MutationKind::Geometry => {
                if child.is_empty() {
                    return child;
                }
                let Ok(noise) = Normal::new(0.0, sigma) else {
                    return child;
                };
                let idx = rng.random_range(0..child.len());
                self.jitter_geometry(child.shape_mut(idx), &noise, ctx.rate, rng);
            }
            MutationKind::Color => {
                if child.is_empty() {
                    return child;
                }
                let idx = rng.random_range(0..child.len());
                self.jitter_color(child.shape_mut(idx), sigma, rng);
            }
            MutationKind::Structural => self.add_or_remove(&mut child, ctx, rng),
            MutationKind::Reorder => child.shapes.shuffle(rng),
        }

        child
    }
}
