//! # evoart
//!
//! Evolves a population of small vector drawings (translucent triangles and
//! circles on a black canvas) toward a target image.
//!
//! Each generation keeps the closest individuals, breeds children from them by
//! tournament selection and positional crossover, mutates, and re-scores
//! against the target. Mutation starts coarse and gets finer as the run goes
//! on; the shape count starts low and grows through structural mutation.
//!
//! ```rust,ignore
//! use evoart::prelude::*;
//! use std::sync::Arc;
//!
//! let target = Arc::new(Raster::from_rgb(200, 200, &pixels)?);
//! let config = EvolutionConfig { seed: Some(42), ..Default::default() };
//! let mut pop = Population::new(config, target)?;
//! for _ in 0..1000 {
//!     pop.evolve()?;
//! }
//! let image = pop.best_render()?;
//! ```

pub mod analysis;
pub mod dna;
pub mod engine;
pub mod error;
pub mod fitness;
pub mod geom;
pub mod mutation_config;
pub mod operators;
pub mod raster;
pub mod render;
pub mod settings;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dna::{Genome, Shape, ShapeSpace};
    pub use crate::engine::{GenerationStats, Individual, Population};
    pub use crate::error::{EvolveError, EvolveResult};
    pub use crate::fitness::{DistanceMetric, MetricsSnapshot};
    pub use crate::mutation_config::MutateConfig;
    pub use crate::operators::{
        Combiner, MutationContext, Mutator, PositionalCrossover, Selector, ShapeMutator, TournamentSelection,
    };
    pub use crate::raster::Raster;
    pub use crate::render::CpuRenderer;
    pub use crate::settings::{ContrastSettings, EvolutionConfig};
}
