//! Variation operators
//!
//! The population manager only talks to these traits, so alternative
//! strategies can be swapped in without touching it.

pub mod crossover;
pub mod mutation;
pub mod selection;

use rand::Rng;

use crate::dna::Genome;
use crate::engine::Individual;
use crate::error::EvolveResult;

pub use crossover::PositionalCrossover;
pub use mutation::ShapeMutator;
pub use selection::TournamentSelection;

/// Schedule inputs handed to a mutator for one generation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationContext {
    /// Per-field jitter probability
    pub rate: f64,
    /// Current generation index
    pub generation: u64,
    /// Planned run length
    pub max_generations: u64,
}

/// Picks parents from a pool of evaluated individuals
pub trait Selector: Send + Sync {
    /// Select one individual from the pool
    fn select<'a, R: Rng + ?Sized>(
        &self,
        pool: &'a [Individual],
        rng: &mut R,
    ) -> EvolveResult<&'a Individual>;

    /// Select a pair of parents (independent draws)
    fn pick_parents<'a, R: Rng + ?Sized>(
        &self,
        pool: &'a [Individual],
        rng: &mut R,
    ) -> EvolveResult<(&'a Individual, &'a Individual)> {
        Ok((self.select(pool, rng)?, self.select(pool, rng)?))
    }
}

/// Builds a child genome from two parents
pub trait Combiner: Send + Sync {
    fn combine<R: Rng + ?Sized>(&self, a: &Genome, b: &Genome, rng: &mut R) -> Genome;
}

/// Produces a mutated copy of a genome; the argument is never modified
pub trait Mutator: Send + Sync {
    fn mutate<R: Rng + ?Sized>(&self, genome: &Genome, ctx: &MutationContext, rng: &mut R) -> Genome;
}
