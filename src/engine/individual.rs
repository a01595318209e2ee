use crate::dna::Genome;
use crate::error::EvolveResult;
use crate::fitness::{self, DistanceMetric};
use crate::raster::Raster;
use crate::render::CpuRenderer;

/// One member of the population: a genome plus its cached distance.
///
/// `fitness` is `None` until the genome has been scored against the target.
/// Any change to the genome's content clears it.
#[derive(Clone, Debug)]
pub struct Individual {
    /// bookkeeping only
    pub id: u64,
    pub genome: Genome,
    fitness: Option<f64>,
}

impl Individual {
    pub fn new(id: u64, genome: Genome) -> Self {
        Self { id, genome, fitness: None }
    }

    /// an individual whose distance is already known
    pub fn evaluated(id: u64, genome: Genome, fitness: f64) -> Self {
        Self { id, genome, fitness: Some(fitness) }
    }

    #[inline]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// sort key, lower is better; unevaluated individuals rank last
    #[inline]
    pub fn rank_key(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// swap in a new genome. the cached distance survives only if the content is identical.
    pub fn replace_genome(&mut self, genome: Genome) {
        if genome != self.genome {
            self.fitness = None;
        }
        self.genome = genome;
    }

    /// render and score against `target`, reusing the cached value when present
    pub fn evaluate(&mut self, target: &Raster, metric: DistanceMetric) -> EvolveResult<f64> {
        if let Some(f) = self.fitness {
            return Ok(f);
        }
        profiling::scope!("Individual::evaluate");
        let rendered = CpuRenderer::render(&self.genome)?;
        let f = fitness::score(&rendered, target, metric)?;
        self.fitness = Some(f);
        Ok(f)
    }
}
