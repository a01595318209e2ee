use crate::fitness::MetricsSnapshot;

use super::{Individual, Population};

/// summary of one generation, as seen after `evolve` returns
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GenerationStats {
    pub generation: u64,
    pub evals: u64,
    pub best: f64,
    pub mean: f64,
    pub worst: f64,
    pub shapes_in_best: usize,
    /// resolution-invariant view of `best`
    pub metrics: MetricsSnapshot,
}

impl GenerationStats {
    /// min / mean / max over the evaluated members; unevaluated ones are skipped
    pub(super) fn collect(generation: u64, evals: u64, individuals: &[Individual]) -> Self {
        profiling::scope!("GenerationStats::collect");
        let mut best: Option<&Individual> = None;
        let mut worst = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut n = 0usize;

        for ind in individuals {
            let Some(f) = ind.fitness() else { continue };
            sum += f;
            n += 1;
            worst = worst.max(f);
            if best.map_or(true, |b| f < b.rank_key()) {
                best = Some(ind);
            }
        }

        let Some(best) = best else {
            return Self { generation, evals, ..Default::default() };
        };
        let best_f = best.rank_key();
        Self {
            generation,
            evals,
            best: best_f,
            mean: sum / n as f64,
            worst,
            shapes_in_best: best.genome.len(),
            metrics: MetricsSnapshot::from_distance(best_f),
        }
    }
}

impl Population {
    pub fn stats(&self) -> GenerationStats {
        GenerationStats::collect(self.generation, self.evals, &self.individuals)
    }
}
