// Population manager
// Submodules hold the per-member state and the generation summary

pub mod individual;
pub mod metrics;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rayon::prelude::*;
use std::sync::Arc;

use crate::analysis::ContrastMap;
use crate::dna::Genome;
use crate::error::{EvolveError, EvolveResult};
use crate::operators::{
    Combiner, MutationContext, Mutator, PositionalCrossover, Selector, ShapeMutator, TournamentSelection,
};
use crate::raster::Raster;
use crate::render::CpuRenderer;
use crate::settings::EvolutionConfig;

pub use individual::Individual;
pub use metrics::GenerationStats;

/// A fixed-size population evolving toward one target image.
///
/// Every step takes `&mut self`; parallelism lives inside `evaluate` and
/// `mutate`. Per-individual RNG streams are drawn from the master RNG in index
/// order, so a seeded run is reproducible regardless of thread scheduling.
pub struct Population {
    individuals: Vec<Individual>,
    target: Arc<Raster>,
    config: EvolutionConfig,
    rng: Pcg32,
    generation: u64,
    evals: u64,
    next_id: u64,
}

impl Population {
    /// seed comes from `config.seed`, or the OS when unset
    pub fn new(config: EvolutionConfig, target: Arc<Raster>) -> EvolveResult<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, target, seed)
    }

    pub fn with_seed(config: EvolutionConfig, target: Arc<Raster>, seed: u64) -> EvolveResult<Self> {
        profiling::scope!("Population::with_seed");
        config.validate()?;
        let expected = (config.canvas_size, config.canvas_size);
        if target.dimensions() != expected {
            return Err(EvolveError::RasterSizeMismatch { expected, actual: target.dimensions() });
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let space = config.shape_space();
        let contrast = if config.seeded_init {
            let map = ContrastMap::compute(&target, config.contrast.window_radius, config.contrast.threshold);
            if map.is_empty() {
                log::warn!(
                    "no pixel above contrast threshold {}; falling back to uniform initialization",
                    config.contrast.threshold
                );
            }
            Some(map)
        } else {
            None
        };

        let individuals = (0..config.population_size)
            .map(|i| {
                let genome = match &contrast {
                    Some(map) => {
                        Genome::seeded(&mut rng, &space, config.min_shapes, config.seed_shapes, map, &target)
                    }
                    None => Genome::random(&mut rng, &space, config.min_shapes, config.seed_shapes),
                };
                Individual::new(i as u64, genome)
            })
            .collect();

        let mut pop = Self {
            individuals,
            target,
            next_id: config.population_size as u64,
            config,
            rng,
            generation: 0,
            evals: 0,
        };
        pop.evaluate()?;

        let stats = pop.stats();
        log::info!(
            "population of {} on {}x{} canvas (seed {seed}, metric {:?}); initial best {:.3}, mean {:.3}",
            pop.config.population_size,
            pop.config.canvas_size,
            pop.config.canvas_size,
            pop.config.metric,
            stats.best,
            stats.mean
        );
        Ok(pop)
    }

    /// keep the best `max(1, floor(fraction * population_size))` individuals
    pub fn survive(&mut self, fraction: f64) -> EvolveResult<()> {
        profiling::scope!("Population::survive");
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(EvolveError::InvalidConfiguration(format!(
                "survive fraction must be in (0, 1], got {fraction}"
            )));
        }
        self.evaluate()?;
        self.individuals.sort_by(|a, b| a.rank_key().total_cmp(&b.rank_key()));
        self.individuals.truncate(self.config.survivors_for(fraction));
        Ok(())
    }

    /// refill to `population_size` with children of the current members.
    /// call right after `survive`, so parents come from the survivor set only.
    pub fn breed<S: Selector, C: Combiner>(&mut self, selector: &S, combiner: &C) -> EvolveResult<()> {
        profiling::scope!("Population::breed");
        let survivors = self.individuals.len();
        let needed = self.config.population_size.saturating_sub(survivors);
        if needed == 0 {
            return Ok(());
        }
        if survivors < 2 {
            return Err(EvolveError::EmptyPopulation { required: 2, available: survivors });
        }

        let mut children = Vec::with_capacity(needed);
        {
            let pool = &self.individuals[..];
            for _ in 0..needed {
                let (a, b) = selector.pick_parents(pool, &mut self.rng)?;
                let genome = combiner.combine(&a.genome, &b.genome, &mut self.rng);
                children.push(Individual::new(self.next_id, genome));
                self.next_id += 1;
            }
        }
        self.individuals.extend(children);
        Ok(())
    }

    /// replace every genome past the first `elite_count` with a mutated copy
    pub fn mutate<M: Mutator>(&mut self, mutator: &M, ctx: &MutationContext) {
        profiling::scope!("Population::mutate");
        let elite = self.config.elite_count.min(self.individuals.len());
        let rest = &mut self.individuals[elite..];
        let seeds: Vec<u64> = (0..rest.len()).map(|_| self.rng.random()).collect();

        rest.par_iter_mut().zip(seeds.par_iter()).for_each(|(ind, &seed)| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let child = mutator.mutate(&ind.genome, ctx, &mut rng);
            ind.replace_genome(child);
        });
    }

    /// score every stale individual; returns how many were scored.
    /// on failure the individuals that did score are still counted in `evals`.
    pub fn evaluate(&mut self) -> EvolveResult<usize> {
        profiling::scope!("Population::evaluate");
        let target = &*self.target;
        let metric = self.config.metric;
        let results: Vec<EvolveResult<f64>> = self
            .individuals
            .par_iter_mut()
            .filter(|ind| !ind.is_evaluated())
            .map(|ind| ind.evaluate(target, metric))
            .collect();

        let scored = results.iter().filter(|r| r.is_ok()).count();
        self.evals += scored as u64;
        if let Some(Err(e)) = results.into_iter().find(|r| r.is_err()) {
            return Err(e);
        }
        Ok(scored)
    }

    /// one generation with the default operators built from the config
    pub fn evolve(&mut self) -> EvolveResult<&mut Self> {
        let selector = TournamentSelection::new(self.config.tournament_size);
        let combiner = PositionalCrossover::new(self.config.max_shapes);
        let mutator = ShapeMutator::from_config(&self.config);
        self.evolve_with(&selector, &combiner, &mutator)
    }

    /// survive → breed → mutate → evaluate, then advance the generation counter
    pub fn evolve_with<S: Selector, C: Combiner, M: Mutator>(
        &mut self,
        selector: &S,
        combiner: &C,
        mutator: &M,
    ) -> EvolveResult<&mut Self> {
        profiling::scope!("Population::evolve");
        let ctx = MutationContext {
            rate: self.config.mutation.rate_for(self.evals, self.config.population_size, self.config.generations),
            generation: self.generation,
            max_generations: self.config.generations,
        };

        self.survive(self.config.survive_fraction)?;
        self.breed(selector, combiner)?;
        self.mutate(mutator, &ctx);
        self.evaluate()?;
        self.generation += 1;

        if log::log_enabled!(log::Level::Debug) {
            let s = self.stats();
            log::debug!(
                "gen {} evals {} best {:.3} mean {:.3} worst {:.3} shapes {} psnr {:.2}dB rate {:.3}",
                s.generation,
                s.evals,
                s.best,
                s.mean,
                s.worst,
                s.shapes_in_best,
                s.metrics.psnr,
                ctx.rate
            );
        }
        Ok(self)
    }

    /// lowest-distance individual. unevaluated members rank last.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().min_by(|a, b| a.rank_key().total_cmp(&b.rank_key()))
    }

    pub fn best_render(&self) -> EvolveResult<Raster> {
        let best = self.best().ok_or(EvolveError::EmptyPopulation { required: 1, available: 0 })?;
        CpuRenderer::render(&best.genome)
    }

    #[inline]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn evals(&self) -> u64 {
        self.evals
    }

    #[inline]
    pub fn target(&self) -> &Arc<Raster> {
        &self.target
    }

    #[inline]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 12,
            generations: 30,
            canvas_size: 24,
            min_shapes: 1,
            seed_shapes: 3,
            max_shapes: 10,
            ..Default::default()
        }
    }

    fn gray(size: u32) -> Arc<Raster> {
        Arc::new(Raster::solid(size, size, [128, 128, 128]))
    }

    #[test]
    fn test_new_evaluates_everyone() {
        let pop = Population::with_seed(small_config(), gray(24), 1).unwrap();
        assert_eq!(pop.len(), 12);
        assert_eq!(pop.evals(), 12);
        assert_eq!(pop.generation(), 0);
        assert!(pop.individuals().iter().all(|i| i.is_evaluated()));
        assert!(pop.individuals().iter().all(|i| (1..=3).contains(&i.genome.len())));
    }

    #[test]
    fn test_target_size_must_match_canvas() {
        let err = Population::with_seed(small_config(), gray(20), 1).err().unwrap();
        assert_eq!(err, EvolveError::RasterSizeMismatch { expected: (24, 24), actual: (20, 20) });
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let cfg = EvolutionConfig { population_size: 0, ..small_config() };
        assert!(matches!(
            Population::with_seed(cfg, gray(24), 1),
            Err(EvolveError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_survive_keeps_the_best_sorted() {
        let mut pop = Population::with_seed(small_config(), gray(24), 2).unwrap();
        let mut all: Vec<f64> = pop.individuals().iter().map(|i| i.rank_key()).collect();
        all.sort_by(f64::total_cmp);

        pop.survive(0.25).unwrap();
        let kept: Vec<f64> = pop.individuals().iter().map(|i| i.rank_key()).collect();
        assert_eq!(kept, all[..3].to_vec());

        assert!(pop.survive(0.0).is_err());
        assert!(pop.survive(1.01).is_err());
    }

    #[test]
    fn test_breed_refills_from_survivors() {
        let mut pop = Population::with_seed(small_config(), gray(24), 3).unwrap();
        pop.survive(0.5).unwrap();
        pop.breed(&TournamentSelection::new(2), &PositionalCrossover::new(10)).unwrap();
        assert_eq!(pop.len(), 12);
        assert!(pop.individuals()[6..].iter().all(|i| !i.is_evaluated()));
        let ids: std::collections::HashSet<u64> = pop.individuals().iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_breed_needs_two_parents() {
        let mut pop = Population::with_seed(small_config(), gray(24), 4).unwrap();
        pop.survive(0.05).unwrap();
        assert_eq!(pop.len(), 1);
        let err = pop.breed(&TournamentSelection::new(1), &PositionalCrossover::new(10)).unwrap_err();
        assert_eq!(err, EvolveError::EmptyPopulation { required: 2, available: 1 });
    }

    #[test]
    fn test_elites_are_not_mutated() {
        let cfg = EvolutionConfig { elite_count: 2, ..small_config() };
        let mut pop = Population::with_seed(cfg.clone(), gray(24), 5).unwrap();
        pop.survive(1.0).unwrap();
        let elites: Vec<Genome> = pop.individuals()[..2].iter().map(|i| i.genome.clone()).collect();
        let ctx = MutationContext { rate: 1.0, generation: 0, max_generations: 30 };
        pop.mutate(&ShapeMutator::from_config(&cfg), &ctx);
        for (ind, g) in pop.individuals().iter().zip(&elites) {
            assert_eq!(&ind.genome, g);
            assert!(ind.is_evaluated());
        }
    }

    #[test]
    fn test_evolve_keeps_size_and_counts() {
        let mut pop = Population::with_seed(small_config(), gray(24), 6).unwrap();
        for g in 1..=5 {
            pop.evolve().unwrap();
            assert_eq!(pop.len(), 12);
            assert_eq!(pop.generation(), g);
            assert!(pop.individuals().iter().all(|i| i.is_evaluated()));
        }
        assert!(pop.evals() > 12);
        let s = pop.stats();
        assert_eq!(s.generation, 5);
        assert!(s.best <= s.mean && s.mean <= s.worst);
        assert_eq!(Some(s.best), pop.best().and_then(|b| b.fitness()));
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut pop = Population::with_seed(small_config(), gray(24), seed).unwrap();
            for _ in 0..4 {
                pop.evolve().unwrap();
            }
            pop.best().map(|b| b.genome.clone())
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_seeded_init_on_flat_target_falls_back() {
        let cfg = EvolutionConfig { seeded_init: true, ..small_config() };
        let space = cfg.shape_space();
        let target = Arc::new(Raster::solid(24, 24, [60, 60, 60]));
        let pop = Population::with_seed(cfg, target, 10).unwrap();
        assert_eq!(pop.len(), 12);
        for ind in pop.individuals() {
            assert!((1..=3).contains(&ind.genome.len()));
            assert!(ind.genome.shapes.iter().all(|s| s.is_within(&space)));
        }
    }

    #[test]
    fn test_partial_evaluation_failure_still_counts() {
        let mut pop = Population::with_seed(small_config(), gray(24), 11).unwrap();
        assert_eq!(pop.evals(), 12);
        for ind in pop.individuals.iter_mut().skip(1) {
            ind.replace_genome(Genome::new_blank(24));
        }
        // wrong canvas size: this one can't be scored against the target
        pop.individuals[0] = Individual::new(99, Genome::new_blank(20));

        let err = pop.evaluate().unwrap_err();
        assert_eq!(err, EvolveError::RasterSizeMismatch { expected: (24, 24), actual: (20, 20) });
        assert_eq!(pop.evals(), 12 + 11);
        assert!(pop.individuals()[1..].iter().all(|i| i.is_evaluated()));
    }

    #[test]
    fn test_best_render_matches_target_size() {
        let pop = Population::with_seed(small_config(), gray(24), 8).unwrap();
        assert_eq!(pop.best_render().unwrap().dimensions(), (24, 24));
    }
}
