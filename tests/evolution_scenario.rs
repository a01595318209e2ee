//! End-to-end runs of the population manager

use evoart::prelude::*;
use std::sync::Arc;

fn gray_target(size: u32) -> Arc<Raster> {
    Arc::new(Raster::solid(size, size, [128, 128, 128]))
}

#[test]
fn gray_target_improves_over_twenty_generations() {
    let config = EvolutionConfig {
        canvas_size: 200,
        min_shapes: 2,
        max_shapes: 100,
        population_size: 50,
        generations: 20,
        seed: Some(42),
        ..Default::default()
    };
    let mut pop = Population::new(config, gray_target(200)).unwrap();
    let initial = pop.stats().best;

    for _ in 0..20 {
        pop.evolve().unwrap();
    }

    let stats = pop.stats();
    assert_eq!(stats.generation, 20);
    assert_eq!(pop.len(), 50);
    assert!(stats.best < initial, "best {} did not improve on {}", stats.best, initial);

    let best = pop.best().unwrap();
    assert!(best.genome.len() >= 2 && best.genome.len() <= 100);
    let space = pop.config().shape_space();
    assert!(best.genome.shapes.iter().all(|s| s.is_within(&space)));
}

#[test]
fn best_render_scores_like_best() {
    let config = EvolutionConfig { canvas_size: 40, seed: Some(9), ..Default::default() };
    let mut pop = Population::new(config, gray_target(40)).unwrap();
    pop.evolve().unwrap().evolve().unwrap();

    let rendered = pop.best_render().unwrap();
    let recomputed = evoart::fitness::score(&rendered, pop.target(), pop.config().metric).unwrap();
    assert_eq!(Some(recomputed), pop.best().unwrap().fitness());
}

#[test]
fn contrast_seeded_init_runs() {
    // left half black, right half white: a single hard edge down the middle
    let size = 48u32;
    let rgb: Vec<u8> = (0..size * size)
        .flat_map(|i| {
            let v = if i % size < size / 2 { 0 } else { 255 };
            [v, v, v]
        })
        .collect();
    let target = Arc::new(Raster::from_rgb(size, size, &rgb).unwrap());
    let config = EvolutionConfig {
        canvas_size: size,
        seeded_init: true,
        population_size: 16,
        seed: Some(3),
        ..Default::default()
    };
    let mut pop = Population::new(config, target).unwrap();
    pop.evolve().unwrap();
    assert_eq!(pop.len(), 16);
}

#[test]
fn squared_metric_runs() {
    let config = EvolutionConfig {
        canvas_size: 32,
        metric: DistanceMetric::Squared,
        population_size: 10,
        seed: Some(5),
        ..Default::default()
    };
    let mut pop = Population::new(config, gray_target(32)).unwrap();
    let stats = pop.evolve().unwrap().stats();
    assert!(stats.best > 0.0 && stats.metrics.psnr.is_finite());
}

#[test]
fn configuration_errors_surface() {
    let target = gray_target(32);
    let bad = [
        EvolutionConfig { canvas_size: 32, population_size: 0, ..Default::default() },
        EvolutionConfig { canvas_size: 32, survive_fraction: 0.0, ..Default::default() },
        EvolutionConfig { canvas_size: 32, min_shapes: 50, max_shapes: 10, seed_shapes: 10, ..Default::default() },
        EvolutionConfig { canvas_size: 32, tournament_size: 0, ..Default::default() },
    ];
    for cfg in bad {
        assert!(
            matches!(Population::new(cfg.clone(), target.clone()), Err(EvolveError::InvalidConfiguration(_))),
            "{cfg:?}"
        );
    }
}

#[test]
fn wrong_target_size_is_rejected() {
    let config = EvolutionConfig { canvas_size: 64, ..Default::default() };
    let result = Population::new(config, gray_target(32));
    assert_eq!(
        result.err(),
        Some(EvolveError::RasterSizeMismatch { expected: (64, 64), actual: (32, 32) })
    );
}

#[test]
fn survive_then_breed_with_custom_selector() {
    let config = EvolutionConfig { canvas_size: 24, population_size: 20, seed: Some(11), ..Default::default() };
    let mut pop = Population::new(config, gray_target(24)).unwrap();
    pop.survive(0.1).unwrap();
    assert_eq!(pop.len(), 2);

    // a tournament bigger than the survivor pool can't run
    let err = pop.breed(&TournamentSelection::new(3), &PositionalCrossover::new(100)).unwrap_err();
    assert_eq!(err, EvolveError::EmptyPopulation { required: 3, available: 2 });

    pop.breed(&TournamentSelection::new(2), &PositionalCrossover::new(100)).unwrap();
    assert_eq!(pop.len(), 20);
    assert_eq!(pop.evaluate().unwrap(), 18);
}
