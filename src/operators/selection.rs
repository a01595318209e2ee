//! Selection operators

use rand::seq::index;
use rand::Rng;

use crate::engine::Individual;
use crate::error::{EvolveError, EvolveResult};
use crate::operators::Selector;

/// Tournament selection operator
///
/// Samples `tournament_size` distinct individuals and returns the one with the
/// lowest distance. Larger tournaments mean stronger selection pressure.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Selector for TournamentSelection {
    fn select<'a, R: Rng + ?Sized>(
        &self,
        pool: &'a [Individual],
        rng: &mut R,
    ) -> EvolveResult<&'a Individual> {
        profiling::scope!("TournamentSelection::select");
        // sampling is without replacement, so an undersized pool is an error
        // rather than a silent fallback to duplicates
        if pool.is_empty() || pool.len() < self.tournament_size {
            return Err(EvolveError::EmptyPopulation {
                required: self.tournament_size,
                available: pool.len(),
            });
        }

        index::sample(rng, pool.len(), self.tournament_size)
            .into_iter()
            .map(|i| &pool[i])
            .min_by(|a, b| a.rank_key().total_cmp(&b.rank_key()))
            .ok_or(EvolveError::EmptyPopulation {
                required: self.tournament_size,
                available: pool.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::Genome;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pool(scores: &[f64]) -> Vec<Individual> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| Individual::evaluated(i as u64, Genome::new_blank(8), s))
            .collect()
    }

    #[test]
    fn test_full_tournament_returns_best() {
        let pool = pool(&[5.0, 3.0, 9.0, 1.5, 4.0]);
        let sel = TournamentSelection::new(pool.len());
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..20 {
            assert_eq!(sel.select(&pool, &mut rng).unwrap().id, 3);
        }
    }

    #[test]
    fn test_winner_comes_from_pool() {
        let pool = pool(&[5.0, 3.0, 9.0, 1.5, 4.0, 8.0, 2.0]);
        let sel = TournamentSelection::default();
        let mut rng = Pcg32::seed_from_u64(12);
        for _ in 0..100 {
            let winner = sel.select(&pool, &mut rng).unwrap();
            assert!(pool.iter().any(|i| std::ptr::eq(i, winner)));
            // the two worst can never win a 3-way tournament
            assert!(winner.id != 2 && winner.id != 5);
        }
    }

    #[test]
    fn test_unevaluated_ranks_last() {
        let mut pool = pool(&[7.0]);
        pool.push(Individual::new(1, Genome::new_blank(8)));
        let sel = TournamentSelection::new(2);
        let mut rng = Pcg32::seed_from_u64(13);
        assert_eq!(sel.select(&pool, &mut rng).unwrap().id, 0);
    }

    #[test]
    fn test_undersized_pool_is_an_error() {
        let pool = pool(&[1.0, 2.0]);
        let sel = TournamentSelection::new(3);
        let mut rng = Pcg32::seed_from_u64(14);
        assert_eq!(
            sel.select(&pool, &mut rng).unwrap_err(),
            EvolveError::EmptyPopulation { required: 3, available: 2 }
        );
        assert!(sel.pick_parents(&[], &mut rng).is_err());
    }
}
