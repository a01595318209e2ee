//! Crossover operators

use rand::Rng;

use crate::dna::Genome;
use crate::operators::Combiner;

/// Positional blending of two parents' shape lists
///
/// Slot `i` of the child comes from slot `i` of either parent with equal
/// probability, or from whichever parent is long enough. This assumes shape
/// index carries some continuity across the population; it's an
/// approximation, not an invariant.
#[derive(Clone, Debug)]
pub struct PositionalCrossover {
    /// Child length cap
    pub max_shapes: usize,
}

impl PositionalCrossover {
    pub fn new(max_shapes: usize) -> Self {
        Self { max_shapes }
    }
}

impl Combiner for PositionalCrossover {
    fn combine<R: Rng + ?Sized>(&self, a: &Genome, b: &Genome, rng: &mut R) -> Genome {
        profiling::scope!("PositionalCrossover::combine");
        let len = self.max_shapes.min(a.len().max(b.len()));
        let mut child = Genome::new_blank(a.canvas_size);
        child.shapes.reserve(len);

        for i in 0..len {
            // shapes are shared via Arc; later mutation clones on write
            let gene = match (a.shapes.get(i), b.shapes.get(i)) {
                (Some(x), Some(y)) => {
                    if rng.random_bool(0.5) { x } else { y }
                }
                (Some(x), None) | (None, Some(x)) => x,
                (None, None) => {
                    // unreachable while len <= max(len a, len b), kept for safety
                    let total = a.len() + b.len();
                    let pick = rng.random_range(0..total);
                    if pick < a.len() { &a.shapes[pick] } else { &b.shapes[pick - a.len()] }
                }
            };
            child.shapes.push(gene.clone());
        }

        child
    }
}
