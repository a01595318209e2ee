/// per-pixel RGB distance between a rendered canvas and the target.
/// alpha is ignored: rendered canvases are always opaque and translucent
/// targets are premultiplied on load.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EvolveError, EvolveResult};
use crate::raster::Raster;

/// bytes per rayon work unit (16K pixels), keeps per-task overhead low on small canvases
const MIN_CHUNK_BYTES: usize = 64 * 1024;

/// how channel differences are accumulated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// sum of absolute differences (manhattan)
    #[default]
    Absolute,
    /// sum of squared differences
    Squared,
}

/// sum of absolute RGB differences over two equally sized RGBA buffers
pub fn sad_rgb_parallel(target_rgba: &[u8], current_rgba: &[u8]) -> u64 {
    profiling::scope!("sad_rgb_parallel");
    debug_assert_eq!(target_rgba.len(), current_rgba.len());
    debug_assert_eq!(target_rgba.len() % 4, 0);

    target_rgba
        .par_chunks(MIN_CHUNK_BYTES)
        .zip(current_rgba.par_chunks(MIN_CHUNK_BYTES))
        .map(|(t, c)| {
            t.chunks_exact(4)
                .zip(c.chunks_exact(4))
                .map(|(tp, cp)| {
                    tp[0].abs_diff(cp[0]) as u64
                        + tp[1].abs_diff(cp[1]) as u64
                        + tp[2].abs_diff(cp[2]) as u64
                })
                .sum::<u64>()
        })
        .sum()
}

/// sum of squared RGB differences over two equally sized RGBA buffers
pub fn sse_rgb_parallel(target_rgba: &[u8], current_rgba: &[u8]) -> u64 {
    profiling::scope!("sse_rgb_parallel");
    debug_assert_eq!(target_rgba.len(), current_rgba.len());
    debug_assert_eq!(target_rgba.len() % 4, 0);

    #[inline(always)]
    fn sq(a: u8, b: u8) -> u64 {
        let d = a.abs_diff(b) as u64;
        d * d
    }

    target_rgba
        .par_chunks(MIN_CHUNK_BYTES)
        .zip(current_rgba.par_chunks(MIN_CHUNK_BYTES))
        .map(|(t, c)| {
            t.chunks_exact(4)
                .zip(c.chunks_exact(4))
                .map(|(tp, cp)| sq(tp[0], cp[0]) + sq(tp[1], cp[1]) + sq(tp[2], cp[2]))
                .sum::<u64>()
        })
        .sum()
}

/// distance between a rendered canvas and the target, normalized by pixel
/// count so scores compare across canvas sizes. lower is better.
/// pure: only reads its inputs, safe to call from many threads at once.
pub fn score(rendered: &Raster, target: &Raster, metric: DistanceMetric) -> EvolveResult<f64> {
    profiling::scope!("score");
    if rendered.dimensions() != target.dimensions() {
        return Err(EvolveError::RasterSizeMismatch {
            expected: target.dimensions(),
            actual: rendered.dimensions(),
        });
    }

    let total = match metric {
        DistanceMetric::Absolute => sad_rgb_parallel(target.as_rgba(), rendered.as_rgba()),
        DistanceMetric::Squared => sse_rgb_parallel(target.as_rgba(), rendered.as_rgba()),
    };
    Ok(total as f64 / target.pixel_count() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_rasters_score_zero() {
        let a = Raster::solid(10, 10, [12, 34, 56]);
        assert_eq!(score(&a, &a, DistanceMetric::Absolute).unwrap(), 0.0);
        assert_eq!(score(&a, &a, DistanceMetric::Squared).unwrap(), 0.0);
    }

    #[test]
    fn test_score_is_normalized_per_pixel() {
        let black_small = Raster::solid(4, 4, [0, 0, 0]);
        let gray_small = Raster::solid(4, 4, [10, 20, 30]);
        let black_big = Raster::solid(64, 64, [0, 0, 0]);
        let gray_big = Raster::solid(64, 64, [10, 20, 30]);

        assert_eq!(score(&black_small, &gray_small, DistanceMetric::Absolute).unwrap(), 60.0);
        assert_eq!(score(&black_big, &gray_big, DistanceMetric::Absolute).unwrap(), 60.0);
        assert_eq!(score(&black_big, &gray_big, DistanceMetric::Squared).unwrap(), 1400.0);
    }

    #[test]
    fn test_size_mismatch_is_an_error() {
        let a = Raster::solid(4, 4, [0, 0, 0]);
        let b = Raster::solid(4, 5, [0, 0, 0]);
        assert_eq!(
            score(&a, &b, DistanceMetric::Absolute),
            Err(EvolveError::RasterSizeMismatch { expected: (4, 5), actual: (4, 4) })
        );
    }

    #[test]
    fn test_large_buffers_split_across_chunks() {
        // 300x300 spans several rayon chunks; result must match a plain loop
        let a = Raster::solid(300, 300, [0, 0, 0]);
        let b = Raster::solid(300, 300, [1, 2, 3]);
        assert_eq!(sad_rgb_parallel(a.as_rgba(), b.as_rgba()), 300 * 300 * 6);
        assert_eq!(sse_rgb_parallel(a.as_rgba(), b.as_rgba()), 300 * 300 * 14);
    }
}
