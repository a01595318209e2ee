//─────────────────────────────────────────────────────────────────────────────
// resolution-invariant metrics (distance/px, PSNR)
//─────────────────────────────────────────────────────────────────────────────

/// distances cover RGB only
pub const FITNESS_CHANNELS_F64: f64 = 3.0;

/// PSNR (peak signal-to-noise ratio) in decibels.
/// - `mse`: mean squared error (or pseudo-MSE from an L1 distance)
/// - `peak`: 255.0 for 8-bit images
/// higher PSNR = better quality. typical ranges:
///   - 30 dB = acceptable
///   - 35 dB = good
///   - 40+ dB = very good
#[inline]
pub fn psnr_from_mse(mse: f64, peak: f64) -> f64 {
    let mse = mse.max(1e-12);
    10.0 * ((peak * peak) / mse).log10()
}

/// snapshot of resolution-invariant metrics for one distance score
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub distance_per_px: f64,
    pub psnr: f64,
}

impl MetricsSnapshot {
    /// `distance` is a per-pixel score from `fitness::score`.
    /// squared scores give a true MSE; for absolute scores L1/px/channel is
    /// treated as if it were MSE (pseudo-MSE), which keeps PSNR monotonic.
    #[inline]
    pub fn from_distance(distance: f64) -> Self {
        let mse = distance / FITNESS_CHANNELS_F64;
        Self { distance_per_px: distance, psnr: psnr_from_mse(mse, 255.0) }
    }
}
