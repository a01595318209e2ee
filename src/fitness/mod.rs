// fitness module organization
// distance computes the score, metrics turns scores into comparable numbers

pub mod distance;
pub mod metrics;

// re-export commonly used types and functions
pub use distance::{sad_rgb_parallel, score, sse_rgb_parallel, DistanceMetric};
pub use metrics::MetricsSnapshot;
