use rand::Rng;

use crate::dna::{Shape, ShapeSpace};
use crate::geom::{BBox, Point};
use crate::raster::Raster;

/// std-dev at which a seeded shape's extent halves
const CONTRAST_SCALE: f32 = 16.0;

/// Rec. 601 luma of every pixel, row-major
pub fn grayscale(target: &Raster) -> Vec<f32> {
    profiling::scope!("grayscale");
    target
        .as_rgba()
        .chunks_exact(4)
        .map(|p| 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32)
        .collect()
}

/// average RGB of the target inside `rect`
pub fn mean_color(target: &Raster, rect: BBox) -> [u8; 3] {
    profiling::scope!("mean_color");
    let mut sum = [0u64; 3];
    for y in rect.y0..=rect.y1 {
        for x in rect.x0..=rect.x1 {
            let p = target.pixel(x, y);
            sum[0] += p[0] as u64;
            sum[1] += p[1] as u64;
            sum[2] += p[2] as u64;
        }
    }
    let n = rect.pixel_count() as u64;
    [(sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8]
}

/// local contrast of the target: per-pixel standard deviation of luma over a
/// square window, plus the pixels at or above a threshold.
#[derive(Clone, Debug)]
pub struct ContrastMap {
    width: u32,
    height: u32,
    std: Vec<f32>,
    hot: Vec<Point>,
}

impl ContrastMap {
    /// slide a `(2r+1)`×`(2r+1)` window over a grayscale copy of the target.
    /// uses summed-area tables so the cost doesn't depend on the window size.
    pub fn compute(target: &Raster, window_radius: u32, threshold: f32) -> Self {
        profiling::scope!("ContrastMap::compute");
        let (w, h) = target.dimensions();
        let (wu, hu) = (w as usize, h as usize);
        let luma = grayscale(target);

        // integral images with a zero row/column in front
        let stride = wu + 1;
        let mut sum = vec![0f64; stride * (hu + 1)];
        let mut sum_sq = vec![0f64; stride * (hu + 1)];
        for y in 0..hu {
            let mut row = 0f64;
            let mut row_sq = 0f64;
            for x in 0..wu {
                let v = luma[y * wu + x] as f64;
                row += v;
                row_sq += v * v;
                sum[(y + 1) * stride + x + 1] = sum[y * stride + x + 1] + row;
                sum_sq[(y + 1) * stride + x + 1] = sum_sq[y * stride + x + 1] + row_sq;
            }
        }
        let rect = |t: &[f64], x0: usize, y0: usize, x1: usize, y1: usize| {
            t[y1 * stride + x1] - t[y0 * stride + x1] - t[y1 * stride + x0] + t[y0 * stride + x0]
        };

        let r = window_radius as usize;
        let mut std = Vec::with_capacity(wu * hu);
        let mut hot = Vec::new();
        for y in 0..hu {
            let y0 = y.saturating_sub(r);
            let y1 = (y + r + 1).min(hu);
            for x in 0..wu {
                let x0 = x.saturating_sub(r);
                let x1 = (x + r + 1).min(wu);
                let n = ((x1 - x0) * (y1 - y0)) as f64;
                let mean = rect(&sum, x0, y0, x1, y1) / n;
                let var = rect(&sum_sq, x0, y0, x1, y1) / n - mean * mean;
                let s = var.max(0.0).sqrt() as f32;
                if s >= threshold {
                    hot.push((x as i32, y as i32));
                }
                std.push(s);
            }
        }

        log::debug!(
            "contrast map: {} of {} pixels at or above std-dev {threshold}",
            hot.len(),
            wu * hu
        );
        Self { width: w, height: h, std, hot }
    }

    /// true when no pixel passed the threshold
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hot.is_empty()
    }

    #[inline]
    pub fn hot_points(&self) -> &[Point] {
        &self.hot
    }

    #[inline]
    pub fn std_at(&self, x: u32, y: u32) -> f32 {
        self.std[(y * self.width + x) as usize]
    }

    /// place a shape on a random high-contrast point. sharper regions get smaller
    /// shapes; the color is the target's mean inside the shape's bbox.
    /// must not be called on an empty map.
    pub fn sample_shape<R: Rng + ?Sized>(&self, rng: &mut R, space: &ShapeSpace, target: &Raster) -> Shape {
        profiling::scope!("sample_shape");
        debug_assert!(!self.hot.is_empty());
        debug_assert_eq!(target.dimensions(), (self.width, self.height));

        let (cx, cy) = self.hot[rng.random_range(0..self.hot.len())];
        let s = self.std_at(cx as u32, cy as u32);
        let extent = (space.max_radius as f32 * CONTRAST_SCALE / (CONTRAST_SCALE + s))
            .round()
            .clamp(space.min_radius as f32, space.max_radius as f32) as i32;
        let alpha = rng.random_range(space.alpha_min..=space.alpha_max);

        let mut shape = if rng.random_bool(space.p_circle) {
            Shape::Circle { center: (cx, cy), radius: extent, color: [0, 0, 0, alpha] }
        } else {
            // three vertices spread around the center, 50-100% of the extent away
            let base = rng.random::<f32>() * std::f32::consts::TAU;
            let mut vertices = [(0, 0); 3];
            for (i, v) in vertices.iter_mut().enumerate() {
                let angle = base + i as f32 * std::f32::consts::TAU / 3.0;
                let dist = extent as f32 * (0.5 + rng.random::<f32>() * 0.5);
                *v = (
                    (cx as f32 + angle.cos() * dist).round() as i32,
                    (cy as f32 + angle.sin() * dist).round() as i32,
                );
            }
            Shape::Triangle { vertices, color: [0, 0, 0, alpha] }
        };
        shape.clamp(space);

        let rgb = mean_color(target, shape.bounds(space.canvas_size));
        let color = shape.color_mut();
        color[..3].copy_from_slice(&rgb);
        shape
    }
}
