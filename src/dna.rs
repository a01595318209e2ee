use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analysis::ContrastMap;
use crate::geom::{clamp_point, BBox, Point};
use crate::raster::Raster;

/// one gene: a translucent triangle or disk. color is un-premultiplied RGBA.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Triangle { vertices: [Point; 3], color: [u8; 4] },
    Circle { center: Point, radius: i32, color: [u8; 4] },
}

/// the space shapes are sampled from and clamped back into
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeSpace {
    pub canvas_size: u32,
    pub min_radius: i32,
    pub max_radius: i32,
    pub alpha_min: u8,
    pub alpha_max: u8,
    pub p_circle: f64,
}

impl ShapeSpace {
    /// initial geometry keeps this far from the canvas edge (5% per side)
    #[inline]
    pub fn margin(&self) -> i32 {
        (self.canvas_size / 20) as i32
    }
}

impl Shape {
    /// uniform random shape inside the canvas margin
    pub fn random<R: Rng + ?Sized>(rng: &mut R, space: &ShapeSpace) -> Shape {
        let lo = space.margin();
        let hi = space.canvas_size as i32 - space.margin();
        let color = [
            rng.random::<u8>(),
            rng.random::<u8>(),
            rng.random::<u8>(),
            rng.random_range(space.alpha_min..=space.alpha_max),
        ];

        if rng.random_bool(space.p_circle) {
            Shape::Circle {
                center: (rng.random_range(lo..hi), rng.random_range(lo..hi)),
                radius: rng.random_range(space.min_radius..=space.max_radius),
                color,
            }
        } else {
            let mut vertices = [(0, 0); 3];
            for v in &mut vertices {
                *v = (rng.random_range(lo..hi), rng.random_range(lo..hi));
            }
            Shape::Triangle { vertices, color }
        }
    }

    #[inline]
    pub fn color(&self) -> [u8; 4] {
        match self {
            Shape::Triangle { color, .. } | Shape::Circle { color, .. } => *color,
        }
    }

    #[inline]
    pub fn color_mut(&mut self) -> &mut [u8; 4] {
        match self {
            Shape::Triangle { color, .. } | Shape::Circle { color, .. } => color,
        }
    }

    /// pixel bounding box, clamped to the canvas
    pub fn bounds(&self, canvas_size: u32) -> BBox {
        match self {
            Shape::Triangle { vertices, .. } => BBox::of_points(vertices, canvas_size),
            Shape::Circle { center, radius, .. } => BBox::of_circle(*center, *radius, canvas_size),
        }
    }

    /// pull every field back into its legal range
    pub fn clamp(&mut self, space: &ShapeSpace) {
        match self {
            Shape::Triangle { vertices, color } => {
                for v in vertices.iter_mut() {
                    *v = clamp_point(*v, space.canvas_size);
                }
                color[3] = color[3].clamp(space.alpha_min, space.alpha_max);
            }
            Shape::Circle { center, radius, color } => {
                *center = clamp_point(*center, space.canvas_size);
                *radius = (*radius).clamp(space.min_radius, space.max_radius);
                color[3] = color[3].clamp(space.alpha_min, space.alpha_max);
            }
        }
    }

    /// true when every field already lies in its legal range
    pub fn is_within(&self, space: &ShapeSpace) -> bool {
        let size = space.canvas_size as i32;
        let in_canvas = |p: &Point| (0..size).contains(&p.0) && (0..size).contains(&p.1);
        let alpha_ok = (space.alpha_min..=space.alpha_max).contains(&self.color()[3]);
        match self {
            Shape::Triangle { vertices, .. } => alpha_ok && vertices.iter().all(in_canvas),
            Shape::Circle { center, radius, .. } => {
                alpha_ok
                    && in_canvas(center)
                    && (space.min_radius..=space.max_radius).contains(radius)
            }
        }
    }
}

// arc wrapper enables copy-on-write: cloning a genome only copies pointers,
// not shapes. mutations go through Arc::make_mut so only touched shapes are cloned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    pub canvas_size: u32,

    #[serde(with = "arc_vec_serde")]
    pub shapes: Vec<Arc<Shape>>,
}

impl Genome {
    pub fn new_blank(canvas_size: u32) -> Self {
        Self { canvas_size, shapes: Vec::new() }
    }

    pub fn from_shapes(canvas_size: u32, shapes: Vec<Shape>) -> Self {
        Self { canvas_size, shapes: shapes.into_iter().map(Arc::new).collect() }
    }

    /// random genome with a shape count uniform in `[min_shapes, seed_shapes]`.
    /// seed_shapes is small on purpose: start simple, let structural mutation grow it.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        space: &ShapeSpace,
        min_shapes: usize,
        seed_shapes: usize,
    ) -> Self {
        profiling::scope!("Genome::random");
        let count = rng.random_range(min_shapes..=seed_shapes.max(min_shapes));
        let shapes = (0..count).map(|_| Arc::new(Shape::random(rng, space))).collect();
        Self { canvas_size: space.canvas_size, shapes }
    }

    /// like `random`, but shapes are placed on high-contrast points of the target
    /// and colored from it. falls back to uniform sampling when the map has no
    /// usable points.
    pub fn seeded<R: Rng + ?Sized>(
        rng: &mut R,
        space: &ShapeSpace,
        min_shapes: usize,
        seed_shapes: usize,
        contrast: &ContrastMap,
        target: &Raster,
    ) -> Self {
        profiling::scope!("Genome::seeded");
        if contrast.is_empty() {
            return Self::random(rng, space, min_shapes, seed_shapes);
        }
        let count = rng.random_range(min_shapes..=seed_shapes.max(min_shapes));
        let shapes = (0..count)
            .map(|_| Arc::new(contrast.sample_shape(rng, space, target)))
            .collect();
        Self { canvas_size: space.canvas_size, shapes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// mutable access to one shape, cloning it first if another genome shares it
    #[inline]
    pub fn shape_mut(&mut self, idx: usize) -> &mut Shape {
        Arc::make_mut(&mut self.shapes[idx])
    }
}

// serde helper for Vec<Arc<T>>: serialize the inner value directly
mod arc_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::sync::Arc;

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S, T>(vec: &Vec<Arc<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(vec.iter().map(|item| &**item))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<Arc<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(items.into_iter().map(Arc::new).collect())
    }
}
