use std::cell::RefCell;
use tiny_skia as sk;

use crate::dna::{Genome, Shape};
use crate::error::{EvolveError, EvolveResult};
use crate::geom::signed_area2;
use crate::raster::Raster;

// scratch pixmap reused across calls to avoid allocations.
// one per thread, so parallel evaluation never contends on it.
thread_local! {
    static SCRATCH_PIX: RefCell<Option<sk::Pixmap>> = const { RefCell::new(None) };
}

pub struct CpuRenderer;

impl CpuRenderer {
    /// full-frame render: opaque black background, shapes composited in genome
    /// order with source-over blending, no anti-aliasing.
    /// deterministic: the same genome always produces the same bytes.
    pub fn render(genome: &Genome) -> EvolveResult<Raster> {
        profiling::scope!("CpuRenderer::render");
        let size = genome.canvas_size;

        SCRATCH_PIX.with(|cell| {
            let mut slot = cell.borrow_mut();
            let reuse = matches!(slot.as_ref(), Some(pm) if pm.width() == size && pm.height() == size);
            if !reuse {
                *slot = Some(sk::Pixmap::new(size, size).ok_or_else(|| {
                    EvolveError::InvalidRaster(format!("cannot allocate a {size}x{size} canvas"))
                })?);
            }
            let Some(pix) = slot.as_mut() else {
                return Err(EvolveError::InvalidRaster("scratch canvas missing".to_string()));
            };

            pix.fill(sk::Color::BLACK);
            for shape in &genome.shapes {
                draw_shape(pix, shape);
            }

            // background is opaque, so premultiplied bytes equal straight RGBA
            Ok(Raster::from_premul_unchecked(size, size, pix.data().to_vec()))
        })
    }
}

/// free-function form of `CpuRenderer::render`
#[inline]
pub fn render(genome: &Genome) -> EvolveResult<Raster> {
    CpuRenderer::render(genome)
}

fn draw_shape(pix: &mut sk::Pixmap, shape: &Shape) {
    profiling::scope!("draw_shape");

    // integer coordinates address pixels; +0.5 puts them on pixel centers
    let path = match shape {
        Shape::Triangle { vertices, .. } => {
            if signed_area2(vertices) == 0 {
                return; // degenerate: covers nothing
            }
            let mut pb = sk::PathBuilder::new();
            pb.move_to(vertices[0].0 as f32 + 0.5, vertices[0].1 as f32 + 0.5);
            pb.line_to(vertices[1].0 as f32 + 0.5, vertices[1].1 as f32 + 0.5);
            pb.line_to(vertices[2].0 as f32 + 0.5, vertices[2].1 as f32 + 0.5);
            pb.close();
            pb.finish()
        }
        Shape::Circle { center, radius, .. } => {
            if *radius <= 0 {
                return;
            }
            sk::PathBuilder::from_circle(center.0 as f32 + 0.5, center.1 as f32 + 0.5, *radius as f32)
        }
    };
    let Some(path) = path else {
        return;
    };

    let [r, g, b, a] = shape.color();
    let mut paint = sk::Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = false;

    pix.fill_path(&path, &paint, sk::FillRule::Winding, sk::Transform::identity(), None);
}
