// integer geometry helpers for shape genes
//
// all coordinates are canvas pixels. every helper here is pure and keeps
// results inside the canvas so callers can index rasters directly.

/// a point on the canvas
pub type Point = (i32, i32);

/// twice the signed area of a triangle (shoelace formula).
/// positive for CCW, negative for CW, zero for degenerate.
#[inline]
pub fn signed_area2(pts: &[Point; 3]) -> i64 {
    let (ax, ay) = (pts[0].0 as i64, pts[0].1 as i64);
    let (bx, by) = (pts[1].0 as i64, pts[1].1 as i64);
    let (cx, cy) = (pts[2].0 as i64, pts[2].1 as i64);
    (bx - ax) * (cy - ay) - (cx - ax) * (by - ay)
}

/// clamp a coordinate into `[0, size)`
#[inline]
pub fn clamp_coord(v: i32, size: u32) -> i32 {
    v.clamp(0, size as i32 - 1)
}

/// clamp a point into the canvas
#[inline]
pub fn clamp_point(p: Point, size: u32) -> Point {
    (clamp_coord(p.0, size), clamp_coord(p.1, size))
}

/// inclusive pixel rectangle, always inside the canvas it was built for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BBox {
    /// bbox of a set of points, clamped to a `size`×`size` canvas
    pub fn of_points(pts: &[Point], size: u32) -> BBox {
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for &(x, y) in pts {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        BBox {
            x0: clamp_coord(min_x, size) as u32,
            y0: clamp_coord(min_y, size) as u32,
            x1: clamp_coord(max_x, size) as u32,
            y1: clamp_coord(max_y, size) as u32,
        }
    }

    /// bbox of a disk, clamped to the canvas
    pub fn of_circle(center: Point, radius: i32, size: u32) -> BBox {
        let r = radius.max(0);
        BBox::of_points(
            &[(center.0.saturating_sub(r), center.1.saturating_sub(r)),
              (center.0.saturating_add(r), center.1.saturating_add(r))],
            size,
        )
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.x1 - self.x0 + 1) as usize * (self.y1 - self.y0 + 1) as usize
    }
}
