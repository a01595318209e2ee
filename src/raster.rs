use crate::error::{EvolveError, EvolveResult};

/// an RGBA8 pixel grid, row-major, 4 bytes per pixel.
/// used both for the caller's target and for rendered canvases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// wrap an RGBA buffer. pixels with partial alpha are premultiplied, which is
    /// the same as compositing them over the black canvas background.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> EvolveResult<Self> {
        check_len(width, height, rgba.len(), 4)?;
        let data = if rgba.chunks_exact(4).all(|p| p[3] == 255) {
            rgba
        } else {
            premultiply(&rgba)
        };
        Ok(Self { width, height, data })
    }

    /// wrap an RGB buffer (3 bytes per pixel), treated as fully opaque
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> EvolveResult<Self> {
        check_len(width, height, rgb.len(), 3)?;
        let mut data = Vec::with_capacity(rgb.len() / 3 * 4);
        for p in rgb.chunks_exact(3) {
            data.extend_from_slice(&[p[0], p[1], p[2], 255]);
        }
        Ok(Self { width, height, data })
    }

    /// solid opaque fill
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let px = [rgb[0], rgb[1], rgb[2], 255];
        let data = px.iter().copied().cycle().take(width as usize * height as usize * 4).collect();
        Self { width, height, data }
    }

    /// used by the renderer, which already produces premultiplied opaque pixels
    pub(crate) fn from_premul_unchecked(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 4);
        Self { width, height, data }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// raw RGBA bytes
    #[inline]
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of a single pixel. panics when out of bounds, like slice indexing.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// drop the alpha channel, for hosts that write RGB frames
    pub fn to_rgb(&self) -> Vec<u8> {
        self.data.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect()
    }
}

fn check_len(width: u32, height: u32, len: usize, channels: usize) -> EvolveResult<()> {
    if width == 0 || height == 0 {
        return Err(EvolveError::InvalidRaster(format!(
            "dimensions must be non-zero, got {width}x{height}"
        )));
    }
    let expected = width as usize * height as usize * channels;
    if len != expected {
        return Err(EvolveError::InvalidRaster(format!(
            "{width}x{height} needs {expected} bytes, got {len}"
        )));
    }
    Ok(())
}

/// premultiply RGBA - scalar loop, the compiler auto-vectorizes it
#[inline(always)]
pub fn premultiply(p: &[u8]) -> Vec<u8> {
    profiling::scope!("premultiply");

    let mut out = vec![0u8; p.len()];
    for (src, dst) in p.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
        let a = src[3] as u16;
        // (x * a + 127) / 255 is a fast rounded divide-by-255
        dst[0] = ((src[0] as u16 * a + 127) / 255) as u8;
        dst[1] = ((src[1] as u16 * a + 127) / 255) as u8;
        dst[2] = ((src[2] as u16 * a + 127) / 255) as u8;
        dst[3] = a as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_expands_alpha() {
        let r = Raster::from_rgb(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(r.as_rgba(), &[1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(r.to_rgb(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_translucent_target_is_premultiplied() {
        let r = Raster::from_rgba(1, 1, vec![200, 100, 0, 128]).unwrap();
        assert_eq!(r.pixel(0, 0), [100, 50, 0, 128]);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(matches!(
            Raster::from_rgba(2, 2, vec![0; 15]),
            Err(EvolveError::InvalidRaster(_))
        ));
        assert!(matches!(Raster::from_rgb(0, 2, &[]), Err(EvolveError::InvalidRaster(_))));
    }

    #[test]
    fn test_solid_fill() {
        let r = Raster::solid(3, 2, [128, 128, 128]);
        assert_eq!(r.pixel_count(), 6);
        assert_eq!(r.pixel(2, 1), [128, 128, 128, 255]);
    }
}
