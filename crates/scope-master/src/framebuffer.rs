//! Owned pixel buffer the controller draws into.

use scope_engine::RasterSurface;

/// A `width` × `height` buffer of `0xAARRGGBB` pixels, rows packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, fill: u32) -> Self {
        Self {
            pixels: vec![fill; width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Borrow as a drawing surface.
    pub fn surface(&mut self) -> RasterSurface<'_> {
        let (w, h) = (self.width as usize, self.height as usize);
        RasterSurface::new(&mut self.pixels, w, h, w)
    }

    /// Pixels as packed 8-bit RGBA.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &px in &self.pixels {
            let [a, r, g, b] = px.to_be_bytes();
            out.extend_from_slice(&[r, g, b, a]);
        }
        out
    }
}
