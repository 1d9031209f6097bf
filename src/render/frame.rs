use image::{Rgb, RgbImage};

/// One video frame, an RGB24 raster the layer chain paints into
///
/// Every frame starts black; layers composite on top of each other with
/// either alpha-over or additive blending, and the end-of-track fade is a
/// plain scalar multiply over the whole raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Create a black frame at the given resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.image.put_pixel(x, y, Rgb(color));
    }

    /// Alpha-composite `color` over the existing pixel
    ///
    /// Out-of-bounds coordinates are silently ignored so drawing code can
    /// rasterize shapes that overhang the frame edge.
    pub fn blend_over(&mut self, x: i32, y: i32, color: [u8; 3], alpha: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for (dst, &src) in pixel.0.iter_mut().zip(&color) {
            *dst = (*dst as f32 * (1.0 - alpha) + src as f32 * alpha).round() as u8;
        }
    }

    /// Additively blend `color` into the existing pixel, saturating at
    /// white; used for glow passes
    pub fn blend_add(&mut self, x: i32, y: i32, color: [u8; 3], alpha: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for (dst, &src) in pixel.0.iter_mut().zip(&color) {
            *dst = dst.saturating_add((src as f32 * alpha).round() as u8);
        }
    }

    /// Scale every channel of every pixel by `multiplier` in [0, 1]
    ///
    /// A multiplier of 0.0 yields an exactly black frame.
    pub fn fade(&mut self, multiplier: f32) {
        let multiplier = multiplier.clamp(0.0, 1.0);
        if multiplier >= 1.0 {
            return;
        }
        if multiplier <= 0.0 {
            for value in self.image.iter_mut() {
                *value = 0;
            }
            return;
        }
        for value in self.image.iter_mut() {
            *value = (*value as f32 * multiplier).round() as u8;
        }
    }

    /// Raw RGB24 bytes, row-major, for piping to the encoder
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    /// Whether every pixel is exactly black
    pub fn is_black(&self) -> bool {
        self.image.iter().all(|&v| v == 0)
    }
}
