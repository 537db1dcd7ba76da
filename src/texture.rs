//! CPU-side RGBA8 texture data.

use std::path::Path;

use image::imageops;

use crate::error::TextureError;
use crate::noise::NoiseField;

/// Tightly packed RGBA8 pixels, row-major from the top row
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TextureData {
    /// Wrap a pixel buffer, checking it holds exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(TextureError::Size {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Grey texture from a noise field
    pub fn from_noise(field: &NoiseField) -> Result<Self, TextureError> {
        Self::new(field.width() as u32, field.height() as u32, field.to_rgba8())
    }

    /// Decode an image file, optionally flipping it so the first row is the bottom.
    pub fn load(path: &Path, flip_vertical: bool) -> Result<Self, TextureError> {
        let mut img = image::open(path)?.to_rgba8();
        if flip_vertical {
            imageops::flip_vertical_in_place(&mut img);
        }
        let (width, height) = img.dimensions();
        log::info!("Loaded texture {} ({width}x{height})", path.display());
        Self::new(width, height, img.into_raw())
    }

    /// Soft round point sprite: white, alpha falling from 1 at the centre to 0 at the rim.
    pub fn radial_sprite(size: u32) -> Result<Self, TextureError> {
        let half = size as f32 / 2.0;
        let mut rgba = Vec::with_capacity(size as usize * size as usize * 4);
        for row in 0..size {
            for col in 0..size {
                let dx = (col as f32 + 0.5 - half) / half;
                let dy = (row as f32 + 0.5 - half) / half;
                let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).max(0.0);
                let alpha = (falloff * falloff * 255.0) as u8;
                rgba.extend_from_slice(&[255, 255, 255, alpha]);
            }
        }
        Self::new(size, size, rgba)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA at `(x, y)`, or `None` outside the texture
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }
}
