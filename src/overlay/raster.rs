//! PNG raster boundary

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};

use crate::error::Result;
use crate::types::Dimensions;

/// Decoded RGBA raster
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    /// Decodes PNG bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        Ok(Self {
            pixels: image.to_rgba8(),
        })
    }

    /// Raster of a single colour
    pub fn filled(dims: Dimensions, color: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(dims.width, dims.height, color),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Colour at (x, y), or `None` off the raster
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.pixels.width() && y < self.pixels.height() {
            Some(*self.pixels.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Copy of the pixel buffer to draw on
    pub(crate) fn canvas(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Encodes as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.pixels)
    }
}

pub(crate) fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        pixels.as_raw(),
        pixels.width(),
        pixels.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_round_trip_keeps_pixels() {
        let mut raster = RasterImage::filled(Dimensions::new(4, 3), Rgba([10, 20, 30, 255]));
        raster.pixels.put_pixel(2, 1, Rgba([200, 100, 50, 255]));

        let decoded = RasterImage::decode(&raster.encode_png().unwrap()).unwrap();
        assert_eq!(decoded.dimensions(), Dimensions::new(4, 3));
        assert_eq!(decoded.pixel(2, 1), Some(Rgba([200, 100, 50, 255])));
        assert_eq!(decoded.pixel(0, 0), Some(Rgba([10, 20, 30, 255])));
        assert_eq!(decoded.pixel(4, 0), None);
    }

    #[test]
    fn test_rejects_non_png() {
        assert!(RasterImage::decode(b"definitely not a png").is_err());
    }
}
