//! Texture data and weight-map sampling.

use crate::math::Vec2;

/// Pixel format of a [`CpuTexture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8 bits per channel RGBA, unsigned normalized.
    #[default]
    Rgba8Unorm,
}

impl TextureFormat {
    /// Bytes per pixel.
    pub fn pixel_size(&self) -> usize {
        match self {
            Self::Rgba8Unorm => 4,
        }
    }
}

/// Errors from constructing a texture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureError {
    #[error("texture dimensions {width}x{height} must be non-zero")]
    ZeroSize { width: u32, height: u32 },
    #[error("texture data has {len} bytes, expected {expected} for {width}x{height}")]
    DataLength {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
}

/// RGBA8 pixel data held in CPU memory.
///
/// Rows are stored bottom to top, matching UV space where `v = 0` is the
/// bottom edge.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTexture {
    name: Option<String>,
    width: u32,
    height: u32,
    format: TextureFormat,
    data: Vec<u8>,
}

impl CpuTexture {
    /// Creates a texture from raw RGBA8 bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize { width, height });
        }
        let expected = width as usize * height as usize * TextureFormat::Rgba8Unorm.pixel_size();
        if data.len() != expected {
            return Err(TextureError::DataLength {
                width,
                height,
                len: data.len(),
                expected,
            });
        }
        Ok(Self {
            name: None,
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            data,
        })
    }

    /// A texture filled with one color. Zero dimensions are raised to 1.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pixels = vec![rgba; width as usize * height as usize];
        Self {
            name: None,
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            data: bytemuck::cast_slice(&pixels).to_vec(),
        }
    }

    /// An all-black, fully transparent texture.
    pub fn black(width: u32, height: u32) -> Self {
        Self::solid(width, height, [0, 0, 0, 0])
    }

    /// Set a name for logging.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Raw pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixels as RGBA quadruples.
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    /// Pixel at column `x`, row `y` (row 0 is the bottom).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels()
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Pixel coordinates nearest to `uv`, clamped to the texture.
    ///
    /// Uses `floor(u * width), floor(v * height)`; coordinates outside
    /// `[0, 1]` clamp to the border pixels. An empty axis yields 0.
    pub fn nearest_pixel(&self, uv: &Vec2) -> (u32, u32) {
        let clamp = |t: f32, size: u32| -> u32 {
            let max = size.saturating_sub(1) as f32;
            let p = (t * size as f32).floor();
            if p.is_nan() { 0 } else { p.clamp(0.0, max) as u32 }
        };
        (clamp(uv.x, self.width), clamp(uv.y, self.height))
    }

    /// Green channel at the pixel nearest `uv`, normalized to `[0, 1]`.
    pub fn sample_green_nearest(&self, uv: &Vec2) -> f32 {
        let (x, y) = self.nearest_pixel(uv);
        self.pixel(x, y).map_or(0.0, |p| p[1] as f32 / 255.0)
    }
}

#[cfg(feature = "image")]
impl TryFrom<image::RgbaImage> for CpuTexture {
    type Error = TextureError;

    /// Converts a decoded image. Image rows run top to bottom, so they are
    /// flipped into UV order. Empty images are rejected like in [`CpuTexture::new`].
    fn try_from(img: image::RgbaImage) -> Result<Self, Self::Error> {
        let flipped = image::imageops::flip_vertical(&img);
        let (width, height) = flipped.dimensions();
        Self::new(width, height, flipped.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> CpuTexture {
        // 2x2: bottom row green 0 and 64, top row green 128 and 255
        let data = vec![
            0, 0, 0, 255, 0, 64, 0, 255, //
            0, 128, 0, 255, 0, 255, 0, 255,
        ];
        CpuTexture::new(2, 2, data).unwrap()
    }

    #[test]
    fn new_validates_length() {
        let err = CpuTexture::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, TextureError::DataLength { expected: 16, .. }));
        assert!(matches!(
            CpuTexture::new(0, 4, vec![]),
            Err(TextureError::ZeroSize { .. })
        ));
    }

    #[test]
    fn solid_texture_samples_constant_green() {
        let tex = CpuTexture::solid(16, 8, [10, 51, 200, 255]);
        for uv in [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.5, 0.25),
            Vec2::new(0.999, 0.999),
            Vec2::new(1.0, 1.0),
        ] {
            assert_eq!(tex.sample_green_nearest(&uv), 51.0 / 255.0);
        }
    }

    #[test]
    fn nearest_pixel_uses_floor_and_clamps() {
        let tex = gradient();
        assert_eq!(tex.nearest_pixel(&Vec2::new(0.49, 0.51)), (0, 1));
        assert_eq!(tex.nearest_pixel(&Vec2::new(1.0, 1.0)), (1, 1));
        assert_eq!(tex.nearest_pixel(&Vec2::new(-3.0, 7.0)), (0, 1));
        assert_eq!(tex.nearest_pixel(&Vec2::new(f32::NAN, 0.0)), (0, 0));
    }

    #[test]
    fn v_axis_runs_bottom_to_top() {
        let tex = gradient();
        assert_eq!(tex.sample_green_nearest(&Vec2::new(0.75, 0.1)), 64.0 / 255.0);
        assert_eq!(tex.sample_green_nearest(&Vec2::new(0.75, 0.9)), 1.0);
        assert_eq!(tex.sample_green_nearest(&Vec2::new(0.1, 0.9)), 128.0 / 255.0);
    }

    #[test]
    fn black_texture_is_zero() {
        let tex = CpuTexture::black(4, 4);
        assert_eq!(tex.sample_green_nearest(&Vec2::new(0.3, 0.6)), 0.0);
        assert_eq!(tex.pixels().len(), 16);
    }

    #[test]
    fn empty_texture_samples_zero() {
        let tex = CpuTexture {
            name: None,
            width: 0,
            height: 0,
            format: TextureFormat::Rgba8Unorm,
            data: Vec::new(),
        };
        assert_eq!(tex.nearest_pixel(&Vec2::new(0.5, 0.5)), (0, 0));
        assert_eq!(tex.sample_green_nearest(&Vec2::new(0.5, 0.5)), 0.0);
    }

    #[cfg(feature = "image")]
    #[test]
    fn empty_image_is_rejected() {
        let err = CpuTexture::try_from(image::RgbaImage::new(0, 0)).unwrap_err();
        assert_eq!(err, TextureError::ZeroSize { width: 0, height: 0 });
    }

    #[cfg(feature = "image")]
    #[test]
    fn image_rows_are_flipped() {
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([0, 255, 0, 255]));
        let tex = CpuTexture::try_from(img).unwrap();
        assert_eq!(tex.sample_green_nearest(&Vec2::new(0.5, 0.9)), 1.0);
        assert_eq!(tex.sample_green_nearest(&Vec2::new(0.5, 0.1)), 0.0);
    }
}
