//! Textures: spatially varying surface color.
//!
//! Materials ask a texture for a color at a hit, passing the surface's
//! parametric `(u, v)` coordinates and the hit point. Implementations are
//! immutable once built and shared across render threads.

use std::path::Path;
use std::sync::Arc;

use lumen_math::{Color, Interval, Vec3};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture has no pixels: {0}")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A color lookup over a surface.
pub trait Texture: Send + Sync {
    /// Color at surface coordinates `(u, v)` and world point `p`.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// The same color everywhere.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(Color::new(red, green, blue))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.albedo
    }
}

/// Solid 3D checkerboard.
///
/// Space is cut into cubes of side `scale`; the parity of the cube's integer
/// coordinates picks between the `even` and `odd` textures.
pub struct CheckerTexture {
    inv_scale: f32,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(scale: f32, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    /// Checker alternating between two flat colors.
    pub fn from_colors(scale: f32, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let cell = (self.inv_scale * p).floor();
        let parity = cell.x as i64 + cell.y as i64 + cell.z as i64;

        if parity.rem_euclid(2) == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// Texture backed by a decoded image.
///
/// Lookups are nearest-pixel. `u` runs left to right and `v` bottom to top,
/// both clamped to [0, 1].
#[derive(Clone, Debug)]
pub struct ImageTexture {
    /// Texture width in pixels
    width: u32,

    /// Texture height in pixels
    height: u32,

    /// RGB pixel data, row-major from the top-left, linear 0-1 range
    pixels: Vec<Color>,
}

/// Returned when there is no image data to sample.
const DEBUG_CYAN: Color = Color::new(0.0, 1.0, 1.0);

impl ImageTexture {
    /// Create a texture from row-major pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an image file into a texture.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let texture = Self::from_rgb8(&img.to_rgb8());
        if texture.pixels.is_empty() {
            return Err(TextureError::Empty(path.display().to_string()));
        }

        log::debug!(
            "Loaded texture: {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );

        Ok(texture)
    }

    /// Convert an 8-bit RGB image, scaling each channel by 1/255.
    pub fn from_rgb8(rgb: &image::RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let color_scale = 1.0 / 255.0;
        let pixels = rgb
            .pixels()
            .map(|p| {
                Color::new(
                    color_scale * p[0] as f32,
                    color_scale * p[1] as f32,
                    color_scale * p[2] as f32,
                )
            })
            .collect();

        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .unwrap_or(DEBUG_CYAN)
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        if self.height == 0 || self.width == 0 {
            return DEBUG_CYAN;
        }

        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        // Flip V to image coordinates
        let v = 1.0 - unit.clamp(v);

        let i = (u * self.width as f32) as u32;
        let j = (v * self.height as f32) as u32;
        self.pixel(i, j)
    }
}
