//! Lumen Core - surface color lookup for the renderer.
//!
//! This crate provides:
//!
//! - **Texture capability**: the `Texture` trait, queried with surface
//!   coordinates `(u, v)` and the hit point
//! - **Implementations**: solid colors, a 3D checker, and image-backed
//!   textures decoded with the `image` crate
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{CheckerTexture, ImageTexture, Texture};
//!
//! let checker = CheckerTexture::from_colors(0.32, Color::new(0.2, 0.3, 0.1), Color::splat(0.9));
//! let earth = ImageTexture::load("earthmap.jpg")?;
//! let c = earth.value(0.5, 0.5, Vec3::ZERO);
//! ```

pub mod texture;

// Re-export commonly used types
pub use texture::{
    CheckerTexture, ImageTexture, SolidColor, Texture, TextureError, TextureResult,
};
