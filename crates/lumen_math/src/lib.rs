//! Numeric primitives shared by the Lumen crates.
//!
//! `Vec3` comes straight from glam; everything else here is the small set of
//! value types the renderer core builds on: ranges of ray parameters,
//! axis-aligned boxes and rays.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vector::{near_zero, reflect, refract};

/// Linear RGB color. Components are nominally in [0, 1] but may exceed it.
pub type Color = Vec3;
