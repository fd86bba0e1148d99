//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer: a camera casts jittered rays, a BVH finds the
//! nearest surface, and each surface's material decides whether the ray is
//! absorbed or scattered onward. Colors multiply along the path until the
//! ray escapes to the sky gradient or the bounce budget runs out.

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod planar;
mod random;
mod renderer;
mod sphere;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::{Camera, CameraConfig};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use planar::{Ellipse, Parallelogram, Planar, PlanarRegion, Quad, Triangle};
pub use random::{gen_f32, random_in_unit_disk, random_unit_vector, seeded_rng};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render, sample_color, sky_gradient, ImageBuffer,
    SHADOW_ACNE_EPSILON,
};
pub use sphere::Sphere;

/// Re-export the math and texture types callers need to build scenes
pub use lumen_core::{CheckerTexture, ImageTexture, SolidColor, Texture};
pub use lumen_math::{Aabb, Color, Interval, Ray, Vec3};
