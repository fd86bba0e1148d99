//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a bounce limit
//! - Anti-aliasing via multi-sampling
//! - Parallel bucket rendering

use std::time::Instant;

use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::{Camera, Color, Hittable, Ray};
use lumen_math::Interval;
use rand::RngCore;

/// Lower bound of every scene query.
///
/// Scattered rays start exactly on a surface; rounding can put that origin
/// a hair below it, and without this bound the ray would hit its own
/// starting surface.
pub const SHADOW_ACNE_EPSILON: f32 = 0.001;

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and multiplying in each material's
/// attenuation until the ray escapes to the sky, is absorbed, or runs out
/// of bounces. Bounces are followed in a loop, so the stack stays flat for
/// any `depth`.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    let mut throughput = Color::ONE;
    let mut current = *ray;
    let forward = Interval::new(SHADOW_ACNE_EPSILON, f32::INFINITY);

    for _ in 0..depth {
        let Some(rec) = world.intersect(&current, forward) else {
            return throughput * sky_gradient(&current);
        };

        match rec.material.scatter(&current, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                current = result.scattered;
            }
            // Ray was absorbed
            None => return Color::ZERO,
        }
    }

    // Out of bounces: no light
    Color::ZERO
}

/// Background: white at the horizon blending to light blue overhead.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Average `samples_per_pixel` path samples through pixel (i, j).
///
/// Returns linear-space RGB.
pub fn sample_color(
    camera: &Camera,
    world: &dyn Hittable,
    i: u32,
    j: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel() {
        let ray = camera.get_ray(i, j, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth(), rng);
    }

    pixel_color * camera.samples_scale()
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let unit = Interval::new(0.0, 0.999);
    let r = (256.0 * unit.clamp(linear_to_gamma(color.x))) as u8;
    let g = (256.0 * unit.clamp(linear_to_gamma(color.y))) as u8;
    let b = (256.0 * unit.clamp(linear_to_gamma(color.z))) as u8;
    [r, g, b]
}

/// Linear-space image, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y), or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Set the pixel at (x, y). Writes outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        if let Some(pixel) = self.pixels.get_mut(y as usize * self.width as usize + x as usize) {
            *pixel = color;
        }
    }

    /// Copy a finished bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (k, color) in result.pixels.iter().enumerate() {
            let local_x = k as u32 % bucket.width;
            let local_y = k as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Gamma-corrected 8-bit RGB bytes, for display or saving.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }
}

/// Render the entire scene to an image buffer.
///
/// Buckets are rendered in parallel, each with its own generator seeded
/// from the camera's seed and the bucket position, so the result depends
/// only on the seed and not on scheduling.
pub fn render(camera: &Camera, world: &dyn Hittable) -> ImageBuffer {
    let width = camera.image_width();
    let height = camera.image_height();
    let buckets = generate_buckets(width, height, DEFAULT_BUCKET_SIZE);

    log::info!(
        "Rendering {}x{} at {} spp, max depth {} ({} buckets)",
        width,
        height,
        camera.samples_per_pixel(),
        camera.max_depth(),
        buckets.len()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| BucketResult::new(*bucket, render_bucket(bucket, camera, world)))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());

    image
}
