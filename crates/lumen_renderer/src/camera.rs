//! Camera for ray generation.

use serde::{Deserialize, Serialize};

use crate::random::{gen_f32, random_in_unit_disk, sample_square};
use crate::{Ray, RenderError, RenderResult};
use lumen_math::{near_zero, Vec3};
use rand::RngCore;

/// Everything a render needs to know besides the scene.
///
/// Plain data so drivers can build it in code or load it from JSON. Missing
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Image width over height
    pub aspect_ratio: f32,
    /// Image width in pixels
    pub image_width: u32,
    /// Random samples averaged per pixel
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces
    pub max_depth: u32,

    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Eye position
    pub look_from: Vec3,
    /// Point the camera looks at
    pub look_at: Vec3,
    /// Camera-relative "up" direction
    pub vup: Vec3,

    /// Variation angle of rays through each pixel, in degrees (0 = pinhole)
    pub defocus_angle: f32,
    /// Distance from the eye to the plane of perfect focus
    pub focus_dist: f32,

    /// Seed for every random stream of the render
    pub seed: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            vfov: 90.0,
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            seed: 0,
        }
    }
}

impl CameraConfig {
    /// Set image width and aspect ratio.
    pub fn with_resolution(mut self, image_width: u32, aspect_ratio: f32) -> Self {
        self.image_width = image_width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Image height derived from width and aspect ratio, at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    /// Check that the settings describe a usable camera.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));

        if self.image_width == 0 {
            return invalid("image width must be at least 1".into());
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples per pixel must be at least 1".into());
        }
        if !(self.aspect_ratio > 0.0 && self.aspect_ratio.is_finite()) {
            return invalid(format!("aspect ratio must be positive, got {}", self.aspect_ratio));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return invalid(format!("vertical fov must be in (0, 180) degrees, got {}", self.vfov));
        }
        if !(self.defocus_angle >= 0.0 && self.defocus_angle < 180.0) {
            return invalid(format!(
                "defocus angle must be in [0, 180) degrees, got {}",
                self.defocus_angle
            ));
        }
        if !(self.focus_dist > 0.0 && self.focus_dist.is_finite()) {
            return invalid(format!("focus distance must be positive, got {}", self.focus_dist));
        }
        if !(self.look_from.is_finite() && self.look_at.is_finite() && self.vup.is_finite()) {
            return invalid("camera position must be finite".into());
        }

        let view = self.look_from - self.look_at;
        if near_zero(view) {
            return invalid(format!("look_from and look_at coincide at {:?}", self.look_from));
        }
        if near_zero(self.vup.cross(view.normalize())) {
            return invalid(format!("up vector {:?} is parallel to the view direction", self.vup));
        }

        Ok(())
    }
}

/// Camera for generating rays into the scene.
///
/// All derived quantities are computed once in `new` and never change.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    image_height: u32,
    samples_scale: f32,

    /// Eye position
    center: Vec3,
    /// Location of pixel (0, 0)
    pixel00_loc: Vec3,
    /// Offset to the pixel to the right
    pixel_delta_u: Vec3,
    /// Offset to the pixel below
    pixel_delta_v: Vec3,

    // Camera frame basis vectors; w points from the target back to the eye
    u: Vec3,
    v: Vec3,
    w: Vec3,

    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Validate the configuration and derive the viewing geometry.
    pub fn new(config: CameraConfig) -> RenderResult<Self> {
        config.validate()?;

        let image_width = config.image_width;
        let image_height = config.image_height();
        let center = config.look_from;

        // Calculate viewport dimensions from the real pixel ratio
        let theta = config.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        // Calculate camera basis vectors
        let w = (config.look_from - config.look_at).normalize();
        let u = config.vup.cross(w).normalize();
        let v = w.cross(u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        // Calculate pixel delta vectors
        let pixel_delta_u = viewport_u / image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left =
            center - config.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = config.focus_dist * (config.defocus_angle / 2.0).to_radians().tan();

        Ok(Self {
            samples_scale: 1.0 / config.samples_per_pixel as f32,
            image_height,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
            config,
        })
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    ///
    /// The ray passes through a random point inside the pixel, starts on the
    /// defocus disk (or the eye for a pinhole camera) and carries a random
    /// time in [0, 1) for motion blur.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.config.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = gen_f32(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn image_width(&self) -> u32 {
        self.config.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.config.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.config.max_depth
    }

    /// Get the samples scale factor (1 / samples_per_pixel).
    pub fn samples_scale(&self) -> f32 {
        self.samples_scale
    }

    /// Eye position.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Camera frame `(u, v, w)`: right, up, and backwards from the view
    /// direction.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;

    #[test]
    fn test_default_config_is_valid() {
        let config = CameraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.image_height(), 100);
    }

    #[test]
    fn test_image_height_derivation() {
        let config = CameraConfig::default().with_resolution(400, 16.0 / 9.0);
        assert_eq!(config.image_height(), 225);

        // Very wide images still get one row
        let config = CameraConfig::default().with_resolution(10, 100.0);
        assert_eq!(config.image_height(), 1);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let base = CameraConfig::default();
        let cases = [
            base.clone().with_resolution(0, 1.0),
            base.clone().with_resolution(100, 0.0),
            base.clone().with_resolution(100, -2.0),
            base.clone().with_quality(0, 10),
            base.clone().with_lens(0.0, 0.0, 1.0),
            base.clone().with_lens(180.0, 0.0, 1.0),
            base.clone().with_lens(90.0, -1.0, 1.0),
            base.clone().with_lens(90.0, 0.0, 0.0),
            base.clone().with_lens(90.0, 0.0, f32::NAN),
            base.clone().with_position(Vec3::ONE, Vec3::ONE, Vec3::Y),
            base.clone().with_position(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), Vec3::Y),
            base.clone().with_position(Vec3::new(f32::INFINITY, 0.0, 0.0), Vec3::ZERO, Vec3::Y),
        ];

        for config in cases {
            assert!(
                matches!(Camera::new(config.clone()), Err(RenderError::InvalidConfig(_))),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn test_zero_max_depth_is_allowed() {
        assert!(Camera::new(CameraConfig::default().with_quality(1, 0)).is_ok());
    }

    #[test]
    fn test_camera_basis() {
        let camera = Camera::new(
            CameraConfig::default()
                .with_resolution(800, 4.0 / 3.0)
                .with_position(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
                .with_lens(90.0, 0.0, 1.0),
        )
        .unwrap();

        assert_eq!(camera.center(), Vec3::ZERO);
        assert_eq!(camera.image_width(), 800);
        assert_eq!(camera.image_height(), 600);

        let (u, v, w) = camera.basis();
        assert!((w - Vec3::Z).length() < 0.001);
        assert!((u - Vec3::X).length() < 0.001);
        assert!((v - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_camera_ray_direction() {
        let camera = Camera::new(CameraConfig::default().with_lens(90.0, 0.0, 1.0)).unwrap();
        let mut rng = seeded_rng(42, 0);

        // Center ray should point roughly towards -Z
        let ray = camera.get_ray(50, 50, &mut rng);
        let dir = ray.direction().normalize();
        assert!(dir.z < -0.99);
        assert_eq!(ray.origin(), Vec3::ZERO);

        // Top-left pixel looks up and to the left
        let ray = camera.get_ray(0, 0, &mut rng);
        assert!(ray.direction().x < 0.0);
        assert!(ray.direction().y > 0.0);

        // Bottom-right pixel looks down and to the right
        let ray = camera.get_ray(99, 99, &mut rng);
        assert!(ray.direction().x > 0.0);
        assert!(ray.direction().y < 0.0);
    }

    #[test]
    fn test_ray_time_in_shutter_interval() {
        let camera = Camera::new(CameraConfig::default()).unwrap();
        let mut rng = seeded_rng(1, 0);

        for _ in 0..200 {
            let t = camera.get_ray(10, 20, &mut rng).time();
            assert!((0.0..1.0).contains(&t));
        }
    }

    #[test]
    fn test_defocus_disk_origins() {
        let focus_dist = 4.0;
        let angle: f32 = 10.0;
        let camera = Camera::new(
            CameraConfig::default()
                .with_position(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y)
                .with_lens(40.0, angle, focus_dist),
        )
        .unwrap();
        let radius = focus_dist * (angle / 2.0).to_radians().tan();
        let mut rng = seeded_rng(3, 0);

        let mut moved = false;
        for _ in 0..200 {
            let origin = camera.get_ray(50, 50, &mut rng).origin();
            let offset = origin - camera.center();
            // Disk lies in the image plane
            assert!(offset.z.abs() < 1e-5);
            assert!(offset.length() <= radius + 1e-5);
            moved |= offset.length() > 1e-3;
        }
        assert!(moved);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "image_width": 64,
            "aspect_ratio": 2.0,
            "look_from": [0.0, 1.0, 3.0],
            "seed": 7
        }"#;
        let config: CameraConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.image_width, 64);
        assert_eq!(config.image_height(), 32);
        assert_eq!(config.look_from, Vec3::new(0.0, 1.0, 3.0));
        assert_eq!(config.seed, 7);
        // Unlisted fields fall back to defaults
        assert_eq!(config.samples_per_pixel, 10);
        assert_eq!(config.vup, Vec3::Y);

        let text = serde_json::to_string(&config).unwrap();
        let back: CameraConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
