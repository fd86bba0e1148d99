//! Flat primitives: quads, triangles and ellipses.
//!
//! All of them share one plane-intersection routine. The plane is spanned by
//! a corner `q` and two edge vectors `u`, `v`; a hit point is expressed in
//! that basis as `(alpha, beta)` and a `PlanarRegion` decides whether those
//! coordinates fall inside the shape.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray, RenderError, RenderResult,
};
use lumen_math::{Aabb, Interval, Vec3};

/// Rays closer to parallel with the plane than this are treated as misses.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Interior test for a shape drawn on a plane.
pub trait PlanarRegion: Send + Sync {
    /// Given plane coordinates of a hit, return its texture coordinates if
    /// the point is inside the shape.
    fn interior(&self, alpha: f32, beta: f32) -> Option<(f32, f32)>;

    /// Box enclosing the shape spanned by `q`, `u`, `v`.
    fn bounding_box(&self, q: Vec3, u: Vec3, v: Vec3) -> Aabb;
}

/// The parallelogram `q + a*u + b*v` for `a, b` in [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct Parallelogram;

impl PlanarRegion for Parallelogram {
    fn interior(&self, alpha: f32, beta: f32) -> Option<(f32, f32)> {
        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }
        Some((alpha, beta))
    }

    fn bounding_box(&self, q: Vec3, u: Vec3, v: Vec3) -> Aabb {
        let diagonal1 = Aabb::from_points(q, q + u + v);
        let diagonal2 = Aabb::from_points(q + u, q + v);
        Aabb::surrounding(&diagonal1, &diagonal2)
    }
}

/// The triangle with corners `q`, `q + u`, `q + v`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Triangle;

impl PlanarRegion for Triangle {
    fn interior(&self, alpha: f32, beta: f32) -> Option<(f32, f32)> {
        if alpha < 0.0 || beta < 0.0 || alpha + beta > 1.0 {
            return None;
        }
        Some((alpha, beta))
    }

    fn bounding_box(&self, q: Vec3, u: Vec3, v: Vec3) -> Aabb {
        Aabb::surrounding(&Aabb::from_points(q, q + u), &Aabb::from_points(q, q + v))
    }
}

/// The ellipse centered on `q` with semi-axes `u` and `v`.
///
/// Perpendicular axes of equal length give a disc.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ellipse;

impl PlanarRegion for Ellipse {
    fn interior(&self, alpha: f32, beta: f32) -> Option<(f32, f32)> {
        if alpha * alpha + beta * beta >= 1.0 {
            return None;
        }
        Some((alpha / 2.0 + 0.5, beta / 2.0 + 0.5))
    }

    fn bounding_box(&self, q: Vec3, u: Vec3, v: Vec3) -> Aabb {
        let diagonal1 = Aabb::from_points(q - u - v, q + u + v);
        let diagonal2 = Aabb::from_points(q - u + v, q + u - v);
        Aabb::surrounding(&diagonal1, &diagonal2)
    }
}

/// A flat shape on the plane through `q` spanned by `u` and `v`.
pub struct Planar<R: PlanarRegion> {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` with `n = u x v`; maps hit offsets to plane coordinates
    w: Vec3,
    /// Unit plane normal
    normal: Vec3,
    /// Plane constant: `normal . x = d` for every point `x` on the plane
    d: f32,
    region: R,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

/// Parallelogram, the common case.
pub type Quad = Planar<Parallelogram>;

impl<R: PlanarRegion> Planar<R> {
    /// Build a planar shape.
    ///
    /// Fails if `u` and `v` do not span a plane (either is zero-length or
    /// they are parallel).
    pub fn new(
        q: Vec3,
        u: Vec3,
        v: Vec3,
        region: R,
        material: Arc<dyn Material>,
    ) -> RenderResult<Self> {
        let n = u.cross(v);
        let n_len_sq = n.length_squared();
        if !(n_len_sq > PARALLEL_EPSILON * PARALLEL_EPSILON) || !n_len_sq.is_finite() {
            return Err(RenderError::DegenerateGeometry(format!(
                "edges {:?} and {:?} do not span a plane",
                u, v
            )));
        }

        let normal = n.normalize();
        let bbox = region.bounding_box(q, u, v);

        Ok(Self {
            q,
            u,
            v,
            w: n / n_len_sq,
            normal,
            d: normal.dot(q),
            region,
            material,
            bbox,
        })
    }

    /// Unit normal of the plane, on the side `u x v` points to.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Quad {
    /// Parallelogram with corner `q` and edges `u`, `v`.
    pub fn quad(q: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> RenderResult<Self> {
        Self::new(q, u, v, Parallelogram, material)
    }
}

impl Planar<Triangle> {
    /// Triangle with corners `q`, `q + u`, `q + v`.
    pub fn triangle(q: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> RenderResult<Self> {
        Self::new(q, u, v, Triangle, material)
    }
}

impl Planar<Ellipse> {
    /// Disc of `radius` centered at `center`, facing along `normal`.
    pub fn disk(
        center: Vec3,
        normal: Vec3,
        radius: f32,
        material: Arc<dyn Material>,
    ) -> RenderResult<Self> {
        let n = normal.normalize_or_zero();
        let helper = if n.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let u = helper.cross(n).normalize_or_zero() * radius;
        let v = n.cross(u);
        Self::new(center, u, v, Ellipse, material)
    }
}

impl<R: PlanarRegion> Hittable for Planar<R> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let denom = self.normal.dot(ray.direction());

        // Ray is parallel to the plane
        if denom.abs() < PARALLEL_EPSILON {
            return false;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.surrounds(t) {
            return false;
        }

        let intersection = ray.at(t);
        let planar_hitpt = intersection - self.q;
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));

        let Some((u, v)) = self.region.interior(alpha, beta) else {
            return false;
        };

        rec.t = t;
        rec.p = intersection;
        rec.u = u;
        rec.v = v;
        rec.material = self.material.as_ref();
        rec.set_face_normal(ray, self.normal);

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
