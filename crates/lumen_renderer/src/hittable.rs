//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::{BvhNode, Material, Ray, ScatterResult};
use lumen_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Placeholder material for `HitRecord::default()`. Absorbs everything.
struct DummyMaterial;

impl Material for DummyMaterial {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        None
    }
}

static DUMMY_MATERIAL: DummyMaterial = DummyMaterial;

/// Record of a ray-object intersection.
///
/// Lives on the stack of whoever issued the query and is overwritten by each
/// successful candidate test.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Surface parametric coordinates
    pub u: f32,
    pub v: f32,
    /// Ray parameter of the intersection
    pub t: f32,
    /// True if the ray arrived from the outside of the surface
    pub front_face: bool,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &DUMMY_MATERIAL,
            u: 0.0,
            v: 0.0,
            t: 0.0,
            front_face: false,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Orient the stored normal against the ray.
    ///
    /// `outward_normal` must be unit length. A ray travelling along the
    /// outward normal (dot >= 0) started inside the surface: the normal is
    /// flipped and `front_face` cleared.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        if ray.direction().dot(outward_normal) >= 0.0 {
            self.normal = -outward_normal;
            self.front_face = false;
        } else {
            self.normal = outward_normal;
            self.front_face = true;
        }
    }
}

/// Anything a ray can be tested against.
///
/// Lists and BVH nodes are hittables themselves, so scenes compose
/// recursively.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object for some `t` strictly inside `ray_t`.
    ///
    /// Returns true on a hit and fills in `rec`; `rec` is left untouched
    /// on a miss.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Nearest hit in `ray_t`, if any.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut rec = HitRecord::default();
        if self.hit(ray, ray_t, &mut rec) {
            Some(rec)
        } else {
            None
        }
    }
}

/// Unordered collection of hittables, searched linearly.
#[derive(Clone)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add<H: Hittable + 'static>(&mut self, object: H) {
        self.add_shared(Arc::new(object));
    }

    /// Add an object that may also be referenced elsewhere.
    pub fn add_shared(&mut self, object: Arc<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Remove and return the object at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Arc<dyn Hittable>> {
        if index >= self.objects.len() {
            return None;
        }
        let removed = self.objects.remove(index);
        self.bbox = self
            .objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));
        Some(removed)
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Consume the list and build a BVH over its members.
    pub fn into_bvh(self) -> BvhNode {
        BvhNode::new(self.objects)
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if object.hit(ray, ray_t.with_max(closest_so_far), rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    /// Union of every member's box; `Aabb::EMPTY` for an empty list.
    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
