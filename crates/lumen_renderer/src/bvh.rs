//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over the scene's primitives. Each branch caches the union
//! box of everything below it, so a query skips whole subtrees the ray
//! cannot reach.

use std::sync::Arc;

use crate::{HitRecord, Hittable, HittableList, Ray};
use lumen_math::{Aabb, Interval};

/// BVH node - a branch with two children or a single primitive.
///
/// A range holding one primitive becomes a `Leaf` rather than a branch whose
/// children both point at it, so the query path never visits a primitive
/// twice.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// A single primitive (which may itself be a list or another BVH).
    Leaf(Arc<dyn Hittable>),
    /// Tree over an empty scene.
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    pub fn new(objects: Vec<Arc<dyn Hittable>>) -> Self {
        let count = objects.len();
        let root = Self::build(objects);

        log::debug!(
            "BVH built: {} primitives, {} nodes, depth {}",
            count,
            root.node_count(),
            root.depth()
        );

        root
    }

    /// Build over a snapshot of the list's current members.
    ///
    /// The list stays usable; later edits to it do not affect the tree.
    pub fn from_list(list: &HittableList) -> Self {
        Self::new(list.objects().to_vec())
    }

    /// Recursive construction.
    ///
    /// Sort by box minimum on the longest axis of the union box, split at
    /// the midpoint, recurse. Two objects are split without sorting.
    fn build(mut objects: Vec<Arc<dyn Hittable>>) -> Self {
        let n = objects.len();
        if n <= 1 {
            return objects.pop().map_or(BvhNode::Empty, BvhNode::Leaf);
        }

        let bbox = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));

        if n > 2 {
            let axis = bbox.longest_axis();
            objects.sort_unstable_by(|a, b| {
                let a_min = a.bounding_box().axis_interval(axis).min;
                let b_min = b.bounding_box().axis_interval(axis).min;
                a_min.partial_cmp(&b_min).unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let mid = n / 2;
        let right_objects = objects.split_off(mid);
        let left_objects = objects;

        BvhNode::Branch {
            left: Box::new(Self::build(left_objects)),
            right: Box::new(Self::build(right_objects)),
            bbox,
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf(_) => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Length of the longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf(_) => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            BvhNode::Empty => false,

            BvhNode::Leaf(object) => object.hit(ray, ray_t, rec),

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = left.hit(ray, ray_t, rec);

                // Only check right up to closest hit
                let right_t = if hit_left { ray_t.with_max(rec.t) } else { ray_t };
                let hit_right = right.hit(ray, right_t, rec);

                hit_left || hit_right
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf(object) => object.bounding_box(),
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{gen_range, random_unit_vector, seeded_rng};
    use crate::{Lambertian, Material, Quad, Sphere};
    use lumen_math::{Color, Vec3};
    use rand::seq::SliceRandom;
    use rand::RngCore;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::splat(0.5)))
    }

    fn forward() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    fn random_point(rng: &mut dyn RngCore, extent: f32) -> Vec3 {
        Vec3::new(
            gen_range(rng, -extent, extent),
            gen_range(rng, -extent, extent),
            gen_range(rng, -extent, extent),
        )
    }

    /// Mix of spheres, moving spheres and quads scattered through a cube.
    fn random_scene(seed: u64, count: usize) -> Vec<Arc<dyn Hittable>> {
        let mut rng = seeded_rng(seed, 0);
        let mat = gray();

        (0..count)
            .map(|i| {
                let center = random_point(&mut rng, 10.0);
                let object: Arc<dyn Hittable> = match i % 3 {
                    0 => Arc::new(Sphere::new(center, gen_range(&mut rng, 0.2, 1.5), mat.clone())),
                    1 => Arc::new(Sphere::moving(
                        center,
                        center + random_point(&mut rng, 1.0),
                        gen_range(&mut rng, 0.2, 1.0),
                        mat.clone(),
                    )),
                    _ => Arc::new(
                        Quad::quad(
                            center,
                            random_point(&mut rng, 2.0),
                            random_point(&mut rng, 2.0),
                            mat.clone(),
                        )
                        .unwrap(),
                    ),
                };
                object
            })
            .collect()
    }

    fn random_rays(seed: u64, count: usize) -> Vec<Ray> {
        let mut rng = seeded_rng(seed, 1);
        (0..count)
            .map(|_| {
                let origin = random_point(&mut rng, 15.0);
                // Aim roughly at the scene so most rays hit something
                let target = random_point(&mut rng, 5.0);
                let time = gen_range(&mut rng, 0.0, 1.0);
                let dir = (target - origin) + 0.2 * random_unit_vector(&mut rng);
                Ray::new(origin, dir, time)
            })
            .collect()
    }

    fn assert_same_hit(a: Option<HitRecord>, b: Option<HitRecord>) {
        match (a, b) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                assert!((a.t - b.t).abs() < 1e-4, "t differs: {} vs {}", a.t, b.t);
                assert!((a.p - b.p).length() < 1e-3, "p differs: {:?} vs {:?}", a.p, b.p);
            }
            (a, b) => panic!(
                "hit mismatch: {:?} vs {:?}",
                a.map(|r| r.t),
                b.map(|r| r.t)
            ),
        }
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhNode::new(vec![]);
        assert!(matches!(bvh, BvhNode::Empty));
        assert!(bvh.bounding_box().is_empty());

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);
        assert!(bvh.intersect(&ray, Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_bvh_single_sphere_is_leaf() {
        let sphere: Arc<dyn Hittable> =
            Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray()));
        let bvh = BvhNode::new(vec![sphere.clone()]);

        assert!(matches!(bvh, BvhNode::Leaf(_)));
        assert_eq!(bvh.node_count(), 1);
        // Leaf shares the primitive, nothing is duplicated
        assert_eq!(Arc::strong_count(&sphere), 2);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);
        let rec = bvh.intersect(&ray, forward()).expect("should hit");
        assert!((rec.t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_two_objects_split_directly() {
        let objects: Vec<Arc<dyn Hittable>> = vec![
            Arc::new(Sphere::new(Vec3::new(3.0, 0.0, -5.0), 0.5, gray())),
            Arc::new(Sphere::new(Vec3::new(-3.0, 0.0, -5.0), 0.5, gray())),
        ];
        let bvh = BvhNode::new(objects);

        match &bvh {
            BvhNode::Branch { left, right, bbox } => {
                assert!(matches!(**left, BvhNode::Leaf(_)));
                assert!(matches!(**right, BvhNode::Leaf(_)));
                assert_eq!(bbox.x, Interval::new(-3.5, 3.5));
            }
            _ => panic!("expected a branch"),
        }
        assert_eq!(bvh.node_count(), 3);
        assert_eq!(bvh.depth(), 2);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres: Vec<Arc<dyn Hittable>> = (0..10)
            .map(|i| {
                let center = Vec3::new(i as f32, 0.0, -5.0);
                Arc::new(Sphere::new(center, 0.5, gray())) as Arc<dyn Hittable>
            })
            .collect();

        let bvh = BvhNode::new(spheres);
        // Median splits keep the tree balanced
        assert!(bvh.depth() <= 5);

        // Test ray that hits sphere at x=5
        let ray = Ray::new_simple(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z);
        let rec = bvh.intersect(&ray, forward()).expect("should hit");

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        for seed in 0..4 {
            let objects = random_scene(seed, 60);

            let mut list = HittableList::new();
            for object in &objects {
                list.add_shared(object.clone());
            }
            let bvh = BvhNode::from_list(&list);

            assert_eq!(bvh.bounding_box(), list.bounding_box());

            for ray in random_rays(seed, 300) {
                assert_same_hit(bvh.intersect(&ray, forward()), list.intersect(&ray, forward()));
            }
        }
    }

    #[test]
    fn test_bvh_is_order_independent() {
        let objects = random_scene(17, 50);
        let reference = BvhNode::new(objects.clone());
        let mut rng = seeded_rng(17, 2);

        for _ in 0..3 {
            let mut shuffled = objects.clone();
            shuffled.shuffle(&mut rng);
            let bvh = BvhNode::new(shuffled);

            for ray in random_rays(17, 200) {
                assert_same_hit(
                    bvh.intersect(&ray, forward()),
                    reference.intersect(&ray, forward()),
                );
            }
        }
    }

    #[test]
    fn test_bvh_respects_interval() {
        let objects: Vec<Arc<dyn Hittable>> = (1..=5)
            .map(|i| {
                let center = Vec3::new(0.0, 0.0, -3.0 * i as f32);
                Arc::new(Sphere::new(center, 0.5, gray())) as Arc<dyn Hittable>
            })
            .collect();
        let bvh = BvhNode::new(objects);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);

        // Skip the first two spheres: the next surface is at t = 8.5
        let rec = bvh.intersect(&ray, Interval::new(7.0, 100.0)).expect("third sphere");
        assert!((rec.t - 8.5).abs() < 1e-4);

        assert!(bvh.intersect(&ray, Interval::new(0.001, 2.0)).is_none());
    }

    #[test]
    fn test_into_bvh_and_snapshot() {
        let mut list = HittableList::new();
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5, gray()));
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -6.0), 0.5, gray()));

        let snapshot = BvhNode::from_list(&list);
        list.clear();

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);
        assert!(snapshot.intersect(&ray, forward()).is_some());
        assert!(list.intersect(&ray, forward()).is_none());

        let mut list = HittableList::new();
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5, gray()));
        let bvh = list.into_bvh();
        let rec = bvh.intersect(&ray, forward()).expect("should hit");
        assert!((rec.t - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_over_flat_quads() {
        // Axis-aligned quads have zero-thickness boxes until padded
        let objects: Vec<Arc<dyn Hittable>> = (0..6)
            .map(|i| {
                let z = -1.0 - i as f32;
                Arc::new(
                    Quad::quad(
                        Vec3::new(-1.0, -1.0, z),
                        Vec3::new(2.0, 0.0, 0.0),
                        Vec3::new(0.0, 2.0, 0.0),
                        gray(),
                    )
                    .unwrap(),
                ) as Arc<dyn Hittable>
            })
            .collect();
        let bvh = BvhNode::new(objects);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);
        let rec = bvh.intersect(&ray, forward()).expect("nearest quad");
        assert!((rec.t - 1.0).abs() < 1e-5);
    }
}
