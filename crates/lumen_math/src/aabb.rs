use crate::{Interval, Ray, Vec3};

/// Width given to any box axis narrower than this, so flat primitives
/// (quads lying in an axis plane) still register slab hits.
const MIN_EXTENT: f32 = 0.0001;

/// Axis-Aligned Bounding Box for the BVH.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// The empty box never reports a hit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Smallest box enclosing both `box0` and `box1`.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// True if `p` lies inside or on the boundary of the box.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Slab test: does the ray pass through the box for some `t` in `ray_t`?
    ///
    /// One running interval is narrowed axis by axis and the test exits as soon
    /// as it collapses. A zero direction component gives an infinite inverse,
    /// which IEEE-754 handles without special casing.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        if self.is_empty() {
            return false;
        }

        let origin = r.origin();
        let dir = r.direction();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / dir[axis];

            let t0 = (slab.min - origin[axis]) * adinv;
            let t1 = (slab.max - origin[axis]) * adinv;

            if t0 < t1 {
                if t0 > ray_t.min {
                    ray_t.min = t0;
                }
                if t1 < ray_t.max {
                    ray_t.max = t1;
                }
            } else {
                if t1 > ray_t.min {
                    ray_t.min = t1;
                }
                if t0 < ray_t.max {
                    ray_t.max = t0;
                }
            }

            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Index (0=X, 1=Y, 2=Z) of the longest axis.
    ///
    /// Ties keep the earlier axis; a later axis wins only if strictly longer.
    pub fn longest_axis(&self) -> usize {
        let mut best = 0;
        let mut best_size = self.x.size();
        for axis in 1..3 {
            let size = self.axis_interval(axis).size();
            if size > best_size {
                best = axis;
                best_size = size;
            }
        }
        best
    }

    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_EXTENT {
            self.x = self.x.expand(MIN_EXTENT);
        }
        if self.y.size() < MIN_EXTENT {
            self.y = self.y.expand(MIN_EXTENT);
        }
        if self.z.size() < MIN_EXTENT {
            self.z = self.z.expand(MIN_EXTENT);
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_aabb_from_points_any_order() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));

        assert_eq!(aabb.x, Interval::new(0.0, 10.0));
        assert_eq!(aabb.y, Interval::new(0.0, 10.0));
        assert_eq!(aabb.z, Interval::new(-5.0, 5.0));
    }

    #[test]
    fn test_flat_box_is_padded() {
        let flat = Aabb::from_points(Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 1.0, -1.0));
        assert!(flat.z.size() > 0.0);
        assert!(flat.z.contains(-1.0));
    }

    #[test]
    fn test_surrounding_is_tightest_union() {
        let a = Aabb::from_points(Vec3::new(0.0, -2.0, 1.0), Vec3::new(5.0, 5.0, 3.0));
        let b = Aabb::from_points(Vec3::new(3.0, 3.0, -4.0), Vec3::new(10.0, 4.0, 2.0));
        let s = Aabb::surrounding(&a, &b);

        for axis in 0..3 {
            let (ia, ib) = (a.axis_interval(axis), b.axis_interval(axis));
            let is = s.axis_interval(axis);
            assert_eq!(is.min, ia.min.min(ib.min));
            assert_eq!(is.max, ia.max.max(ib.max));
        }

        // Every corner of both inputs is inside the union
        for bx in [a, b] {
            for corner in [
                Vec3::new(bx.x.min, bx.y.min, bx.z.min),
                Vec3::new(bx.x.max, bx.y.max, bx.z.max),
                Vec3::new(bx.x.min, bx.y.max, bx.z.min),
                Vec3::new(bx.x.max, bx.y.min, bx.z.max),
            ] {
                assert!(s.contains_point(corner));
            }
        }
    }

    #[test]
    fn test_surrounding_with_empty_is_identity() {
        let a = unit_box();
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &a), a);
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = unit_box();

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Passing beside the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!aabb.hit(&ray, Interval::new(-100.0, 100.0)));
    }

    #[test]
    fn test_aabb_hit_respects_interval() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);

        // Box occupies t in [4, 6]
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.9)));
        assert!(!aabb.hit(&ray, Interval::new(6.1, 10.0)));
        assert!(aabb.hit(&ray, Interval::new(5.0, 10.0)));
    }

    #[test]
    fn test_aabb_hit_negative_direction() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(3.0, 3.0, 3.0), Vec3::new(-1.0, -1.0, -1.0), 0.0);
        assert!(aabb.hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_aabb_hit_zero_direction_component() {
        let aabb = unit_box();

        // Direction has zero x and y: inverse is infinite, origin inside the x/y slabs
        let inside = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(aabb.hit(&inside, Interval::new(0.0, f32::INFINITY)));

        // Same direction, origin outside the x slab
        let outside = Ray::new(Vec3::new(2.0, 0.5, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!aabb.hit(&outside, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_empty_box_never_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0), 0.0);
        assert!(!Aabb::EMPTY.hit(&ray, Interval::UNIVERSE));
        assert!(Aabb::EMPTY.is_empty());
    }

    #[test]
    fn test_empty_box_never_hit_forward_interval() {
        let forward = Interval::new(0.001, f32::INFINITY);
        for dir in [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 2.0, 0.5),
        ] {
            let ray = Ray::new(Vec3::ZERO, dir, 0.0);
            assert!(!Aabb::EMPTY.hit(&ray, forward));
        }

        // Empty on one axis only
        let sliver = Aabb {
            x: Interval::new(-1.0, 1.0),
            y: Interval::EMPTY,
            z: Interval::new(-1.0, 1.0),
        };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(!sliver.hit(&ray, forward));
    }

    #[test]
    fn test_aabb_longest_axis() {
        let aabb_x = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0));
        assert_eq!(aabb_x.longest_axis(), 0);

        let aabb_y = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(aabb_y.longest_axis(), 1);

        let aabb_z = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(aabb_z.longest_axis(), 2);
    }

    #[test]
    fn test_longest_axis_ties_prefer_first() {
        let cube = Aabb::from_points(Vec3::ZERO, Vec3::splat(2.0));
        assert_eq!(cube.longest_axis(), 0);

        let yz_tie = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 4.0, 4.0));
        assert_eq!(yz_tie.longest_axis(), 1);
    }
}
