//! Rays, and their intersection tests against AABBs and triangles.
//!
//! Generalizes the ray/AABB/triangle intersection routines the BVH
//! traversal relies on; unlike a renderer's ray caster this module's
//! triangle test must not cull backfaces, since the SDF builder counts
//! ray-triangle crossings from both sides of a mesh to decide inside/outside.

use crate::geometry::aabb::Aabb;
use crate::geometry::triangle::Triangle;
use crate::{Point3, Real, Vector3, EPSILON};

/// A ray: an origin and a (not necessarily unit) direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The ray origin.
    pub origin: Point3,
    /// The ray direction. Not normalized; callers that need unit length
    /// should normalize before constructing, since the SDF parity ray and
    /// the Möller-Trumbore `t` parameter below assume a consistent scale.
    pub direction: Vector3,
}

/// The result of a ray/triangle intersection test.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance from the ray origin to the intersection point.
    pub t: Real,
    /// Barycentric `u` coordinate.
    pub u: Real,
    /// Barycentric `v` coordinate.
    pub v: Real,
}

impl Ray {
    /// Creates a new ray from an `origin` and `direction`.
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        Ray { origin, direction }
    }

    /// Point reached after traveling `t` along the ray.
    pub fn at(&self, t: Real) -> Point3 {
        self.origin + self.direction * t
    }

    /// Ray/AABB slab test. Returns `true` iff the intersection interval
    /// `[tNear, tFar]` overlaps `[0, +infinity)`.
    ///
    /// Zero components of `direction` produce `+-infinity` in `1/direction`,
    /// which `min`/`max` propagate correctly through the slab comparisons
    /// without a special case, per the branchless formulation.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let inv_dir = Vector3::new(1.0 / self.direction.x, 1.0 / self.direction.y, 1.0 / self.direction.z);

        let tx1 = (aabb.min.x - self.origin.x) * inv_dir.x;
        let tx2 = (aabb.max.x - self.origin.x) * inv_dir.x;
        let mut t_near = tx1.min(tx2);
        let mut t_far = tx1.max(tx2);

        let ty1 = (aabb.min.y - self.origin.y) * inv_dir.y;
        let ty2 = (aabb.max.y - self.origin.y) * inv_dir.y;
        t_near = t_near.max(ty1.min(ty2));
        t_far = t_far.min(ty1.max(ty2));

        let tz1 = (aabb.min.z - self.origin.z) * inv_dir.z;
        let tz2 = (aabb.max.z - self.origin.z) * inv_dir.z;
        t_near = t_near.max(tz1.min(tz2));
        t_far = t_far.min(tz1.max(tz2));

        t_far >= t_near && t_far >= 0.0
    }

    /// Euclidean distance from `point` to the closest point on `aabb`;
    /// zero if `point` is inside. Not a ray query, but lives alongside the
    /// AABB test since both are used by the same BVH branch-and-bound.
    pub fn point_to_aabb_distance(point: &Point3, aabb: &Aabb) -> Real {
        aabb.distance_to_point(point)
    }

    /// Moller-Trumbore ray/triangle intersection, without backface
    /// culling (the SDF parity test needs hits from either side of the
    /// surface). Returns `None` if the ray is parallel to the triangle's
    /// plane, if the hit parameter is not `> EPSILON`, or if the
    /// barycentric coordinates fall outside the triangle.
    pub fn intersects_triangle(&self, tri: &Triangle) -> Option<TriangleHit> {
        let edge1 = tri.v1 - tri.v0;
        let edge2 = tri.v2 - tri.v0;

        let p_vec = self.direction.cross(edge2);
        let det = edge1.dot(p_vec);

        if det.abs() < EPSILON {
            return None; // ray parallel to triangle plane
        }
        let inv_det = 1.0 / det;

        let t_vec = self.origin - tri.v0;
        let u = t_vec.dot(p_vec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q_vec = t_vec.cross(edge1);
        let v = self.direction.dot(q_vec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q_vec) * inv_det;
        if t > EPSILON {
            Some(TriangleHit { t, u, v })
        } else {
            None
        }
    }
}
