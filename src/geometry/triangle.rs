//! Triangle primitive: storage, AABB, and closest-point queries.

use crate::geometry::aabb::{Aabb, Bounded};
use crate::{Point3, Real, Vector3};

/// An immutable triangle: three vertices plus a precomputed unit face
/// normal. Vertices are in local space at construction time; a
/// [`crate::collision_object::CollisionObject`] transforms points into
/// this space before querying, rather than the triangle being re-baked
/// per rigid transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3,
    pub v1: Point3,
    pub v2: Point3,
    pub normal: Vector3,
}

impl Triangle {
    /// Builds a triangle, computing `normal = normalize((v1-v0) x (v2-v0))`.
    ///
    /// Degenerate (zero-area) triangles produce a `NaN` normal; callers
    /// should filter those out before handing triangles to a BVH (see
    /// [`crate::mesh::Mesh::load_obj`]).
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Triangle {
        let normal = (v1 - v0).cross(v2 - v0).normalize();
        Triangle { v0, v1, v2, normal }
    }

    /// `true` iff the triangle has (numerically) zero area.
    pub fn is_degenerate(&self) -> bool {
        (self.v1 - self.v0).cross(self.v2 - self.v0).length_squared() < crate::EPSILON * crate::EPSILON
    }

    /// Arithmetic mean of the three vertices.
    pub fn centroid(&self) -> Point3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Length of the longest edge, used by the BVH's bounding-sphere
    /// quick-reject before a full closest-point test.
    pub fn max_edge_length(&self) -> Real {
        let a = (self.v1 - self.v0).length();
        let b = (self.v2 - self.v1).length();
        let c = (self.v0 - self.v2).length();
        a.max(b).max(c)
    }

    /// Euclidean distance from `p` to the closest point on the triangle
    /// (interior, edges, or vertices).
    ///
    /// Classic barycentric region test (Ericson, *Real-Time Collision
    /// Detection*, §5.1.5): solve for `(s,t)` minimizing
    /// `|v0 + s(v1-v0) + t(v2-v0) - p|^2` subject to `s>=0, t>=0, s+t<=1`,
    /// clamping into the feasible region across the seven Voronoi
    /// regions of the triangle before evaluating distance.
    pub fn distance_to_point(&self, p: Point3) -> Real {
        self.closest_point(p).distance(p)
    }

    /// The point on the triangle closest to `p`.
    pub fn closest_point(&self, p: Point3) -> Point3 {
        let (a, b, c) = (self.v0, self.v1, self.v2);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a; // vertex region A
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b; // vertex region B
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + v * ab; // edge AB
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c; // vertex region C
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + w * ac; // edge AC
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + w * (c - b); // edge BC
        }

        // interior
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }
}

impl Bounded for Triangle {
    fn aabb(&self) -> Aabb {
        Aabb::empty().grow(&self.v0).grow(&self.v1).grow(&self.v2)
    }
}
