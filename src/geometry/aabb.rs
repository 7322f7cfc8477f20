//! Axis-aligned bounding boxes.

use crate::{Point3, Real};
use std::ops::Index;

/// An axis-aligned bounding box, stored as its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// The corner with the smallest coordinate on every axis.
    pub min: Point3,
    /// The corner with the largest coordinate on every axis.
    pub max: Point3,
}

/// Implemented by anything that has a world/local-space bounding box,
/// mirroring the `Bounded` trait the BVH builder queries per primitive.
pub trait Bounded {
    /// Returns the AABB enclosing `self`.
    fn aabb(&self) -> Aabb;
}

impl Index<usize> for Aabb {
    type Output = Point3;

    /// `aabb[0]` is `min`, `aabb[1]` is `max`. Lets ray/slab tests index by
    /// the cached sign of a ray direction component without branching.
    fn index(&self, i: usize) -> &Point3 {
        match i {
            0 => &self.min,
            1 => &self.max,
            _ => panic!("Aabb index out of bounds: {i}"),
        }
    }
}

impl Aabb {
    /// An AABB with no extent, with `min` at `+infinity` and `max` at
    /// `-infinity` so that growing it with any point yields that point.
    pub fn empty() -> Aabb {
        Aabb {
            min: Point3::splat(Real::INFINITY),
            max: Point3::splat(Real::NEG_INFINITY),
        }
    }

    /// Builds an AABB directly from known min/max corners.
    pub fn with_bounds(min: Point3, max: Point3) -> Aabb {
        Aabb { min, max }
    }

    /// The componentwise extremum of `self` and every vertex of `points`.
    pub fn from_points(points: &[Point3]) -> Aabb {
        points.iter().fold(Aabb::empty(), |acc, p| acc.grow(p))
    }

    /// Returns a new AABB that also encloses `point`.
    pub fn grow(&self, point: &Point3) -> Aabb {
        Aabb {
            min: self.min.min(*point),
            max: self.max.max(*point),
        }
    }

    /// Returns a new AABB enclosing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// The geometric center of the box.
    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis extent (`max - min`).
    pub fn size(&self) -> Point3 {
        self.max - self.min
    }

    /// Index of the axis with the largest extent: 0 for X, 1 for Y, 2 for Z.
    pub fn largest_axis(&self) -> usize {
        let size = self.size();
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// `true` iff `point` lies within the box on every axis (inclusive).
    pub fn contains(&self, point: &Point3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// `true` iff `self` and `other` overlap on every axis.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Euclidean distance from `point` to the closest point on the box;
    /// zero if `point` is inside.
    pub fn distance_to_point(&self, point: &Point3) -> Real {
        let clamped = point.clamp(self.min, self.max);
        (*point - clamped).length()
    }

    /// The 8 corners of the box, in the fixed order `[x,y,z]` bit-indexed
    /// by (lo=0, hi=1) per axis — used to transform an OBB into world
    /// space for a world AABB.
    pub fn corners(&self) -> [Point3; 8] {
        [
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Grows the box outward by `fraction` of its size on each side, per
    /// axis. Used to pad a mesh AABB before laying out the SDF grid.
    pub fn padded(&self, fraction: Real) -> Aabb {
        let pad = self.size() * fraction;
        Aabb {
            min: self.min - pad,
            max: self.max + pad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grown_by_one_point_is_that_point() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let aabb = Aabb::empty().grow(&p);
        assert_eq!(aabb.min, p);
        assert_eq!(aabb.max, p);
    }

    #[test]
    fn distance_to_point_inside_is_zero() {
        let aabb = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.distance_to_point(&Point3::ZERO), 0.0);
    }

    #[test]
    fn distance_to_point_outside() {
        let aabb = Aabb::with_bounds(Point3::ZERO, Point3::ONE);
        let d = aabb.distance_to_point(&Point3::new(2.0, 0.0, 0.0));
        assert_eq!(d, 1.0);
    }

    #[test]
    fn padded_grows_symmetrically() {
        let aabb = Aabb::with_bounds(Point3::ZERO, Point3::new(2.0, 2.0, 2.0));
        let padded = aabb.padded(0.1);
        assert_eq!(padded.min, Point3::new(-0.2, -0.2, -0.2));
        assert_eq!(padded.max, Point3::new(2.2, 2.2, 2.2));
    }
}
