//! C1: vector-math primitives — AABBs, triangles, and rays — shared by
//! the BVH and SDF builders.

pub mod aabb;
pub mod ray;
pub mod triangle;

pub use aabb::{Aabb, Bounded};
pub use ray::Ray;
pub use triangle::Triangle;
