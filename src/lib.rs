//! A crate implementing a signed-distance-field-accelerated collision core:
//! triangle meshes are pre-baked into a BVH and a dense SDF grid, and a
//! small physics tick resolves particle and rigid-body collisions against
//! those fields and against a containment box.
//!
//! ## About
//!
//! The expensive part of colliding a point against an arbitrarily
//! triangulated mesh is finding the closest surface point. This crate
//! precomputes that answer once per mesh into a [`sdf::Sdf`] grid, built
//! by querying a [`bvh::Bvh`] over the mesh's triangles, and then answers
//! runtime queries with a handful of trilinear lookups instead of a
//! triangle walk.
//!
//! ## Example
//!
//! ```no_run
//! use sdf_sim::mesh::Mesh;
//! use sdf_sim::collision_object::CollisionObject;
//! use sdf_sim::Vector3;
//!
//! let mesh = Mesh::load_obj("data/bunny.obj").unwrap();
//! let object = CollisionObject::build(mesh, 64, Vector3::ZERO, glam::DQuat::IDENTITY, Vector3::ONE, 1.0).unwrap();
//! let d = object.signed_distance(Vector3::ZERO);
//! ```

#![allow(clippy::many_single_char_names)]

/// A minimal floating value used as a lower bound for degeneracy checks.
pub const EPSILON: f64 = 1e-7;

/// Scalar type used throughout the crate for distances, masses, and time.
pub type Real = f64;

/// Point math type used by this crate. Type alias for [`glam::DVec3`].
pub type Point3 = glam::DVec3;

/// Vector math type used by this crate. Type alias for [`glam::DVec3`].
pub type Vector3 = glam::DVec3;

pub mod bvh;
pub mod collision_object;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod mesh;
pub mod particle;
pub mod random;
pub mod sdf;
pub mod simulation;

pub use collision_object::CollisionObject;
pub use config::SimulationConfig;
pub use error::{LoadError, SdfError};
pub use mesh::Mesh;
pub use particle::{Particle, ParticleSystem};
pub use simulation::Simulation;
