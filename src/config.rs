//! Tunable constants governing collision response.
//!
//! The source this crate generalizes hardcodes these as compile-time
//! constants (spec table in the error-handling design). They are kept
//! here as a `Default`-constructible struct instead so tests can exercise
//! alternate restitution/threshold values without recompiling; the
//! defaults reproduce the original constants exactly.

/// Collision-response tuning shared by a [`crate::simulation::Simulation`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Restitution used when two dynamic meshes collide (perfectly elastic).
    pub mesh_mesh_restitution: f64,

    /// Restitution used when a particle strikes a dynamic mesh.
    pub particle_dynamic_restitution: f64,

    /// Restitution used when a particle strikes a static mesh (pure reflection).
    pub particle_static_restitution: f64,

    /// Surface proximity below which a mesh-mesh pair is considered colliding.
    ///
    /// This has units of world-space length and is not scaled by object
    /// size; a faithful follow-up would make it a fraction of the smaller
    /// object's AABB diagonal (see DESIGN.md).
    pub mesh_mesh_threshold: f64,

    /// Guaranteed minimum mesh-mesh penetration depth used when both SDF
    /// samples read as non-penetrating despite an AABB overlap.
    pub mesh_mesh_min_depth: f64,

    /// Minimum separation applied after a mesh-mesh collision.
    pub mesh_mesh_min_separation: f64,

    /// Small positive displacement added beyond `radius - d` when pushing
    /// a particle back out of a mesh, to avoid immediately re-triggering
    /// the same collision next tick.
    pub particle_mesh_skin: f64,

    /// Gradients shorter than this are treated as degenerate and skipped.
    pub min_gradient_length: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            mesh_mesh_restitution: 1.0,
            particle_dynamic_restitution: 0.8,
            particle_static_restitution: 1.0,
            mesh_mesh_threshold: 0.02,
            mesh_mesh_min_depth: 0.05,
            mesh_mesh_min_separation: 0.02,
            particle_mesh_skin: 1e-3,
            min_gradient_length: 1e-3,
        }
    }
}
