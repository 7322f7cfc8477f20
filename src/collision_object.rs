//! C5: a rigid body that wraps a [`Mesh`] and its precomputed [`Sdf`],
//! carrying a rigid transform, linear velocity, and mass.

use crate::error::SdfError;
use crate::geometry::aabb::Aabb;
use crate::mesh::Mesh;
use crate::sdf::Sdf;
use crate::{Point3, Real, Vector3};
use glam::{DMat4, DQuat};

/// A transformed, physically-simulated mesh: owns its [`Mesh`] and
/// [`Sdf`] (built once, in the object's local frame), and caches the
/// composite transform matrix and its inverse, recomputed lazily whenever
/// `position`, `rotation`, or `scale` changes.
pub struct CollisionObject {
    mesh: Mesh,
    sdf: Sdf,

    position: Point3,
    rotation: DQuat,
    scale: Vector3,

    velocity: Vector3,
    mass: Real,
    inverse_mass: Real,

    transform: DMat4,
    inverse_transform: DMat4,
    transform_dirty: bool,
}

impl CollisionObject {
    /// Builds an SDF-backed collision object from `mesh` at the given
    /// SDF `resolution`, with the given initial transform, velocity, and
    /// mass. `mass <= 0.0` makes the object static: its `inverse_mass` is
    /// zero and [`CollisionObject::update_physics`] is a no-op.
    pub fn build(
        mesh: Mesh,
        sdf_resolution: usize,
        position: Point3,
        rotation: DQuat,
        scale: Vector3,
        mass: Real,
    ) -> Result<CollisionObject, SdfError> {
        let sdf = Sdf::build(&mesh, sdf_resolution)?;
        let inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };

        let mut object = CollisionObject {
            mesh,
            sdf,
            position,
            rotation: rotation.normalize(),
            scale,
            velocity: Vector3::ZERO,
            mass,
            inverse_mass,
            transform: DMat4::IDENTITY,
            inverse_transform: DMat4::IDENTITY,
            transform_dirty: true,
        };
        object.recompute_transform_if_dirty();
        Ok(object)
    }

    /// `true` iff the object's mesh is non-empty and its SDF is built —
    /// always true for an object constructed via [`CollisionObject::build`],
    /// since construction fails outright otherwise. Exposed for parity
    /// with the spec's invariant, and as the guard
    /// [`CollisionObject::signed_distance`] / [`CollisionObject::normal`]
    /// check before falling back to the documented degenerate defaults.
    pub fn is_valid(&self) -> bool {
        !self.mesh.is_empty()
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn set_position(&mut self, position: Point3) {
        self.position = position;
        self.transform_dirty = true;
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: DQuat) {
        self.rotation = rotation.normalize();
        self.transform_dirty = true;
    }

    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vector3) {
        self.scale = scale;
        self.transform_dirty = true;
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vector3) {
        self.velocity = velocity;
    }

    pub fn mass(&self) -> Real {
        self.mass
    }

    pub fn inverse_mass(&self) -> Real {
        self.inverse_mass
    }

    /// Static objects have zero inverse mass and never move under
    /// [`CollisionObject::update_physics`].
    pub fn is_static(&self) -> bool {
        self.inverse_mass == 0.0
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn recompute_transform_if_dirty(&mut self) {
        if !self.transform_dirty {
            return;
        }
        let t = DMat4::from_translation(self.position);
        let r = DMat4::from_quat(self.rotation);
        let s = DMat4::from_scale(self.scale);
        self.transform = t * r * s;
        self.inverse_transform = self.transform.inverse();
        self.transform_dirty = false;
    }

    /// The cached composite transform `T * R * S`. Recomputes lazily if
    /// the transform is stale.
    pub fn transform(&mut self) -> DMat4 {
        self.recompute_transform_if_dirty();
        self.transform
    }

    /// Transforms a world-space point into the object's local frame.
    pub fn world_to_local(&mut self, world: Point3) -> Point3 {
        self.recompute_transform_if_dirty();
        self.inverse_transform.transform_point3(world)
    }

    /// Transforms a local-space point into world space.
    pub fn local_to_world(&mut self, local: Point3) -> Point3 {
        self.recompute_transform_if_dirty();
        self.transform.transform_point3(local)
    }

    /// Transforms a local-space direction into world space using the
    /// inverse-transpose (the correct transform for normals under
    /// non-uniform scale), then renormalizes.
    ///
    /// Returns the zero vector for a degenerate (near-zero-length)
    /// gradient rather than guessing a direction — the caller (the
    /// simulation's collision response) is responsible for detecting
    /// that and skipping the response this tick, per spec.
    fn local_normal_to_world(&mut self, local_normal: Vector3) -> Vector3 {
        self.recompute_transform_if_dirty();
        let it = self.inverse_transform.transpose();
        let world = it.transform_vector3(local_normal);
        if world.length_squared() > 1e-12 {
            world.normalize()
        } else {
            Vector3::ZERO
        }
    }

    /// Signed distance from `world` to the mesh surface.
    ///
    /// Transforms `world` into local space, samples the SDF, and scales
    /// by `min(scale.x, scale.y, scale.z)` as a first-order correction
    /// for uniform-or-near-uniform scale. For non-uniform scale this is a
    /// conservative *under-estimate* of distance magnitude — a known,
    /// documented limitation (see DESIGN.md), not a bug.
    ///
    /// Returns `+infinity` if the object is invalid.
    pub fn signed_distance(&mut self, world: Point3) -> Real {
        if !self.is_valid() {
            return Real::INFINITY;
        }
        let local = self.world_to_local(world);
        let raw = self.sdf.sample(local);
        let min_scale = self.scale.x.min(self.scale.y).min(self.scale.z);
        raw * min_scale
    }

    /// Unit world-space surface normal at the point on the mesh nearest
    /// `world`. Returns `(0,1,0)` if the object is invalid.
    pub fn normal(&mut self, world: Point3) -> Vector3 {
        if !self.is_valid() {
            return Vector3::Y;
        }
        let local = self.world_to_local(world);
        let grad = self.sdf.gradient(local);
        self.local_normal_to_world(grad)
    }

    /// World-space AABB of the object's oriented bounding box: the 8
    /// corners of the local AABB (mesh bounds), transformed to world
    /// space and re-bounded. Tighter than transforming the AABB itself
    /// when rotation is non-trivial, but still conservative.
    pub fn world_aabb(&mut self) -> Aabb {
        self.recompute_transform_if_dirty();
        let local_aabb = self.mesh.aabb();
        let corners = local_aabb.corners();
        let mut aabb = Aabb::empty();
        for c in corners {
            aabb = aabb.grow(&self.transform.transform_point3(c));
        }
        aabb
    }

    /// Integrates `position += velocity * dt`; a no-op for static objects.
    pub fn update_physics(&mut self, dt: Real) {
        if self.is_static() {
            return;
        }
        self.position += self.velocity * dt;
        self.transform_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangle::Triangle;

    fn unit_cube_mesh() -> Mesh {
        let p = [
            Point3::new(-0.5, -0.5, -0.5),
            Point3::new(0.5, -0.5, -0.5),
            Point3::new(0.5, 0.5, -0.5),
            Point3::new(-0.5, 0.5, -0.5),
            Point3::new(-0.5, -0.5, 0.5),
            Point3::new(0.5, -0.5, 0.5),
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(-0.5, 0.5, 0.5),
        ];
        let quads = [
            [0, 1, 2, 3],
            [5, 4, 7, 6],
            [4, 0, 3, 7],
            [1, 5, 6, 2],
            [4, 5, 1, 0],
            [3, 2, 6, 7],
        ];
        let mut tris = Vec::new();
        for q in quads {
            tris.push(Triangle::new(p[q[0]], p[q[1]], p[q[2]]));
            tris.push(Triangle::new(p[q[0]], p[q[2]], p[q[3]]));
        }
        Mesh::new(tris)
    }

    #[test]
    fn world_to_local_round_trips() {
        let mesh = unit_cube_mesh();
        let mut obj = CollisionObject::build(
            mesh,
            16,
            Point3::new(1.0, 2.0, 3.0),
            DQuat::from_rotation_y(0.7),
            Vector3::new(1.5, 1.0, 0.8),
            1.0,
        )
        .unwrap();

        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, -1.0, 2.0),
            Point3::new(-5.0, 5.0, 0.25),
        ] {
            let local = obj.world_to_local(p);
            let back = obj.local_to_world(local);
            float_eq::assert_float_eq!(back.x, p.x, abs <= 1e-9);
            float_eq::assert_float_eq!(back.y, p.y, abs <= 1e-9);
            float_eq::assert_float_eq!(back.z, p.z, abs <= 1e-9);
        }
    }

    #[test]
    fn rotated_unit_cube_world_aabb_spans_diagonal() {
        let mesh = unit_cube_mesh();
        let mut obj = CollisionObject::build(
            mesh,
            8,
            Point3::ZERO,
            DQuat::from_rotation_y(std::f64::consts::FRAC_PI_4),
            Vector3::ONE,
            1.0,
        )
        .unwrap();
        let aabb = obj.world_aabb();
        let half_diag = std::f64::consts::FRAC_1_SQRT_2 * 0.5;
        assert!((aabb.max.x - half_diag).abs() < 1e-9);
        assert!((aabb.max.z - half_diag).abs() < 1e-9);
        assert!((aabb.max.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn static_object_does_not_move() {
        let mesh = unit_cube_mesh();
        let mut obj = CollisionObject::build(mesh, 8, Point3::ZERO, DQuat::IDENTITY, Vector3::ONE, 0.0).unwrap();
        obj.set_velocity(Vector3::X);
        obj.update_physics(1.0);
        assert_eq!(obj.position(), Point3::ZERO);
        assert_eq!(obj.inverse_mass(), 0.0);
    }

    #[test]
    fn dynamic_object_integrates_position() {
        let mesh = unit_cube_mesh();
        let mut obj = CollisionObject::build(mesh, 8, Point3::ZERO, DQuat::IDENTITY, Vector3::ONE, 2.0).unwrap();
        obj.set_velocity(Vector3::new(2.0, 0.0, 0.0));
        obj.update_physics(0.5);
        assert!((obj.position() - Point3::new(1.0, 0.0, 0.0)).length() < 1e-9);
    }
}
