//! C7: the per-tick simulation loop, wiring particles and collision
//! objects together inside an axis-aligned world box.

use crate::collision_object::CollisionObject;
use crate::config::SimulationConfig;
use crate::particle::ParticleSystem;
use crate::{Point3, Real, Vector3};

/// Owns the world, its dynamic/static collision objects, and its particle
/// population, advancing all of them one fixed timestep at a time.
pub struct Simulation {
    bounds_min: Point3,
    bounds_max: Point3,
    objects: Vec<CollisionObject>,
    particles: ParticleSystem,
    config: SimulationConfig,
}

impl Simulation {
    /// An empty simulation inside the given axis-aligned world box.
    pub fn new(bounds_min: Point3, bounds_max: Point3, config: SimulationConfig) -> Simulation {
        Simulation {
            bounds_min,
            bounds_max,
            objects: Vec::new(),
            particles: ParticleSystem::new(),
            config,
        }
    }

    pub fn bounds(&self) -> (Point3, Point3) {
        (self.bounds_min, self.bounds_max)
    }

    pub fn config(&self) -> SimulationConfig {
        self.config
    }

    pub fn add_object(&mut self, object: CollisionObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[CollisionObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [CollisionObject] {
        &mut self.objects
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    pub fn set_particles(&mut self, particles: ParticleSystem) {
        self.particles = particles;
    }

    /// Advances the whole simulation by `dt`, in order:
    /// object integration, object/wall collisions, mesh-mesh collisions,
    /// particle integration, particle/wall collisions, particle-mesh
    /// collisions. Each stage sees the previous stage's output, matching
    /// the source's single-threaded tick ordering.
    pub fn update(&mut self, dt: Real) {
        for object in &mut self.objects {
            object.update_physics(dt);
        }
        self.bounce_objects_off_walls();
        self.resolve_mesh_mesh_collisions();

        self.particles.advect(dt);
        self.bounce_particles_off_walls();
        self.resolve_particle_mesh_collisions();
    }

    /// Bounces every non-static object's world AABB off the six world
    /// walls, flipping the offending velocity component to point back
    /// inward and translating the object so its AABB just touches the
    /// wall (translation shifts every AABB corner equally, so a single
    /// positional correction is exact here, unlike for rotation).
    fn bounce_objects_off_walls(&mut self) {
        let (bmin, bmax) = (self.bounds_min, self.bounds_max);
        for object in &mut self.objects {
            if object.is_static() {
                continue;
            }
            let aabb = object.world_aabb();
            let mut position = object.position();
            let mut velocity = object.velocity();

            for axis in 0..3 {
                if aabb.min[axis] < bmin[axis] {
                    velocity[axis] = velocity[axis].abs();
                    position[axis] += bmin[axis] - aabb.min[axis];
                } else if aabb.max[axis] > bmax[axis] {
                    velocity[axis] = -velocity[axis].abs();
                    position[axis] -= aabb.max[axis] - bmax[axis];
                }
            }

            object.set_velocity(velocity);
            object.set_position(position);
        }
    }

    /// Tests every unordered pair of valid, not-both-static objects for a
    /// mesh-mesh collision: a broad-phase world-AABB overlap, narrowed by
    /// sampling each object's signed distance at the other's center. If
    /// either sample reads below the configured threshold, resolves the
    /// pair with an impulse and a position correction.
    fn resolve_mesh_mesh_collisions(&mut self) {
        let threshold = self.config.mesh_mesh_threshold;
        let restitution = self.config.mesh_mesh_restitution;
        let min_depth = self.config.mesh_mesh_min_depth;
        let min_separation = self.config.mesh_mesh_min_separation;

        let n = self.objects.len();
        for i in 0..n {
            for j in (i + 1)..n {
                if !self.objects[i].is_valid() || !self.objects[j].is_valid() {
                    continue;
                }
                if self.objects[i].is_static() && self.objects[j].is_static() {
                    continue;
                }

                let aabb_i = self.objects[i].world_aabb();
                let aabb_j = self.objects[j].world_aabb();
                if !aabb_i.overlaps(&aabb_j) {
                    continue;
                }

                let pos_i = self.objects[i].position();
                let pos_j = self.objects[j].position();
                let dist_i = self.objects[j].signed_distance(pos_i);
                let dist_j = self.objects[i].signed_distance(pos_j);
                if dist_i >= threshold && dist_j >= threshold {
                    continue;
                }

                let delta = pos_j - pos_i;
                let normal = if delta.length_squared() > 1e-12 {
                    delta.normalize()
                } else {
                    Vector3::X
                };

                let depth = min_depth.max(0.0_f64.max(-dist_i).max(-dist_j));
                let separation = min_separation.max(1.2 * depth);

                let vel_i = self.objects[i].velocity();
                let vel_j = self.objects[j].velocity();
                let inv_mass_i = self.objects[i].inverse_mass();
                let inv_mass_j = self.objects[j].inverse_mass();

                let (new_vel_i, new_vel_j) =
                    resolve_impulse(vel_i, vel_j, inv_mass_i, inv_mass_j, normal, restitution);
                self.objects[i].set_velocity(new_vel_i);
                self.objects[j].set_velocity(new_vel_j);

                let inv_mass_sum = inv_mass_i + inv_mass_j;
                if inv_mass_sum > 0.0 {
                    let push_i = normal * (-separation * (inv_mass_i / inv_mass_sum));
                    let push_j = normal * (separation * (inv_mass_j / inv_mass_sum));
                    self.objects[i].set_position(pos_i + push_i);
                    self.objects[j].set_position(pos_j + push_j);
                }
            }
        }
    }

    /// Bounces every particle off the six world walls. If a particle
    /// violates more than one wall in a single tick, the wall normals are
    /// summed and renormalized before the velocity is reflected, so a
    /// corner hit deflects along the angle bisector rather than only the
    /// last wall examined.
    fn bounce_particles_off_walls(&mut self) {
        let (bmin, bmax) = (self.bounds_min, self.bounds_max);
        for particle in self.particles.particles_mut() {
            let mut normal = Vector3::ZERO;
            let mut violated = false;

            for axis in 0..3 {
                if particle.position[axis] - particle.radius < bmin[axis] {
                    normal[axis] += 1.0;
                    particle.position[axis] = bmin[axis] + particle.radius;
                    violated = true;
                } else if particle.position[axis] + particle.radius > bmax[axis] {
                    normal[axis] -= 1.0;
                    particle.position[axis] = bmax[axis] - particle.radius;
                    violated = true;
                }
            }

            if violated && normal.length_squared() > 1e-12 {
                let n = normal.normalize();
                particle.velocity = reflect(particle.velocity, n);
            }
        }
    }

    /// For each particle, tests every valid object in order and resolves
    /// at most one collision per particle per tick (the first object whose
    /// signed distance reads below the particle's radius), matching the
    /// source's early-exit per-particle behavior rather than accumulating
    /// a combined response across every overlapping object.
    fn resolve_particle_mesh_collisions(&mut self) {
        let dynamic_restitution = self.config.particle_dynamic_restitution;
        let static_restitution = self.config.particle_static_restitution;
        let skin = self.config.particle_mesh_skin;
        let min_gradient_length = self.config.min_gradient_length;

        for particle in self.particles.particles_mut() {
            for object in &mut self.objects {
                if !object.is_valid() {
                    continue;
                }
                let distance = object.signed_distance(particle.position);
                if distance >= particle.radius {
                    continue;
                }

                let raw_normal = object.normal(particle.position);
                if raw_normal.length() < min_gradient_length {
                    continue;
                }
                let normal = raw_normal.normalize();

                let restitution = if object.is_static() {
                    static_restitution
                } else {
                    dynamic_restitution
                };

                let (new_velocity, new_object_velocity) = resolve_impulse(
                    particle.velocity,
                    object.velocity(),
                    particle.inverse_mass(),
                    object.inverse_mass(),
                    normal,
                    restitution,
                );
                particle.velocity = new_velocity;
                object.set_velocity(new_object_velocity);

                particle.position += normal * (particle.radius - distance + skin);
                break;
            }
        }
    }
}

/// Reflects `velocity` about a unit `normal`: `v - 2 (v . n) n`.
fn reflect(velocity: Vector3, normal: Vector3) -> Vector3 {
    velocity - normal * (2.0 * velocity.dot(normal))
}

/// Resolves a single collision along `normal` (pointing from body A toward
/// body B) between two bodies identified only by velocity and inverse
/// mass, returning their post-collision velocities. A single shared
/// routine for mesh-mesh, particle-dynamic, and particle-static
/// collisions, since all three reduce to the same normal-impulse formula
/// once each body is reduced to this capability.
///
/// Bodies already separating along `normal` (closing speed `<= 0`) are
/// left untouched. Two bodies with zero combined inverse mass (both
/// static) are also left untouched — this does not occur on the call
/// paths above, which both guard against it, but is handled defensively
/// since the function is a free-standing building block.
fn resolve_impulse(
    velocity_a: Vector3,
    velocity_b: Vector3,
    inverse_mass_a: Real,
    inverse_mass_b: Real,
    normal: Vector3,
    restitution: Real,
) -> (Vector3, Vector3) {
    let relative_velocity = velocity_a - velocity_b;
    let closing_speed = relative_velocity.dot(normal);
    if closing_speed > 0.0 {
        return (velocity_a, velocity_b);
    }

    let inverse_mass_sum = inverse_mass_a + inverse_mass_b;
    if inverse_mass_sum <= 0.0 {
        return (velocity_a, velocity_b);
    }

    let impulse = -(1.0 + restitution) * closing_speed / inverse_mass_sum;
    let new_a = velocity_a + normal * (impulse * inverse_mass_a);
    let new_b = velocity_b - normal * (impulse * inverse_mass_b);
    (new_a, new_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangle::Triangle;
    use crate::mesh::Mesh;
    use crate::particle::Particle;
    use glam::DQuat;

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
    fn resolve_impulse_leaves_separating_bodies_untouched() {
        let (a, b) = resolve_impulse(Vector3::X, Vector3::ZERO, 1.0, 1.0, Vector3::NEG_X, 1.0);
        assert_eq!(a, Vector3::X);
        assert_eq!(b, Vector3::ZERO);
    }

    #[test]
    fn resolve_impulse_conserves_momentum_for_equal_masses() {
        let (a, b) = resolve_impulse(Vector3::X, Vector3::NEG_X, 1.0, 1.0, Vector3::X, 1.0);
        // Equal-mass, perfectly elastic head-on: velocities swap.
        assert!((a - Vector3::NEG_X).length() < 1e-9);
        assert!((b - Vector3::X).length() < 1e-9);
    }

    #[test]
    fn particle_bounces_inside_empty_box() {
        let mut sim = Simulation::new(Point3::splat(-1.0), Point3::splat(1.0), SimulationConfig::default());
        let mut particles = ParticleSystem::new();
        particles.push(Particle::new(Point3::new(0.95, 0.0, 0.0), Vector3::X, 0.05, 1.0));
        sim.set_particles(particles);

        for _ in 0..5 {
            sim.update(0.1);
        }

        for p in sim.particles().particles() {
            assert!(p.position.x <= 1.0 + 1e-9);
            assert!(p.position.x >= -1.0 - 1e-9);
        }
    }

    #[test]
    fn two_equal_dynamic_spheres_head_on_exchange_velocity() {
        let mesh_a = unit_cube_mesh();
        let mesh_b = unit_cube_mesh();
        let mut a = CollisionObject::build(
            mesh_a,
            8,
            Point3::new(-2.0, 0.0, 0.0),
            DQuat::IDENTITY,
            Vector3::ONE,
            1.0,
        )
        .unwrap();
        let mut b = CollisionObject::build(
            mesh_b,
            8,
            Point3::new(2.0, 0.0, 0.0),
            DQuat::IDENTITY,
            Vector3::ONE,
            1.0,
        )
        .unwrap();
        a.set_velocity(Vector3::new(1.0, 0.0, 0.0));
        b.set_velocity(Vector3::new(-1.0, 0.0, 0.0));

        let mut sim = Simulation::new(Point3::splat(-100.0), Point3::splat(100.0), SimulationConfig::default());
        sim.add_object(a);
        sim.add_object(b);

        // Closing speed 2, initial surface gap 3: contact happens well
        // before the midpoint of this run, leaving ample time afterward
        // for the perfectly-elastic equal-mass swap (P8) to have settled
        // into its final, non-colliding-again state.
        for _ in 0..400 {
            sim.update(0.01);
        }

        let vel_a = sim.objects()[0].velocity();
        let vel_b = sim.objects()[1].velocity();
        assert!(
            (vel_a - Vector3::new(-1.0, 0.0, 0.0)).length() < 1e-5,
            "object A ended at velocity {vel_a:?}"
        );
        assert!(
            (vel_b - Vector3::new(1.0, 0.0, 0.0)).length() < 1e-5,
            "object B ended at velocity {vel_b:?}"
        );
    }

    #[test]
    fn static_object_deflects_dynamic_particle() {
        let mesh = unit_cube_mesh();
        let object = CollisionObject::build(mesh, 16, Point3::ZERO, DQuat::IDENTITY, Vector3::ONE, 0.0).unwrap();

        let mut sim = Simulation::new(Point3::splat(-10.0), Point3::splat(10.0), SimulationConfig::default());
        sim.add_object(object);
        let mut particles = ParticleSystem::new();
        particles.push(Particle::new(Point3::new(-2.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 0.1, 0.1));
        sim.set_particles(particles);

        for _ in 0..200 {
            sim.update(0.02);
        }

        let p = sim.particles().particles()[0];
        // The particle should have been repelled and not tunnel through the
        // static cube to the far side.
        assert!(p.position.x < 0.5, "particle ended up at {:?}", p.position);
    }

    fn mass_strategy() -> impl proptest::strategy::Strategy<Value = f64> {
        use proptest::prelude::*;
        (1i32..100).prop_map(|m| m as f64 * 0.1)
    }

    fn velocity_component_strategy() -> impl proptest::strategy::Strategy<Value = f64> {
        use proptest::prelude::*;
        (-50i32..50).prop_map(|v| v as f64 * 0.1)
    }

    proptest::proptest! {
        /// P7: for two dynamic bodies (finite, strictly positive masses),
        /// `resolve_impulse` conserves `m_a*v_a + m_b*v_b` for any
        /// restitution in `[0,1]` and any collision normal, not just the
        /// equal-mass head-on case P8 covers.
        #[test]
        fn prop_resolve_impulse_conserves_momentum(
            mass_a in mass_strategy(), mass_b in mass_strategy(),
            vax in velocity_component_strategy(), vay in velocity_component_strategy(), vaz in velocity_component_strategy(),
            vbx in velocity_component_strategy(), vby in velocity_component_strategy(), vbz in velocity_component_strategy(),
            nx in velocity_component_strategy(), ny in velocity_component_strategy(), nz in velocity_component_strategy(),
            restitution in 0.0f64..=1.0,
        ) {
            let normal_raw = Vector3::new(nx, ny, nz);
            proptest::prop_assume!(normal_raw.length_squared() > 1e-6);
            let normal = normal_raw.normalize();

            let velocity_a = Vector3::new(vax, vay, vaz);
            let velocity_b = Vector3::new(vbx, vby, vbz);
            let inverse_mass_a = 1.0 / mass_a;
            let inverse_mass_b = 1.0 / mass_b;

            let (new_a, new_b) = resolve_impulse(velocity_a, velocity_b, inverse_mass_a, inverse_mass_b, normal, restitution);

            let before = mass_a * velocity_a + mass_b * velocity_b;
            let after = mass_a * new_a + mass_b * new_b;
            proptest::prop_assert!(
                (before - after).length() < 1e-6,
                "momentum not conserved: before {:?} after {:?}", before, after
            );
        }
    }
}
