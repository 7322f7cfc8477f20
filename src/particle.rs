//! C6: a flat array of point particles, advected by the simulation tick.

use crate::random::RandomSource;
use crate::{Point3, Real, Vector3};

/// A single point particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Point3,
    pub velocity: Vector3,
    pub radius: Real,
    pub mass: Real,
    inverse_mass: Real,
}

impl Particle {
    /// Builds a particle, caching `inverse_mass = 1/mass` (or `0` for a
    /// static sentinel particle with `mass <= 0`).
    pub fn new(position: Point3, velocity: Vector3, radius: Real, mass: Real) -> Particle {
        let inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        Particle {
            position,
            velocity,
            radius,
            mass,
            inverse_mass,
        }
    }

    /// Cached `1/mass`, or `0` for a static sentinel particle.
    pub fn inverse_mass(&self) -> Real {
        self.inverse_mass
    }
}

/// An owned array of particles, advected in place each tick.
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    /// An empty particle system.
    pub fn new() -> ParticleSystem {
        ParticleSystem { particles: Vec::new() }
    }

    /// Builds a particle system of `count` particles, each with uniform
    /// random position within `bounds_min..bounds_max`, random velocity
    /// within `velocity_range` on each axis, and the given fixed
    /// `radius`/`mass` — the initial state for the particle-in-mesh demo.
    pub fn random(
        count: usize,
        bounds_min: Point3,
        bounds_max: Point3,
        velocity_range: Real,
        radius: Real,
        mass: Real,
        rng: &mut RandomSource,
    ) -> ParticleSystem {
        let particles = (0..count)
            .map(|_| {
                let position = rng.uniform_vec3_in(bounds_min, bounds_max);
                let velocity = rng.uniform_vec3(-velocity_range, velocity_range);
                Particle::new(position, velocity, radius, mass)
            })
            .collect();
        ParticleSystem { particles }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Advects every particle: `position += velocity * dt`.
    pub fn advect(&mut self, dt: Real) {
        for p in &mut self.particles {
            p.position += p.velocity * dt;
        }
    }
}
