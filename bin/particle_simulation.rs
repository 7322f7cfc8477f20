//! Headless demo: a particle cloud bouncing around a single SDF-backed
//! collision mesh, inside a fixed world box.

use clap::Parser;
use glam::DQuat;
use sdf_sim::collision_object::CollisionObject;
use sdf_sim::mesh::Mesh;
use sdf_sim::particle::ParticleSystem;
use sdf_sim::random::RandomSource;
use sdf_sim::simulation::Simulation;
use sdf_sim::{Point3, SimulationConfig, Vector3};
use std::process::ExitCode;

#[derive(Parser)]
#[command(about = "Runs a headless particle-against-mesh collision demo")]
struct Args {
    /// Path to the OBJ mesh particles collide against.
    #[arg(long, default_value = "data/stanford-bunny.obj")]
    mesh: String,

    /// SDF grid resolution per axis.
    #[arg(long, default_value_t = 64)]
    resolution: usize,

    /// Seed for the particle cloud's initial positions/velocities.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of particles to simulate.
    #[arg(long, default_value_t = 200)]
    particle_count: usize,

    /// Number of ticks to run before exiting.
    #[arg(long, default_value_t = 300)]
    ticks: usize,
}

fn main() -> ExitCode {
    sdf_sim::logging::init();
    let args = Args::parse();

    if args.resolution < 2 {
        log::error!("--resolution must be at least 2, got {}", args.resolution);
        return ExitCode::FAILURE;
    }

    let mesh = match Mesh::load_obj(&args.mesh) {
        Ok(mesh) => mesh,
        Err(err) => {
            log::error!("failed to load mesh {}: {err}", args.mesh);
            return ExitCode::FAILURE;
        }
    };

    let object = match CollisionObject::build(
        mesh,
        args.resolution,
        Point3::ZERO,
        DQuat::IDENTITY,
        Vector3::ONE,
        0.0,
    ) {
        Ok(object) => object,
        Err(err) => {
            log::error!("failed to build SDF: {err}");
            return ExitCode::FAILURE;
        }
    };

    let bounds_min = Point3::splat(-5.0);
    let bounds_max = Point3::splat(5.0);
    let mut simulation = Simulation::new(bounds_min, bounds_max, SimulationConfig::default());
    simulation.add_object(object);

    let mut rng = RandomSource::new(args.seed);
    let particles = ParticleSystem::random(
        args.particle_count,
        bounds_min,
        bounds_max,
        1.5,
        0.05,
        0.1,
        &mut rng,
    );
    simulation.set_particles(particles);

    log::info!(
        "running {} particles against '{}' for {} ticks",
        args.particle_count,
        args.mesh,
        args.ticks
    );

    let dt = 1.0 / 60.0;
    for tick in 0..args.ticks {
        simulation.update(dt);
        if tick % 60 == 0 {
            log::info!("tick {tick}: {} particles live", simulation.particles().len());
        }
    }

    log::info!("done");
    ExitCode::SUCCESS
}
