//! Headless demo: two dynamic copies of a mesh colliding with each other
//! and with one static, larger copy of the same mesh.

use clap::Parser;
use glam::DQuat;
use sdf_sim::collision_object::CollisionObject;
use sdf_sim::mesh::Mesh;
use sdf_sim::simulation::Simulation;
use sdf_sim::{Point3, SimulationConfig, Vector3};
use std::process::ExitCode;

#[derive(Parser)]
#[command(about = "Runs a headless mesh-mesh collision demo")]
struct Args {
    /// Path to the OBJ mesh shared by all three bodies.
    #[arg(long, default_value = "data/stanford-bunny.obj")]
    mesh: String,

    /// SDF grid resolution per axis.
    #[arg(long, default_value_t = 32)]
    resolution: usize,

    /// Seed, unused directly here but accepted for CLI symmetry with
    /// `particle_simulation` and for future randomized initial placement.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of ticks to run before exiting.
    #[arg(long, default_value_t = 300)]
    ticks: usize,
}

fn main() -> ExitCode {
    sdf_sim::logging::init();
    let args = Args::parse();
    let _ = args.seed;

    if args.resolution < 2 {
        log::error!("--resolution must be at least 2, got {}", args.resolution);
        return ExitCode::FAILURE;
    }

    let mesh_a = match Mesh::load_obj(&args.mesh) {
        Ok(mesh) => mesh,
        Err(err) => {
            log::error!("failed to load mesh {}: {err}", args.mesh);
            return ExitCode::FAILURE;
        }
    };
    let mesh_b = mesh_a.clone();
    let mesh_static = mesh_a.clone();

    let build = |mesh: Mesh, position: Point3, scale: Vector3, mass: f64| {
        CollisionObject::build(mesh, args.resolution, position, DQuat::IDENTITY, scale, mass)
    };

    let a = match build(mesh_a, Point3::new(-3.0, 0.0, 0.0), Vector3::ONE, 1.0) {
        Ok(object) => object,
        Err(err) => {
            log::error!("failed to build SDF for object A: {err}");
            return ExitCode::FAILURE;
        }
    };
    let b = match build(mesh_b, Point3::new(3.0, 0.0, 0.0), Vector3::ONE, 1.0) {
        Ok(object) => object,
        Err(err) => {
            log::error!("failed to build SDF for object B: {err}");
            return ExitCode::FAILURE;
        }
    };
    let ground = match build(mesh_static, Point3::new(0.0, -6.0, 0.0), Vector3::splat(4.0), 0.0) {
        Ok(object) => object,
        Err(err) => {
            log::error!("failed to build SDF for the static ground: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut a = a;
    let mut b = b;
    a.set_velocity(Vector3::new(1.5, 0.0, 0.0));
    b.set_velocity(Vector3::new(-1.5, 0.0, 0.0));

    let mut simulation = Simulation::new(
        Point3::new(-8.0, -8.0, -8.0),
        Point3::new(8.0, 8.0, 8.0),
        SimulationConfig::default(),
    );
    simulation.add_object(a);
    simulation.add_object(b);
    simulation.add_object(ground);

    log::info!("running {} ticks against '{}'", args.ticks, args.mesh);

    let dt = 1.0 / 60.0;
    for tick in 0..args.ticks {
        simulation.update(dt);
        if tick % 60 == 0 {
            for (i, object) in simulation.objects().iter().enumerate() {
                log::info!("tick {tick}: object {i} at {:?}", object.position());
            }
        }
    }

    log::info!("done");
    ExitCode::SUCCESS
}
