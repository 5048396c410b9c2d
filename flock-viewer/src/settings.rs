use anyhow::{Context, Result};
use flock_core::{Bounds, FlockConfig, Spawn, SpeedRange, Vector3D};
use flock_shared::{Point3, Settings, SimulationSettings};
use std::path::Path;

/// Command line values that take precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub boids: Option<usize>,
    pub fps: Option<u32>,
    pub draw_bounds: bool,
    pub draw_trails: bool,
}

/// Reads settings from a JSON file, or falls back to the defaults.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    log::info!("Loading settings from {}", path.display());
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    Settings::from_json(&json)
        .with_context(|| format!("Invalid settings file {}", path.display()))
}

/// Merges overrides into `settings` and checks the result.
pub fn resolve(mut settings: Settings, overrides: &Overrides) -> Result<Settings> {
    if let Some(boids) = overrides.boids {
        settings.simulation.population = boids;
    }
    if let Some(fps) = overrides.fps {
        settings.display.fps = fps;
    }
    if overrides.draw_bounds {
        settings.display.draw_bounds = true;
    }
    if overrides.draw_trails {
        settings.display.draw_trails = true;
    }

    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn vector(point: Point3) -> Vector3D {
    Vector3D::new(point.x, point.y, point.z)
}

pub fn bounds(sim: &SimulationSettings) -> Bounds {
    Bounds::new(vector(sim.bounds.min), vector(sim.bounds.max))
}

pub fn flock_config(sim: &SimulationSettings) -> FlockConfig {
    FlockConfig {
        scan_radius: sim.scan_radius,
        avoid_radius: sim.avoid_radius,
        cohesion_factor: sim.cohesion_factor,
        alignment_factor: sim.alignment_factor,
        max_speed: sim.max_speed,
        max_accel: sim.max_accel,
        bind_increment: sim.bind_increment,
        bounds: bounds(sim),
    }
}

pub fn spawn(sim: &SimulationSettings) -> Spawn {
    Spawn {
        bounds: bounds(sim),
        speed: SpeedRange::new(sim.initial_speed.min, sim.initial_speed.max),
    }
}
