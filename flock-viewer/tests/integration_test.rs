use anyhow::Result;
use flock_core::{Boid, FlockStd, Vector3D};
use flock_shared::Settings;
use flock_viewer::{
    render::{color_scalar, Renderer},
    settings::{self, Overrides},
};
use opencv::{core, prelude::*};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn load_fixture() -> Result<Settings> {
    let path = fixture("small_flock.json");
    settings::resolve(settings::load(Some(Path::new(&path)))?, &Overrides::default())
}

#[test]
fn test_fixture_overrides_only_listed_fields() -> Result<()> {
    let settings = load_fixture()?;

    assert_eq!(settings.simulation.population, 24);
    assert_eq!(settings.simulation.scan_radius, 30.0);
    assert_eq!(settings.simulation.avoid_radius, 10.0);
    // Not in the file
    assert_eq!(settings.simulation.max_speed, 2.0);
    assert_eq!(settings.display.width, 320);
    assert_eq!(settings.display.camera_z, 250.0);

    let config = settings::flock_config(&settings.simulation);
    assert_eq!(config.bounds.min, Vector3D::new(-60.0, -60.0, -60.0));
    assert_eq!(config.scan_radius, 30.0);
    Ok(())
}

#[test]
fn test_headless_pipeline_renders_every_frame() -> Result<()> {
    let settings = load_fixture()?;
    let sim = &settings.simulation;
    let mut rng = StdRng::seed_from_u64(11);
    let mut flock: FlockStd = FlockStd::initialize(
        sim.population,
        &settings::spawn(sim),
        settings::flock_config(sim),
        &mut rng,
    );
    let mut renderer = Renderer::new(&settings.display, settings::bounds(sim));

    for _ in 0..30 {
        flock.tick();
        assert_eq!(flock.len(), 24);

        let (frame, visible) = renderer.draw(flock.boids())?;
        assert_eq!(frame.rows(), 240);
        assert_eq!(frame.cols(), 320);
        assert!(visible > 0);

        let total = core::sum_elems(frame)?;
        assert!(total[0] + total[1] + total[2] > 0.0);
    }

    Ok(())
}

#[test]
fn test_still_boids_are_not_drawn() -> Result<()> {
    let mut display = Settings::default().display;
    display.draw_bounds = false;
    let mut renderer = Renderer::new(&display, Default::default());

    let boids: Vec<Boid> = vec![
        Boid::new(Vector3D::zero(), Vector3D::zero()),
        Boid::new(Vector3D::new(10.0, 0.0, 0.0), Vector3D::zero()),
    ];
    let (frame, visible) = renderer.draw(&boids)?;

    assert_eq!(visible, 0);
    let total = core::sum_elems(frame)?;
    assert_eq!(total[0] + total[1] + total[2], 0.0);
    Ok(())
}

#[test]
fn test_trails_are_drawn_only_when_enabled() -> Result<()> {
    // A still boid has no heading line, so anything on screen is its trail
    let mut boid: Boid = Boid::new(Vector3D::zero(), Vector3D::zero());
    for x in [-40.0, -20.0, 0.0, 20.0] {
        boid.position = Vector3D::new(x, 10.0, 0.0);
        boid.record_position();
    }
    let boids = vec![boid];

    let mut display = Settings::default().display;
    let mut renderer = Renderer::new(&display, Default::default());
    let (frame, _) = renderer.draw(&boids)?;
    let total = core::sum_elems(frame)?;
    assert_eq!(total[0] + total[1] + total[2], 0.0);

    display.draw_trails = true;
    let mut renderer = Renderer::new(&display, Default::default());
    let (frame, visible) = renderer.draw(&boids)?;
    let total = core::sum_elems(frame)?;
    assert_eq!(visible, 0);
    assert!(total[0] + total[1] + total[2] > 0.0);
    Ok(())
}

#[test]
fn test_boid_behind_camera_is_skipped() -> Result<()> {
    let display = Settings::default().display;
    let mut renderer = Renderer::new(&display, Default::default());

    let boids: Vec<Boid> = vec![Boid::new(
        Vector3D::new(0.0, 0.0, 400.0),
        Vector3D::new(1.0, 0.0, 0.0),
    )];
    let (_, visible) = renderer.draw(&boids)?;

    assert_eq!(visible, 0);
    Ok(())
}

#[test]
fn test_color_scalar_is_bgr_with_alpha() {
    let scalar = color_scalar([255, 0, 51, 255]);
    assert_eq!(scalar[0], 51.0);
    assert_eq!(scalar[1], 0.0);
    assert_eq!(scalar[2], 255.0);

    let faded = color_scalar([255, 255, 255, 0]);
    assert_eq!(faded[0] + faded[1] + faded[2], 0.0);
}
