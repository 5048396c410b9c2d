use anyhow::{Context, Result};
use clap::Parser;
use flock_core::FlockStd;
use flock_shared::{DisplaySettings, Settings};
use flock_viewer::{
    render::Renderer,
    settings::{self, Overrides},
    stats::{frame_delay, wait_millis, FrameStats},
};
use opencv::highgui;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const WINDOW: &str = "Flock";
const KEY_ESCAPE: i32 = 27;

#[derive(Parser, Debug)]
#[command(author, version, about = "3D boid flocking viewer", long_about = None)]
struct Args {
    /// JSON settings file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of boids (overrides the settings file)
    #[arg(short, long)]
    boids: Option<usize>,

    /// Target frame rate (overrides the settings file)
    #[arg(long)]
    fps: Option<u32>,

    /// Stop after this many frames (at least 1)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    frames: Option<u64>,

    /// Seed for the initial flock; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Run the simulation without opening a window
    #[arg(long)]
    headless: bool,

    /// Draw the bounding box
    #[arg(long)]
    draw_bounds: bool,

    /// Draw each boid's recent path
    #[arg(long)]
    trails: bool,

    /// Print the resolved settings as JSON and exit
    #[arg(long)]
    print_settings: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

struct Viewer {
    flock: FlockStd,
    display: DisplaySettings,
    renderer: Option<Renderer>,
    max_frames: Option<u64>,
}

impl Viewer {
    fn new(settings: &Settings, seed: Option<u64>, headless: bool, max_frames: Option<u64>) -> Self {
        let sim = &settings.simulation;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let flock = FlockStd::initialize(
            sim.population,
            &settings::spawn(sim),
            settings::flock_config(sim),
            &mut rng,
        );
        log::info!("Spawned {} boids", flock.len());

        let renderer = (!headless).then(|| Renderer::new(&settings.display, settings::bounds(sim)));

        Self {
            flock,
            display: settings.display.clone(),
            renderer,
            max_frames,
        }
    }

    /// Draws the current flock into the window, if there is one.
    fn draw(&mut self) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let (frame, visible) = renderer.draw(self.flock.boids())?;
        log::trace!("{} of {} boids visible", visible, self.flock.len());
        highgui::imshow(WINDOW, frame)?;
        Ok(())
    }

    /// Waits out `delay` while polling input; `false` once the user asked to quit.
    fn poll(&self, delay: Duration) -> Result<bool> {
        if self.renderer.is_none() {
            std::thread::sleep(delay);
            return Ok(true);
        }

        let key = highgui::wait_key(wait_millis(delay))?;
        if key == 'q' as i32 || key == KEY_ESCAPE {
            log::info!("Quit requested");
            return Ok(false);
        }

        if highgui::get_window_property(WINDOW, highgui::WND_PROP_VISIBLE)? < 1.0 {
            log::info!("Window closed");
            return Ok(false);
        }

        Ok(true)
    }

    fn run(&mut self) -> Result<()> {
        log::info!("Starting main loop...");

        if self.renderer.is_some() {
            highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)
                .context("Failed to open window")?;
        }

        let budget = Duration::from_millis(self.display.frame_millis());
        let mut stats = FrameStats::new(Instant::now());
        let mut frame_count: u64 = 0;

        loop {
            let started = Instant::now();

            self.flock.tick();
            self.draw()?;

            if !self.poll(frame_delay(budget, started, Instant::now()))? {
                break;
            }

            frame_count += 1;
            if let Some(report) = stats.record(Instant::now()) {
                log::info!(
                    "{} ms, {} fps",
                    report.last_frame.as_millis(),
                    report.frames
                );
            }

            if self.max_frames.is_some_and(|max| frame_count >= max) {
                log::info!("Reached {} frames", frame_count);
                break;
            }
        }

        if self.renderer.is_some() {
            highgui::destroy_all_windows()?;
        }

        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let overrides = Overrides {
        boids: args.boids,
        fps: args.fps,
        draw_bounds: args.draw_bounds,
        draw_trails: args.trails,
    };
    let settings = settings::resolve(settings::load(args.config.as_deref())?, &overrides)?;

    if args.print_settings {
        println!("{}", settings.to_json_pretty()?);
        return Ok(());
    }

    log::info!("Flock viewer starting...");
    log::info!(
        "Population: {}, target fps: {}",
        settings.simulation.population,
        settings.display.fps
    );
    log::debug!("Settings: {:?}", settings);

    let mut viewer = Viewer::new(&settings, args.seed, args.headless, args.frames);
    viewer.run().context("Viewer error")?;

    Ok(())
}
