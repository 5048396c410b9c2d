use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in simulation space, as written in settings files
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Axis-aligned box given by its two corners
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoxSettings {
    pub min: Point3,
    pub max: Point3,
}

impl Default for BoxSettings {
    fn default() -> Self {
        Self {
            min: Point3::new(-150.0, -150.0, -100.0),
            max: Point3::new(150.0, 150.0, 150.0),
        }
    }
}

/// Band each initial velocity component is drawn from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpeedBand {
    pub min: f64,
    pub max: f64,
}

impl Default for SpeedBand {
    fn default() -> Self {
        Self { min: 1.0, max: 1.9 }
    }
}

/// Flock population and rule constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub population: usize,
    pub bounds: BoxSettings,
    pub initial_speed: SpeedBand,
    pub scan_radius: f64,
    pub avoid_radius: f64,
    pub cohesion_factor: f64,
    pub alignment_factor: f64,
    pub max_speed: f64,
    pub max_accel: f64,
    pub bind_increment: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            population: 200,
            bounds: BoxSettings::default(),
            initial_speed: SpeedBand::default(),
            scan_radius: 40.0,
            avoid_radius: 20.0,
            cohesion_factor: 0.01,
            alignment_factor: 0.75,
            max_speed: 2.0,
            max_accel: 0.25,
            bind_increment: 1.0,
        }
    }
}

/// Window, camera and pacing for the viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees.
    pub view_angle: f64,
    pub camera_z: f64,
    pub max_depth: f64,
    pub fps: u32,
    /// Half length of the line drawn for each boid.
    pub boid_size: f64,
    pub draw_bounds: bool,
    /// Draw each boid's recorded positions as a fading polyline.
    pub draw_trails: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            view_angle: 90.0,
            camera_z: 250.0,
            max_depth: 1000.0,
            fps: 20,
            boid_size: 5.0,
            draw_bounds: false,
            draw_trails: false,
        }
    }
}

/// Everything a settings file may contain
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("population must be at least 1")]
    EmptyPopulation,
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("bounds minimum exceeds maximum on the {axis} axis")]
    InvertedBounds { axis: char },
    #[error("initial speed band is inverted: {min} > {max}")]
    InvertedSpeedBand { min: f64, max: f64 },
    #[error("window size must be non-zero, got {width}x{height}")]
    EmptyWindow { width: u32, height: u32 },
    #[error("frame rate must be at least 1")]
    ZeroFps,
    #[error("view angle must be between 0 and 180 degrees, got {0}")]
    ViewAngle(f64),
}

fn positive(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Negative { name, value })
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.population == 0 {
            return Err(SettingsError::EmptyPopulation);
        }

        let (min, max) = (self.bounds.min, self.bounds.max);
        for (axis, lo, hi) in [('x', min.x, max.x), ('y', min.y, max.y), ('z', min.z, max.z)] {
            if !(lo <= hi) {
                return Err(SettingsError::InvertedBounds { axis });
            }
        }

        if !(self.initial_speed.min <= self.initial_speed.max) {
            return Err(SettingsError::InvertedSpeedBand {
                min: self.initial_speed.min,
                max: self.initial_speed.max,
            });
        }

        positive("scan_radius", self.scan_radius)?;
        non_negative("avoid_radius", self.avoid_radius)?;
        non_negative("cohesion_factor", self.cohesion_factor)?;
        non_negative("alignment_factor", self.alignment_factor)?;
        positive("max_speed", self.max_speed)?;
        non_negative("max_accel", self.max_accel)?;
        non_negative("bind_increment", self.bind_increment)?;
        Ok(())
    }
}

impl DisplaySettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::EmptyWindow {
                width: self.width,
                height: self.height,
            });
        }
        if self.fps == 0 {
            return Err(SettingsError::ZeroFps);
        }
        if !(self.view_angle > 0.0 && self.view_angle < 180.0) {
            return Err(SettingsError::ViewAngle(self.view_angle));
        }
        positive("max_depth", self.max_depth)?;
        non_negative("boid_size", self.boid_size)?;
        Ok(())
    }

    /// Time budget of one frame in milliseconds.
    pub fn frame_millis(&self) -> u64 {
        (1000.0 / self.fps.max(1) as f64).round() as u64
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.simulation.validate()?;
        self.display.validate()
    }
}
