#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
use rand::Rng;

/// Default number of past positions each boid remembers.
pub const DEFAULT_HISTORY: usize = 100;

/// Lowest value of a randomly chosen color channel.
pub const COLOR_MIN: u8 = 50;

/// Alpha given to every spawned boid.
pub const COLOR_ALPHA: u8 = 220;

/// RGBA color, one byte per channel.
pub type Rgba = [u8; 4];

#[inline]
fn sqrt(value: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        value.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrt(value)
    }
}

/// A 3D vector used for position, velocity and acceleration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn length(&self) -> f64 {
        sqrt(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Length of `other - self`.
    pub fn distance(&self, other: &Vector3D) -> f64 {
        (*other - *self).length()
    }

    pub fn scale(&self, factor: f64) -> Self {
        *self * factor
    }

    /// Clamps every component independently to `[-max, max]`.
    pub fn clamp_components(&self, max: f64) -> Self {
        let clamp = |value: f64| {
            if value > max {
                max
            } else if value < -max {
                -max
            } else {
                value
            }
        };
        Self {
            x: clamp(self.x),
            y: clamp(self.y),
            z: clamp(self.z),
        }
    }

    /// Rescales the vector to length `max` when it is longer, keeping its direction.
    pub fn limit(&self, max: f64) -> Self {
        let len = self.length();
        if len > max {
            *self * (max / len)
        } else {
            *self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl core::ops::Add for Vector3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl core::ops::Sub for Vector3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl core::ops::Mul<f64> for Vector3D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl core::ops::Div<f64> for Vector3D {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl core::ops::Neg for Vector3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl core::ops::AddAssign for Vector3D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl core::ops::SubAssign for Vector3D {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

/// Axis-aligned box the flock is nudged back into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vector3D,
    pub max: Vector3D,
}

impl Bounds {
    pub const fn new(min: Vector3D, max: Vector3D) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, point: &Vector3D) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vector3D::new(-150.0, -150.0, -100.0),
            max: Vector3D::new(150.0, 150.0, 150.0),
        }
    }
}

/// A single boid entity
///
/// `H` is the capacity of the trail. Once it is full, recording a new
/// position drops the oldest one.
#[derive(Debug, Clone)]
pub struct Boid<const H: usize = DEFAULT_HISTORY> {
    pub position: Vector3D,
    pub velocity: Vector3D,
    /// Clamped velocity change applied on the most recent tick.
    pub acceleration: Vector3D,
    trail: heapless::HistoryBuffer<Vector3D, H>,
    color: Rgba,
}

impl<const H: usize> Boid<H> {
    pub fn new(position: Vector3D, velocity: Vector3D) -> Self {
        Self::with_color(position, velocity, [255, 255, 255, COLOR_ALPHA])
    }

    pub fn with_color(position: Vector3D, velocity: Vector3D, color: Rgba) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vector3D::zero(),
            trail: heapless::HistoryBuffer::new(),
            color,
        }
    }

    #[cfg(feature = "std")]
    pub fn random<R: Rng + ?Sized>(spawn: &Spawn, rng: &mut R) -> Self {
        let mut sample = |min: f64, max: f64| min + (max - min) * rng.gen::<f64>();

        let bounds = &spawn.bounds;
        let position = Vector3D::new(
            sample(bounds.min.x, bounds.max.x),
            sample(bounds.min.y, bounds.max.y),
            sample(bounds.min.z, bounds.max.z),
        );
        let velocity = Vector3D::new(
            sample(spawn.speed.min, spawn.speed.max),
            sample(spawn.speed.min, spawn.speed.max),
            sample(spawn.speed.min, spawn.speed.max),
        );

        let mut channel = || sample(COLOR_MIN as f64, 255.0) as u8;
        let color = [channel(), channel(), channel(), COLOR_ALPHA];

        Self::with_color(position, velocity, color)
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Pushes the current position onto the trail.
    pub fn record_position(&mut self) {
        self.trail.write(self.position);
    }

    /// Recorded positions, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &Vector3D> + '_ {
        self.trail.oldest_ordered()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn last_position(&self) -> Option<&Vector3D> {
        self.trail.recent()
    }

    /// Commits a motion computed by [`behavior::motion`].
    pub fn apply(&mut self, motion: behavior::Motion) {
        self.acceleration = motion.acceleration;
        self.velocity = motion.velocity;
        self.position = motion.position;
        self.record_position();
    }
}

/// Rule constants for the flock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockConfig {
    /// Boids closer than this are neighbors.
    pub scan_radius: f64,
    /// Neighbors closer than this push the boid away.
    pub avoid_radius: f64,
    pub cohesion_factor: f64,
    pub alignment_factor: f64,
    pub max_speed: f64,
    /// Per-axis limit on the velocity change of one tick.
    pub max_accel: f64,
    /// Step applied per tick on each axis where a boid is out of bounds.
    pub bind_increment: f64,
    pub bounds: Bounds,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            scan_radius: 40.0,
            avoid_radius: 20.0,
            cohesion_factor: 0.01,
            alignment_factor: 0.75,
            max_speed: 2.0,
            max_accel: 0.25,
            bind_increment: 1.0,
            bounds: Bounds::default(),
        }
    }
}

/// Half-open band `[min, max)` each initial velocity component is drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Where and how fast new boids start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub bounds: Bounds,
    pub speed: SpeedRange,
}

impl Default for Spawn {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            speed: SpeedRange::new(1.0, 1.9),
        }
    }
}

/// The flocking rules, split into the steps of one tick
pub mod behavior {
    use super::*;

    /// Sums gathered while scanning the neighbors of one boid.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Neighborhood {
        pub count: usize,
        pub position_sum: Vector3D,
        pub velocity_sum: Vector3D,
        /// Accumulated push away from neighbors inside the avoid radius.
        pub separation: Vector3D,
    }

    /// Next state of one boid, computed from the start-of-tick snapshot.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Motion {
        pub acceleration: Vector3D,
        pub velocity: Vector3D,
        pub position: Vector3D,
    }

    pub fn scan<const H: usize>(
        boids: &[Boid<H>],
        index: usize,
        config: &FlockConfig,
    ) -> Neighborhood {
        let boid = &boids[index];
        let mut hood = Neighborhood::default();

        for (j, other) in boids.iter().enumerate() {
            if j == index {
                continue;
            }
            let distance = boid.position.distance(&other.position);
            if distance < config.scan_radius {
                hood.count += 1;
                hood.position_sum += other.position;
                if distance < config.avoid_radius {
                    hood.separation -= other.position - boid.position;
                }
                hood.velocity_sum += other.velocity;
            }
        }

        hood
    }

    /// Pull toward the average neighbor position. Zero without neighbors.
    pub fn cohesion<const H: usize>(
        boid: &Boid<H>,
        hood: &Neighborhood,
        config: &FlockConfig,
    ) -> Vector3D {
        if hood.count == 0 {
            return Vector3D::zero();
        }
        (hood.position_sum / hood.count as f64 - boid.position) * config.cohesion_factor
    }

    /// Push away from crowding neighbors. Not averaged.
    pub fn separation(hood: &Neighborhood) -> Vector3D {
        hood.separation
    }

    /// Pull toward the average neighbor velocity. Zero without neighbors.
    pub fn alignment<const H: usize>(
        boid: &Boid<H>,
        hood: &Neighborhood,
        config: &FlockConfig,
    ) -> Vector3D {
        if hood.count == 0 {
            return Vector3D::zero();
        }
        (hood.velocity_sum / hood.count as f64 - boid.velocity) * config.alignment_factor
    }

    /// Sum of the three rules, clamped per axis to `max_accel`.
    pub fn steer<const H: usize>(
        boid: &Boid<H>,
        hood: &Neighborhood,
        config: &FlockConfig,
    ) -> Vector3D {
        let delta = cohesion(boid, hood, config) + separation(hood) + alignment(boid, hood, config);
        delta.clamp_components(config.max_accel)
    }

    /// Nudges each out-of-bounds axis back by `bind_increment`.
    pub fn contain(mut position: Vector3D, config: &FlockConfig) -> Vector3D {
        let nudge = |value: &mut f64, min: f64, max: f64| {
            if *value < min {
                *value += config.bind_increment;
            } else if *value > max {
                *value -= config.bind_increment;
            }
        };

        let bounds = &config.bounds;
        nudge(&mut position.x, bounds.min.x, bounds.max.x);
        nudge(&mut position.y, bounds.min.y, bounds.max.y);
        nudge(&mut position.z, bounds.min.z, bounds.max.z);
        position
    }

    /// Applies `acceleration`, clamps speed, takes one unit step and contains.
    pub fn integrate<const H: usize>(
        boid: &Boid<H>,
        acceleration: Vector3D,
        config: &FlockConfig,
    ) -> Motion {
        let velocity = (boid.velocity + acceleration).limit(config.max_speed);
        let position = contain(boid.position + velocity, config);

        Motion {
            acceleration,
            velocity,
            position,
        }
    }

    pub fn motion<const H: usize>(boids: &[Boid<H>], index: usize, config: &FlockConfig) -> Motion {
        let boid = &boids[index];
        let hood = scan(boids, index, config);
        let acceleration = steer(boid, &hood, config);
        integrate(boid, acceleration, config)
    }
}

/// A fixed population of `N` boids for embedded (no_std) environments
#[derive(Debug, Clone)]
pub struct Flock<const N: usize, const H: usize = DEFAULT_HISTORY> {
    boids: heapless::Vec<Boid<H>, N>,
    pub config: FlockConfig,
}

impl<const N: usize, const H: usize> Flock<N, H> {
    /// Builds the flock from `make(i)` for every index below `N`.
    pub fn from_fn<F>(config: FlockConfig, mut make: F) -> Self
    where
        F: FnMut(usize) -> Boid<H>,
    {
        let mut boids = heapless::Vec::new();
        for i in 0..N {
            // Capacity is N, so this never fails.
            let _ = boids.push(make(i));
        }
        Self { boids, config }
    }

    #[cfg(feature = "std")]
    pub fn initialize<R: Rng + ?Sized>(spawn: &Spawn, config: FlockConfig, rng: &mut R) -> Self {
        Self::from_fn(config, |_| Boid::random(spawn, rng))
    }

    pub fn boids(&self) -> &[Boid<H>] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn tick(&mut self) {
        // Every motion reads the same snapshot before any boid moves
        let mut motions = heapless::Vec::<behavior::Motion, N>::new();
        for i in 0..self.boids.len() {
            let _ = motions.push(behavior::motion(&self.boids, i, &self.config));
        }

        for (boid, motion) in self.boids.iter_mut().zip(motions) {
            boid.apply(motion);
        }
    }
}

/// A fixed population of boids for std environments, sized at startup
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct FlockStd<const H: usize = DEFAULT_HISTORY> {
    boids: Vec<Boid<H>>,
    pub config: FlockConfig,
}

#[cfg(feature = "std")]
impl<const H: usize> FlockStd<H> {
    pub fn from_boids(boids: Vec<Boid<H>>, config: FlockConfig) -> Self {
        Self { boids, config }
    }

    pub fn initialize<R: Rng + ?Sized>(
        count: usize,
        spawn: &Spawn,
        config: FlockConfig,
        rng: &mut R,
    ) -> Self {
        let boids = (0..count).map(|_| Boid::random(spawn, rng)).collect();
        Self { boids, config }
    }

    /// Spawns `count` boids inside the configured bounds using the thread RNG.
    pub fn random(count: usize, config: FlockConfig) -> Self {
        let spawn = Spawn {
            bounds: config.bounds,
            ..Spawn::default()
        };
        Self::initialize(count, &spawn, config, &mut rand::thread_rng())
    }

    pub fn boids(&self) -> &[Boid<H>] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn tick(&mut self) {
        let motions: Vec<behavior::Motion> = (0..self.boids.len())
            .map(|i| behavior::motion(&self.boids, i, &self.config))
            .collect();

        for (boid, motion) in self.boids.iter_mut().zip(motions) {
            boid.apply(motion);
        }
    }
}
