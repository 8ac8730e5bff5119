//! Emitter configuration, lifecycle state machine, and spawn scheduling.

use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::{EmitterClock, MonotonicClock};
use crate::curve::Curve;
use crate::particle::Particle;

// ---------------------------------------------------------------------------
// Simulation space
// ---------------------------------------------------------------------------

/// Whether freshly spawned particles are transformed into world coordinates
/// or left in the emitter's local frame.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum SimSpace {
    /// Spawn position is transformed by the host's model matrix and spawn
    /// velocity is rotated by its rotational component.
    #[default]
    World,
    /// Spawned kinematic state stays in the emitter's local frame.
    Local,
}

// ---------------------------------------------------------------------------
// Emitter configuration
// ---------------------------------------------------------------------------

/// Serializable emitter configuration. Runtime state lives on [`Emitter`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
pub struct EmitterConfig {
    /// Whether the emitter reacts to `start`/`compute` at all.
    pub enabled: bool,
    /// Seconds of emission after activation, when `looping` is false.
    pub duration: f32,
    /// Loop forever instead of arming the duration countdown.
    pub looping: bool,
    /// Seconds between `start()` and actual activation.
    pub delay: f32,

    /// Base particle lifetime in seconds. Must be > 0.
    pub lifetime: f32,
    /// Lifetime variation half-width (uniform, centered on the base).
    pub lifetime_variation: f32,
    /// Particles spawned per second while active.
    pub emission_per_second: u32,
    /// Coordinate space for spawned kinematic state.
    pub space: SimSpace,

    pub velocity: Vec3,
    pub velocity_variation: Vec3,
    pub position: Vec3,
    pub position_variation: Vec3,

    /// Rotation over life phase, plus a per-particle additive offset width.
    pub rotation: Curve,
    pub rotation_variation: f32,
    /// Scale over life phase, plus a per-particle additive offset width.
    pub scale: Curve,
    pub scale_variation: f32,
    /// Opacity over life phase; its variation multiplies the curve value.
    pub opacity: Curve,
    pub opacity_variation: f32,

    /// Multiplier on the host's gravity scalar.
    pub gravity_effect: f32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 5.0,
            looping: false,
            delay: 0.0,
            lifetime: 1.0,
            lifetime_variation: 0.0,
            emission_per_second: 100,
            space: SimSpace::World,
            velocity: Vec3::ZERO,
            velocity_variation: Vec3::ZERO,
            position: Vec3::ZERO,
            position_variation: Vec3::ZERO,
            rotation: Curve::constant(0.0),
            rotation_variation: 0.0,
            scale: Curve::constant(1.0),
            scale_variation: 0.0,
            opacity: Curve::constant(1.0),
            opacity_variation: 0.0,
            gravity_effect: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Particle builder strategy
// ---------------------------------------------------------------------------

/// Pluggable spawn strategy. The emitter calls this once per spawned
/// particle; implementations may carry state (burst patterns, pools, ...).
pub trait ParticleBuilder: Send + Sync {
    fn build(&mut self, config: &EmitterConfig, rng: &mut fastrand::Rng) -> Particle;
}

/// Default spawn logic: every randomized attribute is its base value plus a
/// uniform sample in ±half the configured variation width.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBuilder;

impl ParticleBuilder for DefaultBuilder {
    fn build(&mut self, config: &EmitterConfig, rng: &mut fastrand::Rng) -> Particle {
        let lifetime = config.lifetime + config.lifetime_variation * (rng.f32() - 0.5);

        let position = config.position
            + Vec3::new(
                config.position_variation.x * (rng.f32() - 0.5),
                config.position_variation.y * (rng.f32() - 0.5),
                config.position_variation.z * (rng.f32() - 0.5),
            );

        let velocity = config.velocity
            + Vec3::new(
                config.velocity_variation.x * (rng.f32() - 0.5),
                config.velocity_variation.y * (rng.f32() - 0.5),
                config.velocity_variation.z * (rng.f32() - 0.5),
            );

        let rotation_offset = config.rotation_variation * (rng.f32() - 0.5);
        let scale_offset = config.scale_variation * (rng.f32() - 0.5);
        let opacity_offset = config.opacity_variation * (rng.f32() - 0.5);

        Particle::new(
            config,
            lifetime,
            position,
            velocity,
            rotation_offset,
            scale_offset,
            opacity_offset,
        )
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Status {
    #[default]
    Down,
    Up,
}

/// A particle emitter: configuration plus the live particle collection and
/// the start/stop state machine.
///
/// Single-threaded by design: one host loop drives `start`/`stop`/
/// `generate_particles`/`compute`; there is no internal locking. The
/// expected per-tick order is `generate_particles` first, then `compute` —
/// generation reads emission progress that compute's state poll resets.
pub struct Emitter {
    pub config: EmitterConfig,
    particles: Vec<Particle>,
    rng: fastrand::Rng,
    builder: Box<dyn ParticleBuilder>,
    clock: Box<dyn EmitterClock>,
    status: Status,
    /// Set once by `start()`; `compute` stays a no-op until then. Survives
    /// `stop()` so particles left alive keep advancing while Down.
    armed: bool,
    up_at: Duration,
    total_emitted: u64,
    delay_deadline: Option<Duration>,
    duration_deadline: Option<Duration>,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            config,
            particles: Vec::new(),
            rng: fastrand::Rng::new(),
            builder: Box::new(DefaultBuilder),
            clock: Box::new(MonotonicClock::default()),
            status: Status::Down,
            armed: false,
            up_at: Duration::ZERO,
            total_emitted: 0,
            delay_deadline: None,
            duration_deadline: None,
        }
    }

    /// Seed the emitter's random source for deterministic spawning.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Replace the spawn strategy.
    pub fn with_builder(mut self, builder: impl ParticleBuilder + 'static) -> Self {
        self.builder = Box::new(builder);
        self
    }

    /// Replace the time source (e.g. [`crate::clock::ManualClock`]).
    pub fn with_clock(mut self, clock: impl EmitterClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Arm the emitter. Activation happens when the delay countdown fires
    /// inside a later `compute` call, never here. No-op unless the emitter
    /// is enabled and currently down.
    pub fn start(&mut self) {
        if !self.config.enabled || self.status != Status::Down {
            return;
        }

        let now = self.clock.now();
        self.armed = true;
        self.delay_deadline = Some(now + Duration::from_secs_f32(self.config.delay));
        self.duration_deadline = None;

        if self.particles.is_empty() {
            self.particles.reserve(self.config.emission_per_second as usize);
        }
    }

    /// Disarm emission: zero the emitted counter, cancel both countdowns,
    /// go down. No-op unless currently up. Live particles are kept and keep
    /// advancing on subsequent `compute` calls.
    pub fn stop(&mut self) {
        if self.status != Status::Up {
            return;
        }
        self.total_emitted = 0;
        self.delay_deadline = None;
        self.duration_deadline = None;
        self.status = Status::Down;
    }

    /// Per-frame state poll and particle advance. `dt` is the elapsed frame
    /// time in seconds, `gravity` the host's gravity scalar (e.g. -9.8).
    ///
    /// No-op until `start()` has armed the emitter. Expired particles are
    /// removed the frame their remaining life first reaches <= 0.
    pub fn compute(&mut self, dt: f32, gravity: f32) {
        if !self.config.enabled || !self.armed {
            return;
        }

        let now = self.clock.now();

        if let Some(deadline) = self.delay_deadline {
            if now >= deadline {
                self.delay_deadline = None;
                if !self.config.looping {
                    self.duration_deadline =
                        Some(now + Duration::from_secs_f32(self.config.duration));
                }
                self.up_at = now;
                self.status = Status::Up;
            }
        }

        if let Some(deadline) = self.duration_deadline {
            if now >= deadline {
                self.stop();
            }
        }

        let gravity_delta = self.config.gravity_effect * gravity * dt;
        let mut i = 0;
        while i < self.particles.len() {
            self.particles[i].advance(&self.config, dt, gravity_delta);
            if self.particles[i].life_remaining <= 0.0 {
                // shift-remove; the scan index stays put so nothing is
                // skipped or visited twice
                self.particles.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Spawn the particles owed for the time elapsed since activation,
    /// scaled by `time_scale` and rounded to nearest. Each spawn is gated by
    /// `max_particles`, but the emitted counter advances per attempt either
    /// way: emission pacing follows the clock, not the live population.
    pub fn generate_particles(&mut self, max_particles: usize, transform: Mat4, time_scale: f64) {
        if self.status != Status::Up {
            return;
        }

        let elapsed = (self.clock.now() - self.up_at).as_secs_f64();
        let wanted = (elapsed * f64::from(self.config.emission_per_second)
            - self.total_emitted as f64)
            * time_scale;

        for _ in 0..wanted.round() as i64 {
            if self.particles.len() < max_particles {
                self.add_particle(transform);
            }
            self.total_emitted += 1;
        }
    }

    /// The live particle list, in spawn order. Treat as a snapshot valid
    /// until the next mutating call.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// True while the emitter is actively spawning (delay fired, not yet
    /// stopped).
    pub fn is_active(&self) -> bool {
        self.status == Status::Up
    }

    /// Cumulative spawn attempts since activation; reset by `stop()`.
    pub fn total_emitted(&self) -> u64 {
        self.total_emitted
    }

    fn add_particle(&mut self, transform: Mat4) {
        let mut particle = self.builder.build(&self.config, &mut self.rng);

        if self.config.space == SimSpace::World {
            particle.position = transform.transform_point3(particle.position);
            // rotational component only: translation must not bend velocity
            particle.velocity = Quat::from_mat4(&transform) * particle.velocity;
        }

        self.particles.push(particle);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
