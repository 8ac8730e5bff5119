//! A single simulated particle and its per-frame advance step.

use bevy::prelude::*;

use crate::emitter::EmitterConfig;

/// One live particle. Pure data plus the fixed per-life variation offsets
/// sampled at spawn; owned and advanced exclusively by its emitter.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    /// Total lifetime in seconds.
    pub lifetime: f32,
    /// Remaining lifetime in seconds; the particle is retired once <= 0.
    pub life_remaining: f32,
    pub velocity: Vec3,
    pub position: Vec3,
    /// Current rotation, driven by the emitter's rotation curve.
    pub rotation: f32,
    /// Current scale, driven by the emitter's scale curve.
    pub scale: f32,
    /// Current opacity, driven by the emitter's opacity curve.
    pub opacity: f32,

    rotation_offset: f32,
    scale_offset: f32,
    opacity_offset: f32,
}

impl Particle {
    /// Create a particle at life phase 0. The offsets bias curve sampling
    /// for this particle's entire life; rotation and scale offsets are
    /// additive, the opacity offset is multiplicative relative to the
    /// curve's base value.
    pub fn new(
        config: &EmitterConfig,
        lifetime: f32,
        position: Vec3,
        velocity: Vec3,
        rotation_offset: f32,
        scale_offset: f32,
        opacity_offset: f32,
    ) -> Self {
        let opacity_base = config.opacity.evaluate(0.0);
        Self {
            lifetime,
            life_remaining: lifetime,
            velocity,
            position,
            rotation: config.rotation.evaluate(0.0) + rotation_offset,
            scale: config.scale.evaluate(0.0) + scale_offset,
            opacity: opacity_base + opacity_offset * opacity_base,
            rotation_offset,
            scale_offset,
            opacity_offset,
        }
    }

    /// Fraction of life elapsed, in [0..1], used to sample curves.
    pub fn life_phase(&self) -> f32 {
        1.0 - self.life_remaining / self.lifetime
    }

    /// Advance one frame. `gravity_delta` is the velocity change along Y
    /// already integrated over `dt` by the emitter.
    ///
    /// The life phase is sampled before decrementing, so a particle's first
    /// advance evaluates the curves at phase 0. Opacity feeds the prior
    /// frame's value back through the offset, compounding frame over frame.
    pub(crate) fn advance(&mut self, config: &EmitterConfig, dt: f32, gravity_delta: f32) {
        let remaining = self.life_remaining / self.lifetime;

        self.life_remaining -= dt;
        self.velocity += Vec3::new(0.0, gravity_delta, 0.0);
        self.position += self.velocity * dt;
        self.rotation = config.rotation.evaluate(1.0 - remaining) + self.rotation_offset;
        self.scale = config.scale.evaluate(1.0 - remaining) + self.scale_offset;
        self.opacity =
            config.opacity.evaluate(1.0 - remaining) + self.opacity * self.opacity_offset;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;

    fn config() -> EmitterConfig {
        EmitterConfig {
            rotation: Curve::linear(0.0, 1.0),
            scale: Curve::linear(1.0, 2.0),
            opacity: Curve::linear(0.2, 1.0),
            ..Default::default()
        }
    }

    fn plain_particle(config: &EmitterConfig, lifetime: f32) -> Particle {
        Particle::new(config, lifetime, Vec3::ZERO, Vec3::ZERO, 0.0, 0.0, 0.0)
    }

    #[test]
    fn spawn_samples_curves_at_phase_zero() {
        let config = config();
        let p = Particle::new(&config, 1.0, Vec3::ZERO, Vec3::ZERO, 0.1, 0.2, 0.5);
        assert!((p.rotation - 0.1).abs() < 1e-6);
        assert!((p.scale - 1.2).abs() < 1e-6);
        // opacity offset multiplies the curve base instead of adding
        assert!((p.opacity - (0.2 + 0.5 * 0.2)).abs() < 1e-6);
    }

    #[test]
    fn advance_decrements_life_by_exactly_dt() {
        let config = config();
        let mut p = plain_particle(&config, 1.0);
        p.advance(&config, 0.25, 0.0);
        assert_eq!(p.life_remaining, 0.75);
        p.advance(&config, 0.25, 0.0);
        assert_eq!(p.life_remaining, 0.5);
        // no clamping at zero: remaining keeps falling past expiry
        p.advance(&config, 0.75, 0.0);
        assert_eq!(p.life_remaining, -0.25);
    }

    #[test]
    fn advance_integrates_gravity_then_position() {
        let config = config();
        let mut p = Particle::new(
            &config,
            2.0,
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            0.0,
            0.0,
            0.0,
        );
        // gravity_delta applies to velocity before the position step
        p.advance(&config, 0.5, -2.0);
        assert!((p.velocity - Vec3::new(1.0, -2.0, 0.0)).length() < 1e-6);
        assert!((p.position - Vec3::new(0.5, -1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn advance_samples_phase_before_decrement() {
        let config = config();
        let mut p = plain_particle(&config, 1.0);
        // first frame still evaluates at phase 0
        p.advance(&config, 0.5, 0.0);
        assert!((p.rotation - 0.0).abs() < 1e-6);
        // second frame sees half the life gone
        p.advance(&config, 0.5, 0.0);
        assert!((p.rotation - 0.5).abs() < 1e-6);
    }

    #[test]
    fn opacity_feedback_trajectory_is_stable() {
        let config = config();
        let mut p = Particle::new(&config, 2.0, Vec3::ZERO, Vec3::ZERO, 0.0, 0.0, 0.1);
        assert!((p.opacity - 0.22).abs() < 1e-5);

        // Each frame: curve(phase) + previous_opacity * offset
        p.advance(&config, 0.5, 0.0);
        assert!((p.opacity - 0.222).abs() < 1e-5);
        p.advance(&config, 0.5, 0.0);
        assert!((p.opacity - 0.4222).abs() < 1e-5);
        p.advance(&config, 0.5, 0.0);
        assert!((p.opacity - 0.64222).abs() < 1e-5);
    }

    #[test]
    fn life_phase_reports_elapsed_fraction() {
        let config = config();
        let mut p = plain_particle(&config, 2.0);
        assert_eq!(p.life_phase(), 0.0);
        p.advance(&config, 1.0, 0.0);
        assert!((p.life_phase() - 0.5).abs() < 1e-6);
    }
}
