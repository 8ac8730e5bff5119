//! Built-in emitter presets for common point-particle effects.

use bevy::prelude::*;

use crate::curve::Curve;
use crate::emitter::{EmitterConfig, SimSpace};

/// Return the built-in presets as `(name, config)` pairs.
pub fn default_presets() -> Vec<(&'static str, EmitterConfig)> {
    vec![
        ("Sparks", sparks()),
        ("Smoke", smoke()),
        ("Trail", trail()),
    ]
}

/// Short-lived bright sparks thrown upward, spinning as they fade.
pub fn sparks() -> EmitterConfig {
    EmitterConfig {
        looping: true,
        lifetime: 0.5,
        lifetime_variation: 0.2,
        emission_per_second: 200,
        space: SimSpace::World,
        velocity: Vec3::new(0.0, 3.0, 0.0),
        velocity_variation: Vec3::new(2.0, 1.0, 2.0),
        position_variation: Vec3::splat(0.05),
        rotation: Curve::linear(0.0, 4.0),
        rotation_variation: 1.0,
        scale: Curve::from_points([(0.0, 0.08), (1.0, 0.02)]),
        scale_variation: 0.03,
        opacity: Curve::from_points([(0.0, 1.0), (0.7, 1.0), (1.0, 0.0)]),
        gravity_effect: 1.0,
        ..Default::default()
    }
}

/// Slow billows that grow, drift up, and thin out. Barely gravity-bound.
pub fn smoke() -> EmitterConfig {
    EmitterConfig {
        looping: true,
        lifetime: 3.0,
        lifetime_variation: 1.0,
        emission_per_second: 30,
        space: SimSpace::World,
        velocity: Vec3::new(0.0, 0.8, 0.0),
        velocity_variation: Vec3::new(0.4, 0.2, 0.4),
        position_variation: Vec3::new(0.3, 0.0, 0.3),
        rotation: Curve::linear(0.0, 0.6),
        rotation_variation: 2.0,
        scale: Curve::from_points([(0.0, 0.3), (1.0, 1.2)]),
        scale_variation: 0.2,
        opacity: Curve::from_points([(0.0, 0.0), (0.15, 0.5), (1.0, 0.0)]),
        opacity_variation: 0.3,
        gravity_effect: -0.05,
        ..Default::default()
    }
}

/// Dense local-space ribbon of small fading points for moving objects.
pub fn trail() -> EmitterConfig {
    EmitterConfig {
        looping: true,
        lifetime: 0.4,
        lifetime_variation: 0.1,
        emission_per_second: 300,
        space: SimSpace::Local,
        velocity_variation: Vec3::splat(0.1),
        position_variation: Vec3::splat(0.02),
        scale: Curve::from_points([(0.0, 0.06), (1.0, 0.0)]),
        opacity: Curve::linear(1.0, 0.0),
        gravity_effect: 0.0,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_well_formed() {
        for (name, config) in default_presets() {
            assert!(config.lifetime > 0.0, "{name}: lifetime must be positive");
            assert!(
                config.lifetime_variation < 2.0 * config.lifetime,
                "{name}: variation could produce non-positive lifetimes"
            );
            assert!(config.emission_per_second > 0, "{name}: emits nothing");
            assert!(
                !config.rotation.keys().is_empty()
                    && !config.scale.keys().is_empty()
                    && !config.opacity.keys().is_empty(),
                "{name}: curves need at least one key"
            );
        }
    }
}
