//! # bevy_sparks
//!
//! CPU point-particle emitter for Bevy: sparks, smoke, trails. Each emitter
//! owns its particles and is stepped once per frame; rendering is left to
//! the host, which reads the live particle list and draws it however it
//! likes (sprites, meshes, gizmos).
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_sparks::{presets, SparkEmitter, SparksPlugin};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(SparksPlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn((
//!         SparkEmitter::new(presets::sparks()),
//!         Transform::from_xyz(0.0, 1.0, 0.0),
//!     ));
//! }
//! ```
//!
//! The emitter core (`Emitter`) has no Bevy coupling beyond math types and
//! can be driven directly: `start()`, then each tick
//! `generate_particles(max, transform, time_scale)` followed by
//! `compute(dt, gravity)`, in that order.

pub mod clock;
pub mod curve;
pub mod emitter;
pub mod particle;
pub mod presets;

// Re-export core types
pub use clock::{EmitterClock, ManualClock, MonotonicClock};
pub use curve::{Curve, CurveKey};
pub use emitter::{DefaultBuilder, Emitter, EmitterConfig, ParticleBuilder, SimSpace};
pub use particle::Particle;

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Components & resources
// ---------------------------------------------------------------------------

/// Component wrapping an [`Emitter`] with host-side playback knobs. Newly
/// added emitters are started automatically by [`SparksPlugin`].
#[derive(Component)]
pub struct SparkEmitter {
    pub emitter: Emitter,
    /// Hard cap on the live particle count during generation.
    pub max_particles: usize,
    /// Playback rate multiplier applied to spawn scheduling.
    pub time_scale: f64,
}

impl SparkEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            emitter: Emitter::new(config),
            max_particles: 10_000,
            time_scale: 1.0,
        }
    }
}

/// Scalar gravity fed to every emitter's `compute` call. Emitters weight it
/// by their own `gravity_effect`.
#[derive(Resource)]
pub struct SparkGravity(pub f32);

impl Default for SparkGravity {
    fn default() -> Self {
        Self(-9.8)
    }
}

/// Library of named emitter configurations.
#[derive(Resource, Default)]
pub struct SparkLibrary {
    pub configs: HashMap<String, EmitterConfig>,
}

const SPARKS_DIR: &str = "assets/sparks";
const PRESET_SUFFIX: &str = ".spark.ron";

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Registers config types, the gravity resource, the preset library, and the
/// per-frame driver systems.
pub struct SparksPlugin;

impl Plugin for SparksPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Curve>()
            .register_type::<CurveKey>()
            .register_type::<EmitterConfig>()
            .register_type::<SimSpace>()
            .init_resource::<SparkGravity>()
            .init_resource::<SparkLibrary>()
            .add_systems(PreStartup, init_spark_library)
            .add_systems(
                Update,
                (spark_autostart, spark_simulate).chain(),
            )
            .add_systems(Update, auto_save_spark_presets);
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Arm freshly added emitters so they begin their delay countdown.
fn spark_autostart(mut query: Query<&mut SparkEmitter, Added<SparkEmitter>>) {
    for mut spark in &mut query {
        spark.emitter.start();
    }
}

/// Drive every emitter once per frame. Generation runs before compute:
/// generation reads emission progress that compute's state poll affects.
fn spark_simulate(
    time: Res<Time>,
    gravity: Res<SparkGravity>,
    mut query: Query<(&GlobalTransform, &mut SparkEmitter)>,
) {
    let dt = time.delta_secs();

    for (transform, mut spark) in &mut query {
        let matrix = transform.to_matrix();
        let (max_particles, time_scale) = (spark.max_particles, spark.time_scale);
        spark.emitter.generate_particles(max_particles, matrix, time_scale);
        spark.emitter.compute(dt, gravity.0);
    }
}

// ---------------------------------------------------------------------------
// Library initialization
// ---------------------------------------------------------------------------

fn init_spark_library(mut library: ResMut<SparkLibrary>) {
    // Populate with built-in defaults
    for (name, config) in presets::default_presets() {
        library.configs.entry(name.to_string()).or_insert(config);
    }

    // Load disk overrides
    load_configs_from_disk(&mut library);
}

// ---------------------------------------------------------------------------
// Disk persistence
// ---------------------------------------------------------------------------

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Write one named config to `assets/sparks/<name>.spark.ron`.
pub fn save_config_to_disk(name: &str, config: &EmitterConfig) {
    let dir = Path::new(SPARKS_DIR);
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Failed to create sparks directory: {}", e);
        return;
    }

    let filename = sanitize_filename(name);
    let path = dir.join(format!("{}{}", filename, PRESET_SUFFIX));

    let pretty = ron::ser::PrettyConfig::default();
    match ron::ser::to_string_pretty(config, pretty) {
        Ok(ron_str) => {
            if let Err(e) = std::fs::write(&path, &ron_str) {
                warn!("Failed to write spark preset '{}': {}", name, e);
            }
        }
        Err(e) => {
            warn!("Failed to serialize spark preset '{}': {}", name, e);
        }
    }
}

/// Load every `.spark.ron` file under `assets/sparks` into the library,
/// replacing same-named entries.
pub fn load_configs_from_disk(library: &mut SparkLibrary) {
    let dir = Path::new(SPARKS_DIR);
    if !dir.is_dir() {
        return;
    }

    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let fname = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !fname.ends_with(PRESET_SUFFIX) {
            continue;
        }

        let name = fname.trim_end_matches(PRESET_SUFFIX).to_string();
        if name.is_empty() {
            continue;
        }

        let Ok(contents) = std::fs::read_to_string(&path) else {
            warn!("Failed to read spark preset file: {:?}", path);
            continue;
        };

        match ron::from_str::<EmitterConfig>(&contents) {
            Ok(config) => {
                library.configs.insert(name.clone(), config);
                info!("Loaded spark preset '{}' from disk", name);
            }
            Err(e) => {
                warn!("Failed to parse spark preset '{:?}': {}", path, e);
            }
        }
    }
}

/// Persist library entries whose serialized form changed since last save.
fn auto_save_spark_presets(
    library: Res<SparkLibrary>,
    mut prev_state: Local<HashMap<String, String>>,
) {
    if !library.is_changed() {
        return;
    }

    for (name, config) in &library.configs {
        let ron_str = ron::to_string(config).unwrap_or_default();
        let changed = match prev_state.get(name) {
            Some(prev) => prev != &ron_str,
            None => true,
        };
        if changed {
            save_config_to_disk(name, config);
            prev_state.insert(name.clone(), ron_str);
        }
    }
}
