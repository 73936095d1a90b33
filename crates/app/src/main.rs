use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use terrain::features::FeatureTable;
use terrain::generate::GeneratorConfig;

mod editor;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Terrain Editor".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    });

    // Must be present before TerrainEditPlugin builds so the session picks it up.
    app.insert_resource(load_feature_table())
        .add_plugins((terrain::TerrainEditPlugin, rendering::TerrainRenderPlugin))
        .add_plugins(editor::EditorPlugin::new(load_generator_config()));

    app.run();
}

/// `TERRAIN_FEATURES=path.json` replaces the built-in feature table.
#[cfg(not(target_arch = "wasm32"))]
fn load_feature_table() -> FeatureTable {
    let Ok(path) = std::env::var("TERRAIN_FEATURES") else {
        return FeatureTable::default();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| FeatureTable::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(table) => {
            info!("Loaded {} features from {}", table.len(), path);
            table
        }
        Err(e) => {
            warn!("Failed to load feature table {}: {}, using defaults", path, e);
            FeatureTable::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_feature_table() -> FeatureTable {
    FeatureTable::default()
}

/// `TERRAIN_GENERATOR=path.json` overrides the demo map settings.
#[cfg(not(target_arch = "wasm32"))]
fn load_generator_config() -> GeneratorConfig {
    let Ok(path) = std::env::var("TERRAIN_GENERATOR") else {
        return GeneratorConfig::default();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| {
            serde_json::from_str::<GeneratorConfig>(&json).map_err(|e| e.to_string())
        });
    match parsed {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to read generator config {}: {}, using defaults", path, e);
            GeneratorConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_generator_config() -> GeneratorConfig {
    GeneratorConfig::default()
}
