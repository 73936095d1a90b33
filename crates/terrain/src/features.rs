//! Feature table: maps a cell's feature id to walkability and a color tint.
//!
//! The table is external configuration. Ids that do not resolve fall back to
//! `FeatureDef::fallback()` (walkable, untinted) and are reported once.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

pub type FeatureId = u16;

pub const FEATURE_GROUND: FeatureId = 0;
pub const FEATURE_GRASS: FeatureId = 1;
pub const FEATURE_FOREST: FeatureId = 2;
pub const FEATURE_SHALLOW_WATER: FeatureId = 3;
pub const FEATURE_DEEP_WATER: FeatureId = 4;
pub const FEATURE_ROCK: FeatureId = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDef {
    pub name: String,
    #[serde(default = "default_walkable")]
    pub walkable: bool,
    /// RGB multiplier applied on top of the ground palette.
    #[serde(default = "default_tint")]
    pub tint: [f32; 3],
}

fn default_walkable() -> bool {
    true
}

fn default_tint() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl FeatureDef {
    pub fn new(name: &str, walkable: bool, tint: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            walkable,
            tint,
        }
    }

    /// Conservative default for unresolved ids: walkable, no tint.
    pub fn fallback() -> &'static FeatureDef {
        static FALLBACK: std::sync::OnceLock<FeatureDef> = std::sync::OnceLock::new();
        FALLBACK.get_or_init(|| FeatureDef::new("unknown", true, default_tint()))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FeatureTableDoc {
    features: BTreeMap<FeatureId, FeatureDef>,
}

#[derive(Resource, Debug)]
pub struct FeatureTable {
    defs: BTreeMap<FeatureId, FeatureDef>,
    reported_misses: Mutex<HashSet<FeatureId>>,
}

impl Default for FeatureTable {
    fn default() -> Self {
        let mut defs = BTreeMap::new();
        defs.insert(FEATURE_GROUND, FeatureDef::new("ground", true, [1.0, 1.0, 1.0]));
        defs.insert(FEATURE_GRASS, FeatureDef::new("grass", true, [0.92, 1.05, 0.9]));
        defs.insert(FEATURE_FOREST, FeatureDef::new("forest", true, [0.7, 0.85, 0.65]));
        defs.insert(
            FEATURE_SHALLOW_WATER,
            FeatureDef::new("shallow_water", false, [0.65, 0.8, 1.1]),
        );
        defs.insert(
            FEATURE_DEEP_WATER,
            FeatureDef::new("deep_water", false, [0.35, 0.45, 0.8]),
        );
        defs.insert(FEATURE_ROCK, FeatureDef::new("rock", false, [0.85, 0.85, 0.88]));
        Self {
            defs,
            reported_misses: Mutex::new(HashSet::new()),
        }
    }
}

impl Clone for FeatureTable {
    fn clone(&self) -> Self {
        Self {
            defs: self.defs.clone(),
            reported_misses: Mutex::new(HashSet::new()),
        }
    }
}

impl FeatureTable {
    pub fn empty() -> Self {
        Self {
            defs: BTreeMap::new(),
            reported_misses: Mutex::new(HashSet::new()),
        }
    }

    /// Parse a table from a JSON document of the form
    /// `{"features": {"0": {"name": "ground", "walkable": true, "tint": [1,1,1]}}}`.
    pub fn from_json(json: &str) -> Result<Self, TerrainError> {
        let doc: FeatureTableDoc = serde_json::from_str(json)?;
        Ok(Self {
            defs: doc.features,
            reported_misses: Mutex::new(HashSet::new()),
        })
    }

    pub fn insert(&mut self, id: FeatureId, def: FeatureDef) {
        self.defs.insert(id, def);
    }

    pub fn get(&self, id: FeatureId) -> Option<&FeatureDef> {
        self.defs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Resolve an id, falling back to the conservative default on a miss.
    pub fn resolve(&self, id: FeatureId) -> &FeatureDef {
        match self.defs.get(&id) {
            Some(def) => def,
            None => {
                let first_miss = self
                    .reported_misses
                    .lock()
                    .map(|mut misses| misses.insert(id))
                    .unwrap_or(false);
                if first_miss {
                    warn!(
                        "FeatureTable: unknown feature id {}, using walkable default",
                        id
                    );
                }
                FeatureDef::fallback()
            }
        }
    }
}
