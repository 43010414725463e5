// defaults for the on-disk layout and the validator budget
pub const INDEX_SAVE_PATH: &str = "asset_index.json";
pub const SAVED_LEVELS_DIR: &str = "saved_levels";

pub const MAX_COLLISION_REPORTS: usize = 5;
pub const MAX_VALIDATOR_LOOPS: usize = 3;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "of", "in", "on", "at", "to", "for", "with",
    "by", "and", "or",
];

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

/// `[width, height]` in tile units.
pub type Size = [f64; 2];

/// `[x, y]` in tile units. For placed instances this is the bottom-center anchor.
pub type Point = [f64; 2];

/// ─────────────────────────────────────────────────────
/// Asset index (persisted as `asset_index.json`)
/// ─────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIndexEntry {
    pub path_relative: String,
    pub dimensions_tiles: [u32; 2],
    pub tokens: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Absolute asset-pack root every `path_relative` is resolved against.
    pub base_path: PathBuf,
}

impl Default for IndexMetadata {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
        }
    }
}

/// The whole index document. `assets` keeps document order, which decides
/// ties during retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetIndex {
    #[serde(default)]
    pub metadata: IndexMetadata,
    #[serde(default)]
    pub assets: IndexMap<String, AssetIndexEntry>,
}

impl AssetIndex {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            metadata: IndexMetadata {
                base_path: base_path.into(),
            },
            assets: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, entry: AssetIndexEntry) {
        self.assets.insert(entry.path_relative.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// ─────────────────────────────────────────────────────
/// Scene plan, as read from the generated JSON document
/// ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Tile,
    Object,
    Npc,
    Agent,
}

impl AssetKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tile" => Some(Self::Tile),
            "object" => Some(Self::Object),
            "npc" => Some(Self::Npc),
            "agent" => Some(Self::Agent),
            _ => None,
        }
    }
}

/// One catalog entry. Sizes that were missing or malformed in the document
/// stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneAsset {
    pub kind: Option<AssetKind>,
    pub description: String,
    pub base_size: Option<Size>,
    pub visual_size: Option<Size>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Floor,
    Wall,
    Object,
    Npc,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Floor, Layer::Wall, Layer::Object, Layer::Npc];

    /// Floor and wall use `fill_rect` areas and never take part in point collision.
    pub const COLLIDABLE: [Layer; 2] = [Layer::Object, Layer::Npc];

    pub fn key(self) -> &'static str {
        match self {
            Layer::Floor => "floor_layer",
            Layer::Wall => "wall_layer",
            Layer::Object => "object_layer",
            Layer::Npc => "npc_layer",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    pub asset_id: String,
    /// `None` for `fill_rect` area commands and for unreadable positions.
    pub position: Option<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneLayout {
    pub floor_layer: Vec<PlacedInstance>,
    pub wall_layer: Vec<PlacedInstance>,
    pub object_layer: Vec<PlacedInstance>,
    pub npc_layer: Vec<PlacedInstance>,
}

impl SceneLayout {
    pub fn layer(&self, layer: Layer) -> &[PlacedInstance] {
        match layer {
            Layer::Floor => &self.floor_layer,
            Layer::Wall => &self.wall_layer,
            Layer::Object => &self.object_layer,
            Layer::Npc => &self.npc_layer,
        }
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut Vec<PlacedInstance> {
        match layer {
            Layer::Floor => &mut self.floor_layer,
            Layer::Wall => &mut self.wall_layer,
            Layer::Object => &mut self.object_layer,
            Layer::Npc => &mut self.npc_layer,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetProperties {
    pub physics: Option<String>,
}

impl AssetProperties {
    pub fn is_passable(&self) -> bool {
        self.physics.as_deref() == Some("passable")
    }
}

/// Typed view of a scene-plan document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenePlan {
    pub assets: IndexMap<String, SceneAsset>,
    pub layout: SceneLayout,
    pub properties: HashMap<String, AssetProperties>,
}

impl ScenePlan {
    pub fn is_passable(&self, asset_id: &str) -> bool {
        self.properties
            .get(asset_id)
            .is_some_and(AssetProperties::is_passable)
    }
}
