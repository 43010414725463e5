//! Decide how each catalog asset gets its art, and find reference images
//! for the ones that are generated from a reference.

use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::model::{AssetKind, Layer, SceneAsset, ScenePlan};
use crate::parser::read_plan;
use crate::processor::retriever::{AssetQuery, AssetRetriever};

/// Used for the `_side` texture when the wall has no `visual_size`.
const DEFAULT_WALL_VISUAL: [u32; 2] = [1, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRoute {
    /// Procedural wall texture.
    WallTile,
    /// Procedural floor texture.
    FloorTile,
    /// Image generation guided by a reference from the asset pack.
    Object,
    /// Character sprite sheet (npc / agent).
    Character,
    Unhandled,
}

/// One row of the art plan.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetArt {
    pub asset_id: String,
    pub route: AssetRoute,
    /// Only ever set for `AssetRoute::Object`.
    pub reference: Option<PathBuf>,
}

pub fn route(asset_id: &str, asset: &SceneAsset) -> AssetRoute {
    let description = asset.description.to_lowercase();
    let is_tile = asset.kind == Some(AssetKind::Tile);
    // "wall_clock" / "floor_clock" are props, not surfaces
    let surface_prefix = |prefix: &str| asset_id.starts_with(prefix) && !asset_id.contains("clock");

    if (is_tile && description.contains("wall")) || surface_prefix("wall_") {
        AssetRoute::WallTile
    } else if (is_tile && description.contains("floor")) || surface_prefix("floor_") {
        AssetRoute::FloorTile
    } else {
        match asset.kind {
            Some(AssetKind::Object) => AssetRoute::Object,
            Some(AssetKind::Npc | AssetKind::Agent) => AssetRoute::Character,
            _ => AssetRoute::Unhandled,
        }
    }
}

/// Route every catalog asset (catalog order) and look up references for objects.
pub fn plan_asset_art(plan: &ScenePlan, retriever: &AssetRetriever) -> Vec<AssetArt> {
    plan.assets
        .iter()
        .map(|(asset_id, asset)| {
            let route = route(asset_id, asset);
            let reference = match route {
                AssetRoute::Object => {
                    retriever.find_closest_reference_image(asset_id, &AssetQuery::from(asset))
                }
                _ => None,
            };
            AssetArt {
                asset_id: asset_id.clone(),
                route,
                reference,
            }
        })
        .collect()
}

/// Replace every wall-routed asset by a `<id>_top` / `<id>_side` pair and
/// point each `wall_layer` entry at the half matching its area.
///
/// Wide areas (`w > h`) and squares get `_top`, tall ones (`h > w`) get
/// `_side`. Properties are copied to both halves. Returns the split ids in
/// catalog order.
pub fn split_walls(plan: &mut Value) -> Vec<String> {
    let Ok(reading) = read_plan(plan) else {
        return Vec::new();
    };
    let Some(assets) = plan.get_mut("assets").and_then(Value::as_object_mut) else {
        return Vec::new();
    };

    let mut split = Vec::new();
    let mut rebuilt = Map::new();
    for (asset_id, details) in std::mem::take(assets) {
        let is_wall = reading
            .plan
            .assets
            .get(&asset_id)
            .is_some_and(|asset| route(&asset_id, asset) == AssetRoute::WallTile);
        let details = match details {
            Value::Object(details) if is_wall => details,
            other => {
                rebuilt.insert(asset_id, other);
                continue;
            }
        };

        let mut top = details.clone();
        top.insert("description".into(), json!(format!("Top-Down view of {asset_id}")));

        let mut side = details.clone();
        side.insert("description".into(), json!(format!("Side-view of {asset_id}")));
        let visual = details
            .get("visual_size")
            .cloned()
            .unwrap_or_else(|| json!(DEFAULT_WALL_VISUAL));
        side.insert("visual_size".into(), visual);

        rebuilt.insert(format!("{asset_id}_top"), Value::Object(top));
        rebuilt.insert(format!("{asset_id}_side"), Value::Object(side));
        split.push(asset_id);
    }
    *assets = rebuilt;

    if split.is_empty() {
        return split;
    }
    log::info!("Split {} wall asset(s) into top/side pairs", split.len());
    let walls: HashSet<&str> = split.iter().map(String::as_str).collect();

    if let Some(props) = plan.get_mut("properties").and_then(Value::as_object_mut) {
        let mut rebuilt = Map::new();
        for (asset_id, entry) in std::mem::take(props) {
            if walls.contains(asset_id.as_str()) {
                rebuilt.insert(format!("{asset_id}_top"), entry.clone());
                rebuilt.insert(format!("{asset_id}_side"), entry);
            } else {
                rebuilt.insert(asset_id, entry);
            }
        }
        *props = rebuilt;
    }

    let entries = plan
        .get_mut("layout")
        .and_then(|layout| layout.get_mut(Layer::Wall.key()))
        .and_then(Value::as_array_mut);
    for entry in entries.into_iter().flatten() {
        let Some(asset_id) = entry.get("asset_id").and_then(Value::as_str) else {
            continue;
        };
        if !walls.contains(asset_id) {
            continue;
        }
        let half = if area_is_tall(entry.get("area")) { "side" } else { "top" };
        let renamed = format!("{asset_id}_{half}");
        entry["asset_id"] = json!(renamed);
    }
    split
}

/// `[x, y, w, h]` with `h > w`. Anything unreadable counts as a square.
fn area_is_tall(area: Option<&Value>) -> bool {
    match area.and_then(Value::as_array).map(Vec::as_slice) {
        Some([_, _, w, h]) => match (w.as_f64(), h.as_f64()) {
            (Some(w), Some(h)) => h > w,
            _ => false,
        },
        _ => false,
    }
}
