use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{ForgeError, Result};
use crate::model::{
    AssetIndex, AssetKind, AssetProperties, Layer, PlacedInstance, Point, SceneAsset, ScenePlan,
    Size,
};

/// Outcome of reading a scene-plan document into a `ScenePlan`.
///
/// Hard problems (the validator reports them verbatim) are kept apart from
/// soft ones, which only mean some instance could not be sized or placed.
#[derive(Debug, Clone, Default)]
pub struct PlanReading {
    pub plan: ScenePlan,
    /// Set when the `assets` catalog is absent, empty or not an object.
    pub catalog_error: Option<String>,
    pub layout_errors: Vec<String>,
    pub warnings: Vec<PlanWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanWarning {
    /// Catalog entry that is not a JSON object; it still counts as defined.
    MalformedAsset { asset_id: String },
    /// `base_size` / `visual_size` present but not a `[w, h]` pair of numbers.
    MalformedSize {
        asset_id: String,
        field: &'static str,
    },
    /// Collidable instance without a usable `[x, y]` position.
    MalformedPosition { asset_id: String, layer: Layer },
}

/// Read a scene-plan JSON file from disk.
pub fn load_plan_file(path: &Path) -> Result<Value> {
    let json = fs::read_to_string(path).map_err(|e| ForgeError::io(path, e))?;
    log::debug!("Plan file loaded, size: {} bytes", json.len());
    Ok(serde_json::from_str(&json)?)
}

/// Read the asset index document from disk.
pub fn load_index(path: &Path) -> Result<AssetIndex> {
    if !path.exists() {
        return Err(ForgeError::PathNotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path).map_err(|e| ForgeError::io(path, e))?;
    Ok(serde_json::from_str(&json)?)
}

/// Walk the raw document once and build the typed plan.
///
/// Only a non-object root is rejected outright; everything else is collected
/// into the returned `PlanReading`.
pub fn read_plan(root: &Value) -> Result<PlanReading> {
    let root = root
        .as_object()
        .ok_or_else(|| ForgeError::InvalidPlan(format!("expected an object, got {}", kind_of(root))))?;

    let mut reading = PlanReading::default();

    match root.get("assets") {
        None | Some(Value::Null) => {
            reading.catalog_error = Some("Fatal: the plan has no 'assets' catalog.".into());
        }
        Some(Value::Object(catalog)) if catalog.is_empty() => {
            reading.catalog_error = Some("Fatal: the plan's 'assets' catalog is empty.".into());
        }
        Some(Value::Object(catalog)) => read_catalog(catalog, &mut reading),
        Some(other) => {
            reading.catalog_error = Some(format!(
                "Fatal: 'assets' must be an object, got {}.",
                kind_of(other)
            ));
        }
    }

    match root.get("layout") {
        None | Some(Value::Null) => {}
        Some(Value::Object(layout)) => read_layout(layout, &mut reading),
        Some(other) => reading.layout_errors.push(format!(
            "Layout error: 'layout' must be an object, got {}.",
            kind_of(other)
        )),
    }

    if let Some(Value::Object(props)) = root.get("properties") {
        for (asset_id, entry) in props {
            let physics = entry
                .get("physics")
                .and_then(|p| p.as_str())
                .map(str::to_string);
            reading
                .plan
                .properties
                .insert(asset_id.clone(), AssetProperties { physics });
        }
    }

    log::debug!(
        "Plan read: {} assets, {} layout errors, {} warnings",
        reading.plan.assets.len(),
        reading.layout_errors.len(),
        reading.warnings.len()
    );
    Ok(reading)
}

// ─────────────────────────────────────────────────────
fn read_catalog(catalog: &Map<String, Value>, reading: &mut PlanReading) {
    for (asset_id, details) in catalog {
        let Some(details) = details.as_object() else {
            reading.warnings.push(PlanWarning::MalformedAsset {
                asset_id: asset_id.clone(),
            });
            reading
                .plan
                .assets
                .insert(asset_id.clone(), SceneAsset::default());
            continue;
        };

        let kind = details
            .get("type")
            .and_then(|t| t.as_str())
            .and_then(AssetKind::parse);
        let description = details
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or_default()
            .to_string();

        let mut size_field = |field: &'static str| -> Option<Size> {
            match details.get(field) {
                None | Some(Value::Null) => None,
                Some(raw) => {
                    let size = read_pair(raw);
                    if size.is_none() {
                        reading.warnings.push(PlanWarning::MalformedSize {
                            asset_id: asset_id.clone(),
                            field,
                        });
                    }
                    size
                }
            }
        };
        let base_size = size_field("base_size");
        let visual_size = size_field("visual_size");

        reading.plan.assets.insert(
            asset_id.clone(),
            SceneAsset {
                kind,
                description,
                base_size,
                visual_size,
            },
        );
    }
}

fn read_layout(layout: &Map<String, Value>, reading: &mut PlanReading) {
    for layer in Layer::ALL {
        let entries = match layout.get(layer.key()) {
            None | Some(Value::Null) => continue,
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                reading
                    .layout_errors
                    .push(format!("Layout error: '{layer}' is not a list."));
                continue;
            }
        };

        for entry in entries {
            let Some(entry) = entry.as_object() else {
                reading
                    .layout_errors
                    .push(format!("Layout error: an entry in '{layer}' is not an object."));
                continue;
            };

            let asset_id = match entry.get("asset_id").and_then(|id| id.as_str()) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    reading
                        .layout_errors
                        .push(format!("Layout error: an entry in '{layer}' is missing 'asset_id'."));
                    continue;
                }
            };

            let position = entry.get("position").and_then(read_pair);
            if position.is_none() && Layer::COLLIDABLE.contains(&layer) {
                reading.warnings.push(PlanWarning::MalformedPosition {
                    asset_id: asset_id.clone(),
                    layer,
                });
            }

            reading
                .plan
                .layout
                .layer_mut(layer)
                .push(PlacedInstance { asset_id, position });
        }
    }
}

/// `[a, b]` with two numeric components.
fn read_pair(raw: &Value) -> Option<Point> {
    match raw.as_array()?.as_slice() {
        [a, b] => Some([a.as_f64()?, b.as_f64()?]),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
