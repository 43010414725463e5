//! Hard rules applied straight to the document before each validation pass.

use serde_json::{Value, json};

const FLOOR_BASE: [f64; 2] = [1.0, 1.0];
const FLOOR_VISUAL: [f64; 2] = [2.0, 2.0];

/// Force floor tiles to `base_size [1, 1]` / `visual_size [2, 2]`.
///
/// A floor tile is a `"tile"` asset whose id or description mentions `floor`.
/// Returns how many assets were changed.
pub fn enforce_hard_constraints(plan: &mut Value) -> usize {
    let Some(assets) = plan.get_mut("assets").and_then(|a| a.as_object_mut()) else {
        return 0;
    };

    let mut fixed = 0;
    for (asset_id, details) in assets.iter_mut() {
        let Some(details) = details.as_object_mut() else {
            continue;
        };
        if details.get("type").and_then(|t| t.as_str()) != Some("tile") {
            continue;
        }

        let description = details
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or_default()
            .to_lowercase();
        if !asset_id.to_lowercase().contains("floor") && !description.contains("floor") {
            continue;
        }

        let base_ok = size_of(details.get("base_size")) == Some(FLOOR_BASE);
        let visual_ok = size_of(details.get("visual_size")) == Some(FLOOR_VISUAL);
        if base_ok && visual_ok {
            continue;
        }

        log::info!(
            "Auto-fix floor '{asset_id}': base {} -> [1, 1], visual {} -> [2, 2]",
            compact(details.get("base_size")),
            compact(details.get("visual_size"))
        );
        details.insert("base_size".into(), json!([1, 1]));
        details.insert("visual_size".into(), json!([2, 2]));
        fixed += 1;
    }
    fixed
}

fn size_of(raw: Option<&Value>) -> Option<[f64; 2]> {
    match raw?.as_array()?.as_slice() {
        [w, h] => Some([w.as_f64()?, h.as_f64()?]),
        _ => None,
    }
}

fn compact(raw: Option<&Value>) -> String {
    raw.map_or_else(|| "none".to_string(), Value::to_string)
}
