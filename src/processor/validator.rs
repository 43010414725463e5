//! Deterministic checks run on every draft of a scene plan.
//!
//! Two passes, always in this order:
//!   1. asset definitions: layout shape + every referenced id is in `assets`
//!   2. collisions: pairwise AABB overlap in `object_layer` / `npc_layer`
//!
//! The text report is what the repair loop hands back to the model, so the
//! collision list is capped at `MAX_COLLISION_REPORTS` lines.

use indexmap::IndexSet;
use serde_json::Value;
use std::collections::HashSet;

use crate::model::{Layer, MAX_COLLISION_REPORTS, Point, ScenePlan};
use crate::parser::{PlanReading, PlanWarning, read_plan};
use crate::processor::aabb::Aabb;

/// Soft findings: things the checks stepped over without raising an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    Plan(PlanWarning),
    /// No `base_size`, but `physics: passable` (chairs, doors) – exempt.
    PassableWithoutSize { asset_id: String, position: Point },
    /// No usable `base_size` and not passable.
    UnresolvedSize { asset_id: String, position: Point },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// `"- "`-prefixed lines joined with `\n`, or `None` when clean.
    pub fn to_report(&self) -> Option<String> {
        if self.is_clean() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| format!("- {e}"))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// At most `MAX_COLLISION_REPORTS` detailed lines plus one summary line.
    pub messages: Vec<String>,
    /// Distinct colliding pairs found, before capping.
    pub total: usize,
    pub skipped: Vec<Warning>,
}

/// Entry point used by the repair loop.
pub fn run_validator(plan: &Value) -> Option<String> {
    let report = validate(plan);
    if report.is_clean() {
        log::info!("Validator: all checks passed");
    } else {
        log::info!("Validator: {} problem(s) found", report.errors.len());
    }
    report.to_report()
}

/// Full result: hard errors in report order plus every soft skip.
pub fn validate(plan: &Value) -> ValidationReport {
    let reading = match read_plan(plan) {
        Ok(reading) => reading,
        Err(e) => {
            log::warn!("Validator: rejected input: {e}");
            return ValidationReport {
                errors: vec![format!("Fatal: {e}")],
                warnings: Vec::new(),
            };
        }
    };

    let mut report = ValidationReport {
        errors: check_asset_definitions(&reading),
        warnings: reading.warnings.iter().cloned().map(Warning::Plan).collect(),
    };

    if reading.catalog_error.is_none() {
        let collisions = check_collisions(&reading.plan);
        report.errors.extend(collisions.messages);
        report.warnings.extend(collisions.skipped);
    }

    for warning in &report.warnings {
        log::debug!("Validator: skipped {warning:?}");
    }
    report
}

/// Shape errors plus one message per id used in the layout but missing from
/// the catalog. An unusable catalog yields just that one error.
pub fn check_asset_definitions(reading: &PlanReading) -> Vec<String> {
    if let Some(fatal) = &reading.catalog_error {
        return vec![fatal.clone()];
    }

    let mut errors = reading.layout_errors.clone();

    let referenced: IndexSet<&str> = Layer::ALL
        .iter()
        .flat_map(|&layer| reading.plan.layout.layer(layer))
        .map(|instance| instance.asset_id.as_str())
        .collect();

    for asset_id in referenced {
        if !reading.plan.assets.contains_key(asset_id) {
            errors.push(format!(
                "Missing definition: the layout uses '{asset_id}' but 'assets' does not define it."
            ));
        }
    }
    errors
}

struct Footprint<'a> {
    asset_id: &'a str,
    position: Point,
    aabb: Aabb,
}

impl Footprint<'_> {
    fn key(&self) -> String {
        format!("{}@{}", self.asset_id, fmt_point(self.position))
    }
}

/// All-pairs overlap test over the collidable layers.
pub fn check_collisions(plan: &ScenePlan) -> CollisionReport {
    let mut report = CollisionReport::default();

    let mut footprints = Vec::<Footprint<'_>>::new();
    for layer in Layer::COLLIDABLE {
        for instance in plan.layout.layer(layer) {
            let Some(position) = instance.position else {
                continue;
            };
            let asset_id = instance.asset_id.as_str();

            let base_size = plan.assets.get(asset_id).and_then(|a| a.base_size);
            let Some(base_size) = base_size else {
                let skip = if plan.is_passable(asset_id) {
                    Warning::PassableWithoutSize {
                        asset_id: asset_id.to_string(),
                        position,
                    }
                } else {
                    Warning::UnresolvedSize {
                        asset_id: asset_id.to_string(),
                        position,
                    }
                };
                report.skipped.push(skip);
                continue;
            };

            footprints.push(Footprint {
                asset_id,
                position,
                aabb: Aabb::from_anchor(position, base_size),
            });
        }
    }

    let mut reported = HashSet::<(String, String)>::new();
    let mut messages = Vec::<String>::new();

    for (i, a) in footprints.iter().enumerate() {
        for b in &footprints[i + 1..] {
            if !a.aabb.overlaps(&b.aabb) {
                continue;
            }

            let (ka, kb) = (a.key(), b.key());
            let pair = if ka <= kb { (ka, kb) } else { (kb, ka) };
            if !reported.insert(pair) {
                continue;
            }

            messages.push(format!(
                "Collision: '{}' (position {}) overlaps '{}' (position {}).",
                a.asset_id,
                fmt_point(a.position),
                b.asset_id,
                fmt_point(b.position)
            ));
        }
    }

    report.total = messages.len();
    if messages.len() > MAX_COLLISION_REPORTS {
        let remaining = messages.len() - MAX_COLLISION_REPORTS;
        messages.truncate(MAX_COLLISION_REPORTS);
        messages.push(format!("... and {remaining} more collision(s)."));
    }
    report.messages = messages;
    report
}

/// `[5, 4]` for whole tiles, `[5.5, 4]` otherwise.
fn fmt_point([x, y]: Point) -> String {
    format!("[{x}, {y}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object_plan(objects: Value) -> Value {
        json!({
            "assets": {
                "table": {"type": "object", "base_size": [2, 2]},
                "chair": {"type": "object", "base_size": [2, 2]},
                "npc_chef": {"type": "npc", "base_size": [1, 1]}
            },
            "layout": {"object_layer": objects},
            "properties": {}
        })
    }

    #[test]
    fn test_clean_plan_has_no_report() {
        let plan = object_plan(json!([
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "chair", "position": [7, 5]}
        ]));
        assert_eq!(run_validator(&plan), None);
        assert!(validate(&plan).warnings.is_empty());
    }

    #[test]
    fn test_table_and_chair_collide() {
        let plan = object_plan(json!([
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "chair", "position": [5, 4]}
        ]));

        assert_eq!(
            run_validator(&plan).as_deref(),
            Some("- Collision: 'table' (position [5, 5]) overlaps 'chair' (position [5, 4]).")
        );
    }

    #[test]
    fn test_npc_layer_is_checked_against_objects() {
        let mut plan = object_plan(json!([{"asset_id": "table", "position": [5, 5]}]));
        plan["layout"]["npc_layer"] = json!([{"asset_id": "npc_chef", "position": [5, 4]}]);

        let report = validate(&plan);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("'npc_chef' (position [5, 4])"));
    }

    #[test]
    fn test_wall_and_floor_are_not_point_checked() {
        let mut plan = object_plan(json!([{"asset_id": "table", "position": [5, 5]}]));
        plan["layout"]["wall_layer"] = json!([{"asset_id": "chair", "position": [5, 5]}]);
        plan["layout"]["floor_layer"] = json!([
            {"asset_id": "chair", "command": "fill_rect", "area": [0, 0, 10, 10]}
        ]);

        assert_eq!(run_validator(&plan), None);
    }

    #[test]
    fn test_missing_definition_reported_once() {
        let plan = object_plan(json!([
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "ghost_chair", "position": [5, 4]},
            {"asset_id": "ghost_chair", "position": [9, 9]}
        ]));

        let report = validate(&plan);
        assert_eq!(
            report.errors,
            vec![
                "Missing definition: the layout uses 'ghost_chair' but 'assets' does not define it."
                    .to_string()
            ]
        );
        assert_eq!(
            report.warnings,
            vec![
                Warning::UnresolvedSize {
                    asset_id: "ghost_chair".into(),
                    position: [5.0, 4.0]
                },
                Warning::UnresolvedSize {
                    asset_id: "ghost_chair".into(),
                    position: [9.0, 9.0]
                },
            ]
        );
    }

    #[test]
    fn test_passable_without_size_is_exempt() {
        let mut plan = object_plan(json!([
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "stool", "position": [5, 4]}
        ]));
        plan["assets"]["stool"] = json!({"type": "object", "description": "A stool"});
        plan["properties"]["stool"] = json!({"physics": "passable"});

        let report = validate(&plan);
        assert!(report.is_clean());
        assert_eq!(
            report.warnings,
            vec![Warning::PassableWithoutSize {
                asset_id: "stool".into(),
                position: [5.0, 4.0]
            }]
        );
    }

    #[test]
    fn test_passable_with_size_still_collides() {
        let mut plan = object_plan(json!([
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "chair", "position": [5, 4]}
        ]));
        plan["properties"]["chair"] = json!({"physics": "passable"});

        assert_eq!(validate(&plan).errors.len(), 1);
    }

    #[test]
    fn test_identical_duplicates_reported_once() {
        let plan = object_plan(json!([
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "chair", "position": [20, 20]}
        ]));

        let report = check_collisions(&read_plan(&plan).unwrap().plan);
        assert_eq!(report.total, 1);
        assert_eq!(
            report.messages,
            vec!["Collision: 'table' (position [5, 5]) overlaps 'table' (position [5, 5]).".to_string()]
        );
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        // two identical tables both hitting the same chair give the same pair key
        let plan = object_plan(json!([
            {"asset_id": "chair", "position": [5, 4]},
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "table", "position": [5, 5]}
        ]));

        let report = check_collisions(&read_plan(&plan).unwrap().plan);
        assert_eq!(report.total, 2, "chair/table once, table/table once");
    }

    #[test]
    fn test_cap_at_five_with_summary() {
        // 8 chairs side by side, each overlapping only the table row below it
        let mut objects = Vec::new();
        for i in 0..8 {
            let x = i * 10;
            objects.push(json!({"asset_id": "table", "position": [x, 5]}));
            objects.push(json!({"asset_id": "chair", "position": [x, 4]}));
        }
        let plan = object_plan(Value::Array(objects));

        let report = validate(&plan);
        assert_eq!(report.errors.len(), 6);
        assert_eq!(report.errors[5], "... and 3 more collision(s).");
        assert!(report.errors[..5].iter().all(|e| e.starts_with("Collision:")));

        let text = report.to_report().unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().all(|l| l.starts_with("- ")));
    }

    #[test]
    fn test_missing_catalog_short_circuits() {
        let plan = json!({
            "layout": {
                "object_layer": [
                    {"asset_id": "table", "position": [5, 5]},
                    "broken"
                ]
            }
        });

        let report = validate(&plan);
        assert_eq!(
            report.errors,
            vec!["Fatal: the plan has no 'assets' catalog.".to_string()]
        );
    }

    #[test]
    fn test_non_object_plan() {
        let report = run_validator(&json!("just text")).unwrap();
        assert_eq!(report.lines().count(), 1);
        assert!(report.starts_with("- Fatal:"));
    }

    #[test]
    fn test_errors_come_in_check_order() {
        let plan = object_plan(json!([
            {"asset_id": "table", "position": [5, 5]},
            {"asset_id": "chair", "position": [5, 4]},
            {"asset_id": "ghost", "position": [50, 50]},
            {"note": "no id"}
        ]));

        let errors = validate(&plan).errors;
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("Layout error:"));
        assert!(errors[1].starts_with("Missing definition:"));
        assert!(errors[2].starts_with("Collision:"));
    }

    #[test]
    fn test_fractional_positions_in_messages() {
        let plan = object_plan(json!([
            {"asset_id": "table", "position": [5.5, 5]},
            {"asset_id": "chair", "position": [5, 4.25]}
        ]));
        let report = run_validator(&plan).unwrap();
        assert!(report.contains("[5.5, 5]"), "{report}");
        assert!(report.contains("[5, 4.25]"), "{report}");
    }
}
