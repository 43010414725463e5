//! The functional core: index, retrieval, validation and the passes that
//! prepare a plan for the writers.
pub mod aabb;
pub mod constraints;
pub mod index_builder;
pub mod references;
pub mod repair;
pub mod retriever;
pub mod tokens;
pub mod validator;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::parser::read_plan;
use references::AssetArt;
use retriever::AssetRetriever;
use validator::ValidationReport;

/// Everything the writers need once a plan went through the passes.
#[derive(Debug, Clone)]
pub struct ProcessedScene {
    pub plan: Value,
    /// Assets rewritten by the hard constraints.
    pub fixes: usize,
    /// Wall assets replaced by their `_top` / `_side` pair.
    pub walls: Vec<String>,
    pub report: ValidationReport,
    pub art: Vec<AssetArt>,
}

/// Runs every deterministic pass over one plan document.
pub fn run(mut plan: Value, retriever: &AssetRetriever) -> Result<ProcessedScene> {
    let fixes = constraints::enforce_hard_constraints(&mut plan);
    let walls = references::split_walls(&mut plan);
    let report = validator::validate(&plan);

    let reading = read_plan(&plan).context("Reading plan for asset routing")?;
    let art = references::plan_asset_art(&reading.plan, retriever);

    Ok(ProcessedScene {
        plan,
        fixes,
        walls,
        report,
        art,
    })
}
