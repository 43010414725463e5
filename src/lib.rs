pub mod cli;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use anyhow::{Context, bail};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

use cli::Command;
use processor::index_builder::build_index;
use processor::references::plan_asset_art;
use processor::retriever::{AssetQuery, AssetRetriever};

pub fn run() -> anyhow::Result<ExitCode> {
    let args = cli::Cli::parse();

    match args.command {
        Command::Index { pack, out } => {
            if !build_index(&pack, &out) {
                bail!("Index build for {} failed", pack.display());
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Retrieve {
            asset_id,
            description,
            size,
            index,
        } => {
            let retriever = AssetRetriever::load(&index);
            let query = AssetQuery {
                description,
                visual_size: size,
                base_size: None,
            };
            match retriever.find_closest_reference_image(&asset_id, &query) {
                Some(path) => {
                    println!("{}", path.display());
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("no match for '{asset_id}'");
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Validate { plan } => {
            let doc = parser::load_plan_file(&plan)
                .with_context(|| format!("Reading {}", plan.display()))?;
            let report = processor::validator::validate(&doc);
            log::info!("{} soft skip(s)", report.warnings.len());

            match report.to_report() {
                None => {
                    println!("OK: no problems found");
                    Ok(ExitCode::SUCCESS)
                }
                Some(text) => {
                    println!("{text}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Fix {
            plan,
            project,
            name,
            index,
        } => {
            // 1. ── Parse ──────────────────────────────────────────────────────
            let doc = parser::load_plan_file(&plan)
                .with_context(|| format!("Reading {}", plan.display()))?;

            // 2. ── Process ────────────────────────────────────────────────────
            let retriever = AssetRetriever::load(&index);
            let processed =
                processor::run(doc, &retriever).with_context(|| "Processing scene plan")?;

            // 3. ── Write outputs ──────────────────────────────────────────────
            let file_name = match name {
                Some(name) => name,
                None => file_name_of(&plan)?,
            };
            let saved = writer::scene::emit(&processed.plan, &project, &file_name)
                .with_context(|| format!("Saving into {}", project.display()))?;

            println!(
                "saved {} ({} auto-fix(es), {} wall(s) split)",
                saved.display(),
                processed.fixes,
                processed.walls.len()
            );
            for art in &processed.art {
                if let Some(reference) = &art.reference {
                    println!("  {} <- {}", art.asset_id, reference.display());
                }
            }
            match processed.report.to_report() {
                None => Ok(ExitCode::SUCCESS),
                Some(text) => {
                    println!("{text}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::References { plan, index, pack } => {
            if !index.exists() {
                if let Some(pack) = &pack {
                    log::info!("No index at {}, building it from {}", index.display(), pack.display());
                    if !build_index(pack, &index) {
                        bail!("Index build for {} failed", pack.display());
                    }
                }
            }

            let doc = parser::load_plan_file(&plan)
                .with_context(|| format!("Reading {}", plan.display()))?;
            let reading = parser::read_plan(&doc).with_context(|| "Parsing scene plan")?;
            let retriever = AssetRetriever::shared(&index);

            for art in plan_asset_art(&reading.plan, retriever) {
                let reference = art
                    .reference
                    .as_deref()
                    .map_or_else(|| "-".to_string(), |p| p.display().to_string());
                println!("{:<32} {:<10} {}", art.asset_id, format!("{:?}", art.route), reference);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn file_name_of(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no file name", path.display()))
}
