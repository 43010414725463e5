use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::{INDEX_SAVE_PATH, Size};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan an asset pack and write the keyword/dimension index
    Index {
        /// Asset pack root directory
        pack: PathBuf,
        /// Index file to write
        #[arg(long, default_value = INDEX_SAVE_PATH)]
        out: PathBuf,
    },
    /// Find the closest reference image for one asset
    Retrieve {
        asset_id: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Target size in tiles, e.g. `2x3`
        #[arg(long, value_parser = parse_size)]
        size: Option<Size>,
        #[arg(long, default_value = INDEX_SAVE_PATH)]
        index: PathBuf,
    },
    /// Run the deterministic checks on a scene plan
    Validate {
        /// Scene plan .json
        plan: PathBuf,
    },
    /// Apply hard constraints, validate, and save into `<project>/saved_levels`
    Fix {
        plan: PathBuf,
        /// Game project root
        #[arg(long)]
        project: PathBuf,
        /// Output file name (defaults to the input's file name)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = INDEX_SAVE_PATH)]
        index: PathBuf,
    },
    /// Show the art route and reference image of every catalog asset
    References {
        plan: PathBuf,
        #[arg(long, default_value = INDEX_SAVE_PATH)]
        index: PathBuf,
        /// Asset pack to index first when the index file does not exist yet
        #[arg(long)]
        pack: Option<PathBuf>,
    },
}

/// `WxH` → `[W, H]` (tile units, fractions allowed).
pub fn parse_size(raw: &str) -> Result<Size, String> {
    let (w, h) = raw
        .to_ascii_lowercase()
        .split_once('x')
        .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
        .ok_or_else(|| format!("expected WxH, got `{raw}`"))?;
    let w: f64 = w.parse().map_err(|_| format!("bad width `{w}`"))?;
    let h: f64 = h.parse().map_err(|_| format!("bad height `{h}`"))?;
    Ok([w, h])
}
