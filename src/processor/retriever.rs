//! Two-phase reference-image lookup.
//!
//! 1. Filter: an entry is a candidate only if it shares at least one keyword
//!    with the query (`asset_id` + description).
//! 2. Rank: among candidates, the smallest Manhattan distance between the
//!    query size and the entry's tile size wins. Ties keep the entry seen
//!    first; a perfect size match ends the scan.

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

use crate::model::{AssetIndex, AssetIndexEntry, SceneAsset, Size};
use crate::parser::load_index;
use crate::processor::tokens::token_set;

/// What the asset-generation stage knows about an asset when it asks for a
/// reference image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetQuery {
    pub description: String,
    pub visual_size: Option<Size>,
    pub base_size: Option<Size>,
}

impl AssetQuery {
    /// `visual_size`, else `base_size`, else one tile.
    pub fn dimensions(&self) -> Size {
        self.visual_size.or(self.base_size).unwrap_or([1.0, 1.0])
    }
}

impl From<&SceneAsset> for AssetQuery {
    fn from(asset: &SceneAsset) -> Self {
        Self {
            description: asset.description.clone(),
            visual_size: asset.visual_size,
            base_size: asset.base_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedMatch<'a> {
    pub entry: &'a AssetIndexEntry,
    pub penalty: f64,
}

/// `|Qw - Dw| + |Qh - Dh|`
pub fn dimension_penalty(query: Size, dims: [u32; 2]) -> f64 {
    (query[0] - f64::from(dims[0])).abs() + (query[1] - f64::from(dims[1])).abs()
}

/// Owns one loaded index. Construct it directly (tests, custom paths) or go
/// through [`AssetRetriever::shared`] for the load-once process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct AssetRetriever {
    index: AssetIndex,
}

static SHARED: OnceCell<AssetRetriever> = OnceCell::new();

impl AssetRetriever {
    pub fn new(index: AssetIndex) -> Self {
        Self { index }
    }

    /// Load the index at `path`. A missing or broken file yields an empty
    /// retriever that answers every query with `None`.
    pub fn load(path: &Path) -> Self {
        match load_index(path) {
            Ok(index) => {
                log::info!("Loaded asset index with {} entries", index.len());
                Self::new(index)
            }
            Err(crate::error::ForgeError::PathNotFound(_)) => {
                log::warn!(
                    "Asset index {} does not exist, build it first; retrieval is disabled",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                log::error!("Failed to load asset index {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Process-wide retriever, loaded on first use and never reloaded.
    /// Only the first caller's `path` is honoured.
    pub fn shared(path: &Path) -> &'static AssetRetriever {
        SHARED.get_or_init(|| Self::load(path))
    }

    pub fn index(&self) -> &AssetIndex {
        &self.index
    }

    /// Best entry for the query without touching the filesystem.
    pub fn rank(&self, asset_id: &str, query: &AssetQuery) -> Option<RankedMatch<'_>> {
        let query_tokens = token_set(&format!("{asset_id} {}", query.description));
        if query_tokens.is_empty() {
            return None;
        }
        let query_dims = query.dimensions();

        let mut best: Option<RankedMatch<'_>> = None;
        for entry in self.index.assets.values() {
            if entry.tokens.is_disjoint(&query_tokens) {
                continue;
            }

            let penalty = dimension_penalty(query_dims, entry.dimensions_tiles);
            if best.is_none_or(|b| penalty < b.penalty) {
                best = Some(RankedMatch { entry, penalty });
                if penalty == 0.0 {
                    break;
                }
            }
        }
        best
    }

    /// Absolute path of the best matching reference image, if any.
    ///
    /// A winner that is missing on disk counts as no match.
    pub fn find_closest_reference_image(
        &self,
        asset_id: &str,
        query: &AssetQuery,
    ) -> Option<PathBuf> {
        let Some(best) = self.rank(asset_id, query) else {
            log::debug!("'{asset_id}' has no match in the asset index");
            return None;
        };

        let full_path = self
            .index
            .metadata
            .base_path
            .join(&best.entry.path_relative);
        if !full_path.exists() {
            log::warn!(
                "Indexed file '{}' is missing on disk",
                best.entry.path_relative
            );
            return None;
        }

        log::info!(
            "'{asset_id}' matched {} (penalty {})",
            best.entry.path_relative,
            best.penalty
        );
        Some(full_path)
    }
}
