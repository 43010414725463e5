//! Asset-pack scanner.
//!
//! Every image whose name ends in `_<W>x<H>` (right before the extension)
//! becomes one `AssetIndexEntry`:
//!
//! ```text
//! furniture/Pink_Sofa_2x1.png  →  { [2, 1], {"pink", "sofa"} }
//! ```
//!
//! Anything else is skipped and reported as a `SkippedFile`, never as an error.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Component, Path};
use walkdir::WalkDir;

use crate::error::{ForgeError, Result};
use crate::model::{AssetIndex, AssetIndexEntry, IMAGE_EXTENSIONS};
use crate::processor::tokens::token_set;
use crate::writer;

static DIMENSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(\d+)x(\d+)$").expect("dimension pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `_WxH` right before the extension.
    NoDimensions,
    /// Suffix present but zero or too large for a tile count.
    BadDimensions,
    /// Nothing left of the name once the suffix is removed.
    NoDescription,
    /// Only stop-words / punctuation in the description.
    NoTokens,
    NonUtf8Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

/// In-memory result of a scan; nothing has been written yet.
#[derive(Debug, Clone, Default)]
pub struct IndexBuild {
    pub index: AssetIndex,
    /// Image files seen, indexed or not.
    pub scanned: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Dimensions and keywords encoded in one file name.
pub fn parse_file_name(
    file_name: &str,
) -> std::result::Result<([u32; 2], BTreeSet<String>), SkipReason> {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _ext)| stem);
    let lowered = stem.to_lowercase();

    let caps = DIMENSION_SUFFIX
        .captures(&lowered)
        .ok_or(SkipReason::NoDimensions)?;
    let w: u32 = caps[1].parse().map_err(|_| SkipReason::BadDimensions)?;
    let h: u32 = caps[2].parse().map_err(|_| SkipReason::BadDimensions)?;
    if w == 0 || h == 0 {
        return Err(SkipReason::BadDimensions);
    }

    let suffix_len = caps[0].len();
    let text = stem
        .get(..stem.len().saturating_sub(suffix_len))
        .unwrap_or_default();
    if text.is_empty() {
        return Err(SkipReason::NoDescription);
    }

    let tokens = token_set(text);
    if tokens.is_empty() {
        return Err(SkipReason::NoTokens);
    }
    Ok(([w, h], tokens))
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Walk `root` (sorted by file name) and index every usable image.
pub fn scan_asset_pack(root: &Path) -> Result<IndexBuild> {
    if !root.exists() {
        return Err(ForgeError::PathNotFound(root.to_path_buf()));
    }
    let base_path = std::path::absolute(root).map_err(|e| ForgeError::io(root, e))?;

    let mut build = IndexBuild {
        index: AssetIndex::new(base_path),
        ..IndexBuild::default()
    };

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Failed to read entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        build.scanned += 1;

        let path_relative = relative_slash_path(entry.path(), root);
        let Some(file_name) = entry.file_name().to_str() else {
            log::debug!("Skipping non UTF-8 file name {}", entry.path().display());
            build.skipped.push(SkippedFile {
                path: path_relative,
                reason: SkipReason::NonUtf8Name,
            });
            continue;
        };

        match parse_file_name(file_name) {
            Ok((dimensions_tiles, tokens)) => {
                build.index.insert(AssetIndexEntry {
                    path_relative,
                    dimensions_tiles,
                    tokens,
                });
                if build.index.len() % 100 == 0 {
                    log::info!("...indexed {} files", build.index.len());
                }
            }
            Err(reason) => {
                log::debug!("Skipping {path_relative}: {reason:?}");
                build.skipped.push(SkippedFile {
                    path: path_relative,
                    reason,
                });
            }
        }
    }

    Ok(build)
}

/// Scan `asset_pack` and write the index to `out`.
///
/// Never fails loudly: every problem is logged and turned into `false`.
/// The file is only touched once the whole scan succeeded.
pub fn build_index(asset_pack: &Path, out: &Path) -> bool {
    log::info!("Scanning asset pack {}", asset_pack.display());

    let build = match scan_asset_pack(asset_pack) {
        Ok(build) => build,
        Err(e) => {
            log::error!("Index build failed: {e}");
            return false;
        }
    };

    if let Err(e) = writer::index::emit(&build.index, out) {
        log::error!("Could not save index to {}: {e}", out.display());
        return false;
    }

    log::info!(
        "Index saved to {}: scanned {} images, indexed {}, skipped {}",
        out.display(),
        build.scanned,
        build.index.len(),
        build.skipped.len()
    );
    true
}

fn relative_slash_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    fn words(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            parse_file_name("chair_2x3.png"),
            Ok(([2, 3], words(&["chair"])))
        );
        assert_eq!(
            parse_file_name("A_Pink_Sofa_3X1.PNG"),
            Ok(([3, 1], words(&["pink", "sofa"])))
        );
        assert_eq!(
            parse_file_name("old.wooden_desk_4x2.jpeg"),
            Ok(([4, 2], words(&["oldwooden", "desk"])))
        );
    }

    #[test]
    fn test_parse_file_name_skips() {
        assert_eq!(parse_file_name("lamp.png"), Err(SkipReason::NoDimensions));
        assert_eq!(parse_file_name("lamp_2x3_v2.png"), Err(SkipReason::NoDimensions));
        assert_eq!(parse_file_name("lamp_0x3.png"), Err(SkipReason::BadDimensions));
        assert_eq!(
            parse_file_name("lamp_99999999999x3.png"),
            Err(SkipReason::BadDimensions)
        );
        assert_eq!(parse_file_name("_2x2.png"), Err(SkipReason::NoDescription));
        assert_eq!(parse_file_name("the_of_2x2.png"), Err(SkipReason::NoTokens));
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("a/b_1x1.png")));
        assert!(is_image(Path::new("b_1x1.JPG")));
        assert!(is_image(Path::new("b_1x1.jpeg")));
        assert!(!is_image(Path::new("b_1x1.gif")));
        assert!(!is_image(Path::new("README")));
    }

    #[test]
    fn test_scan_asset_pack() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "furniture/chair_2x3.png");
        touch(dir.path(), "furniture/lamp.png");
        touch(dir.path(), "plants/Fern_Pot_1x2.jpg");
        touch(dir.path(), "notes.txt");

        let build = scan_asset_pack(dir.path()).unwrap();

        assert_eq!(build.scanned, 3);
        assert_eq!(
            build.index.assets.keys().collect::<Vec<_>>(),
            vec!["furniture/chair_2x3.png", "plants/Fern_Pot_1x2.jpg"]
        );
        assert_eq!(
            build.skipped,
            vec![SkippedFile {
                path: "furniture/lamp.png".into(),
                reason: SkipReason::NoDimensions
            }]
        );
        assert!(build.index.metadata.base_path.is_absolute());

        let fern = &build.index.assets["plants/Fern_Pot_1x2.jpg"];
        assert_eq!(fern.dimensions_tiles, [1, 2]);
        assert_eq!(fern.tokens, words(&["fern", "pot"]));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "chair_2x3.png");
        fs::write(dir.path().join(OsStr::from_bytes(b"sofa\xff_2x1.png")), b"img").unwrap();

        let build = scan_asset_pack(dir.path()).unwrap();

        assert_eq!(build.scanned, 2);
        assert_eq!(build.index.len() + build.skipped.len(), build.scanned);
        assert_eq!(build.skipped.len(), 1);
        assert_eq!(build.skipped[0].reason, SkipReason::NonUtf8Name);
    }

    #[test]
    fn test_missing_root_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("asset_index.json");

        let err = scan_asset_pack(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ForgeError::PathNotFound(_)));

        assert!(!build_index(&dir.path().join("nope"), &out));
        assert!(!out.exists());
    }

    #[test]
    fn test_build_index_writes_document() {
        let pack = TempDir::new().unwrap();
        touch(pack.path(), "table_2x2.png");
        let out_dir = TempDir::new().unwrap();
        let out = out_dir.path().join("asset_index.json");

        assert!(build_index(pack.path(), &out));

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(
            saved["assets"]["table_2x2.png"],
            serde_json::json!({
                "path_relative": "table_2x2.png",
                "dimensions_tiles": [2, 2],
                "tokens": ["table"]
            })
        );
        assert!(saved["metadata"]["base_path"].is_string());
    }
}
