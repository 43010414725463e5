//! Persist the asset index as pretty JSON.

use crate::error::{ForgeError, Result};
use crate::model::AssetIndex;
use std::fs;
use std::path::Path;

/// Write `index` to `path`, going through a sibling temp file so a failed
/// write never leaves a truncated index behind.
pub fn emit(index: &AssetIndex, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(index)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ForgeError::io(parent, e))?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| ForgeError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| ForgeError::io(path, e))?;
    Ok(())
}
