//! Save finished scene plans where the game engine picks them up.

use crate::error::{ForgeError, Result};
use crate::model::SAVED_LEVELS_DIR;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `plan` to `<project>/saved_levels/<file_name>` and return that path.
pub fn emit(plan: &Value, project: &Path, file_name: &str) -> Result<PathBuf> {
    let save_dir = project.join(SAVED_LEVELS_DIR);
    fs::create_dir_all(&save_dir).map_err(|e| ForgeError::io(&save_dir, e))?;

    let save_path = save_dir.join(file_name);
    let json = serde_json::to_string_pretty(plan)?;
    fs::write(&save_path, json).map_err(|e| ForgeError::io(&save_path, e))?;

    log::info!("Scene plan saved to {}", save_path.display());
    Ok(save_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_emit_creates_saved_levels() {
        let dir = TempDir::new().unwrap();
        let plan = json!({"metadata": {"scene_name": "Château"}, "assets": {}});

        let path = emit(&plan, dir.path(), "level.json").unwrap();

        assert_eq!(path, dir.path().join("saved_levels").join("level.json"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Château"), "non-ASCII is written as UTF-8");
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), plan);
    }
}
