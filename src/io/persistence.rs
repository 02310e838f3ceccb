//! Level JSON files

use crate::io::configuration::LEVEL_FILE_PREFIX;
use crate::io::error::{Result, VineError, WithPath};
use crate::spatial::level::Level;
use std::path::{Path, PathBuf};

/// Read and parse a level file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid level JSON
pub fn read_level(path: &Path) -> Result<Level> {
    let text = std::fs::read_to_string(path).with_path(path, "read level")?;
    serde_json::from_str(&text).with_path(path, "parse level")
}

/// Write a level as pretty-printed JSON, creating parent directories
///
/// # Errors
///
/// Returns an error if the file exists and `overwrite` is false, or if any
/// directory or the file itself cannot be written
pub fn write_level(path: &Path, level: &Level, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(VineError::FileSystem {
            path: path.to_path_buf(),
            operation: "write level",
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "level file exists (pass --overwrite to replace it)",
            ),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_path(parent, "create output directory")?;
    }
    let mut json = serde_json::to_string_pretty(level).with_path(path, "serialize level")?;
    json.push('\n');
    std::fs::write(path, json).with_path(path, "write level")
}

/// Conventional file name for a level id
pub fn level_file_name(level_id: u32) -> String {
    format!("{LEVEL_FILE_PREFIX}{level_id}.json")
}

/// Level files named by a path: the file itself, or every `.json` file in a
/// directory, sorted by name
///
/// # Errors
///
/// Returns an error if the path does not exist or the directory cannot be listed
pub fn collect_level_files(target: &Path) -> Result<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }
    if !target.is_dir() {
        return Err(VineError::FileSystem {
            path: target.to_path_buf(),
            operation: "collect level files",
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "target must be a level file or directory",
            ),
        });
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(target).with_path(target, "list directory")? {
        let path = entry.with_path(target, "list directory")?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
