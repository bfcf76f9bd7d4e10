use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

const FUEL_EXPORT_PREFIX: &str = "hvo_xtl_tankstellen_deutschland_vollstaendig_v1_";

/// Versioned, dated default file name for the station export.
pub fn default_fuel_export_path(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir.join(format!("{}{}.csv", FUEL_EXPORT_PREFIX, date.format("%Y-%m-%d")))
}

pub fn ensure_parent_dir(file_path: &Path) -> std::io::Result<()> {
    match file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => ensure_dir(dir),
        _ => Ok(()),
    }
}

pub fn write_text_file(file_path: &Path, content: &str) -> std::io::Result<()> {
    ensure_parent_dir(file_path)?;
    fs::write(file_path, content)
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
