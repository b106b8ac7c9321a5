use crate::error::{QcError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 质量表文件名后缀，文件名形如`IP10_ERP_quality_sheet.xlsx`。
pub const QUALITY_SHEET_SUFFIX: &str = "_ERP_quality_sheet.xlsx";

/// 列出`dir`下（不递归）文件名以`suffix`结尾的文件，按文件名排序。没有匹配时返回空表。
pub fn locate_sheets(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| QcError::Locate {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.ends_with(suffix) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}
