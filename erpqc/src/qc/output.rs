//! 输出路径推导与工作簿落盘。

use crate::error::{QcError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::Spreadsheet;

/// 输出文件名前缀。
pub const OUTPUT_PREFIX: &str = "color_";

/// `<parent>/<name>` -> `<parent>/<name>_color`。
pub fn sibling_output_dir(input_dir: &Path) -> Result<PathBuf> {
    let bad = || QcError::CreateDir {
        path: input_dir.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "input directory has no parent or no name",
        ),
    };
    let parent = input_dir.parent().ok_or_else(bad)?;
    let name = input_dir.file_name().ok_or_else(bad)?;
    let mut out = name.to_os_string();
    out.push("_color");
    Ok(parent.join(out))
}

/// `<out_dir>/color_<input file name>`。
pub fn output_path(out_dir: &Path, input: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(OUTPUT_PREFIX);
    if let Some(file_name) = input.file_name() {
        name.push(file_name);
    }
    out_dir.join(name)
}

/// 先写临时文件再改名覆盖目标，改名即提交点。目录不存在时创建。
pub fn write_workbook(book: &Spreadsheet, dest: &Path) -> Result<()> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| QcError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(dest.file_name().unwrap_or_default());
    tmp_name.push(".tmp");
    let tmp = dir.join(tmp_name);

    let write_err = |path: &Path, message: String| QcError::Write {
        path: path.to_path_buf(),
        message,
    };
    if let Err(e) = umya_spreadsheet::writer::xlsx::write(book, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(dest, format!("{e:?}")));
    }
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(dest, e.to_string()));
    }
    Ok(())
}
