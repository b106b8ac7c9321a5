//! 库内统一错误类型。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QcError>;

/// 单元格读数错误，坐标均为表格中从1开始的行列号。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadingError {
    #[error("cell {cell} (row {row}, column {col}) is empty")]
    Missing { cell: String, row: u32, col: u32 },
    #[error("cell {cell} (row {row}, column {col}) is not numeric: {text:?}")]
    NonNumeric {
        cell: String,
        row: u32,
        col: u32,
        text: String,
    },
}

#[derive(Debug, Error)]
pub enum QcError {
    #[error("cannot list directory `{}`", path.display())]
    Locate {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("cannot open workbook `{}`: {message}", path.display())]
    Open { path: PathBuf, message: String },
    #[error("workbook `{}` has no worksheet `{sheet}` and no worksheet at position {position}", path.display())]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        position: usize,
    },
    #[error("bad reading in `{}`: {source}", path.display())]
    Reading {
        path: PathBuf,
        #[source]
        source: ReadingError,
    },
    #[error("cannot create output directory `{}`", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write `{}`: {message}", path.display())]
    Write { path: PathBuf, message: String },
    #[error("processing `{}` aborted: {message}", path.display())]
    Aborted { path: PathBuf, message: String },
    #[error("invalid sheet layout: {0}")]
    Layout(String),
    #[error("image `{}`", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
