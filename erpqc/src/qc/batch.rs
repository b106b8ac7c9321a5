//! 批处理：逐个文件读取、统计、标注、写出。
//!
//! 单个文件的任何错误只让该文件失败，其余文件照常处理。

use super::annotate::{Annotation, Fill};
use super::grid::ReadingGrid;
use super::layout::SheetLayout;
use super::output::{output_path, write_workbook};
use super::stats::analyze;
use super::timer::PhaseTimer;
use crate::error::{QcError, Result};
use json::JsonValue;
use log::{debug, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::sync::Arc;
use threadpool::ThreadPool;
use umya_spreadsheet::{Spreadsheet, Worksheet};

#[derive(Clone, Debug, PartialEq)]
pub struct Processed {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outliers: usize,
}

#[derive(Debug)]
pub struct Failed {
    pub input: PathBuf,
    pub error: QcError,
}

/// 一次批处理的结果，按文件名排序。
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<Processed>,
    pub failed: Vec<Failed>,
}

impl BatchReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        let processed = self
            .processed
            .iter()
            .map(|p| {
                let mut j = JsonValue::new_object();
                j["input"] = p.input.display().to_string().into();
                j["output"] = p.output.display().to_string().into();
                j["outliers"] = p.outliers.into();
                j
            })
            .collect();
        let failed = self
            .failed
            .iter()
            .map(|f| {
                let mut j = JsonValue::new_object();
                j["input"] = f.input.display().to_string().into();
                j["error"] = f.error.to_string().into();
                j
            })
            .collect();
        let mut root = JsonValue::new_object();
        root["processed"] = JsonValue::Array(processed);
        root["failed"] = JsonValue::Array(failed);
        root
    }
}

/// 按名称选取工作表，找不到时退而按位置选取。
fn select_sheet<'a>(
    book: &'a mut Spreadsheet,
    layout: &SheetLayout,
    path: &Path,
) -> Result<&'a mut Worksheet> {
    let sheets = book.get_sheet_collection();
    let index = sheets
        .iter()
        .position(|s| s.get_name() == layout.sheet_name)
        .or_else(|| (layout.sheet_position <= sheets.len()).then(|| layout.sheet_position - 1))
        .ok_or_else(|| QcError::MissingSheet {
            path: path.to_path_buf(),
            sheet: layout.sheet_name.clone(),
            position: layout.sheet_position,
        })?;
    Ok(&mut book.get_sheet_collection_mut()[index])
}

/// 处理一个质量表文件，结果写到`out_dir`下。原文件不会被修改。
pub fn process_file(input: &Path, out_dir: &Path, layout: &SheetLayout) -> Result<Processed> {
    let mut timer = PhaseTimer::new();
    let mut book = umya_spreadsheet::reader::xlsx::read(input).map_err(|e| QcError::Open {
        path: input.to_path_buf(),
        message: format!("{e:?}"),
    })?;
    let sheet = select_sheet(&mut book, layout, input)?;
    let grid = ReadingGrid::from_worksheet(sheet, layout).map_err(|source| QcError::Reading {
        path: input.to_path_buf(),
        source,
    })?;
    timer.lap("read");

    let analysis = analyze(&grid, layout);
    for (col, s) in layout.data_cols().zip(&analysis.stats) {
        debug!(
            "{}: column {col} mean={:.4} sd={:.4} range=[{:.4}, {:.4}]",
            input.display(),
            s.mean,
            s.stddev,
            s.lower_bound(),
            s.upper_bound()
        );
    }
    let annotation = Annotation::plan(layout, &analysis);
    annotation.apply(sheet);
    timer.lap("annotate");

    let output = output_path(out_dir, input);
    write_workbook(&book, &output)?;
    timer.lap("write");
    debug!("{}: {}", input.display(), timer.summary());

    Ok(Processed {
        input: input.to_path_buf(),
        output,
        outliers: annotation.count(Fill::Alert),
    })
}

type Outcome = (usize, PathBuf, Result<Processed>);

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(s) => *s,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(s) => s.to_string(),
            Err(_) => "panicked".to_string(),
        },
    }
}

/// 处理单个文件；处理过程中的panic也记为该文件的失败。
fn guarded<F>(work: &F, input: &Path) -> Result<Processed>
where
    F: Fn(&Path) -> Result<Processed>,
{
    panic::catch_unwind(AssertUnwindSafe(|| work(input))).unwrap_or_else(|payload| {
        Err(QcError::Aborted {
            path: input.to_path_buf(),
            message: panic_message(payload),
        })
    })
}

/// 在`workers`个线程上处理`files`，结果按输入顺序排列，每个文件恰有一个结果。
fn run_pooled<F>(files: Vec<PathBuf>, workers: usize, work: F) -> Vec<Outcome>
where
    F: Fn(&Path) -> Result<Processed> + Send + Sync + 'static,
{
    let total = files.len();
    let pool = ThreadPool::new(workers);
    let (tx, rx) = channel();
    let work = Arc::new(work);
    for (i, f) in files.iter().cloned().enumerate() {
        let tx = tx.clone();
        let work = Arc::clone(&work);
        pool.execute(move || {
            let r = guarded(work.as_ref(), &f);
            // 接收端在收齐之前不会关闭
            let _ = tx.send((i, f, r));
        });
    }
    drop(tx);
    let mut results: Vec<Outcome> = rx.iter().take(total).collect();

    // 工作线程异常退出时不会发回结果，补记为失败
    let mut seen = vec![false; total];
    for (i, _, _) in &results {
        seen[*i] = true;
    }
    for (i, f) in files.into_iter().enumerate() {
        if !seen[i] {
            let error = QcError::Aborted {
                path: f.clone(),
                message: "worker exited without a result".to_string(),
            };
            results.push((i, f, Err(error)));
        }
    }
    results.sort_by_key(|(i, _, _)| *i);
    results
}

/// 批量处理`files`。`jobs`为并行文件数，0表示按逻辑核数，1表示顺序执行。
pub fn run_batch(
    files: Vec<PathBuf>,
    out_dir: &Path,
    layout: &SheetLayout,
    jobs: usize,
) -> Result<BatchReport> {
    layout.validate()?;
    let mut timer = PhaseTimer::new();
    let jobs = match jobs {
        0 => num_cpus::get(),
        n => n,
    };

    let results: Vec<Outcome> = match jobs.min(files.len()) {
        0 | 1 => {
            let work = |f: &Path| process_file(f, out_dir, layout);
            files
                .into_iter()
                .enumerate()
                .map(|(i, f)| {
                    let r = guarded(&work, &f);
                    (i, f, r)
                })
                .collect()
        }
        workers => {
            let layout = layout.clone();
            let out_dir = out_dir.to_path_buf();
            run_pooled(files, workers, move |f| process_file(f, &out_dir, &layout))
        }
    };

    let mut report = BatchReport::default();
    for (_, input, r) in results {
        match r {
            Ok(p) => {
                info!(
                    "{} -> {} ({} outliers)",
                    input.display(),
                    p.output.display(),
                    p.outliers
                );
                report.processed.push(p);
            }
            Err(error) => {
                warn!("{} skipped: {error}", input.display());
                report.failed.push(Failed { input, error });
            }
        }
    }
    timer.lap("batch");
    info!(
        "{} processed, {} failed in {}ms",
        report.processed.len(),
        report.failed.len(),
        timer.get_total_ms()
    );
    Ok(report)
}
