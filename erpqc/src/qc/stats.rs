//! 逐列统计与离群值判定。
//!
//! 每一列只用本列基线块的均值和总体标准差（除以N）来筛查本列的筛查块。

use super::grid::ReadingGrid;
use super::layout::SheetLayout;
use ndarray::{Array2, ArrayView1};

/// 离群阈值：偏离均值超过几个标准差。
pub const SD_MULTIPLIER: f64 = 2.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    /// 总体标准差。
    pub stddev: f64,
}

impl ColumnStats {
    /// `readings`不能为空。
    pub fn from_readings(readings: ArrayView1<'_, f64>) -> Self {
        let n = readings.len() as f64;
        let mean = readings.sum() / n;
        let sq_sum: f64 = readings.iter().map(|r| (r - mean) * (r - mean)).sum();
        Self {
            mean,
            stddev: (sq_sum / n).sqrt(),
        }
    }

    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.mean + SD_MULTIPLIER * self.stddev
    }

    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.mean - SD_MULTIPLIER * self.stddev
    }

    /// 严格越界才算离群；标准差为0时，任何不等于均值的读数都离群。
    #[inline]
    pub fn is_outlier(&self, reading: f64) -> bool {
        reading > self.upper_bound() || reading < self.lower_bound()
    }
}

/// 一张表的计算结果。
#[derive(Clone, Debug, PartialEq)]
pub struct SheetAnalysis {
    /// 与`layout.data_cols()`一一对应。
    pub stats: Vec<ColumnStats>,
    /// `[[i, j]]`：筛查块第`i`行、第`j`个数据列是否离群。
    pub outliers: Array2<bool>,
}

impl SheetAnalysis {
    pub fn outlier_count(&self) -> usize {
        self.outliers.iter().filter(|&&o| o).count()
    }
}

pub fn analyze(grid: &ReadingGrid, layout: &SheetLayout) -> SheetAnalysis {
    let cols = grid.col_count();
    let mut stats = Vec::with_capacity(cols);
    let mut outliers = Array2::from_elem((layout.evaluation.len(), cols), false);
    for j in 0..cols {
        let col_stats = ColumnStats::from_readings(grid.column_span(j, layout.baseline));
        for (i, &reading) in grid.column_span(j, layout.evaluation).iter().enumerate() {
            outliers[[i, j]] = col_stats.is_outlier(reading);
        }
        stats.push(col_stats);
    }
    SheetAnalysis { stats, outliers }
}
