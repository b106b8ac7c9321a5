//! 把统计结果写回工作表：汇总行加确认色，离群读数加警示色。
//!
//! 先由`Annotation::plan`生成纯数据的修改清单，再由`apply`落到工作表上。

use super::layout::{SheetLayout, SummaryRow};
use super::stats::SheetAnalysis;
use umya_spreadsheet::Worksheet;

/// 单元格填充色。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Fill {
    /// 汇总行（绿色）。
    Confirm,
    /// 离群读数（红色）。
    Alert,
}

impl Fill {
    /// 纯色填充的ARGB值。
    pub fn argb(self) -> &'static str {
        match self {
            Fill::Confirm => "FF00FF00",
            Fill::Alert => "FFFF0000",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellContent {
    Label(&'static str),
    Number(f64),
    /// 保留原值，只改填充。
    Keep,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellEdit {
    pub col: u32,
    pub row: u32,
    pub content: CellContent,
    pub fill: Option<Fill>,
}

#[derive(Clone, Debug, Default)]
pub struct Annotation {
    edits: Vec<CellEdit>,
}

impl Annotation {
    pub fn plan(layout: &SheetLayout, analysis: &SheetAnalysis) -> Self {
        let mut edits = Vec::new();
        for kind in SummaryRow::ALL {
            edits.push(CellEdit {
                col: layout.label_col,
                row: layout.summary_row(kind),
                content: CellContent::Label(kind.label()),
                fill: None,
            });
        }
        for (j, (col, stats)) in layout.data_cols().zip(&analysis.stats).enumerate() {
            for kind in SummaryRow::ALL {
                let value = match kind {
                    SummaryRow::Average => stats.mean,
                    SummaryRow::Sd => stats.stddev,
                    SummaryRow::Over => stats.upper_bound(),
                    SummaryRow::Under => stats.lower_bound(),
                };
                edits.push(CellEdit {
                    col,
                    row: layout.summary_row(kind),
                    content: CellContent::Number(value),
                    fill: Some(Fill::Confirm),
                });
            }
            for (i, row) in layout.evaluation.rows().enumerate() {
                if analysis.outliers[[i, j]] {
                    edits.push(CellEdit {
                        col,
                        row,
                        content: CellContent::Keep,
                        fill: Some(Fill::Alert),
                    });
                }
            }
        }
        Self { edits }
    }

    #[inline]
    pub fn edits(&self) -> &[CellEdit] {
        &self.edits
    }

    pub fn count(&self, fill: Fill) -> usize {
        self.edits.iter().filter(|e| e.fill == Some(fill)).count()
    }

    pub fn apply(&self, sheet: &mut Worksheet) {
        for e in &self.edits {
            let coord = (e.col, e.row);
            match e.content {
                CellContent::Label(text) => {
                    sheet.get_cell_mut(coord).set_value_string(text);
                }
                CellContent::Number(v) => {
                    sheet.get_cell_mut(coord).set_value_number(v);
                }
                CellContent::Keep => {}
            }
            if let Some(fill) = e.fill {
                sheet.get_style_mut(coord).set_background_color(fill.argb());
            }
        }
    }
}
