//! 读数网格：从工作表一次性读出的只读数值块。

use super::layout::{RowSpan, SheetLayout};
use crate::error::ReadingError;
use ndarray::{s, Array2, ArrayView1};
use umya_spreadsheet::Worksheet;

/// 版式中`read_span()`行 × `data_cols()`列的读数。
///
/// 下标`[[i, j]]`对应表格第`first_row + i`行、第`first_col + j`列。
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingGrid {
    first_row: u32,
    first_col: u32,
    values: Array2<f64>,
}

impl ReadingGrid {
    #[inline]
    pub fn from_array(first_row: u32, first_col: u32, values: Array2<f64>) -> Self {
        Self {
            first_row,
            first_col,
            values,
        }
    }

    /// 按版式逐格读取。`cell_text(col, row)`返回单元格的文本，
    /// 空单元格返回`None`。
    ///
    /// 按列优先的顺序读取，遇到第一个无法解析的单元格即停止，
    /// 因此缓冲区只随实际读到的读数增长。
    pub fn from_cells<F>(layout: &SheetLayout, mut cell_text: F) -> Result<Self, ReadingError>
    where
        F: FnMut(u32, u32) -> Option<String>,
    {
        let span = layout.read_span();
        let rows = span.len();
        let mut by_col = Vec::new();
        for col in layout.data_cols() {
            for row in span.rows() {
                by_col.push(parse_reading(cell_text(col, row), col, row)?);
            }
        }
        let values = Array2::from_shape_fn((rows, layout.col_count as usize), |(i, j)| {
            by_col[j * rows + i]
        });
        Ok(Self::from_array(span.first, layout.first_col, values))
    }

    pub fn from_worksheet(sheet: &Worksheet, layout: &SheetLayout) -> Result<Self, ReadingError> {
        Self::from_cells(layout, |col, row| {
            sheet.get_cell((col, row)).map(|c| c.get_value().into_owned())
        })
    }

    #[inline]
    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    #[inline]
    pub fn first_col(&self) -> u32 {
        self.first_col
    }

    #[inline]
    pub fn col_count(&self) -> usize {
        self.values.ncols()
    }

    /// 第`j`个数据列在`span`行内的读数。
    pub fn column_span(&self, j: usize, span: RowSpan) -> ArrayView1<'_, f64> {
        let lo = (span.first - self.first_row) as usize;
        let hi = lo + span.len();
        self.values.slice(s![lo..hi, j])
    }

    /// 表格坐标`(col, row)`处的读数。
    pub fn get(&self, col: u32, row: u32) -> Option<f64> {
        let i = row.checked_sub(self.first_row)? as usize;
        let j = col.checked_sub(self.first_col)? as usize;
        self.values.get([i, j]).copied()
    }
}

fn parse_reading(text: Option<String>, col: u32, row: u32) -> Result<f64, ReadingError> {
    let text = text.unwrap_or_default();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ReadingError::Missing {
            cell: cell_ref(col, row),
            row,
            col,
        });
    }
    trimmed.parse::<f64>().map_err(|_| ReadingError::NonNumeric {
        cell: cell_ref(col, row),
        row,
        col,
        text: text.clone(),
    })
}

/// 转换为A1形式的单元格引用，例如`(2, 7)` -> `B7`。
pub fn cell_ref(col: u32, row: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{row}", String::from_utf8_lossy(&letters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qc::layout::RowSpan;

    fn small_layout() -> SheetLayout {
        SheetLayout {
            col_count: 2,
            baseline: RowSpan::new(3, 4),
            evaluation: RowSpan::new(2, 5),
            summary_first_row: 6,
            ..SheetLayout::default()
        }
    }

    #[test]
    fn test_cell_ref() {
        assert_eq!(cell_ref(1, 1), "A1");
        assert_eq!(cell_ref(2, 36), "B36");
        assert_eq!(cell_ref(15, 4), "O4");
        assert_eq!(cell_ref(26, 2), "Z2");
        assert_eq!(cell_ref(27, 2), "AA2");
        assert_eq!(cell_ref(53, 9), "BA9");
    }

    #[test]
    fn reads_every_cell_of_the_span() {
        let grid = ReadingGrid::from_cells(&small_layout(), |col, row| {
            Some(format!("{}.5", col * 10 + row))
        })
        .unwrap();
        assert_eq!(grid.first_row(), 2);
        assert_eq!(grid.col_count(), 2);
        assert_eq!(grid.get(2, 2), Some(22.5));
        assert_eq!(grid.get(3, 5), Some(35.5));
        assert_eq!(grid.get(3, 6), None);
        assert_eq!(grid.get(1, 2), None);
        let baseline: Vec<f64> = grid.column_span(1, RowSpan::new(3, 4)).to_vec();
        assert_eq!(baseline, vec![33.5, 34.5]);
    }

    #[test]
    fn whitespace_around_numbers_is_accepted() {
        let grid =
            ReadingGrid::from_cells(&small_layout(), |_, _| Some(" -1e-3 ".to_string())).unwrap();
        assert_eq!(grid.get(2, 3), Some(-0.001));
    }

    #[test]
    fn text_cell_reports_its_location() {
        let err = ReadingGrid::from_cells(&small_layout(), |col, row| {
            if (col, row) == (3, 4) {
                Some("n/a".to_string())
            } else {
                Some("1".to_string())
            }
        })
        .unwrap_err();
        assert_eq!(
            err,
            ReadingError::NonNumeric {
                cell: "C4".to_string(),
                row: 4,
                col: 3,
                text: "n/a".to_string(),
            }
        );
    }

    #[test]
    fn empty_cell_is_missing() {
        let err = ReadingGrid::from_cells(&small_layout(), |col, row| {
            (row != 5 || col != 2).then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ReadingError::Missing { row: 5, col: 2, .. }));
    }

    #[test]
    fn huge_layout_stops_at_the_first_empty_cell() {
        let layout = SheetLayout {
            col_count: 1000,
            evaluation: RowSpan::new(2, 1_000_000),
            summary_first_row: 1_000_001,
            ..SheetLayout::default()
        };
        layout.validate().unwrap();
        let mut calls = 0;
        let err = ReadingGrid::from_cells(&layout, |_, row| {
            calls += 1;
            (row <= 40).then(|| "1".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ReadingError::Missing { row: 41, col: 2, .. }));
        assert_eq!(calls, 40);
    }
}
