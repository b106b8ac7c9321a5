//! 质量表的版式：哪些行列是读数，统计结果写到哪里。
//!
//! 所有行列号都与电子表格一致，从1开始计数。

use crate::error::{QcError, Result};
use json::JsonValue;
use std::ops::RangeInclusive;

/// xlsx工作表的列数上限。
pub const MAX_COLS: u32 = 16_384;
/// xlsx工作表的行数上限。
pub const MAX_ROWS: u32 = 1_048_576;

/// 闭区间行范围`[first, last]`。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RowSpan {
    pub first: u32,
    pub last: u32,
}

impl RowSpan {
    #[inline]
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            (self.last - self.first + 1) as usize
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn rows(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }
}

/// 汇总行，顺序即写入顺序。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SummaryRow {
    Average,
    Sd,
    Over,
    Under,
}

impl SummaryRow {
    pub const ALL: [SummaryRow; 4] = [
        SummaryRow::Average,
        SummaryRow::Sd,
        SummaryRow::Over,
        SummaryRow::Under,
    ];

    /// 写在标签列中的文字。
    pub fn label(self) -> &'static str {
        match self {
            SummaryRow::Average => "Average",
            SummaryRow::Sd => "SD",
            SummaryRow::Over => "2SD over",
            SummaryRow::Under => "2SD under",
        }
    }

    #[inline]
    fn offset(self) -> u32 {
        self as u32
    }
}

/// 一张质量表的完整版式。`Default`即实验室现用的版式：
/// 第2~15列为14个通道，第4~32行计算基线，
/// 第2~35行筛查离群值，第36~39行写汇总。
#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    /// 读取的工作表名。
    pub sheet_name: String,
    /// 找不到`sheet_name`时按位置（从1开始）选取的工作表。
    pub sheet_position: usize,
    pub label_col: u32,
    pub first_col: u32,
    pub col_count: u32,
    pub baseline: RowSpan,
    pub evaluation: RowSpan,
    /// 第一条汇总行（"Average"）的行号，其余三行依次向下。
    pub summary_first_row: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet2".to_string(),
            sheet_position: 2,
            label_col: 1,
            first_col: 2,
            col_count: 14,
            baseline: RowSpan::new(4, 32),
            evaluation: RowSpan::new(2, 35),
            summary_first_row: 36,
        }
    }
}

impl SheetLayout {
    /// 数据列的列号。
    #[inline]
    pub fn data_cols(&self) -> RangeInclusive<u32> {
        self.first_col..=self.last_col()
    }

    #[inline]
    pub fn last_col(&self) -> u32 {
        self.first_col + self.col_count - 1
    }

    #[inline]
    pub fn summary_row(&self, kind: SummaryRow) -> u32 {
        self.summary_first_row + kind.offset()
    }

    /// 需要读入的行：基线块与筛查块的并集所覆盖的最小连续范围。
    pub fn read_span(&self) -> RowSpan {
        RowSpan::new(
            self.baseline.first.min(self.evaluation.first),
            self.baseline.last.max(self.evaluation.last),
        )
    }

    /// 检查版式是否自洽，且所有行列都落在xlsx表格的范围内。
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| -> Result<()> { Err(QcError::Layout(msg)) };
        if self.col_count == 0 {
            return bad("no data columns".to_string());
        }
        if self.first_col == 0 || self.label_col == 0 {
            return bad("column numbers start at 1".to_string());
        }
        match self.first_col.checked_add(self.col_count - 1) {
            Some(last) if last <= MAX_COLS && self.label_col <= MAX_COLS => {}
            _ => {
                return bad(format!(
                    "{} data columns from column {} (label column {}) exceed {MAX_COLS} columns",
                    self.col_count, self.first_col, self.label_col
                ))
            }
        }
        if self.data_cols().contains(&self.label_col) {
            return bad(format!(
                "label column {} overlaps data columns {}..={}",
                self.label_col,
                self.first_col,
                self.last_col()
            ));
        }
        for (name, span) in [("baseline", self.baseline), ("evaluation", self.evaluation)] {
            if span.first == 0 || span.is_empty() {
                return bad(format!("{name} rows {}..={} are empty", span.first, span.last));
            }
            if span.last > MAX_ROWS {
                return bad(format!("{name} rows end at {} past row {MAX_ROWS}", span.last));
            }
        }
        if self.summary_first_row <= self.read_span().last {
            return bad(format!(
                "summary rows start at {} but readings extend to row {}",
                self.summary_first_row,
                self.read_span().last
            ));
        }
        match self.summary_first_row.checked_add(SummaryRow::Under.offset()) {
            Some(last) if last <= MAX_ROWS => {}
            _ => {
                return bad(format!(
                    "summary rows from row {} run past row {MAX_ROWS}",
                    self.summary_first_row
                ))
            }
        }
        if self.sheet_position == 0 {
            return bad("sheet position starts at 1".to_string());
        }
        Ok(())
    }

    /// 从JSON文本读取版式。缺省的字段沿用默认版式，例如：
    ///
    /// ```json
    /// { "baseline": { "first": 4, "last": 32 }, "summary_row": 36 }
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        let root = json::parse(text).map_err(|e| QcError::Layout(e.to_string()))?;
        if !root.is_object() {
            return Err(QcError::Layout("expected a JSON object".to_string()));
        }
        let mut layout = SheetLayout::default();
        if let Some(name) = field(&root, "sheet", JsonValue::as_str)? {
            layout.sheet_name = name.to_string();
        }
        if let Some(v) = field(&root, "sheet_position", JsonValue::as_usize)? {
            layout.sheet_position = v;
        }
        if let Some(v) = field(&root, "label_column", JsonValue::as_u32)? {
            layout.label_col = v;
        }
        if let Some(v) = field(&root, "first_column", JsonValue::as_u32)? {
            layout.first_col = v;
        }
        if let Some(v) = field(&root, "columns", JsonValue::as_u32)? {
            layout.col_count = v;
        }
        if let Some(v) = field(&root, "summary_row", JsonValue::as_u32)? {
            layout.summary_first_row = v;
        }
        layout.baseline = span_field(&root, "baseline", layout.baseline)?;
        layout.evaluation = span_field(&root, "evaluation", layout.evaluation)?;
        layout.validate()?;
        Ok(layout)
    }
}

fn field<'a, T>(
    obj: &'a JsonValue,
    key: &str,
    get: impl Fn(&'a JsonValue) -> Option<T>,
) -> Result<Option<T>> {
    let v = &obj[key];
    if v.is_null() {
        return Ok(None);
    }
    get(v)
        .map(Some)
        .ok_or_else(|| QcError::Layout(format!("field `{key}` has the wrong type: {v}")))
}

fn span_field(obj: &JsonValue, key: &str, default: RowSpan) -> Result<RowSpan> {
    let v = &obj[key];
    if v.is_null() {
        return Ok(default);
    }
    let first = field(v, "first", JsonValue::as_u32)?.unwrap_or(default.first);
    let last = field(v, "last", JsonValue::as_u32)?.unwrap_or(default.last);
    Ok(RowSpan::new(first, last))
}
