use anyhow::{ensure, Context, Result};
use clap::Args;
use erpqc::prelude::{
    locate_sheets, run_batch, sibling_output_dir, SheetLayout, QUALITY_SHEET_SUFFIX,
};
use log::info;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ColorSheets {
    /// 质量表所在目录，文件名形如`IP10_ERP_quality_sheet.xlsx`。
    #[arg(long = "input-dir", short)]
    in_dir: PathBuf,
    /// 输出目录（默认为输入目录旁的`<目录名>_color`）。
    #[arg(long = "output-dir", short)]
    out_dir: Option<PathBuf>,
    /// JSON格式的表格版式，未给出的字段使用默认版式。
    #[arg(long)]
    layout: Option<PathBuf>,
    /// 同时处理的文件数，0表示按逻辑核数。
    #[arg(long, short, default_value_t = 1)]
    jobs: usize,
    /// 将处理结果以JSON写入该文件。
    #[arg(long)]
    report: Option<PathBuf>,
}

impl ColorSheets {
    pub fn run(&mut self) -> Result<()> {
        // [input-dir/*_ERP_quality_sheet.xlsx] -> [input-dir_color/color_*.xlsx]
        ensure!(
            self.in_dir.is_dir(),
            "`{}` is not a directory",
            self.in_dir.display()
        );
        let in_dir = fs::canonicalize(&self.in_dir)
            .with_context(|| format!("resolving `{}`", self.in_dir.display()))?;

        let layout = match self.layout.as_deref() {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading layout `{}`", path.display()))?;
                SheetLayout::from_json(&text)
                    .with_context(|| format!("parsing layout `{}`", path.display()))?
            }
            None => SheetLayout::default(),
        };
        let out_dir = match self.out_dir.take() {
            Some(dir) => dir,
            None => sibling_output_dir(&in_dir)?,
        };

        let files = locate_sheets(&in_dir, QUALITY_SHEET_SUFFIX)?;
        info!(
            "{} quality sheets in `{}`, writing to `{}`",
            files.len(),
            in_dir.display(),
            out_dir.display()
        );
        let total = files.len();
        let report = run_batch(files, &out_dir, &layout, self.jobs)?;

        if let Some(path) = self.report.as_deref() {
            fs::write(path, report.to_json().pretty(2))
                .with_context(|| format!("writing report `{}`", path.display()))?;
        }
        ensure!(
            report.is_clean(),
            "{} of {total} quality sheets failed",
            report.failed.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::RangeInclusive;
    use std::path::Path;

    /// 在`cols`列写入第2~35行的读数（第4~32行为1..=29，第2行为100），
    /// 再把`text`中的单元格改写为文本。
    fn write_sheet(path: &Path, cols: RangeInclusive<u32>, text: &[(u32, u32, &str)]) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.new_sheet("Sheet2").unwrap();
        for col in cols {
            for row in 2..=35 {
                let value = match row {
                    4..=32 => (row - 3) as f64,
                    2 => 100.0,
                    _ => 15.0,
                };
                sheet.get_cell_mut((col, row)).set_value_number(value);
            }
        }
        for &(col, row, t) in text {
            sheet.get_cell_mut((col, row)).set_value_string(t);
        }
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    fn command(in_dir: &Path) -> ColorSheets {
        ColorSheets {
            in_dir: in_dir.to_path_buf(),
            out_dir: None,
            layout: None,
            jobs: 1,
            report: None,
        }
    }

    fn read_report(path: &Path) -> json::JsonValue {
        json::parse(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn writes_next_to_input_dir_and_reports() {
        let root = tempfile::tempdir().unwrap();
        let in_dir = root.path().join("sheets");
        fs::create_dir(&in_dir).unwrap();
        write_sheet(&in_dir.join("IP1_ERP_quality_sheet.xlsx"), 2..=15, &[]);
        fs::write(in_dir.join("notes.txt"), b"").unwrap();

        let report_path = root.path().join("report.json");
        let mut cmd = ColorSheets {
            report: Some(report_path.clone()),
            ..command(&in_dir)
        };
        cmd.run().unwrap();

        let out_dir = fs::canonicalize(root.path()).unwrap().join("sheets_color");
        assert!(out_dir.join("color_IP1_ERP_quality_sheet.xlsx").is_file());
        assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 1);

        let report = read_report(&report_path);
        assert_eq!(report["processed"].len(), 1);
        assert_eq!(report["processed"][0]["outliers"].as_usize(), Some(14));
        assert!(report["failed"].is_empty());
    }

    #[test]
    fn failed_sheet_fails_the_run_after_the_batch() {
        let root = tempfile::tempdir().unwrap();
        let in_dir = root.path().join("sheets");
        fs::create_dir(&in_dir).unwrap();
        write_sheet(
            &in_dir.join("IP1_ERP_quality_sheet.xlsx"),
            2..=15,
            &[(5, 10, "oops")],
        );
        write_sheet(&in_dir.join("IP2_ERP_quality_sheet.xlsx"), 2..=15, &[]);

        let out_dir = root.path().join("custom");
        let report_path = root.path().join("report.json");
        let mut cmd = ColorSheets {
            out_dir: Some(out_dir.clone()),
            jobs: 2,
            report: Some(report_path.clone()),
            ..command(&in_dir)
        };
        assert!(cmd.run().is_err());

        assert!(out_dir.join("color_IP2_ERP_quality_sheet.xlsx").is_file());
        assert!(!out_dir.join("color_IP1_ERP_quality_sheet.xlsx").exists());
        assert!(!root.path().join("sheets_color").exists());

        let report = read_report(&report_path);
        assert_eq!(report["processed"].len(), 1);
        assert_eq!(report["failed"].len(), 1);
        assert!(report["failed"][0]["error"].as_str().unwrap().contains("E10"));
    }

    #[test]
    fn layout_file_selects_the_columns() {
        let root = tempfile::tempdir().unwrap();
        let in_dir = root.path().join("sheets");
        fs::create_dir(&in_dir).unwrap();
        write_sheet(&in_dir.join("IP1_ERP_quality_sheet.xlsx"), 2..=4, &[]);
        let out_dir = root.path().join("out");

        // 默认版式要读14列，第5列为空
        let mut cmd = ColorSheets {
            out_dir: Some(out_dir.clone()),
            ..command(&in_dir)
        };
        assert!(cmd.run().is_err());

        let layout = root.path().join("layout.json");
        fs::write(&layout, r#"{ "columns": 3 }"#).unwrap();
        let mut cmd = ColorSheets {
            out_dir: Some(out_dir.clone()),
            layout: Some(layout),
            ..command(&in_dir)
        };
        cmd.run().unwrap();
        assert!(out_dir.join("color_IP1_ERP_quality_sheet.xlsx").is_file());
    }

    #[test]
    fn invalid_layout_file_stops_before_any_output() {
        let root = tempfile::tempdir().unwrap();
        let in_dir = root.path().join("sheets");
        fs::create_dir(&in_dir).unwrap();
        write_sheet(&in_dir.join("IP1_ERP_quality_sheet.xlsx"), 2..=15, &[]);
        let layout = root.path().join("layout.json");
        fs::write(&layout, r#"{ "summary_row": 4294967294 }"#).unwrap();

        let mut cmd = ColorSheets {
            layout: Some(layout),
            ..command(&in_dir)
        };
        let err = cmd.run().unwrap_err();
        assert!(format!("{err:#}").contains("invalid sheet layout"));
        assert!(!root.path().join("sheets_color").exists());
    }

    #[test]
    fn input_dir_must_exist() {
        let root = tempfile::tempdir().unwrap();
        assert!(command(&root.path().join("missing")).run().is_err());
    }
}
