use anyhow::{ensure, Result};
use clap::Args;
use erpqc::prelude::{prepare_topo_maps, TopoGeometry, DEFAULT_CONDITIONS};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TopoPrep {
    /// 地形图目录，文件名形如`13_200.gif`。
    #[arg(long = "image-dir", short = 'D')]
    image_dir: PathBuf,
    /// 条件编号，如`13-18`或`15,13,17`（默认13-18）。色标取自第一个条件。
    // 写成完整路径，clap才会把整个列表当作一个参数值
    #[arg(long, short, value_parser = super::utils::ranges_to_integers)]
    conditions: Option<::std::vec::Vec<u32>>,
}

impl TopoPrep {
    pub fn run(&mut self) -> Result<()> {
        // [image-dir/<cond>_<time>.gif] -> [image-dir/extra_images/*.gif]
        ensure!(
            self.image_dir.is_dir(),
            "`{}` is not a directory",
            self.image_dir.display()
        );
        let conditions = self
            .conditions
            .take()
            .unwrap_or_else(|| DEFAULT_CONDITIONS.to_vec());
        let report = prepare_topo_maps(&self.image_dir, &conditions, &TopoGeometry::default())?;
        ensure!(
            report.failed.is_empty(),
            "{} topo images could not be prepared",
            report.failed.len()
        );
        Ok(())
    }
}
