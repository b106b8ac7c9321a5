use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "erptools")]
#[command(about = "ERP质量表统计着色与地形图预处理的工具集.")]
#[command(version, long_about = None)]
pub struct Cli {
    /// 子命令。
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run_program(&mut self) -> anyhow::Result<()> {
        match self.command {
            Commands::ColorSheets(ref mut v) => v.run(),
            Commands::TopoPrep(ref mut v) => v.run(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 统计目录下所有质量表的均值与标准差，标红离群读数，另存到`<目录名>_color`。
    ColorSheets(crate::subcmd_impls::color_sheets::ColorSheets),
    /// 裁剪、缩放地形图和色标，输出到`extra_images`子目录。
    TopoPrep(crate::subcmd_impls::topo_prep::TopoPrep),
}
