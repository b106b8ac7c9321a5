//! EEG质量表统计着色与地形图预处理。

pub mod error;
pub mod prelude;
pub mod qc;
pub mod topo;
