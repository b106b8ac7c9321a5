pub use super::error::{QcError, ReadingError, Result};
pub use super::qc::{
    analyze, locate_sheets, process_file, run_batch, sibling_output_dir, Annotation, BatchReport,
    ColumnStats, Fill, PhaseTimer, ReadingGrid, SheetAnalysis, SheetLayout, QUALITY_SHEET_SUFFIX,
};
pub use super::topo::{
    prepare_topo_maps, TopoGeometry, TopoReport, DEFAULT_CONDITIONS, EXTRA_IMAGES_DIR,
};
