pub mod annotate;
pub mod batch;
pub mod grid;
pub mod layout;
pub mod locate;
pub mod output;
pub mod stats;
pub mod timer;

pub use annotate::{Annotation, Fill};
pub use batch::{process_file, run_batch, BatchReport};
pub use grid::ReadingGrid;
pub use layout::{RowSpan, SheetLayout, SummaryRow};
pub use locate::{locate_sheets, QUALITY_SHEET_SUFFIX};
pub use output::sibling_output_dir;
pub use stats::{analyze, ColumnStats, SheetAnalysis};
pub use timer::PhaseTimer;
