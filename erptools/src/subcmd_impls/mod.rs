pub mod args;
mod color_sheets;
mod topo_prep;
mod utils;
