pub mod cross_check;
pub mod heatmap;
pub mod stats;
