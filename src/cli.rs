use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "predcheck",
    version,
    about = "Batch evaluation and cross-check reporting for ranked prediction records"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Stats(StatsArgs),
    CrossCheck(CrossCheckArgs),
    Heatmap(HeatmapArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[arg(long, default_value = "correct_predictions.csv")]
    pub file: PathBuf,

    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CrossCheckArgs {
    #[arg(long, default_value = "solutions")]
    pub solutions_root: PathBuf,

    #[arg(long = "method")]
    pub methods: Vec<String>,

    #[arg(long, default_value = "llm_cross_check_report.csv")]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct HeatmapArgs {
    #[arg(long, default_value = "correct_predictions.csv")]
    pub file: PathBuf,

    #[arg(long, default_value = "confusion_heatmap.png")]
    pub out: PathBuf,
}
