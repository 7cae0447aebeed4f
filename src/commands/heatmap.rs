use anyhow::Result;
use tracing::{info, warn};

use crate::analysis;
use crate::cli::HeatmapArgs;
use crate::dataset;
use crate::heatmap::render_confusion_heatmap;

pub fn run(args: HeatmapArgs) -> Result<()> {
    let dataset = dataset::load_records(&args.file)?;
    info!(
        records = dataset.records.len(),
        path = %args.file.display(),
        "loaded prediction records"
    );

    let entries = analysis::confusion_table(&dataset.records);
    if entries.is_empty() {
        warn!("no mispredictions found, skipping heatmap render");
        return Ok(());
    }

    render_confusion_heatmap(&args.out, &entries)?;
    info!(path = %args.out.display(), "wrote confusion heatmap");
    info!(pairs = entries.len(), "heatmap completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::run;
    use crate::cli::HeatmapArgs;

    #[test]
    fn empty_confusion_table_skips_render() {
        let dir = TempDir::new().expect("create temp dir");
        let input = dir.path().join("correct_predictions.csv");
        fs::write(
            &input,
            "task_id,solved,predicted_1,predicted_2,predicted_3,run_test,run_test.1,run_test.2\n\
             t1,A,A,,,yes,,\n",
        )
        .expect("write input csv");
        let out = dir.path().join("confusion_heatmap.png");

        run(HeatmapArgs {
            file: input,
            out: out.clone(),
        })
        .expect("heatmap run");

        assert!(!out.exists());
    }

    #[test]
    fn unreadable_input_is_an_error() {
        let dir = TempDir::new().expect("create temp dir");
        let err = run(HeatmapArgs {
            file: dir.path().join("absent.csv"),
            out: dir.path().join("confusion_heatmap.png"),
        })
        .expect_err("missing input should fail");

        assert!(err.to_string().contains("absent.csv"));
    }
}
