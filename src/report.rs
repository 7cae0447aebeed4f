use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::model::{AgreementTable, ConfusionEntry, LabelStat, OverallAccuracy, OverlapStats};
use crate::util::{finalize_artifact, stage_artifact};

pub const OVERALL_ACCURACY_FILE: &str = "overall_accuracy.csv";
pub const LABEL_PERFORMANCE_FILE: &str = "abstraction_wise.csv";
pub const OVERLAP_STATS_FILE: &str = "overlap_stats.csv";
pub const CONFUSION_SUMMARY_FILE: &str = "confusion_summary.csv";

pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.1}%", 100.0 * value),
        None => "undefined".to_string(),
    }
}

pub fn verdict_cell(verdict: bool) -> &'static str {
    if verdict { "Yes" } else { "No" }
}

pub fn write_overall_accuracy(path: &Path, overall: &OverallAccuracy) -> Result<()> {
    let cells = [
        overall.top1_correct,
        overall.top2_correct,
        overall.top3_correct,
        overall.any_correct,
    ];
    write_csv_artifact(path, |writer| {
        writer.write_record(["top1_correct", "top2_correct", "top3_correct", "any_correct"])?;
        if cells.iter().any(Option::is_some) {
            writer.write_record(cells.map(ratio_cell))?;
        }
        Ok(())
    })
}

pub fn write_label_performance(path: &Path, stats: &[LabelStat]) -> Result<()> {
    write_csv_artifact(path, |writer| {
        writer.write_record(["abstraction", "count", "correct", "accuracy"])?;
        for stat in stats {
            writer.write_record([
                stat.label.clone(),
                stat.count.to_string(),
                stat.correct.to_string(),
                stat.accuracy.to_string(),
            ])?;
        }
        Ok(())
    })
}

pub fn write_overlap_stats(path: &Path, overlap: &OverlapStats) -> Result<()> {
    let cells = [
        overlap.all_unique_preds,
        overlap.correct_in_top1_only,
        overlap.correct_in_top2_only,
        overlap.correct_in_top3_only,
    ];
    write_csv_artifact(path, |writer| {
        writer.write_record([
            "all_unique_preds",
            "correct_in_top1_only",
            "correct_in_top2_only",
            "correct_in_top3_only",
        ])?;
        if cells.iter().any(Option::is_some) {
            writer.write_record(cells.map(ratio_cell))?;
        }
        Ok(())
    })
}

pub fn write_confusion_summary(path: &Path, entries: &[ConfusionEntry]) -> Result<()> {
    write_csv_artifact(path, |writer| {
        writer.write_record(["predicted", "solved", "count"])?;
        for entry in entries {
            writer.write_record([
                entry.predicted.clone(),
                entry.solved.clone(),
                entry.count.to_string(),
            ])?;
        }
        Ok(())
    })
}

pub fn write_agreement_report(path: &Path, table: &AgreementTable) -> Result<()> {
    write_csv_artifact(path, |writer| {
        let mut header = vec!["task_id".to_string()];
        header.extend(table.methods.iter().cloned());
        writer.write_record(&header)?;

        for row in &table.rows {
            let mut cells = vec![row.task_id.clone()];
            cells.extend(
                row.verdicts
                    .iter()
                    .map(|verdict| verdict_cell(*verdict).to_string()),
            );
            writer.write_record(&cells)?;
        }
        Ok(())
    })
}

fn ratio_cell(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn write_csv_artifact<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<&mut NamedTempFile>) -> csv::Result<()>,
{
    let mut staged = stage_artifact(path)?;

    let mut writer = csv::Writer::from_writer(&mut staged);
    fill(&mut writer).with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    drop(writer);

    finalize_artifact(staged, path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{
        format_ratio, write_agreement_report, write_confusion_summary, write_label_performance,
        write_overall_accuracy, write_overlap_stats,
    };
    use crate::model::{
        AgreementRow, AgreementTable, ConfusionEntry, LabelStat, OverallAccuracy, OverlapStats,
    };

    #[test]
    fn format_ratio_renders_percent_or_undefined() {
        assert_eq!(format_ratio(Some(4.0 / 7.0)), "57.1%");
        assert_eq!(format_ratio(Some(0.0)), "0.0%");
        assert_eq!(format_ratio(Some(1.0)), "100.0%");
        assert_eq!(format_ratio(None), "undefined");
    }

    #[test]
    fn undefined_metrics_produce_header_only_tables() {
        let dir = TempDir::new().expect("create temp dir");

        let overall_path = dir.path().join("overall_accuracy.csv");
        let overall = OverallAccuracy {
            top1_correct: None,
            top2_correct: None,
            top3_correct: None,
            any_correct: None,
        };
        write_overall_accuracy(&overall_path, &overall).expect("write overall");
        let contents = fs::read_to_string(&overall_path).expect("read overall");
        assert_eq!(
            contents,
            "top1_correct,top2_correct,top3_correct,any_correct\n"
        );

        let overlap_path = dir.path().join("overlap_stats.csv");
        let overlap = OverlapStats {
            all_unique_preds: None,
            correct_in_top1_only: None,
            correct_in_top2_only: None,
            correct_in_top3_only: None,
        };
        write_overlap_stats(&overlap_path, &overlap).expect("write overlap");
        let contents = fs::read_to_string(&overlap_path).expect("read overlap");
        assert_eq!(
            contents,
            "all_unique_preds,correct_in_top1_only,correct_in_top2_only,correct_in_top3_only\n"
        );
    }

    #[test]
    fn defined_metrics_produce_one_value_row() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("overall_accuracy.csv");
        let overall = OverallAccuracy {
            top1_correct: Some(1.0 / 3.0),
            top2_correct: Some(1.0 / 3.0),
            top3_correct: Some(0.0),
            any_correct: Some(2.0 / 3.0),
        };

        write_overall_accuracy(&path, &overall).expect("write overall");
        let contents = fs::read_to_string(&path).expect("read overall");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let cells: Vec<f64> = lines[1]
            .split(',')
            .map(|cell| cell.parse().expect("numeric cell"))
            .collect();
        assert_eq!(cells, vec![1.0 / 3.0, 1.0 / 3.0, 0.0, 2.0 / 3.0]);
    }

    #[test]
    fn label_performance_rows_keep_their_order() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("abstraction_wise.csv");
        let stats = vec![
            LabelStat {
                label: "A".to_string(),
                count: 3,
                correct: 2,
                accuracy: 2.0 / 3.0,
            },
            LabelStat {
                label: "B".to_string(),
                count: 2,
                correct: 0,
                accuracy: 0.0,
            },
        ];

        write_label_performance(&path, &stats).expect("write label stats");
        let contents = fs::read_to_string(&path).expect("read label stats");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "abstraction,count,correct,accuracy");
        assert!(lines[1].starts_with("A,3,2,"));
        assert_eq!(lines[2], "B,2,0,0");
    }

    #[test]
    fn confusion_summary_writes_pairs_with_counts() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("confusion_summary.csv");
        let entries = vec![ConfusionEntry {
            predicted: "B".to_string(),
            solved: "A".to_string(),
            count: 3,
        }];

        write_confusion_summary(&path, &entries).expect("write confusion");
        let contents = fs::read_to_string(&path).expect("read confusion");
        assert_eq!(contents, "predicted,solved,count\nB,A,3\n");
    }

    #[test]
    fn agreement_report_uses_yes_no_cells_per_method() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("llm_cross_check_report.csv");
        let table = AgreementTable {
            methods: vec!["nbccg".to_string(), "na".to_string()],
            rows: vec![
                AgreementRow {
                    task_id: "t1".to_string(),
                    verdicts: vec![true, false],
                },
                AgreementRow {
                    task_id: "t2".to_string(),
                    verdicts: vec![false, false],
                },
            ],
        };

        write_agreement_report(&path, &table).expect("write agreement");
        let contents = fs::read_to_string(&path).expect("read agreement");
        assert_eq!(contents, "task_id,nbccg,na\nt1,Yes,No\nt2,No,No\n");
    }

    #[test]
    fn writers_leave_no_staging_files_behind() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("nested").join("confusion_summary.csv");

        write_confusion_summary(&path, &[]).expect("write confusion");
        assert!(path.is_file());

        let entries: Vec<_> = fs::read_dir(path.parent().expect("parent dir"))
            .expect("read dir")
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
