use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::analysis;
use crate::cli::StatsArgs;
use crate::dataset;
use crate::model::{
    ConfusionEntry, LabelStat, OverallAccuracy, OverlapStats, StatsCounts, StatsRunManifest,
};
use crate::report::{
    CONFUSION_SUMMARY_FILE, LABEL_PERFORMANCE_FILE, OVERALL_ACCURACY_FILE, OVERLAP_STATS_FILE,
    format_ratio, write_confusion_summary, write_label_performance, write_overall_accuracy,
    write_overlap_stats,
};
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

pub const RUN_MANIFEST_FILE: &str = "stats_run_manifest.json";

pub fn run(args: StatsArgs) -> Result<()> {
    let started_ts = Utc::now();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    info!(path = %args.file.display(), run_id = %run_id, "starting stats run");

    let dataset = dataset::load_records(&args.file)?;
    info!(records = dataset.records.len(), "loaded prediction records");

    let overall = analysis::overall_accuracy(&dataset.records);
    let labels = analysis::label_performance(&dataset.records);
    let overlap = analysis::overlap_stats(&dataset.records);
    let confusion = analysis::confusion_summary(&dataset.records, args.top_k);

    if args.json {
        write_json_summary(&overall, &labels, &overlap, &confusion)?;
    } else {
        write_text_summary(&overall, &labels, &overlap, &confusion)?;
    }

    ensure_directory(&args.out_dir)?;
    let overall_path = args.out_dir.join(OVERALL_ACCURACY_FILE);
    write_overall_accuracy(&overall_path, &overall)?;
    let labels_path = args.out_dir.join(LABEL_PERFORMANCE_FILE);
    write_label_performance(&labels_path, &labels)?;
    let overlap_path = args.out_dir.join(OVERLAP_STATS_FILE);
    write_overlap_stats(&overlap_path, &overlap)?;
    let confusion_path = args.out_dir.join(CONFUSION_SUMMARY_FILE);
    write_confusion_summary(&confusion_path, &confusion)?;
    info!(out_dir = %args.out_dir.display(), "wrote stats artifacts");

    let manifest = StatsRunManifest {
        manifest_version: 1,
        run_id,
        generated_at: now_utc_string(),
        command: render_stats_command(&args),
        input_file: args.file.display().to_string(),
        input_sha256: sha256_file(&args.file)?,
        top_k: args.top_k,
        counts: StatsCounts {
            record_count: dataset.records.len(),
            malformed_outcome_count: dataset.malformed_outcome_count,
            label_count: labels.len(),
            confusion_pair_count: confusion.len(),
        },
        artifacts: vec![
            overall_path.display().to_string(),
            labels_path.display().to_string(),
            overlap_path.display().to_string(),
            confusion_path.display().to_string(),
        ],
    };
    let manifest_path = args.out_dir.join(RUN_MANIFEST_FILE);
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote stats run manifest");

    if !args.json {
        let mut output = io::BufWriter::new(io::stdout().lock());
        writeln!(output)?;
        writeln!(output, "Artifacts written: {}", manifest.artifacts.join(", "))?;
        output.flush()?;
    }

    info!(
        records = dataset.records.len(),
        labels = labels.len(),
        confusion_pairs = confusion.len(),
        "stats completed"
    );

    Ok(())
}

fn write_text_summary(
    overall: &OverallAccuracy,
    labels: &[LabelStat],
    overlap: &OverlapStats,
    confusion: &[ConfusionEntry],
) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "=== 1) Overall Prediction Accuracy ===")?;
    writeln!(output, "top1_correct: {}", format_ratio(overall.top1_correct))?;
    writeln!(output, "top2_correct: {}", format_ratio(overall.top2_correct))?;
    writeln!(output, "top3_correct: {}", format_ratio(overall.top3_correct))?;
    writeln!(output, "any_correct: {}", format_ratio(overall.any_correct))?;

    writeln!(output)?;
    writeln!(output, "=== 2) Abstraction-wise Performance ===")?;
    if labels.is_empty() {
        writeln!(output, "No abstraction-wise stats available.")?;
    } else {
        for stat in labels {
            writeln!(
                output,
                "{}\tcount={}\tcorrect={}\taccuracy={:.3}",
                stat.label, stat.count, stat.correct, stat.accuracy
            )?;
        }
    }

    writeln!(output)?;
    writeln!(output, "=== 3) Prediction Overlap & Ordering ===")?;
    writeln!(
        output,
        "all_unique_preds: {}",
        format_ratio(overlap.all_unique_preds)
    )?;
    writeln!(
        output,
        "correct_in_top1_only: {}",
        format_ratio(overlap.correct_in_top1_only)
    )?;
    writeln!(
        output,
        "correct_in_top2_only: {}",
        format_ratio(overlap.correct_in_top2_only)
    )?;
    writeln!(
        output,
        "correct_in_top3_only: {}",
        format_ratio(overlap.correct_in_top3_only)
    )?;

    writeln!(output)?;
    writeln!(output, "=== 4) Confusion Patterns (Most Common Mispredictions) ===")?;
    if confusion.is_empty() {
        writeln!(output, "No mispredictions found.")?;
    } else {
        for entry in confusion {
            writeln!(
                output,
                "predicted={}\tsolved={}\tcount={}",
                entry.predicted, entry.solved, entry.count
            )?;
        }
    }

    output.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct StatsReport<'a> {
    overall: &'a OverallAccuracy,
    abstraction_wise: &'a [LabelStat],
    overlap: &'a OverlapStats,
    confusion: &'a [ConfusionEntry],
}

fn write_json_summary(
    overall: &OverallAccuracy,
    labels: &[LabelStat],
    overlap: &OverlapStats,
    confusion: &[ConfusionEntry],
) -> Result<()> {
    let report = StatsReport {
        overall,
        abstraction_wise: labels,
        overlap,
        confusion,
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &report)
        .context("failed to serialize stats json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn render_stats_command(args: &StatsArgs) -> String {
    let mut command = vec![
        "predcheck".to_string(),
        "stats".to_string(),
        "--file".to_string(),
        args.file.display().to_string(),
        "--top-k".to_string(),
        args.top_k.to_string(),
        "--out-dir".to_string(),
        args.out_dir.display().to_string(),
    ];
    if args.json {
        command.push("--json".to_string());
    }
    command.join(" ")
}
