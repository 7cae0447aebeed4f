use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::model::ConfusionEntry;
use crate::util::{artifact_parent, ensure_directory, finalize_artifact};

const HEATMAP_WIDTH: u32 = 1280;
const HEATMAP_HEIGHT: u32 = 960;

struct ConfusionGrid {
    solved_labels: Vec<String>,
    predicted_labels: Vec<String>,
    cells: Vec<Vec<usize>>,
    max_count: usize,
}

pub fn render_confusion_heatmap(path: &Path, entries: &[ConfusionEntry]) -> Result<()> {
    if entries.is_empty() {
        bail!("confusion table is empty, nothing to render");
    }

    let grid = build_grid(entries);
    let rows = grid.solved_labels.len();
    let cols = grid.predicted_labels.len();
    let max_count = grid.max_count;

    let parent = artifact_parent(path);
    ensure_directory(parent)?;
    let staged = tempfile::Builder::new()
        .suffix(".png")
        .tempfile_in(parent)
        .with_context(|| format!("failed to stage temp file for {}", path.display()))?;

    {
        let root = BitMapBackend::new(staged.path(), (HEATMAP_WIDTH, HEATMAP_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Confusion Matrix Heatmap (Predicted vs. True Abstractions)",
                ("sans-serif", 24),
            )
            .margin(20)
            .x_label_area_size(110)
            .y_label_area_size(140)
            .build_cartesian_2d(
                (0..cols as i32).into_segmented(),
                (0..rows as i32).into_segmented(),
            )?;

        let mut y_labels = grid.solved_labels.clone();
        y_labels.reverse();

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(cols)
            .y_labels(rows)
            .x_desc("Predicted Abstraction")
            .y_desc("True (Solved) Abstraction")
            .x_label_formatter(&|coord| segment_label(&grid.predicted_labels, coord))
            .y_label_formatter(&|coord| segment_label(&y_labels, coord))
            .label_style(("sans-serif", 16))
            .draw()?;

        chart.draw_series(grid.cells.iter().enumerate().flat_map(|(row, row_cells)| {
            row_cells.iter().enumerate().map(move |(col, &count)| {
                let x = col as i32;
                let y = (rows - 1 - row) as i32;
                Rectangle::new(
                    [
                        (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                    ],
                    cell_color(count, max_count).filled(),
                )
            })
        }))?;

        let annotation_font = ("sans-serif", 18)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(grid.cells.iter().enumerate().flat_map(|(row, row_cells)| {
            let annotation_font = annotation_font.clone();
            row_cells.iter().enumerate().map(move |(col, &count)| {
                let x = col as i32;
                let y = (rows - 1 - row) as i32;
                Text::new(
                    count.to_string(),
                    (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                    annotation_font.clone(),
                )
            })
        }))?;

        root.present()
            .with_context(|| format!("failed to render heatmap for {}", path.display()))?;
    }

    finalize_artifact(staged, path)
}

fn build_grid(entries: &[ConfusionEntry]) -> ConfusionGrid {
    let solved_labels: Vec<String> = entries
        .iter()
        .map(|entry| entry.solved.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let predicted_labels: Vec<String> = entries
        .iter()
        .map(|entry| entry.predicted.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells = vec![vec![0_usize; predicted_labels.len()]; solved_labels.len()];
    let mut max_count = 0_usize;
    for entry in entries {
        let Ok(row) = solved_labels.binary_search(&entry.solved) else {
            continue;
        };
        let Ok(col) = predicted_labels.binary_search(&entry.predicted) else {
            continue;
        };
        cells[row][col] += entry.count;
        max_count = max_count.max(cells[row][col]);
    }

    ConfusionGrid {
        solved_labels,
        predicted_labels,
        cells,
        max_count,
    }
}

fn segment_label(labels: &[String], coord: &SegmentValue<i32>) -> String {
    match coord {
        SegmentValue::Exact(index) | SegmentValue::CenterOf(index) => labels
            .get(*index as usize)
            .cloned()
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

fn cell_color(count: usize, max_count: usize) -> RGBColor {
    let intensity = if max_count == 0 {
        0.0
    } else {
        count as f64 / max_count as f64
    };
    let channel = |from: u8, to: u8| {
        (f64::from(from) + (f64::from(to) - f64::from(from)) * intensity).round() as u8
    };
    RGBColor(channel(255, 31), channel(255, 119), channel(255, 180))
}
