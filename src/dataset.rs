use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::model::{PREDICTION_RANKS, PredictionSlot, TaskRecord};
use crate::outcome::{OutcomeKind, classify_outcome};

pub const TASK_ID_COLUMN: &str = "task_id";
pub const SOLVED_COLUMN: &str = "solved";
pub const PREDICTED_COLUMNS: [&str; PREDICTION_RANKS] =
    ["predicted_1", "predicted_2", "predicted_3"];
pub const OUTCOME_COLUMNS: [&str; PREDICTION_RANKS] = ["run_test", "run_test.1", "run_test.2"];

#[derive(Debug)]
pub struct Dataset {
    pub records: Vec<TaskRecord>,
    pub malformed_outcome_count: usize,
}

struct ColumnIndexes {
    task_id: usize,
    solved: usize,
    predicted: [usize; PREDICTION_RANKS],
    outcome: [usize; PREDICTION_RANKS],
}

pub fn load_records(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header row of {}", path.display()))?
        .clone();
    let columns = resolve_columns(&headers, path)?;

    let mut records = Vec::new();
    let mut malformed_outcome_count = 0_usize;

    for (row_index, row) in reader.records().enumerate() {
        let row = row.with_context(|| {
            format!("failed to parse row {} of {}", row_index + 2, path.display())
        })?;

        let mut slots: [Option<PredictionSlot>; PREDICTION_RANKS] = Default::default();
        for rank in 0..PREDICTION_RANKS {
            let Some(label) = non_empty(row.get(columns.predicted[rank]).unwrap_or("")) else {
                continue;
            };

            let kind = classify_outcome(row.get(columns.outcome[rank]).unwrap_or(""));
            if kind == OutcomeKind::Unrecognized {
                malformed_outcome_count += 1;
            }

            slots[rank] = Some(PredictionSlot {
                label: label.to_string(),
                correct: kind.is_success(),
            });
        }

        records.push(TaskRecord {
            task_id: row.get(columns.task_id).unwrap_or("").to_string(),
            solved: non_empty(row.get(columns.solved).unwrap_or("")).map(ToOwned::to_owned),
            slots,
        });
    }

    if malformed_outcome_count > 0 {
        warn!(
            count = malformed_outcome_count,
            path = %path.display(),
            "unrecognized outcome values treated as failures"
        );
    }

    Ok(Dataset {
        records,
        malformed_outcome_count,
    })
}

fn resolve_columns(headers: &csv::StringRecord, path: &Path) -> Result<ColumnIndexes> {
    let find = |name: &str| headers.iter().position(|header| header == name);

    let task_id = find(TASK_ID_COLUMN);
    let solved = find(SOLVED_COLUMN);
    let predicted = PREDICTED_COLUMNS.map(find);
    let outcome = OUTCOME_COLUMNS.map(find);

    if let (
        Some(task_id),
        Some(solved),
        [Some(first), Some(second), Some(third)],
        [Some(run_first), Some(run_second), Some(run_third)],
    ) = (task_id, solved, predicted, outcome)
    {
        return Ok(ColumnIndexes {
            task_id,
            solved,
            predicted: [first, second, third],
            outcome: [run_first, run_second, run_third],
        });
    }

    let missing: Vec<&str> = [TASK_ID_COLUMN, SOLVED_COLUMN]
        .into_iter()
        .zip([task_id, solved])
        .chain(PREDICTED_COLUMNS.into_iter().zip(predicted))
        .chain(OUTCOME_COLUMNS.into_iter().zip(outcome))
        .filter_map(|(name, index)| index.is_none().then_some(name))
        .collect();
    bail!(
        "missing required columns in {}: {}",
        path.display(),
        missing.join(", ")
    )
}

fn non_empty(field: &str) -> Option<&str> {
    if field.is_empty() { None } else { Some(field) }
}
