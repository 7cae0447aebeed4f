use serde::Serialize;

pub const PREDICTION_RANKS: usize = 3;

#[derive(Debug, Clone)]
pub struct PredictionSlot {
    pub label: String,
    pub correct: bool,
}

#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_id: String,
    pub solved: Option<String>,
    pub slots: [Option<PredictionSlot>; PREDICTION_RANKS],
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallAccuracy {
    pub top1_correct: Option<f64>,
    pub top2_correct: Option<f64>,
    pub top3_correct: Option<f64>,
    pub any_correct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelStat {
    pub label: String,
    pub count: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlapStats {
    pub all_unique_preds: Option<f64>,
    pub correct_in_top1_only: Option<f64>,
    pub correct_in_top2_only: Option<f64>,
    pub correct_in_top3_only: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionEntry {
    pub predicted: String,
    pub solved: String,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct AgreementRow {
    pub task_id: String,
    pub verdicts: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct AgreementTable {
    pub methods: Vec<String>,
    pub rows: Vec<AgreementRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsCounts {
    pub record_count: usize,
    pub malformed_outcome_count: usize,
    pub label_count: usize,
    pub confusion_pair_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub command: String,
    pub input_file: String,
    pub input_sha256: String,
    pub top_k: usize,
    pub counts: StatsCounts,
    pub artifacts: Vec<String>,
}
