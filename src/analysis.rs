use std::collections::BTreeMap;

use crate::model::{
    ConfusionEntry, LabelStat, OverallAccuracy, OverlapStats, PREDICTION_RANKS, TaskRecord,
};

pub fn overall_accuracy(records: &[TaskRecord]) -> OverallAccuracy {
    let total = records.len();
    let mut rank_hits = [0_usize; PREDICTION_RANKS];
    let mut any_hits = 0_usize;

    for record in records {
        let mut any = false;
        for (rank, slot) in record.slots.iter().enumerate() {
            if slot.as_ref().is_some_and(|slot| slot.correct) {
                rank_hits[rank] += 1;
                any = true;
            }
        }
        if any {
            any_hits += 1;
        }
    }

    OverallAccuracy {
        top1_correct: ratio(rank_hits[0], total),
        top2_correct: ratio(rank_hits[1], total),
        top3_correct: ratio(rank_hits[2], total),
        any_correct: ratio(any_hits, total),
    }
}

pub fn label_performance(records: &[TaskRecord]) -> Vec<LabelStat> {
    #[derive(Default)]
    struct LabelTally {
        count: usize,
        correct: usize,
    }

    let mut tallies: BTreeMap<&str, LabelTally> = BTreeMap::new();
    for record in records {
        for slot in record.slots.iter().flatten() {
            let tally = tallies.entry(&slot.label).or_default();
            tally.count += 1;
            if slot.correct {
                tally.correct += 1;
            }
        }
    }

    let mut stats: Vec<LabelStat> = tallies
        .into_iter()
        .map(|(label, tally)| LabelStat {
            label: label.to_string(),
            count: tally.count,
            correct: tally.correct,
            accuracy: tally.correct as f64 / tally.count as f64,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.accuracy
            .total_cmp(&a.accuracy)
            .then(b.count.cmp(&a.count))
            .then(a.label.cmp(&b.label))
    });

    stats
}

pub fn overlap_stats(records: &[TaskRecord]) -> OverlapStats {
    let total = records.len();
    let mut all_unique = 0_usize;
    let mut top1 = 0_usize;
    let mut top2_only = 0_usize;
    let mut top3_only = 0_usize;

    for record in records {
        if has_three_distinct_predictions(record) {
            all_unique += 1;
        }

        let first = slot_correct(record, 0);
        let second = slot_correct(record, 1);
        let third = slot_correct(record, 2);

        if first {
            top1 += 1;
        }
        if !first && second {
            top2_only += 1;
        }
        if !first && !second && third {
            top3_only += 1;
        }
    }

    OverlapStats {
        all_unique_preds: ratio(all_unique, total),
        correct_in_top1_only: ratio(top1, total),
        correct_in_top2_only: ratio(top2_only, total),
        correct_in_top3_only: ratio(top3_only, total),
    }
}

pub fn confusion_table(records: &[TaskRecord]) -> Vec<ConfusionEntry> {
    let mut pair_counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for record in records {
        let Some(solved) = record.solved.as_deref() else {
            continue;
        };
        for slot in record.slots.iter().flatten() {
            if slot.correct || slot.label == solved {
                continue;
            }
            *pair_counts.entry((&slot.label, solved)).or_default() += 1;
        }
    }

    let mut entries: Vec<ConfusionEntry> = pair_counts
        .into_iter()
        .map(|((predicted, solved), count)| ConfusionEntry {
            predicted: predicted.to_string(),
            solved: solved.to_string(),
            count,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.predicted.cmp(&b.predicted))
            .then_with(|| a.solved.cmp(&b.solved))
    });

    entries
}

pub fn confusion_summary(records: &[TaskRecord], top_k: usize) -> Vec<ConfusionEntry> {
    let mut entries = confusion_table(records);
    entries.truncate(top_k);
    entries
}

fn ratio(hits: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| hits as f64 / total as f64)
}

fn slot_correct(record: &TaskRecord, rank: usize) -> bool {
    record.slots[rank].as_ref().is_some_and(|slot| slot.correct)
}

fn has_three_distinct_predictions(record: &TaskRecord) -> bool {
    let [Some(first), Some(second), Some(third)] = &record.slots else {
        return false;
    };
    first.label != second.label && first.label != third.label && second.label != third.label
}
