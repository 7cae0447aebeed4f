use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::warn;

use crate::model::{AgreementRow, AgreementTable};

pub const DEFAULT_METHODS: [&str; 3] = ["nbccg", "na", "ccgbr"];
pub const METHOD_DIR_PREFIX: &str = "llm_cross_check_solutions_";

pub const CORRECT_PARTITION: &str = "correct";
pub const INCORRECT_PARTITION: &str = "incorrect";

pub fn build_agreement_table(solutions_root: &Path, methods: &[String]) -> Result<AgreementTable> {
    if !solutions_root.is_dir() {
        bail!("solutions root not found: {}", solutions_root.display());
    }

    let pattern = Regex::new(r"^(?:solutions_)?(.*)\.json$")
        .context("failed to compile solution filename pattern")?;

    let mut verdicts: BTreeMap<String, Vec<bool>> = BTreeMap::new();

    for (method_index, method) in methods.iter().enumerate() {
        let method_dir = solutions_root.join(format!("{METHOD_DIR_PREFIX}{method}"));
        let correct_ids = collect_task_ids(&method_dir.join(CORRECT_PARTITION), &pattern)?;
        let incorrect_ids = collect_task_ids(&method_dir.join(INCORRECT_PARTITION), &pattern)?;

        let conflicts: Vec<&str> = correct_ids
            .intersection(&incorrect_ids)
            .map(String::as_str)
            .collect();
        if !conflicts.is_empty() {
            bail!(
                "task ids listed as both correct and incorrect for method {method}: {}",
                conflicts.join(", ")
            );
        }

        let observations = correct_ids
            .iter()
            .map(|task_id| (task_id, true))
            .chain(incorrect_ids.iter().map(|task_id| (task_id, false)));
        for (task_id, verdict) in observations {
            let row = verdicts
                .entry(task_id.clone())
                .or_insert_with(|| vec![false; methods.len()]);
            row[method_index] = verdict;
        }
    }

    let rows = verdicts
        .into_iter()
        .map(|(task_id, verdicts)| AgreementRow { task_id, verdicts })
        .collect();

    Ok(AgreementTable {
        methods: methods.to_vec(),
        rows,
    })
}

fn collect_task_ids(partition_dir: &Path, pattern: &Regex) -> Result<BTreeSet<String>> {
    let mut task_ids = BTreeSet::new();

    if !partition_dir.is_dir() {
        warn!(path = %partition_dir.display(), "partition directory missing");
        return Ok(task_ids);
    }

    let entries = fs::read_dir(partition_dir)
        .with_context(|| format!("failed to read {}", partition_dir.display()))?;

    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", partition_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        if let Some(captures) = pattern.captures(filename)
            && let Some(task_id) = captures.get(1)
        {
            task_ids.insert(task_id.as_str().to_string());
        }
    }

    Ok(task_ids)
}
