use anyhow::Result;
use tracing::info;

use crate::agreement::{self, DEFAULT_METHODS};
use crate::cli::CrossCheckArgs;
use crate::report::write_agreement_report;

pub fn run(args: CrossCheckArgs) -> Result<()> {
    let methods = resolve_methods(&args.methods);
    info!(
        root = %args.solutions_root.display(),
        methods = %methods.join(","),
        "building cross-method agreement table"
    );

    let table = agreement::build_agreement_table(&args.solutions_root, &methods)?;
    write_agreement_report(&args.out, &table)?;

    info!(path = %args.out.display(), "wrote cross-check report");
    info!(
        tasks = table.rows.len(),
        methods = table.methods.len(),
        "cross-check completed"
    );
    Ok(())
}

fn resolve_methods(requested: &[String]) -> Vec<String> {
    let mut methods: Vec<String> = Vec::new();
    for method in requested {
        if !methods.contains(method) {
            methods.push(method.clone());
        }
    }
    if methods.is_empty() {
        methods = DEFAULT_METHODS.iter().map(|method| method.to_string()).collect();
    }
    methods
}
