use clap::Args;
use serde_json::{json, Value};

use loan_engine_core::history::{CalculationId, CalculationStore, UserId};

use crate::config::CliConfig;
use crate::store::JsonLinesStore;

/// Arguments for listing or deleting saved calculations
#[derive(Args)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 1)]
    pub user_id: UserId,

    /// History file (defaults to LOAN_HISTORY_FILE)
    #[arg(long)]
    pub history: Option<String>,

    /// Delete the saved calculation with this id instead of listing
    #[arg(long, value_name = "ID")]
    pub delete: Option<CalculationId>,
}

pub fn run_history(
    args: HistoryArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let path = args
        .history
        .map(Into::into)
        .unwrap_or_else(|| config.history_file.clone());
    let mut store = JsonLinesStore::new(path);

    if let Some(id) = args.delete {
        if !store.delete(args.user_id, id) {
            return Err(format!(
                "No saved calculation {id} for user {} could be deleted",
                args.user_id
            )
            .into());
        }
        return Ok(json!({ "result": { "deleted": id, "user_id": args.user_id } }));
    }

    // Flattened rows so table/csv output lists one calculation per line
    let rows: Vec<Value> = store
        .history(args.user_id)
        .into_iter()
        .map(|c| {
            json!({
                "id": c.id,
                "calculated_at": c.calculated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                "principal": c.inputs.principal,
                "annual_rate": c.inputs.annual_rate,
                "term_months": c.inputs.term_months,
                "monthly_payment": c.result.monthly_payment,
                "total_payment": c.result.total_payment,
                "total_interest": c.result.total_interest,
            })
        })
        .collect();

    Ok(Value::Array(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_engine_core::history::SavedCalculation;
    use loan_engine_core::LoanInputs;
    use std::path::PathBuf;

    fn args(path: &PathBuf, delete: Option<CalculationId>) -> HistoryArgs {
        HistoryArgs {
            user_id: 1,
            history: Some(path.display().to_string()),
            delete,
        }
    }

    #[test]
    fn lists_then_deletes_by_id() {
        let path = std::env::temp_dir().join(format!("loan-cmd-{}.jsonl", std::process::id()));
        std::fs::remove_file(&path).ok();
        let config = CliConfig::from_lookup(|_| None).unwrap();

        let saved = SavedCalculation::new(1, LoanInputs::new(9_000.0, 0.06, 36).unwrap()).unwrap();
        assert!(JsonLinesStore::new(&path).save(&saved));

        let listed = run_history(args(&path, None), &config).unwrap();
        assert_eq!(listed[0]["id"], json!(saved.id));

        let deleted = run_history(args(&path, Some(saved.id)), &config).unwrap();
        assert_eq!(deleted["result"]["deleted"], json!(saved.id));

        assert!(run_history(args(&path, Some(saved.id)), &config).is_err());
        let listed = run_history(args(&path, None), &config).unwrap();
        assert_eq!(listed, json!([]));
        std::fs::remove_file(&path).ok();
    }
}
