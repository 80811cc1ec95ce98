use clap::Args;
use serde_json::{json, Value};

use loan_engine_core::affordability::{self, AffordabilityInput};

use crate::commands::loan::LoanArgs;
use crate::input;

/// Arguments for the affordability assessment
#[derive(Args)]
pub struct AffordArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Gross monthly income
    #[arg(long)]
    pub income: Option<f64>,

    /// Monthly living expenses
    #[arg(long)]
    pub expenses: Option<f64>,

    /// Other monthly debt payments
    #[arg(long, default_value_t = 0.0)]
    pub other_debt: f64,
}

/// Arguments for rating a known debt-to-income ratio
#[derive(Args)]
pub struct ClassifyArgs {
    /// Debt-to-income ratio as a fraction (0.33 = 33%)
    #[arg(long)]
    pub dti: f64,
}

pub fn run_afford(args: AffordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = match input::load(args.loan.input.as_deref())? {
        Some(request) => request,
        None => AffordabilityInput {
            monthly_income: args.income.ok_or("--income is required (or provide --input)")?,
            monthly_expenses: args.expenses.ok_or("--expenses is required (or provide --input)")?,
            other_monthly_debt: args.other_debt,
            loan: args.loan.from_flags()?,
        },
    };

    let result = affordability::assess_affordability(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_classify(args: ClassifyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if !args.dti.is_finite() || args.dti < 0.0 {
        return Err("--dti must be a non-negative ratio".into());
    }
    let rating = affordability::classify(args.dti);
    Ok(json!({
        "result": {
            "debt_to_income": args.dti,
            "rating": rating.label(),
            "advice": rating.advice(),
        }
    }))
}
