use clap::Args;
use serde_json::Value;

use loan_engine_core::history::{CalculationStore, SavedCalculation, UserId};
use loan_engine_core::payment;
use loan_engine_core::schedule;
use loan_engine_core::time_value::{percent_to_fraction, years_to_months};
use loan_engine_core::LoanInputs;

use crate::config::CliConfig;
use crate::input;
use crate::store::JsonLinesStore;

/// Principal, rate and term flags shared by every single-loan command
#[derive(Args, Debug, Clone)]
pub struct LoanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<f64>,

    /// Annual rate as a fraction (0.045 = 4.5%)
    #[arg(long, conflicts_with = "rate_percent")]
    pub rate: Option<f64>,

    /// Annual rate as a percentage (4.5 = 4.5%)
    #[arg(long)]
    pub rate_percent: Option<f64>,

    /// Term in months
    #[arg(long, alias = "term", conflicts_with = "years")]
    pub months: Option<u32>,

    /// Term in years
    #[arg(long)]
    pub years: Option<u32>,
}

impl LoanArgs {
    /// Resolve the loan from `--input`, piped stdin, or the flags.
    pub fn resolve(&self) -> Result<LoanInputs, Box<dyn std::error::Error>> {
        if let Some(inputs) = input::load::<LoanInputs>(self.input.as_deref())? {
            return Ok(inputs);
        }
        self.from_flags()
    }

    pub fn from_flags(&self) -> Result<LoanInputs, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let annual_rate = match (self.rate, self.rate_percent) {
            (Some(rate), _) => rate,
            (None, Some(percent)) => percent_to_fraction(percent),
            (None, None) => {
                return Err("--rate or --rate-percent is required (or provide --input)".into())
            }
        };
        let term_months = match (self.months, self.years) {
            (Some(months), _) => months,
            (None, Some(years)) => years_to_months(years)?,
            (None, None) => {
                return Err("--months or --years is required (or provide --input)".into())
            }
        };
        Ok(LoanInputs::new(principal, annual_rate, term_months)?)
    }
}

/// Arguments for the payment calculation
#[derive(Args)]
pub struct CalculateArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Save the calculation to the history file
    #[arg(long)]
    pub save: bool,

    /// User the saved calculation belongs to
    #[arg(long, default_value_t = 1)]
    pub user_id: UserId,

    /// History file (defaults to LOAN_HISTORY_FILE)
    #[arg(long)]
    pub history: Option<String>,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_calculate(
    args: CalculateArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.loan.resolve()?;
    let result = payment::analyze_loan(&inputs)?;

    if args.save {
        let path = args
            .history
            .map(Into::into)
            .unwrap_or_else(|| config.history_file.clone());
        let mut store = JsonLinesStore::new(path);
        let calculation = SavedCalculation::new(args.user_id, inputs)?;
        if !store.save(&calculation) {
            return Err("Failed to save calculation to history".into());
        }
    }

    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.loan.resolve()?;
    let result = schedule::build_schedule(&inputs)?;
    Ok(serde_json::to_value(result)?)
}
