use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::affordability::DTI_EXCELLENT_CEILING;
use crate::schedule::generate_schedule;
use crate::time_value::{annuity_payment, rate_sanity_warning, PERIODS_PER_YEAR};
use crate::{types::*, LoanEngineResult};

/// Rows of the schedule previewed in a loan analysis.
const PREVIEW_PERIODS: u32 = 3;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    pub inputs: LoanInputs,
    #[serde(flatten)]
    pub result: LoanResult,
    /// Total interest / total payment.
    pub interest_share_of_total: Rate,
    /// Monthly payment / principal.
    pub payment_to_principal: Rate,
    /// Gross monthly income at which the payment sits at a 28% DTI.
    pub recommended_monthly_income: Money,
    pub term_years: f64,
    pub first_payments: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fixed monthly payment and totals for a principal/rate/term triple.
pub fn calculate_loan(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
) -> LoanEngineResult<LoanResult> {
    let inputs = LoanInputs::new(principal, annual_rate, term_months)?;
    Ok(compute(&inputs))
}

/// Same as [`calculate_loan`] for an existing `LoanInputs` value.
pub fn calculate(inputs: &LoanInputs) -> LoanEngineResult<LoanResult> {
    inputs.validate()?;
    Ok(compute(inputs))
}

/// Payment summary with the derived ratios and a preview of the first
/// periods of the schedule.
pub fn analyze_loan(inputs: &LoanInputs) -> LoanEngineResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = calculate(inputs)?;
    if let Some(w) = rate_sanity_warning(inputs.annual_rate) {
        warnings.push(w);
    }

    let mut first_payments = generate_schedule(
        inputs.principal,
        inputs.annual_rate,
        inputs.term_months,
    )?;
    first_payments.truncate(PREVIEW_PERIODS as usize);

    let output = LoanAnalysis {
        inputs: *inputs,
        result,
        interest_share_of_total: result.total_interest / result.total_payment,
        payment_to_principal: result.monthly_payment / inputs.principal,
        recommended_monthly_income: result.monthly_payment / DTI_EXCELLENT_CEILING,
        term_years: inputs.term_months as f64 / PERIODS_PER_YEAR as f64,
        first_payments,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "monthly_rate": inputs.annual_rate / PERIODS_PER_YEAR as f64,
        "income_dti_ceiling": DTI_EXCELLENT_CEILING,
    });

    Ok(with_metadata(
        "Fixed-rate annuity payment",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Inputs must already be validated.
pub(crate) fn compute(inputs: &LoanInputs) -> LoanResult {
    let r = inputs.annual_rate / PERIODS_PER_YEAR as f64;
    let monthly_payment = annuity_payment(r, inputs.term_months, inputs.principal);
    let total_payment = monthly_payment * inputs.term_months as f64;
    let total_interest = total_payment - inputs.principal;

    LoanResult {
        monthly_payment,
        total_payment,
        total_interest,
        effective_rate: total_interest / inputs.principal,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
