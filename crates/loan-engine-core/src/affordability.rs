use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::payment::calculate;
use crate::time_value::{monthly_rate, present_value};
use crate::{types::*, LoanEngineError, LoanEngineResult};

/// Standard housing-debt ceiling; also the upper bound of "Excellent".
pub const DTI_EXCELLENT_CEILING: Rate = 0.28;
pub const DTI_GOOD_CEILING: Rate = 0.36;
pub const DTI_CAUTION_CEILING: Rate = 0.43;

/// Share of disposable income that may go to a loan payment.
const DISPOSABLE_INCOME_SHARE: Rate = 0.8;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityRating {
    Excellent,
    Good,
    Caution,
    HighRisk,
}

impl AffordabilityRating {
    pub fn label(&self) -> &'static str {
        match self {
            AffordabilityRating::Excellent => "Excellent",
            AffordabilityRating::Good => "Good",
            AffordabilityRating::Caution => "Caution",
            AffordabilityRating::HighRisk => "High Risk",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            AffordabilityRating::Excellent => "Your debt-to-income ratio is very healthy.",
            AffordabilityRating::Good => "Your debt-to-income ratio is acceptable.",
            AffordabilityRating::Caution => "Consider reducing debt before taking new loans.",
            AffordabilityRating::HighRisk => "Your debt-to-income ratio is too high.",
        }
    }
}

impl fmt::Display for AffordabilityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    /// Other monthly debt payments that count towards the DTI.
    #[serde(default)]
    pub other_monthly_debt: Money,
    pub loan: LoanInputs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    pub loan: LoanResult,
    pub debt_to_income: Rate,
    pub rating: AffordabilityRating,
    pub advice: String,
    pub recommended_budget: Money,
    /// Gross monthly income that keeps this payment at a 28% DTI.
    pub required_income: Money,
    /// Largest principal the recommended budget repays at the loan's rate
    /// and term. Zero when the budget is not positive.
    pub max_affordable_principal: Money,
    pub within_budget: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The lesser of 80% of disposable income and 28% of gross income.
pub fn recommended_budget(monthly_income: Money, monthly_expenses: Money) -> Money {
    let disposable = monthly_income - monthly_expenses;
    (disposable * DISPOSABLE_INCOME_SHARE).min(monthly_income * DTI_EXCELLENT_CEILING)
}

/// Band a debt-to-income ratio. Each upper bound is inclusive.
pub fn classify(debt_to_income: Rate) -> AffordabilityRating {
    if debt_to_income <= DTI_EXCELLENT_CEILING {
        AffordabilityRating::Excellent
    } else if debt_to_income <= DTI_GOOD_CEILING {
        AffordabilityRating::Good
    } else if debt_to_income <= DTI_CAUTION_CEILING {
        AffordabilityRating::Caution
    } else {
        AffordabilityRating::HighRisk
    }
}

/// Gross monthly income at which `monthly_payment` is a 28% DTI.
pub fn required_income(monthly_payment: Money) -> Money {
    monthly_payment / DTI_EXCELLENT_CEILING
}

/// Rate a loan against a household's monthly income and obligations.
pub fn assess_affordability(
    input: &AffordabilityInput,
) -> LoanEngineResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    let loan = calculate(&input.loan)?;

    let debt_to_income = (loan.monthly_payment + input.other_monthly_debt) / input.monthly_income;
    let rating = classify(debt_to_income);
    let budget = recommended_budget(input.monthly_income, input.monthly_expenses);

    let max_affordable_principal = if budget > 0.0 {
        present_value(
            monthly_rate(input.loan.annual_rate),
            input.loan.term_months,
            budget,
        )
    } else {
        warnings.push("Monthly expenses leave no budget for a loan payment.".into());
        0.0
    };

    let within_budget = loan.monthly_payment <= budget;
    if !within_budget && budget > 0.0 {
        warnings.push(format!(
            "Monthly payment exceeds the recommended budget by {:.2}.",
            loan.monthly_payment - budget
        ));
    }

    let output = AffordabilityOutput {
        loan,
        debt_to_income,
        rating,
        advice: rating.advice().to_string(),
        recommended_budget: budget,
        required_income: required_income(loan.monthly_payment),
        max_affordable_principal,
        within_budget,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "disposable_income_share": DISPOSABLE_INCOME_SHARE,
        "dti_bands": {
            "excellent": DTI_EXCELLENT_CEILING,
            "good": DTI_GOOD_CEILING,
            "caution": DTI_CAUTION_CEILING,
        },
    });

    Ok(with_metadata(
        "Debt-to-income affordability",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &AffordabilityInput) -> LoanEngineResult<()> {
    if !input.monthly_income.is_finite() || input.monthly_income <= 0.0 {
        return Err(LoanEngineError::InvalidInput {
            field: "monthly_income".into(),
            reason: "Monthly income must be greater than 0.".into(),
        });
    }
    if !input.monthly_expenses.is_finite() || input.monthly_expenses < 0.0 {
        return Err(LoanEngineError::InvalidInput {
            field: "monthly_expenses".into(),
            reason: "Monthly expenses cannot be negative.".into(),
        });
    }
    if !input.other_monthly_debt.is_finite() || input.other_monthly_debt < 0.0 {
        return Err(LoanEngineError::InvalidInput {
            field: "other_monthly_debt".into(),
            reason: "Other monthly debt cannot be negative.".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
