use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::format::format_currency;
use crate::payment::compute;
use crate::time_value::{percent_to_fraction, rate_sanity_warning};
use crate::{types::*, LoanEngineError, LoanEngineResult};

/// Number of loan offers a single comparison accepts unless configured.
pub const DEFAULT_MAX_OPTIONS: usize = 4;

pub const BASE_OPTION_LABEL: &str = "Base Option";

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// How the rate text of a raw option entry is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    /// 0.045 means 4.5%.
    #[default]
    Fraction,
    /// 4.5 means 4.5%.
    Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub max_options: usize,
    pub rate_basis: RateBasis,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            max_options: DEFAULT_MAX_OPTIONS,
            rate_basis: RateBasis::Fraction,
        }
    }
}

/// A single form field as a caller captured it: already numeric, or text
/// that still has to be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryField {
    Number(f64),
    Text(String),
}

impl From<&str> for EntryField {
    fn from(s: &str) -> Self {
        EntryField::Text(s.to_string())
    }
}

impl From<f64> for EntryField {
    fn from(v: f64) -> Self {
        EntryField::Number(v)
    }
}

/// One loan offer as entered, before parsing. Missing or blank fields mark
/// the entry as incomplete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanOptionEntry {
    #[serde(default)]
    pub principal: Option<EntryField>,
    #[serde(default)]
    pub annual_rate: Option<EntryField>,
    #[serde(default)]
    pub term_months: Option<EntryField>,
}

impl LoanOptionEntry {
    pub fn new(
        principal: impl Into<EntryField>,
        annual_rate: impl Into<EntryField>,
        term_months: impl Into<EntryField>,
    ) -> Self {
        Self {
            principal: Some(principal.into()),
            annual_rate: Some(annual_rate.into()),
            term_months: Some(term_months.into()),
        }
    }

    /// Parse the entry at position `index`.
    ///
    /// `Ok(None)` for incomplete or out-of-range entries, which a comparison
    /// skips. Text that is not a number is an error naming the option.
    pub fn parse(&self, index: usize, basis: RateBasis) -> LoanEngineResult<Option<LoanInputs>> {
        let (Some(principal), Some(rate), Some(term)) = (
            present(&self.principal),
            present(&self.annual_rate),
            present(&self.term_months),
        ) else {
            return Ok(None);
        };

        let principal = parse_real(index, "principal", principal)?;
        let rate = parse_real(index, "annual_rate", rate)?;
        let Some(term_months) = parse_term(index, term)? else {
            return Ok(None);
        };

        let annual_rate = match basis {
            RateBasis::Fraction => rate,
            RateBasis::Percent => percent_to_fraction(rate),
        };

        let inputs = LoanInputs {
            principal,
            annual_rate,
            term_months,
        };
        Ok(inputs.validate().ok().map(|_| inputs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub options: Vec<LoanOptionEntry>,
    #[serde(default)]
    pub config: ComparisonConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// 0-based position of the option in the request.
    pub option_index: usize,
    pub inputs: LoanInputs,
    pub result: LoanResult,
    /// Base option total payment minus this option's total payment.
    pub savings_vs_base: Money,
    pub savings_label: String,
    pub is_best: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanComparison {
    pub rows: Vec<ComparisonRow>,
    pub base_option_index: usize,
    /// Option with the lowest total payment; the earliest wins ties.
    pub best_option_index: usize,
    /// Options that were incomplete or out of range.
    pub skipped_options: Vec<usize>,
}

impl LoanComparison {
    pub fn best(&self) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.is_best)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rank already-typed loan options against the first valid one.
pub fn compare_loans(
    options: &[LoanInputs],
    config: &ComparisonConfig,
) -> LoanEngineResult<LoanComparison> {
    check_option_count(options.len(), config)?;

    let mut valid = Vec::with_capacity(options.len());
    let mut skipped = Vec::new();
    for (index, inputs) in options.iter().enumerate() {
        match inputs.validate() {
            Ok(()) => valid.push((index, *inputs)),
            Err(e) => {
                debug!(index, error = %e, "skipping invalid loan option");
                skipped.push(index);
            }
        }
    }

    rank(valid, skipped)
}

/// Parse raw option entries, then rank them.
///
/// Entries are evaluated in order; the first one with non-numeric text
/// aborts the whole comparison.
pub fn compare_entries(
    entries: &[LoanOptionEntry],
    config: &ComparisonConfig,
) -> LoanEngineResult<LoanComparison> {
    check_option_count(entries.len(), config)?;

    let mut valid = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match entry.parse(index, config.rate_basis)? {
            Some(inputs) => valid.push((index, inputs)),
            None => {
                debug!(index, "skipping incomplete loan option");
                skipped.push(index);
            }
        }
    }

    rank(valid, skipped)
}

/// Comparison wrapped in the standard output envelope.
pub fn run_comparison(
    input: &ComparisonInput,
) -> LoanEngineResult<ComputationOutput<LoanComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let comparison = compare_entries(&input.options, &input.config)?;

    for index in &comparison.skipped_options {
        warnings.push(format!(
            "Option {} skipped: incomplete or out-of-range values",
            index + 1
        ));
    }
    for row in &comparison.rows {
        if let Some(w) = rate_sanity_warning(row.inputs.annual_rate) {
            warnings.push(format!("Option {}: {w}", row.option_index + 1));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "max_options": input.config.max_options,
        "rate_basis": input.config.rate_basis,
        "base_option": "first valid option",
        "ranking": "lowest total payment, earliest option wins ties",
    });

    Ok(with_metadata(
        "Loan comparison by total payment",
        &assumptions,
        warnings,
        elapsed,
        comparison,
    ))
}

/// Text for a savings amount relative to the base option.
pub fn savings_label(savings: Money) -> String {
    if savings == 0.0 {
        BASE_OPTION_LABEL.to_string()
    } else if savings > 0.0 {
        format!("{} saved", format_currency(savings))
    } else {
        format!("{} more", format_currency(-savings))
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn check_option_count(count: usize, config: &ComparisonConfig) -> LoanEngineResult<()> {
    if count > config.max_options {
        return Err(LoanEngineError::InvalidInput {
            field: "options".into(),
            reason: format!(
                "At most {} loan options can be compared, got {count}.",
                config.max_options
            ),
        });
    }
    Ok(())
}

fn rank(
    valid: Vec<(usize, LoanInputs)>,
    skipped_options: Vec<usize>,
) -> LoanEngineResult<LoanComparison> {
    let evaluated: Vec<(usize, LoanInputs, LoanResult)> = valid
        .into_iter()
        .map(|(index, inputs)| (index, inputs, compute(&inputs)))
        .collect();

    let Some(&(base_option_index, _, base)) = evaluated.first() else {
        return Err(LoanEngineError::EmptyComparison(
            "enter at least one complete loan option".into(),
        ));
    };

    let mut best_option_index = base_option_index;
    let mut lowest_total = base.total_payment;
    for (index, _, result) in &evaluated[1..] {
        if result.total_payment < lowest_total {
            lowest_total = result.total_payment;
            best_option_index = *index;
        }
    }

    let rows = evaluated
        .into_iter()
        .map(|(option_index, inputs, result)| {
            let savings_vs_base = base.total_payment - result.total_payment;
            ComparisonRow {
                option_index,
                inputs,
                result,
                savings_vs_base,
                savings_label: savings_label(savings_vs_base),
                is_best: option_index == best_option_index,
            }
        })
        .collect();

    Ok(LoanComparison {
        rows,
        base_option_index,
        best_option_index,
        skipped_options,
    })
}

/// A field counts as present when it exists and is not blank text.
fn present(field: &Option<EntryField>) -> Option<&EntryField> {
    match field {
        Some(EntryField::Text(s)) if s.trim().is_empty() => None,
        other => other.as_ref(),
    }
}

fn parse_real(index: usize, field: &str, value: &EntryField) -> LoanEngineResult<f64> {
    match value {
        EntryField::Number(v) => Ok(*v),
        EntryField::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            LoanEngineError::InvalidOption {
                index,
                field: field.into(),
                reason: format!("'{}' is not a number", s.trim()),
            }
        }),
    }
}

/// `Ok(None)` for whole numbers below one month, which are skipped like any
/// other out-of-range value.
fn parse_term(index: usize, value: &EntryField) -> LoanEngineResult<Option<u32>> {
    let not_a_term = |shown: String| LoanEngineError::InvalidOption {
        index,
        field: "term_months".into(),
        reason: format!("'{shown}' is not a whole number of months"),
    };

    let months: i64 = match value {
        EntryField::Number(v) => {
            if !v.is_finite() || v.fract() != 0.0 {
                return Err(not_a_term(v.to_string()));
            }
            *v as i64
        }
        EntryField::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| not_a_term(s.trim().to_string()))?,
    };

    if months < 1 {
        return Ok(None);
    }
    u32::try_from(months)
        .map(Some)
        .map_err(|_| not_a_term(months.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
