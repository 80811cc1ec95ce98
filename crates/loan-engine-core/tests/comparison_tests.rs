use loan_engine_core::affordability::{self, AffordabilityInput, AffordabilityRating};
use loan_engine_core::comparison::{
    compare_entries, compare_loans, run_comparison, ComparisonConfig, ComparisonInput,
    LoanOptionEntry, RateBasis,
};
use loan_engine_core::history::{CalculationStore, InMemoryStore, SavedCalculation};
use loan_engine_core::{ErrorKind, LoanEngineError, LoanInputs};
use pretty_assertions::assert_eq;

fn offer(principal: f64, annual_rate: f64, term_months: u32) -> LoanInputs {
    LoanInputs {
        principal,
        annual_rate,
        term_months,
    }
}

// ===========================================================================
// Comparison engine
// ===========================================================================

#[test]
fn test_four_offers_ranked_by_total_payment() {
    let options = [
        offer(250_000.0, 0.045, 360),
        offer(250_000.0, 0.0425, 360),
        offer(250_000.0, 0.039, 180),
        offer(250_000.0, 0.05, 360),
    ];
    let cmp = compare_loans(&options, &ComparisonConfig::default()).unwrap();

    // 15-year loan pays far less interest overall
    assert_eq!(cmp.best_option_index, 2);
    assert_eq!(cmp.best().unwrap().option_index, 2);
    assert_eq!(cmp.rows[0].savings_label, "Base Option");
    assert!(cmp.rows[1].savings_label.ends_with(" saved"));
    assert!(cmp.rows[2].savings_label.ends_with(" saved"));
    assert!(cmp.rows[3].savings_label.ends_with(" more"));
}

#[test]
fn test_savings_sign_convention() {
    let options = [offer(250_000.0, 0.045, 360), offer(250_000.0, 0.05, 360)];
    let cmp = compare_loans(&options, &ComparisonConfig::default()).unwrap();
    let base_total = cmp.rows[0].result.total_payment;
    let second_total = cmp.rows[1].result.total_payment;
    assert_eq!(cmp.rows[1].savings_vs_base, base_total - second_total);
    assert!(cmp.rows[1].savings_vs_base < 0.0);
}

#[test]
fn test_tie_break_first_minimum_wins() {
    let options = [
        offer(1_000.0, 0.0, 10),
        offer(900.0, 0.0, 10),
        offer(900.0, 0.0, 10),
        offer(1_100.0, 0.0, 10),
    ];
    let cmp = compare_loans(&options, &ComparisonConfig::default()).unwrap();
    let totals: Vec<f64> = cmp.rows.iter().map(|r| r.result.total_payment).collect();
    assert_eq!(totals, vec![1_000.0, 900.0, 900.0, 1_100.0]);
    assert_eq!(cmp.best_option_index, 1);
}

#[test]
fn test_form_style_entries_with_percent_rates() {
    let input = ComparisonInput {
        options: vec![
            LoanOptionEntry::new("250000", "4.5", "360"),
            LoanOptionEntry::default(),
            LoanOptionEntry::new(" 250000 ", " 5 ", " 360 "),
        ],
        config: ComparisonConfig {
            rate_basis: RateBasis::Percent,
            ..Default::default()
        },
    };
    let out = run_comparison(&input).unwrap();
    assert_eq!(out.result.rows.len(), 2);
    assert_eq!(out.result.skipped_options, vec![1]);
    assert_eq!(out.warnings, vec!["Option 2 skipped: incomplete or out-of-range values"]);
}

#[test]
fn test_non_numeric_entry_aborts_with_index() {
    let entries = [
        LoanOptionEntry::new("250000", "0.045", "360"),
        LoanOptionEntry::new("250000", "0.05", "360"),
        LoanOptionEntry::new("lots", "0.05", "360"),
    ];
    let err = compare_entries(&entries, &ComparisonConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.to_string(),
        "Invalid input in option 3: principal — 'lots' is not a number"
    );
}

#[test]
fn test_empty_request_is_empty_comparison() {
    let err = compare_entries(&[], &ComparisonConfig::default()).unwrap_err();
    assert!(matches!(err, LoanEngineError::EmptyComparison(_)));
    assert_eq!(err.kind(), ErrorKind::EmptyComparison);
}

// ===========================================================================
// Affordability advisor
// ===========================================================================

#[test]
fn test_dti_bands() {
    assert_eq!(affordability::classify(0.28), AffordabilityRating::Excellent);
    assert_eq!(affordability::classify(0.280001), AffordabilityRating::Good);
    assert_eq!(affordability::classify(0.43), AffordabilityRating::Caution);
    assert_eq!(affordability::classify(0.4300001), AffordabilityRating::HighRisk);
}

#[test]
fn test_assessment_matches_classifier() {
    let input = AffordabilityInput {
        monthly_income: 4_000.0,
        monthly_expenses: 1_500.0,
        other_monthly_debt: 200.0,
        loan: offer(250_000.0, 0.045, 360),
    };
    let out = affordability::assess_affordability(&input).unwrap();
    let a = &out.result;
    // (1266.71 + 200) / 4000 = 0.3667 -> Caution
    assert_eq!(a.rating, AffordabilityRating::Caution);
    assert_eq!(a.rating, affordability::classify(a.debt_to_income));
    // budget = min(0.8 * 2500, 0.28 * 4000) = 1120
    assert!((a.recommended_budget - 1_120.0).abs() < 1e-9);
    assert!(!a.within_budget);
    assert!(a.max_affordable_principal < 250_000.0);
}

// ===========================================================================
// Persistence boundary
// ===========================================================================

#[test]
fn test_store_receives_computed_result() {
    let mut store = InMemoryStore::new();
    let inputs = offer(250_000.0, 0.045, 360);
    let saved = SavedCalculation::new(42, inputs).unwrap();
    assert!(store.save(&saved));

    let history = store.history(42);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].inputs, inputs);
    assert!((history[0].result.monthly_payment - 1266.71).abs() < 0.05);
}
