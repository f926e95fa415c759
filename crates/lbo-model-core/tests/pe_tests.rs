use lbo_model_core::pe::assumptions::LboAssumptions;
use lbo_model_core::pe::lbo::{build_lbo_model, run_lbo_model};
use lbo_model_core::pe::sensitivity::ExitScenarioTreatment;
use lbo_model_core::time_value::annualized_return;
use lbo_model_core::LboModelError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

fn assert_close(actual: Decimal, expected: Decimal, label: &str) {
    let tolerance = dec!(0.000000001) * expected.abs().max(Decimal::ONE);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{label}: expected {expected}, got {actual}"
    );
}

// ===========================================================================
// Golden scenario: the reference example invocation
// ===========================================================================

#[test]
fn test_golden_headline_values() {
    let out = build_lbo_model(&LboAssumptions::example()).unwrap();
    let r = &out.result;

    assert_eq!(r.enterprise_value, dec!(4.24));
    assert_eq!(r.equity_value, dec!(9.24));
    assert_eq!(r.npv, dec!(-3.65));
    assert_eq!(r.terminal_value_discounted, dec!(7.89));
    assert_eq!(r.moic, dec!(0.03));
    assert_eq!(r.irr, Some(dec!(-50.14)));
}

#[test]
fn test_golden_sequences() {
    let out = build_lbo_model(&LboAssumptions::example()).unwrap();
    let r = &out.result;

    assert_eq!(
        r.free_cash_flows,
        vec![dec!(-2.31), dec!(-1.48), dec!(-1.00), dec!(0.07), dec!(0.60)]
    );
    assert_eq!(
        r.interest_expenses,
        vec![dec!(2.00), dec!(1.50), dec!(1.50), dec!(0.75), dec!(0.75)]
    );
    assert_eq!(
        r.debt_balances,
        vec![dec!(40), dec!(30), dec!(30), dec!(15), dec!(15), dec!(-5)]
    );
}

#[test]
fn test_golden_sensitivity_grid() {
    let out = build_lbo_model(&LboAssumptions::example()).unwrap();
    let grid = &out.result.sensitivity;

    let labels: Vec<&str> = grid.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Fixed Cost 15.00%, Exit 7x",
            "Fixed Cost 15.00%, Exit 8x",
            "Fixed Cost 15.00%, Exit 9x",
            "Fixed Cost 20.00%, Exit 7x",
            "Fixed Cost 20.00%, Exit 8x",
            "Fixed Cost 20.00%, Exit 9x",
            "Fixed Cost 25.00%, Exit 7x",
            "Fixed Cost 25.00%, Exit 8x",
            "Fixed Cost 25.00%, Exit 9x",
        ]
    );

    // Exit multiple only labels the cell: values are constant across a row
    for exit in ["7", "8", "9"] {
        let low = out
            .result
            .sensitivity_entry(&format!("Fixed Cost 15.00%, Exit {exit}x"))
            .unwrap();
        assert_eq!(low.enterprise_value, dec!(87.45));
        assert_eq!(low.equity_value, dec!(92.45));
        assert_eq!(low.moic, dec!(0.31));
        assert_eq!(low.irr, Some(dec!(-20.98)));

        let mid = out
            .result
            .sensitivity_entry(&format!("Fixed Cost 20.00%, Exit {exit}x"))
            .unwrap();
        assert_eq!(mid.enterprise_value, dec!(4.24));
        assert_eq!(mid.equity_value, dec!(9.24));
        assert_eq!(mid.moic, dec!(0.03));
        assert_eq!(mid.irr, Some(dec!(-50.14)));

        let high = out
            .result
            .sensitivity_entry(&format!("Fixed Cost 25.00%, Exit {exit}x"))
            .unwrap();
        assert_eq!(high.enterprise_value, dec!(-78.97));
        assert_eq!(high.equity_value, dec!(-73.97));
        assert_eq!(high.moic, dec!(-0.25));
        assert_eq!(high.irr, None);
    }
}

#[test]
fn test_golden_is_reproducible() {
    let a = LboAssumptions::example();
    let first = build_lbo_model(&a).unwrap().result;
    let second = build_lbo_model(&a).unwrap().result;
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

// ===========================================================================
// Projection properties
// ===========================================================================

#[test]
fn test_flat_revenue_without_repayments_gives_flat_fcf() {
    let mut a = LboAssumptions::example();
    a.revenue_growth = Decimal::ZERO;
    a.repayment_schedule.clear();

    let run = run_lbo_model(&a).unwrap();
    let fcfs = &run.projection.free_cash_flows;
    assert!(fcfs.iter().all(|f| *f == fcfs[0]), "FCF not flat: {fcfs:?}");
}

#[test]
fn test_debt_balance_length_and_initial_value() {
    for years in [1u32, 3, 5, 10] {
        let mut a = LboAssumptions::example();
        a.years = years;
        let run = run_lbo_model(&a).unwrap();
        assert_eq!(run.projection.debt_balances.len(), years as usize + 1);
        assert_eq!(run.projection.debt_balances[0], dec!(100) * a.debt_ratio);
        assert_eq!(run.projection.free_cash_flows.len(), years as usize);
        assert_eq!(run.projection.interest_expenses.len(), years as usize);
    }
}

#[test]
fn test_final_debt_reflects_all_scheduled_repayments() {
    let run = run_lbo_model(&LboAssumptions::example()).unwrap();
    let balances = &run.projection.debt_balances;
    assert_eq!(balances[5], balances[0] - dec!(45));
}

#[test]
fn test_repayments_outside_holding_period_ignored() {
    let mut a = LboAssumptions::example();
    a.years = 3;
    let run = run_lbo_model(&a).unwrap();
    // Only years 1 and 3 apply: 40 - 10 - 15
    assert_eq!(run.projection.final_debt(), dec!(15));
    assert!(run.warnings.iter().any(|w| w.contains("year 5")));
}

#[test]
fn test_interest_does_not_change_principal() {
    let mut a = LboAssumptions::example();
    let base = run_lbo_model(&a).unwrap();
    a.interest_rate = dec!(0.12);
    let high = run_lbo_model(&a).unwrap();
    assert_eq!(base.projection.debt_balances, high.projection.debt_balances);
    assert!(high.projection.interest_expenses[0] > base.projection.interest_expenses[0]);
}

// ===========================================================================
// Valuation and return identities
// ===========================================================================

#[test]
fn test_enterprise_value_identity() {
    let run = run_lbo_model(&LboAssumptions::example()).unwrap();
    let v = &run.valuation;
    assert_close(
        v.enterprise_value,
        v.npv + v.terminal_value_discounted,
        "enterprise value",
    );
    assert_close(
        v.equity_value,
        v.enterprise_value - run.projection.final_debt(),
        "equity value",
    );
}

#[test]
fn test_moic_and_irr_identities() {
    let run = run_lbo_model(&LboAssumptions::example()).unwrap();
    let moic = run.valuation.equity_value / run.entry.sponsor_investment;
    assert_eq!(run.returns.moic, moic);
    assert_eq!(run.entry.sponsor_investment, dec!(300));

    let expected_irr = annualized_return(moic, 5).unwrap();
    assert_close(run.returns.irr.unwrap(), expected_irr, "irr");
}

#[test]
fn test_discount_rate_equal_to_growth_fails() {
    let mut a = LboAssumptions::example();
    a.discount_rate = dec!(0.05);
    let result = run_lbo_model(&a);
    assert!(
        matches!(result, Err(LboModelError::DivisionByZero { .. })),
        "Expected a division by zero error"
    );
}

#[test]
fn test_negative_moic_base_case_reports_undefined_irr() {
    let mut a = LboAssumptions::example();
    a.fixed_costs_ratio = dec!(0.25);
    let out = build_lbo_model(&a).unwrap();
    assert!(out.result.moic < Decimal::ZERO);
    assert_eq!(out.result.irr, None);
    assert!(out
        .warnings
        .iter()
        .any(|w| w.starts_with("Base case: annualized return undefined")));
}

#[test]
fn test_single_year_negative_moic_is_defined() {
    let mut a = LboAssumptions::example();
    a.years = 1;
    a.fixed_costs_ratio = dec!(0.25);
    let run = run_lbo_model(&a).unwrap();
    assert!(run.returns.moic < Decimal::ZERO);
    assert_eq!(run.returns.irr, Some(run.returns.moic - Decimal::ONE));
}

#[test]
fn test_zero_years_rejected() {
    let mut a = LboAssumptions::example();
    a.years = 0;
    assert!(matches!(
        run_lbo_model(&a),
        Err(LboModelError::InvalidInput { .. })
    ));
}

#[test]
fn test_zero_sponsor_equity_is_division_by_zero() {
    let mut a = LboAssumptions::example();
    a.sponsor_equity = Decimal::ZERO;
    assert!(matches!(
        run_lbo_model(&a),
        Err(LboModelError::DivisionByZero { .. })
    ));
}

// ===========================================================================
// Sensitivity grid
// ===========================================================================

#[test]
fn test_grid_has_nine_entries_and_centre_matches_base() {
    let run = run_lbo_model(&LboAssumptions::example()).unwrap();
    let grid = &run.sensitivity;
    assert_eq!(grid.entries.len(), 9);

    let centre = grid.base_case().unwrap();
    assert_eq!(centre.label, "Fixed Cost 20.00%, Exit 8x");
    // Unshifted fixed costs reproduce the final-year cash flow exactly
    assert_eq!(
        centre.adjusted_free_cash_flow,
        *run.projection.free_cash_flows.last().unwrap()
    );
    assert_close(
        centre.enterprise_value,
        run.valuation.enterprise_value,
        "centre enterprise value",
    );
    assert_close(
        centre.equity_value,
        run.valuation.equity_value,
        "centre equity value",
    );
}

#[test]
fn test_grid_keeps_base_case_npv() {
    // Only the terminal value is re-derived per cell
    let run = run_lbo_model(&LboAssumptions::example()).unwrap();
    for entry in &run.sensitivity.entries {
        assert_close(
            entry.enterprise_value - run.valuation.npv,
            entry.terminal_value / (Decimal::ONE + dec!(0.1)).powi(5),
            &entry.label,
        );
    }
}

#[test]
fn test_exit_multiple_terminal_option() {
    let mut a = LboAssumptions::example();
    a.sensitivity.exit_treatment = ExitScenarioTreatment::ExitMultipleTerminal;
    let run = run_lbo_model(&a).unwrap();
    let grid = &run.sensitivity;

    let centre = grid.base_case().unwrap();
    assert_eq!(centre.terminal_value, centre.adjusted_ebitda * dec!(8));

    let seven = grid.get("Fixed Cost 20.00%, Exit 7x").unwrap();
    let nine = grid.get("Fixed Cost 20.00%, Exit 9x").unwrap();
    assert!(seven.enterprise_value < centre.enterprise_value);
    assert!(centre.enterprise_value < nine.enterprise_value);
}

#[test]
fn test_grid_moic_identity_per_cell() {
    let run = run_lbo_model(&LboAssumptions::example()).unwrap();
    for entry in &run.sensitivity.entries {
        assert_eq!(entry.moic, entry.equity_value / run.entry.sponsor_investment);
        assert_eq!(
            entry.equity_value,
            entry.enterprise_value - run.projection.final_debt()
        );
    }
}

// ===========================================================================
// Negative debt carried into later years
// ===========================================================================

#[test]
fn test_negative_debt_earns_negative_interest_next_year() {
    let mut a = LboAssumptions::example();
    a.years = 6;
    let run = run_lbo_model(&a).unwrap();
    let p = &run.projection;

    assert_eq!(p.debt_balances[5], dec!(-5));
    assert_eq!(p.debt_balances[6], dec!(-5));
    // Interest on the -5 opening balance
    assert_eq!(p.interest_expenses[5], dec!(-0.25));

    // Year 6 at revenue 134.0095640625: EBIT 6.700478203125, pre-tax
    // income EBIT + 0.25, so the negative interest lifts FCF by 0.1875
    let ebit = dec!(6.700478203125);
    let fcf_without_interest = ebit * dec!(0.75) + ebit - dec!(8) - dec!(2);
    assert_eq!(p.free_cash_flows[5], dec!(1.91333685546875));
    assert_eq!(p.free_cash_flows[5] - fcf_without_interest, dec!(0.1875));
}

// ===========================================================================
// Decimal range
// ===========================================================================

#[test]
fn test_long_holding_period_is_an_error_not_a_panic() {
    let mut a = LboAssumptions::example();
    a.years = 1000;
    assert!(matches!(
        run_lbo_model(&a),
        Err(LboModelError::DomainError { .. })
    ));

    let mut a = LboAssumptions::example();
    a.years = 200;
    a.discount_rate = dec!(0.5);
    assert!(matches!(
        run_lbo_model(&a),
        Err(LboModelError::DomainError { .. })
    ));
}

#[test]
fn test_negative_discount_rate_over_long_horizon_is_not_division_by_zero() {
    let mut a = LboAssumptions::example();
    a.years = 120;
    a.discount_rate = dec!(-0.5);
    assert!(matches!(
        run_lbo_model(&a),
        Err(LboModelError::DomainError { .. })
    ));
}

#[test]
fn test_uneven_fixed_cost_ratio_labels_round() {
    let mut a = LboAssumptions::example();
    a.fixed_costs_ratio = dec!(0.12346);
    let run = run_lbo_model(&a).unwrap();
    let labels: Vec<&str> = run
        .sensitivity
        .entries
        .iter()
        .step_by(3)
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Fixed Cost 7.35%, Exit 7x",
            "Fixed Cost 12.35%, Exit 7x",
            "Fixed Cost 17.35%, Exit 7x",
        ]
    );
}
