use lbo_model_core::time_value::{discount_factor, npv_end_of_period};
use lbo_model_core::valuation::dcf::{value_cash_flows, DcfInput};
use lbo_model_core::LboModelError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn growing_input() -> DcfInput {
    DcfInput {
        free_cash_flows: vec![dec!(10), dec!(11), dec!(12.1), dec!(13.31), dec!(14.641)],
        discount_rate: dec!(0.10),
        terminal_growth_rate: dec!(0.03),
        net_debt: dec!(50),
    }
}

// ===========================================================================
// DCF valuation tests
// ===========================================================================

#[test]
fn test_npv_matches_time_value_helper() {
    let input = growing_input();
    let out = value_cash_flows(&input).unwrap();
    let expected = npv_end_of_period(input.discount_rate, &input.free_cash_flows).unwrap();
    assert_eq!(out.npv, expected);
}

#[test]
fn test_cash_flows_growing_at_discount_rate_have_equal_pv() {
    // Each FCF grows 10% and is discounted at 10%: every PV is 10 / 1.1
    let out = value_cash_flows(&growing_input()).unwrap();
    let expected = dec!(50) / dec!(1.1);
    assert!(
        (out.npv - expected).abs() < dec!(0.0000001),
        "Expected {expected}, got {}",
        out.npv
    );
}

#[test]
fn test_terminal_value_gordon_formula() {
    let out = value_cash_flows(&growing_input()).unwrap();
    // 14.641 * 1.03 / 0.07
    let expected_tv = dec!(14.641) * dec!(1.03) / dec!(0.07);
    assert_eq!(out.terminal_value, expected_tv);
    let df5 = discount_factor(dec!(0.10), 5).unwrap();
    assert!((out.terminal_value_discounted - expected_tv * df5).abs() < dec!(0.0000001));
}

#[test]
fn test_discount_factors_are_end_of_year() {
    let out = value_cash_flows(&growing_input()).unwrap();
    assert_eq!(out.discount_factors.len(), 5);
    assert_eq!(out.discount_factors[0], Decimal::ONE / dec!(1.1));
}

#[test]
fn test_higher_discount_rate_lowers_enterprise_value() {
    let low = value_cash_flows(&growing_input()).unwrap();
    let mut input = growing_input();
    input.discount_rate = dec!(0.12);
    let high = value_cash_flows(&input).unwrap();
    assert!(high.enterprise_value < low.enterprise_value);
}

#[test]
fn test_negative_net_debt_adds_to_equity() {
    let mut input = growing_input();
    input.net_debt = dec!(-5);
    let out = value_cash_flows(&input).unwrap();
    assert_eq!(out.equity_value, out.enterprise_value + dec!(5));
}

#[test]
fn test_growth_above_discount_rate_gives_negative_terminal_value() {
    let mut input = growing_input();
    input.terminal_growth_rate = dec!(0.12);
    let out = value_cash_flows(&input).unwrap();
    assert!(out.terminal_value < Decimal::ZERO);
}

#[test]
fn test_discount_rate_minus_100_pct_fails() {
    let mut input = growing_input();
    input.discount_rate = dec!(-1);
    assert!(matches!(
        value_cash_flows(&input),
        Err(LboModelError::DivisionByZero { .. })
    ));
}
