use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LboModelError;
use crate::types::{Money, Multiple, Rate};
use crate::LboModelResult;

/// End-of-period discount factor: 1 / (1 + rate)^period
pub fn discount_factor(rate: Rate, period: u32) -> LboModelResult<Rate> {
    discount(Decimal::ONE, rate, period, "discount factor")
}

/// Present value of a single amount received at the end of `period`.
pub fn present_value(amount: Money, rate: Rate, period: u32) -> LboModelResult<Money> {
    discount(amount, rate, period, "present value")
}

/// amount / (1 + rate)^period, with the power checked against the decimal
/// range. A base inside (-1, 1) is inverted before raising so that a small
/// but non-zero growth factor does not round to zero.
fn discount(amount: Money, rate: Rate, period: u32, context: &str) -> LboModelResult<Money> {
    if period == 0 {
        return Ok(amount);
    }
    let out_of_range = || LboModelError::DomainError {
        function: context.into(),
        reason: format!("(1 + {rate})^{period} is outside the decimal range"),
    };
    let base = Decimal::ONE.checked_add(rate).ok_or_else(out_of_range)?;
    if base.is_zero() {
        return Err(LboModelError::DivisionByZero {
            context: format!("{context} at period {period}"),
        });
    }

    if base.abs() >= Decimal::ONE {
        let growth = base
            .checked_powi(i64::from(period))
            .ok_or_else(out_of_range)?;
        amount.checked_div(growth).ok_or_else(out_of_range)
    } else {
        let factor = (Decimal::ONE / base)
            .checked_powi(i64::from(period))
            .ok_or_else(out_of_range)?;
        amount.checked_mul(factor).ok_or_else(out_of_range)
    }
}

/// Net Present Value of cash flows received at the end of periods 1..=n.
///
/// Unlike a spreadsheet NPV with a time-zero flow, the first element is
/// discounted one full period.
pub fn npv_end_of_period(rate: Rate, cash_flows: &[Money]) -> LboModelResult<Money> {
    let mut result = Decimal::ZERO;
    for (t, cf) in cash_flows.iter().enumerate() {
        let pv = present_value(*cf, rate, (t + 1) as u32)?;
        result = result.checked_add(pv).ok_or_else(|| LboModelError::DomainError {
            function: "NPV".into(),
            reason: "sum of discounted cash flows is outside the decimal range".into(),
        })?;
    }
    Ok(result)
}

/// Gordon growth perpetuity on a final-period cash flow:
/// TV = CF * (1 + g) / (r - g)
pub fn gordon_growth_value(
    final_cash_flow: Money,
    growth: Rate,
    discount_rate: Rate,
) -> LboModelResult<Money> {
    let out_of_range = || LboModelError::DomainError {
        function: "terminal value".into(),
        reason: format!(
            "perpetuity on {final_cash_flow} at {growth} growth and {discount_rate} discount is outside the decimal range"
        ),
    };
    let spread = discount_rate.checked_sub(growth).ok_or_else(out_of_range)?;
    if spread.is_zero() {
        return Err(LboModelError::DivisionByZero {
            context: format!(
                "terminal value: discount rate ({discount_rate}) equals growth rate ({growth})"
            ),
        });
    }
    Decimal::ONE
        .checked_add(growth)
        .and_then(|g| final_cash_flow.checked_mul(g))
        .and_then(|v| v.checked_div(spread))
        .ok_or_else(out_of_range)
}

/// Annualized return implied by a multiple over a holding period:
/// moic^(1/years) - 1.
///
/// This is a compound growth rate on the exit multiple, not a cash-flow
/// weighted IRR. A negative multiple has no real root for `years > 1` and
/// is reported as a `DomainError` rather than a NaN.
pub fn annualized_return(moic: Multiple, years: u32) -> LboModelResult<Rate> {
    if years == 0 {
        return Err(LboModelError::InvalidInput {
            field: "years".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }
    if years == 1 {
        return moic
            .checked_sub(Decimal::ONE)
            .ok_or_else(|| LboModelError::DomainError {
                function: "annualized return".into(),
                reason: format!("MOIC of {moic} is outside the decimal range"),
            });
    }
    if moic.is_zero() {
        return Ok(dec!(-1));
    }
    if moic < Decimal::ZERO {
        return Err(LboModelError::DomainError {
            function: "annualized return".into(),
            reason: format!("MOIC of {moic} has no real {years}-year root"),
        });
    }

    let exponent = Decimal::ONE / Decimal::from(years);
    Ok(moic.powd(exponent) - Decimal::ONE)
}
