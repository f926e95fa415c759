use serde::{Deserialize, Serialize};

use crate::error::LboModelError;
use crate::time_value::{discount_factor, gordon_growth_value, npv_end_of_period, present_value};
use crate::types::{Money, Rate};
use crate::LboModelResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Inputs to the DCF valuation of a projected free cash flow stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfInput {
    /// Free cash flows for years 1..=n, in order
    pub free_cash_flows: Vec<Money>,
    pub discount_rate: Rate,
    /// Perpetuity growth applied to the final-year cash flow
    pub terminal_growth_rate: Rate,
    /// Debt outstanding at exit, bridged out of enterprise value
    pub net_debt: Money,
}

/// Output of the DCF valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfOutput {
    /// End-of-year discount factors, one per projected year
    pub discount_factors: Vec<Rate>,
    /// Sum of discounted explicit-period free cash flows
    pub npv: Money,
    /// Undiscounted Gordon growth terminal value at year n
    pub terminal_value: Money,
    pub terminal_value_discounted: Money,
    /// Enterprise value = NPV + PV(TV)
    pub enterprise_value: Money,
    /// Equity value = EV - net debt
    pub equity_value: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Discount projected free cash flows and a Gordon growth terminal value to
/// an enterprise and equity value.
pub fn value_cash_flows(input: &DcfInput) -> LboModelResult<DcfOutput> {
    let last = *input.free_cash_flows.last().ok_or_else(|| {
        LboModelError::InsufficientData("DCF requires at least one projected cash flow".into())
    })?;
    let n_years = input.free_cash_flows.len() as u32;

    let discount_factors = (1..=n_years)
        .map(|year| discount_factor(input.discount_rate, year))
        .collect::<LboModelResult<Vec<Rate>>>()?;

    let npv = npv_end_of_period(input.discount_rate, &input.free_cash_flows)?;

    let terminal_value =
        gordon_growth_value(last, input.terminal_growth_rate, input.discount_rate)?;
    let terminal_value_discounted = present_value(terminal_value, input.discount_rate, n_years)?;

    let (enterprise_value, equity_value) =
        bridge_to_equity(npv, terminal_value_discounted, input.net_debt)?;

    Ok(DcfOutput {
        discount_factors,
        npv,
        terminal_value,
        terminal_value_discounted,
        enterprise_value,
        equity_value,
    })
}

/// Enterprise and equity value for a replacement terminal value, keeping the
/// explicit-period NPV and net debt of an existing valuation.
pub fn revalue_terminal(
    npv: Money,
    terminal_value: Money,
    discount_rate: Rate,
    years: u32,
    net_debt: Money,
) -> LboModelResult<(Money, Money)> {
    let terminal_value_discounted = present_value(terminal_value, discount_rate, years)?;
    bridge_to_equity(npv, terminal_value_discounted, net_debt)
}

/// EV = NPV + PV(TV); equity = EV - net debt.
fn bridge_to_equity(
    npv: Money,
    terminal_value_discounted: Money,
    net_debt: Money,
) -> LboModelResult<(Money, Money)> {
    let out_of_range = || LboModelError::DomainError {
        function: "equity bridge".into(),
        reason: "enterprise or equity value is outside the decimal range".into(),
    };
    let enterprise_value = npv
        .checked_add(terminal_value_discounted)
        .ok_or_else(out_of_range)?;
    let equity_value = enterprise_value
        .checked_sub(net_debt)
        .ok_or_else(out_of_range)?;
    Ok((enterprise_value, equity_value))
}
