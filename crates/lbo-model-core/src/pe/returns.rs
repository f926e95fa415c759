use serde::{Deserialize, Serialize};

use crate::error::LboModelError;
use crate::time_value::annualized_return;
use crate::types::*;
use crate::LboModelResult;

/// Sponsor return metrics at exit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnMetrics {
    /// Multiple on Invested Capital
    pub moic: Multiple,
    /// Annualized MOIC return, moic^(1/years) - 1. `None` when the multiple
    /// is negative and has no real root.
    pub irr: Option<Rate>,
}

/// Derive MOIC and annualized return from exit equity value.
///
/// `context` prefixes any warning, e.g. "Base case" or a grid label.
pub fn calculate_returns(
    equity_value: Money,
    sponsor_investment: Money,
    years: u32,
    context: &str,
    warnings: &mut Vec<String>,
) -> LboModelResult<ReturnMetrics> {
    if sponsor_investment.is_zero() {
        return Err(LboModelError::DivisionByZero {
            context: "sponsor investment is zero for MOIC".into(),
        });
    }

    let moic = equity_value
        .checked_div(sponsor_investment)
        .ok_or_else(|| LboModelError::DomainError {
            function: "MOIC".into(),
            reason: format!("{equity_value} / {sponsor_investment} is outside the decimal range"),
        })?;

    let irr = match annualized_return(moic, years) {
        Ok(r) => Some(r),
        Err(LboModelError::DomainError { reason, .. }) => {
            warnings.push(format!("{context}: annualized return undefined ({reason})"));
            None
        }
        Err(e) => return Err(e),
    };

    Ok(ReturnMetrics { moic, irr })
}
