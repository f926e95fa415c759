use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LboModelError;
use crate::pe::sensitivity::SensitivityConfig;
use crate::types::*;
use crate::LboModelResult;

/// Principal repayments keyed by year of the holding period (1-based).
///
/// Keys are signed so a schedule naming year 0 or a negative year still
/// loads; such entries are ignored with a warning.
pub type RepaymentSchedule = BTreeMap<i64, Money>;

fn default_years() -> u32 {
    5
}

fn default_entry_multiple() -> Multiple {
    dec!(6)
}

fn default_sponsor_equity() -> Rate {
    dec!(0.5)
}

fn default_fixed_costs_ratio() -> Rate {
    dec!(0.2)
}

fn default_base_revenue() -> Money {
    dec!(100)
}

/// Operating and financing assumptions for an LBO projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboAssumptions {
    /// Annual revenue growth (decimal, e.g. 0.05 = 5%)
    pub revenue_growth: Rate,
    /// EBITDA margin before fixed costs; variable costs run at (1 - margin) of revenue
    pub ebitda_margin: Rate,
    /// Depreciation as percentage of current-year revenue
    pub depreciation_rate: Rate,
    /// Capital expenditures as percentage of base revenue
    pub capex_ratio: Rate,
    /// Net working capital investment as percentage of base revenue
    pub nwc_ratio: Rate,
    /// Corporate tax rate
    pub tax_rate: Rate,
    /// Discount rate for the DCF
    pub discount_rate: Rate,
    /// Exit EV/EBITDA multiple
    pub exit_multiple: Multiple,
    /// Initial debt as a fraction of base revenue
    pub debt_ratio: Rate,
    /// Interest rate on the opening debt balance
    pub interest_rate: Rate,
    /// Scheduled principal repayments by year
    #[serde(default)]
    pub repayment_schedule: RepaymentSchedule,
    /// Holding period in years
    #[serde(default = "default_years")]
    pub years: u32,
    /// Entry multiple applied to base revenue
    #[serde(default = "default_entry_multiple")]
    pub entry_multiple: Multiple,
    /// Sponsor share of the entry equity value
    #[serde(default = "default_sponsor_equity")]
    pub sponsor_equity: Rate,
    /// Fixed costs as percentage of revenue
    #[serde(default = "default_fixed_costs_ratio")]
    pub fixed_costs_ratio: Rate,
    /// Revenue in year 0
    #[serde(default = "default_base_revenue")]
    pub base_revenue: Money,
    /// Sensitivity grid settings
    #[serde(default)]
    pub sensitivity: SensitivityConfig,
}

impl LboAssumptions {
    /// The reference case: 5% growth, 30% margin, 8x exit, 40% leverage and
    /// repayments of 10, 15 and 20 in years 1, 3 and 5.
    pub fn example() -> Self {
        let mut repayment_schedule = RepaymentSchedule::new();
        repayment_schedule.insert(1, dec!(10));
        repayment_schedule.insert(3, dec!(15));
        repayment_schedule.insert(5, dec!(20));

        LboAssumptions {
            revenue_growth: dec!(0.05),
            ebitda_margin: dec!(0.3),
            depreciation_rate: dec!(0.05),
            capex_ratio: dec!(0.08),
            nwc_ratio: dec!(0.02),
            tax_rate: dec!(0.25),
            discount_rate: dec!(0.1),
            exit_multiple: dec!(8),
            debt_ratio: dec!(0.4),
            interest_rate: dec!(0.05),
            repayment_schedule,
            years: default_years(),
            entry_multiple: default_entry_multiple(),
            sponsor_equity: default_sponsor_equity(),
            fixed_costs_ratio: default_fixed_costs_ratio(),
            base_revenue: default_base_revenue(),
            sensitivity: SensitivityConfig::default(),
        }
    }

    /// Scheduled repayment for a given year, zero when none is scheduled.
    pub fn repayment_for(&self, year: u32) -> Money {
        self.repayment_schedule
            .get(&i64::from(year))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Values fixed at entry and reused throughout the holding period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPosition {
    pub base_revenue: Money,
    pub initial_debt: Money,
    /// Entry equity value (entry multiple x base revenue)
    pub entry_equity_value: Money,
    pub sponsor_investment: Money,
    /// Annual capex, sized off base revenue
    pub capex: Money,
    /// Annual NWC investment, sized off base revenue
    pub nwc_change: Money,
}

impl EntryPosition {
    pub fn from_assumptions(a: &LboAssumptions) -> LboModelResult<Self> {
        let sized = |ratio: Decimal, field: &str| {
            a.base_revenue
                .checked_mul(ratio)
                .ok_or_else(|| LboModelError::InvalidInput {
                    field: field.into(),
                    reason: format!("{field} x base revenue is outside the decimal range"),
                })
        };
        let entry_equity_value = sized(a.entry_multiple, "entry_multiple")?;
        let sponsor_investment = entry_equity_value
            .checked_mul(a.sponsor_equity)
            .ok_or_else(|| LboModelError::InvalidInput {
                field: "sponsor_equity".into(),
                reason: "sponsor investment is outside the decimal range".into(),
            })?;
        Ok(EntryPosition {
            base_revenue: a.base_revenue,
            initial_debt: sized(a.debt_ratio, "debt_ratio")?,
            entry_equity_value,
            sponsor_investment,
            capex: sized(a.capex_ratio, "capex_ratio")?,
            nwc_change: sized(a.nwc_ratio, "nwc_ratio")?,
        })
    }
}

/// Validate the structural preconditions and collect warnings for
/// assumptions that are accepted but have no effect.
pub fn validate_assumptions(
    a: &LboAssumptions,
    warnings: &mut Vec<String>,
) -> LboModelResult<()> {
    if a.years == 0 {
        return Err(LboModelError::InvalidInput {
            field: "years".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }

    for year in a.repayment_schedule.keys() {
        if *year < 1 || *year > i64::from(a.years) {
            warnings.push(format!(
                "Repayment scheduled for year {year} falls outside the {}-year holding period and is ignored",
                a.years
            ));
        }
    }

    if a.discount_rate < a.revenue_growth {
        warnings.push(format!(
            "Discount rate ({}) is below revenue growth ({}); the terminal value perpetuity is negative",
            a.discount_rate, a.revenue_growth
        ));
    }

    Ok(())
}
