use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LboModelError;
use crate::pe::assumptions::{EntryPosition, LboAssumptions};
use crate::types::*;
use crate::LboModelResult;

/// A single year of the operating and debt projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,
    pub revenue: Money,
    pub fixed_costs: Money,
    pub variable_costs: Money,
    pub ebitda: Money,
    pub depreciation: Money,
    pub ebit: Money,
    /// Interest on the opening (pre-repayment) debt balance
    pub interest_expense: Money,
    /// Not floored: negative pre-tax income yields a tax benefit
    pub tax: Money,
    pub net_income: Money,
    pub capex: Money,
    pub nwc_change: Money,
    pub free_cash_flow: Money,
    pub scheduled_repayment: Money,
    pub closing_debt_balance: Money,
}

/// Final-year values held constant across every sensitivity scenario.
///
/// Only fixed costs move in the operating leverage grid; everything else
/// below revenue is taken from the last projected year as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalYearCostBase {
    pub revenue: Money,
    pub variable_costs: Money,
    pub depreciation: Money,
    pub interest_expense: Money,
    pub tax: Money,
    pub capex: Money,
    pub nwc_change: Money,
}

/// Output of the year-by-year projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub projections: Vec<YearProjection>,
    /// One entry per projected year
    pub free_cash_flows: Vec<Money>,
    /// One entry per projected year
    pub interest_expenses: Vec<Money>,
    /// years + 1 entries; index 0 is the initial debt
    pub debt_balances: Vec<Money>,
    pub final_year: FinalYearCostBase,
}

impl ProjectionOutput {
    /// Debt outstanding after the last scheduled repayment.
    pub fn final_debt(&self) -> Money {
        self.debt_balances
            .last()
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Walk the holding period, producing free cash flow, interest and the
/// post-repayment debt balance for each year.
pub fn project_cash_flows(
    a: &LboAssumptions,
    entry: &EntryPosition,
    warnings: &mut Vec<String>,
) -> LboModelResult<ProjectionOutput> {
    if a.years == 0 {
        return Err(LboModelError::InvalidInput {
            field: "years".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }

    let mut projections: Vec<YearProjection> = Vec::new();
    let mut free_cash_flows: Vec<Money> = Vec::new();
    let mut interest_expenses: Vec<Money> = Vec::new();
    let mut debt_balances: Vec<Money> = Vec::new();

    let mut debt = entry.initial_debt;
    debt_balances.push(debt);
    let mut prev_revenue = entry.base_revenue;
    let mut debt_went_negative = false;

    for year in 1..=a.years {
        let p = project_year(year, prev_revenue, debt, a, entry).ok_or_else(|| {
            LboModelError::DomainError {
                function: "projection".into(),
                reason: format!("year {year} values are outside the decimal range"),
            }
        })?;

        if p.tax < Decimal::ZERO {
            warnings.push(format!(
                "Year {year}: negative pre-tax income produces a tax benefit of {}",
                -p.tax
            ));
        }
        debt = p.closing_debt_balance;
        if debt < Decimal::ZERO && !debt_went_negative {
            debt_went_negative = true;
            warnings.push(format!(
                "Year {year}: repayments exceed outstanding debt; balance is {debt}"
            ));
        }

        free_cash_flows.push(p.free_cash_flow);
        interest_expenses.push(p.interest_expense);
        debt_balances.push(debt);
        prev_revenue = p.revenue;
        projections.push(p);
    }

    let last = projections.last().ok_or_else(|| {
        LboModelError::InsufficientData("No projection years generated".into())
    })?;
    let final_year = FinalYearCostBase {
        revenue: last.revenue,
        variable_costs: last.variable_costs,
        depreciation: last.depreciation,
        interest_expense: last.interest_expense,
        tax: last.tax,
        capex: entry.capex,
        nwc_change: entry.nwc_change,
    };

    Ok(ProjectionOutput {
        projections,
        free_cash_flows,
        interest_expenses,
        debt_balances,
        final_year,
    })
}

/// One year of the income statement and debt roll-forward, or `None` when
/// a value leaves the decimal range.
fn project_year(
    year: u32,
    prev_revenue: Money,
    opening_debt: Money,
    a: &LboAssumptions,
    entry: &EntryPosition,
) -> Option<YearProjection> {
    let revenue = prev_revenue.checked_mul(Decimal::ONE.checked_add(a.revenue_growth)?)?;

    // Cost structure
    let fixed_costs = revenue.checked_mul(a.fixed_costs_ratio)?;
    let variable_costs = revenue.checked_mul(Decimal::ONE.checked_sub(a.ebitda_margin)?)?;
    let ebitda = revenue.checked_sub(fixed_costs)?.checked_sub(variable_costs)?;
    let depreciation = revenue.checked_mul(a.depreciation_rate)?;
    let ebit = ebitda.checked_sub(depreciation)?;

    // Interest accrues on the balance before this year's repayment
    let interest_expense = opening_debt.checked_mul(a.interest_rate)?;
    let pre_tax_income = ebit.checked_sub(interest_expense)?;
    let tax = pre_tax_income.checked_mul(a.tax_rate)?;
    let net_income = pre_tax_income.checked_sub(tax)?;

    let free_cash_flow = net_income
        .checked_add(depreciation)?
        .checked_sub(entry.capex)?
        .checked_sub(entry.nwc_change)?;

    // Repayment; no floor at zero
    let scheduled_repayment = a.repayment_for(year);
    let closing_debt_balance = opening_debt.checked_sub(scheduled_repayment)?;

    Some(YearProjection {
        year,
        revenue,
        fixed_costs,
        variable_costs,
        ebitda,
        depreciation,
        ebit,
        interest_expense,
        tax,
        net_income,
        capex: entry.capex,
        nwc_change: entry.nwc_change,
        free_cash_flow,
        scheduled_repayment,
        closing_debt_balance,
    })
}
