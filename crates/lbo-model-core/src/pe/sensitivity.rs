use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LboModelError;
use crate::pe::projection::FinalYearCostBase;
use crate::pe::returns::calculate_returns;
use crate::scenarios::sensitivity::{centered_variable, evaluate_grid};
use crate::time_value::gordon_growth_value;
use crate::types::*;
use crate::valuation::dcf::revalue_terminal;
use crate::LboModelResult;

/// How the exit-multiple axis of the grid feeds into valuation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitScenarioTreatment {
    /// Exit multiple labels the cell only; the terminal value is the Gordon
    /// growth perpetuity on the adjusted cash flow, so values are identical
    /// across each row.
    #[default]
    LabelOnly,
    /// Terminal value = adjusted EBITDA x exit multiple, discounted over the
    /// holding period.
    ExitMultipleTerminal,
}

fn default_fixed_cost_step() -> Rate {
    dec!(0.05)
}

fn default_exit_multiple_step() -> Multiple {
    dec!(1)
}

/// Operating leverage / exit multiple grid settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Shift applied either side of the base fixed-cost ratio
    #[serde(default = "default_fixed_cost_step")]
    pub fixed_cost_step: Rate,
    /// Shift applied either side of the base exit multiple
    #[serde(default = "default_exit_multiple_step")]
    pub exit_multiple_step: Multiple,
    #[serde(default)]
    pub exit_treatment: ExitScenarioTreatment,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        SensitivityConfig {
            fixed_cost_step: default_fixed_cost_step(),
            exit_multiple_step: default_exit_multiple_step(),
            exit_treatment: ExitScenarioTreatment::default(),
        }
    }
}

/// Base-case values the grid is built around
#[derive(Debug, Clone)]
pub struct GridInput<'a> {
    pub cost_base: &'a FinalYearCostBase,
    /// Base-case NPV of the explicit period
    pub npv: Money,
    /// Base-case debt at exit
    pub net_debt: Money,
    pub sponsor_investment: Money,
    pub discount_rate: Rate,
    pub revenue_growth: Rate,
    pub years: u32,
    pub fixed_costs_ratio: Rate,
    pub exit_multiple: Multiple,
    pub config: &'a SensitivityConfig,
}

/// One scenario of the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub label: String,
    pub fixed_costs_ratio: Rate,
    pub exit_multiple: Multiple,
    pub adjusted_ebitda: Money,
    pub adjusted_free_cash_flow: Money,
    pub terminal_value: Money,
    pub enterprise_value: Money,
    pub equity_value: Money,
    pub moic: Multiple,
    pub irr: Option<Rate>,
}

/// Fixed-cost ratio x exit multiple grid, row-major by fixed-cost scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingLeverageGrid {
    pub fixed_cost_scenarios: Vec<Rate>,
    pub exit_multiple_scenarios: Vec<Multiple>,
    pub exit_treatment: ExitScenarioTreatment,
    pub entries: Vec<SensitivityEntry>,
    /// (fixed-cost index, exit index) of the unshifted scenario
    pub base_case_position: (usize, usize),
}

impl OperatingLeverageGrid {
    pub fn get(&self, label: &str) -> Option<&SensitivityEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&SensitivityEntry> {
        if col >= self.exit_multiple_scenarios.len() {
            return None;
        }
        self.entries
            .get(row * self.exit_multiple_scenarios.len() + col)
    }

    pub fn base_case(&self) -> Option<&SensitivityEntry> {
        let (row, col) = self.base_case_position;
        self.cell(row, col)
    }
}

/// Label for a grid cell, e.g. "Fixed Cost 15.00%, Exit 7x".
///
/// The percentage is rounded half away from zero; `{:.2}` on a `Decimal`
/// truncates.
pub fn scenario_label(fixed_costs_ratio: Rate, exit_multiple: Multiple) -> LboModelResult<String> {
    let percent = fixed_costs_ratio
        .checked_mul(dec!(100))
        .ok_or_else(|| LboModelError::InvalidInput {
            field: "fixed_costs_ratio".into(),
            reason: format!("{fixed_costs_ratio} cannot be expressed as a percentage"),
        })?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Ok(format!(
        "Fixed Cost {:.2}%, Exit {}x",
        percent,
        exit_multiple.normalize()
    ))
}

/// Adjusted EBITDA and free cash flow for one fixed-cost scenario, or `None`
/// when a value leaves the decimal range.
fn adjusted_cash_flow(base: &FinalYearCostBase, fixed_costs_ratio: Rate) -> Option<(Money, Money)> {
    let adjusted_fixed_costs = base.revenue.checked_mul(fixed_costs_ratio)?;
    let adjusted_ebitda = base
        .revenue
        .checked_sub(adjusted_fixed_costs)?
        .checked_sub(base.variable_costs)?;
    let adjusted_free_cash_flow = adjusted_ebitda
        .checked_sub(base.depreciation)?
        .checked_sub(base.interest_expense)?
        .checked_sub(base.tax)?
        .checked_add(base.depreciation)?
        .checked_sub(base.capex)?
        .checked_sub(base.nwc_change)?;
    Some((adjusted_ebitda, adjusted_free_cash_flow))
}

/// Re-run the final-year valuation across fixed-cost and exit-multiple
/// scenarios, holding the final-year cost base, NPV and exit debt constant.
pub fn build_operating_leverage_grid(
    input: &GridInput,
    warnings: &mut Vec<String>,
) -> LboModelResult<OperatingLeverageGrid> {
    let fixed_var = centered_variable(
        "Fixed costs ratio",
        input.fixed_costs_ratio,
        input.config.fixed_cost_step,
    )?;
    let exit_var = centered_variable(
        "Exit multiple",
        input.exit_multiple,
        input.config.exit_multiple_step,
    )?;

    let base = input.cost_base;
    let grid = evaluate_grid(&fixed_var, &exit_var, |fixed, exit| {
        let label = scenario_label(fixed, exit)?;

        let out_of_range = || LboModelError::DomainError {
            function: "sensitivity grid".into(),
            reason: format!("{label}: values are outside the decimal range"),
        };
        let (adjusted_ebitda, adjusted_free_cash_flow) =
            adjusted_cash_flow(base, fixed).ok_or_else(out_of_range)?;

        let terminal_value = match input.config.exit_treatment {
            ExitScenarioTreatment::LabelOnly => gordon_growth_value(
                adjusted_free_cash_flow,
                input.revenue_growth,
                input.discount_rate,
            )?,
            ExitScenarioTreatment::ExitMultipleTerminal => {
                adjusted_ebitda.checked_mul(exit).ok_or_else(out_of_range)?
            }
        };

        let (enterprise_value, equity_value) = revalue_terminal(
            input.npv,
            terminal_value,
            input.discount_rate,
            input.years,
            input.net_debt,
        )?;
        let returns = calculate_returns(
            equity_value,
            input.sponsor_investment,
            input.years,
            &label,
            warnings,
        )?;

        Ok(SensitivityEntry {
            label,
            fixed_costs_ratio: fixed,
            exit_multiple: exit,
            adjusted_ebitda,
            adjusted_free_cash_flow,
            terminal_value,
            enterprise_value,
            equity_value,
            moic: returns.moic,
            irr: returns.irr,
        })
    })?;

    Ok(OperatingLeverageGrid {
        fixed_cost_scenarios: grid.variable_1_values,
        exit_multiple_scenarios: grid.variable_2_values,
        exit_treatment: input.config.exit_treatment,
        entries: grid.cells.into_iter().flatten().collect(),
        base_case_position: grid.base_case_position,
    })
}
