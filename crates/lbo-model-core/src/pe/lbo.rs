use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::pe::assumptions::{validate_assumptions, EntryPosition, LboAssumptions};
use crate::pe::projection::{project_cash_flows, ProjectionOutput};
use crate::pe::returns::{calculate_returns, ReturnMetrics};
use crate::pe::sensitivity::{build_operating_leverage_grid, GridInput, OperatingLeverageGrid};
use crate::types::*;
use crate::valuation::dcf::{value_cash_flows, DcfInput, DcfOutput};
use crate::LboModelResult;

/// Full-precision results of one model run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboModelRun {
    pub entry: EntryPosition,
    pub projection: ProjectionOutput,
    pub valuation: DcfOutput,
    pub returns: ReturnMetrics,
    pub sensitivity: OperatingLeverageGrid,
    pub warnings: Vec<String>,
}

/// Rounded sensitivity scenario for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityReportEntry {
    pub label: String,
    pub enterprise_value: Money,
    pub equity_value: Money,
    pub moic: Multiple,
    /// Annualized return in percent; `None` when undefined
    pub irr: Option<Decimal>,
}

/// Reported LBO result: amounts and MOIC to 2 dp, IRR as a percentage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboReport {
    pub enterprise_value: Money,
    pub equity_value: Money,
    pub npv: Money,
    pub terminal_value_discounted: Money,
    pub free_cash_flows: Vec<Money>,
    pub interest_expenses: Vec<Money>,
    pub debt_balances: Vec<Money>,
    pub moic: Multiple,
    /// Annualized return in percent; `None` when undefined
    pub irr: Option<Decimal>,
    /// Sensitivity scenarios in grid order, keyed by label
    pub sensitivity: Vec<SensitivityReportEntry>,
}

impl LboReport {
    pub fn sensitivity_entry(&self, label: &str) -> Option<&SensitivityReportEntry> {
        self.sensitivity.iter().find(|e| e.label == label)
    }
}

/// Run the projection, valuation, return and sensitivity stages at full
/// precision.
pub fn run_lbo_model(a: &LboAssumptions) -> LboModelResult<LboModelRun> {
    let mut warnings: Vec<String> = Vec::new();

    // ─── Validation ──────────────────────────────────────────────────
    validate_assumptions(a, &mut warnings)?;

    // ─── Entry ───────────────────────────────────────────────────────
    let entry = EntryPosition::from_assumptions(a)?;

    // ─── Year-by-year projection ─────────────────────────────────────
    let projection = project_cash_flows(a, &entry, &mut warnings)?;

    // ─── Valuation ───────────────────────────────────────────────────
    let valuation = value_cash_flows(&DcfInput {
        free_cash_flows: projection.free_cash_flows.clone(),
        discount_rate: a.discount_rate,
        terminal_growth_rate: a.revenue_growth,
        net_debt: projection.final_debt(),
    })?;

    // ─── Returns ─────────────────────────────────────────────────────
    let returns = calculate_returns(
        valuation.equity_value,
        entry.sponsor_investment,
        a.years,
        "Base case",
        &mut warnings,
    )?;

    // ─── Sensitivity ─────────────────────────────────────────────────
    let sensitivity = build_operating_leverage_grid(
        &GridInput {
            cost_base: &projection.final_year,
            npv: valuation.npv,
            net_debt: projection.final_debt(),
            sponsor_investment: entry.sponsor_investment,
            discount_rate: a.discount_rate,
            revenue_growth: a.revenue_growth,
            years: a.years,
            fixed_costs_ratio: a.fixed_costs_ratio,
            exit_multiple: a.exit_multiple,
            config: &a.sensitivity,
        },
        &mut warnings,
    )?;

    Ok(LboModelRun {
        entry,
        projection,
        valuation,
        returns,
        sensitivity,
        warnings,
    })
}

impl LboModelRun {
    /// Round into the reported result record.
    pub fn to_report(&self) -> LboReport {
        let round_all =
            |values: &[Money]| -> Vec<Money> { values.iter().map(|v| round_money(*v)).collect() };

        LboReport {
            enterprise_value: round_money(self.valuation.enterprise_value),
            equity_value: round_money(self.valuation.equity_value),
            npv: round_money(self.valuation.npv),
            terminal_value_discounted: round_money(self.valuation.terminal_value_discounted),
            free_cash_flows: round_all(&self.projection.free_cash_flows),
            interest_expenses: round_all(&self.projection.interest_expenses),
            debt_balances: round_all(&self.projection.debt_balances),
            moic: round_money(self.returns.moic),
            irr: self.returns.irr.map(to_percentage),
            sensitivity: self
                .sensitivity
                .entries
                .iter()
                .map(|e| SensitivityReportEntry {
                    label: e.label.clone(),
                    enterprise_value: round_money(e.enterprise_value),
                    equity_value: round_money(e.equity_value),
                    moic: round_money(e.moic),
                    irr: e.irr.map(to_percentage),
                })
                .collect(),
        }
    }
}

/// Build the LBO model and wrap the rounded report with metadata.
pub fn build_lbo_model(a: &LboAssumptions) -> LboModelResult<ComputationOutput<LboReport>> {
    let start = Instant::now();
    let run = run_lbo_model(a)?;
    let report = run.to_report();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "LBO projection with Gordon growth DCF and annualized MOIC return",
        a,
        run.warnings,
        elapsed,
        report,
    ))
}
