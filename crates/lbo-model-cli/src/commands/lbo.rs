use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use lbo_model_core::pe::assumptions::{LboAssumptions, RepaymentSchedule};
use lbo_model_core::pe::lbo::{self, run_lbo_model};
use lbo_model_core::pe::sensitivity::ExitScenarioTreatment;

use crate::input;

/// How the exit-multiple axis of the sensitivity grid is applied
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExitTreatmentArg {
    /// Exit multiple labels the scenario only
    LabelOnly,
    /// Terminal value = adjusted EBITDA x exit multiple
    ExitMultipleTerminal,
}

impl From<ExitTreatmentArg> for ExitScenarioTreatment {
    fn from(arg: ExitTreatmentArg) -> Self {
        match arg {
            ExitTreatmentArg::LabelOnly => ExitScenarioTreatment::LabelOnly,
            ExitTreatmentArg::ExitMultipleTerminal => ExitScenarioTreatment::ExitMultipleTerminal,
        }
    }
}

/// Arguments shared by every LBO subcommand
#[derive(Args)]
pub struct ModelArgs {
    /// Path to JSON or YAML assumptions file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Start from the reference example assumptions; flags override them
    #[arg(long)]
    pub example: bool,

    /// Annual revenue growth (decimal)
    #[arg(long, allow_hyphen_values = true)]
    pub revenue_growth: Option<Decimal>,

    /// EBITDA margin before fixed costs (decimal)
    #[arg(long)]
    pub ebitda_margin: Option<Decimal>,

    /// Depreciation as a fraction of revenue
    #[arg(long)]
    pub depreciation_rate: Option<Decimal>,

    /// Capex as a fraction of base revenue
    #[arg(long)]
    pub capex_ratio: Option<Decimal>,

    /// NWC investment as a fraction of base revenue
    #[arg(long)]
    pub nwc_ratio: Option<Decimal>,

    /// Corporate tax rate
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// DCF discount rate
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Exit EV/EBITDA multiple
    #[arg(long)]
    pub exit_multiple: Option<Decimal>,

    /// Initial debt as a fraction of base revenue
    #[arg(long)]
    pub debt_ratio: Option<Decimal>,

    /// Interest rate on opening debt
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Scheduled repayments as year:amount pairs (e.g. "1:10,3:15,5:20")
    #[arg(long, value_delimiter = ',', value_parser = parse_repayment)]
    pub repayment: Option<Vec<(i64, Decimal)>>,

    /// Holding period in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Entry multiple on base revenue
    #[arg(long)]
    pub entry_multiple: Option<Decimal>,

    /// Sponsor share of entry equity
    #[arg(long)]
    pub sponsor_equity: Option<Decimal>,

    /// Fixed costs as a fraction of revenue
    #[arg(long)]
    pub fixed_costs_ratio: Option<Decimal>,

    /// Year-0 revenue
    #[arg(long)]
    pub base_revenue: Option<Decimal>,

    /// Exit-multiple treatment in the sensitivity grid
    #[arg(long, value_enum)]
    pub exit_treatment: Option<ExitTreatmentArg>,
}

/// Parse a single "year:amount" repayment pair.
fn parse_repayment(s: &str) -> Result<(i64, Decimal), String> {
    let (year, amount) = s
        .split_once(':')
        .ok_or_else(|| format!("expected year:amount, got '{s}'"))?;
    let year: i64 = year
        .trim()
        .parse()
        .map_err(|_| format!("invalid repayment year '{year}'"))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|_| format!("invalid repayment amount '{amount}'"))?;
    Ok((year, amount))
}

fn required(value: Option<Decimal>, flag: &str) -> Result<Decimal, Box<dyn std::error::Error>> {
    value.ok_or_else(|| format!("--{flag} is required (or provide --input / --example)").into())
}

/// Build assumptions from flags alone, starting from the example when asked.
fn assumptions_from_flags(args: &ModelArgs) -> Result<LboAssumptions, Box<dyn std::error::Error>> {
    let mut a = if args.example {
        LboAssumptions::example()
    } else {
        let mut a = LboAssumptions::example();
        a.revenue_growth = required(args.revenue_growth, "revenue-growth")?;
        a.ebitda_margin = required(args.ebitda_margin, "ebitda-margin")?;
        a.depreciation_rate = required(args.depreciation_rate, "depreciation-rate")?;
        a.capex_ratio = required(args.capex_ratio, "capex-ratio")?;
        a.nwc_ratio = required(args.nwc_ratio, "nwc-ratio")?;
        a.tax_rate = required(args.tax_rate, "tax-rate")?;
        a.discount_rate = required(args.discount_rate, "discount-rate")?;
        a.exit_multiple = required(args.exit_multiple, "exit-multiple")?;
        a.debt_ratio = required(args.debt_ratio, "debt-ratio")?;
        a.interest_rate = required(args.interest_rate, "interest-rate")?;
        a.repayment_schedule = RepaymentSchedule::new();
        a
    };
    apply_overrides(&mut a, args);
    Ok(a)
}

fn apply_overrides(a: &mut LboAssumptions, args: &ModelArgs) {
    let rates = [
        (args.revenue_growth, &mut a.revenue_growth),
        (args.ebitda_margin, &mut a.ebitda_margin),
        (args.depreciation_rate, &mut a.depreciation_rate),
        (args.capex_ratio, &mut a.capex_ratio),
        (args.nwc_ratio, &mut a.nwc_ratio),
        (args.tax_rate, &mut a.tax_rate),
        (args.discount_rate, &mut a.discount_rate),
        (args.exit_multiple, &mut a.exit_multiple),
        (args.debt_ratio, &mut a.debt_ratio),
        (args.interest_rate, &mut a.interest_rate),
        (args.entry_multiple, &mut a.entry_multiple),
        (args.sponsor_equity, &mut a.sponsor_equity),
        (args.fixed_costs_ratio, &mut a.fixed_costs_ratio),
        (args.base_revenue, &mut a.base_revenue),
    ];
    for (flag, field) in rates {
        if let Some(v) = flag {
            *field = v;
        }
    }
    if let Some(years) = args.years {
        a.years = years;
    }
    if let Some(ref pairs) = args.repayment {
        a.repayment_schedule = pairs.iter().copied().collect();
    }
    if let Some(treatment) = args.exit_treatment {
        a.sensitivity.exit_treatment = treatment.into();
    }
}

/// Resolve assumptions: input file, then --example / flags, then piped stdin.
fn resolve_assumptions(args: &ModelArgs) -> Result<LboAssumptions, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        let mut a: LboAssumptions = input::file::read_config(path)?;
        apply_overrides(&mut a, args);
        return Ok(a);
    }
    if !args.example {
        if let Some(mut a) = input::stdin::read_stdin::<LboAssumptions>()? {
            apply_overrides(&mut a, args);
            return Ok(a);
        }
    }
    assumptions_from_flags(args)
}

pub fn run_model(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = resolve_assumptions(&args)?;
    let result = lbo::build_lbo_model(&assumptions)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_projection(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = resolve_assumptions(&args)?;
    let run = run_lbo_model(&assumptions)?;
    Ok(serde_json::to_value(run.projection.projections)?)
}

pub fn run_sensitivity(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = resolve_assumptions(&args)?;
    let run = run_lbo_model(&assumptions)?;
    Ok(serde_json::to_value(run.to_report().sensitivity)?)
}
