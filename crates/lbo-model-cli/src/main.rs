mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::lbo::ModelArgs;

/// Leveraged buyout projection, valuation and sensitivity analysis
#[derive(Parser)]
#[command(
    name = "lbo",
    version,
    about = "Leveraged buyout projection, valuation and sensitivity analysis",
    long_about = "Projects annual free cash flow and debt over a holding period, values \
                  the business with a Gordon growth DCF, derives MOIC and annualized \
                  return, and builds a fixed-cost x exit-multiple sensitivity grid. \
                  All arithmetic uses decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full LBO model (valuation, returns and sensitivity grid)
    Model(ModelArgs),
    /// Show the year-by-year operating and debt projection
    Projection(ModelArgs),
    /// Show the fixed-cost x exit-multiple sensitivity grid
    Sensitivity(ModelArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Model(args) => commands::lbo::run_model(args),
        Commands::Projection(args) => commands::lbo::run_projection(args),
        Commands::Sensitivity(args) => commands::lbo::run_sensitivity(args),
        Commands::Version => {
            println!("lbo {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
