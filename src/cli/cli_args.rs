use crate::settings::BalancerConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "redox-balancer",
    about = "Balancing of chemical and redox equations",
    version
)]
pub struct Cli {
    /// Equations to balance, e.g. "Fe + O2 -> Fe2O3"; the menu opens if none is given
    #[arg(value_name = "EQUATION")]
    pub equations: Vec<String>,

    /// Settings file (balancer_config.json if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the intermediate balancing steps
    #[arg(short, long)]
    pub trace: bool,

    /// Print the oxidation states of every species
    #[arg(long)]
    pub table: bool,

    /// Print only the balanced equation
    #[arg(long)]
    pub no_explanation: bool,

    /// off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Open the menu even when equations are given
    #[arg(short, long)]
    pub interactive: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// What to print for every balanced equation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub show_explanation: bool,
    pub show_table: bool,
    pub trace: bool,
}

impl RunOptions {
    /// Saved settings, switched on or off by the command line flags.
    pub fn resolve(cli: &Cli, config: &BalancerConfig) -> Self {
        Self {
            show_explanation: config.show_explanation && !cli.no_explanation,
            show_table: config.show_oxidation_table || cli.table,
            trace: config.trace || cli.trace,
        }
    }

    pub fn from_config(config: &BalancerConfig) -> Self {
        Self {
            show_explanation: config.show_explanation,
            show_table: config.show_oxidation_table,
            trace: config.trace,
        }
    }
}
