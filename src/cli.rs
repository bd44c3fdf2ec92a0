use std::path::PathBuf;

use clap::Parser;

use crate::usage::UsageFormat;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Usage export to price the plans against.
    #[clap(value_name = "USAGE_FILE")]
    pub usage_file: PathBuf,

    /// Price table with one row per plan.
    #[clap(long, default_value = "prices.csv")]
    pub prices: PathBuf,

    /// Layout of the usage export.
    #[clap(long, value_enum, default_value_t)]
    pub format: UsageFormat,

    /// Plan you are currently on: adds a column with the difference against it.
    #[clap(long = "current-plan")]
    pub current_plan: Option<String>,

    /// Log debug output to stderr.
    #[clap(short, long)]
    pub verbose: bool,
}
