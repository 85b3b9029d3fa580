use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use filemerge::selector::SelectorParams;

#[derive(Parser, Debug)]
#[command(name = "filemerge")]
#[command(about = "Merge small files in dated storage directories", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: $FILEMERGE_CONFIG or config/filemerge.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render and run one merge job per selected directory
    Merge(MergeArgs),
    /// Print the directories a selector resolves to
    Resolve(ResolveArgs),
}

/// Exactly one selector group must be given
#[derive(Args, Debug, Clone)]
pub struct SelectorArgs {
    /// Calendar year
    #[arg(short = 'y', long)]
    pub year: Option<i32>,

    /// Month of the year (requires --year)
    #[arg(short = 'm', long)]
    pub month: Option<u32>,

    /// Day of the month (requires --month)
    #[arg(short = 'd', long)]
    pub day: Option<u32>,

    /// One directory, named literally
    #[arg(short = 'D', long)]
    pub directory: Option<String>,

    /// File listing one directory name per line
    #[arg(short = 'f', long = "file")]
    pub manifest: Option<PathBuf>,

    /// The N days before the reference date
    #[arg(short = 'w', long, allow_negative_numbers = true)]
    pub window: Option<i64>,

    /// The single day N days before the reference date
    #[arg(short = 'l', long, allow_negative_numbers = true)]
    pub lookback: Option<i64>,

    /// Anchor for --window and --lookback (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub reference_date: Option<NaiveDate>,

    /// Reject directory and manifest names the naming convention cannot parse
    #[arg(long)]
    pub validate_names: bool,
}

impl SelectorArgs {
    pub fn params(&self) -> SelectorParams {
        SelectorParams {
            year: self.year,
            month: self.month,
            day: self.day,
            directory: self.directory.clone(),
            manifest: self.manifest.clone(),
            window: self.window,
            lookback: self.lookback,
        }
    }
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Topic the directories belong to
    #[arg(short = 't', long)]
    pub topic: String,

    /// Prefix the directory names are resolved under
    #[arg(short = 'i', long)]
    pub input_prefix: String,

    /// Prefix merged output is written under
    #[arg(short = 'o', long)]
    pub output_prefix: String,

    /// Execution queue handed to the engine
    #[arg(short = 'q', long)]
    pub queue: String,

    /// Reducer count (default from configuration)
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub num_reducers: Option<i64>,

    /// Output compression codec: an alias such as gzip, or a codec class
    #[arg(short = 'c', long)]
    pub codec: Option<String>,

    /// Write the job documents without running them
    #[arg(short = 'r', long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub selector: SelectorArgs,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub selector: SelectorArgs,
}
