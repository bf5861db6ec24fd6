use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::NonEmptyStringValueParser};

use crate::{aggregate::Aggregation, merge::JoinType, profile::DEFAULT_SAMPLE_ROWS};

#[derive(Debug, Parser)]
#[command(author, version, about = "Recommend charts and merge CSV datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer column types for a CSV file and optionally save them as YAML
    Profile(ProfileArgs),
    /// Rank chart types that suit the shape of a CSV file
    Recommend(RecommendArgs),
    /// Suggest join key pairs between two CSV files
    SuggestKeys(SuggestKeysArgs),
    /// Join or append two CSV files into a new dataset
    Merge(MergeArgs),
    /// Group rows by a dimension and fold measures per group
    Aggregate(AggregateArgs),
    /// Preview the first few typed rows of a CSV file
    Preview(PreviewArgs),
}

#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file(s) (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of rows to sample when inferring types (0 means full scan)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub sample_rows: usize,
    /// Override an inferred column type, e.g. `zip=string`
    #[arg(long = "type", value_parser = parse_type_override, action = clap::ArgAction::Append)]
    pub type_overrides: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Input CSV file to inspect (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination YAML column file
    #[arg(short, long)]
    pub meta: Option<PathBuf>,
    #[command(flatten)]
    pub input_args: InputArgs,
}

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Input CSV file to analyze
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML column file to use instead of inferring types
    #[arg(short, long)]
    pub meta: Option<PathBuf>,
    /// Column currently assigned as the chart dimension
    #[arg(long)]
    pub dimension: Option<String>,
    /// Columns currently assigned as measures (repeatable, order matters)
    #[arg(long = "measure", action = clap::ArgAction::Append)]
    pub measures: Vec<String>,
    /// Show only the top N recommendations (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub input_args: InputArgs,
}

#[derive(Debug, Args)]
pub struct SuggestKeysArgs {
    /// Left CSV input
    #[arg(long = "left")]
    pub left: PathBuf,
    /// Right CSV input
    #[arg(long = "right")]
    pub right: PathBuf,
    /// YAML column file for the left input
    #[arg(long = "left-meta")]
    pub left_meta: Option<PathBuf>,
    /// YAML column file for the right input
    #[arg(long = "right-meta")]
    pub right_meta: Option<PathBuf>,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub input_args: InputArgs,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Left CSV input
    #[arg(long = "left")]
    pub left: PathBuf,
    /// Right CSV input
    #[arg(long = "right")]
    pub right: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Key column from the left file (inferred from column names when omitted)
    #[arg(long = "left-key")]
    pub left_key: Option<String>,
    /// Key column from the right file (inferred from column names when omitted)
    #[arg(long = "right-key")]
    pub right_key: Option<String>,
    /// Join type (inner, left, right, full, append)
    #[arg(long = "type", value_enum, default_value = "inner")]
    pub kind: JoinType,
    /// Suffix for right-side columns whose names collide
    #[arg(
        long,
        default_value = crate::merge::DEFAULT_RIGHT_SUFFIX,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub suffix: String,
    /// YAML column file for the left input
    #[arg(long = "left-meta")]
    pub left_meta: Option<PathBuf>,
    /// YAML column file for the right input
    #[arg(long = "right-meta")]
    pub right_meta: Option<PathBuf>,
    /// Print the first N merged rows as a table instead of writing CSV
    #[arg(long)]
    pub preview: Option<usize>,
    /// CSV delimiter character for reading inputs
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to the output extension or ',')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    /// Input CSV file to aggregate
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML column file to use instead of inferring types
    #[arg(short, long)]
    pub meta: Option<PathBuf>,
    /// Column to group rows by (omit for a single total row)
    #[arg(long)]
    pub dimension: Option<String>,
    /// Numeric columns to fold per group (repeatable)
    #[arg(long = "measure", required = true, action = clap::ArgAction::Append)]
    pub measures: Vec<String>,
    /// Aggregation applied to every measure
    #[arg(long, value_enum, default_value = "sum")]
    pub method: Aggregation,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub input_args: InputArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    #[command(flatten)]
    pub input_args: InputArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_type_override(value: &str) -> Result<(String, String), String> {
    let (column, ty) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("Expected NAME=TYPE, got '{value}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err("Column name cannot be empty".to_string());
    }
    Ok((column.to_string(), ty.trim().to_string()))
}
