pub mod aggregate;
pub mod chart;
pub mod cli;
pub mod data;
pub mod dataset;
pub mod ingest;
pub mod io_utils;
pub mod join_keys;
pub mod merge;
pub mod preview;
pub mod profile;
pub mod recommend;
pub mod table;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs},
    dataset::{ColumnType, Dataset},
    ingest::LoadOptions,
    join_keys::{JoinKeySuggestion, KeyMatch},
    merge::{JoinSpec, JoinType, MergeOptions},
    profile::{ProfileOptions, TypeOverrides},
    recommend::FieldAssignment,
    table::Align,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("vizjoin", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => handle_profile(&args),
        Commands::Recommend(args) => handle_recommend(&args),
        Commands::SuggestKeys(args) => handle_suggest_keys(&args),
        Commands::Merge(args) => handle_merge(&args),
        Commands::Aggregate(args) => handle_aggregate(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

pub(crate) fn load_options(args: &InputArgs, meta: Option<&Path>) -> Result<LoadOptions> {
    let mut overrides = TypeOverrides::new();
    for (column, ty) in &args.type_overrides {
        let column_type: ColumnType = ty
            .parse()
            .with_context(|| format!("Parsing type override for column '{column}'"))?;
        overrides.set(column.clone(), column_type);
    }
    Ok(LoadOptions {
        delimiter: args.delimiter,
        encoding: args.input_encoding.clone(),
        columns_path: meta.map(Path::to_path_buf),
        profile: ProfileOptions {
            sample_rows: args.sample_rows,
            overrides,
        },
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Serializing JSON output")?;
    println!("{rendered}");
    Ok(())
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    info!("Profiling {:?}", args.input);
    let options = load_options(&args.input_args, None)?;
    let dataset = ingest::load_dataset(&args.input, &options)
        .with_context(|| format!("Loading {:?}", args.input))?;
    let rows: Vec<Vec<String>> = dataset
        .columns
        .iter()
        .map(|c| vec![c.name.clone(), c.column_type.to_string()])
        .collect();
    let headers = vec!["column".to_string(), "type".to_string()];
    print!("{}", table::render_table(&headers, &rows, &[]));
    if let Some(meta) = &args.meta {
        dataset::save_columns(meta, &dataset.columns)
            .with_context(|| format!("Writing columns to {meta:?}"))?;
        info!(
            "Column types for {} column(s) written to {:?}",
            dataset.columns.len(),
            meta
        );
    }
    Ok(())
}

fn handle_recommend(args: &cli::RecommendArgs) -> Result<()> {
    let options = load_options(&args.input_args, args.meta.as_deref())?;
    let dataset = ingest::load_dataset(&args.input, &options)
        .with_context(|| format!("Loading {:?}", args.input))?;
    let assignment = FieldAssignment {
        dimension: args.dimension.clone(),
        measures: args.measures.clone(),
    };
    ensure_assigned_columns(&dataset, &assignment)?;

    let mut recommendations = recommend::recommend(&dataset.columns, &assignment);
    if args.top > 0 {
        recommendations.truncate(args.top);
    }
    debug!("{} recommendation(s) produced", recommendations.len());

    if args.json {
        return print_json(&recommendations);
    }
    let headers = vec![
        "chart".to_string(),
        "score".to_string(),
        "family".to_string(),
        "reason".to_string(),
    ];
    let rows: Vec<Vec<String>> = recommendations
        .iter()
        .map(|r| {
            vec![
                r.chart_type.to_string(),
                r.score.to_string(),
                r.chart_type.family().as_str().to_string(),
                r.reason.clone(),
            ]
        })
        .collect();
    print!(
        "{}",
        table::render_table(&headers, &rows, &[Align::Left, Align::Right])
    );
    Ok(())
}

fn ensure_assigned_columns(dataset: &Dataset, assignment: &FieldAssignment) -> Result<()> {
    let assigned = assignment
        .dimension()
        .into_iter()
        .chain(assignment.measures.iter().map(String::as_str));
    for name in assigned {
        if !dataset.has_column(name) {
            return Err(anyhow!("Column '{name}' not found in '{}'", dataset.name));
        }
    }
    Ok(())
}

fn load_pair(
    left: &Path,
    right: &Path,
    left_options: &LoadOptions,
    right_options: &LoadOptions,
) -> Result<(Dataset, Dataset)> {
    if io_utils::is_dash(left) && io_utils::is_dash(right) {
        return Err(anyhow!("Only one of the inputs can be read from stdin"));
    }
    let left_dataset = ingest::load_dataset(left, left_options)
        .with_context(|| format!("Loading left input {left:?}"))?;
    let right_dataset = ingest::load_dataset(right, right_options)
        .with_context(|| format!("Loading right input {right:?}"))?;
    Ok((left_dataset, right_dataset))
}

fn handle_suggest_keys(args: &cli::SuggestKeysArgs) -> Result<()> {
    let left_options = load_options(&args.input_args, args.left_meta.as_deref())?;
    let right_options = load_options(&args.input_args, args.right_meta.as_deref())?;
    let (left, right) = load_pair(&args.left, &args.right, &left_options, &right_options)?;
    let suggestions = join_keys::suggest_join_keys(&left.columns, &right.columns);
    info!("{} join key suggestion(s)", suggestions.len());

    if args.json {
        return print_json(&suggestions);
    }
    let headers = vec![
        "left".to_string(),
        "right".to_string(),
        "confidence".to_string(),
    ];
    let rows: Vec<Vec<String>> = suggestions
        .iter()
        .map(|s| {
            vec![
                s.left_key.clone(),
                s.right_key.clone(),
                s.confidence.to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        table::render_table(&headers, &rows, &[Align::Left, Align::Left, Align::Right])
    );
    Ok(())
}

fn resolve_join_spec(args: &cli::MergeArgs, left: &Dataset, right: &Dataset) -> Result<JoinSpec> {
    if args.kind == JoinType::Append {
        return Ok(JoinSpec::append());
    }
    match (&args.left_key, &args.right_key) {
        (Some(left_key), Some(right_key)) => Ok(JoinSpec::new(left_key, right_key, args.kind)),
        (None, None) => {
            let suggestions = join_keys::suggest_join_keys(&left.columns, &right.columns);
            match suggestions.first() {
                Some(JoinKeySuggestion {
                    left_key,
                    right_key,
                    kind: KeyMatch::Exact,
                    ..
                }) => {
                    info!("Joining on suggested keys {left_key} = {right_key}");
                    Ok(JoinSpec::new(left_key, right_key, args.kind))
                }
                _ => Err(anyhow!(
                    "No exact join key match found; provide --left-key and --right-key"
                )),
            }
        }
        _ => Err(anyhow!(
            "Provide both --left-key and --right-key, or neither to use a suggested key"
        )),
    }
}

fn handle_merge(args: &cli::MergeArgs) -> Result<()> {
    let base = InputArgs {
        delimiter: args.delimiter,
        input_encoding: args.input_encoding.clone(),
        sample_rows: profile::DEFAULT_SAMPLE_ROWS,
        type_overrides: Vec::new(),
    };
    let left_options = load_options(&base, args.left_meta.as_deref())?;
    let right_options = load_options(&base, args.right_meta.as_deref())?;
    let (left, right) = load_pair(&args.left, &args.right, &left_options, &right_options)?;

    let spec = resolve_join_spec(args, &left, &right)?;
    let options = MergeOptions {
        right_suffix: args.suffix.clone(),
    };
    let name = format!("{}_{}_{}", left.name, spec.join_type, right.name);
    let merged = merge::merge_with_options(&left, &right, &spec, &options)?
        .into_dataset(name)?;

    if let Some(limit) = args.preview {
        print!("{}", table::render_dataset(&merged, limit));
        return Ok(());
    }
    ingest::write_dataset(&merged, args.output.as_deref(), args.output_delimiter)
        .context("Writing merged dataset")?;
    if let Some(output) = &args.output {
        info!(
            "Merged dataset with {} row(s) written to {:?}",
            merged.row_count(),
            output
        );
    }
    Ok(())
}

fn handle_aggregate(args: &cli::AggregateArgs) -> Result<()> {
    let options = load_options(&args.input_args, args.meta.as_deref())?;
    let dataset = ingest::load_dataset(&args.input, &options)
        .with_context(|| format!("Loading {:?}", args.input))?;
    let assignment = FieldAssignment {
        dimension: args.dimension.clone(),
        measures: args.measures.clone(),
    };
    ensure_assigned_columns(&dataset, &assignment)?;
    let rows = aggregate::aggregate(&dataset, &assignment, args.method);

    if args.json {
        return print_json(&rows);
    }
    let mut headers = vec![assignment.dimension().unwrap_or("bucket").to_string()];
    headers.extend(assignment.measures.iter().cloned());
    let mut aligns = vec![Align::Left];
    aligns.extend(assignment.measures.iter().map(|_| Align::Right));
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            std::iter::once(row.name.clone())
                .chain(row.values.iter().map(|v| {
                    v.map(|n| data::Value::Number(n).as_display())
                        .unwrap_or_default()
                }))
                .collect()
        })
        .collect();
    print!("{}", table::render_table(&headers, &rendered, &aligns));
    Ok(())
}
