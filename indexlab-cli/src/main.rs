//! IndexLab CLI: build equal-weighted indices from CSV workbooks.
//!
//! Commands:
//! - `build`: one index from command-line flags
//! - `run`: every `[[index]]` in a TOML config file
//! - `inspect`: list a workbook's sheets and what normalization would keep

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use indexlab_core::data::{normalize_with, DateOrder};
use indexlab_runner::reporting::preview::{
    format_series, format_series_preview, format_summary, format_table_preview,
};
use indexlab_runner::{
    export_run, list_sheets, load_sheet, run_index, IndexConfig, IndexRun, RunConfig, ShapeKind,
    SheetSelector,
};

#[derive(Parser)]
#[command(
    name = "indexlab",
    about = "IndexLab CLI: equal-weighted stock index builder"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    /// Repeating (date, price) column pairs.
    Paired,
    /// One date column, every other column an entity.
    SingleIndex,
}

impl From<ShapeArg> for ShapeKind {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::Paired => ShapeKind::Paired,
            ShapeArg::SingleIndex => ShapeKind::SingleIndex,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build one index from a workbook.
    Build {
        /// CSV file, or a directory of CSV sheets.
        #[arg(long)]
        input: PathBuf,

        /// Index name. Defaults to "Index".
        #[arg(long)]
        name: Option<String>,

        /// Index value on the base date. Defaults to 100.
        #[arg(long)]
        base_value: Option<f64>,

        #[arg(long, value_enum)]
        shape: Option<ShapeArg>,

        /// Date column position for the single-index layout (0-based).
        #[arg(long)]
        date_column: Option<usize>,

        /// Read ambiguous dates like 03/04/2024 as day/month.
        #[arg(long)]
        day_first: bool,

        /// Sheet index or name. Defaults to the first sheet.
        #[arg(long)]
        sheet: Option<String>,

        /// Write CSV/Parquet/JSON artifacts here.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Rows shown in head/tail previews.
        #[arg(long)]
        preview_rows: Option<usize>,
    },
    /// Build every index listed in a TOML config file.
    Run {
        #[arg(long)]
        config: PathBuf,

        /// Overrides the config's output_dir.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// List a workbook's sheets and report what normalization keeps.
    Inspect {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        sheet: Option<String>,

        #[arg(long, value_enum, default_value = "paired")]
        shape: ShapeArg,

        #[arg(long, default_value_t = 0)]
        date_column: usize,

        /// Read ambiguous dates like 03/04/2024 as day/month.
        #[arg(long)]
        day_first: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            name,
            base_value,
            shape,
            date_column,
            day_first,
            sheet,
            output_dir,
            preview_rows,
        } => {
            let mut config = IndexConfig::new(name.unwrap_or_else(|| "Index".to_string()), input);
            if let Some(v) = base_value {
                config.base_value = v;
            }
            if let Some(s) = shape {
                config.shape = s.into();
            }
            if let Some(c) = date_column {
                config.date_column = c;
            }
            if day_first {
                config.date_order = DateOrder::DayFirst;
            }
            if let Some(s) = sheet {
                config.sheet = parse_sheet(&s);
            }
            if let Some(n) = preview_rows {
                config.preview_rows = n;
            }
            run_build(&config, output_dir.as_deref())
        }
        Commands::Run { config, output_dir } => run_config_cmd(&config, output_dir),
        Commands::Inspect {
            input,
            sheet,
            shape,
            date_column,
            day_first,
        } => {
            let order = if day_first {
                DateOrder::DayFirst
            } else {
                DateOrder::MonthFirst
            };
            run_inspect(&input, sheet.as_deref(), shape, date_column, order)
        }
    }
}

/// A numeric selector picks by position, anything else by name.
fn parse_sheet(value: &str) -> SheetSelector {
    value
        .trim()
        .parse::<usize>()
        .map(SheetSelector::Index)
        .unwrap_or_else(|_| SheetSelector::Name(value.to_string()))
}

fn run_build(config: &IndexConfig, output_dir: Option<&Path>) -> Result<()> {
    let run = run_index(config)?;
    report(&run, output_dir)
}

fn run_config_cmd(config_path: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    let run_config = RunConfig::from_file(config_path)?;
    let output_dir = output_dir.or(run_config.output_dir.clone());

    let mut failed = Vec::new();
    for index in &run_config.indices {
        let outcome = run_index(index)
            .map_err(anyhow::Error::from)
            .and_then(|run| report(&run, output_dir.as_deref()));
        if let Err(err) = outcome {
            eprintln!("Error for {}: {err:#}", index.name);
            failed.push(index.name.clone());
        }
    }

    if !failed.is_empty() {
        bail!("{} index(es) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

/// Print previews and summary, then export. Runs without values print
/// their diagnostic instead.
fn report(run: &IndexRun, output_dir: Option<&Path>) -> Result<()> {
    let n = run.config.preview_rows;
    println!("=== {} ===", run.name());
    println!("Source: {}", run.source.display());
    for note in run.normalized.report.notes() {
        println!("Note: {note}");
    }

    if let Some(diagnostic) = run.diagnostic() {
        println!("{diagnostic}");
        return Ok(());
    }

    println!();
    println!(
        "Prices ({} dates x {} entities)",
        run.normalized.table.n_dates(),
        run.normalized.entities.len()
    );
    print!("{}", format_table_preview(&run.normalized.table, n));
    println!();
    print!("{}", format_series_preview(run.name(), &run.result.index, n));
    println!();
    println!("Month-end");
    print!("{}", format_series(run.name(), &run.monthly()));
    println!();
    if let Some(summary) = run.summary() {
        print!("{}", format_summary(run.name(), &summary));
    }
    println!("Dataset hash: {}", run.dataset_hash);

    if let Some(dir) = output_dir {
        let paths = export_run(dir, run)?;
        println!("Artifacts saved to: {}", paths.dir.display());
    }
    println!();
    Ok(())
}

fn run_inspect(
    input: &Path,
    sheet: Option<&str>,
    shape: ShapeArg,
    date_column: usize,
    order: DateOrder,
) -> Result<()> {
    let sheets = list_sheets(input)?;
    if sheets.is_empty() {
        bail!("{} contains no CSV sheets", input.display());
    }
    println!("Sheets in {}:", input.display());
    for (i, s) in sheets.iter().enumerate() {
        println!("  [{i}] {}", s.name);
    }

    let selector = sheet.map(parse_sheet).unwrap_or_default();
    let (sheet, raw) = load_sheet(input, &selector)?;
    println!();
    println!(
        "Sheet '{}': {} columns x {} rows",
        sheet.name,
        raw.n_columns(),
        raw.n_rows()
    );

    let mut config = IndexConfig::new("inspect", input);
    config.shape = shape.into();
    config.date_column = date_column;
    let normalized = normalize_with(&raw, &config.table_shape(), order)?;

    if let Some(format) = &normalized.report.date_format {
        println!("Date format: {format}");
    }
    for entity in &normalized.report.entities {
        println!(
            "  {:<16} {:>6} rows  {:>4} dropped  {:>4} duplicate dates  {}",
            entity.entity.as_str(),
            entity.rows,
            entity.dropped,
            entity.duplicate_dates,
            entity.date_format.as_deref().unwrap_or("")
        );
    }
    if let (Some(first), Some(last)) = (
        normalized.table.dates().first(),
        normalized.table.dates().last(),
    ) {
        println!("Dates: {first} .. {last} ({} rows)", normalized.table.n_dates());
    }
    for note in normalized.report.notes() {
        println!("Note: {note}");
    }
    if normalized.is_empty() {
        println!("No usable data in sheet '{}'", sheet.name);
    }
    Ok(())
}
