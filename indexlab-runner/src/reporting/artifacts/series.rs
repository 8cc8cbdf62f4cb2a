//! Index series export (CSV/Parquet). Only dates with a value are written.

use anyhow::{Context, Result};
use indexlab_core::IndexSeries;
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn write_series_csv(path: &Path, value_column: &str, series: &IndexSeries) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create series CSV {}", path.display()))?;
    writeln!(file, "date,{value_column}")?;
    for (date, value) in series.present() {
        writeln!(file, "{date},{value:.6}")?;
    }
    Ok(())
}

pub fn write_series_parquet(path: &Path, value_column: &str, series: &IndexSeries) -> Result<()> {
    let (dates, values): (Vec<String>, Vec<f64>) = series
        .present()
        .map(|(date, value)| (date.to_string(), value))
        .unzip();

    let mut df = DataFrame::new(vec![
        Column::Series(Series::new("date".into(), dates).into()),
        Column::Series(Series::new(value_column.into(), values).into()),
    ])
    .context("Failed to build index dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create index parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write index parquet")?;
    Ok(())
}
