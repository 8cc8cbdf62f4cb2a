//! Table normalization: raw sheet → canonical price table.
//!
//! Two layouts are understood:
//! - `Paired`: repeating (date, price) column pairs, one pair per entity,
//!   each entity on its own calendar.
//! - `SingleIndex`: one shared date column, every other column an entity.
//!
//! Dates are parsed a column at a time: each date column gets one format,
//! detected from its first readable cell, and cells off that format are
//! treated like any other unparseable date.
//!
//! Either way the result is a [`PriceTable`] whose rows are the sorted union
//! of dates and whose cells are `None` wherever an entity has no price.

use super::parse::{parse_date_column, parse_price, DateOrder};
use super::raw::{RawColumn, RawDataset};
use super::DataError;
use crate::domain::EntityId;
use crate::series::{Panel, PriceTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Column layout of a raw sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TableShape {
    /// (Date, Price) pairs; the entity is named by the price column label.
    Paired,
    /// One date column at `date_column` (0-based); other columns are entities.
    SingleIndex { date_column: usize },
}

impl Default for TableShape {
    fn default() -> Self {
        Self::Paired
    }
}

/// Per-entity parsing statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity: EntityId,
    /// Observations kept.
    pub rows: usize,
    /// Non-blank rows or cells discarded because the date or price did not parse.
    pub dropped: usize,
    /// Repeated dates; the first occurrence is kept.
    pub duplicate_dates: usize,
    /// Format detected for this entity's date column (paired layout only).
    #[serde(default)]
    pub date_format: Option<String>,
}

/// What normalization discarded along the way.
///
/// None of this is an error: unusable rows are routine and excluded
/// per row. The report lets callers tell the user what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub entities: Vec<EntityReport>,
    /// Labels of entities with no usable observation.
    pub dropped_entities: Vec<String>,
    /// Trailing unpaired column in the paired layout.
    pub ignored_column: Option<String>,
    /// Rows skipped in the single-index layout because the date did not parse.
    pub skipped_rows: usize,
    /// Rows skipped in the single-index layout because their date repeated.
    pub duplicate_rows: usize,
    /// Format detected for the shared date column (single-index layout only).
    #[serde(default)]
    pub date_format: Option<String>,
}

impl NormalizeReport {
    /// Human-readable notes for everything that was skipped.
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if let Some(col) = &self.ignored_column {
            notes.push(format!(
                "odd number of columns: trailing column '{col}' ignored"
            ));
        }
        for label in &self.dropped_entities {
            notes.push(format!("'{label}' has no valid rows and was dropped"));
        }
        for e in &self.entities {
            if e.dropped > 0 {
                notes.push(format!(
                    "'{}': {} row(s) with unparseable date or price excluded",
                    e.entity, e.dropped
                ));
            }
            if e.duplicate_dates > 0 {
                notes.push(format!(
                    "'{}': {} duplicate date(s), first occurrence kept",
                    e.entity, e.duplicate_dates
                ));
            }
        }
        if self.skipped_rows > 0 {
            notes.push(format!(
                "{} row(s) with unparseable date excluded",
                self.skipped_rows
            ));
        }
        if self.duplicate_rows > 0 {
            notes.push(format!(
                "{} row(s) with a repeated date excluded, first occurrence kept",
                self.duplicate_rows
            ));
        }
        notes
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: PriceTable,
    /// Surviving entities, in source column order.
    pub entities: Vec<EntityId>,
    pub report: NormalizeReport,
}

impl Normalized {
    fn empty(report: NormalizeReport) -> Self {
        Self {
            table: Panel::empty(),
            entities: Vec::new(),
            report,
        }
    }

    /// True when no entity survived parsing.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Convert a raw sheet into the canonical price table, reading ambiguous
/// numeric dates month-first.
pub fn normalize(raw: &RawDataset, shape: &TableShape) -> Result<Normalized, DataError> {
    normalize_with(raw, shape, DateOrder::default())
}

/// Convert a raw sheet into the canonical price table.
///
/// Structural problems (duplicate entity labels, a date column outside the
/// sheet) are errors. A sheet where nothing survives parsing returns an
/// empty table and entity list.
pub fn normalize_with(
    raw: &RawDataset,
    shape: &TableShape,
    order: DateOrder,
) -> Result<Normalized, DataError> {
    let normalized = match shape {
        TableShape::Paired => normalize_paired(raw, order)?,
        TableShape::SingleIndex { date_column } => {
            normalize_single_index(raw, *date_column, order)?
        }
    };
    debug!(
        entities = normalized.entities.len(),
        dates = normalized.table.n_dates(),
        dropped = normalized.report.dropped_entities.len(),
        "normalized price table"
    );
    Ok(normalized)
}

fn normalize_paired(raw: &RawDataset, order: DateOrder) -> Result<Normalized, DataError> {
    let mut report = NormalizeReport::default();
    let columns = raw.columns();

    if columns.len() % 2 != 0 {
        if let Some(last) = columns.last() {
            warn!(
                column = %last.label,
                "odd number of columns, expecting date/price pairs; ignoring trailing column"
            );
            report.ignored_column = Some(last.label.clone());
        }
    }

    let pairs: Vec<(usize, &RawColumn, &RawColumn)> = columns
        .chunks_exact(2)
        .enumerate()
        .map(|(p, pair)| (2 * p + 1, &pair[0], &pair[1]))
        .collect();

    let ids: Vec<EntityId> = pairs
        .iter()
        .map(|(pos, _, price)| EntityId::from_label(&price.label, *pos))
        .collect();
    ensure_unique(&ids)?;

    let mut observations = Vec::new();
    for ((_, date_col, price_col), entity) in pairs.into_iter().zip(ids) {
        let (format, dates) = parse_date_column(&date_col.cells, order);
        let mut points: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut dropped = 0;
        let mut duplicate_dates = 0;

        let cells = date_col.cells.iter().zip(&price_col.cells);
        for (date, (date_cell, price_cell)) in dates.into_iter().zip(cells) {
            match (date, parse_price(price_cell)) {
                (Some(date), Some(price)) => {
                    if points.contains_key(&date) {
                        duplicate_dates += 1;
                    } else {
                        points.insert(date, price);
                    }
                }
                _ => {
                    // Blank padding below a shorter history is not worth reporting.
                    if !(date_cell.trim().is_empty() && price_cell.trim().is_empty()) {
                        dropped += 1;
                    }
                }
            }
        }

        if let Some(format) = format {
            debug!(entity = %entity, format = format.pattern(), "date format detected");
        }
        if points.is_empty() {
            debug!(entity = %entity, "no valid rows, dropping entity");
            report.dropped_entities.push(entity.to_string());
            continue;
        }
        if duplicate_dates > 0 {
            warn!(entity = %entity, duplicate_dates, "duplicate dates, keeping first occurrence");
        }

        report.entities.push(EntityReport {
            entity: entity.clone(),
            rows: points.len(),
            dropped,
            duplicate_dates,
            date_format: format.map(|f| f.pattern().to_string()),
        });
        observations.push((entity, points));
    }

    if observations.is_empty() {
        return Ok(Normalized::empty(report));
    }

    let entities = observations.iter().map(|(e, _)| e.clone()).collect();
    Ok(Normalized {
        table: Panel::outer_join(observations),
        entities,
        report,
    })
}

fn normalize_single_index(
    raw: &RawDataset,
    date_column: usize,
    order: DateOrder,
) -> Result<Normalized, DataError> {
    let mut report = NormalizeReport::default();
    if raw.n_columns() == 0 {
        return Ok(Normalized::empty(report));
    }
    let dates_col = raw.column(date_column).ok_or_else(|| {
        DataError::MalformedInput(format!(
            "date column {date_column} is out of range for a sheet with {} columns",
            raw.n_columns()
        ))
    })?;

    let entity_cols: Vec<(usize, &RawColumn)> = raw
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_column)
        .collect();
    let ids: Vec<EntityId> = entity_cols
        .iter()
        .map(|(i, col)| EntityId::from_label(&col.label, *i))
        .collect();
    ensure_unique(&ids)?;

    let (format, parsed) = parse_date_column(&dates_col.cells, order);
    if let Some(format) = format {
        debug!(format = format.pattern(), "date format detected");
        report.date_format = Some(format.pattern().to_string());
    }

    // date → source row, first occurrence wins
    let mut rows_by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (row, date) in parsed.into_iter().enumerate() {
        match date {
            Some(date) => {
                if rows_by_date.contains_key(&date) {
                    report.duplicate_rows += 1;
                } else {
                    rows_by_date.insert(date, row);
                }
            }
            None => {
                let blank_row = raw.columns().iter().all(|c| c.cells[row].trim().is_empty());
                if !blank_row {
                    report.skipped_rows += 1;
                }
            }
        }
    }
    if report.skipped_rows > 0 {
        warn!(rows = report.skipped_rows, "rows with unparseable dates excluded");
    }
    if report.duplicate_rows > 0 {
        warn!(rows = report.duplicate_rows, "rows with repeated dates excluded");
    }

    let dates: Vec<NaiveDate> = rows_by_date.keys().copied().collect();
    let mut entities = Vec::new();
    let mut columns = Vec::new();

    for ((_, col), entity) in entity_cols.into_iter().zip(ids) {
        let mut dropped = 0;
        let column: Vec<Option<f64>> = rows_by_date
            .values()
            .map(|&row| {
                let cell = &col.cells[row];
                let price = parse_price(cell);
                if price.is_none() && !cell.trim().is_empty() {
                    dropped += 1;
                }
                price
            })
            .collect();

        let rows = column.iter().filter(|v| v.is_some()).count();
        if rows == 0 {
            debug!(entity = %entity, "no valid prices, dropping entity");
            report.dropped_entities.push(entity.to_string());
            continue;
        }
        report.entities.push(EntityReport {
            entity: entity.clone(),
            rows,
            dropped,
            duplicate_dates: 0,
            date_format: None,
        });
        entities.push(entity);
        columns.push(column);
    }

    if entities.is_empty() {
        return Ok(Normalized::empty(report));
    }

    let table = Panel::new(dates, entities.clone(), columns)?;
    Ok(Normalized {
        table,
        entities,
        report,
    })
}

/// Duplicate labels are a data-quality error, never merged.
fn ensure_unique(ids: &[EntityId]) -> Result<(), DataError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DataError::DuplicateEntity {
                label: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> RawDataset {
        let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.to_vec()).collect();
        RawDataset::from_rows(headers, &rows[..]).unwrap()
    }

    #[test]
    fn paired_outer_joins_entities() {
        let raw = sheet(
            &["Exchange Date", "NU", "Exchange Date", "SOFI"],
            &[
                &["2024-01-02", "10", "2024-01-03", "7"],
                &["2024-01-03", "11", "2024-01-04", "8"],
                &["2024-01-04", "12", "", ""],
            ],
        );
        let out = normalize(&raw, &TableShape::Paired).unwrap();

        assert_eq!(out.entities, vec![EntityId::new("NU"), EntityId::new("SOFI")]);
        assert_eq!(out.table.dates(), &[d("2024-01-02"), d("2024-01-03"), d("2024-01-04")]);
        assert_eq!(out.table.get(&"SOFI".into(), d("2024-01-02")), None);
        assert_eq!(out.table.get(&"SOFI".into(), d("2024-01-04")), Some(8.0));
        // blank padding is not reported as dropped
        assert_eq!(out.report.entities[1].dropped, 0);
    }

    #[test]
    fn paired_drops_row_when_either_cell_fails() {
        let raw = sheet(
            &["Date", "NU"],
            &[
                &["2024-01-02", "10"],
                &["not a date", "11"],
                &["2024-01-04", "n/a"],
                &["2024-01-05", "13"],
            ],
        );
        let out = normalize(&raw, &TableShape::Paired).unwrap();
        assert_eq!(out.table.dates(), &[d("2024-01-02"), d("2024-01-05")]);
        assert_eq!(out.report.entities[0].dropped, 2);
    }

    #[test]
    fn paired_reads_each_date_column_with_one_format() {
        let raw = sheet(
            &["Date", "NU", "Date", "SOFI"],
            &[
                &["01/12/2024", "10", "2024-01-12", "7"],
                &["01/13/2024", "20", "01/13/2024", "8"],
                &["01/14/2024", "40", "2024-01-14", "9"],
            ],
        );
        let out = normalize(&raw, &TableShape::Paired).unwrap();

        assert_eq!(out.table.dates(), &[d("2024-01-12"), d("2024-01-13"), d("2024-01-14")]);
        assert_eq!(out.table.get(&"NU".into(), d("2024-01-14")), Some(40.0));

        let nu = &out.report.entities[0];
        assert_eq!(nu.date_format.as_deref(), Some("%m/%d/%Y"));
        assert_eq!((nu.rows, nu.dropped), (3, 0));

        // the US-style cell in an ISO column is dropped, not reinterpreted
        let sofi = &out.report.entities[1];
        assert_eq!(sofi.date_format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!((sofi.rows, sofi.dropped), (2, 1));
        assert_eq!(out.table.get(&"SOFI".into(), d("2024-01-13")), None);
        assert!(out.report.notes().iter().any(|n| n.contains("'SOFI': 1 row(s)")));
    }

    #[test]
    fn day_first_order_applies_to_ambiguous_columns() {
        let raw = sheet(&["Date", "NU"], &[&["03/04/2024", "10"], &["04/04/2024", "11"]]);

        let out = normalize_with(&raw, &TableShape::Paired, DateOrder::DayFirst).unwrap();
        assert_eq!(out.table.dates(), &[d("2024-04-03"), d("2024-04-04")]);

        let out = normalize(&raw, &TableShape::Paired).unwrap();
        assert_eq!(out.table.dates(), &[d("2024-03-04"), d("2024-04-04")]);
    }

    #[test]
    fn paired_drops_entities_without_rows() {
        let raw = sheet(
            &["Date", "NU", "Date", "GHOST"],
            &[&["2024-01-02", "10", "", "x"], &["2024-01-03", "11", "", ""]],
        );
        let out = normalize(&raw, &TableShape::Paired).unwrap();
        assert_eq!(out.entities, vec![EntityId::new("NU")]);
        assert_eq!(out.table.n_entities(), 1);
        assert_eq!(out.report.dropped_entities, vec!["GHOST".to_string()]);
    }

    #[test]
    fn paired_ignores_trailing_odd_column() {
        let raw = sheet(&["Date", "NU", "Notes"], &[&["2024-01-02", "10", "hello"]]);
        let out = normalize(&raw, &TableShape::Paired).unwrap();
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.report.ignored_column.as_deref(), Some("Notes"));
        assert!(out.report.notes().iter().any(|n| n.contains("Notes")));
    }

    #[test]
    fn paired_rejects_duplicate_labels() {
        let raw = sheet(
            &["Date", "NU", "Date", "NU"],
            &[&["2024-01-02", "10", "2024-01-02", "11"]],
        );
        let err = normalize(&raw, &TableShape::Paired).unwrap_err();
        assert!(matches!(err, DataError::DuplicateEntity { label } if label == "NU"));
    }

    #[test]
    fn paired_keeps_first_of_duplicate_dates() {
        let raw = sheet(&["Date", "NU"], &[&["2024-01-02", "10"], &["2024-01-02", "99"]]);
        let out = normalize(&raw, &TableShape::Paired).unwrap();
        assert_eq!(out.table.get(&"NU".into(), d("2024-01-02")), Some(10.0));
        assert_eq!(out.report.entities[0].duplicate_dates, 1);
    }

    #[test]
    fn single_index_reads_shared_dates() {
        let raw = sheet(
            &["Date", "NU", "SOFI"],
            &[
                &["2024-01-03", "11", ""],
                &["2024-01-02", "10", "7"],
                &["bad", "1", "1"],
            ],
        );
        let out = normalize(&raw, &TableShape::SingleIndex { date_column: 0 }).unwrap();
        assert_eq!(out.table.dates(), &[d("2024-01-02"), d("2024-01-03")]);
        assert_eq!(out.table.get(&"NU".into(), d("2024-01-03")), Some(11.0));
        assert_eq!(out.table.get(&"SOFI".into(), d("2024-01-03")), None);
        assert_eq!(out.report.skipped_rows, 1);
    }

    #[test]
    fn single_index_skips_rows_off_the_date_format() {
        let raw = sheet(
            &["Date", "NU"],
            &[
                &["01/12/2024", "10"],
                &["2024-01-13", "20"],
                &["01/14/2024", "40"],
            ],
        );
        let out = normalize(&raw, &TableShape::SingleIndex { date_column: 0 }).unwrap();

        assert_eq!(out.report.date_format.as_deref(), Some("%m/%d/%Y"));
        assert_eq!(out.table.dates(), &[d("2024-01-12"), d("2024-01-14")]);
        assert_eq!(out.report.skipped_rows, 1);
    }

    #[test]
    fn single_index_date_column_can_be_anywhere() {
        let raw = sheet(&["NU", "Date"], &[&["10", "2024-01-02"]]);
        let out = normalize(&raw, &TableShape::SingleIndex { date_column: 1 }).unwrap();
        assert_eq!(out.entities, vec![EntityId::new("NU")]);
    }

    #[test]
    fn single_index_keeps_dates_with_all_blank_prices() {
        let raw = sheet(
            &["Date", "NU"],
            &[&["2024-01-02", "10"], &["2024-01-03", ""], &["2024-01-04", "12"]],
        );
        let out = normalize(&raw, &TableShape::SingleIndex { date_column: 0 }).unwrap();
        assert_eq!(out.table.n_dates(), 3);
        assert_eq!(out.table.get(&"NU".into(), d("2024-01-03")), None);
    }

    #[test]
    fn single_index_out_of_range_date_column_is_malformed() {
        let raw = sheet(&["Date", "NU"], &[&["2024-01-02", "10"]]);
        let err = normalize(&raw, &TableShape::SingleIndex { date_column: 5 }).unwrap_err();
        assert!(matches!(err, DataError::MalformedInput(_)));
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let raw = RawDataset::default();
        for shape in [TableShape::Paired, TableShape::SingleIndex { date_column: 0 }] {
            let out = normalize(&raw, &shape).unwrap();
            assert!(out.is_empty());
            assert!(out.table.is_empty());
        }
    }

    #[test]
    fn nothing_parseable_yields_empty_table() {
        let raw = sheet(&["Date", "NU"], &[&["x", "y"], &["", "z"]]);
        let out = normalize(&raw, &TableShape::Paired).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.report.dropped_entities, vec!["NU".to_string()]);
    }

    #[test]
    fn shape_deserializes_from_tagged_form() {
        let shape: TableShape =
            serde_json::from_str(r#"{"type":"single-index","date_column":2}"#).unwrap();
        assert_eq!(shape, TableShape::SingleIndex { date_column: 2 });
        let paired: TableShape = serde_json::from_str(r#"{"type":"paired"}"#).unwrap();
        assert_eq!(paired, TableShape::Paired);
    }
}
