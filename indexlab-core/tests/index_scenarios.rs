//! End-to-end scenarios: raw sheet → normalizer → compounder.

use chrono::NaiveDate;
use indexlab_core::data::{normalize, RawDataset, TableShape};
use indexlab_core::index::{compute_index, IndexOutcome};
use indexlab_core::{EntityId, Panel};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn sheet(headers: &[&str], rows: &[&[&str]]) -> RawDataset {
    let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.to_vec()).collect();
    RawDataset::from_rows(headers, &rows[..]).unwrap()
}

fn values(series: &indexlab_core::IndexSeries) -> Vec<Option<f64>> {
    series.iter().map(|(_, v)| v).collect()
}

// ── Scenario A: single entity ────────────────────────────────────────

#[test]
fn single_entity_doubles_twice() {
    let raw = sheet(
        &["Date", "NU"],
        &[
            &["2024-01-02", "10"],
            &["2024-01-03", "20"],
            &["2024-01-04", "40"],
        ],
    );
    let normalized = normalize(&raw, &TableShape::Paired).unwrap();
    let result = compute_index(&normalized.table, 100.0);

    assert_eq!(values(&result.index), vec![Some(100.0), Some(200.0), Some(400.0)]);
    assert_eq!(result.outcome, IndexOutcome::Computed { base_date: d("2024-01-02") });
}

#[test]
fn us_formatted_dates_keep_calendar_order() {
    let raw = sheet(
        &["Date", "NU"],
        &[
            &["01/12/2024", "10"],
            &["01/13/2024", "20"],
            &["01/14/2024", "40"],
        ],
    );
    let normalized = normalize(&raw, &TableShape::Paired).unwrap();
    let result = compute_index(&normalized.table, 100.0);

    let dates: Vec<NaiveDate> = result.index.dates().collect();
    assert_eq!(dates, vec![d("2024-01-12"), d("2024-01-13"), d("2024-01-14")]);
    assert_eq!(values(&result.index), vec![Some(100.0), Some(200.0), Some(400.0)]);
}

// ── Scenario B: staggered listing ────────────────────────────────────

#[test]
fn late_listing_entity_joins_after_its_first_day() {
    let raw = sheet(
        &["Date", "X", "Date", "Y"],
        &[
            &["2024-01-01", "10", "2024-01-02", "5"],
            &["2024-01-02", "10", "2024-01-03", "10"],
            &["2024-01-03", "10", "", ""],
        ],
    );
    let normalized = normalize(&raw, &TableShape::Paired).unwrap();
    let result = compute_index(&normalized.table, 100.0);

    assert_eq!(result.base_date(), Some(d("2024-01-01")));
    assert_eq!(values(&result.index), vec![Some(100.0), Some(100.0), Some(150.0)]);

    // Y's first day carries no return and is excluded from the day-2 mean.
    assert_eq!(result.daily_returns.get(&"Y".into(), d("2024-01-02")), None);
    assert_eq!(result.composite_returns.get(d("2024-01-02")), Some(0.0));
    assert_eq!(result.composite_returns.get(d("2024-01-03")), Some(0.5));
    assert_eq!(result.active_count.get(d("2024-01-01")), Some(1));
    assert_eq!(result.active_count.get(d("2024-01-02")), Some(2));
}

#[test]
fn same_scenario_in_single_index_layout() {
    let raw = sheet(
        &["Date", "X", "Y"],
        &[
            &["2024-01-01", "10", ""],
            &["2024-01-02", "10", "5"],
            &["2024-01-03", "10", "10"],
        ],
    );
    let normalized = normalize(&raw, &TableShape::SingleIndex { date_column: 0 }).unwrap();
    let result = compute_index(&normalized.table, 100.0);
    assert_eq!(values(&result.index), vec![Some(100.0), Some(100.0), Some(150.0)]);
}

// ── Scenario C: mid-series gap ───────────────────────────────────────

#[test]
fn blank_price_is_forward_filled_with_flat_return() {
    let raw = sheet(
        &["Date", "NU"],
        &[
            &["2024-01-02", "10"],
            &["2024-01-03", ""],
            &["2024-01-04", "12"],
        ],
    );
    let normalized = normalize(&raw, &TableShape::SingleIndex { date_column: 0 }).unwrap();
    let result = compute_index(&normalized.table, 100.0);

    assert_eq!(result.filled.get(&"NU".into(), d("2024-01-03")), Some(10.0));
    assert_eq!(result.daily_returns.get(&"NU".into(), d("2024-01-03")), Some(0.0));
    assert_eq!(result.index.get(d("2024-01-03")), Some(100.0));
    assert!((result.index.get(d("2024-01-04")).unwrap() - 120.0).abs() < 1e-9);
}

#[test]
fn paired_gap_day_from_other_entity_is_kept() {
    // NU is missing 01-03 but SOFI trades that day, so the date is on the calendar.
    let raw = sheet(
        &["Date", "NU", "Date", "SOFI"],
        &[
            &["2024-01-02", "10", "2024-01-02", "8"],
            &["2024-01-04", "11", "2024-01-03", "8"],
            &["", "", "2024-01-04", "8"],
        ],
    );
    let normalized = normalize(&raw, &TableShape::Paired).unwrap();
    let result = compute_index(&normalized.table, 100.0);

    assert_eq!(result.index.len(), 3);
    assert_eq!(result.daily_returns.get(&"NU".into(), d("2024-01-03")), Some(0.0));
    assert_eq!(result.index.get(d("2024-01-03")), Some(100.0));
    assert!((result.index.get(d("2024-01-04")).unwrap() - 105.0).abs() < 1e-9);
}

// ── Scenario D: empty input ──────────────────────────────────────────

#[test]
fn empty_sheet_flows_through_as_empty_sentinel() {
    let raw = sheet(&["Date", "NU"], &[]);
    let normalized = normalize(&raw, &TableShape::Paired).unwrap();
    assert!(normalized.is_empty());
    assert!(normalized.table.is_empty());

    let result = compute_index(&normalized.table, 100.0);
    assert_eq!(result.outcome, IndexOutcome::Empty);
    assert!(result.index.is_empty());
    assert!(result.daily_returns.is_empty());
    assert!(result.filled.is_empty());
    assert!(result.active_count.is_empty());
}

// ── Base-day regression ──────────────────────────────────────────────

#[test]
fn index_starts_exactly_at_base_value() {
    // Two entities list on the same day after a leading all-blank date.
    let table = Panel::new(
        vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")],
        vec![EntityId::new("A"), EntityId::new("B")],
        vec![
            vec![None, Some(3.0), Some(3.3)],
            vec![None, Some(7.0), Some(6.3)],
        ],
    )
    .unwrap();

    let result = compute_index(&table, 250.0);
    assert_eq!(result.index.get(d("2024-01-01")), None);
    assert_eq!(result.index.get(d("2024-01-02")), Some(250.0));
    let expected = 250.0 * (1.0 + (0.1 + -0.1) / 2.0);
    assert!((result.index.get(d("2024-01-03")).unwrap() - expected).abs() < 1e-9);
}

#[test]
fn base_date_is_first_date_with_any_price() {
    let table = Panel::new(
        vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")],
        vec![EntityId::new("A"), EntityId::new("B")],
        vec![vec![None, None, Some(1.0)], vec![None, Some(2.0), Some(2.0)]],
    )
    .unwrap();
    let result = compute_index(&table, 100.0);
    assert_eq!(result.base_date(), Some(d("2024-01-02")));
}

#[test]
fn compounding_the_filled_table_is_idempotent() {
    let raw = sheet(
        &["Date", "X", "Y", "Z"],
        &[
            &["2024-01-01", "", "4", ""],
            &["2024-01-02", "10", "", ""],
            &["2024-01-03", "", "5", "2"],
            &["2024-01-04", "12", "", "2.2"],
            &["2024-01-05", "11", "6", ""],
        ],
    );
    let normalized = normalize(&raw, &TableShape::SingleIndex { date_column: 0 }).unwrap();
    let first = compute_index(&normalized.table, 100.0);
    let second = compute_index(&first.filled, 100.0);

    assert_eq!(first.index, second.index);
    assert_eq!(first.filled, second.filled);
}

#[test]
fn month_end_sampling_of_computed_index() {
    let raw = sheet(
        &["Date", "NU"],
        &[
            &["2024-01-30", "10"],
            &["2024-01-31", "11"],
            &["2024-02-01", "12"],
            &["2024-03-28", "13"],
        ],
    );
    let normalized = normalize(&raw, &TableShape::Paired).unwrap();
    let monthly = compute_index(&normalized.table, 100.0)
        .index
        .resample_month_end();

    let points: Vec<(NaiveDate, f64)> = monthly.present().collect();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].0, d("2024-01-31"));
    assert!((points[0].1 - 110.0).abs() < 1e-9);
    assert_eq!(points[1].0, d("2024-02-29"));
    assert_eq!(points[2].0, d("2024-03-31"));
}
