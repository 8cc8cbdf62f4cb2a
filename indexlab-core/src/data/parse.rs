//! Cell parsing: dates and prices.
//!
//! Dates are read one column at a time. A column's format is detected once,
//! from its first readable cell, and every cell is then parsed with that
//! format alone; cells that do not match it come back as `None`. This keeps
//! `01/12/2024` and `01/13/2024` on the same calendar.
//!
//! Both parsers are total: they return `None` for anything they cannot read
//! and the caller drops or blanks the cell.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Which reading wins for numeric dates like `03/04/2024`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    /// `03/04/2024` is March 4th.
    #[default]
    MonthFirst,
    /// `03/04/2024` is April 3rd.
    DayFirst,
}

/// A single strftime pattern applied to a whole date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pattern: &'static str,
    with_time: bool,
}

const fn date(pattern: &'static str) -> DateFormat {
    DateFormat {
        pattern,
        with_time: false,
    }
}

const fn datetime(pattern: &'static str) -> DateFormat {
    DateFormat {
        pattern,
        with_time: true,
    }
}

const ISO: &[DateFormat] = &[
    date("%Y-%m-%d"),
    date("%Y/%m/%d"),
    datetime("%Y-%m-%d %H:%M:%S%.f"),
    datetime("%Y-%m-%dT%H:%M:%S%.f"),
];

const MONTH_FIRST: &[DateFormat] = &[date("%m/%d/%Y"), datetime("%m/%d/%Y %H:%M:%S")];

const DAY_FIRST: &[DateFormat] = &[date("%d/%m/%Y"), datetime("%d/%m/%Y %H:%M:%S")];

const UNAMBIGUOUS: &[DateFormat] = &[
    date("%d.%m.%Y"),
    date("%d-%m-%Y"),
    date("%d-%b-%Y"),
    date("%d %b %Y"),
    date("%b %d, %Y"),
];

impl DateFormat {
    /// Candidate formats in preference order.
    fn candidates(order: DateOrder) -> impl Iterator<Item = DateFormat> {
        let (preferred, other) = match order {
            DateOrder::MonthFirst => (MONTH_FIRST, DAY_FIRST),
            DateOrder::DayFirst => (DAY_FIRST, MONTH_FIRST),
        };
        ISO.iter()
            .chain(preferred)
            .chain(other)
            .chain(UNAMBIGUOUS)
            .copied()
    }

    /// Detect the format of a date column.
    ///
    /// Only formats that read the first readable cell are considered. Among
    /// those, the one reading the most cells wins; ties go to `order`.
    /// Returns `None` when no cell is readable.
    pub fn detect<S: AsRef<str>>(cells: &[S], order: DateOrder) -> Option<Self> {
        let readable = |cell: &str| Self::candidates(order).any(|f| f.parse(cell).is_some());
        let first = cells
            .iter()
            .map(|c| AsRef::<str>::as_ref(c))
            .find(|&cell| readable(cell))?;

        let mut best: Option<(Self, usize)> = None;
        for format in Self::candidates(order).filter(|f| f.parse(first).is_some()) {
            let hits = cells
                .iter()
                .filter(|cell| format.parse(cell.as_ref()).is_some())
                .count();
            if best.map_or(true, |(_, most)| hits > most) {
                best = Some((format, hits));
            }
        }
        best.map(|(format, _)| format)
    }

    /// Parse one cell with this format. The time of day is discarded.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if self.with_time {
            NaiveDateTime::parse_from_str(s, self.pattern)
                .ok()
                .map(|dt| dt.date())
        } else {
            NaiveDate::parse_from_str(s, self.pattern).ok()
        }
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }
}

/// Parse every cell of a date column with its detected format.
pub fn parse_date_column<S: AsRef<str>>(
    cells: &[S],
    order: DateOrder,
) -> (Option<DateFormat>, Vec<Option<NaiveDate>>) {
    let format = DateFormat::detect(cells, order);
    let dates = cells
        .iter()
        .map(|cell| format.and_then(|f| f.parse(cell.as_ref())))
        .collect();
    (format, dates)
}

/// Parse a finite price from a raw cell.
///
/// Thousands separators are accepted (`1,234.50`). Blank cells, text,
/// `NaN` and infinities are rejected.
pub fn parse_price(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
