//! Sparse ordered date series.
//!
//! A `DateSeries<T>` maps each date to `Option<T>`. A date that is present
//! with `None` is an explicit gap ("no value on this date"); a date that is
//! missing from the map is simply not part of the series' calendar. The
//! index series keeps every calendar date of its price table, with `None`
//! before the base date.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct DateSeries<T> {
    points: BTreeMap<NaiveDate, Option<T>>,
}

impl<T> Default for DateSeries<T> {
    fn default() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }
}

impl<T: Copy> DateSeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from `(date, value)` pairs. Later duplicates win.
    pub fn from_points(points: impl IntoIterator<Item = (NaiveDate, Option<T>)>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    /// Present value on `date`. `None` for both gaps and unknown dates.
    pub fn get(&self, date: NaiveDate) -> Option<T> {
        self.points.get(&date).copied().flatten()
    }

    /// Number of calendar dates, gaps included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of dates carrying a value.
    pub fn present_count(&self) -> usize {
        self.points.values().filter(|v| v.is_some()).count()
    }

    /// True when at least one date carries a value.
    pub fn has_values(&self) -> bool {
        self.points.values().any(|v| v.is_some())
    }

    /// All points in ascending date order, gaps included.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<T>)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Present points only, ascending.
    pub fn present(&self) -> impl Iterator<Item = (NaiveDate, T)> + '_ {
        self.points.iter().filter_map(|(d, v)| v.map(|v| (*d, v)))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    pub fn last_present(&self) -> Option<(NaiveDate, T)> {
        self.points
            .iter()
            .rev()
            .find_map(|(d, v)| v.map(|v| (*d, v)))
    }

    /// First `n` calendar dates.
    pub fn head(&self, n: usize) -> Self {
        Self {
            points: self.points.iter().take(n).map(|(d, v)| (*d, *v)).collect(),
        }
    }

    /// Last `n` calendar dates.
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.points.len().saturating_sub(n);
        Self {
            points: self.points.iter().skip(skip).map(|(d, v)| (*d, *v)).collect(),
        }
    }

    /// Month-end sampling: the last present value of each calendar month,
    /// keyed by the month's final calendar day.
    ///
    /// Months without any present value are dropped, never zero-filled.
    pub fn resample_month_end(&self) -> Self {
        let mut monthly: BTreeMap<NaiveDate, Option<T>> = BTreeMap::new();
        for (date, value) in self.present() {
            // Ascending iteration: the last write per month is the month's last value.
            monthly.insert(month_end(date), Some(value));
        }
        Self { points: monthly }
    }
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

impl<T: Copy> FromIterator<(NaiveDate, Option<T>)> for DateSeries<T> {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Option<T>)>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}
