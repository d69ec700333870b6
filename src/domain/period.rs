//! Calendar periods at a given cadence.
//!
//! A `Period` is identified by its cadence and its first calendar day. All
//! bucketing (which month/quarter/year a date falls in) and all span
//! arithmetic used by resampling lives here.

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::domain::Cadence;
use crate::error::EngineError;

/// One period of a cadence, e.g. `2020Q1` or `2020-03`.
///
/// Ordering is chronological by start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    start: NaiveDate,
    cadence: Cadence,
}

impl Period {
    /// The period of `cadence` that contains `date`.
    pub fn containing(cadence: Cadence, date: NaiveDate) -> Self {
        let start = match cadence {
            Cadence::Daily => date,
            Cadence::Monthly => first_of_month(date.year(), date.month(), date),
            Cadence::Quarterly => {
                let month = (date.month0() / 3) * 3 + 1;
                first_of_month(date.year(), month, date)
            }
            Cadence::Annual => first_of_month(date.year(), 1, date),
        };
        Self { start, cadence }
    }

    /// Parse a period label and bucket it into `cadence`.
    ///
    /// Accepted labels: `2020`, `2020Q1`, `2020-01`, `2020M01`, `2020-01-15`.
    pub fn parse(cadence: Cadence, label: &str) -> Result<Self, EngineError> {
        let date = parse_label_date(label).ok_or_else(|| EngineError::InvalidPeriod(label.to_string()))?;
        Ok(Self::containing(cadence, date))
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar day of the period.
    pub fn end(&self) -> NaiveDate {
        self.next().start - Days::new(1)
    }

    /// The period immediately after this one.
    pub fn next(&self) -> Self {
        let start = match self.cadence {
            Cadence::Daily => self.start + Days::new(1),
            Cadence::Monthly => self.start + Months::new(1),
            Cadence::Quarterly => self.start + Months::new(3),
            Cadence::Annual => self.start + Months::new(12),
        };
        Self {
            start,
            cadence: self.cadence,
        }
    }

    /// The same calendar position re-bucketed into a coarser (or equal) cadence.
    pub fn coarsen(&self, cadence: Cadence) -> Self {
        Self::containing(cadence, self.start)
    }

    /// Number of `native` periods that this period's calendar span covers.
    ///
    /// A quarter covers 3 months, a year covers 4 quarters or 12 months, a
    /// month covers 28..=31 days.
    pub fn count_within(&self, native: Cadence) -> usize {
        let last = Self::containing(native, self.end());
        let mut current = Self::containing(native, self.start);
        let mut count = 1;
        while current != last {
            current = current.next();
            count += 1;
        }
        count
    }

    /// Canonical label for the period's cadence.
    pub fn label(&self) -> String {
        match self.cadence {
            Cadence::Daily => self.start.format("%Y-%m-%d").to_string(),
            Cadence::Monthly => self.start.format("%Y-%m").to_string(),
            Cadence::Quarterly => format!("{}Q{}", self.start.year(), self.start.month0() / 3 + 1),
            Cadence::Annual => self.start.year().to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn first_of_month(year: i32, month: u32, fallback: NaiveDate) -> NaiveDate {
    // Day 1 of a month of an in-range year always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(fallback)
}

/// Parse any supported period label into the first day it denotes.
fn parse_label_date(label: &str) -> Option<NaiveDate> {
    let s = label.trim();
    let bytes = s.as_bytes();
    if bytes.len() < 4 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let year: i32 = s[..4].parse().ok()?;
    let rest = &s[4..];

    if rest.is_empty() {
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    // `2020Q1` / `2020-Q1`
    if let Some(q) = rest.strip_prefix('Q').or_else(|| rest.strip_prefix("-Q")) {
        let q: u32 = q.parse().ok()?;
        if !(1..=4).contains(&q) {
            return None;
        }
        return NaiveDate::from_ymd_opt(year, (q - 1) * 3 + 1, 1);
    }

    // `2020M01` (national-accounts monthly form)
    if let Some(m) = rest.strip_prefix('M') {
        let m: u32 = m.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, m, 1);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    // `2020-01`
    let m: u32 = rest.strip_prefix('-')?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, m, 1)
}
