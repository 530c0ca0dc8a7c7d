//! Analysis windows: validated `[start, end]` date ranges and calendar splitting.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::config::WindowSpec;
use crate::error::EngineError;

/// Inclusive date range incidents are clipped against. `start <= end` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
  start: NaiveDate,
  end: NaiveDate,
}

impl Window {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
    if end < start {
      return Err(EngineError::validation(
        "window",
        &format!("end {} is before start {}", end, start),
      ));
    }
    Ok(Self { start, end })
  }

  /// `[report_date - months, report_date]`.
  pub fn trailing_months(report_date: NaiveDate, months: u32) -> Result<Self, EngineError> {
    let start = report_date
      .checked_sub_months(Months::new(months))
      .ok_or_else(|| EngineError::validation("window", "trailing months out of date range"))?;
    Self::new(start, report_date)
  }

  /// `[start, report_date]`.
  pub fn since(start: NaiveDate, report_date: NaiveDate) -> Result<Self, EngineError> {
    Self::new(start, report_date)
  }

  pub fn calendar_year(year: i32) -> Result<Self, EngineError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
      .ok_or_else(|| EngineError::validation("window", &format!("year {} out of range", year)))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
      .ok_or_else(|| EngineError::validation("window", &format!("year {} out of range", year)))?;
    Self::new(start, end)
  }

  pub fn from_spec(spec: WindowSpec, report_date: NaiveDate) -> Result<Self, EngineError> {
    match spec {
      WindowSpec::TrailingMonths(months) => Self::trailing_months(report_date, months),
      WindowSpec::Since(start) => Self::since(start, report_date),
    }
  }

  pub fn start(&self) -> NaiveDate {
    self.start
  }

  pub fn end(&self) -> NaiveDate {
    self.end
  }

  /// Calendar days in the window, both ends included.
  pub fn days(&self) -> i64 {
    (self.end - self.start).num_days() + 1
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }

  /// The window cut at calendar-year boundaries, in ascending year order.
  pub fn years(&self) -> Vec<(i32, Window)> {
    (self.start.year()..=self.end.year())
      .filter_map(|year| {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let dec31 = NaiveDate::from_ymd_opt(year, 12, 31)?;
        let sub = Window {
          start: self.start.max(jan1),
          end: self.end.min(dec31),
        };
        Some((year, sub))
      })
      .collect()
  }

  /// First-of-month dates that fall inside the window.
  pub fn month_starts(&self) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let first = NaiveDate::from_ymd_opt(self.start.year(), self.start.month(), 1);
    let mut cursor = match first {
      Some(m) if m < self.start => m.checked_add_months(Months::new(1)),
      other => other,
    };
    while let Some(month) = cursor {
      if month > self.end {
        break;
      }
      out.push(month);
      cursor = month.checked_add_months(Months::new(1));
    }
    out
  }
}
