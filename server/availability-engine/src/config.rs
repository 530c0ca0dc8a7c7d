//! Engine configuration with sane defaults, optionally overlaid from the environment.

use chrono::NaiveDate;

use crate::error::EngineError;

/// Penalty points per day for each shortage status, used by the availability score.
///
/// These are a product decision, not a measured quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
  pub rupture: f64,
  pub tension: f64,
  pub arret: f64,
}

impl Default for ScoreWeights {
  fn default() -> Self {
    Self {
      rupture: 1.0,
      tension: 0.5,
      arret: 1.0,
    }
  }
}

/// How the analysis window is derived from the report date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpec {
  /// `[report_date - n months, report_date]`.
  TrailingMonths(u32),
  /// `[date, report_date]`, e.g. since the start of the monitoring program.
  Since(NaiveDate),
}

/// Tunables for report assembly.
#[derive(Debug, Clone)]
pub struct Config {
  pub score: ScoreWeights,
  /// Trailing days inspected by the recency detector.
  pub recency_window_days: u32,
  pub window: WindowSpec,
  /// Case-insensitive substring a product id must contain to be listed.
  pub product_filter: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      score: ScoreWeights::default(),
      recency_window_days: 7,
      window: WindowSpec::TrailingMonths(12),
      product_filter: None,
    }
  }
}

impl Config {
  /// Defaults overlaid with `AVAILABILITY_*` environment variables.
  pub fn from_env() -> Result<Self, EngineError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Same as [`Config::from_env`] but reads variables through `lookup`.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut config = Self::default();

    if let Some(v) = lookup("AVAILABILITY_WINDOW_MONTHS") {
      let months: u32 = parse_var("AVAILABILITY_WINDOW_MONTHS", &v)?;
      if months == 0 {
        return Err(EngineError::validation(
          "AVAILABILITY_WINDOW_MONTHS",
          "must be at least 1",
        ));
      }
      config.window = WindowSpec::TrailingMonths(months);
    }
    // An explicit start date wins over a month count.
    if let Some(v) = lookup("AVAILABILITY_WINDOW_SINCE") {
      let since = NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|e| {
        EngineError::validation("AVAILABILITY_WINDOW_SINCE", &format!("expected YYYY-MM-DD: {}", e))
      })?;
      config.window = WindowSpec::Since(since);
    }
    if let Some(v) = lookup("AVAILABILITY_RECENCY_DAYS") {
      config.recency_window_days = parse_var("AVAILABILITY_RECENCY_DAYS", &v)?;
    }
    if let Some(v) = lookup("AVAILABILITY_PRODUCT_FILTER") {
      let term = v.trim();
      if !term.is_empty() {
        config.product_filter = Some(term.to_string());
      }
    }
    if let Some(v) = lookup("AVAILABILITY_WEIGHT_RUPTURE") {
      config.score.rupture = parse_weight("AVAILABILITY_WEIGHT_RUPTURE", &v)?;
    }
    if let Some(v) = lookup("AVAILABILITY_WEIGHT_TENSION") {
      config.score.tension = parse_weight("AVAILABILITY_WEIGHT_TENSION", &v)?;
    }
    if let Some(v) = lookup("AVAILABILITY_WEIGHT_ARRET") {
      config.score.arret = parse_weight("AVAILABILITY_WEIGHT_ARRET", &v)?;
    }

    Ok(config)
  }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, EngineError>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse()
    .map_err(|e: T::Err| EngineError::validation(name, &e.to_string()))
}

fn parse_weight(name: &str, raw: &str) -> Result<f64, EngineError> {
  let weight: f64 = parse_var(name, raw)?;
  if !weight.is_finite() || weight < 0.0 {
    return Err(EngineError::validation(name, "must be a non-negative number"));
  }
  Ok(weight)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_without_variables() {
    let config = Config::from_lookup(|_| None).unwrap();
    assert_eq!(config.window, WindowSpec::TrailingMonths(12));
    assert_eq!(config.recency_window_days, 7);
    assert_eq!(config.score, ScoreWeights::default());
    assert_eq!(config.product_filter, None);
  }

  #[test]
  fn blank_product_filter_is_ignored() {
    let config = Config::from_lookup(lookup_from(&[("AVAILABILITY_PRODUCT_FILTER", "  ")])).unwrap();
    assert_eq!(config.product_filter, None);

    let config = Config::from_lookup(lookup_from(&[("AVAILABILITY_PRODUCT_FILTER", " Amox ")])).unwrap();
    assert_eq!(config.product_filter.as_deref(), Some("Amox"));
  }

  #[test]
  fn overlays_values() {
    let config = Config::from_lookup(lookup_from(&[
      ("AVAILABILITY_WINDOW_MONTHS", "24"),
      ("AVAILABILITY_RECENCY_DAYS", "14"),
      ("AVAILABILITY_WEIGHT_TENSION", "0.25"),
    ]))
    .unwrap();
    assert_eq!(config.window, WindowSpec::TrailingMonths(24));
    assert_eq!(config.recency_window_days, 14);
    assert!((config.score.tension - 0.25).abs() < f64::EPSILON);
  }

  #[test]
  fn since_overrides_months() {
    let config = Config::from_lookup(lookup_from(&[
      ("AVAILABILITY_WINDOW_MONTHS", "6"),
      ("AVAILABILITY_WINDOW_SINCE", "2021-05-01"),
    ]))
    .unwrap();
    assert_eq!(
      config.window,
      WindowSpec::Since(NaiveDate::from_ymd_opt(2021, 5, 1).unwrap())
    );
  }

  #[test]
  fn rejects_bad_values() {
    let err = Config::from_lookup(lookup_from(&[("AVAILABILITY_RECENCY_DAYS", "soon")])).unwrap_err();
    assert!(err.to_string().contains("AVAILABILITY_RECENCY_DAYS"));

    let err = Config::from_lookup(lookup_from(&[("AVAILABILITY_WEIGHT_RUPTURE", "-1")])).unwrap_err();
    assert!(err.to_string().contains("non-negative"));

    let err = Config::from_lookup(lookup_from(&[("AVAILABILITY_WINDOW_MONTHS", "0")])).unwrap_err();
    assert!(err.to_string().contains("at least 1"));
  }
}
