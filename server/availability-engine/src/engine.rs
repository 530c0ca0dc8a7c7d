//! Core engine: assembles the dashboard report from validated incidents.

use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::debug;

use crate::aggregate;
use crate::classify;
use crate::clip;
use crate::config::Config;
use crate::error::EngineError;
use crate::monthly;
use crate::normalize;
use crate::recency;
use crate::types::*;
use crate::window::Window;

/// The availability engine. Holds configuration only; every call is pure.
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  /// Report over a whole dataset: report date from the data, window from config.
  pub fn report(&self, incidents: Vec<Incident>) -> Result<Report, EngineError> {
    let report_date = normalize::report_date(&incidents)
      .ok_or_else(|| EngineError::validation("incidents", "empty dataset has no report date"))?;
    let window = Window::from_spec(self.config.window, report_date)?;
    let products = normalize::group_by_product(incidents);
    Ok(self.summarize(&products, report_date, &window))
  }

  /// Summarize products at `report_date` over `window`.
  ///
  /// Only products with an incident overlapping the window are listed, further
  /// narrowed by the configured product filter. Monthly counts cover every product.
  pub fn summarize(&self, products: &[Product], report_date: NaiveDate, window: &Window) -> Report {
    let all: Vec<Incident> = products
      .iter()
      .flat_map(|p| p.incidents.iter().cloned())
      .collect();
    let mut recent = recency::detect_recent_changes(&all, report_date, self.config.recency_window_days);
    let needle = self.config.product_filter.as_deref().map(str::to_lowercase);

    let mut breakdown = StatusBreakdown::default();
    let mut rows: Vec<ProductSummary> = products
      .iter()
      .filter(|product| has_event_in(product, window, report_date))
      .filter(|product| {
        needle
          .as_deref()
          .map_or(true, |n| product.id.0.to_lowercase().contains(n))
      })
      .map(|product| {
        let current = classify::classify(&product.incidents, report_date);
        breakdown.record(current.status);
        ProductSummary {
          product_id: product.id.clone(),
          status: current.status,
          is_active: current.is_active,
          since: current.since,
          days_in_status: current.since.map(|s| (report_date - s).num_days() + 1),
          recent_change: recent.remove(&product.id),
          availability: aggregate::aggregate(&product.incidents, window, report_date, &self.config.score),
        }
      })
      .collect();

    rows.sort_by(dashboard_order);

    debug!(
      products = rows.len(),
      skipped = products.len() - rows.len(),
      %report_date,
      window_start = %window.start(),
      window_end = %window.end(),
      "summarized availability"
    );

    Report {
      report_date,
      window: *window,
      products: rows,
      breakdown,
      monthly: monthly::monthly_counts(&all, window),
    }
  }
}

fn has_event_in(product: &Product, window: &Window, report_date: NaiveDate) -> bool {
  product
    .incidents
    .iter()
    .any(|i| clip::clip(i, window, report_date).is_some())
}

/// Active first, then status priority, then most recent start, then product id.
fn dashboard_order(a: &ProductSummary, b: &ProductSummary) -> Ordering {
  b.is_active
    .cmp(&a.is_active)
    .then_with(|| a.status.cmp(&b.status))
    .then_with(|| b.since.cmp(&a.since))
    .then_with(|| a.product_id.cmp(&b.product_id))
}
