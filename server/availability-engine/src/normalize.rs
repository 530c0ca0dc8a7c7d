//! Normalize inbound incident rows into validated `Incident` models.

use chrono::{DateTime, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::EngineError;
use crate::types::*;

/// Parse and validate an `InboundIncident` into a canonical `Incident`.
pub fn normalize(raw: &InboundIncident) -> Result<Incident, EngineError> {
  let product_id = ProductId::from(raw.product_id.clone());
  if product_id.0.is_empty() {
    return Err(EngineError::validation("product_id", "must not be empty"));
  }

  let status = Status::from_str_loose(&raw.status)
    .ok_or_else(|| EngineError::validation("status", "expected Rupture|Tension|Arret|Disponible"))?;

  let start_date = match present(&raw.start_date) {
    Some(s) => parse_date("start_date", s)?,
    None => return Err(EngineError::validation("start_date", "is required")),
  };
  let end_date = present(&raw.end_date)
    .map(|s| parse_date("end_date", s))
    .transpose()?;

  let calculated_end_date = match present(&raw.calculated_end_date) {
    Some(s) => parse_date("calculated_end_date", s)?,
    None => derive_calculated_end(raw, end_date)?.ok_or_else(|| {
      EngineError::validation(
        "calculated_end_date",
        "absent and no end_date, updated_date or last_report_date to derive it from",
      )
    })?,
  };

  let incident = Incident::new(product_id, status, start_date, end_date, calculated_end_date)?;
  Ok(incident.with_cis_codes(raw.cis_codes.iter().map(|c| c.trim().to_string()).collect()))
}

/// `end_date` when known, otherwise the latest refresh date we have for the row.
fn derive_calculated_end(
  raw: &InboundIncident,
  end_date: Option<NaiveDate>,
) -> Result<Option<NaiveDate>, EngineError> {
  if end_date.is_some() {
    return Ok(end_date);
  }
  let updated = present(&raw.updated_date)
    .map(|s| parse_date("updated_date", s))
    .transpose()?;
  let last_report = present(&raw.last_report_date)
    .map(|s| parse_date("last_report_date", s))
    .transpose()?;
  let derived = updated.max(last_report);
  if let Some(date) = derived {
    debug!(status = %raw.status, calculated_end_date = %date, "derived calculated end date");
  }
  Ok(derived)
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Accepts `YYYY-MM-DD` or an RFC3339 timestamp (date part kept).
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, EngineError> {
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(date);
  }
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.date_naive())
    .map_err(|e| EngineError::validation(field, &format!("invalid date {:?}: {}", raw, e)))
}

/// The global "as of" date: latest `calculated_end_date` in the dataset.
pub fn report_date(incidents: &[Incident]) -> Option<NaiveDate> {
  incidents.iter().map(Incident::calculated_end_date).max()
}

/// Group incidents by product, in ascending product id order.
pub fn group_by_product(incidents: Vec<Incident>) -> Vec<Product> {
  let mut grouped: BTreeMap<ProductId, Vec<Incident>> = BTreeMap::new();
  for incident in incidents {
    grouped
      .entry(incident.product_id().clone())
      .or_default()
      .push(incident);
  }
  grouped
    .into_iter()
    .map(|(id, incidents)| Product::new(id, incidents))
    .collect()
}
