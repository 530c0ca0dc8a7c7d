//! Core types for the availability engine (JSON contracts + internal models).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::EngineError;
use crate::window::Window;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the data-access layer sends)
// ---------------------------------------------------------------------------

/// Product identifiers arrive either as integer keys or as names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundId {
  Number(i64),
  Text(String),
}

/// One raw incident row. Unknown fields are silently ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundIncident {
  pub product_id: InboundId,
  pub status: String,
  #[serde(default)]
  pub start_date: Option<String>,
  #[serde(default)]
  pub end_date: Option<String>,
  #[serde(default)]
  pub calculated_end_date: Option<String>,
  /// Date the source last touched this row.
  #[serde(default)]
  pub updated_date: Option<String>,
  /// Date of the last published report that listed this row.
  #[serde(default)]
  pub last_report_date: Option<String>,
  #[serde(default)]
  pub cis_codes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Status enum (normalized)
// ---------------------------------------------------------------------------

/// Availability status. Declaration order is precedence order: the derived
/// `Ord` ranks `Rupture` lowest, so the highest-priority status is the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
  Rupture,
  Tension,
  Arret,
  Disponible,
}

impl Status {
  pub const ALL: [Status; 4] = [Self::Rupture, Self::Tension, Self::Arret, Self::Disponible];

  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "rupture" | "rupture de stock" => Some(Self::Rupture),
      "tension" | "tension d'approvisionnement" => Some(Self::Tension),
      "arret" | "arrêt" | "arret de commercialisation" | "arrêt de commercialisation" => {
        Some(Self::Arret)
      }
      "disponible" | "remise à disposition" | "remise a disposition" => Some(Self::Disponible),
      _ => None,
    }
  }

  /// Whether days in this status count against availability.
  pub fn is_shortage(self) -> bool {
    !matches!(self, Self::Disponible)
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Rupture => "Rupture",
      Self::Tension => "Tension",
      Self::Arret => "Arret",
      Self::Disponible => "Disponible",
    };
    f.write_str(s)
  }
}

// ---------------------------------------------------------------------------
// Interval model
// ---------------------------------------------------------------------------

/// Stable product key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl From<&str> for ProductId {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

impl From<InboundId> for ProductId {
  fn from(id: InboundId) -> Self {
    match id {
      InboundId::Number(n) => Self(n.to_string()),
      InboundId::Text(s) => Self(s.trim().to_string()),
    }
  }
}

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// One reported period during which a product held a status.
///
/// Invariant: `start_date <= calculated_end_date`, and `end_date <= calculated_end_date`
/// when present. Only constructible through [`Incident::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
  product_id: ProductId,
  status: Status,
  start_date: NaiveDate,
  end_date: Option<NaiveDate>,
  calculated_end_date: NaiveDate,
  cis_codes: Vec<String>,
}

impl Incident {
  pub fn new(
    product_id: ProductId,
    status: Status,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    calculated_end_date: NaiveDate,
  ) -> Result<Self, EngineError> {
    if start_date > calculated_end_date {
      return Err(EngineError::validation(
        "start_date",
        &format!("{} is after calculated_end_date {}", start_date, calculated_end_date),
      ));
    }
    if let Some(end) = end_date {
      if end > calculated_end_date {
        return Err(EngineError::validation(
          "end_date",
          &format!("{} is after calculated_end_date {}", end, calculated_end_date),
        ));
      }
      if end < start_date {
        return Err(EngineError::validation(
          "end_date",
          &format!("{} is before start_date {}", end, start_date),
        ));
      }
    }
    Ok(Self {
      product_id,
      status,
      start_date,
      end_date,
      calculated_end_date,
      cis_codes: Vec::new(),
    })
  }

  pub fn with_cis_codes(mut self, cis_codes: Vec<String>) -> Self {
    self.cis_codes = cis_codes;
    self
  }

  pub fn product_id(&self) -> &ProductId {
    &self.product_id
  }

  pub fn status(&self) -> Status {
    self.status
  }

  pub fn start_date(&self) -> NaiveDate {
    self.start_date
  }

  pub fn end_date(&self) -> Option<NaiveDate> {
    self.end_date
  }

  pub fn calculated_end_date(&self) -> NaiveDate {
    self.calculated_end_date
  }

  /// Number of specialties this incident covers (at least one).
  pub fn specialty_count(&self) -> u32 {
    self.cis_codes.len().max(1) as u32
  }

  /// Started on or before `date` and not ended before it. An open discontinuation
  /// has no recovery signal and stays active; any other incident is bounded by
  /// `calculated_end_date`.
  pub fn is_active_at(&self, date: NaiveDate) -> bool {
    self.start_date <= date && (self.is_open_arret() || self.calculated_end_date >= date)
  }

  fn is_open_arret(&self) -> bool {
    self.status == Status::Arret && self.end_date.is_none()
  }

  /// Effective end for window clipping. An open discontinuation runs up to the
  /// report date, never beyond it.
  pub fn effective_end(&self, report_date: NaiveDate) -> NaiveDate {
    if self.is_open_arret() {
      report_date
    } else {
      self.calculated_end_date
    }
  }
}

/// A product and its incidents, ordered by `start_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
  pub id: ProductId,
  pub incidents: Vec<Incident>,
}

impl Product {
  pub fn new(id: ProductId, mut incidents: Vec<Incident>) -> Self {
    incidents.sort_by_key(|i| i.start_date);
    Self { id, incidents }
  }
}

// ---------------------------------------------------------------------------
// Engine outputs
// ---------------------------------------------------------------------------

/// Current status of one product at the report date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
  pub status: Status,
  /// Whether an incident is active at the report date.
  pub is_active: bool,
  /// Start of the winning active incident.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub since: Option<NaiveDate>,
}

/// Inclusive sub-interval of an incident inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl Clip {
  /// Inclusive day count: both endpoints are days in the interval.
  pub fn days(&self) -> i64 {
    (self.end - self.start).num_days() + 1
  }
}

/// Day counts per status over one window or year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusDays {
  pub rupture: i64,
  pub tension: i64,
  pub arret: i64,
  /// Derived as `total - rupture - tension - arret`.
  pub disponible: i64,
  /// Calendar days in the window, independent of incident data.
  pub total: i64,
}

/// Aggregated availability over an analysis window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
  pub per_year: BTreeMap<i32, StatusDays>,
  pub totals: StatusDays,
  /// 0..=100, penalty-based.
  pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
  Started,
  Ended,
}

/// Most relevant status change of a product inside the recency window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecentChange {
  #[serde(rename = "type")]
  pub kind: ChangeKind,
  pub status: Status,
  pub date: NaiveDate,
}

/// Rupture/tension counts on the first day of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
  pub month: NaiveDate,
  pub rupture: u32,
  pub tension: u32,
}

/// Number of products currently in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
  pub rupture: u32,
  pub tension: u32,
  pub arret: u32,
  pub disponible: u32,
}

impl StatusBreakdown {
  pub fn record(&mut self, status: Status) {
    match status {
      Status::Rupture => self.rupture += 1,
      Status::Tension => self.tension += 1,
      Status::Arret => self.arret += 1,
      Status::Disponible => self.disponible += 1,
    }
  }
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
  pub product_id: ProductId,
  pub status: Status,
  pub is_active: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub since: Option<NaiveDate>,
  /// Inclusive days from `since` to the report date.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub days_in_status: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub recent_change: Option<RecentChange>,
  pub availability: Availability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub report_date: NaiveDate,
  pub window: Window,
  pub products: Vec<ProductSummary>,
  pub breakdown: StatusBreakdown,
  pub monthly: Vec<MonthlyCount>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub line: Option<usize>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
      line: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }

  pub fn with_line(mut self, line: usize) -> Self {
    self.line = Some(line);
    self
  }
}
