//! Clip an incident's effective interval against a window.

use chrono::NaiveDate;

use crate::types::{Clip, Incident};
use crate::window::Window;

/// Intersection of the incident's `[start_date, effective_end]` with `window`.
///
/// Returns `None` when they do not overlap. `report_date` only matters for open
/// discontinuations, which run up to it.
pub fn clip(incident: &Incident, window: &Window, report_date: NaiveDate) -> Option<Clip> {
  let effective_end = incident.effective_end(report_date);
  if effective_end < window.start() || incident.start_date() > window.end() {
    return None;
  }
  let start = incident.start_date().max(window.start());
  let end = effective_end.min(window.end());
  // Open discontinuation evaluated before it started.
  if end < start {
    return None;
  }
  Some(Clip { start, end })
}
