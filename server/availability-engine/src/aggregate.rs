//! Day-count aggregation per status and calendar year, and the availability score.
//!
//! Each day of a window is attributed at most once, to the highest-priority
//! shortage status covering it. Available days are derived from the calendar,
//! never summed from `Disponible` incidents.

use chrono::{Datelike, NaiveDate};

use crate::clip::clip;
use crate::config::ScoreWeights;
use crate::types::{Availability, Incident, Status, StatusDays};
use crate::window::Window;

/// Aggregate a product's incidents over `window` and each calendar year inside it.
pub fn aggregate(
  incidents: &[Incident],
  window: &Window,
  report_date: NaiveDate,
  weights: &ScoreWeights,
) -> Availability {
  let per_year = window
    .years()
    .into_iter()
    .map(|(year, sub)| (year, tally(incidents, &sub, report_date)))
    .collect();
  let totals = tally(incidents, window, report_date);
  let score = score(&totals, weights);

  Availability {
    per_year,
    totals,
    score,
  }
}

/// Status day counts for a single window.
pub fn tally(incidents: &[Incident], window: &Window, report_date: NaiveDate) -> StatusDays {
  // Half-open [from, to) spans in day ordinals.
  let spans: Vec<(Status, i64, i64)> = incidents
    .iter()
    .filter(|i| i.status().is_shortage())
    .filter_map(|i| {
      clip(i, window, report_date).map(|c| (i.status(), ordinal(c.start), ordinal(c.end) + 1))
    })
    .collect();

  let mut cuts: Vec<i64> = spans.iter().flat_map(|&(_, from, to)| [from, to]).collect();
  cuts.sort_unstable();
  cuts.dedup();

  let mut days = StatusDays {
    total: window.days(),
    ..StatusDays::default()
  };

  // Every span boundary is a cut, so coverage is constant within a segment.
  for segment in cuts.windows(2) {
    let (from, to) = (segment[0], segment[1]);
    let covering = spans
      .iter()
      .filter(|&&(_, start, end)| start <= from && from < end)
      .map(|&(status, _, _)| status)
      .min();
    match covering {
      Some(Status::Rupture) => days.rupture += to - from,
      Some(Status::Tension) => days.tension += to - from,
      Some(Status::Arret) => days.arret += to - from,
      Some(Status::Disponible) | None => {}
    }
  }

  days.disponible = days.total - days.rupture - days.tension - days.arret;
  days
}

/// `100 * (total - weighted shortage days) / total`, clamped to `[0, 100]`.
pub fn score(days: &StatusDays, weights: &ScoreWeights) -> f64 {
  if days.total <= 0 {
    return 100.0;
  }
  let penalty = weights.rupture * days.rupture as f64
    + weights.arret * days.arret as f64
    + weights.tension * days.tension as f64;
  let total = days.total as f64;
  (100.0 * (total - penalty) / total).clamp(0.0, 100.0)
}

fn ordinal(date: NaiveDate) -> i64 {
  i64::from(date.num_days_from_ce())
}
