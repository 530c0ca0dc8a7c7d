//! Flag products whose status changed within a trailing window of days.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

use crate::types::{ChangeKind, Incident, ProductId, RecentChange, Status};
use crate::window::Window;

/// Recent status changes per product within `[report_date - window_days, report_date]`.
///
/// A start counts when `start_date` is in the window; an end counts only when an
/// explicit `end_date` is in the window. When both exist for a product, `Ended`
/// is reported only if strictly more recent; an exact tie goes to `Started`.
/// Among changes on the same date the highest-priority status is reported.
pub fn detect_recent_changes(
  incidents: &[Incident],
  report_date: NaiveDate,
  window_days: u32,
) -> BTreeMap<ProductId, RecentChange> {
  let window_start = report_date
    .checked_sub_days(Days::new(u64::from(window_days)))
    .unwrap_or(NaiveDate::MIN);
  let Ok(window) = Window::since(window_start, report_date) else {
    return BTreeMap::new();
  };
  let in_window = |date: NaiveDate| window.contains(date);

  let mut started: BTreeMap<&ProductId, (NaiveDate, Status)> = BTreeMap::new();
  let mut ended: BTreeMap<&ProductId, (NaiveDate, Status)> = BTreeMap::new();

  for incident in incidents {
    if in_window(incident.start_date()) {
      keep_latest(&mut started, incident.product_id(), incident.start_date(), incident.status());
    }
    if let Some(end) = incident.end_date().filter(|&e| in_window(e)) {
      keep_latest(&mut ended, incident.product_id(), end, incident.status());
    }
  }

  let mut out: BTreeMap<ProductId, RecentChange> = BTreeMap::new();
  for (product, (date, status)) in &started {
    out.insert((*product).clone(), RecentChange {
      kind: ChangeKind::Started,
      status: *status,
      date: *date,
    });
  }
  for (product, (date, status)) in ended {
    let newer = started.get(product).map_or(true, |(start, _)| date > *start);
    if newer {
      out.insert(product.clone(), RecentChange {
        kind: ChangeKind::Ended,
        status,
        date,
      });
    }
  }
  out
}

/// Keep the latest date per product; on equal dates keep the higher-priority status.
fn keep_latest<'a>(
  seen: &mut BTreeMap<&'a ProductId, (NaiveDate, Status)>,
  product: &'a ProductId,
  date: NaiveDate,
  status: Status,
) {
  let entry = seen.entry(product).or_insert((date, status));
  if date > entry.0 || (date == entry.0 && status < entry.1) {
    *entry = (date, status);
  }
}
