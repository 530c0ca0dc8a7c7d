//! Current-status classification with a fixed status priority.

use chrono::NaiveDate;

use crate::types::{Classification, Incident, Status};

/// Classify a product's status at `report_date`.
///
/// Among incidents active at the report date, the highest-priority status wins
/// (`Rupture` > `Tension` > `Arret` > `Disponible`). With no active incident the
/// product is `Disponible`. Within the winning status the earliest start is
/// reported as `since`, so the result does not depend on input order.
pub fn classify(incidents: &[Incident], report_date: NaiveDate) -> Classification {
  let winner = incidents
    .iter()
    .filter(|i| i.is_active_at(report_date))
    .min_by_key(|i| (i.status(), i.start_date()));

  match winner {
    Some(incident) => Classification {
      status: incident.status(),
      is_active: true,
      since: Some(incident.start_date()),
    },
    None => Classification {
      status: Status::Disponible,
      is_active: false,
      since: None,
    },
  }
}
