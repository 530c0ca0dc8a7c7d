//! Monthly rupture/tension counts for the summary chart.

use crate::types::{Incident, MonthlyCount, Status};
use crate::window::Window;

/// For each first-of-month inside `window`, count the rupture and tension
/// incidents covering that day, weighted by the specialties each covers.
pub fn monthly_counts(incidents: &[Incident], window: &Window) -> Vec<MonthlyCount> {
  window
    .month_starts()
    .into_iter()
    .map(|month| {
      let mut count = MonthlyCount {
        month,
        rupture: 0,
        tension: 0,
      };
      for incident in incidents {
        if incident.start_date() > month || incident.calculated_end_date() < month {
          continue;
        }
        match incident.status() {
          Status::Rupture => count.rupture += incident.specialty_count(),
          Status::Tension => count.tension += incident.specialty_count(),
          Status::Arret | Status::Disponible => {}
        }
      }
      count
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  #[test]
  fn counts_incidents_covering_month_start() {
    let incs = vec![
      Incident::new("a".into(), Status::Rupture, d(2024, 1, 10), None, d(2024, 3, 1)).unwrap(),
      Incident::new("b".into(), Status::Tension, d(2024, 1, 1), Some(d(2024, 2, 1)), d(2024, 2, 1))
        .unwrap()
        .with_cis_codes(vec!["60001".into(), "60002".into()]),
      Incident::new("c".into(), Status::Arret, d(2023, 1, 1), None, d(2024, 3, 1)).unwrap(),
    ];
    let window = Window::new(d(2024, 1, 1), d(2024, 3, 31)).unwrap();
    let counts = monthly_counts(&incs, &window);

    assert_eq!(counts.len(), 3);
    assert_eq!((counts[0].month, counts[0].rupture, counts[0].tension), (d(2024, 1, 1), 0, 2));
    assert_eq!((counts[1].rupture, counts[1].tension), (1, 2));
    assert_eq!((counts[2].rupture, counts[2].tension), (1, 0));
  }

  #[test]
  fn window_without_month_start_is_empty() {
    let window = Window::new(d(2024, 1, 2), d(2024, 1, 30)).unwrap();
    assert!(monthly_counts(&[], &window).is_empty());
  }
}
