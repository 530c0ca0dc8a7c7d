//! Integration tests for the availability engine.

use availability_engine::normalize::normalize;
use availability_engine::types::{ChangeKind, InboundIncident};
use availability_engine::{
  aggregate, classify, clip, detect_recent_changes, Config, Engine, Incident, ProductId, ScoreWeights,
  Status, Window,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn fixture_rows() -> Vec<InboundIncident> {
  let lines = [
    r#"{"product_id": 101, "status": "Rupture", "start_date": "2024-01-10", "end_date": null, "calculated_end_date": "2024-03-01", "cis_codes": ["60234100", "60234101"]}"#,
    r#"{"product_id": 102, "status": "Tension", "start_date": "2023-12-01", "end_date": "2024-02-27", "calculated_end_date": "2024-02-27"}"#,
    r#"{"product_id": 103, "status": "arret", "start_date": "2022-05-01", "updated_date": "2022-06-01"}"#,
    r#"{"product_id": 104, "status": "Tension", "start_date": "2024-02-27", "last_report_date": "2024-03-01", "unknown_field": true}"#,
    r#"{"product_id": 104, "status": "Rupture", "start_date": "2024-02-28", "end_date": "2024-02-29", "calculated_end_date": "2024-02-29"}"#,
  ];
  lines
    .iter()
    .map(|l| serde_json::from_str(l).unwrap())
    .collect()
}

fn fixture_incidents() -> Vec<Incident> {
  fixture_rows().iter().map(|r| normalize(r).unwrap()).collect()
}

#[test]
fn documented_rupture_scenario() {
  let inc = fixture_incidents().remove(0);
  let report_date = d(2024, 3, 1);

  let current = classify(&[inc.clone()], report_date);
  assert_eq!(current.status, Status::Rupture);
  assert!(current.is_active);

  let window = Window::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
  let c = clip(&inc, &window, report_date).unwrap();
  assert_eq!(c.start, d(2024, 1, 10));
  assert_eq!(c.end, d(2024, 1, 31));
  assert_eq!(c.days(), 22);
}

#[test]
fn open_discontinuation_runs_to_report_date() {
  let inc = fixture_incidents().remove(2);
  assert_eq!(inc.status(), Status::Arret);
  assert_eq!(inc.calculated_end_date(), d(2022, 6, 1));

  let window = Window::new(d(2022, 1, 1), d(2025, 12, 31)).unwrap();
  let c = clip(&inc, &window, d(2024, 1, 1)).unwrap();
  assert_eq!(c.end, d(2024, 1, 1));
}

#[test]
fn full_report_over_json_rows() {
  let report = Engine::with_defaults().report(fixture_incidents()).unwrap();

  assert_eq!(report.report_date, d(2024, 3, 1));
  assert_eq!(report.products.len(), 4);

  // 104: open tension outranks its rupture, which ended before the report date.
  let order: Vec<&str> = report.products.iter().map(|p| p.product_id.0.as_str()).collect();
  assert_eq!(order, vec!["101", "104", "103", "102"]);

  let p104 = &report.products[1];
  assert_eq!(p104.status, Status::Tension);
  let change = p104.recent_change.unwrap();
  assert_eq!(change.kind, ChangeKind::Ended);
  assert_eq!(change.status, Status::Rupture);
  assert_eq!(change.date, d(2024, 2, 29));

  let p102 = &report.products[3];
  assert_eq!(p102.status, Status::Disponible);
  assert_eq!(p102.recent_change.map(|c| c.kind), Some(ChangeKind::Ended));

  for row in &report.products {
    let t = row.availability.totals;
    assert_eq!(t.rupture + t.tension + t.arret + t.disponible, t.total);
    assert!((0.0..=100.0).contains(&row.availability.score));
  }
}

#[test]
fn monthly_counts_weighted_by_specialties() {
  let report = Engine::with_defaults().report(fixture_incidents()).unwrap();
  let feb = report
    .monthly
    .iter()
    .find(|m| m.month == d(2024, 2, 1))
    .unwrap();
  // 101 rupture covers two specialties; 102 tension covers one.
  assert_eq!(feb.rupture, 2);
  assert_eq!(feb.tension, 1);
}

#[test]
fn deterministic_output_across_runs() {
  let s1 = serde_json::to_string(&Engine::with_defaults().report(fixture_incidents()).unwrap()).unwrap();
  let s2 = serde_json::to_string(&Engine::with_defaults().report(fixture_incidents()).unwrap()).unwrap();
  assert_eq!(s1, s2, "Same inputs must produce identical JSON output");
}

#[test]
fn report_json_contract() {
  let report = Engine::with_defaults().report(fixture_incidents()).unwrap();
  let value = serde_json::to_value(&report).unwrap();

  assert_eq!(value["report_date"], "2024-03-01");
  assert_eq!(value["window"]["start"], "2023-03-01");
  assert_eq!(value["products"][0]["status"], "Rupture");
  assert_eq!(value["products"][0]["since"], "2024-01-10");
  assert!(value["products"][0]["availability"]["per_year"]["2024"]["rupture"].is_number());
  assert_eq!(value["products"][1]["recent_change"]["type"], "ended");
  assert_eq!(value["breakdown"]["disponible"], 1);
}

#[test]
fn score_boundaries() {
  let window = Window::calendar_year(2023).unwrap();
  let weights = ScoreWeights::default();

  let clean = aggregate(&[], &window, d(2024, 1, 1), &weights);
  assert_eq!(clean.score, 100.0);

  let whole = Incident::new(ProductId::from("x"), Status::Rupture, d(2023, 1, 1), Some(d(2023, 12, 31)), d(2023, 12, 31)).unwrap();
  assert_eq!(aggregate(&[whole], &window, d(2024, 1, 1), &weights).score, 0.0);
}

#[test]
fn recent_start_three_days_before_report() {
  let report_date = d(2024, 3, 1);
  let inc = Incident::new(ProductId::from("x"), Status::Tension, d(2024, 2, 27), None, report_date).unwrap();
  let changes = detect_recent_changes(&[inc], report_date, 7);
  assert_eq!(changes[&ProductId::from("x")].kind, ChangeKind::Started);
}

#[test]
fn malformed_rows_rejected_at_boundary() {
  let missing_start: InboundIncident =
    serde_json::from_str(r#"{"product_id": "x", "status": "Rupture", "calculated_end_date": "2024-03-01"}"#).unwrap();
  assert!(normalize(&missing_start).unwrap_err().to_string().contains("start_date"));

  let inverted: InboundIncident = serde_json::from_str(
    r#"{"product_id": "x", "status": "Rupture", "start_date": "2024-03-02", "calculated_end_date": "2024-03-01"}"#,
  )
  .unwrap();
  assert!(normalize(&inverted).is_err());

  assert!(Window::new(d(2024, 3, 2), d(2024, 3, 1)).is_err());
}

#[test]
fn config_window_drives_report() {
  let engine = Engine::new(Config {
    window: availability_engine::WindowSpec::TrailingMonths(1),
    ..Config::default()
  });
  let report = engine.report(fixture_incidents()).unwrap();
  assert_eq!(report.window.start(), d(2024, 2, 1));
  assert!(report.products.iter().all(|p| p.availability.totals.total == 30));
}
