//! Binary entrypoint: read incident JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an InboundIncident. Output lines are:
//! - An ErrorOutput for every line that fails parsing or validation
//! - A single Report once stdin is exhausted
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

use availability_engine::types::ErrorOutput;
use availability_engine::{normalize, Config, Engine, EngineError, InboundIncident};
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .with_target(false)
    .init();

  let config = match Config::from_env() {
    Ok(c) => c,
    Err(e) => {
      error!(error = %e, "invalid configuration");
      std::process::exit(2);
    }
  };

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let engine = Engine::new(config);

  let mut incidents = Vec::new();
  let mut rejected = 0usize;

  for (idx, line) in stdin.lock().lines().enumerate() {
    let line_no = idx + 1;
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        error!(error = %e, "read error");
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let parsed = serde_json::from_str::<InboundIncident>(trimmed)
      .map_err(EngineError::from)
      .and_then(|raw| normalize::normalize(&raw));

    match parsed {
      Ok(incident) => incidents.push(incident),
      Err(e) => {
        rejected += 1;
        warn!(line = line_no, error = %e, "rejected incident row");
        let err = match &e {
          EngineError::Validation { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          _ => ErrorOutput::new(e.to_string()),
        };
        let _ = serde_json::to_writer(&mut out, &err.with_line(line_no));
        let _ = writeln!(out);
      }
    }
  }

  let accepted = incidents.len();
  match engine.report(incidents) {
    Ok(report) => {
      info!(
        accepted,
        rejected,
        products = report.products.len(),
        report_date = %report.report_date,
        "availability report ready"
      );
      let _ = serde_json::to_writer(&mut out, &report);
      let _ = writeln!(out);
    }
    Err(e) => {
      warn!(error = %e, "no report produced");
      let _ = serde_json::to_writer(&mut out, &ErrorOutput::new(e.to_string()));
      let _ = writeln!(out);
    }
  }

  let _ = out.flush();
}
