//! Dispomed Availability State Engine: deterministic, rule-based.
//!
//! Determines each product's current availability status from possibly
//! overlapping, possibly open-ended incidents, clips incidents against analysis
//! windows, aggregates day counts per status and year into an availability
//! score, and flags recent status changes.
//!
//! No DB, no network; pure functions over in-memory incidents.

pub mod aggregate;
pub mod classify;
pub mod clip;
pub mod config;
pub mod engine;
pub mod error;
pub mod monthly;
pub mod normalize;
pub mod recency;
pub mod types;
pub mod window;

pub use aggregate::aggregate;
pub use classify::classify;
pub use clip::clip;
pub use config::{Config, ScoreWeights, WindowSpec};
pub use engine::Engine;
pub use error::EngineError;
pub use recency::detect_recent_changes;
pub use types::{InboundIncident, Incident, Product, ProductId, Report, Status};
pub use window::Window;
