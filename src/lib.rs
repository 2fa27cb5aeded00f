//! Evolutionary spider-web simulation: a web is a radial skeleton plus
//! concentric trapping rings, scored by how many flies it catches for how
//! much silk, and improved generation by generation through mutation and
//! selection.

pub mod config;
pub mod error;
pub mod fitness;
pub mod fly;
pub mod geometry;
pub mod mutation;
pub mod reporting;
pub mod reproduction;
pub mod simulation;
pub mod skeleton;
pub mod snapshot;
pub mod stats;
pub mod trapping_net;
pub mod web;

pub use config::{ConfigError, WebConfig};
pub use error::{EngineError, InvariantViolation, Result};
pub use fitness::{Fitness, ScoringPolicy};
pub use mutation::MutationKind;
pub use reporting::RunReport;
pub use reproduction::{reproduce, select_best};
pub use simulation::{Progress, Simulation, StepOutcome};
pub use snapshot::WebSnapshot;
pub use web::Web;
