// src/run/mod.rs
//! One execution of the pipeline, from candidate fetch to operator report.

mod orchestrator;
mod report;

pub use orchestrator::{RunOrchestrator, RunOutcome, RunState};
pub use report::{OrderFailure, OrderOutcome, ProcessingStep, RunReport, Severity};
