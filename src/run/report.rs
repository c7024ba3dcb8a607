// src/run/report.rs
//! Per-order outcomes and the aggregate run report.

use crate::types::OrderId;
use chrono::{DateTime, Local};
use std::fmt;
use uuid::Uuid;

/// The per-order step that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStep {
    /// The listing row itself could not be read.
    ReadOrder,
    FetchCustomer,
    FetchAddress,
    RenderTemplate,
    SendEmail,
    StatusUpdate,
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOrder => write!(f, "read order"),
            Self::FetchCustomer => write!(f, "fetch customer"),
            Self::FetchAddress => write!(f, "fetch address"),
            Self::RenderTemplate => write!(f, "render template"),
            Self::SendEmail => write!(f, "send email"),
            Self::StatusUpdate => write!(f, "status update"),
        }
    }
}

/// Why one order could not be confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFailure {
    pub order_id: OrderId,
    pub reference: String,
    pub step: ProcessingStep,
    pub message: String,
}

impl fmt::Display for OrderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order {} ({}) failed at {}: {}",
            self.order_id, self.reference, self.step, self.message
        )
    }
}

/// Result of processing one candidate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Shipped { order_id: OrderId, reference: String },
    Failed(OrderFailure),
}

/// How a run went, from the operators' point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Success,
    Warning,
    Critical,
}

impl Severity {
    /// Severity of a run that got its candidate list. Per-order failures
    /// are never worse than a warning; only losing the list is critical.
    pub fn classify(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) => Self::Success,
            // zero successes still only warns
            (_, _) => Self::Warning,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Summary of one run, consumed by the internal notifier.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub total_candidates: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<OrderFailure>,
    pub severity: Severity,
    /// Set when the run never got a candidate list.
    pub fatal_cause: Option<String>,
}

impl RunReport {
    /// Aggregates the outcomes of a run that fetched its candidates.
    pub fn from_outcomes(
        run_id: Uuid,
        started_at: DateTime<Local>,
        outcomes: Vec<OrderOutcome>,
    ) -> Self {
        let total_candidates = outcomes.len();
        let failures: Vec<OrderFailure> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                OrderOutcome::Failed(failure) => Some(failure),
                OrderOutcome::Shipped { .. } => None,
            })
            .collect();
        let failed = failures.len();
        let succeeded = total_candidates - failed;

        Self {
            run_id,
            started_at,
            finished_at: Local::now(),
            total_candidates,
            succeeded,
            failed,
            failures,
            severity: Severity::classify(succeeded, failed),
            fatal_cause: None,
        }
    }

    /// Report for a run that could not fetch its candidate list.
    pub fn fatal(run_id: Uuid, started_at: DateTime<Local>, cause: impl Into<String>) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: Local::now(),
            total_candidates: 0,
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
            severity: Severity::Critical,
            fatal_cause: Some(cause.into()),
        }
    }

    /// True when the run fetched its list and there was nothing on it.
    pub fn is_empty(&self) -> bool {
        self.fatal_cause.is_none() && self.total_candidates == 0
    }

    /// Percentage of candidates confirmed, if any were processed.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_candidates == 0 {
            None
        } else {
            Some(self.succeeded as f64 * 100.0 / self.total_candidates as f64)
        }
    }

    pub fn title(&self) -> &'static str {
        match self.severity {
            Severity::Success => "Shipment run completed successfully",
            Severity::Warning => "Shipment run completed with errors",
            Severity::Critical => "Failed to query the commerce API",
        }
    }

    /// Human-readable body shared by every notification channel.
    pub fn summary_text(&self) -> String {
        if let Some(cause) = &self.fatal_cause {
            return format!(
                "Could not fetch orders pending shipment from the commerce API: {}",
                cause
            );
        }

        let mut text = format!(
            "Shipment processing completed:\n- Total orders: {}\n- Succeeded: {}\n- Failed: {}",
            self.total_candidates, self.succeeded, self.failed
        );
        if let Some(rate) = self.success_rate() {
            text.push_str(&format!("\n- Success rate: {:.1}%", rate));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shipped(id: u64) -> OrderOutcome {
        OrderOutcome::Shipped {
            order_id: OrderId::new(id).unwrap(),
            reference: format!("REF{}", id),
        }
    }

    fn failed(id: u64, step: ProcessingStep) -> OrderOutcome {
        OrderOutcome::Failed(OrderFailure {
            order_id: OrderId::new(id).unwrap(),
            reference: format!("REF{}", id),
            step,
            message: "boom".to_string(),
        })
    }

    #[test]
    fn severity_policy() {
        assert_eq!(Severity::classify(0, 0), Severity::Success);
        assert_eq!(Severity::classify(3, 0), Severity::Success);
        assert_eq!(Severity::classify(2, 1), Severity::Warning);
        assert_eq!(Severity::classify(0, 4), Severity::Warning);
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Success);
    }

    #[test]
    fn report_counts_outcomes() {
        let report = RunReport::from_outcomes(
            Uuid::new_v4(),
            Local::now(),
            vec![shipped(1), failed(2, ProcessingStep::StatusUpdate), shipped(3)],
        );
        assert_eq!(report.total_candidates, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.severity, Severity::Warning);
        assert_eq!(report.failures[0].step, ProcessingStep::StatusUpdate);
        assert!(report.summary_text().contains("Success rate: 66.7%"));
    }

    #[test]
    fn empty_run_is_success_without_rate() {
        let report = RunReport::from_outcomes(Uuid::new_v4(), Local::now(), Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.severity, Severity::Success);
        assert_eq!(report.success_rate(), None);
    }

    #[test]
    fn fatal_report_is_critical() {
        let report = RunReport::fatal(Uuid::new_v4(), Local::now(), "connection refused");
        assert_eq!(report.severity, Severity::Critical);
        assert!(!report.is_empty());
        assert_eq!(report.total_candidates, 0);
        assert!(report.summary_text().contains("connection refused"));
    }

    #[test]
    fn failure_display_names_step() {
        let OrderOutcome::Failed(failure) = failed(9, ProcessingStep::StatusUpdate) else {
            unreachable!()
        };
        assert_eq!(failure.to_string(), "order 9 (REF9) failed at status update: boom");
    }
}
