// src/run/orchestrator.rs
//! Drives one run: fetch candidates, confirm each order in isolation,
//! aggregate the outcomes, hand the report to the notifier.

use super::report::{OrderFailure, OrderOutcome, ProcessingStep, RunReport};
use crate::model::CandidateOrder;
use crate::notify::NotificationReceipt;
use crate::pipeline::{CustomerMailer, EmailComposer, OrderSource, RunNotifier};
use chrono::Local;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Lifecycle of a run. `Done` and `FatalFailure` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    FetchingOrders,
    ProcessingOrders,
    Reporting,
    Done,
    FatalFailure,
}

/// What a finished run leaves behind.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub final_state: RunState,
    pub notification: NotificationReceipt,
}

impl RunOutcome {
    pub fn is_fatal(&self) -> bool {
        self.final_state == RunState::FatalFailure
    }
}

/// Runs the shipment-confirmation pipeline over injected collaborators.
pub struct RunOrchestrator {
    source: Arc<dyn OrderSource>,
    composer: Arc<dyn EmailComposer>,
    mailer: Arc<dyn CustomerMailer>,
    notifier: Arc<dyn RunNotifier>,
    run_id: Uuid,
    state: RunState,
}

impl RunOrchestrator {
    pub fn new(
        source: Arc<dyn OrderSource>,
        composer: Arc<dyn EmailComposer>,
        mailer: Arc<dyn CustomerMailer>,
        notifier: Arc<dyn RunNotifier>,
    ) -> Self {
        Self {
            source,
            composer,
            mailer,
            notifier,
            run_id: Uuid::new_v4(),
            state: RunState::Idle,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("Run {}: {:?} -> {:?}", self.run_id, self.state, next);
        self.state = next;
    }

    /// Executes the full run. Never fails: every error ends up in the report.
    pub async fn run(&mut self) -> RunOutcome {
        let started_at = Local::now();
        log::info!("{}", "=".repeat(80));
        log::info!("Starting shipment confirmation run {}", self.run_id);
        log::info!("{}", "=".repeat(80));

        self.transition(RunState::FetchingOrders);
        let listing = match self.source.fetch_shippable_orders().await {
            Ok(listing) => listing,
            Err(e) => {
                log::error!("Error fetching orders pending shipment: {}", e);
                self.transition(RunState::FatalFailure);
                let report = RunReport::fatal(self.run_id, started_at, e.to_string());
                let notification = self.notifier.notify(&report).await;
                return RunOutcome {
                    report,
                    final_state: self.state,
                    notification,
                };
            }
        };

        if listing.is_empty() {
            log::info!("No orders pending shipment confirmation");
        }

        self.transition(RunState::ProcessingOrders);
        let mut outcomes = Vec::with_capacity(listing.len());
        for row in &listing.unreadable {
            let failure = OrderFailure {
                order_id: row.id,
                reference: row.reference.clone(),
                step: ProcessingStep::ReadOrder,
                message: row.reason.clone(),
            };
            log::error!("{}", failure);
            outcomes.push(OrderOutcome::Failed(failure));
        }
        for candidate in &listing.candidates {
            outcomes.push(self.process_order(candidate).await);
        }

        self.transition(RunState::Reporting);
        let report = RunReport::from_outcomes(self.run_id, started_at, outcomes);
        let notification = self.notifier.notify(&report).await;

        log::info!("{}", "=".repeat(80));
        log::info!(
            "Run complete - processed: {}, succeeded: {}, failed: {}",
            report.total_candidates,
            report.succeeded,
            report.failed
        );
        log::info!("{}", "=".repeat(80));

        self.transition(RunState::Done);
        RunOutcome {
            report,
            final_state: self.state,
            notification,
        }
    }

    /// Processes one order inside its own error boundary.
    pub async fn process_order(&self, candidate: &CandidateOrder) -> OrderOutcome {
        log::info!(
            "Processing order {} (ID: {}) - tracking: {}",
            candidate.reference(),
            candidate.id(),
            candidate.tracking_number
        );

        match self.confirm_shipment(candidate).await {
            Ok(()) => {
                log::info!("Order {} processed", candidate.reference());
                OrderOutcome::Shipped {
                    order_id: candidate.id(),
                    reference: candidate.reference().to_string(),
                }
            }
            Err(failure) => {
                log::error!("{}", failure);
                OrderOutcome::Failed(failure)
            }
        }
    }

    async fn confirm_shipment(&self, candidate: &CandidateOrder) -> Result<(), OrderFailure> {
        let customer = self
            .source
            .fetch_customer(candidate.order.customer_id)
            .await
            .map_err(at_step(candidate, ProcessingStep::FetchCustomer))?;

        let address = self
            .source
            .fetch_address(candidate.order.address_id)
            .await
            .map_err(at_step(candidate, ProcessingStep::FetchAddress))?;

        let email = self
            .composer
            .render(candidate, &customer, &address, &candidate.tracking_number)
            .await
            .map_err(at_step(candidate, ProcessingStep::RenderTemplate))?;

        self.mailer
            .send_shipment_email(&customer, &email)
            .await
            .map_err(at_step(candidate, ProcessingStep::SendEmail))?;

        self.source
            .advance_order_status(candidate.id())
            .await
            .map_err(|e| {
                log::warn!(
                    "Email sent but order {} state could not be updated",
                    candidate.id()
                );
                at_step(candidate, ProcessingStep::StatusUpdate)(e)
            })?;

        Ok(())
    }
}

/// Converts a step error into the order's failure record.
fn at_step<E: fmt::Display>(
    candidate: &CandidateOrder,
    step: ProcessingStep,
) -> impl FnOnce(E) -> OrderFailure + '_ {
    move |error| OrderFailure {
        order_id: candidate.id(),
        reference: candidate.reference().to_string(),
        step,
        message: error.to_string(),
    }
}
