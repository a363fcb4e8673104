use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use super::clock::Clock;
use super::dispatcher::Notifier;
use super::renderer::{self, Payslip};
use super::store::{DocumentHandle, DocumentStore};
use crate::error::BatchRejection;
use crate::model::employee::Employee;
use crate::repository::EmployeeRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Render,
    Store,
    Dispatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Delivered,
    Failed,
}

/// What happened to one employee during a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeOutcome {
    pub employee_id: Option<u64>,
    pub status: OutcomeStatus,
    /// Set once the document has been stored, even if the email later failed.
    pub document: Option<DocumentHandle>,
    pub failed_stage: Option<Stage>,
    pub reason: Option<String>,
}

impl EmployeeOutcome {
    fn delivered(employee_id: u64, document: DocumentHandle) -> Self {
        Self {
            employee_id: Some(employee_id),
            status: OutcomeStatus::Delivered,
            document: Some(document),
            failed_stage: None,
            reason: None,
        }
    }

    fn failed(
        employee_id: Option<u64>,
        stage: Stage,
        reason: String,
        document: Option<DocumentHandle>,
    ) -> Self {
        Self {
            employee_id,
            status: OutcomeStatus::Failed,
            document,
            failed_stage: Some(stage),
            reason: Some(reason),
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.status == OutcomeStatus::Delivered
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct BatchReport {
    pub processed: usize,
    pub delivered: usize,
    pub failed: usize,
    pub outcomes: Vec<EmployeeOutcome>,
}

impl BatchReport {
    fn record(&mut self, outcome: EmployeeOutcome) {
        self.processed += 1;
        if outcome.is_delivered() {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}

/// Generates, stores and emails payslips for a set of employees.
///
/// Every employee goes through render, store and dispatch in roster order.
/// A failure at any stage is logged and recorded, then the batch moves on.
/// Nothing is checkpointed: a rerun regenerates and resends everything.
pub struct PayrollBatch {
    roster: Arc<dyn EmployeeRepository>,
    store: Arc<dyn DocumentStore>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    payroll_time: NaiveTime,
}

impl PayrollBatch {
    pub fn new(
        roster: Arc<dyn EmployeeRepository>,
        store: Arc<dyn DocumentStore>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
        payroll_time: NaiveTime,
    ) -> Self {
        Self {
            roster,
            store,
            notifier,
            clock,
            payroll_time,
        }
    }

    pub fn payroll_time(&self) -> NaiveTime {
        self.payroll_time
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// True only during the exact payroll minute (seconds ignored).
    pub fn within_window(&self, now: NaiveDateTime) -> bool {
        now.hour() == self.payroll_time.hour() && now.minute() == self.payroll_time.minute()
    }

    /// Daily run over the whole roster. Roster read failures yield an empty report.
    #[instrument(name = "scheduled_payroll", skip(self))]
    pub async fn run_scheduled_batch(&self) -> BatchReport {
        let employees = match self.roster.list().await {
            Ok(employees) => employees,
            Err(e) => {
                error!(error = %e, "Could not load roster, scheduled payroll skipped");
                return BatchReport::default();
            }
        };

        info!(employees = employees.len(), "Scheduled payroll started");
        let mut report = BatchReport::default();
        for employee in &employees {
            let outcome = match renderer::render(employee) {
                Ok(payslip) => self.deliver(employee, payslip).await,
                Err(e) => {
                    warn!(error = %e, "Payslip generation failed");
                    EmployeeOutcome::failed(Some(employee.id), Stage::Render, e.to_string(), None)
                }
            };
            report.record(outcome);
        }

        info!(
            processed = report.processed,
            delivered = report.delivered,
            failed = report.failed,
            "Scheduled payroll finished"
        );
        report
    }

    /// Ad-hoc run over an explicit list of raw employee records.
    ///
    /// Rejected without side effects when the payload is missing, not a list,
    /// or empty, and when called outside the payroll minute.
    #[instrument(name = "on_demand_payroll", skip_all)]
    pub async fn run_on_demand_batch(&self, payload: Value) -> Result<BatchReport, BatchRejection> {
        let employees = match payload {
            Value::Null => {
                return Err(BatchRejection::Validation(
                    "Datos incompletos en la solicitud".to_string(),
                ));
            }
            Value::Array(employees) => employees,
            _ => {
                return Err(BatchRejection::Validation(
                    "Se esperaba una lista de empleados".to_string(),
                ));
            }
        };

        if employees.is_empty() {
            return Err(BatchRejection::Validation(
                "No se proporcionaron empleados para procesar".to_string(),
            ));
        }

        let now = self.clock.now();
        if !self.within_window(now) {
            warn!(now = %now, "On-demand payroll outside the payroll minute");
            return Err(BatchRejection::TimeGate {
                now: now.time(),
                window: self.payroll_time,
            });
        }

        info!(employees = employees.len(), "On-demand payroll started");
        let mut report = BatchReport::default();
        for value in &employees {
            let outcome = match renderer::render_value(value) {
                Ok((employee, payslip)) => self.deliver(&employee, payslip).await,
                Err(e) => {
                    warn!(error = %e, "Payslip generation failed");
                    EmployeeOutcome::failed(e.employee_id, Stage::Render, e.cause, None)
                }
            };
            report.record(outcome);
        }

        info!(
            processed = report.processed,
            delivered = report.delivered,
            failed = report.failed,
            "On-demand payroll finished"
        );
        Ok(report)
    }

    async fn deliver(&self, employee: &Employee, payslip: Payslip) -> EmployeeOutcome {
        let handle = match self
            .store
            .write(&payslip.document_name, payslip.content.as_bytes())
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!(employee_id = employee.id, error = %e, "Payslip could not be stored");
                return EmployeeOutcome::failed(
                    Some(employee.id),
                    Stage::Store,
                    e.to_string(),
                    None,
                );
            }
        };
        info!(
            employee_id = payslip.employee_id,
            total_a_pagar = payslip.totals.total_a_pagar,
            document = %handle,
            "Payslip generated"
        );

        match self.notifier.notify(employee, &handle).await {
            Ok(()) => EmployeeOutcome::delivered(employee.id, handle),
            Err(e) => {
                warn!(employee_id = employee.id, error = %e, "Payslip email failed");
                EmployeeOutcome::failed(
                    Some(employee.id),
                    Stage::Dispatch,
                    e.to_string(),
                    Some(handle),
                )
            }
        }
    }
}
