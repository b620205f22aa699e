use chrono::{NaiveDate, Utc};
use futures_util::future::try_join3;
use serde::Serialize;
use uuid::Uuid;

use super::{StoreError, TableStore, emails, invoices, tasks};
use crate::models::{Email, Invoice, InvoiceState, Task, TaskPhase};

const RECENT_EMAILS: usize = 5;
const DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub emails: EmailSummary,
    pub invoices: InvoiceSummary,
    pub tasks: TaskSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailSummary {
    pub total: usize,
    pub recent: Vec<Email>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummary {
    pub total: usize,
    pub pending: usize,
    pub classified: usize,
    pub total_amount: f64,
    pub pending_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseCounts {
    pub design: usize,
    pub purchase: usize,
    pub installation: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub by_phase: PhaseCounts,
    /// Due today or within the next seven days.
    pub due_soon: usize,
}

impl DashboardSummary {
    /// `emails` are expected newest first, as [`emails::list`] returns them.
    pub fn from_records(
        emails: Vec<Email>,
        invoices: &[Invoice],
        tasks: &[Task],
        today: NaiveDate,
    ) -> Self {
        let email_total = emails.len();
        let recent = emails.into_iter().take(RECENT_EMAILS).collect();

        let pending: Vec<&Invoice> = invoices
            .iter()
            .filter(|i| i.state == InvoiceState::Pending)
            .collect();

        let mut by_phase = PhaseCounts::default();
        for task in tasks {
            match task.phase {
                TaskPhase::Design => by_phase.design += 1,
                TaskPhase::Purchase => by_phase.purchase += 1,
                TaskPhase::Installation => by_phase.installation += 1,
            }
        }

        let due_soon = tasks
            .iter()
            .filter(|t| (0..=DUE_SOON_DAYS).contains(&t.days_until_due(today)))
            .count();

        DashboardSummary {
            emails: EmailSummary {
                total: email_total,
                recent,
            },
            invoices: InvoiceSummary {
                total: invoices.len(),
                pending: pending.len(),
                classified: invoices
                    .iter()
                    .filter(|i| i.state == InvoiceState::Classified)
                    .count(),
                total_amount: invoices.iter().map(|i| i.amount).sum(),
                pending_amount: pending.iter().map(|i| i.amount).sum(),
            },
            tasks: TaskSummary {
                total: tasks.len(),
                by_phase,
                due_soon,
            },
        }
    }
}

/// Fetch the user's emails, invoices and tasks concurrently and reduce them.
/// Any failed listing fails the whole summary.
pub async fn load(store: &dyn TableStore, user_id: Uuid) -> Result<DashboardSummary, StoreError> {
    let (emails, invoices, tasks) = try_join3(
        emails::list(store, Some(user_id)),
        invoices::list(store, Some(user_id), None),
        tasks::list(store, Some(user_id), None),
    )
    .await
    .inspect_err(|e| tracing::error!("Error loading dashboard summary for {user_id}: {e}"))?;

    Ok(DashboardSummary::from_records(
        emails,
        &invoices,
        &tasks,
        Utc::now().date_naive(),
    ))
}
