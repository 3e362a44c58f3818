use super::InvoiceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deferred work executed by the host job runner.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum Job {
    /// Strip the mobile donation lines merged into a sponsorship invoice when
    /// the donor never completed the payment.
    RemoveMobileDonationIfNotPaid { invoice_id: InvoiceId },
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ScheduledJob {
    pub eta: DateTime<Utc>,
    pub job: Job,
}

impl ScheduledJob {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.eta <= now
    }
}
