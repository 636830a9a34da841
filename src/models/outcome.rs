use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{contact::Contact, status::OutcomeStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub contact: Contact,
    pub status: OutcomeStatus,
    pub detail: String,
}

impl SendOutcome {
    pub fn sent(contact: Contact) -> Self {
        Self {
            contact,
            status: OutcomeStatus::Sent,
            detail: "Email sent successfully".to_string(),
        }
    }

    pub fn failed(contact: Contact, detail: impl Into<String>) -> Self {
        Self {
            contact,
            status: OutcomeStatus::Failed,
            detail: detail.into(),
        }
    }

    pub fn cancelled(contact: Contact) -> Self {
        Self {
            contact,
            status: OutcomeStatus::Cancelled,
            detail: "cancelled".to_string(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == OutcomeStatus::Sent
    }
}

#[derive(Debug, Default)]
pub struct OutcomeLedger {
    outcomes: Vec<SendOutcome>,
}

impl OutcomeLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, outcome: SendOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn into_outcomes(self) -> Vec<SendOutcome> {
        self.outcomes
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    pub campaign_id: Uuid,
    pub outcomes: Vec<SendOutcome>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CampaignReport {
    /// Counts are folded from the outcomes, so `total == successful + failed`
    /// holds by construction. Cancelled contacts are part of `failed`.
    pub fn from_outcomes(
        campaign_id: Uuid,
        outcomes: Vec<SendOutcome>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let (successful, cancelled) =
            outcomes
                .iter()
                .fold((0, 0), |(ok, cancelled), outcome| match outcome.status {
                    OutcomeStatus::Sent => (ok + 1, cancelled),
                    OutcomeStatus::Cancelled => (ok, cancelled + 1),
                    OutcomeStatus::Failed => (ok, cancelled),
                });

        let total = outcomes.len();

        Self {
            campaign_id,
            outcomes,
            total,
            successful,
            failed: total - successful,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failed_contacts(&self) -> impl Iterator<Item = &Contact> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.succeeded())
            .map(|outcome| &outcome.contact)
    }
}
