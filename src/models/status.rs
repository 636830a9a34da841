use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Sent,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    Pending,
    Rendering,
    Sending,
    Recorded(OutcomeStatus),
}

impl Display for OutcomeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            OutcomeStatus::Sent => write!(f, "sent"),
            OutcomeStatus::Failed => write!(f, "failed"),
            OutcomeStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl Display for ContactState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ContactState::Pending => write!(f, "pending"),
            ContactState::Rendering => write!(f, "rendering"),
            ContactState::Sending => write!(f, "sending"),
            ContactState::Recorded(status) => write!(f, "recorded_{}", status),
        }
    }
}
