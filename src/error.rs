use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use crate::models::contact::RejectedRow;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing required columns: {missing:?}. Found: {found:?}")]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("No valid contacts found ({} rows rejected)", rejected.len())]
    EmptyResult { rejected: Vec<RejectedRow> },

    #[error("Failed to read contact list: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Unknown placeholders in template: {}", .0.join(", "))]
    UnknownPlaceholders(Vec<String>),

    #[error("Malformed template at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    AuthFailed,
    ConnectionFailed,
    Rejected,
    Unknown,
}

impl TransportErrorKind {
    pub fn classify(code: Option<u16>, message: &str) -> Self {
        let lowered = message.to_lowercase();

        if matches!(code, Some(530 | 534 | 535 | 538))
            || lowered.contains("authentication")
            || lowered.contains("credentials")
        {
            return TransportErrorKind::AuthFailed;
        }

        match code {
            Some(421) => TransportErrorKind::ConnectionFailed,
            Some(400..=599) => TransportErrorKind::Rejected,
            Some(_) => TransportErrorKind::Unknown,
            None if lowered.contains("timed out")
                || lowered.contains("timeout")
                || lowered.contains("connection")
                || lowered.contains("tls")
                || lowered.contains("dns")
                || lowered.contains("network") =>
            {
                TransportErrorKind::ConnectionFailed
            }
            None => TransportErrorKind::Unknown,
        }
    }
}

impl Display for TransportErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportErrorKind::AuthFailed => write!(f, "auth_failed"),
            TransportErrorKind::ConnectionFailed => write!(f, "connection_failed"),
            TransportErrorKind::Rejected => write!(f, "rejected"),
            TransportErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self.kind {
            TransportErrorKind::AuthFailed => "Authentication failed. Check the account address \
                 and use an app password rather than the regular account password."
                .to_string(),
            TransportErrorKind::ConnectionFailed => {
                format!("Could not reach the mail server: {}", self.message)
            }
            TransportErrorKind::Rejected => {
                format!("Message rejected by the mail server: {}", self.message)
            }
            TransportErrorKind::Unknown => format!("Failed to send email: {}", self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Email body template is required")]
    MissingBody,

    #[error("Failed to access campaign workspace: {0}")]
    Workspace(#[from] std::io::Error),
}
