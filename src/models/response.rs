use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    contact::RejectedRow,
    outcome::{CampaignReport, SendOutcome},
};

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message,
        }
    }

    pub fn message(message: String) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message,
        }
    }

    pub fn error(error: String, message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactResult {
    pub contact_name: String,
    pub contact_email: String,
    pub company: String,
    pub success: bool,
    pub message: String,
}

impl From<&SendOutcome> for ContactResult {
    fn from(outcome: &SendOutcome) -> Self {
        Self {
            contact_name: outcome.contact.name.clone(),
            contact_email: outcome.contact.email.clone(),
            company: outcome.contact.company.clone(),
            success: outcome.succeeded(),
            message: outcome.detail.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignResponse {
    pub campaign_id: Uuid,
    pub results: Vec<ContactResult>,
    pub summary: CampaignSummary,
    pub rejected_rows: Vec<RejectedRow>,
}

impl CampaignResponse {
    pub fn new(report: &CampaignReport, rejected_rows: Vec<RejectedRow>) -> Self {
        Self {
            campaign_id: report.campaign_id,
            results: report.outcomes.iter().map(ContactResult::from).collect(),
            summary: CampaignSummary {
                total: report.total,
                successful: report.successful,
                failed: report.failed,
                cancelled: report.cancelled,
            },
            rejected_rows,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewResponse {
    pub subject: String,
    pub body: String,
}
