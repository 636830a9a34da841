use std::{any::Any, io::Cursor, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use chrono::Utc;
use futures_util::FutureExt;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    clients::{smtp::MailTransport, template::TemplateRenderer},
    error::{CampaignError, TransportError, TransportErrorKind},
    ingest::ingest,
    models::{
        contact::{Contact, RejectedRow},
        credentials::Credentials,
        outcome::{CampaignReport, OutcomeLedger, SendOutcome},
        status::ContactState,
        template::{Attachment, Sender, Template},
    },
    workspace::CampaignWorkspace,
};

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub send_interval: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            send_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CampaignRequest {
    pub template: Template,
    pub credentials: Credentials,
    pub sender: Sender,
}

impl CampaignRequest {
    pub fn new(template: Template, credentials: Credentials, sender_name: Option<String>) -> Self {
        let name = sender_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| credentials.derived_sender_name());

        let sender = Sender {
            name,
            email: credentials.account().to_string(),
        };

        Self {
            template,
            credentials,
            sender,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CampaignRun {
    pub report: CampaignReport,
    pub rejected: Vec<RejectedRow>,
}

pub struct Dispatcher {
    transport: Arc<dyn MailTransport>,
    renderer: TemplateRenderer,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, settings: DispatchSettings) -> Self {
        Self {
            transport,
            renderer: TemplateRenderer,
            settings,
        }
    }

    pub async fn run_campaign(
        &self,
        workspace: CampaignWorkspace,
        request: CampaignRequest,
        cancel: CancellationToken,
    ) -> Result<CampaignRun, CampaignError> {
        let result = self.prepare_and_run(&workspace, &request, &cancel).await;

        if let Err(e) = workspace.release() {
            warn!(error = %e, "Failed to remove campaign workspace");
        }

        result
    }

    async fn prepare_and_run(
        &self,
        workspace: &CampaignWorkspace,
        request: &CampaignRequest,
        cancel: &CancellationToken,
    ) -> Result<CampaignRun, CampaignError> {
        if request.template.body.trim().is_empty() {
            return Err(CampaignError::MissingBody);
        }

        let raw_contacts = workspace.read_contacts().await?;
        let ingested = ingest(Cursor::new(raw_contacts)).inspect_err(|e| {
            warn!(error = %e, "Campaign refused before dispatch");
        })?;

        let attachment = workspace.load_attachment().await?;

        let report = self
            .run(ingested.contacts, request, attachment, cancel)
            .await;

        Ok(CampaignRun {
            report,
            rejected: ingested.rejected,
        })
    }

    pub async fn run(
        &self,
        contacts: Vec<Contact>,
        request: &CampaignRequest,
        attachment: Option<Attachment>,
        cancel: &CancellationToken,
    ) -> CampaignReport {
        let campaign_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = contacts.len();
        let span = info_span!("campaign", %campaign_id, total);

        async move {
            info!("Campaign started");
            let mut ledger = OutcomeLedger::with_capacity(total);

            for (index, contact) in contacts.into_iter().enumerate() {
                if cancel.is_cancelled() {
                    debug!(contact_index = index, "Campaign cancelled, skipping contact");
                    ledger.record(SendOutcome::cancelled(contact));
                    continue;
                }

                debug!(contact_index = index, state = %ContactState::Pending, "Processing contact");

                let outcome = self
                    .process_contact(index, contact, request, attachment.as_ref())
                    .await;
                let transmitted = outcome.succeeded();
                let state = ContactState::Recorded(outcome.status);
                ledger.record(outcome);
                debug!(
                    contact_index = index,
                    %state,
                    recorded = ledger.len(),
                    "Processing contact"
                );

                if transmitted && index + 1 < total && !self.settings.send_interval.is_zero() {
                    tokio::select! {
                        _ = sleep(self.settings.send_interval) => {}
                        _ = cancel.cancelled() => {}
                    }
                }
            }

            let report =
                CampaignReport::from_outcomes(campaign_id, ledger.into_outcomes(), started_at);

            info!(
                successful = report.successful,
                failed = report.failed,
                cancelled = report.cancelled,
                "Campaign completed"
            );

            report
        }
        .instrument(span)
        .await
    }

    async fn process_contact(
        &self,
        index: usize,
        contact: Contact,
        request: &CampaignRequest,
        attachment: Option<&Attachment>,
    ) -> SendOutcome {
        debug!(contact_index = index, state = %ContactState::Rendering, "Processing contact");

        let message = match self
            .renderer
            .render(&request.template, &contact, &request.sender)
        {
            Ok(message) => message.with_attachment(attachment.cloned()),
            Err(e) => {
                warn!(contact_index = index, error = %e, "Template render failed");
                return SendOutcome::failed(contact, e.to_string());
            }
        };

        debug!(contact_index = index, state = %ContactState::Sending, "Processing contact");

        let sent = AssertUnwindSafe(self.transport.send(
            &request.credentials,
            &request.sender,
            &contact.email,
            &message,
        ))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(TransportError::new(
                TransportErrorKind::Unknown,
                panic_message(panic.as_ref()),
            ))
        });

        match sent {
            Ok(()) => {
                info!(contact_index = index, "Email sent");
                SendOutcome::sent(contact)
            }
            Err(e) => {
                warn!(contact_index = index, kind = %e.kind, "Email send failed");
                SendOutcome::failed(contact, e.user_message())
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("transport panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("transport panicked: {}", message)
    } else {
        "transport panicked".to_string()
    }
}
