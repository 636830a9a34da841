use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use campaign_service::{
    clients::smtp::MailTransport,
    dispatcher::CampaignRequest,
    error::{TransportError, TransportErrorKind},
    models::{
        contact::Contact,
        credentials::Credentials,
        template::{RenderedMessage, Sender, Template},
    },
};

/// What the scripted transport does for one call.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    Succeed,
    Fail(TransportErrorKind),
    Panic,
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub sender_name: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<String>,
}

type Plan = Box<dyn Fn(usize, &str) -> Script + Send + Sync>;

/// In-memory transport whose behaviour per call is decided by a closure over
/// the call index and recipient.
pub struct ScriptedTransport {
    plan: Plan,
    verify_failure: Option<TransportErrorKind>,
    calls: Mutex<Vec<SentMessage>>,
}

impl ScriptedTransport {
    pub fn new(plan: impl Fn(usize, &str) -> Script + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            plan: Box::new(plan),
            verify_failure: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn always_succeed() -> Arc<Self> {
        Self::new(|_, _| Script::Succeed)
    }

    pub fn failing_verify(kind: TransportErrorKind) -> Arc<Self> {
        Arc::new(Self {
            plan: Box::new(|_, _| Script::Succeed),
            verify_failure: Some(kind),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Every attempted send, including failed ones, in call order.
    pub fn calls(&self) -> Vec<SentMessage> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for ScriptedTransport {
    async fn send(
        &self,
        _credentials: &Credentials,
        sender: &Sender,
        recipient: &str,
        message: &RenderedMessage,
    ) -> Result<(), TransportError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(SentMessage {
                sender_name: sender.name.clone(),
                recipient: recipient.to_string(),
                subject: message.subject.clone(),
                body: message.body.clone(),
                attachment: message.attachment.as_ref().map(|a| a.filename.clone()),
            });
            calls.len() - 1
        };

        match (self.plan)(index, recipient) {
            Script::Succeed => Ok(()),
            Script::Fail(kind) => Err(TransportError::new(kind, "scripted failure")),
            Script::Panic => panic!("scripted panic for {}", recipient),
        }
    }

    async fn verify(&self, _credentials: &Credentials) -> Result<(), TransportError> {
        match self.verify_failure {
            Some(kind) => Err(TransportError::new(kind, "535 5.7.8 Username and Password not accepted")),
            None => Ok(()),
        }
    }
}

pub fn contacts(count: usize) -> Vec<Contact> {
    (1..=count)
        .map(|i| {
            Contact::new(
                format!("Person {}", i),
                format!("person{}@example.com", i),
                format!("Company {}", i),
            )
        })
        .collect()
}

pub fn request(subject: &str, body: &str) -> CampaignRequest {
    CampaignRequest::new(
        Template::new(subject, body),
        Credentials::new("jane.sender@example.com", "app-password"),
        None,
    )
}
