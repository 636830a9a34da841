use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub subject: String,
    pub body: String,
}

impl Template {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    HrName,
    Company,
    SenderName,
    SenderEmail,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::HrName,
        Placeholder::Company,
        Placeholder::SenderName,
        Placeholder::SenderEmail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Placeholder::HrName => "hr_name",
            Placeholder::Company => "company",
            Placeholder::SenderName => "sender_name",
            Placeholder::SenderEmail => "sender_email",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Arc<[u8]>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();

        Self {
            filename,
            content_type,
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

impl RenderedMessage {
    pub fn with_attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }
}
