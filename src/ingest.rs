use std::{collections::HashMap, io::Read};

use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::{
    error::IngestError,
    models::{
        contact::{Contact, ContactField, RejectReason, RejectedRow},
        validation::{is_valid_email, normalize_text},
    },
};

/// Header matching rules, evaluated in order. A header is claimed by the first
/// rule with a matching substring; a field keeps the first header that claims it.
pub const COLUMN_RULES: &[(ContactField, &[&str])] = &[
    (ContactField::Name, &["name", "hr", "contact"]),
    (ContactField::Email, &["email", "mail"]),
    (ContactField::Company, &["company", "organization", "firm"]),
];

#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    pub contacts: Vec<Contact>,
    pub rejected: Vec<RejectedRow>,
}

pub fn resolve_columns<S: AsRef<str>>(
    headers: &[S],
) -> Result<HashMap<ContactField, usize>, IngestError> {
    let mut mapping = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let lowered = normalize_text(header.as_ref()).to_lowercase();

        let claimed = COLUMN_RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|needle| lowered.contains(needle)))
            .map(|(field, _)| *field);

        if let Some(field) = claimed {
            mapping.entry(field).or_insert(index);
        }
    }

    let missing: Vec<String> = ContactField::ALL
        .iter()
        .filter(|field| !mapping.contains_key(field))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(IngestError::Schema {
            missing,
            found: headers.iter().map(|h| h.as_ref().to_string()).collect(),
        });
    }

    Ok(mapping)
}

pub fn ingest<R: Read>(input: R) -> Result<IngestResult, IngestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mapping = resolve_columns(&headers)?;
    debug!(?headers, "Resolved contact list columns");

    let mut result = IngestResult::default();

    for (offset, record) in reader.byte_records().enumerate() {
        let record = record?;
        let row = offset + 1;

        let cell = |field: ContactField| {
            record
                .get(mapping[&field])
                .map(|raw| normalize_text(&String::from_utf8_lossy(raw)))
                .unwrap_or_default()
        };

        let contact = Contact::new(
            cell(ContactField::Name),
            cell(ContactField::Email),
            cell(ContactField::Company),
        );

        match check_contact(&contact) {
            Ok(()) => result.contacts.push(contact),
            Err(reason) => {
                debug!(row, %reason, "Rejected contact row");
                result.rejected.push(RejectedRow { row, reason });
            }
        }
    }

    info!(
        accepted = result.contacts.len(),
        rejected = result.rejected.len(),
        "Contact list ingested"
    );

    if result.contacts.is_empty() {
        return Err(IngestError::EmptyResult {
            rejected: result.rejected,
        });
    }

    Ok(result)
}

fn check_contact(contact: &Contact) -> Result<(), RejectReason> {
    if contact.name.is_empty() || contact.email.is_empty() || contact.company.is_empty() {
        return Err(RejectReason::EmptyField);
    }

    if !is_valid_email(&contact.email) {
        return Err(RejectReason::InvalidEmail);
    }

    Ok(())
}
