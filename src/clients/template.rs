use tracing::{debug, warn};

use crate::{
    error::TemplateError,
    models::{
        contact::Contact,
        template::{Placeholder, RenderedMessage, Sender, Template},
    },
};

pub const DEFAULT_BODY_TEMPLATE: &str = "Dear {hr_name},

I hope you're doing well. My name is {sender_name}, and I came across {company}'s work \
and would love the chance to explore internship opportunities with your team.

I have attached my resume for your reference. Please let me know if we could connect \
further about potential opportunities.

Looking forward to your response,
{sender_name}
{sender_email}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Field(&'a str),
}

// `{{` and `}}` are escaped braces.
fn tokenize(source: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                tokens.push(Token::Text("{"));
                i += 2;
            }
            b'{' => {
                let Some(len) = source[i + 1..].find('}') else {
                    return Err(TemplateError::Malformed {
                        offset: i,
                        reason: "unclosed '{'",
                    });
                };

                let identifier = &source[i + 1..i + 1 + len];
                if !is_identifier(identifier) {
                    return Err(TemplateError::Malformed {
                        offset: i,
                        reason: "placeholder is not an identifier",
                    });
                }

                tokens.push(Token::Field(identifier));
                i += len + 2;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                tokens.push(Token::Text("}"));
                i += 2;
            }
            b'}' => {
                return Err(TemplateError::Malformed {
                    offset: i,
                    reason: "single '}' encountered",
                });
            }
            _ => {
                let end = source[i..]
                    .find(['{', '}'])
                    .map_or(source.len(), |pos| i + pos);
                tokens.push(Token::Text(&source[i..end]));
                i = end;
            }
        }
    }

    Ok(tokens)
}

fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn validate(&self, template: &Template) -> Result<(), TemplateError> {
        let subject = tokenize(&template.subject)?;
        let body = tokenize(&template.body)?;

        let mut unknown: Vec<String> = Vec::new();
        for token in subject.iter().chain(body.iter()) {
            if let Token::Field(identifier) = token {
                if Placeholder::from_identifier(identifier).is_none()
                    && !unknown.iter().any(|seen| seen == identifier)
                {
                    unknown.push(identifier.to_string());
                }
            }
        }

        if !unknown.is_empty() {
            warn!(placeholders = ?unknown, "Template references unknown placeholders");
            return Err(TemplateError::UnknownPlaceholders(unknown));
        }

        Ok(())
    }

    pub fn render(
        &self,
        template: &Template,
        contact: &Contact,
        sender: &Sender,
    ) -> Result<RenderedMessage, TemplateError> {
        self.validate(template)?;

        let subject = Self::substitute(&template.subject, contact, sender)?;
        let body = Self::substitute(&template.body, contact, sender)?;

        debug!(
            subject_len = subject.len(),
            body_len = body.len(),
            "Template rendered"
        );

        Ok(RenderedMessage {
            subject,
            body,
            attachment: None,
        })
    }

    fn substitute(source: &str, contact: &Contact, sender: &Sender) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(source.len());

        for token in tokenize(source)? {
            match token {
                Token::Text(text) => rendered.push_str(text),
                Token::Field(identifier) => {
                    let value = match Placeholder::from_identifier(identifier) {
                        Some(Placeholder::HrName) => &contact.name,
                        Some(Placeholder::Company) => &contact.company,
                        Some(Placeholder::SenderName) => &sender.name,
                        Some(Placeholder::SenderEmail) => &sender.email,
                        None => {
                            return Err(TemplateError::UnknownPlaceholders(vec![
                                identifier.to_string(),
                            ]));
                        }
                    };
                    rendered.push_str(value);
                }
            }
        }

        Ok(rendered)
    }
}
