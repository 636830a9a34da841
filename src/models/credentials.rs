use std::fmt::{Debug, Formatter, Result};

// `Debug` never prints the secret.
#[derive(Clone)]
pub struct Credentials {
    account: String,
    secret: String,
}

impl Credentials {
    pub fn new(account: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            secret: secret.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn derived_sender_name(&self) -> String {
        sender_name_from_address(&self.account)
    }
}

pub fn sender_name_from_address(address: &str) -> String {
    let local = address.split('@').next().unwrap_or_default();

    local
        .split(['.', '_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .finish()
    }
}
