use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::dispatcher::DispatchSettings;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_smtp_timeout_seconds")]
    pub smtp_timeout_seconds: u64,

    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,

    #[serde(default = "default_subject")]
    pub default_subject: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout_seconds() -> u64 {
    30
}

fn default_send_interval_ms() -> u64 {
    2000
}

fn default_subject() -> String {
    "Exploring Internship Opportunities at {company}".to_string()
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_server_port() -> u16 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_timeout_seconds: default_smtp_timeout_seconds(),
            send_interval_ms: default_send_interval_ms(),
            default_subject: default_subject(),
            max_upload_bytes: default_max_upload_bytes(),
            server_port: default_server_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            send_interval: Duration::from_millis(self.send_interval_ms),
        }
    }
}
