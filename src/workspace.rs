use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::debug;

use crate::models::template::Attachment;

const WORKSPACE_PREFIX: &str = "campaign_";

#[derive(Debug)]
pub struct CampaignWorkspace {
    dir: TempDir,
    contacts: Option<PathBuf>,
    attachment: Option<(String, PathBuf)>,
}

impl CampaignWorkspace {
    pub fn create() -> std::io::Result<Self> {
        let dir = Builder::new().prefix(WORKSPACE_PREFIX).tempdir()?;
        debug!(path = %dir.path().display(), "Campaign workspace created");

        Ok(Self {
            dir,
            contacts: None,
            attachment: None,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub async fn store_contacts(&mut self, filename: &str, data: &[u8]) -> std::io::Result<()> {
        let path = self
            .dir
            .path()
            .join(format!("contacts_{}", sanitize_filename(filename, "contacts.csv")));
        tokio::fs::write(&path, data).await?;
        self.contacts = Some(path);
        Ok(())
    }

    pub async fn store_attachment(&mut self, filename: &str, data: &[u8]) -> std::io::Result<()> {
        let display_name = sanitize_filename(filename, "attachment");
        let path = self.dir.path().join(format!("attachment_{}", display_name));
        tokio::fs::write(&path, data).await?;
        self.attachment = Some((display_name, path));
        Ok(())
    }

    pub async fn read_contacts(&self) -> std::io::Result<Vec<u8>> {
        match &self.contacts {
            Some(path) => tokio::fs::read(path).await,
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no contact list stored in workspace",
            )),
        }
    }

    pub async fn load_attachment(&self) -> std::io::Result<Option<Attachment>> {
        match &self.attachment {
            Some((filename, path)) => {
                let data = tokio::fs::read(path).await?;
                Ok(Some(Attachment::new(filename.clone(), data)))
            }
            None => Ok(None),
        }
    }

    pub fn release(self) -> std::io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "Campaign workspace released");
        Ok(())
    }
}

pub fn sanitize_filename(raw: &str, fallback: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}
