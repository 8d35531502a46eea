//! Remote CSV fetching

use crate::config::ImporterConfig;
use crate::error::{ImportError, ImportResult};
// async_trait required for dyn-compatibility with &dyn CsvFetcher
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Raw HTTP response for a CSV download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl CsvResponse {
    /// Accept the body as CSV text, or explain why it is not usable
    pub fn into_csv_text(self) -> ImportResult<String> {
        if self.status == 403 {
            return Err(ImportError::Forbidden);
        }

        let content_type = self.content_type.as_deref().unwrap_or_default();
        if !content_type.contains("text/plain") && !content_type.contains("text/csv") {
            warn!(content_type, "Remote file has unexpected content type");
            return Err(ImportError::WrongFileType);
        }

        Ok(self.body)
    }
}

/// Downloads CSV files
#[async_trait]
pub trait CsvFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ImportResult<CsvResponse>;
}

/// [`CsvFetcher`] over HTTP
pub struct HttpCsvFetcher {
    http: Client,
}

impl HttpCsvFetcher {
    pub fn new(config: &ImporterConfig) -> ImportResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("crowdguard/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl CsvFetcher for HttpCsvFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> ImportResult<CsvResponse> {
        let response = self.http.get(url).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Always decode as UTF-8 regardless of the declared charset
        let bytes = response.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!(status, content_type = ?content_type, bytes = bytes.len(), "Fetched CSV");

        Ok(CsvResponse {
            status,
            content_type,
            body,
        })
    }
}
