use crate::domain::model::{PackageName, RawPage};
use crate::utils::error::{EtlError, Result};
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};

pub const DEFAULT_BASE_URL: &str = "https://snyk.io/advisor/python";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:135.0) Gecko/20100101 Firefox/135.0";

/// Downloads one advisor page per package. No retries, default client timeouts.
pub struct PageFetcher {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl PageFetcher {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn page_url(&self, package: &PackageName) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), package)
    }

    /// Anything other than `200 OK` is reported as [`EtlError::HttpStatus`].
    pub async fn fetch(&self, package: &PackageName) -> Result<RawPage> {
        let url = self.page_url(package);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("{} responded with {}", url, status);
        if status != StatusCode::OK {
            return Err(EtlError::HttpStatus {
                package: package.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(RawPage::new(body))
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_USER_AGENT)
    }
}
