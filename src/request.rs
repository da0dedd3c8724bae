use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::{info_time, Result};

const USER_AGENT: &str = concat!("dexscrape/", env!("CARGO_PKG_VERSION"));

/// One `reqwest::Client` for the whole run, every request bounded by the same timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Requests a page and returns its HTML. Non-2xx statuses are errors.
    pub async fn get_html(&self, url: &str) -> Result<String> {
        info_time!("Requesting: {url}");
        let res = self.client.get(url).send().await?.error_for_status()?;
        let html = res.text().await?;
        Ok(html)
    }

    /// Raw response body. Non-2xx statuses are errors.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let res = self.client.get(url).send().await?.error_for_status()?;
        Ok(res.bytes().await?.to_vec())
    }

    /// HEAD request; only the status is of interest.
    pub async fn probe(&self, url: &str) -> Result<StatusCode> {
        let res = self.client.head(url).send().await?;
        Ok(res.status())
    }
}
