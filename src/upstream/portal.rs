//! The reqwest-backed [`Portal`] implementation.

use crate::upstream::{CsrfToken, Portal};
use crate::FetchError;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A single upstream session. The cookie store ties the handshake GET and
/// the data POST together; the whole value is dropped when the owning call
/// completes, so nothing leaks across invocations.
pub struct HttpPortal {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpPortal {
    /// Opens a fresh session against `endpoint`. The timeout applies to each
    /// request individually; there are no retries.
    pub fn open(endpoint: Url, timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait::async_trait]
impl Portal for HttpPortal {
    async fn handshake(&self) -> Result<String, FetchError> {
        debug!("GET {}", self.endpoint);
        let response = self.client.get(self.endpoint.clone()).send().await?;
        Ok(response.text().await?)
    }

    async fn submit(
        &self,
        csrf: &CsrfToken,
        form: &[(&'static str, String)],
    ) -> Result<(u16, String), FetchError> {
        debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("accept", "*/*")
            .header("x-requested-with", "XMLHttpRequest")
            .header(csrf.header(), csrf.token())
            .form(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}
