//! The HTTP session gateway to the municipal reporting portal.
//!
//! [`Portal`] is the transport seam: the real implementation wraps a
//! session-scoped reqwest client, and tests substitute a stub so the
//! collector logic can be exercised without a network.

mod csrf;
mod portal;

pub use csrf::CsrfToken;
pub use portal::HttpPortal;

use crate::FetchError;

/// Transport operations against the reporting endpoint. One value of this
/// trait owns one upstream session: the cookie jar established by
/// `handshake` must still be live when `submit` runs.
#[async_trait::async_trait]
pub trait Portal: Send + Sync {
    /// GET the endpoint and return the HTML handshake page.
    async fn handshake(&self) -> Result<String, FetchError>;

    /// POST the form-encoded fields with the CSRF header pair and the XHR
    /// marker header. Returns the raw status code and body; interpreting
    /// them is the collector's job.
    async fn submit(
        &self,
        csrf: &CsrfToken,
        form: &[(&'static str, String)],
    ) -> Result<(u16, String), FetchError>;
}
