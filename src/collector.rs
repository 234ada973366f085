//! The core fetch-and-group routine: CSRF handshake, date-bounded data POST,
//! per-ward aggregation.

use crate::model::{CollectionRecord, QueryWindow, WardReport};
use crate::upstream::{CsrfToken, HttpPortal, Portal};
use crate::{Config, FetchError};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Fetches daily collection records from the reporting portal and groups
/// them by ward.
///
/// Each call opens its own session, re-does the CSRF handshake (tokens are
/// short-lived and session-scoped) and discards the session on completion.
/// There is no state across invocations, so concurrent callers need no
/// coordination. Failures come back as tagged [`FetchError`] values; nothing
/// here is fatal to the hosting process.
pub struct Collector {
    config: Config,
}

impl Collector {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches the record list for `window` and folds it into per-ward
    /// summaries. An empty upstream result is a valid empty report.
    pub async fn fetch_and_group(&self, window: &QueryWindow) -> Result<WardReport, FetchError> {
        let records = self.fetch(window).await?;
        let report = WardReport::from_records(&records);
        info!(
            "Grouped {} records into {} wards",
            records.len(),
            report.len()
        );
        Ok(report)
    }

    /// Fetches the flat record list for `window`. The Details export needs
    /// the raw records as well as the grouping, so this is public.
    pub async fn fetch(&self, window: &QueryWindow) -> Result<Vec<CollectionRecord>, FetchError> {
        info!("Fetching data for {window}");
        let portal = HttpPortal::open(
            self.config.endpoint().clone(),
            self.config.timeout(),
            self.config.user_agent(),
        )?;
        self.fetch_via(&portal, window).await
    }

    /// The transport-independent part of a fetch, shared with tests.
    pub(crate) async fn fetch_via(
        &self,
        portal: &dyn Portal,
        window: &QueryWindow,
    ) -> Result<Vec<CollectionRecord>, FetchError> {
        let page = portal.handshake().await?;
        let csrf = CsrfToken::extract(&page).ok_or_else(|| {
            warn!("CSRF meta tags not found in handshake page");
            FetchError::TokenMissing
        })?;
        debug!("CSRF token obtained for header '{}'", csrf.header());

        let form = self.form(window);
        let (status, body) = portal.submit(&csrf, &form).await?;
        debug!("Response status code: {status}");
        if status != 200 {
            return Err(FetchError::UpstreamStatus(status));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| FetchError::ResponseParse(e.to_string()))?;
        if !value.is_array() {
            return Err(FetchError::UnexpectedFormat);
        }
        let records: Vec<CollectionRecord> =
            serde_json::from_value(value).map_err(|e| FetchError::ResponseParse(e.to_string()))?;
        info!("Successfully fetched {} records", records.len());
        Ok(records)
    }

    /// The form body for the data POST. Mode, operator and status filters are
    /// always blank; the ward filter comes from configuration (blank means
    /// city-wide).
    fn form(&self, window: &QueryWindow) -> Vec<(&'static str, String)> {
        vec![
            ("fromDate", window.from_param()),
            ("toDate", window.to_param()),
            ("collectionMode", String::new()),
            ("collectionOperator", String::new()),
            ("status", String::new()),
            ("revenueWard", self.config.revenue_ward().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{CsrfToken, Portal};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const HANDSHAKE_PAGE: &str = concat!(
        r#"<html><head><meta name="_csrf" content="tok-123"/>"#,
        r#"<meta name="_csrf_header" content="X-CSRF-TOKEN"/></head></html>"#
    );

    /// In-memory [`Portal`] returning canned responses, recording what was
    /// submitted.
    struct StubPortal {
        page: String,
        status: u16,
        body: String,
        submits: AtomicUsize,
        last_form: Mutex<Vec<(&'static str, String)>>,
        last_csrf: Mutex<Option<CsrfToken>>,
    }

    impl StubPortal {
        fn new(page: &str, status: u16, body: &str) -> Self {
            Self {
                page: page.to_string(),
                status,
                body: body.to_string(),
                submits: AtomicUsize::new(0),
                last_form: Mutex::new(Vec::new()),
                last_csrf: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl Portal for StubPortal {
        async fn handshake(&self) -> Result<String, FetchError> {
            Ok(self.page.clone())
        }

        async fn submit(
            &self,
            csrf: &CsrfToken,
            form: &[(&'static str, String)],
        ) -> Result<(u16, String), FetchError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            *self.last_form.lock().unwrap() = form.to_vec();
            *self.last_csrf.lock().unwrap() = Some(csrf.clone());
            Ok((self.status, self.body.clone()))
        }
    }

    fn collector() -> Collector {
        Collector::new(Config::for_tests("https://portal.invalid/report", ""))
    }

    fn window() -> QueryWindow {
        QueryWindow::single_day(NaiveDate::from_ymd_opt(2025, 4, 9).unwrap())
    }

    #[tokio::test]
    async fn groups_fetched_records() {
        let body = r#"[
            {"secretariatWard":"5","totalAmount":100,"consumerName":"A","consumerCode":"C1"},
            {"secretariatWard":"5","totalAmount":50,"consumerName":"B","consumerCode":"C2"},
            {"secretariatWard":"7","totalAmount":25,"consumerName":"D","consumerCode":"C3"}
        ]"#;
        let portal = StubPortal::new(HANDSHAKE_PAGE, 200, body);
        let records = collector().fetch_via(&portal, &window()).await.unwrap();
        let report = WardReport::from_records(&records);

        assert_eq!(report.get("5").unwrap().count, 2);
        assert_eq!(report.get("5").unwrap().total_amount, 150.0);
        assert_eq!(report.get("7").unwrap().owners, vec!["D (C3)"]);
    }

    #[tokio::test]
    async fn submits_expected_form_and_csrf() {
        let portal = StubPortal::new(HANDSHAKE_PAGE, 200, "[]");
        collector().fetch_via(&portal, &window()).await.unwrap();

        let csrf = portal.last_csrf.lock().unwrap().clone().unwrap();
        assert_eq!(csrf.token(), "tok-123");
        assert_eq!(csrf.header(), "X-CSRF-TOKEN");

        let form = portal.last_form.lock().unwrap().clone();
        assert!(form.contains(&("fromDate", "09/04/2025".to_string())));
        assert!(form.contains(&("toDate", "09/04/2025".to_string())));
        assert!(form.contains(&("revenueWard", String::new())));
        assert!(form.contains(&("collectionMode", String::new())));
    }

    #[tokio::test]
    async fn configured_ward_filter_is_submitted() {
        let portal = StubPortal::new(HANDSHAKE_PAGE, 200, "[]");
        let collector = Collector::new(Config::for_tests(
            "https://portal.invalid/report",
            "Revenue Ward No 18",
        ));
        collector.fetch_via(&portal, &window()).await.unwrap();
        let form = portal.last_form.lock().unwrap().clone();
        assert!(form.contains(&("revenueWard", "Revenue Ward No 18".to_string())));
    }

    #[tokio::test]
    async fn empty_list_is_not_an_error() {
        let portal = StubPortal::new(HANDSHAKE_PAGE, 200, "[]");
        let records = collector().fetch_via(&portal, &window()).await.unwrap();
        assert!(records.is_empty());
        assert!(WardReport::from_records(&records).is_empty());
    }

    #[tokio::test]
    async fn missing_token_skips_the_post() {
        let portal = StubPortal::new("<html><head></head></html>", 200, "[]");
        let err = collector()
            .fetch_via(&portal, &window())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TokenMissing));
        assert_eq!(portal.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_200_preserves_status() {
        let portal = StubPortal::new(HANDSHAKE_PAGE, 500, "oops");
        let err = collector()
            .fetch_via(&portal, &window())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UpstreamStatus(500)));
        assert_eq!(err.to_string(), "Failed to fetch data: 500");
    }

    #[tokio::test]
    async fn non_json_body_is_parse_error() {
        let portal = StubPortal::new(HANDSHAKE_PAGE, 200, "<html>login</html>");
        let err = collector()
            .fetch_via(&portal, &window())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ResponseParse(_)));
    }

    #[tokio::test]
    async fn non_array_json_is_unexpected_format() {
        let portal = StubPortal::new(HANDSHAKE_PAGE, 200, r#"{"error":"nope"}"#);
        let err = collector()
            .fetch_via(&portal, &window())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedFormat));
    }
}
