//! Delivery of unexpected failures to an error-collection endpoint.
//!
//! The endpoint is handed to [`ErrorReporter`] when it is built; nothing is
//! registered globally. A reporter without an endpoint only logs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// Body posted to the reporting endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    /// `source()` chain, outermost first.
    pub causes: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: error.to_string(),
            causes,
        }
    }
}

/// Maximum number of background deliveries in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

#[derive(Debug, Clone)]
struct Endpoint {
    client: Client,
    url: Url,
}

#[derive(Debug, Clone)]
pub struct ErrorReporter {
    endpoint: Option<Endpoint>,
    in_flight: Arc<Semaphore>,
}

impl ErrorReporter {
    /// Reporter posting to `endpoint`, with at most
    /// [`DEFAULT_MAX_IN_FLIGHT`] background deliveries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unparsable endpoint and
    /// [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_limit(endpoint, DEFAULT_MAX_IN_FLIGHT)
    }

    /// Like [`ErrorReporter::new`] with an explicit bound on background
    /// deliveries. Reports beyond the bound are logged and dropped.
    pub fn with_limit(endpoint: &str, max_in_flight: usize) -> Result<Self> {
        let url = Url::parse(endpoint).map_err(|e| Error::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            endpoint: Some(Endpoint {
                client: build_client()?,
                url,
            }),
            in_flight: Arc::new(Semaphore::new(max_in_flight)),
        })
    }

    /// Reporter that only logs. Builds no HTTP client.
    pub fn disabled() -> Self {
        Self {
            endpoint: None,
            in_flight: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Log `error` and deliver it in the background. Never fails and never
    /// blocks; without a tokio runtime, or with every delivery slot busy,
    /// the report is only logged.
    pub fn report(&self, error: &dyn std::error::Error) {
        let report = ErrorReport::from_error(error);
        tracing::error!(error = %report.message, causes = ?report.causes, "reporting error");

        if !self.is_enabled() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime, error report not delivered");
            return;
        };
        let Ok(permit) = Arc::clone(&self.in_flight).try_acquire_owned() else {
            tracing::warn!("too many error reports in flight, report dropped");
            return;
        };
        let this = self.clone();
        handle.spawn(async move {
            let _permit = permit;
            if let Err(e) = this.send(&report).await {
                tracing::warn!(error = %e, "error report delivery failed");
            }
        });
    }

    /// Post `report` and wait for the endpoint to accept it.
    ///
    /// A disabled reporter returns `Ok(())` without sending.
    pub async fn send(&self, report: &ErrorReport) -> Result<()> {
        let Some(Endpoint { client, url }) = &self.endpoint else {
            return Ok(());
        };
        client
            .post(url.clone())
            .json(report)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Run `fut`; on failure deliver a report and return `fallback`.
    pub async fn supervise<T, E, F>(&self, fut: F, fallback: T) -> T
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: std::error::Error,
    {
        match fut.await {
            Ok(value) => value,
            Err(e) => {
                let report = ErrorReport::from_error(&e);
                tracing::error!(error = %report.message, "supervised task failed");
                if let Err(send_err) = self.send(&report).await {
                    tracing::warn!(error = %send_err, "error report delivery failed");
                }
                fallback
            }
        }
    }
}

fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn report_collects_source_chain() {
        let report = ErrorReport::from_error(&Outer(Inner));
        assert_eq!(report.message, "outer");
        assert_eq!(report.causes, vec!["inner"]);
    }

    #[test]
    fn report_without_runtime_does_not_panic() {
        let reporter = ErrorReporter::new("http://127.0.0.1:9/report").unwrap();
        reporter.report(&Inner);
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        assert!(matches!(
            ErrorReporter::new("not a url"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn disabled_reporter_supervises_without_network() {
        let reporter = ErrorReporter::disabled();
        assert!(!reporter.is_enabled());
        let out = reporter
            .supervise(async { Err::<u8, _>(Inner) }, 7)
            .await;
        assert_eq!(out, 7);
    }

    #[test]
    fn disabled_reporter_needs_no_runtime_or_client() {
        let reporter = ErrorReporter::disabled();
        reporter.report(&Inner);
        assert!(!reporter.is_enabled());
    }

    #[tokio::test]
    async fn saturated_reporter_drops_instead_of_queueing() {
        let reporter = ErrorReporter::with_limit("http://127.0.0.1:9/report", 0).unwrap();
        reporter.report(&Inner);
        assert_eq!(reporter.in_flight.available_permits(), 0);
    }
}
