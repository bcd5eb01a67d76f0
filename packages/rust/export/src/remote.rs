//! Remote sink: POST the full collection to an ingestion endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{info, instrument, warn};
use url::Url;

use lessonmap_shared::Record;

/// User-Agent for outgoing requests.
const USER_AGENT: &str = concat!("lessonmap/", env!("CARGO_PKG_VERSION"));

const TIMEOUT_SECS: u64 = 30;

/// Longest response body kept in a [`PushOutcome::Rejected`].
const MAX_BODY_CHARS: usize = 512;

/// What happened to a push. Never an error: a failed push must not fail the
/// scan, since the local files are already written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The endpoint answered HTTP 200.
    Delivered,
    /// The endpoint answered with any other status.
    Rejected { status: u16, body: String },
    /// No response: connection, timeout or client setup failure.
    Failed(String),
}

impl PushOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl std::fmt::Display for PushOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::Rejected { status, body } if body.is_empty() => {
                write!(f, "rejected with HTTP {status}")
            }
            Self::Rejected { status, body } => write!(f, "rejected with HTTP {status}: {body}"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Send `records` as a JSON array to `endpoint`.
#[instrument(skip(records), fields(endpoint = %endpoint, rows = records.len()))]
pub async fn push_records(endpoint: &Url, records: &[Record]) -> PushOutcome {
    let client = match Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(e) => return PushOutcome::Failed(format!("failed to build HTTP client: {e}")),
    };

    let response = match client.post(endpoint.clone()).json(records).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "push failed");
            return PushOutcome::Failed(e.to_string());
        }
    };

    let status = response.status();
    if status == StatusCode::OK {
        info!("data sent to endpoint");
        return PushOutcome::Delivered;
    }

    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_BODY_CHARS)
        .collect();
    warn!(status = status.as_u16(), "endpoint rejected push");

    PushOutcome::Rejected {
        status: status.as_u16(),
        body,
    }
}
