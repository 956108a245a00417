//! HTTP client and URL construction for host API requests.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use flowatlas_shared::{FlowAtlasError, Result};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("FlowAtlas/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Per-request timeout in seconds. Bounds how long an unresponsive host can
/// pin its worker slot.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client shared by every fetch in a run.
///
/// Cloning is cheap (`reqwest::Client` is an `Arc` internally), so one client
/// serves all host workers and reuses connections per host.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Build a client with the standard settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FlowAtlasError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` and decode the body as JSON into `T`.
    ///
    /// Any network failure, non-2xx status, or JSON decode failure yields a
    /// retrieval error carrying the HTTP status when one arrived.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        debug!(%url, "GET");

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            FlowAtlasError::retrieval(
                url.as_str(),
                e.status().map(|s| s.as_u16()),
                e.to_string(),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FlowAtlasError::retrieval(
                url.as_str(),
                Some(status.as_u16()),
                format!("HTTP {status}"),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            FlowAtlasError::retrieval(
                url.as_str(),
                Some(status.as_u16()),
                format!("invalid JSON body: {e}"),
            )
        })
    }
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Resolve `segments` against `base`, left to right, with standard URL-join
/// semantics: an absolute-path segment replaces the base path, a relative
/// segment is appended.
pub fn join_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    for segment in segments {
        url = url.join(segment).map_err(|e| {
            FlowAtlasError::validation(format!("cannot join '{segment}' onto {url}: {e}"))
        })?;
    }
    Ok(url)
}

/// Append one path segment to `base`, percent-encoding reserved characters.
///
/// Tool identifiers commonly contain `/`; a plain join would split them into
/// multiple path segments.
pub fn push_encoded(base: &Url, raw_segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FlowAtlasError::validation(format!("{base} cannot carry path segments")))?
        .pop_if_empty()
        .push(raw_segment);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_absolute_segment_replaces_base_path() {
        let base = Url::parse("http://host.example:9000/some/prefix").unwrap();
        let url = join_url(&base, &["/api/workflows"]).unwrap();
        assert_eq!(url.as_str(), "http://host.example:9000/api/workflows");
    }

    #[test]
    fn join_relative_segment_appends() {
        let base = Url::parse("http://host.example:9000/").unwrap();
        let url = join_url(&base, &["/api/workflows/", "wf-1"]).unwrap();
        assert_eq!(url.as_str(), "http://host.example:9000/api/workflows/wf-1");
    }

    #[test]
    fn push_encoded_escapes_slashes() {
        let base = Url::parse("http://host.example:9000/api/tools/").unwrap();
        let url = push_encoded(&base, "ns/tool-1").unwrap();
        assert_eq!(
            url.as_str(),
            "http://host.example:9000/api/tools/ns%2Ftool-1"
        );
    }

    #[test]
    fn push_encoded_plain_id_unchanged() {
        let base = Url::parse("http://host.example:9000/api/tools/").unwrap();
        let url = push_encoded(&base, "t1").unwrap();
        assert_eq!(url.as_str(), "http://host.example:9000/api/tools/t1");
    }

    #[tokio::test]
    async fn get_json_decodes_body() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/api/tools/t1"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"name": "Formatter"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new().unwrap();
        let url = Url::parse(&format!("{}/api/tools/t1", server.uri())).unwrap();
        let tool: flowatlas_shared::ToolDetail = client.get_json(&url).await.unwrap();
        assert_eq!(tool.name, "Formatter");
    }

    #[tokio::test]
    async fn get_json_non_2xx_is_retrieval_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/api/workflows"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ApiClient::new().unwrap();
        let url = Url::parse(&format!("{}/api/workflows", server.uri())).unwrap();
        let err = client
            .get_json::<Vec<flowatlas_shared::WorkflowSummary>>(&url)
            .await
            .unwrap_err();

        match err {
            FlowAtlasError::Retrieval { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("expected Retrieval, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_json_garbage_body_is_retrieval_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/api/workflows"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = ApiClient::new().unwrap();
        let url = Url::parse(&format!("{}/api/workflows", server.uri())).unwrap();
        let err = client
            .get_json::<Vec<flowatlas_shared::WorkflowSummary>>(&url)
            .await
            .unwrap_err();
        assert!(err.is_retrieval());
    }
}
