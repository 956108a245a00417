//! Static HTTP server for the emitted catalog.
//!
//! Serves the output directory as plain files (the front end reads
//! `workflows.json` from here) with a single allowed CORS origin.

use std::net::SocketAddr;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, instrument};

use flowatlas_shared::{FlowAtlasError, Result, ServeConfig};

/// Build the router: every path falls through to the serve directory, and
/// responses carry the configured CORS origin.
pub fn router(config: &ServeConfig) -> Result<Router> {
    let origin: HeaderValue = config.cors_origin.parse().map_err(|_| {
        FlowAtlasError::config(format!("invalid CORS origin '{}'", config.cors_origin))
    })?;

    Ok(Router::new()
        .fallback_service(ServeDir::new(&config.serve_dir))
        .layer(CorsLayer::new().allow_origin(origin)))
}

/// Bind the configured port on localhost and serve until shutdown.
#[instrument(skip_all, fields(port = config.port))]
pub async fn serve(config: &ServeConfig) -> Result<()> {
    let app = router(config)?;
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FlowAtlasError::Server(format!("bind {addr}: {e}")))?;

    info!(
        addr = %addr,
        dir = %config.serve_dir.display(),
        cors_origin = %config.cors_origin,
        "serving catalog"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| FlowAtlasError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serve `dir` on an ephemeral port, returning the base URL.
    async fn spawn_server(dir: &std::path::Path, cors_origin: &str) -> String {
        let config = ServeConfig {
            serve_dir: dir.to_path_buf(),
            port: 0,
            cors_origin: cors_origin.into(),
        };
        let app = router(&config).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn serves_catalog_file_with_cors_header() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("workflows.json"),
            serde_json::json!({"h|wf-1": {"id": "wf-1"}}).to_string(),
        )
        .unwrap();

        let base = spawn_server(tmp.path(), "http://localhost:8081").await;

        let resp = reqwest::Client::new()
            .get(format!("{base}/workflows.json"))
            .header("Origin", "http://localhost:8081")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:8081")
        );

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["h|wf-1"]["id"], "wf-1");
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let base = spawn_server(tmp.path(), "http://localhost:8081").await;

        let resp = reqwest::get(format!("{base}/absent.json")).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[test]
    fn malformed_origin_is_config_error() {
        let config = ServeConfig {
            serve_dir: ".".into(),
            port: 8082,
            cors_origin: "bad\norigin".into(),
        };

        let err = router(&config).unwrap_err();
        assert!(matches!(err, FlowAtlasError::Config { .. }));
    }
}
