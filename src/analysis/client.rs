//! Analysis Client
//!
//! Posts the collected wizard payload to the attack-detection backend.
//! One request per call: no retry, no timeout, no cancellation.

use super::types::{AnalysisRequest, AnalysisResponse};
use crate::error::{LrDetectError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Endpoint path appended to the configured base URL
pub const ANALYSIS_PATH: &str = "/get_values";

// No request or connect timeout: a slow backend keeps the results step loading.
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Anything that can turn a wizard payload into an analysis result
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse>;

    /// Human-readable target, for logs
    fn endpoint(&self) -> &str;
}

/// HTTP implementation of [`Analyzer`]
#[derive(Clone)]
pub struct HttpAnalyzer {
    client: Client,
    endpoint: String,
}

impl HttpAnalyzer {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(DEFAULT_POOL_IDLE_TIMEOUT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create with custom HTTP client
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint_url(base_url),
        }
    }
}

/// Join the base URL and the analysis path without doubling slashes
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), ANALYSIS_PATH)
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        tracing::debug!("POST {}", self.endpoint);

        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LrDetectError::BackendStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: AnalysisResponse = serde_json::from_slice(&bytes)?;

        tracing::info!(
            "Backend response: loadability node1={:.4} node2={:.4}",
            parsed.loadability.node1,
            parsed.loadability.node2
        );

        Ok(parsed)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::matrix::Matrix;

    const RESPONSE_BODY: &str = r#"{
        "loadability": {"node1": 0.75, "node2": 0.5},
        "actual_load": {
            "node1": {"active": 60.0, "reactive": 20.0},
            "node2": {"active": 60.0, "reactive": 35.0}
        },
        "lrattack_load": {
            "node1": {"active": 80.0, "reactive": 26.6667},
            "node2": {"active": 120.0, "reactive": 70.0}
        }
    }"#;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            selected_bus: "5".to_string(),
            bus_data: Matrix::bus_default().to_rows(),
            line_data: Matrix::line_default().to_rows(),
            vf_values: [0.0, 0.0],
            pmu_location: [0, 0],
            suspected_nodes: Some([8, 32].into()),
        }
    }

    #[test]
    fn test_endpoint_url_joins_path() {
        assert_eq!(endpoint_url("http://localhost:8000"), "http://localhost:8000/get_values");
        assert_eq!(endpoint_url("http://localhost:8000/"), "http://localhost:8000/get_values");
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/get_values")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "selectedBus": "5",
                "suspectedNodes": [8, 32]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RESPONSE_BODY)
            .create_async()
            .await;

        let analyzer = HttpAnalyzer::new(&server.url()).expect("client builds");
        let result = analyzer.analyze(&request()).await;

        mock.assert_async().await;
        let response = result.expect("success response");
        assert_eq!(response.loadability.node1, 0.75);
        assert_eq!(response.lrattack_load.node2.active, 120.0);
    }

    #[tokio::test]
    async fn test_analyze_server_error_returns_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/get_values")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let analyzer = HttpAnalyzer::new(&server.url()).expect("client builds");
        let err = analyzer.analyze(&request()).await.expect_err("500 must fail");

        mock.assert_async().await;
        assert_eq!(err.code(), ErrorCode::Backend);
        assert!(err.to_string().contains("500"), "error should mention status: {err}");
    }

    #[tokio::test]
    async fn test_analyze_partial_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/get_values")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"loadability": {"node1": 1.0, "node2": 1.0}}"#)
            .create_async()
            .await;

        let analyzer = HttpAnalyzer::new(&server.url()).expect("client builds");
        let err = analyzer.analyze(&request()).await.expect_err("partial body must fail");

        mock.assert_async().await;
        assert_eq!(err.code(), ErrorCode::Response);
    }

    /// Read one HTTP request off `stream`, headers plus `Content-Length` body
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        use tokio::io::AsyncReadExt;

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_slow_backend_is_awaited() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                RESPONSE_BODY.len(),
                RESPONSE_BODY
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });

        let analyzer = HttpAnalyzer::new(&format!("http://{addr}")).expect("client builds");
        let response = analyzer.analyze(&request()).await.expect("slow answer still arrives");

        assert_eq!(response.loadability.node2, 0.5);
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /get_values"));
    }

    #[tokio::test]
    async fn test_analyze_unreachable_backend_is_network_error() {
        // Port 9 (discard) is closed on test machines
        let analyzer = HttpAnalyzer::new("http://127.0.0.1:9").expect("client builds");
        let err = analyzer.analyze(&request()).await.expect_err("connection refused");
        assert_eq!(err.code(), ErrorCode::Network);
    }
}
