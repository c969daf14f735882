/**
 * ============================================================================
 * HTTP BRIDGE
 * ============================================================================
 *
 * PURPOSE: CommandBridge transport that talks to the backend helper over
 *          local HTTP
 *
 * PROTOCOL:
 * - POST {base_url}/invoke/{command} with the argument object as JSON body
 * - 2xx: body is the JSON result (empty body = no result)
 * - otherwise: body is the backend's error text, possibly as a JSON string
 *
 * ============================================================================
 */

use crate::bridge::{BridgeError, Command, CommandBridge};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub struct HttpBridge {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBridge {
    /**
     * Create bridge with one shared HTTP client
     * The timeout applies to each whole request
     */
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, command: Command) -> String {
        format!("{}/invoke/{}", self.base_url, command.name())
    }
}

// Backends answer errors either as plain text or as a JSON-encoded string
fn error_message(body: &str) -> String {
    serde_json::from_str::<String>(body).unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl CommandBridge for HttpBridge {
    async fn invoke(&self, command: Command, args: Value) -> Result<Value, BridgeError> {
        let url = self.endpoint(command);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&args)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::warn!("Backend rejected {} with HTTP {}", command, status);
            return Err(BridgeError::backend(command.name(), Some(error_message(&body))));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|source| BridgeError::Payload {
            command: command.name().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::commands;
    use crate::types::{LogType, ServiceStatus};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bridge_for(server: &MockServer) -> HttpBridge {
        HttpBridge::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let bridge = HttpBridge::new("http://127.0.0.1:17321/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            bridge.endpoint(Command::GetServiceInfo),
            "http://127.0.0.1:17321/invoke/get_service_info"
        );
    }

    #[tokio::test]
    async fn test_service_info_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke/get_service_info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "running",
                "version": "1.24.0",
                "active_connections": 3
            })))
            .mount(&server)
            .await;

        let info = commands::get_service_info(&bridge_for(&server)).await.unwrap();
        assert_eq!(info.status, ServiceStatus::Running);
        assert_eq!(info.active_connections, Some(3));
    }

    #[tokio::test]
    async fn test_log_query_is_posted_as_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke/get_nginx_logs"))
            .and(body_json(json!({"logType": "error", "lines": 20, "level": "error"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("line one\nline two")))
            .mount(&server)
            .await;

        let filter = commands::LogFilter {
            lines: 20,
            search: None,
            level: Some("error".to_string()),
        };
        let query = commands::LogQuery::new(LogType::Error, &filter);
        let text = commands::get_nginx_logs(&bridge_for(&server), &query)
            .await
            .unwrap();
        assert_eq!(text, "line one\nline two");
    }

    #[tokio::test]
    async fn test_empty_success_body_is_unit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke/stop_nginx"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        assert!(commands::stop_nginx(&bridge_for(&server)).await.is_ok());
    }

    #[tokio::test]
    async fn test_error_body_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke/start_nginx"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!("端口 80 已被占用")))
            .mount(&server)
            .await;

        let err = commands::start_nginx(&bridge_for(&server)).await.unwrap_err();
        assert_eq!(err.message().as_deref(), Some("端口 80 已被占用"));
    }

    #[tokio::test]
    async fn test_blank_error_body_has_no_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke/open_log_folder"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = commands::open_log_folder(&bridge_for(&server)).await.unwrap_err();
        assert!(err.message().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Nothing listens on the discard port
        let bridge = HttpBridge::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = commands::get_service_info(&bridge).await.unwrap_err();
        assert!(matches!(err, BridgeError::Transport(_)));
        assert!(err.message().is_some());
    }
}
