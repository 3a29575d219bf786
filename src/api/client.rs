use async_trait::async_trait;
use reqwest::Client;

use super::{parse_recommendations, FetchError, RecommendationSource};
use crate::config::AppConfig;

/// reqwest-backed client for the `/recommend` endpoint
pub struct HttpRecommendationClient {
    client: Client,
    base_url: String,
}

impl HttpRecommendationClient {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().to_string(),
        })
    }

    /// `<base>/recommend?user_id=<id>`, id inserted as typed
    pub fn recommend_url(&self, user_id: &str) -> String {
        format!("{}/recommend?user_id={}", self.base_url, user_id)
    }
}

#[async_trait]
impl RecommendationSource for HttpRecommendationClient {
    async fn recommend(&self, user_id: &str) -> Result<Vec<String>, FetchError> {
        let url = self.recommend_url(user_id);
        tracing::debug!(%url, "GET");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        parse_recommendations(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn client_for(base_url: &str) -> HttpRecommendationClient {
        let config = AppConfig::default().with_base_url(Some(base_url.to_string()));
        HttpRecommendationClient::new(&config).unwrap()
    }

    /// Serve exactly one HTTP response and report the request line
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request);
            let _ = tx.send(request.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{}", addr), rx)
    }

    #[test]
    fn test_recommend_url() {
        let client = client_for("https://example.com/");
        assert_eq!(client.recommend_url("42"), "https://example.com/recommend?user_id=42");
    }

    #[tokio::test]
    async fn test_success_issues_single_get() {
        let (base, request_line) =
            serve_once("HTTP/1.1 200 OK", r#"{"recommendations": ["A", "B"]}"#).await;

        let list = client_for(&base).recommend("123").await.unwrap();

        assert_eq!(list, vec!["A", "B"]);
        assert_eq!(request_line.await.unwrap(), "GET /recommend?user_id=123 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (base, _) =
            serve_once("HTTP/1.1 400 Bad Request", r#"{"error": "Please provide a valid user_id"}"#).await;

        let err = client_for(&base).recommend("x").await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 400));
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let (base, _) = serve_once("HTTP/1.1 200 OK", "not json").await;

        let err = client_for(&base).recommend("1").await.unwrap_err();
        assert!(matches!(err, FetchError::Body(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr)).recommend("1").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
