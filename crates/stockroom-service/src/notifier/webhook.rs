//! Mail-relay webhook notifier.
//!
//! POSTs each alert as one JSON message to the configured endpoint:
//!
//! ```json
//! { "from": "stockroom@example.com", "to": "orders@acme.io",
//!   "subject": "Low Stock Alert: Hex Bolt M6",
//!   "text": "Stock for Hex Bolt M6 is low. Current stock: 4. Please restock soon." }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::{LowStockAlert, NotifyError, SupplierNotifier};

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub endpoint: String,
    pub from_address: String,
    pub timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            from_address: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl WebhookConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_from_address(mut self, from: impl Into<String>) -> Self {
        self.from_address = from.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
}

pub struct WebhookNotifier {
    client: Client,
    config: WebhookConfig,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, NotifyError> {
        if config.endpoint.is_empty() {
            return Err(NotifyError::Config(
                "webhook endpoint not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NotifyError::Http)?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SupplierNotifier for WebhookNotifier {
    async fn notify(&self, alert: &LowStockAlert) -> Result<(), NotifyError> {
        let message = MailMessage {
            from: &self.config.from_address,
            to: &alert.supplier_email,
            subject: alert.subject(),
            text: alert.body(),
        };
        let json = serde_json::to_string(&message)?;

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .body(json)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(
                endpoint = %self.config.endpoint,
                to = %alert.supplier_email,
                "Low stock alert delivered"
            );
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            endpoint = %self.config.endpoint,
            status = %status,
            body = %body,
            "Mail relay refused low stock alert"
        );

        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn alert() -> LowStockAlert {
        LowStockAlert {
            supplier_email: "orders@acme.io".into(),
            product_id: "p-1".into(),
            product_name: "Hex Bolt M6".into(),
            quantity: 4,
        }
    }

    /// Accepts one request, answers with `status_line`, returns the raw request.
    async fn one_shot_relay(status_line: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request_complete(&raw) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
            }
            let response =
                format!("{status_line}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok");
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (format!("http://{addr}/mail"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    #[test]
    fn test_requires_endpoint() {
        let err = WebhookNotifier::new(WebhookConfig::default()).err().unwrap();
        assert!(matches!(err, NotifyError::Config(_)));
    }

    #[tokio::test]
    async fn test_posts_mail_message() {
        let (endpoint, relay) = one_shot_relay("HTTP/1.1 200 OK").await;
        let notifier = WebhookNotifier::new(
            WebhookConfig::default()
                .with_endpoint(endpoint)
                .with_from_address("stockroom@example.com"),
        )
        .unwrap();

        notifier.notify(&alert()).await.unwrap();

        let request = relay.await.unwrap();
        assert!(request.starts_with("POST /mail"));
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["from"], "stockroom@example.com");
        assert_eq!(json["to"], "orders@acme.io");
        assert_eq!(json["subject"], "Low Stock Alert: Hex Bolt M6");
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let (endpoint, relay) = one_shot_relay("HTTP/1.1 500 Internal Server Error").await;
        let notifier =
            WebhookNotifier::new(WebhookConfig::default().with_endpoint(endpoint)).unwrap();

        let err = notifier.notify(&alert()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 500, .. }));
        relay.await.unwrap();
    }
}
