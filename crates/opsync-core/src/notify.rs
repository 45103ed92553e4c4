//! Fire-and-forget notification delivery.
//!
//! The engine announces applied operations over a webhook. Delivery is
//! best-effort: failures are logged and never propagate into the drain loop.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::util::{compact_text, normalize_text_option, now_ms};

/// Event sink consumed by the sync engine.
#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    /// Deliver an event. Must not fail the caller.
    async fn trigger_webhook(&self, event: &str, payload: Value);
}

/// Emitter that drops every event. The default for local-only setups.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotificationEmitter;

#[async_trait]
impl NotificationEmitter for NullNotificationEmitter {
    async fn trigger_webhook(&self, event: &str, _payload: Value) {
        debug!("Dropping event {event} (no webhook configured)");
    }
}

/// Emitter that POSTs events as JSON to a configured endpoint.
pub struct HttpNotificationEmitter {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpNotificationEmitter {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint.into())?;
        Ok(Self {
            endpoint,
            client: reqwest::Client::builder()
                .build()
                .map_err(|error| Error::InvalidInput(error.to_string()))?,
        })
    }
}

#[async_trait]
impl NotificationEmitter for HttpNotificationEmitter {
    async fn trigger_webhook(&self, event: &str, payload: Value) {
        let body = serde_json::json!({
            "event": event,
            "payload": payload,
            "sent_at": now_ms(),
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                debug!("Delivered webhook event {event}");
            }
            Ok(response) => {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                warn!(
                    "Webhook event {event} rejected with {status}: {}",
                    compact_text(&text)
                );
            }
            Err(error) => {
                warn!("Webhook event {event} delivery failed: {error}");
            }
        }
    }
}

/// Emitter that records events in memory, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNotificationEmitter {
    events: std::sync::Mutex<Vec<(String, Value)>>,
}

impl RecordingNotificationEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events captured so far, in delivery order.
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationEmitter for RecordingNotificationEmitter {
    async fn trigger_webhook(&self, event: &str, payload: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event.to_string(), payload));
        }
    }
}

fn normalize_endpoint(raw: String) -> Result<String> {
    let endpoint = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidInput("webhook endpoint must not be empty".to_string()))?;
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "webhook endpoint must include http:// or https://".to_string(),
        ))
    }
}
