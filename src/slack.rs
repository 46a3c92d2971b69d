use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub(crate) const TRACING_TARGET: &str = "slack_notifier::slack";

/// Issues a single POST of a JSON body and hands back the raw response body.
///
/// Implementations must return the body whatever the HTTP status: Slack
/// reports rejections (`invalid_token`, `no_text`, ...) as a 4xx with a text
/// body, and that body is what gets classified.
pub trait Transport {
    fn post(&self, webhook_url: &str, body: &Value) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Transport for ReqwestTransport {
    fn post(&self, webhook_url: &str, body: &Value) -> Result<String> {
        // A fresh client per call: nothing is kept alive between notifications.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let response = client.post(webhook_url).json(body).send()?;

        tracing::debug!(
            target: TRACING_TARGET,
            status = %response.status(),
            "webhook responded"
        );

        Ok(response.text()?)
    }
}

pub fn payload(message: &str) -> Value {
    json!({ "text": message })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Delivery {
    Success,
    Failure { response: String },
}

impl Delivery {
    /// Slack answers a delivered webhook with the bare text `ok`.
    pub fn classify(body: &str) -> Self {
        if body.trim().eq_ignore_ascii_case("ok") {
            Delivery::Success
        } else {
            Delivery::Failure {
                response: body.to_string(),
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Delivery::Success)
    }

    pub fn response(&self) -> Option<&str> {
        match self {
            Delivery::Success => None,
            Delivery::Failure { response } => Some(response),
        }
    }
}
