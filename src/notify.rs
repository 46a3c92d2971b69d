use crate::config::NotifierConfig;
use crate::error::{Error, Result};
use crate::exception::ExceptionDetail;
use crate::slack::{self, Delivery, ReqwestTransport, Transport, TRACING_TARGET};
use std::path::Path;

pub const SUCCESS_GLYPH: &str = "✅";
pub const ERROR_GLYPH: &str = "❌";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "The code completed successfully! 🚀";
pub const DEFAULT_ERROR_SUMMARY: &str = "An unexpected error occurred during execution.";

/// Posts notifications to one Slack incoming webhook.
///
/// Each call makes exactly one delivery attempt. Transport failures are
/// returned as [`Error::Transport`]; a response other than `ok` is a
/// [`Delivery::Failure`] and left to the caller to act on.
pub struct Notifier<T = ReqwestTransport> {
    config: NotifierConfig,
    transport: T,
}

impl<T> std::fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Notifier<ReqwestTransport> {
    pub fn new(config: NotifierConfig) -> Self {
        let transport = ReqwestTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(NotifierConfig::from_env()?))
    }

    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(NotifierConfig::from_env_file(path)?))
    }
}

impl<T: Transport> Notifier<T> {
    pub fn with_transport(config: NotifierConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn send(&self, message: &str) -> Result<Delivery> {
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }

        tracing::debug!(target: TRACING_TARGET, len = message.len(), "sending Slack message");

        let body = self
            .transport
            .post(self.config.webhook_url(), &slack::payload(message))?;

        let delivery = Delivery::classify(&body);

        match &delivery {
            Delivery::Success => tracing::info!(target: TRACING_TARGET, "Slack message delivered"),
            Delivery::Failure { response } => tracing::warn!(
                target: TRACING_TARGET,
                response = %response,
                "Slack rejected message"
            ),
        }

        Ok(delivery)
    }

    pub fn send_success(&self, message: Option<&str>) -> Result<Delivery> {
        self.send(&success_message(message))
    }

    pub fn send_error(
        &self,
        summary: Option<&str>,
        detail: Option<&ExceptionDetail>,
    ) -> Result<Delivery> {
        self.send(&error_message(summary, detail))
    }
}

pub fn success_message(message: Option<&str>) -> String {
    format!(
        "{} {}",
        SUCCESS_GLYPH,
        message.unwrap_or(DEFAULT_SUCCESS_MESSAGE)
    )
}

pub fn error_message(summary: Option<&str>, detail: Option<&ExceptionDetail>) -> String {
    let mut message = format!(
        "{} *An error occurred!* {}",
        ERROR_GLYPH,
        summary.unwrap_or(DEFAULT_ERROR_SUMMARY)
    );

    if let Some(detail) = detail {
        message.push_str(&format!("\n\n*Exception*: `{}`", detail.type_name));
        message.push_str(&format!("\n*Message*: `{}`", detail.message));
        message.push_str(&format!(
            "\n*Traceback:* ```\n{}\n```",
            detail.frames.join("\n")
        ));
    }

    message
}
