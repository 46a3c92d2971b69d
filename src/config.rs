use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;

pub const WEBHOOK_URL_VAR: &str = "SLACK_WEBHOOK_URL";
pub const TIMEOUT_VAR: &str = "SLACK_WEBHOOK_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq)]
pub struct NotifierConfig {
    webhook_url: String,
    timeout: Duration,
}

// The webhook URL is the credential, so it never appears in debug output.
impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("webhook_url", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NotifierConfig {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        let webhook_url = webhook_url.into();

        if webhook_url.trim().is_empty() {
            return Err(Error::Configuration(
                "webhook URL must not be empty".to_string(),
            ));
        }

        Ok(Self {
            webhook_url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Reads `SLACK_WEBHOOK_URL` (and optionally `SLACK_WEBHOOK_TIMEOUT_SECS`)
    /// from the process environment.
    pub fn from_env() -> Result<Self> {
        let webhook_url = env_webhook_url().ok_or_else(|| {
            Error::Configuration(format!("{} is not set", WEBHOOK_URL_VAR))
        })?;

        Self::new(webhook_url)?.with_env_timeout()
    }

    /// Loads `path` into the process environment, then behaves like [`Self::from_env`].
    ///
    /// Variables that are already set are not overridden. A missing file is
    /// only a warning: the variable may still come from the real environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        load_env_file(path.as_ref())?;
        Self::from_env()
    }

    /// Resolves the endpoint from, in order: the literal argument, the
    /// environment (after loading `env_file` if given), the caller's fallback.
    pub fn resolve(
        literal: Option<&str>,
        env_file: Option<&Path>,
        fallback: Option<&str>,
    ) -> Result<Self> {
        if let Some(url) = literal.filter(|url| !url.trim().is_empty()) {
            return Self::new(url);
        }

        if let Some(path) = env_file {
            load_env_file(path)?;
        }

        if let Some(url) = env_webhook_url() {
            return Self::new(url)?.with_env_timeout();
        }

        match fallback.filter(|url| !url.trim().is_empty()) {
            Some(url) => Self::new(url),
            None => Err(Error::Configuration(format!(
                "no webhook endpoint: pass one explicitly or set {}",
                WEBHOOK_URL_VAR
            ))),
        }
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        self
    }

    fn with_env_timeout(self) -> Result<Self> {
        let Ok(value) = std::env::var(TIMEOUT_VAR) else {
            return Ok(self);
        };

        let secs = value.trim().parse::<u64>().map_err(|_| {
            Error::Configuration(format!("{} must be a whole number of seconds", TIMEOUT_VAR))
        })?;

        Ok(self.with_timeout(Duration::from_secs(secs)))
    }
}

fn env_webhook_url() -> Option<String> {
    std::env::var(WEBHOOK_URL_VAR)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(err) if err.not_found() => {
            tracing::warn!(path = %path.display(), "env file not found");
            Ok(())
        }
        Err(source) => Err(Error::EnvFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}
