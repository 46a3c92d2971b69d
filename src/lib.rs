//! Slack incoming-webhook notifications for jobs: success, error (with
//! exception detail and traceback), and panics.
//!
//! ```no_run
//! use slack_notifier::Notifier;
//!
//! let notifier = Notifier::from_env_file(".env")?;
//! let delivery = notifier.send_success(Some("Nightly import finished"))?;
//! if !delivery.is_success() {
//!     eprintln!("Slack said: {:?}", delivery.response());
//! }
//! # Ok::<(), slack_notifier::Error>(())
//! ```

mod config;
mod error;
mod exception;
mod notify;
mod report;
mod slack;

pub use config::{NotifierConfig, DEFAULT_TIMEOUT, TIMEOUT_VAR, WEBHOOK_URL_VAR};
pub use error::{Error, Result};
pub use exception::ExceptionDetail;
pub use notify::{
    error_message, success_message, Notifier, DEFAULT_ERROR_SUMMARY, DEFAULT_SUCCESS_MESSAGE,
    ERROR_GLYPH, SUCCESS_GLYPH,
};
pub use report::{install_panic_hook, PANIC_SUMMARY};
pub use slack::{payload, Delivery, ReqwestTransport, Transport};
