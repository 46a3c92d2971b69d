//! Wiring a notifier around a job: success/error on completion, and on panic.

use crate::error::Result;
use crate::exception::{capture_frames, ExceptionDetail};
use crate::notify::Notifier;
use crate::slack::{Delivery, Transport, TRACING_TARGET};
use std::any::Any;
use std::panic::Location;
use std::sync::Arc;

pub const PANIC_SUMMARY: &str = "The program panicked.";

impl<T: Transport> Notifier<T> {
    pub fn report<V>(
        &self,
        outcome: &anyhow::Result<V>,
        success_message: Option<&str>,
    ) -> Result<Delivery> {
        match outcome {
            Ok(_) => self.send_success(success_message),
            Err(err) => self.send_error(None, Some(&ExceptionDetail::from_anyhow(err))),
        }
    }

    /// Runs `job` and reports how it went. The job's own result is returned
    /// untouched; a failed notification is only logged.
    pub fn run<V>(&self, job: impl FnOnce() -> anyhow::Result<V>) -> anyhow::Result<V> {
        let outcome = job();

        if let Err(e) = self.report(&outcome, None) {
            tracing::error!(target: TRACING_TARGET, error = %e, "Unable to send job notification");
        }

        outcome
    }
}

/// Sends an error notification for every panic, then defers to the
/// previously installed hook.
///
/// The notification goes out from a short-lived helper thread so that a
/// blocking transport still works when the panic happens on an async runtime
/// worker. The panicking thread waits for that delivery before the previous
/// hook runs.
pub fn install_panic_hook<T>(notifier: Arc<Notifier<T>>)
where
    T: Transport + Send + Sync + 'static,
{
    let previous = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let detail = panic_detail(info.payload(), info.location());

        std::thread::scope(|scope| {
            let sender = std::thread::Builder::new()
                .name("slack-panic-notify".to_string())
                .spawn_scoped(scope, || notifier.send_error(Some(PANIC_SUMMARY), Some(&detail)));

            match sender.map(|handle| handle.join()) {
                Ok(Ok(Ok(_))) => {}
                Ok(Ok(Err(e))) => {
                    tracing::error!(target: TRACING_TARGET, error = %e, "Unable to send panic notification")
                }
                Ok(Err(_)) => {
                    tracing::error!(target: TRACING_TARGET, "Panic notification sender panicked")
                }
                Err(e) => {
                    tracing::error!(target: TRACING_TARGET, error = %e, "Unable to spawn panic notification sender")
                }
            }
        });

        previous(info);
    }));
}

fn panic_detail(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> ExceptionDetail {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    };

    let message = match location {
        Some(location) => format!("{} at {}", message, location),
        None => message,
    };

    ExceptionDetail::new("panic", message).with_frames(capture_frames())
}
