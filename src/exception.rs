use regex::Regex;
use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};

// Frames belonging to the capture machinery rather than to the failing code.
const INTERNAL_FRAME_PREFIXES: &[&str] = &[
    "std::backtrace",
    "std::panicking",
    "std::panic::",
    "core::panicking",
    "rust_begin_unwind",
    "anyhow::",
    "<anyhow::",
    "slack_notifier::exception::",
    "slack_notifier::report::",
];

/// A language-neutral description of a failure, decoupled from however the
/// caller represents errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionDetail {
    pub type_name: String,
    pub message: String,
    /// Call frames, outermost first.
    pub frames: Vec<String>,
}

impl ExceptionDetail {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            frames: vec![],
        }
    }

    #[must_use]
    pub fn with_frames<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frames = frames.into_iter().map(Into::into).collect();
        self
    }

    /// Rust errors carry no stack, so the frames are those of the caller.
    ///
    /// The type name is the static type of `E`. For trait objects
    /// (`&*boxed` from a `Box<dyn Error>`) that is only `Error`; build the
    /// detail with [`ExceptionDetail::new`] when the concrete type is known.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::new(short_type_name(std::any::type_name::<E>()), err.to_string())
            .with_frames(capture_frames())
    }

    /// Prefers the backtrace anyhow recorded when the error was created
    /// (requires `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE`).
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let backtrace = err.backtrace();

        let frames = if backtrace.status() == BacktraceStatus::Captured {
            parse_frames(&backtrace.to_string())
        } else {
            capture_frames()
        };

        Self::new("anyhow::Error", format!("{:#}", err)).with_frames(frames)
    }
}

pub(crate) fn capture_frames() -> Vec<String> {
    let backtrace = Backtrace::force_capture();

    if backtrace.status() != BacktraceStatus::Captured {
        return vec![];
    }

    parse_frames(&backtrace.to_string())
}

/// Turns the textual form of a std backtrace (innermost frame first) into
/// frame descriptions ordered outermost first.
pub(crate) fn parse_frames(backtrace: &str) -> Vec<String> {
    let frame_regex = Regex::new(r"^\s*\d+:\s+(.+?)\s*$").unwrap();
    let location_regex = Regex::new(r"^\s*at\s+(.+?)\s*$").unwrap();

    let mut frames: Vec<String> = vec![];

    for line in backtrace.lines() {
        if let Some(captures) = frame_regex.captures(line) {
            frames.push(captures[1].to_string());
        } else if let Some(captures) = location_regex.captures(line) {
            if let Some(frame) = frames.last_mut() {
                frame.push_str(" at ");
                frame.push_str(&captures[1]);
            }
        }
    }

    frames.retain(|frame| !is_internal_frame(frame));
    frames.reverse();
    frames
}

fn is_internal_frame(frame: &str) -> bool {
    INTERNAL_FRAME_PREFIXES
        .iter()
        .any(|prefix| frame.starts_with(prefix))
}

fn short_type_name(name: &str) -> String {
    let without_generics = name.split('<').next().unwrap_or(name);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim_start_matches("dyn ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_BACKTRACE: &str = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:312:9
   1: slack_notifier::exception::capture_frames
             at ./src/exception.rs:71:21
   2: etl::load::divide
             at ./src/load.rs:10:5
   3: etl::main
             at ./src/main.rs:4:13
   4: core::ops::function::FnOnce::call_once
note: Some details are omitted, run with `RUST_BACKTRACE=full` for a verbose backtrace.
";

    #[test]
    fn test_parse_frames_orders_outermost_first_and_drops_capture_frames() {
        let frames = parse_frames(SAMPLE_BACKTRACE);

        assert_eq!(
            frames,
            vec![
                "core::ops::function::FnOnce::call_once".to_string(),
                "etl::main at ./src/main.rs:4:13".to_string(),
                "etl::load::divide at ./src/load.rs:10:5".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_frames_of_unsupported_backtrace_is_empty() {
        assert!(parse_frames("unsupported backtrace").is_empty());
        assert!(parse_frames("disabled backtrace").is_empty());
    }

    #[test]
    fn test_from_error_uses_short_type_name_and_display() {
        let err = "x".parse::<u32>().unwrap_err();
        let detail = ExceptionDetail::from_error(&err);

        assert_eq!(detail.type_name, "ParseIntError");
        assert_eq!(detail.message, "invalid digit found in string");
    }

    #[test]
    fn test_from_error_on_trait_object_only_knows_the_trait() {
        let boxed: Box<dyn std::error::Error> = "x".parse::<u32>().unwrap_err().into();
        let detail = ExceptionDetail::from_error(&*boxed);

        assert_eq!(detail.type_name, "Error");
        assert_eq!(detail.message, "invalid digit found in string");
    }

    #[test]
    fn test_from_anyhow_keeps_context_chain() {
        let err = anyhow::anyhow!("division by zero").context("computing ratio");
        let detail = ExceptionDetail::from_anyhow(&err);

        assert_eq!(detail.type_name, "anyhow::Error");
        assert_eq!(detail.message, "computing ratio: division by zero");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("std::io::error::Error"), "Error");
        assert_eq!(short_type_name("app::Wrapper<std::io::Error>"), "Wrapper");
        assert_eq!(short_type_name("dyn core::error::Error"), "Error");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
