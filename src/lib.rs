//! Prompt for a line of console input and fall back to a default value when
//! nothing arrives in time.
//!
//! Two strategies sit behind [`read_line_with_timeout`]:
//!
//! - **event-driven** (Windows console): keystrokes are consumed one at a
//!   time and every key press pushes the deadline [`KEYSTROKE_GRACE`] into
//!   the future, so a user who is still typing is never cut off.
//! - **polling** (Unix, redirected Windows input): one readiness wait of
//!   exactly the requested timeout; the whole line must arrive before it
//!   expires.
//!
//! The two deliberately behave differently once the user starts typing.
//! The strategy is picked once per process, see [`Strategy::active`].

use std::time::{Duration, Instant};
use thiserror::Error;

pub mod event;
pub mod platform;
pub mod reader;

pub use event::{Clock, EventDrivenReader, KeySource, SystemClock, CHECK_INTERVAL, KEYSTROKE_GRACE};
pub use platform::{PollingReader, Strategy};
pub use reader::{
    LineReader, Reply, TimedRead, DEFAULT_NOTICE, DEFAULT_RETURN_VALUE, DEFAULT_TIMEOUT,
};

/// Errors from a timed read
#[derive(Error, Debug)]
pub enum InputError {
    #[error("interrupted by user")]
    Interrupted,

    #[error("invalid timeout '{input}': {reason}")]
    InvalidTimeout { input: String, reason: String },

    #[error("input/output error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(unix)]
    #[error("failed to wait on input: {0}")]
    Poll(#[from] nix::Error),

    #[cfg(windows)]
    #[error("console call {call} failed: {source}")]
    Console {
        call: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} input is not available on this platform")]
    Unsupported(&'static str),
}

impl InputError {
    pub fn is_interrupt(&self) -> bool {
        match self {
            InputError::Interrupted => true,
            InputError::Io(e) => e.kind() == std::io::ErrorKind::Interrupted,
            _ => false,
        }
    }
}

/// Platform detection helper
pub struct Platform;

impl Platform {
    pub const IS_WINDOWS: bool = cfg!(windows);
    pub const IS_LINUX: bool = cfg!(target_os = "linux");
    pub const IS_MACOS: bool = cfg!(target_os = "macos");

    pub fn name() -> &'static str {
        if Self::IS_WINDOWS {
            "Windows"
        } else if Self::IS_LINUX {
            "Linux"
        } else if Self::IS_MACOS {
            "macOS"
        } else if cfg!(unix) {
            "Unix"
        } else {
            "Unknown"
        }
    }
}

/// Per-read metrics for observability
#[derive(Debug, Clone)]
pub struct ReadMetrics {
    pub strategy: Strategy,
    pub timeout: Duration,
    pub timed_out: bool,
    pub interrupted: bool,
    pub elapsed: Duration,
    pub platform: &'static str,
}

impl ReadMetrics {
    pub const ENV_VAR: &'static str = "INPUTTIMEOUT_METRICS";

    pub fn to_json(&self) -> String {
        format!(
            r#"{{"strategy":"{}","timeout_ms":{},"timed_out":{},"interrupted":{},"elapsed_ms":{},"platform":"{}"}}"#,
            self.strategy,
            self.timeout.as_millis(),
            self.timed_out,
            self.interrupted,
            self.elapsed.as_millis(),
            self.platform
        )
    }

    pub fn log(&self) {
        if std::env::var(Self::ENV_VAR).is_ok() {
            eprintln!("{}", self.to_json());
        }
    }
}

/// Strategy bound for this process
pub fn active_strategy() -> Strategy {
    Strategy::active()
}

/// Run `request` on the process's stdin/stdout with the active strategy
pub fn read_with(request: &TimedRead) -> Result<Reply, InputError> {
    let strategy = Strategy::active();
    let start = Instant::now();
    let result = strategy.read_stdio(request);

    ReadMetrics {
        strategy,
        timeout: request.timeout,
        timed_out: matches!(&result, Ok(reply) if reply.timed_out()),
        interrupted: matches!(&result, Err(e) if e.is_interrupt()),
        elapsed: start.elapsed(),
        platform: Platform::name(),
    }
    .log();

    result
}

/// Prompt on stdout and read one line from stdin, returning `default_value`
/// if no line is completed within `timeout_seconds`.
///
/// On timeout a notice of the form ` No user input, defaulted to '<value>'`
/// is written to stdout. A Ctrl+C keystroke (event-driven) or an interrupted
/// wait (polling) yields [`InputError::Interrupted`].
pub fn read_line_with_timeout(
    prompt: &str,
    timeout_seconds: f64,
    default_value: &str,
) -> Result<String, InputError> {
    let request = TimedRead::from_secs_f64(prompt, timeout_seconds, default_value)?;
    read_with(&request).map(Reply::into_string)
}
