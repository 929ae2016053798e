// src/reader.rs
// Request/reply types shared by both input strategies

use crate::InputError;
use std::io::Write;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETURN_VALUE: &str = "Timeout occured";

/// Prefix of the message written when the default value is substituted
pub const DEFAULT_NOTICE: &str = " No user input, defaulted to ";

/// One timed read: what to show, how long to wait, what to fall back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedRead {
    pub prompt: String,
    pub timeout: Duration,
    pub default_value: String,
}

impl Default for TimedRead {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            timeout: DEFAULT_TIMEOUT,
            default_value: DEFAULT_RETURN_VALUE.to_string(),
        }
    }
}

impl TimedRead {
    /// Build a request from the float-seconds form of the public API
    pub fn from_secs_f64(
        prompt: &str,
        timeout_seconds: f64,
        default_value: &str,
    ) -> Result<Self, InputError> {
        Ok(Self {
            prompt: prompt.to_string(),
            timeout: timeout_from_secs(timeout_seconds)?,
            default_value: default_value.to_string(),
        })
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }
}

/// Validate a timeout given in seconds
pub fn timeout_from_secs(seconds: f64) -> Result<Duration, InputError> {
    if !seconds.is_finite() {
        return Err(InputError::InvalidTimeout {
            input: seconds.to_string(),
            reason: "timeout must be a finite number".to_string(),
        });
    }

    if seconds <= 0.0 {
        return Err(InputError::InvalidTimeout {
            input: seconds.to_string(),
            reason: "timeout must be greater than zero".to_string(),
        });
    }

    Duration::try_from_secs_f64(seconds).map_err(|e| InputError::InvalidTimeout {
        input: seconds.to_string(),
        reason: e.to_string(),
    })
}

/// Outcome of a read that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The user completed a line before the deadline
    Line(String),
    /// The deadline passed; holds the caller's default value
    Defaulted(String),
}

impl Reply {
    pub fn timed_out(&self) -> bool {
        matches!(self, Reply::Defaulted(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Reply::Line(s) | Reply::Defaulted(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Reply::Line(s) | Reply::Defaulted(s) => s,
        }
    }
}

/// A strategy for reading one line under a deadline
pub trait LineReader {
    fn read(&mut self, request: &TimedRead) -> Result<Reply, InputError>;
}

pub(crate) fn write_prompt<W: Write>(out: &mut W, prompt: &str) -> Result<(), InputError> {
    out.write_all(prompt.as_bytes())?;
    out.flush()?;
    Ok(())
}

pub(crate) fn write_default_notice<W: Write>(
    out: &mut W,
    default_value: &str,
) -> Result<(), InputError> {
    writeln!(out, "{}'{}'", DEFAULT_NOTICE, default_value)?;
    out.flush()?;
    Ok(())
}
