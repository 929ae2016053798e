// src/platform/mod.rs
// Platform abstraction layer and one-time strategy selection

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
pub use unix::PollingReader;

#[cfg(windows)]
pub use windows::{ConsoleKeys, PollingReader};

use crate::reader::{LineReader, Reply, TimedRead};
use crate::InputError;
use std::fmt;
use std::sync::OnceLock;

/// Which input strategy the process uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Console keystrokes with per-key deadline extension
    EventDriven,
    /// Single readiness wait on the input stream
    Polling,
}

static ACTIVE: OnceLock<Strategy> = OnceLock::new();

impl Strategy {
    /// Probe the environment for a console keystroke API
    pub fn detect() -> Self {
        #[cfg(windows)]
        {
            if windows::console_available() {
                return Strategy::EventDriven;
            }
        }
        Strategy::Polling
    }

    /// Strategy chosen on first use, fixed for the rest of the process
    pub fn active() -> Self {
        *ACTIVE.get_or_init(Self::detect)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::EventDriven => "event-driven",
            Strategy::Polling => "polling",
        }
    }

    /// Run one read against the process's standard streams
    pub(crate) fn read_stdio(self, request: &TimedRead) -> Result<Reply, InputError> {
        match self {
            #[cfg(windows)]
            Strategy::EventDriven => {
                let keys = ConsoleKeys::open()?;
                crate::event::EventDrivenReader::new(keys, std::io::stdout()).read(request)
            }
            #[cfg(not(windows))]
            Strategy::EventDriven => Err(InputError::Unsupported(self.as_str())),
            Strategy::Polling => PollingReader::stdio()?.read(request),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
