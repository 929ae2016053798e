// src/event.rs
// Event-driven strategy: consume keystrokes one at a time and edit the line ourselves

use crate::reader::{write_default_notice, write_prompt, LineReader, Reply, TimedRead};
use crate::InputError;
use std::io::Write;
use std::time::{Duration, Instant};

/// Every keystroke pushes the deadline this far into the future,
/// regardless of the configured timeout.
pub const KEYSTROKE_GRACE: Duration = Duration::from_secs(20);

/// Sleep between checks for a pending keystroke
pub const CHECK_INTERVAL: Duration = Duration::from_millis(50);

const CR: char = '\r';
const LF: char = '\n';
const CTRL_Z: char = '\x1A';
const CTRL_C: char = '\x03';
const BACKSPACE: char = '\x08';

/// Source of single keystrokes, non-blocking
pub trait KeySource {
    /// Return the next pending character, or `None` if no key is waiting.
    fn next_key(&mut self) -> Result<Option<char>, InputError>;
}

/// Time source for the deadline loop
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

pub struct EventDrivenReader<K, W, C = SystemClock> {
    keys: K,
    out: W,
    clock: C,
}

impl<K: KeySource, W: Write> EventDrivenReader<K, W, SystemClock> {
    pub fn new(keys: K, out: W) -> Self {
        Self::with_clock(keys, out, SystemClock)
    }
}

impl<K: KeySource, W: Write, C: Clock> EventDrivenReader<K, W, C> {
    pub fn with_clock(keys: K, out: W, clock: C) -> Self {
        Self { keys, out, clock }
    }

    pub fn into_inner(self) -> (K, W) {
        (self.keys, self.out)
    }

    /// Erase the drawn prompt+line and draw it again from column zero
    fn redraw_line(&mut self, prompt: &str, line: &str) -> Result<(), InputError> {
        let width = prompt.chars().count() + line.chars().count() + 1;
        write!(self.out, "{CR}{:width$}{CR}{prompt}{line}", "")?;
        self.out.flush()?;
        Ok(())
    }

    fn echo(&mut self, c: char) -> Result<(), InputError> {
        write!(self.out, "{c}")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<K: KeySource, W: Write, C: Clock> LineReader for EventDrivenReader<K, W, C> {
    fn read(&mut self, request: &TimedRead) -> Result<Reply, InputError> {
        write_prompt(&mut self.out, &request.prompt)?;

        let mut deadline = self.clock.now() + request.timeout;
        let mut line = String::new();

        while self.clock.now() < deadline {
            let Some(c) = self.keys.next_key()? else {
                self.clock.sleep(CHECK_INTERVAL);
                continue;
            };

            deadline = self.clock.now() + KEYSTROKE_GRACE;

            match c {
                CR | LF | CTRL_Z => {
                    write!(self.out, "{CR}{LF}")?;
                    self.out.flush()?;
                    return Ok(Reply::Line(line));
                }
                CTRL_C => return Err(InputError::Interrupted),
                BACKSPACE => {
                    self.echo(c)?;
                    line.pop();
                    self.redraw_line(&request.prompt, &line)?;
                }
                _ => {
                    self.echo(c)?;
                    line.push(c);
                }
            }
        }

        write_default_notice(&mut self.out, &request.default_value)?;
        Ok(Reply::Defaulted(request.default_value.clone()))
    }
}
