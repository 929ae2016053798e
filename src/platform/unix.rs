// src/platform/unix.rs
// Unix polling strategy using poll() on the input descriptor

use crate::reader::{write_default_notice, write_prompt, LineReader, Reply, TimedRead};
use crate::InputError;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::termios::{tcflush, FlushArg};
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Read, Stdout, Write};
use std::os::fd::AsFd;
use std::time::{Duration, Instant};

/// The whole line must arrive before the timeout; typing does not extend it.
pub struct PollingReader<R, W> {
    input: BufReader<R>,
    out: W,
}

impl PollingReader<File, Stdout> {
    /// Reads fd 0 a byte at a time so nothing past the line is consumed
    /// and later calls still see the rest of the stream.
    pub fn stdio() -> Result<Self, InputError> {
        let fd = io::stdin().as_fd().try_clone_to_owned()?;
        Ok(Self {
            input: BufReader::with_capacity(1, File::from(fd)),
            out: io::stdout(),
        })
    }
}

impl<R: Read + AsFd, W: Write> PollingReader<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input: BufReader::new(input),
            out,
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input.into_inner(), self.out)
    }

    /// Block until the stream is readable or `timeout` passes
    fn wait_readable(&self, timeout: Duration) -> Result<bool, InputError> {
        let fd = self.input.get_ref().as_fd();
        let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];

        match poll(&mut fds, poll_timeout(timeout)) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(true),
            Err(Errno::EINTR) => Err(InputError::Interrupted),
            Err(e) => Err(InputError::Poll(e)),
        }
    }

    /// Collect bytes up to a line feed, waiting only until `deadline`.
    /// `None` means the line was not complete in time; any partial bytes are dropped.
    fn read_line_until(&mut self, deadline: Instant) -> Result<Option<String>, InputError> {
        let mut line = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }

            let buffered = self.input.buffer();
            if let Some(pos) = buffered.iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&buffered[..pos]);
                self.input.consume(pos + 1);
                return into_line(line).map(Some);
            }
            if !buffered.is_empty() {
                let len = buffered.len();
                line.extend_from_slice(buffered);
                self.input.consume(len);
                continue;
            }

            if !self.wait_readable(remaining)? {
                return Ok(None);
            }
            // EOF ends the line like a line feed would
            if self.input.fill_buf()?.is_empty() {
                return into_line(line).map(Some);
            }
        }
    }

    /// Drop typed-but-unsubmitted input so it cannot leak into the next prompt
    fn discard_pending(&self) -> Result<(), InputError> {
        let fd = self.input.get_ref().as_fd();
        if fd.is_terminal() {
            tcflush(fd, FlushArg::TCIFLUSH)?;
        }
        Ok(())
    }
}

/// poll() counts whole milliseconds; round up so a short timeout still waits
fn poll_timeout(timeout: Duration) -> PollTimeout {
    let millis = u64::try_from(timeout.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX);
    PollTimeout::try_from(Duration::from_millis(millis)).unwrap_or(PollTimeout::MAX)
}

fn into_line(bytes: Vec<u8>) -> Result<String, InputError> {
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

impl<R: Read + AsFd, W: Write> LineReader for PollingReader<R, W> {
    fn read(&mut self, request: &TimedRead) -> Result<Reply, InputError> {
        write_prompt(&mut self.out, &request.prompt)?;

        let deadline = Instant::now() + request.timeout;
        if let Some(line) = self.read_line_until(deadline)? {
            return Ok(Reply::Line(line));
        }

        self.discard_pending()?;
        write_default_notice(&mut self.out, &request.default_value)?;
        Ok(Reply::Defaulted(request.default_value.clone()))
    }
}
