// src/platform/windows.rs
// Windows console keystroke source and a deadline-bounded fallback reader

use crate::event::{KeySource, CHECK_INTERVAL};
use crate::reader::{write_default_notice, write_prompt, LineReader, Reply, TimedRead};
use crate::InputError;
use std::io::{self, BufRead, Write};
use std::ptr;
use std::time::{Duration, Instant};
use windows_sys::Win32::Foundation::{
    ERROR_BROKEN_PIPE, HANDLE, INVALID_HANDLE_VALUE, WAIT_FAILED, WAIT_OBJECT_0,
};
use windows_sys::Win32::Storage::FileSystem::{GetFileType, ReadFile, FILE_TYPE_PIPE};
use windows_sys::Win32::System::Console::{
    FlushConsoleInputBuffer, GetConsoleMode, GetNumberOfConsoleInputEvents, GetStdHandle,
    ReadConsoleInputW, SetConsoleMode, CONSOLE_MODE, ENABLE_PROCESSED_INPUT, INPUT_RECORD,
    KEY_EVENT, STD_INPUT_HANDLE,
};
use windows_sys::Win32::System::Pipes::PeekNamedPipe;
use windows_sys::Win32::System::Threading::WaitForSingleObject;

fn stdin_handle() -> Result<HANDLE, InputError> {
    let handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
    if handle == INVALID_HANDLE_VALUE || handle == 0 {
        return Err(console_error("GetStdHandle"));
    }
    Ok(handle)
}

fn console_error(call: &'static str) -> InputError {
    InputError::Console {
        call,
        source: io::Error::last_os_error(),
    }
}

fn console_mode(handle: HANDLE) -> Option<CONSOLE_MODE> {
    let mut mode: CONSOLE_MODE = 0;
    if unsafe { GetConsoleMode(handle, &mut mode) } == 0 {
        None
    } else {
        Some(mode)
    }
}

/// True when standard input is an interactive console
pub fn console_available() -> bool {
    stdin_handle().ok().and_then(console_mode).is_some()
}

/// Keeps Ctrl+C in the input queue while alive so it arrives as a keystroke
struct ProcessedInputGuard {
    handle: HANDLE,
    saved: CONSOLE_MODE,
}

impl ProcessedInputGuard {
    fn new(handle: HANDLE) -> Result<Self, InputError> {
        let saved = console_mode(handle).ok_or_else(|| console_error("GetConsoleMode"))?;
        if unsafe { SetConsoleMode(handle, saved & !ENABLE_PROCESSED_INPUT) } == 0 {
            return Err(console_error("SetConsoleMode"));
        }
        Ok(Self { handle, saved })
    }
}

impl Drop for ProcessedInputGuard {
    fn drop(&mut self) {
        unsafe {
            SetConsoleMode(self.handle, self.saved);
        }
    }
}

/// Pending key-down characters from the console input buffer
pub struct ConsoleKeys {
    handle: HANDLE,
    _guard: ProcessedInputGuard,
}

impl ConsoleKeys {
    pub fn open() -> Result<Self, InputError> {
        let handle = stdin_handle()?;
        let guard = ProcessedInputGuard::new(handle)?;
        Ok(Self {
            handle,
            _guard: guard,
        })
    }
}

impl KeySource for ConsoleKeys {
    fn next_key(&mut self) -> Result<Option<char>, InputError> {
        loop {
            let mut pending: u32 = 0;
            if unsafe { GetNumberOfConsoleInputEvents(self.handle, &mut pending) } == 0 {
                return Err(console_error("GetNumberOfConsoleInputEvents"));
            }
            if pending == 0 {
                return Ok(None);
            }

            let mut record: INPUT_RECORD = unsafe { std::mem::zeroed() };
            let mut read: u32 = 0;
            if unsafe { ReadConsoleInputW(self.handle, &mut record, 1, &mut read) } == 0 {
                return Err(console_error("ReadConsoleInputW"));
            }
            if read == 0 || u32::from(record.EventType) != KEY_EVENT as u32 {
                continue;
            }

            let key = unsafe { record.Event.KeyEvent };
            if key.bKeyDown == 0 {
                continue;
            }
            // Surrogate halves and modifier-only presses carry no usable char
            let unit = unsafe { key.uChar.UnicodeChar };
            if let Some(c) = char::from_u32(u32::from(unit)).filter(|&c| c != '\0') {
                return Ok(Some(c));
            }
        }
    }
}

/// Fallback used when stdin is not a console (redirected input).
/// The whole line must arrive before the timeout.
pub struct PollingReader<W> {
    out: W,
}

impl PollingReader<io::Stdout> {
    pub fn stdio() -> Result<Self, InputError> {
        Ok(Self::new(io::stdout()))
    }
}

impl<W: Write> PollingReader<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Read from a pipe a byte at a time, peeking first so nothing blocks
    /// past `deadline`. `None` means the line was not complete in time.
    fn read_pipe_line(
        &self,
        handle: HANDLE,
        deadline: Instant,
    ) -> Result<Option<String>, InputError> {
        let mut line = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }

            let mut available: u32 = 0;
            let peeked = unsafe {
                PeekNamedPipe(
                    handle,
                    ptr::null_mut(),
                    0,
                    ptr::null_mut(),
                    &mut available,
                    ptr::null_mut(),
                )
            };
            if peeked == 0 {
                broken_pipe_or("PeekNamedPipe")?;
                return into_line(line).map(Some);
            }
            if available == 0 {
                std::thread::sleep(CHECK_INTERVAL.min(remaining));
                continue;
            }

            let mut byte = 0u8;
            let mut read: u32 = 0;
            if unsafe { ReadFile(handle, &mut byte, 1, &mut read, ptr::null_mut()) } == 0 {
                broken_pipe_or("ReadFile")?;
                return into_line(line).map(Some);
            }
            match (read, byte) {
                (0, _) | (_, b'\n') => return into_line(line).map(Some),
                _ => line.push(byte),
            }
        }
    }

    fn wait_readable(&self, handle: HANDLE, timeout: Duration) -> Result<bool, InputError> {
        let millis = u32::try_from(timeout.as_nanos().div_ceil(1_000_000)).unwrap_or(u32::MAX - 1);
        match unsafe { WaitForSingleObject(handle, millis) } {
            WAIT_OBJECT_0 => Ok(true),
            WAIT_FAILED => Err(console_error("WaitForSingleObject")),
            _ => Ok(false),
        }
    }

    fn read_waited_line(
        &self,
        handle: HANDLE,
        timeout: Duration,
    ) -> Result<Option<String>, InputError> {
        if !self.wait_readable(handle, timeout)? {
            return Ok(None);
        }
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        if line.ends_with('\n') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// A closed write end reads as end of input; anything else is an error
fn broken_pipe_or(call: &'static str) -> Result<(), InputError> {
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(ERROR_BROKEN_PIPE as i32) {
        Ok(())
    } else {
        Err(InputError::Console { call, source: err })
    }
}

fn into_line(bytes: Vec<u8>) -> Result<String, InputError> {
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

impl<W: Write> LineReader for PollingReader<W> {
    fn read(&mut self, request: &TimedRead) -> Result<Reply, InputError> {
        write_prompt(&mut self.out, &request.prompt)?;
        let handle = stdin_handle()?;

        // WaitForSingleObject reports pipes as always signalled
        let line = if unsafe { GetFileType(handle) } == FILE_TYPE_PIPE {
            self.read_pipe_line(handle, Instant::now() + request.timeout)?
        } else {
            self.read_waited_line(handle, request.timeout)?
        };
        if let Some(line) = line {
            return Ok(Reply::Line(line));
        }

        if console_mode(handle).is_some() && unsafe { FlushConsoleInputBuffer(handle) } == 0 {
            return Err(console_error("FlushConsoleInputBuffer"));
        }
        write_default_notice(&mut self.out, &request.default_value)?;
        Ok(Reply::Defaulted(request.default_value.clone()))
    }
}
