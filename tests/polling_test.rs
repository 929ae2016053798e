// Polling strategy and the demo binary on Unix, with socket pairs and pipes
// standing in for the terminal.
#![cfg(unix)]

use inputtimeout::{InputError, LineReader, PollingReader, Reply, TimedRead};
use std::fs::File;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn request(timeout: Duration) -> TimedRead {
    TimedRead::default()
        .prompt("> ")
        .timeout(timeout)
        .default_value("fallback")
}

#[test]
fn ready_line_returns_immediately() {
    let (input, mut feed) = UnixStream::pair().unwrap();
    feed.write_all(b"abc\n").unwrap();

    let mut reader = PollingReader::new(input, Vec::new());
    let start = Instant::now();
    let reply = reader.read(&request(Duration::from_secs(5))).unwrap();

    assert_eq!(reply, Reply::Line("abc".to_string()));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn line_arriving_before_deadline_is_read() {
    let (input, mut feed) = UnixStream::pair().unwrap();
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        feed.write_all(b"late but in time\n").unwrap();
        feed
    });

    let mut reader = PollingReader::new(input, Vec::new());
    let reply = reader.read(&request(Duration::from_secs(5))).unwrap();
    assert_eq!(reply.as_str(), "late but in time");
    drop(writer.join().unwrap());
}

#[test]
fn silence_returns_default_after_timeout() {
    let (input, _feed) = UnixStream::pair().unwrap();

    let mut reader = PollingReader::new(input, Vec::new());
    let start = Instant::now();
    let reply = reader.read(&request(Duration::from_millis(300))).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(reply, Reply::Defaulted("fallback".to_string()));
    assert!(elapsed >= Duration::from_millis(290));
    assert!(elapsed < Duration::from_secs(3));

    let (_, out) = reader.into_inner();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        ">  No user input, defaulted to 'fallback'\n"
    );
}

#[test]
fn closed_input_yields_empty_line() {
    let (input, feed) = UnixStream::pair().unwrap();
    drop(feed);

    let mut reader = PollingReader::new(input, Vec::new());
    let reply = reader.read(&request(Duration::from_secs(1))).unwrap();
    assert_eq!(reply, Reply::Line(String::new()));
}

#[test]
fn unsubmitted_terminal_input_is_discarded_on_timeout() {
    let pty = nix::pty::openpty(None, None).unwrap();
    let mut keyboard = File::from(pty.master);
    let terminal = File::from(pty.slave);

    // Typed but never submitted with Enter
    keyboard.write_all(b"half typed").unwrap();

    let mut reader = PollingReader::new(terminal, Vec::new());
    let first = reader.read(&request(Duration::from_millis(300))).unwrap();
    assert!(first.timed_out());

    keyboard.write_all(b"fresh\n").unwrap();
    let second = reader.read(&request(Duration::from_secs(5))).unwrap();
    assert_eq!(second, Reply::Line("fresh".to_string()));
}

#[cfg(target_os = "linux")]
#[test]
fn signal_during_wait_interrupts_the_read() {
    use nix::sys::pthread::{pthread_kill, pthread_self};
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use std::sync::mpsc::{self, RecvTimeoutError};

    extern "C" fn ignore(_: nix::libc::c_int) {}

    // No SA_RESTART: the pending poll() comes back with EINTR
    let action = SigAction::new(SigHandler::Handler(ignore), SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(Signal::SIGUSR1, &action) }.unwrap();

    let (input, _feed) = UnixStream::pair().unwrap();
    let (tid_tx, tid_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();
    let reader_thread = thread::spawn(move || {
        tid_tx.send(pthread_self()).unwrap();
        let mut reader = PollingReader::new(input, Vec::new());
        done_tx
            .send(reader.read(&request(Duration::from_secs(10))))
            .unwrap();
    });

    let tid = tid_rx.recv().unwrap();
    // Keep signalling until the thread is inside poll() and reacts
    let result = loop {
        let _ = pthread_kill(tid, Signal::SIGUSR1);
        match done_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(result) => break result,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(e) => panic!("reader thread exited without a result: {e}"),
        }
    };
    reader_thread.join().unwrap();

    assert!(matches!(result, Err(InputError::Interrupted)));
}

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_inputtimeout"))
}

#[test]
fn binary_prints_piped_line() {
    let mut child = binary()
        .args(["-t", "5", "Who? "])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"alice\nbob\n").unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Who? alice\n");
}

#[test]
fn binary_defaults_and_uses_timeout_status() {
    let mut child = binary()
        .args(["-t", "0.2s", "-d", "guest", "--status-on-timeout", "124", "Who? "])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    // Hold stdin open without writing so the wait has to time out
    let _stdin = child.stdin.take().unwrap();

    let mut stdout = String::new();
    child.stdout.take().unwrap().read_to_string(&mut stdout).unwrap();
    let status = child.wait().unwrap();

    assert_eq!(status.code(), Some(124));
    assert_eq!(stdout, "Who?  No user input, defaulted to 'guest'\nguest\n");
}

#[test]
fn binary_rejects_bad_timeout() {
    let output = binary()
        .args(["-t", "soon"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(125));
}
