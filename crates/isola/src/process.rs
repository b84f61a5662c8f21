//! Isolated child processes
//!
//! Each test runs in a fresh copy of the current executable, started with
//! `--test <path> -r subprocess`. Its stdout is drained on a reader thread
//! while the parent polls for exit, so a chatty child never blocks on a full
//! pipe.
//!
//! Anything the test itself spawned may inherit the pipe and keep it open
//! after the child is gone. Collection therefore stops at end of file or at a
//! deadline, whichever comes first; the reader thread is left to finish on
//! its own.

use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How long output may keep arriving once the child has been reaped
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Command line that re-runs a single test in a child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedCommand {
    program: PathBuf,
    test: String,
}

/// Everything the parent collected from one child
#[derive(Debug)]
pub struct ChildOutput {
    /// Stdout, split into lines, decoded lossily
    pub lines: Vec<String>,
    pub timed_out: bool,
    /// Exit status after the child was reaped
    pub status: ExitStatus,
    pub duration: Duration,
}

impl IsolatedCommand {
    /// Re-invoke the running executable for `test`
    pub fn for_test(test: impl Into<String>) -> io::Result<Self> {
        Ok(Self::with_program(std::env::current_exe()?, test))
    }

    /// Run `test` through a specific test binary
    pub fn with_program(program: impl Into<PathBuf>, test: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            test: test.into(),
        }
    }

    pub fn test(&self) -> &str {
        &self.test
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--test")
            .arg(&self.test)
            .arg("-r")
            .arg("subprocess")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        command
    }

    /// Start the child and wait for it, killing it once `timeout` expires
    pub fn spawn_and_wait(&self, timeout: Duration) -> io::Result<ChildOutput> {
        let started_at = Instant::now();
        tracing::debug!(
            test = %self.test,
            program = %self.program.display(),
            "spawning isolated test"
        );

        let mut child = self.command().spawn()?;
        let reader = match child.stdout.take() {
            Some(stdout) => spawn_reader(stdout),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "child stdout was not captured",
                ));
            }
        };

        let (status, timed_out) = wait_with_timeout(&mut child, timeout, &self.test)?;

        // A child that exited on its own had until the timeout to write
        let grace = Instant::now() + DRAIN_GRACE;
        let drain_until = match started_at.checked_add(timeout) {
            Some(deadline) if !timed_out => deadline.max(grace),
            _ => grace,
        };
        let lines = collect_lines(&reader, drain_until);

        Ok(ChildOutput {
            lines,
            timed_out,
            status,
            duration: started_at.elapsed(),
        })
    }
}

/// Forward `source` line by line until end of file or until nobody listens
fn spawn_reader<R: Read + Send + 'static>(source: R) -> Receiver<String> {
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => {
                    if buffer.ends_with(b"\n") {
                        buffer.pop();
                    }
                    if buffer.ends_with(b"\r") {
                        buffer.pop();
                    }
                    let line = String::from_utf8_lossy(&buffer).into_owned();
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::debug!("stopped reading child output: {}", err);
                    break;
                }
            }
        }
    });

    receiver
}

/// Lines received until the reader hits end of file or `deadline` passes
fn collect_lines(receiver: &Receiver<String>, deadline: Instant) -> Vec<String> {
    let mut lines = Vec::new();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(remaining) {
            Ok(line) => lines.push(line),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                // Whatever is already queued still counts
                lines.extend(receiver.try_iter());
                tracing::debug!("child output still open after the child was reaped");
                break;
            }
        }
    }

    lines
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    test: &str,
) -> io::Result<(ExitStatus, bool)> {
    let started_at = Instant::now();

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }

        if started_at.elapsed() >= timeout {
            tracing::warn!(
                test = %test,
                timeout_secs = timeout.as_secs(),
                "test timed out, killing it"
            );
            // The child may have exited between the poll and the kill
            let _ = child.kill();
            let status = child.wait()?;
            return Ok((status, true));
        }

        thread::sleep(POLL_INTERVAL);
    }
}
