use crate::e_types::BuildOutcome;
use crate::prelude::*;
use std::collections::HashMap;
use std::io::Read;
use std::process::ExitStatus;
use std::thread;

/// Variable injected into every toolchain process so package manifests can
/// tell they are being built by webber.
pub const MARKER_ENV_KEY: &str = "WEBBER";
pub const MARKER_ENV_VALUE: &str = "TRUE";

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("i/o error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{stream} of {program} is not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        stream: &'static str,
    },
    #[error("{program}: a worker thread ended without reporting")]
    Rendezvous { program: String },
}

/// The environment overrides every toolchain invocation carries.
pub fn marker_env() -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert(MARKER_ENV_KEY.to_string(), MARKER_ENV_VALUE.to_string());
    env
}

/// The three events a run waits for before it looks at the result.
enum Signal {
    Exited(io::Result<ExitStatus>),
    Stdout(io::Result<Vec<u8>>),
    Stderr(io::Result<Vec<u8>>),
}

/// Spawns one external process per call and captures what it prints.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessRunner {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs `program args...` in `working_dir` with `overrides` layered over
    /// the inherited environment.
    ///
    /// Stdout and stderr are each drained on their own thread while a third
    /// thread waits for the exit; all three report over one channel and this
    /// call returns only after it has received every signal. The stderr bytes
    /// are only decoded and kept when a failed process left stdout empty.
    pub fn run(
        &self,
        args: &[String],
        working_dir: &Path,
        overrides: &HashMap<String, String>,
    ) -> Result<BuildOutcome, RunnerError> {
        let program = self.program.display().to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(working_dir)
            .envs(overrides)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            "Running: {} {} (in {})",
            program,
            args.join(" "),
            working_dir.display()
        );

        let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: program.clone(),
            source,
        })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (tx, rx) = mpsc::channel::<Signal>();

        let stdout_tx = tx.clone();
        let stdout_handle = thread::spawn(move || {
            let drained = match stdout {
                Some(stdout) => drain(stdout),
                None => Ok(Vec::new()),
            };
            let _ = stdout_tx.send(Signal::Stdout(drained));
        });

        let stderr_tx = tx.clone();
        let stderr_handle = thread::spawn(move || {
            let drained = match stderr {
                Some(stderr) => drain(stderr),
                None => Ok(Vec::new()),
            };
            let _ = stderr_tx.send(Signal::Stderr(drained));
        });

        let wait_handle = thread::spawn(move || {
            let status = child.wait();
            let _ = tx.send(Signal::Exited(status));
        });

        let mut status = None;
        let mut captured = None;
        let mut captured_err = None;
        while status.is_none() || captured.is_none() || captured_err.is_none() {
            match rx.recv() {
                Ok(Signal::Exited(result)) => status = Some(result),
                Ok(Signal::Stdout(result)) => captured = Some(result),
                Ok(Signal::Stderr(result)) => captured_err = Some(result),
                // Every sender is gone but a signal is still missing.
                Err(_) => break,
            }
        }
        let _ = stdout_handle.join();
        let _ = stderr_handle.join();
        let _ = wait_handle.join();

        let (status, captured, captured_err) = match (status, captured, captured_err) {
            (Some(status), Some(captured), Some(captured_err)) => {
                (status, captured, captured_err)
            }
            _ => return Err(RunnerError::Rendezvous { program }),
        };
        let status = status.map_err(|source| RunnerError::Io {
            program: program.clone(),
            source,
        })?;
        let captured = captured.map_err(|source| RunnerError::Io {
            program: program.clone(),
            source,
        })?;
        debug!(
            "{} exited with {:?} after writing {} bytes to stdout",
            program,
            status.code(),
            captured.len()
        );

        let stdout = String::from_utf8(captured).map_err(|_| RunnerError::InvalidUtf8 {
            program: program.clone(),
            stream: "stdout",
        })?;

        if status.success() {
            return Ok(BuildOutcome::Success(stdout));
        }

        let stderr = if stdout.is_empty() {
            let bytes = captured_err.map_err(|source| RunnerError::Io {
                program: program.clone(),
                source,
            })?;
            String::from_utf8(bytes).map_err(|_| RunnerError::InvalidUtf8 {
                program: program.clone(),
                stream: "stderr",
            })?
        } else {
            String::new()
        };

        Ok(BuildOutcome::Failure {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }
}

/// Reads until a zero-length read signals end of stream.
fn drain(mut stream: impl Read) -> io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return Ok(captured),
            Ok(n) => captured.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
