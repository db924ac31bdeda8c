use std::{
    io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::{Child, ChildStdin, Command},
    time::{Instant, timeout},
};

use crate::{
    constants::ISOLATED_FLAG,
    core::{
        domain::{RunResult, RunSpec},
        traits::runner::{RunError, Runner},
    },
};

/// Runs a source file with a local interpreter, one child process per call.
#[derive(Clone, Debug)]
pub struct InterpreterRunner {
    interpreter: PathBuf,
    isolated: bool,
    output_limit_bytes: usize,
}

impl InterpreterRunner {
    pub fn new<T>(interpreter: T, isolated: bool, output_limit_bytes: usize) -> Self
    where
        T: AsRef<Path>,
    {
        Self {
            interpreter: interpreter.as_ref().into(),
            isolated,
            output_limit_bytes,
        }
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        if self.isolated {
            cmd.arg(ISOLATED_FLAG);
        }
        cmd.arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout can take down every descendant.
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    fn launch_error(&self, e: io::Error) -> RunError {
        RunError::Launch {
            interpreter: self.interpreter.display().to_string(),
            msg: e.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Runner for InterpreterRunner {
    #[tracing::instrument(skip(self, spec), fields(path = %spec.path.display(), limit = %spec.time_limit))]
    async fn run(&self, spec: &RunSpec) -> Result<RunResult, RunError> {
        let mut child = self
            .command(&spec.path)
            .spawn()
            .map_err(|e| self.launch_error(e))?;
        let pid = child.id();
        let start_time = Instant::now();
        tracing::debug!(?pid, "child spawned");

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.output_limit_bytes;

        let supervised = async {
            let (fed, out, err, status) = tokio::join!(
                feed_stdin(stdin, &spec.stdin),
                read_capped(stdout, limit),
                read_capped(stderr, limit),
                child.wait(),
            );
            fed?;
            Ok::<(Vec<u8>, Vec<u8>, ExitStatus), io::Error>((out?, err?, status?))
        };

        let supervised = timeout(spec.time_limit.as_duration(), supervised).await;
        match supervised {
            Ok(Ok((out, err, status))) => {
                let code = exit_code(status);
                tracing::info!(
                    returncode = code,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "child finished"
                );
                Ok(RunResult::exited(
                    code,
                    String::from_utf8_lossy(&out).to_string(),
                    String::from_utf8_lossy(&err).to_string(),
                ))
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "lost track of child, killing it");
                terminate(&mut child, pid).await;
                Err(RunError::Supervise { msg: e.to_string() })
            }
            Err(_) => {
                tracing::warn!(
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "time limit exceeded, killing child"
                );
                terminate(&mut child, pid).await;
                Ok(RunResult::timed_out(spec.time_limit))
            }
        }
    }
}

/// Writes the whole input and closes the pipe. A child that exits without
/// reading its input is not an error.
async fn feed_stdin(stdin: Option<ChildStdin>, input: &str) -> io::Result<()> {
    let Some(mut handle) = stdin else {
        return Ok(());
    };

    let written = async {
        handle.write_all(input.as_bytes()).await?;
        handle.shutdown().await
    }
    .await;

    match written {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Reads at most `limit` bytes, then drains the rest so the child never
/// blocks on a full pipe.
async fn read_capped<R>(reader: Option<R>, limit: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };

    let mut buf = Vec::new();
    (&mut reader).take(limit as u64).read_to_end(&mut buf).await?;
    let discarded = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    if discarded > 0 {
        tracing::debug!(discarded, "output exceeded limit, truncated");
    }

    Ok(buf)
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

/// Kills the whole group, then the child itself. The group id stays valid
/// while any member is alive, even after the leader was reaped, so
/// descendants still holding our pipes are reached too.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    if let Some(pid) = pid {
        kill_process_group(pid);
    }
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "failed to kill child");
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: killpg only sends a signal; no memory is shared with the callee.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(
            pgid,
            error = %io::Error::last_os_error(),
            "killpg failed"
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}
