use super::{Io, Pipe};
use async_trait::async_trait;
use std::{io, process::Stdio};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::instrument;

/// An [`Io`] interface for a child process.
///
/// The process is killed once this is dropped.
#[derive(Debug)]
pub struct Process {
    pipe: Pipe<ChildStdin, ChildStdout>,
    #[allow(dead_code)]
    child: Child,
}

impl Process {
    /// Spawns the program at the given path.
    #[instrument(level = "trace", err)]
    pub fn spawn(path: &str) -> io::Result<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        match Option::zip(child.stdin.take(), child.stdout.take()) {
            Some(pipe) => Ok(Process {
                pipe: pipe.into(),
                child,
            }),

            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "failed to open the child process' stdio",
            )),
        }
    }
}

#[async_trait]
impl Io for Process {
    async fn recv(&mut self) -> io::Result<String> {
        self.pipe.recv().await
    }

    async fn send(&mut self, msg: &str) -> io::Result<()> {
        self.pipe.send(msg).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.pipe.flush().await
    }
}
