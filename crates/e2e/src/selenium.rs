//! Automation-server supervision
//!
//! The standalone Selenium server is spawned with stdin detached (it can
//! deadlock on an inherited stdin pipe) and is considered ready once its
//! stderr prints the readiness line. If the process exits first, the exit
//! code is reported.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Split};
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::KneConfig;
use crate::error::{E2eError, E2eResult};

pub const DEFAULT_READY_LINE: &str = "Selenium Server is up and running";

/// How to launch the automation server
#[derive(Debug, Clone)]
pub struct SeleniumConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Substring of a stderr line that marks the server ready
    pub ready_line: String,
    /// `None` waits until the line appears or the process exits
    pub startup_timeout: Option<Duration>,
    /// Time between SIGTERM and SIGKILL on stop
    pub term_grace: Duration,
}

impl SeleniumConfig {
    /// `java -jar <jar>`
    pub fn standalone_jar(java: impl Into<PathBuf>, jar: &Path) -> Self {
        Self {
            program: java.into(),
            args: vec!["-jar".to_string(), jar.to_string_lossy().into_owned()],
            env: BTreeMap::new(),
            ready_line: DEFAULT_READY_LINE.to_string(),
            startup_timeout: None,
            term_grace: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &KneConfig, jar: &Path) -> Self {
        let mut selenium = Self::standalone_jar(&config.selenium.java, jar);
        selenium.ready_line = config.selenium.ready_line.clone();
        selenium.startup_timeout = config.selenium_startup_timeout();
        selenium
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

/// Starts an automation server for a run
#[async_trait]
pub trait ServerLauncher: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn ServerProcess>>;
}

/// A started automation server
#[async_trait]
pub trait ServerProcess: Send {
    /// Terminate the server. Calling it again is a no-op.
    async fn kill(&mut self) -> E2eResult<()>;
}

#[async_trait]
impl ServerLauncher for SeleniumConfig {
    async fn launch(&self) -> E2eResult<Box<dyn ServerProcess>> {
        let server = SeleniumServer::spawn(self).await?;
        Ok(Box::new(server))
    }
}

/// Handle to a running selenium process
pub struct SeleniumServer {
    child: Option<Child>,
    term_grace: Duration,
    drain: Option<JoinHandle<()>>,
}

impl SeleniumServer {
    /// Spawn the server and wait for its readiness line
    pub async fn spawn(config: &SeleniumConfig) -> E2eResult<Self> {
        info!("kne: starting selenium server in background...");

        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            E2eError::SeleniumSpawn(format!("{}: {}", config.program.display(), e))
        })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| E2eError::SeleniumSpawn("stderr was not captured".to_string()))?;
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain_lines(OutputLines::new(stdout)));
        }

        let mut lines = OutputLines::new(stderr);
        let readiness = wait_until_ready(&mut child, &mut lines, &config.ready_line);
        let outcome = match config.startup_timeout {
            Some(limit) => match timeout(limit, readiness).await {
                Ok(outcome) => outcome,
                Err(_) => Err(E2eError::SeleniumTimeout(limit)),
            },
            None => readiness.await,
        };

        let mut server = Self {
            child: Some(child),
            term_grace: config.term_grace,
            drain: None,
        };

        match outcome {
            Ok(()) => {
                info!(pid = ?server.pid(), "selenium server is up");
                server.drain = Some(tokio::spawn(drain_lines(lines)));
                Ok(server)
            }
            Err(e) => {
                if let Err(stop_err) = server.stop().await {
                    warn!("failed to stop selenium after startup error: {}", stop_err);
                }
                Err(e)
            }
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// SIGTERM, then SIGKILL after the grace period. Idempotent.
    pub async fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if let Some(pid) = child.id() {
            info!(pid, "kne: terminating selenium process");

            #[cfg(unix)]
            {
                use nix::sys::signal::{kill, Signal};
                use nix::unistd::Pid;

                if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                    debug!("SIGTERM to selenium failed: {}", e);
                }
            }

            if timeout(self.term_grace, child.wait()).await.is_err() {
                warn!(pid, "selenium ignored SIGTERM, killing");
                child.start_kill()?;
                child.wait().await?;
            }
        }

        if let Some(drain) = self.drain.take() {
            drain.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ServerProcess for SeleniumServer {
    async fn kill(&mut self) -> E2eResult<()> {
        self.stop().await
    }
}

impl Drop for SeleniumServer {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
        if let Some(drain) = self.drain.take() {
            drain.abort();
        }
    }
}

fn exited(status: ExitStatus) -> E2eError {
    #[cfg(unix)]
    let signal = std::os::unix::process::ExitStatusExt::signal(&status);
    #[cfg(not(unix))]
    let signal = None;
    E2eError::SeleniumExited {
        code: status.code(),
        signal,
    }
}

/// Newline-split child output, decoded lossily so stray non-UTF-8 bytes never end the stream
pub(crate) struct OutputLines<R> {
    inner: Split<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> OutputLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader).split(b'\n'),
        }
    }

    /// Cancel safe, so it can sit in a `select!` arm
    pub(crate) async fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.inner.next_segment().await?.map(|raw| {
            let mut line = String::from_utf8_lossy(&raw).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            line
        }))
    }
}

async fn wait_until_ready(
    child: &mut Child,
    lines: &mut OutputLines<ChildStderr>,
    ready_line: &str,
) -> E2eResult<()> {
    loop {
        tokio::select! {
            biased;
            line = lines.next_line() => match line? {
                Some(line) => {
                    debug!(target: "selenium", "{}", line);
                    if line.contains(ready_line) {
                        return Ok(());
                    }
                }
                None => {
                    let status = child.wait().await?;
                    return Err(exited(status));
                }
            },
            status = child.wait() => {
                return Err(exited(status?));
            }
        }
    }
}

async fn drain_lines<R: AsyncRead + Unpin>(mut lines: OutputLines<R>) {
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "selenium", "{}", line);
    }
}
