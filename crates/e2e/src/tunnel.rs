//! Sauce Connect tunnel supervision

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::config::{ResolvedRun, SauceSection};
use crate::error::{E2eError, E2eResult};
use crate::selenium::OutputLines;

pub const SAUCE_READY_LINE: &str = "Sauce Connect is up";

const CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters handed to the tunnel client
#[derive(Debug, Clone)]
pub struct TunnelOptions {
    pub username: String,
    pub access_key: String,
    pub tunnel_identifier: Option<String>,
    pub ready_file_id: Option<String>,
    pub connect_retries: u32,
    pub connect_retry_timeout: Duration,
}

impl TunnelOptions {
    pub fn from_run(run: &ResolvedRun, sauce: &SauceSection) -> E2eResult<Self> {
        let credentials = run.sauce.as_ref().ok_or_else(|| {
            E2eError::Tunnel("no Sauce credentials configured".to_string())
        })?;
        Ok(Self {
            username: credentials.username.clone(),
            access_key: credentials.access_key.clone(),
            tunnel_identifier: run.tunnel_identifier.clone(),
            ready_file_id: run.tunnel_identifier.clone(),
            connect_retries: sauce.connect_retries,
            connect_retry_timeout: Duration::from_secs(sauce.connect_retry_timeout_secs),
        })
    }
}

/// Opens tunnels to the device grid
#[async_trait]
pub trait TunnelClient: Send + Sync {
    async fn open(&self, options: &TunnelOptions) -> E2eResult<Box<dyn TunnelHandle>>;
}

/// An open tunnel
#[async_trait]
pub trait TunnelHandle: Send {
    async fn close(self: Box<Self>) -> E2eResult<()>;
}

/// Launches the `sc` binary
#[derive(Debug, Clone)]
pub struct SauceConnect {
    pub binary: PathBuf,
    /// Arguments placed before the generated flags
    pub args: Vec<String>,
    pub ready_line: String,
    /// Pause after readiness before tests start
    pub settle: Duration,
    /// Pause after the process exits on close
    pub close_drain: Duration,
}

impl SauceConnect {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            ready_line: SAUCE_READY_LINE.to_string(),
            settle: Duration::from_secs(5),
            close_drain: Duration::from_secs(60),
        }
    }

    pub fn from_config(section: &SauceSection) -> Self {
        Self {
            settle: Duration::from_secs(section.settle_secs),
            close_drain: Duration::from_secs(section.close_drain_secs),
            ..Self::new(&section.binary)
        }
    }

    fn command(&self, options: &TunnelOptions) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args)
            .arg("--user")
            .arg(&options.username)
            .arg("--api-key")
            .arg(&options.access_key);
        if let Some(id) = &options.tunnel_identifier {
            cmd.arg("--tunnel-identifier").arg(id);
        }
        if let Some(id) = &options.ready_file_id {
            let ready_file = std::env::temp_dir().join(format!("sc-launcher-readyfile-{}", id));
            cmd.arg("--readyfile").arg(ready_file);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn attempt(&self, options: &TunnelOptions) -> E2eResult<SauceConnectProcess> {
        let mut child = self.command(options).spawn().map_err(|e| {
            E2eError::Tunnel(format!("failed to spawn {}: {}", self.binary.display(), e))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Tunnel("stdout was not captured".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = OutputLines::new(stderr);
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!(target: "sauce_connect", "{}", line);
                }
            });
        }

        let mut lines = OutputLines::new(stdout);
        let ready = timeout(
            options.connect_retry_timeout,
            wait_for_line(&mut child, &mut lines, &self.ready_line),
        )
        .await
        .unwrap_or_else(|_| {
            Err(E2eError::Tunnel(format!(
                "not ready after {:?}",
                options.connect_retry_timeout
            )))
        });

        if let Err(e) = ready {
            let _ = child.start_kill();
            let _ = child.wait().await;
            return Err(e);
        }

        let output = tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                info!(target: "sauce_connect", "{}", line);
            }
        });
        Ok(SauceConnectProcess {
            child,
            close_drain: self.close_drain,
            output,
        })
    }
}

#[async_trait]
impl TunnelClient for SauceConnect {
    async fn open(&self, options: &TunnelOptions) -> E2eResult<Box<dyn TunnelHandle>> {
        let attempts = options.connect_retries + 1;
        let mut last_error = None;
        for attempt in 1..=attempts {
            match self.attempt(options).await {
                Ok(process) => {
                    if !self.settle.is_zero() {
                        sleep(self.settle).await;
                    }
                    return Ok(Box::new(process));
                }
                Err(e) => {
                    warn!(target: "sauce_connect", attempt, attempts, "connect failed: {}", e);
                    last_error = Some(e);
                }
            }
        }
        Err(E2eError::Tunnel(format!(
            "gave up after {} attempts: {}",
            attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

/// Running `sc` process
pub struct SauceConnectProcess {
    child: Child,
    close_drain: Duration,
    output: JoinHandle<()>,
}

#[async_trait]
impl TunnelHandle for SauceConnectProcess {
    async fn close(mut self: Box<Self>) -> E2eResult<()> {
        if let Some(pid) = self.child.id() {
            #[cfg(unix)]
            {
                use nix::sys::signal::{kill, Signal};
                use nix::unistd::Pid;

                if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                    debug!(target: "sauce_connect", "SIGTERM failed: {}", e);
                }
            }
            #[cfg(not(unix))]
            self.child.start_kill()?;
        }
        if timeout(CLOSE_TIMEOUT, self.child.wait()).await.is_err() {
            warn!(target: "sauce_connect", "sc did not exit after SIGTERM, killing");
            self.child.start_kill()?;
            self.child.wait().await?;
        }
        self.output.abort();
        if !self.close_drain.is_zero() {
            sleep(self.close_drain).await;
        }
        Ok(())
    }
}

async fn wait_for_line(
    child: &mut Child,
    lines: &mut OutputLines<ChildStdout>,
    ready_line: &str,
) -> E2eResult<()> {
    loop {
        tokio::select! {
            biased;
            line = lines.next_line() => match line? {
                Some(line) => {
                    info!(target: "sauce_connect", "{}", line);
                    if line.contains(ready_line) {
                        return Ok(());
                    }
                }
                None => {
                    let status = child.wait().await?;
                    return Err(E2eError::Tunnel(format!("sc exited with {}", status)));
                }
            },
            status = child.wait() => {
                return Err(E2eError::Tunnel(format!("sc exited with {}", status?)));
            }
        }
    }
}

/// Owns the tunnel for one run
pub struct TunnelSupervisor {
    client: Box<dyn TunnelClient>,
    handle: Option<Box<dyn TunnelHandle>>,
}

impl TunnelSupervisor {
    pub fn new(client: Box<dyn TunnelClient>) -> Self {
        Self {
            client,
            handle: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the tunnel; an empty access key is rejected before anything is spawned
    pub async fn start(&mut self, options: &TunnelOptions) -> E2eResult<()> {
        if options.access_key.is_empty() {
            return Err(E2eError::Tunnel("no Sauce access key configured".to_string()));
        }
        info!("kne: Starting Sauce Connect");
        match self.client.open(options).await {
            Ok(handle) => {
                info!("kne: Sauce Connect Ready");
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!("kne: There was an error starting Sauce Connect");
                Err(e)
            }
        }
    }

    /// Close the tunnel if one is open; otherwise a no-op
    pub async fn stop(&mut self) -> E2eResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        info!("kne: Stopping Sauce Connect");
        handle.close().await?;
        info!("kne: Sauce Connect Stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandle(Arc<AtomicUsize>);

    #[async_trait]
    impl TunnelHandle for CountingHandle {
        async fn close(self: Box<Self>) -> E2eResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeClient {
        fail: bool,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TunnelClient for FakeClient {
        async fn open(&self, _: &TunnelOptions) -> E2eResult<Box<dyn TunnelHandle>> {
            if self.fail {
                return Err(E2eError::Tunnel("refused".to_string()));
            }
            Ok(Box::new(CountingHandle(self.closes.clone())))
        }
    }

    fn options(access_key: &str) -> TunnelOptions {
        TunnelOptions {
            username: "user".to_string(),
            access_key: access_key.to_string(),
            tunnel_identifier: None,
            ready_file_id: None,
            connect_retries: 0,
            connect_retry_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn stop_without_start_is_a_noop() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut tunnel = TunnelSupervisor::new(Box::new(FakeClient {
            fail: false,
            closes: closes.clone(),
        }));
        tunnel.stop().await.unwrap();
        tunnel.stop().await.unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stop_closes_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut tunnel = TunnelSupervisor::new(Box::new(FakeClient {
            fail: false,
            closes: closes.clone(),
        }));
        tunnel.start(&options("key")).await.unwrap();
        assert!(tunnel.is_active());
        tunnel.stop().await.unwrap();
        tunnel.stop().await.unwrap();
        assert!(!tunnel.is_active());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_access_key_never_opens() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut tunnel = TunnelSupervisor::new(Box::new(FakeClient {
            fail: false,
            closes: closes.clone(),
        }));
        let err = tunnel.start(&options("")).await.unwrap_err();
        assert!(matches!(err, E2eError::Tunnel(_)));
        assert!(!tunnel.is_active());
        tunnel.stop().await.unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_start_is_not_active() {
        let mut tunnel = TunnelSupervisor::new(Box::new(FakeClient {
            fail: true,
            closes: Arc::new(AtomicUsize::new(0)),
        }));
        assert!(tunnel.start(&options("key")).await.is_err());
        assert!(!tunnel.is_active());
    }

    #[tokio::test]
    async fn missing_sc_binary_exhausts_retries() {
        let sc = SauceConnect {
            settle: Duration::ZERO,
            close_drain: Duration::ZERO,
            ..SauceConnect::new("/nonexistent/sc")
        };
        let mut opts = options("key");
        opts.connect_retries = 2;
        let err = sc.open(&opts).await.err().unwrap();
        assert!(err.to_string().contains("3 attempts"));
    }
}
