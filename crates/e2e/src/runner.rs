//! Run orchestration: server, tunnel, tests, then cleanup on every path

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::config::{EnvSnapshot, InvocationArgs, KeystoneTarget, KneConfig, ResolvedRun, ServerMode};
use crate::error::{E2eError, E2eResult};
use crate::nightwatch::{NightwatchRunner, RunnerInvocation, TestRunner};
use crate::selenium::{SeleniumConfig, ServerLauncher, ServerProcess};
use crate::tunnel::{SauceConnect, TunnelClient, TunnelOptions, TunnelSupervisor};

/// Lifecycle of a run. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    ServerStarting,
    TunnelStarting,
    TestsRunning,
    CleaningUp,
    Done,
}

/// Inputs of a run
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Host application, used for the admin UI URL
    pub keystone: KeystoneTarget,
    /// Overrides `--selenium-in-background` when set
    pub run_selenium: Option<bool>,
    pub args: InvocationArgs,
    pub env: EnvSnapshot,
    pub config: KneConfig,
}

impl StartOptions {
    pub fn new(keystone: KeystoneTarget, args: InvocationArgs) -> Self {
        Self {
            keystone,
            run_selenium: None,
            args,
            env: EnvSnapshot::from_process(),
            config: KneConfig::default(),
        }
    }
}

/// One E2E run, owning every process it starts
pub struct E2eRun {
    options: StartOptions,
    stage: RunStage,
    history: Vec<RunStage>,
    launcher: Option<Box<dyn ServerLauncher>>,
    runner: Option<Box<dyn TestRunner>>,
    server: Option<Box<dyn ServerProcess>>,
    tunnel: TunnelSupervisor,
}

impl E2eRun {
    pub fn new(options: StartOptions) -> Self {
        let tunnel = TunnelSupervisor::new(Box::new(SauceConnect::from_config(&options.config.sauce)));
        Self {
            options,
            stage: RunStage::Idle,
            history: vec![RunStage::Idle],
            launcher: None,
            runner: None,
            server: None,
            tunnel,
        }
    }

    pub fn with_server_launcher(mut self, launcher: Box<dyn ServerLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_tunnel_client(mut self, client: Box<dyn TunnelClient>) -> Self {
        self.tunnel = TunnelSupervisor::new(client);
        self
    }

    pub fn with_test_runner(mut self, runner: Box<dyn TestRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Every stage entered so far, in order
    pub fn stages(&self) -> &[RunStage] {
        &self.history
    }

    fn enter(&mut self, stage: RunStage) {
        debug!(from = ?self.stage, to = ?stage, "run stage");
        self.stage = stage;
        self.history.push(stage);
    }

    /// Run to completion, returning the first error encountered
    pub async fn execute(&mut self) -> E2eResult<()> {
        info!("kne: starting...");

        let mut args = self.options.args.clone();
        if let Some(run_selenium) = self.options.run_selenium {
            args.selenium_in_background = run_selenium;
        }
        let resolved = match ResolvedRun::resolve(
            &args,
            &self.options.env,
            &self.options.config,
            Some(&self.options.keystone),
        ) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!("kne: finished with error\n{}", e);
                self.enter(RunStage::Done);
                return Err(e);
            }
        };
        debug!(env = %resolved.environment, mode = ?resolved.server_mode, "resolved run");

        let outcome = self.run_stages(&resolved).await;

        self.enter(RunStage::CleaningUp);
        info!("kne: finishing...");
        if let Err(e) = &outcome {
            error!("kne: finished with error\n{}", e);
        }
        let cleanup = self.cleanup().await;
        self.enter(RunStage::Done);

        outcome.and(cleanup)
    }

    async fn run_stages(&mut self, resolved: &ResolvedRun) -> E2eResult<()> {
        self.enter(RunStage::ServerStarting);
        if resolved.server_mode == ServerMode::Supervised {
            let launcher = match self.launcher.take() {
                Some(launcher) => launcher,
                None => Box::new(
                    SeleniumConfig::from_config(&self.options.config, &resolved.selenium_jar)
                        .with_env(resolved.exported_env.clone()),
                ),
            };
            self.server = Some(launcher.launch().await?);
        }

        self.enter(RunStage::TunnelStarting);
        if resolved.tunnel_required {
            let options = TunnelOptions::from_run(resolved, &self.options.config.sauce)?;
            self.tunnel.start(&options).await?;
        }

        self.enter(RunStage::TestsRunning);
        let invocation = RunnerInvocation::prepare(resolved, &self.options.config.runner)?;
        let runner = match self.runner.take() {
            Some(runner) => runner,
            None => Box::new(NightwatchRunner::new(&self.options.config.runner.program)),
        };
        let passed = match AssertUnwindSafe(runner.run(&invocation)).catch_unwind().await {
            Ok(result) => result?,
            Err(panic) => {
                let message = panic_message(panic);
                error!("There was an error while starting the nightwatch test runner: {}", message);
                return Err(E2eError::RunnerCrashed(message));
            }
        };

        if passed {
            info!("kne: tests passed");
            Ok(())
        } else {
            info!("kne: tests failed");
            Err(E2eError::TestsFailed)
        }
    }

    /// Kill the server and close the tunnel, whichever exist
    async fn cleanup(&mut self) -> E2eResult<()> {
        let mut first_error = None;

        if let Some(mut server) = self.server.take() {
            if let Err(e) = server.kill().await {
                warn!("failed to terminate selenium: {}", e);
                first_error.get_or_insert(e);
            }
        }

        if self.tunnel.is_active() {
            if let Err(e) = self.tunnel.stop().await {
                warn!("failed to stop Sauce Connect: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        return s.to_string();
    }
    if let Some(s) = panic.downcast_ref::<String>() {
        return s.clone();
    }
    "runner panicked".to_string()
}

/// Run the harness with the default selenium, Sauce Connect and nightwatch
pub async fn start_e2e(options: StartOptions) -> E2eResult<()> {
    E2eRun::new(options).execute().await
}

/// Like [`start_e2e`], handing the outcome to `callback`
pub async fn start_e2e_with_callback<F>(options: StartOptions, callback: F)
where
    F: FnOnce(Option<E2eError>),
{
    callback(start_e2e(options).await.err());
}
