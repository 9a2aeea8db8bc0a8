//! kne - Keystone Nightwatch E2E runner
//!
//! Exit codes: 0 when the tests pass, 1 when they fail, 2 on any other error.

use anyhow::Context;
use clap::Parser;
use keystone_e2e::{logging, start_e2e, E2eError, EnvSnapshot, KneConfig, StartOptions};
use tracing::error;

mod args;

use args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        let code = match e.downcast_ref::<E2eError>() {
            Some(E2eError::TestsFailed) => 1,
            _ => {
                error!("{:#}", e);
                2
            }
        };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => KneConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => KneConfig::default(),
    };

    if let Some(path) = &cli.write_config {
        config
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote config to {}", path.display());
        return Ok(());
    }

    let options = StartOptions {
        keystone: cli.keystone(),
        run_selenium: None,
        args: cli.invocation_args(),
        env: EnvSnapshot::from_process(),
        config,
    };
    start_e2e(options).await?;
    Ok(())
}
