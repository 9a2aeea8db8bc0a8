use std::path::PathBuf;

use clap::Parser;
use keystone_e2e::{InvocationArgs, KeystoneTarget};

/// Run Keystone admin UI end-to-end tests with Nightwatch
#[derive(Parser, Debug)]
#[command(name = "kne")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Test environment (default, saucelabs-local, saucelabs-travis, ...)
    #[arg(long)]
    pub env: Option<String>,

    #[arg(long = "browser-name")]
    pub browser_name: Option<String>,

    #[arg(long = "browser-version")]
    pub browser_version: Option<String>,

    /// Comma-separated test paths, appended to KNE_TEST_PATHS
    #[arg(long = "test_paths")]
    pub test_paths: Vec<String>,

    /// Comma-separated page object paths, appended to KNE_PAGE_OBJECT_PATHS
    #[arg(long = "po_paths")]
    pub po_paths: Vec<String>,

    /// Comma-separated paths to exclude, appended to KNE_EXCLUDE_TEST_PATHS
    #[arg(long = "exclude_paths")]
    pub exclude_paths: Vec<String>,

    #[arg(long = "sauce-username")]
    pub sauce_username: Option<String>,

    #[arg(long = "sauce-access-key")]
    pub sauce_access_key: Option<String>,

    /// Start selenium here instead of letting nightwatch start it
    #[arg(long = "selenium-in-background")]
    pub selenium_in_background: bool,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective config file to this path and exit
    #[arg(long = "write-config")]
    pub write_config: Option<PathBuf>,

    #[arg(long = "keystone-host", default_value = "localhost")]
    pub keystone_host: String,

    #[arg(long = "keystone-port", default_value_t = 3000)]
    pub keystone_port: u16,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn invocation_args(&self) -> InvocationArgs {
        InvocationArgs {
            env: self.env.clone(),
            browser_name: self.browser_name.clone(),
            browser_version: self.browser_version.clone(),
            test_paths: self.test_paths.clone(),
            po_paths: self.po_paths.clone(),
            exclude_paths: self.exclude_paths.clone(),
            sauce_username: self.sauce_username.clone(),
            sauce_access_key: self.sauce_access_key.clone(),
            selenium_in_background: self.selenium_in_background,
        }
    }

    pub fn keystone(&self) -> KeystoneTarget {
        KeystoneTarget::new(&self.keystone_host, self.keystone_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_underscore_and_dash_flags() {
        let cli = Cli::try_parse_from([
            "kne",
            "--env",
            "saucelabs-local",
            "--test_paths",
            "tests/a,tests/b",
            "--po_paths",
            "po",
            "--sauce-username",
            "u",
            "--sauce-access-key",
            "k",
            "--selenium-in-background",
        ])
        .unwrap();
        let args = cli.invocation_args();
        assert_eq!(args.env.as_deref(), Some("saucelabs-local"));
        assert_eq!(args.test_paths, vec!["tests/a,tests/b"]);
        assert_eq!(args.po_paths, vec!["po"]);
        assert!(args.selenium_in_background);
        assert_eq!(cli.keystone().admin_url(), "http://localhost:3000/keystone/");
    }

    #[test]
    fn repeated_test_paths_accumulate() {
        let cli = Cli::try_parse_from(["kne", "--test_paths", "a", "--test_paths", "b"]).unwrap();
        assert_eq!(cli.test_paths, vec!["a", "b"]);
    }
}
