//! Run configuration
//!
//! Three layers feed a run, lowest precedence first: an optional TOML file,
//! the process environment, and the CLI flags. Path lists are merged across
//! the environment and the CLI; scalar values from the CLI win.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

pub const ENV_TEST_ENV: &str = "KNE_TEST_ENV";
pub const ENV_BROWSER_NAME: &str = "KNE_BROWSER_NAME";
pub const ENV_BROWSER_VERSION: &str = "KNE_BROWSER_VERSION";
pub const ENV_TEST_PATHS: &str = "KNE_TEST_PATHS";
pub const ENV_PAGE_OBJECT_PATHS: &str = "KNE_PAGE_OBJECT_PATHS";
pub const ENV_EXCLUDE_TEST_PATHS: &str = "KNE_EXCLUDE_TEST_PATHS";
pub const ENV_SELENIUM_SERVER: &str = "KNE_SELENIUM_SERVER";
pub const ENV_SELENIUM_START_PROCESS: &str = "KNE_SELENIUM_START_PROCESS";
pub const ENV_KEYSTONE_URL: &str = "KNE_KEYSTONE_URL";
pub const ENV_SAUCE_USERNAME: &str = "SAUCE_USERNAME";
pub const ENV_SAUCE_ACCESS_KEY: &str = "SAUCE_ACCESS_KEY";
pub const ENV_TRAVIS_JOB_NUMBER: &str = "TRAVIS_JOB_NUMBER";

/// Test environment name, as understood by the test runner settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Default,
    SaucelabsLocal,
    SaucelabsTravis,
    Other(String),
}

impl Environment {
    pub fn parse(name: &str) -> Self {
        match name {
            "default" => Environment::Default,
            "saucelabs-local" => Environment::SaucelabsLocal,
            "saucelabs-travis" => Environment::SaucelabsTravis,
            other => Environment::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Environment::Default => "default",
            Environment::SaucelabsLocal => "saucelabs-local",
            Environment::SaucelabsTravis => "saucelabs-travis",
            Environment::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags supplied on the command line (or programmatically)
#[derive(Debug, Clone, Default)]
pub struct InvocationArgs {
    pub env: Option<String>,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub test_paths: Vec<String>,
    pub po_paths: Vec<String>,
    pub exclude_paths: Vec<String>,
    pub sauce_username: Option<String>,
    pub sauce_access_key: Option<String>,
    pub selenium_in_background: bool,
}

/// Snapshot of the environment variables a run reads
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Non-empty value of a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn paths(&self, key: &str) -> Vec<String> {
        self.get(key).map(split_paths).unwrap_or_default()
    }
}

/// Host application address, used to build the admin UI URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoneTarget {
    pub host: String,
    pub port: u16,
}

impl KeystoneTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Admin UI root
    pub fn admin_url(&self) -> String {
        format!("http://{}:{}/keystone/", self.host, self.port)
    }
}

impl Default for KeystoneTarget {
    fn default() -> Self {
        Self::new("localhost", 3000)
    }
}

/// On-disk configuration (`kne.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KneConfig {
    pub selenium: SeleniumSection,
    pub sauce: SauceSection,
    pub runner: RunnerSection,
    pub browser: BrowserSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeleniumSection {
    /// Java executable used to launch the standalone jar
    pub java: PathBuf,

    /// Standalone server jar (overridden by `KNE_SELENIUM_SERVER`)
    pub jar: PathBuf,

    /// Substring on stderr that marks the server as ready
    pub ready_line: String,

    /// Give up waiting for readiness after this many seconds (none = wait forever)
    pub startup_timeout_secs: Option<u64>,
}

impl Default for SeleniumSection {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            jar: PathBuf::from("node_modules/selenium-server-standalone-jar/jar/selenium-server-standalone.jar"),
            ready_line: "Selenium Server is up and running".to_string(),
            startup_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SauceSection {
    /// Sauce Connect binary
    pub binary: PathBuf,
    pub connect_retries: u32,
    pub connect_retry_timeout_secs: u64,

    /// Pause after the tunnel reports ready
    pub settle_secs: u64,

    /// Pause after the tunnel closes, letting the grid release it
    pub close_drain_secs: u64,
}

impl Default for SauceSection {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("sc"),
            connect_retries: 5,
            connect_retry_timeout_secs: 60,
            settle_secs: 5,
            close_drain_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSection {
    /// Test runner executable
    pub program: PathBuf,

    /// Base runner settings, overlaid with the resolved run
    pub base_config: PathBuf,

    /// Page objects shipped with the harness, always on the page-object path
    pub page_objects_dir: PathBuf,

    pub globals_path: Option<PathBuf>,
    pub gecko_driver: Option<PathBuf>,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            program: PathBuf::from("node_modules/.bin/nightwatch"),
            base_config: PathBuf::from("nightwatch.json"),
            page_objects_dir: PathBuf::from("lib/src/pageObjects"),
            globals_path: None,
            gecko_driver: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    pub webdriver_url: String,
    pub wait_for_condition_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444/wd/hub".to_string(),
            wait_for_condition_timeout_ms: 5000,
            poll_interval_ms: 500,
        }
    }
}

impl KneConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> E2eResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn selenium_startup_timeout(&self) -> Option<Duration> {
        self.selenium.startup_timeout_secs.map(Duration::from_secs)
    }
}

/// Who owns the automation server for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    /// The orchestrator spawns and supervises the server
    Supervised,
    /// The test runner starts the server itself
    RunnerManaged,
    /// A remote grid provides the server
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SauceCredentials {
    pub username: String,
    pub access_key: String,
}

/// Everything the orchestrator needs, derived from args + env + file
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub environment: Environment,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub test_paths: Vec<String>,
    pub page_object_paths: Vec<String>,
    pub exclude_paths: Vec<String>,
    pub selenium_jar: PathBuf,
    pub server_mode: ServerMode,
    pub tunnel_required: bool,
    pub sauce: Option<SauceCredentials>,
    pub tunnel_identifier: Option<String>,
    pub keystone_url: Option<String>,
    pub exported_env: BTreeMap<String, String>,
}

impl ResolvedRun {
    /// Merge the three layers, failing before anything is spawned
    pub fn resolve(
        args: &InvocationArgs,
        env: &EnvSnapshot,
        config: &KneConfig,
        keystone: Option<&KeystoneTarget>,
    ) -> E2eResult<Self> {
        let environment = Environment::parse(
            args.env
                .as_deref()
                .or_else(|| env.get(ENV_TEST_ENV))
                .unwrap_or("default"),
        );

        let test_paths = merge_paths(env.paths(ENV_TEST_PATHS), &args.test_paths);
        if test_paths.is_empty() {
            return Err(E2eError::Config(
                "No test paths provided. Either set the --test_paths config option or the KNE_TEST_PATHS environment variable".to_string(),
            ));
        }

        let mut page_object_paths = env.paths(ENV_PAGE_OBJECT_PATHS);
        page_object_paths.push(config.runner.page_objects_dir.to_string_lossy().into_owned());
        let page_object_paths = merge_paths(page_object_paths, &args.po_paths);

        let exclude_paths = merge_paths(env.paths(ENV_EXCLUDE_TEST_PATHS), &args.exclude_paths);

        let browser_name = args
            .browser_name
            .clone()
            .or_else(|| env.get(ENV_BROWSER_NAME).map(String::from));
        let browser_version = args
            .browser_version
            .clone()
            .or_else(|| env.get(ENV_BROWSER_VERSION).map(String::from));

        let selenium_jar = env
            .get(ENV_SELENIUM_SERVER)
            .map(PathBuf::from)
            .unwrap_or_else(|| config.selenium.jar.clone());

        let server_mode = match (&environment, args.selenium_in_background) {
            (Environment::Default, true) => ServerMode::Supervised,
            (Environment::Default, false) => ServerMode::RunnerManaged,
            _ => ServerMode::External,
        };

        let username = args
            .sauce_username
            .clone()
            .or_else(|| env.get(ENV_SAUCE_USERNAME).map(String::from))
            .filter(|value| !value.is_empty());
        let access_key = args
            .sauce_access_key
            .clone()
            .or_else(|| env.get(ENV_SAUCE_ACCESS_KEY).map(String::from))
            .filter(|value| !value.is_empty());
        let sauce = match (username, access_key) {
            (Some(username), Some(access_key)) => Some(SauceCredentials {
                username,
                access_key,
            }),
            _ => None,
        };

        let tunnel_required = match environment {
            Environment::SaucelabsLocal | Environment::SaucelabsTravis => {
                if sauce.is_none() {
                    return Err(E2eError::Config(format!(
                        "You must specify --sauce-username and --sauce-access-key when using: --{}",
                        environment
                    )));
                }
                true
            }
            _ => false,
        };

        let tunnel_identifier = env.get(ENV_TRAVIS_JOB_NUMBER).map(String::from);
        let keystone_url = keystone.map(KeystoneTarget::admin_url);

        let mut resolved = Self {
            environment,
            browser_name,
            browser_version,
            test_paths,
            page_object_paths,
            exclude_paths,
            selenium_jar,
            server_mode,
            tunnel_required,
            sauce,
            tunnel_identifier,
            keystone_url,
            exported_env: BTreeMap::new(),
        };
        resolved.exported_env = resolved.build_env();
        Ok(resolved)
    }

    fn build_env(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert(ENV_TEST_ENV.to_string(), self.environment.to_string());
        if let Some(name) = &self.browser_name {
            vars.insert(ENV_BROWSER_NAME.to_string(), name.clone());
        }
        if let Some(version) = &self.browser_version {
            vars.insert(ENV_BROWSER_VERSION.to_string(), version.clone());
        }
        vars.insert(ENV_TEST_PATHS.to_string(), join_paths(&self.test_paths));
        vars.insert(ENV_PAGE_OBJECT_PATHS.to_string(), join_paths(&self.page_object_paths));
        // Always initialised, the runner config splits it unconditionally
        vars.insert(ENV_EXCLUDE_TEST_PATHS.to_string(), join_paths(&self.exclude_paths));
        vars.insert(
            ENV_SELENIUM_SERVER.to_string(),
            self.selenium_jar.to_string_lossy().into_owned(),
        );
        vars.insert(
            ENV_SELENIUM_START_PROCESS.to_string(),
            (self.server_mode == ServerMode::RunnerManaged).to_string(),
        );
        if let Some(url) = &self.keystone_url {
            vars.insert(ENV_KEYSTONE_URL.to_string(), url.clone());
        }
        if let Some(sauce) = &self.sauce {
            vars.insert(ENV_SAUCE_USERNAME.to_string(), sauce.username.clone());
            vars.insert(ENV_SAUCE_ACCESS_KEY.to_string(), sauce.access_key.clone());
        }
        if let Some(id) = &self.tunnel_identifier {
            vars.insert(ENV_TRAVIS_JOB_NUMBER.to_string(), id.clone());
        }
        vars
    }
}

/// Split a comma-separated list, dropping empty segments
pub fn split_paths(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_paths(paths: &[String]) -> String {
    paths.join(",")
}

fn merge_paths(mut base: Vec<String>, extra: &[String]) -> Vec<String> {
    for path in extra.iter().flat_map(|p| split_paths(p)) {
        if !base.contains(&path) {
            base.push(path);
        }
    }
    base
}
