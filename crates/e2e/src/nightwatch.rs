//! Nightwatch runner configuration and invocation

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{Environment, ResolvedRun, RunnerSection, ServerMode};
use crate::error::{E2eError, E2eResult};

const GENERATED_CONFIG: &str = "nightwatch.generated.json";
const GECKO_DRIVER_ARG: &str = "webdriver.gecko.driver";

/// Runner settings: the project's base JSON with the run overlaid on top
#[derive(Debug, Clone, PartialEq)]
pub struct NightwatchSettings(Value);

impl NightwatchSettings {
    /// Read the base settings file; a missing file yields an empty default
    pub fn load_base(path: &Path) -> E2eResult<Value> {
        if !path.exists() {
            debug!("no runner base config at {}, using defaults", path.display());
            return Ok(json!({ "test_settings": { "default": {} } }));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn from_base(base: Value, run: &ResolvedRun, runner: &RunnerSection) -> E2eResult<Self> {
        let mut settings = match base {
            Value::Object(map) => map,
            _ => {
                return Err(E2eError::Config(
                    "runner base config must be a JSON object".to_string(),
                ))
            }
        };

        settings.insert("src_folders".into(), json!(run.test_paths));
        settings.insert("page_objects_path".into(), json!(run.page_object_paths));
        if let Some(globals) = &runner.globals_path {
            settings.insert("globals_path".into(), json!(globals));
        }

        let selenium = object_entry(&mut settings, "selenium");
        selenium.insert(
            "start_process".into(),
            json!(run.server_mode == ServerMode::RunnerManaged),
        );
        selenium.insert("server_path".into(), json!(run.selenium_jar));

        let test_settings = object_entry(&mut settings, "test_settings");
        object_entry(test_settings, "default").insert("exclude".into(), json!(run.exclude_paths));

        if let Some(id) = &run.tunnel_identifier {
            if let Some(travis) = test_settings
                .get_mut(Environment::SaucelabsTravis.as_str())
                .and_then(Value::as_object_mut)
            {
                object_entry(travis, "desiredCapabilities")
                    .insert("tunnel-identifier".into(), json!(id));
            }
        }

        if let Some(gecko) = &runner.gecko_driver {
            for env in test_settings.values_mut().filter_map(Value::as_object_mut) {
                object_entry(env, "cli_args").insert(GECKO_DRIVER_ARG.into(), json!(gecko));
            }
        }

        Ok(Self(Value::Object(settings)))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Write the settings into `dir`, returning the file path
    pub fn write_to(&self, dir: &Path) -> E2eResult<PathBuf> {
        let path = dir.join(GENERATED_CONFIG);
        std::fs::write(&path, serde_json::to_string_pretty(&self.0)?)?;
        Ok(path)
    }
}

/// Object under `key`, replacing any non-object value
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(inner) => inner,
        _ => unreachable!("entry was just made an object"),
    }
}

/// A prepared runner call
#[derive(Debug)]
pub struct RunnerInvocation {
    pub env_name: String,
    pub config_path: PathBuf,
    pub env: BTreeMap<String, String>,
    _workdir: Option<TempDir>,
}

impl RunnerInvocation {
    pub fn new(env_name: impl Into<String>, config_path: PathBuf, env: BTreeMap<String, String>) -> Self {
        Self {
            env_name: env_name.into(),
            config_path,
            env,
            _workdir: None,
        }
    }

    /// Generate the runner config in a scratch directory kept alive by the invocation
    pub fn prepare(run: &ResolvedRun, runner: &RunnerSection) -> E2eResult<Self> {
        let base = NightwatchSettings::load_base(&runner.base_config)?;
        let settings = NightwatchSettings::from_base(base, run, runner)?;
        let workdir = tempfile::Builder::new().prefix("kne-").tempdir()?;
        let config_path = settings.write_to(workdir.path())?;
        debug!("runner config written to {}", config_path.display());
        Ok(Self {
            env_name: run.environment.to_string(),
            config_path,
            env: run.exported_env.clone(),
            _workdir: Some(workdir),
        })
    }
}

/// Runs the test suite, reporting whether it passed
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run(&self, invocation: &RunnerInvocation) -> E2eResult<bool>;
}

/// Invokes the nightwatch CLI
#[derive(Debug, Clone)]
pub struct NightwatchRunner {
    pub program: PathBuf,
    pub extra_args: Vec<String>,
}

impl NightwatchRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }
}

#[async_trait]
impl TestRunner for NightwatchRunner {
    async fn run(&self, invocation: &RunnerInvocation) -> E2eResult<bool> {
        info!("kne: running nightwatch...");
        let status = Command::new(&self.program)
            .arg("--config")
            .arg(&invocation.config_path)
            .arg("--env")
            .arg(&invocation.env_name)
            .args(&self.extra_args)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| E2eError::RunnerCrashed(format!("{}: {}", self.program.display(), e)))?;
        debug!("nightwatch exited with {}", status);
        Ok(status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvSnapshot, InvocationArgs, KneConfig};

    fn resolved(env: &[(&str, &str)], args: InvocationArgs) -> ResolvedRun {
        ResolvedRun::resolve(
            &args,
            &EnvSnapshot::from_pairs(env.iter().copied()),
            &KneConfig::default(),
            None,
        )
        .unwrap()
    }

    fn base() -> Value {
        json!({
            "src_folders": [],
            "test_settings": {
                "default": { "cli_args": {} },
                "saucelabs-travis": { "desiredCapabilities": { "browserName": "chrome" } },
                "saucelabs-local": {}
            }
        })
    }

    #[test]
    fn overlays_paths_and_excludes() {
        let run = resolved(
            &[("KNE_TEST_PATHS", "tests/a,tests/b")],
            InvocationArgs {
                exclude_paths: vec!["tests/b/skip".to_string()],
                ..Default::default()
            },
        );
        let settings = NightwatchSettings::from_base(base(), &run, &RunnerSection::default()).unwrap();
        let json = settings.as_json();
        assert_eq!(json["src_folders"], json!(["tests/a", "tests/b"]));
        assert_eq!(json["test_settings"]["default"]["exclude"], json!(["tests/b/skip"]));
        assert_eq!(json["selenium"]["start_process"], json!(true));
        assert!(json["page_objects_path"]
            .as_array()
            .unwrap()
            .contains(&json!("lib/src/pageObjects")));
    }

    #[test]
    fn travis_tunnel_identifier_and_gecko_driver() {
        let run = resolved(
            &[
                ("KNE_TEST_PATHS", "tests"),
                ("KNE_TEST_ENV", "saucelabs-travis"),
                ("SAUCE_USERNAME", "u"),
                ("SAUCE_ACCESS_KEY", "k"),
                ("TRAVIS_JOB_NUMBER", "42.1"),
            ],
            InvocationArgs::default(),
        );
        let runner = RunnerSection {
            gecko_driver: Some(PathBuf::from("bin/geckodriver")),
            ..Default::default()
        };
        let settings = NightwatchSettings::from_base(base(), &run, &runner).unwrap();
        let json = settings.as_json();
        assert_eq!(
            json["test_settings"]["saucelabs-travis"]["desiredCapabilities"]["tunnel-identifier"],
            json!("42.1")
        );
        assert_eq!(
            json["test_settings"]["saucelabs-travis"]["desiredCapabilities"]["browserName"],
            json!("chrome")
        );
        for env in ["default", "saucelabs-travis", "saucelabs-local"] {
            assert_eq!(
                json["test_settings"][env]["cli_args"][GECKO_DRIVER_ARG],
                json!("bin/geckodriver")
            );
        }
        assert_eq!(json["selenium"]["start_process"], json!(false));
    }

    #[test]
    fn rejects_non_object_base() {
        let run = resolved(&[("KNE_TEST_PATHS", "tests")], InvocationArgs::default());
        assert!(NightwatchSettings::from_base(json!([]), &run, &RunnerSection::default()).is_err());
    }

    #[test]
    fn prepare_writes_config_and_exports_env() {
        let dir = tempfile::tempdir().unwrap();
        let base_path = dir.path().join("nightwatch.json");
        std::fs::write(&base_path, base().to_string()).unwrap();
        let runner = RunnerSection {
            base_config: base_path,
            ..Default::default()
        };
        let run = resolved(&[("KNE_TEST_PATHS", "tests/smoke")], InvocationArgs::default());

        let invocation = RunnerInvocation::prepare(&run, &runner).unwrap();
        assert_eq!(invocation.env_name, "default");
        assert_eq!(invocation.env.get("KNE_TEST_PATHS").unwrap(), "tests/smoke");
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&invocation.config_path).unwrap()).unwrap();
        assert_eq!(written["src_folders"], json!(["tests/smoke"]));
    }
}
