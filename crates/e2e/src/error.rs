//! Error types for E2E runs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("kne: {0}")]
    Config(String),

    #[error("Failed to spawn selenium server: {0}")]
    SeleniumSpawn(String),

    #[error("Selenium exited with error code {}", describe_exit(code, signal))]
    SeleniumExited {
        code: Option<i32>,
        /// Terminating signal when the process did not exit on its own
        signal: Option<i32>,
    },

    #[error("Timeout waiting for selenium server after {0:?}")]
    SeleniumTimeout(std::time::Duration),

    #[error("Sauce Connect error: {0}")]
    Tunnel(String),

    #[error("kne: nightwatch runner returned an error status code")]
    TestsFailed,

    #[error("failed to run nightwatch! {0}")]
    RunnerCrashed(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("{page}: invalid field name '{field}'")]
    UnknownField { page: String, field: String },

    #[error("{owner}: unknown element '{element}'")]
    UnknownElement { owner: String, element: String },

    #[error("{field}: invalid input: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{command} command not defined for {field} field")]
    UnsupportedCommand { field: String, command: String },

    #[error("{0}")]
    InvalidSpec(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

fn describe_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => code.to_string(),
        (None, Some(signal)) => format!("null (signal {})", signal),
        (None, None) => "null".to_string(),
    }
}

impl From<fantoccini::error::CmdError> for E2eError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        E2eError::WebDriver(e.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for E2eError {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        E2eError::WebDriver(e.to_string())
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
