//! Browser automation seam
//!
//! Page objects and field test objects talk to a [`Browser`], never to a
//! WebDriver client directly. [`WebDriverBrowser`] drives a real session
//! through `fantoccini`; tests substitute a recording implementation.
//!
//! Assertions go through [`Expect`], which polls a [`Condition`] until it
//! holds or the wait settings run out, mirroring how the admin UI settles
//! asynchronously after every interaction.

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

use crate::config::{BrowserSection, ResolvedRun};
use crate::error::{E2eError, E2eResult};

/// WebDriver key code points
pub mod keys {
    pub const ENTER: &str = "\u{E007}";
    pub const TAB: &str = "\u{E004}";
    pub const ESCAPE: &str = "\u{E00C}";
}

/// How long assertions wait for a condition to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl From<&BrowserSection> for WaitSettings {
    fn from(section: &BrowserSection) -> Self {
        Self {
            timeout: Duration::from_millis(section.wait_for_condition_timeout_ms),
            poll_interval: Duration::from_millis(section.poll_interval_ms),
        }
    }
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn navigate(&self, url: &str) -> E2eResult<()>;

    async fn click(&self, selector: &str) -> E2eResult<()>;

    async fn clear_value(&self, selector: &str) -> E2eResult<()>;

    /// Type into the element matching `selector`
    async fn set_value(&self, selector: &str, value: &str) -> E2eResult<()>;

    /// `value` property of the first match, `None` when absent
    async fn value(&self, selector: &str) -> E2eResult<Option<String>>;

    /// Rendered text of the first match, `None` when absent
    async fn text(&self, selector: &str) -> E2eResult<Option<String>>;

    async fn attribute(&self, selector: &str, name: &str) -> E2eResult<Option<String>>;

    async fn is_present(&self, selector: &str) -> E2eResult<bool>;

    async fn is_visible(&self, selector: &str) -> E2eResult<bool>;

    async fn execute(&self, script: &str, args: Vec<Value>) -> E2eResult<Value>;

    /// Send keys to whichever element currently has focus
    async fn send_keys_to_active(&self, keys: &str) -> E2eResult<()>;

    async fn pause(&self, duration: Duration) {
        sleep(duration).await;
    }

    fn wait_settings(&self) -> WaitSettings {
        WaitSettings::default()
    }
}

/// Something an element should satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Visible,
    NotVisible,
    Present,
    NotPresent,
    TextEquals(String),
    TextNotEquals(String),
    TextContains(String),
    ValueEquals(String),
    AttributeContains { name: String, value: String },
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Visible => write!(f, "to be visible"),
            Condition::NotVisible => write!(f, "to not be visible"),
            Condition::Present => write!(f, "to be present"),
            Condition::NotPresent => write!(f, "to not be present"),
            Condition::TextEquals(v) => write!(f, "text to equal {:?}", v),
            Condition::TextNotEquals(v) => write!(f, "text to not equal {:?}", v),
            Condition::TextContains(v) => write!(f, "text to contain {:?}", v),
            Condition::ValueEquals(v) => write!(f, "value to equal {:?}", v),
            Condition::AttributeContains { name, value } => {
                write!(f, "attribute {} to contain {:?}", name, value)
            }
        }
    }
}

/// Polling assertions against a browser
pub struct Expect<'a> {
    browser: &'a dyn Browser,
    settings: WaitSettings,
}

pub fn expect(browser: &dyn Browser) -> Expect<'_> {
    Expect {
        settings: browser.wait_settings(),
        browser,
    }
}

impl<'a> Expect<'a> {
    pub fn with_settings(mut self, settings: WaitSettings) -> Self {
        self.settings = settings;
        self
    }

    async fn holds(&self, selector: &str, condition: &Condition) -> E2eResult<bool> {
        let b = self.browser;
        Ok(match condition {
            Condition::Visible => b.is_visible(selector).await?,
            Condition::NotVisible => !b.is_visible(selector).await?,
            Condition::Present => b.is_present(selector).await?,
            Condition::NotPresent => !b.is_present(selector).await?,
            Condition::TextEquals(v) => b.text(selector).await?.as_deref() == Some(v.as_str()),
            Condition::TextNotEquals(v) => b.text(selector).await?.as_deref() != Some(v.as_str()),
            Condition::TextContains(v) => b
                .text(selector)
                .await?
                .is_some_and(|text| text.contains(v.as_str())),
            Condition::ValueEquals(v) => b.value(selector).await?.as_deref() == Some(v.as_str()),
            Condition::AttributeContains { name, value } => b
                .attribute(selector, name)
                .await?
                .is_some_and(|attr| attr.contains(value.as_str())),
        })
    }

    /// Poll until `condition` holds for `selector`
    pub async fn element(&self, selector: &str, condition: Condition) -> E2eResult<()> {
        let start = Instant::now();
        loop {
            if self.holds(selector, &condition).await? {
                return Ok(());
            }
            if start.elapsed() >= self.settings.timeout {
                return Err(E2eError::AssertionFailed(format!(
                    "expected element <{}> {} (waited {} ms)",
                    selector,
                    condition,
                    self.settings.timeout.as_millis()
                )));
            }
            sleep(self.settings.poll_interval).await;
        }
    }

    pub async fn visible(&self, selector: &str) -> E2eResult<()> {
        self.element(selector, Condition::Visible).await
    }

    pub async fn not_visible(&self, selector: &str) -> E2eResult<()> {
        self.element(selector, Condition::NotVisible).await
    }

    pub async fn present(&self, selector: &str) -> E2eResult<()> {
        self.element(selector, Condition::Present).await
    }

    pub async fn not_present(&self, selector: &str) -> E2eResult<()> {
        self.element(selector, Condition::NotPresent).await
    }

    pub async fn text_equals(&self, selector: &str, text: &str) -> E2eResult<()> {
        self.element(selector, Condition::TextEquals(text.to_string()))
            .await
    }

    pub async fn text_not_equals(&self, selector: &str, text: &str) -> E2eResult<()> {
        self.element(selector, Condition::TextNotEquals(text.to_string()))
            .await
    }

    pub async fn text_contains(&self, selector: &str, text: &str) -> E2eResult<()> {
        self.element(selector, Condition::TextContains(text.to_string()))
            .await
    }

    pub async fn value_equals(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.element(selector, Condition::ValueEquals(value.to_string()))
            .await
    }

    pub async fn attribute_contains(&self, selector: &str, name: &str, value: &str) -> E2eResult<()> {
        self.element(
            selector,
            Condition::AttributeContains {
                name: name.to_string(),
                value: value.to_string(),
            },
        )
        .await
    }
}

/// Wait for an element to become visible, the `waitForElementVisible` of page objects
pub async fn wait_for_visible(browser: &dyn Browser, selector: &str) -> E2eResult<()> {
    expect(browser).visible(selector).await.map_err(|e| match e {
        E2eError::AssertionFailed(_) => E2eError::Timeout(format!(
            "element <{}> to be visible after {} ms",
            selector,
            browser.wait_settings().timeout.as_millis()
        )),
        other => other,
    })
}

/// Session capabilities requested from the automation server
#[derive(Debug, Clone, Default)]
pub struct BrowserCapabilities {
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub tunnel_identifier: Option<String>,
}

impl BrowserCapabilities {
    pub fn from_run(run: &ResolvedRun) -> Self {
        Self {
            browser_name: run.browser_name.clone(),
            browser_version: run.browser_version.clone(),
            tunnel_identifier: run.tunnel_identifier.clone(),
        }
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert(
            "browserName".to_string(),
            Value::String(self.browser_name.clone().unwrap_or_else(|| "firefox".to_string())),
        );
        if let Some(version) = &self.browser_version {
            caps.insert("browserVersion".to_string(), Value::String(version.clone()));
        }
        if let Some(id) = &self.tunnel_identifier {
            caps.insert("tunnel-identifier".to_string(), Value::String(id.clone()));
        }
        caps
    }
}

/// `fantoccini`-backed browser session
pub struct WebDriverBrowser {
    client: Client,
    settings: WaitSettings,
}

impl WebDriverBrowser {
    pub async fn connect(
        webdriver_url: &str,
        capabilities: &BrowserCapabilities,
        settings: WaitSettings,
    ) -> E2eResult<Self> {
        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::rustls()
            .map_err(|e| E2eError::WebDriver(e.to_string()))?
            .capabilities(capabilities.to_json())
            .connect(webdriver_url)
            .await?;
        Ok(Self { client, settings })
    }

    pub async fn close(self) -> E2eResult<()> {
        self.client.close().await?;
        Ok(())
    }

    async fn first(&self, selector: &str) -> E2eResult<Option<fantoccini::elements::Element>> {
        let mut found = self.client.find_all(Locator::Css(selector)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    async fn require(&self, selector: &str) -> E2eResult<fantoccini::elements::Element> {
        self.first(selector).await?.ok_or_else(|| {
            E2eError::WebDriver(format!("no element matches <{}>", selector))
        })
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.require(selector).await?.click().await?;
        Ok(())
    }

    async fn clear_value(&self, selector: &str) -> E2eResult<()> {
        self.require(selector).await?.clear().await?;
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.require(selector).await?.send_keys(value).await?;
        Ok(())
    }

    async fn value(&self, selector: &str) -> E2eResult<Option<String>> {
        match self.first(selector).await? {
            Some(element) => Ok(element.prop("value").await?),
            None => Ok(None),
        }
    }

    async fn text(&self, selector: &str) -> E2eResult<Option<String>> {
        match self.first(selector).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    async fn attribute(&self, selector: &str, name: &str) -> E2eResult<Option<String>> {
        match self.first(selector).await? {
            Some(element) => Ok(element.attr(name).await?),
            None => Ok(None),
        }
    }

    async fn is_present(&self, selector: &str) -> E2eResult<bool> {
        Ok(self.first(selector).await?.is_some())
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        match self.first(selector).await? {
            Some(element) => Ok(element.is_displayed().await?),
            None => Ok(false),
        }
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        Ok(self.client.execute(script, args).await?)
    }

    async fn send_keys_to_active(&self, keys: &str) -> E2eResult<()> {
        self.client.active_element().await?.send_keys(keys).await?;
        Ok(())
    }

    fn wait_settings(&self) -> WaitSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Element whose text appears after a number of polls
    struct SlowText {
        polls: Mutex<u32>,
        ready_after: u32,
        elements: HashMap<&'static str, &'static str>,
    }

    #[async_trait]
    impl Browser for SlowText {
        async fn navigate(&self, _url: &str) -> E2eResult<()> {
            Ok(())
        }
        async fn click(&self, _selector: &str) -> E2eResult<()> {
            Ok(())
        }
        async fn clear_value(&self, _selector: &str) -> E2eResult<()> {
            Ok(())
        }
        async fn set_value(&self, _selector: &str, _value: &str) -> E2eResult<()> {
            Ok(())
        }
        async fn value(&self, _selector: &str) -> E2eResult<Option<String>> {
            Ok(None)
        }
        async fn text(&self, selector: &str) -> E2eResult<Option<String>> {
            let mut polls = self.polls.lock().unwrap();
            *polls += 1;
            if *polls < self.ready_after {
                return Ok(Some(String::new()));
            }
            Ok(self.elements.get(selector).map(|s| s.to_string()))
        }
        async fn attribute(&self, _selector: &str, _name: &str) -> E2eResult<Option<String>> {
            Ok(None)
        }
        async fn is_present(&self, selector: &str) -> E2eResult<bool> {
            Ok(self.elements.contains_key(selector))
        }
        async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
            if selector == ".detached" {
                return Err(E2eError::WebDriver("invalid session id".to_string()));
            }
            Ok(self.elements.contains_key(selector))
        }
        async fn execute(&self, _script: &str, _args: Vec<Value>) -> E2eResult<Value> {
            Ok(Value::Null)
        }
        async fn send_keys_to_active(&self, _keys: &str) -> E2eResult<()> {
            Ok(())
        }
        fn wait_settings(&self) -> WaitSettings {
            WaitSettings {
                timeout: Duration::from_millis(200),
                poll_interval: Duration::from_millis(5),
            }
        }
    }

    fn browser(ready_after: u32) -> SlowText {
        SlowText {
            polls: Mutex::new(0),
            ready_after,
            elements: HashMap::from([(".heading", "Keystone")]),
        }
    }

    #[tokio::test]
    async fn expect_polls_until_text_settles() {
        let b = browser(3);
        expect(&b).text_equals(".heading", "Keystone").await.unwrap();
        assert!(*b.polls.lock().unwrap() >= 3);
    }

    #[tokio::test]
    async fn expect_fails_after_timeout() {
        let b = browser(0);
        let err = expect(&b).text_equals(".heading", "Admin").await.unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert!(err.to_string().contains(".heading"));
    }

    #[tokio::test]
    async fn absent_element_is_not_visible() {
        let b = browser(0);
        expect(&b).not_visible(".missing").await.unwrap();
        expect(&b).not_present(".missing").await.unwrap();
        expect(&b).text_not_equals(".missing", "Keystone").await.unwrap();
    }

    #[tokio::test]
    async fn wait_for_visible_reports_timeout() {
        let b = browser(0);
        let err = wait_for_visible(&b, ".missing").await.unwrap_err();
        assert!(matches!(err, E2eError::Timeout(_)));
    }

    #[tokio::test]
    async fn wait_for_visible_passes_driver_errors_through() {
        let b = browser(0);
        let err = wait_for_visible(&b, ".detached").await.unwrap_err();
        assert!(matches!(err, E2eError::WebDriver(ref msg) if msg == "invalid session id"));
    }

    #[test]
    fn capabilities_default_to_firefox() {
        let caps = BrowserCapabilities::default().to_json();
        assert_eq!(caps["browserName"], "firefox");
        assert!(!caps.contains_key("browserVersion"));
    }

    #[test]
    fn wait_settings_follow_config() {
        let section = BrowserSection {
            wait_for_condition_timeout_ms: 1500,
            poll_interval_ms: 100,
            ..Default::default()
        };
        let settings = WaitSettings::from(&section);
        assert_eq!(settings.timeout, Duration::from_millis(1500));
        assert_eq!(settings.poll_interval, Duration::from_millis(100));
    }
}
