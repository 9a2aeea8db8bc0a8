//! In-memory `Browser` that records every interaction

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use keystone_e2e::browser::{Browser, WaitSettings};
use keystone_e2e::{E2eError, E2eResult};
use serde_json::Value;

#[derive(Default)]
struct State {
    visible: HashSet<String>,
    present: HashSet<String>,
    texts: HashMap<String, String>,
    values: HashMap<String, String>,
    actions: Vec<String>,
}

#[derive(Default)]
pub struct RecordingBrowser {
    state: Mutex<State>,
    everything_visible: bool,
}

impl RecordingBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every selector reports visible and present
    pub fn all_visible() -> Self {
        Self {
            everything_visible: true,
            ..Self::default()
        }
    }

    pub fn show(&self, selector: &str) {
        self.state.lock().unwrap().visible.insert(selector.to_string());
    }

    pub fn set_text(&self, selector: &str, text: &str) {
        let mut state = self.state.lock().unwrap();
        state.present.insert(selector.to_string());
        state.texts.insert(selector.to_string(), text.to_string());
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    fn record(&self, action: String) {
        self.state.lock().unwrap().actions.push(action);
    }
}

#[async_trait]
impl Browser for RecordingBrowser {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.record(format!("navigate {}", url));
        Ok(())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.record(format!("click {}", selector));
        Ok(())
    }

    async fn clear_value(&self, selector: &str) -> E2eResult<()> {
        self.record(format!("clear {}", selector));
        self.state.lock().unwrap().values.remove(selector);
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.record(format!("set {} = {}", selector, value));
        self.state
            .lock()
            .unwrap()
            .values
            .entry(selector.to_string())
            .or_default()
            .push_str(value);
        Ok(())
    }

    async fn value(&self, selector: &str) -> E2eResult<Option<String>> {
        Ok(self.state.lock().unwrap().values.get(selector).cloned())
    }

    async fn text(&self, selector: &str) -> E2eResult<Option<String>> {
        Ok(self.state.lock().unwrap().texts.get(selector).cloned())
    }

    async fn attribute(&self, _selector: &str, _name: &str) -> E2eResult<Option<String>> {
        Ok(None)
    }

    async fn is_present(&self, selector: &str) -> E2eResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(self.everything_visible || state.present.contains(selector) || state.visible.contains(selector))
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        Ok(self.everything_visible || self.state.lock().unwrap().visible.contains(selector))
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        self.record(format!("execute {} {:?}", script.len(), args));
        Err(E2eError::WebDriver("scripts are not supported here".to_string()))
    }

    async fn send_keys_to_active(&self, keys: &str) -> E2eResult<()> {
        self.record(format!("keys {:?}", keys));
        Ok(())
    }

    async fn pause(&self, duration: Duration) {
        self.record(format!("pause {}ms", duration.as_millis()));
    }

    fn wait_settings(&self) -> WaitSettings {
        WaitSettings {
            timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
        }
    }
}
