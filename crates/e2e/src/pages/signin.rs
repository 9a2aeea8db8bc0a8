use async_trait::async_trait;

use super::{AdminUiApp, PageObject};
use crate::browser::{expect, Browser};
use crate::error::E2eResult;

const ELEMENTS: &[(&str, &str)] = &[
    ("email", "input[name=email]"),
    ("password", "input[name=password]"),
    ("submitButton", "button[type=submit]"),
];

/// Credentials for the signin form
#[derive(Debug, Clone)]
pub struct SigninConfig {
    pub user: String,
    pub password: String,
    /// Wait for the home screen after submitting
    pub wait: bool,
}

impl Default for SigninConfig {
    fn default() -> Self {
        Self {
            user: "user@test.e2e".to_string(),
            password: "test".to_string(),
            wait: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminUiSignin;

impl AdminUiSignin {
    pub async fn signin(&self, browser: &dyn Browser, app: &AdminUiApp, config: &SigninConfig) -> E2eResult<()> {
        browser.set_value(self.element("email")?, &config.user).await?;
        browser
            .set_value(self.element("password")?, &config.password)
            .await?;
        self.click_element(browser, "submitButton").await?;
        if config.wait {
            app.wait_for_home_screen(browser).await?;
        }
        Ok(())
    }

    pub async fn assert_ui(&self, browser: &dyn Browser) -> E2eResult<()> {
        for (_, css) in ELEMENTS {
            expect(browser).visible(css).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PageObject for AdminUiSignin {
    fn name(&self) -> &'static str {
        "adminUISignin"
    }

    fn elements(&self) -> &'static [(&'static str, &'static str)] {
        ELEMENTS
    }
}
