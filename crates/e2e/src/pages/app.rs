use async_trait::async_trait;
use std::time::Duration;

use super::PageObject;
use crate::browser::{expect, wait_for_visible, Browser};
use crate::config::KeystoneTarget;
use crate::error::{E2eError, E2eResult};
use crate::utils::{key_to_label, key_to_path};

const ELEMENTS: &[(&str, &str)] = &[
    // screens
    ("signinScreen", "#signin-view"),
    ("homeScreen", "div[data-screen-id=\"home\"]"),
    ("listScreen", "div[data-screen-id=\"list\"]"),
    ("itemScreen", "div[data-screen-id=\"item\"]"),
    ("initialFormScreen", ".Modal-dialog"),
    ("deleteConfirmationScreen", ".Modal-dialog"),
    ("resetConfirmationScreen", ".Modal-dialog"),
    // links
    ("homeIcon", ".primary-navbar [data-section-label=\"octicon-home\"]"),
    ("homeIconLink", ".primary-navbar [data-section-label=\"octicon-home\"] a"),
    ("frontPageIcon", ".primary-navbar [data-section-label=\"octicon-globe\"]"),
    ("frontPageIconLink", ".primary-navbar [data-section-label=\"octicon-globe\"] a"),
    ("logoutIcon", ".primary-navbar [data-section-label=\"octicon-sign-out\"]"),
    ("logoutIconLink", ".primary-navbar [data-section-label=\"octicon-sign-out\"] a"),
    ("primaryNavbar", ".primary-navbar"),
    ("secondaryNavbar", ".secondary-navbar"),
];

const SIGNOUT_PAUSE: Duration = Duration::from_millis(500);

/// Global admin UI screens, navigation and navbar commands
#[derive(Debug, Clone)]
pub struct AdminUiApp {
    url: String,
}

impl AdminUiApp {
    pub fn new(target: &KeystoneTarget) -> Self {
        Self {
            url: target.admin_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn primary_navbar_section_selector(section: &str) -> String {
        format!(
            ".primary-navbar li[data-section-label=\"{}\"]",
            key_to_label(section)
        )
    }

    pub fn secondary_navbar_list_selector(list: &str) -> String {
        format!(
            ".secondary-navbar li[data-list-path=\"{}\"]",
            key_to_path(list, true)
        )
    }

    async fn wait_for(&self, browser: &dyn Browser, element: &str) -> E2eResult<()> {
        wait_for_visible(browser, self.element(element)?).await
    }

    pub async fn goto_signin_screen(&self, browser: &dyn Browser, wait: bool) -> E2eResult<()> {
        browser.navigate(&self.url).await?;
        if wait {
            self.wait_for_signin_screen(browser).await?;
        }
        Ok(())
    }

    pub async fn goto_home_screen(&self, browser: &dyn Browser, wait: bool) -> E2eResult<()> {
        browser.navigate(&self.url).await?;
        if wait {
            self.wait_for_home_screen(browser).await?;
        }
        Ok(())
    }

    /// Open a list through the primary then secondary navbar
    pub async fn open_list(&self, browser: &dyn Browser, section: &str, list: &str, wait: bool) -> E2eResult<()> {
        if section.is_empty() || list.is_empty() {
            return Err(E2eError::InvalidSpec(
                "adminUIApp: must specify a navbar section and a list".to_string(),
            ));
        }
        self.click_primary_navbar(browser, section, true).await?;
        self.click_secondary_navbar(browser, list, wait).await
    }

    pub async fn click_primary_navbar(&self, browser: &dyn Browser, section: &str, wait: bool) -> E2eResult<()> {
        if section.is_empty() {
            return Err(E2eError::InvalidSpec(
                "adminUIApp: must specify a navbar section".to_string(),
            ));
        }
        browser
            .click(&Self::primary_navbar_section_selector(section))
            .await?;
        if wait {
            self.wait_for_secondary_navbar(browser).await?;
        }
        Ok(())
    }

    pub async fn click_secondary_navbar(&self, browser: &dyn Browser, list: &str, wait: bool) -> E2eResult<()> {
        if list.is_empty() {
            return Err(E2eError::InvalidSpec(
                "adminUIApp: must specify a navbar list".to_string(),
            ));
        }
        browser
            .click(&Self::secondary_navbar_list_selector(list))
            .await?;
        if wait {
            self.wait_for_list_screen(browser).await?;
        }
        Ok(())
    }

    pub async fn signout(&self, browser: &dyn Browser, wait: bool) -> E2eResult<()> {
        browser.pause(SIGNOUT_PAUSE).await;
        self.wait_for(browser, "logoutIcon").await?;
        self.click_element(browser, "logoutIconLink").await?;
        if wait {
            self.wait_for_signin_screen(browser).await?;
        }
        Ok(())
    }

    pub async fn wait_for_signin_screen(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.wait_for(browser, "signinScreen").await
    }

    pub async fn wait_for_home_screen(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.wait_for(browser, "homeScreen").await
    }

    pub async fn wait_for_initial_form_screen(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.wait_for(browser, "initialFormScreen").await
    }

    pub async fn wait_for_delete_confirmation_screen(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.wait_for(browser, "deleteConfirmationScreen").await
    }

    pub async fn wait_for_reset_confirmation_screen(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.wait_for(browser, "resetConfirmationScreen").await
    }

    pub async fn wait_for_list_screen(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.wait_for(browser, "listScreen").await
    }

    pub async fn wait_for_item_screen(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.wait_for(browser, "itemScreen").await
    }

    pub async fn wait_for_secondary_navbar(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.wait_for(browser, "secondaryNavbar").await
    }

    pub async fn assert_primary_navbar_section_visible(&self, browser: &dyn Browser, section: &str) -> E2eResult<()> {
        expect(browser)
            .visible(&Self::primary_navbar_section_selector(section))
            .await
    }

    pub async fn assert_secondary_navbar_list_visible(&self, browser: &dyn Browser, list: &str) -> E2eResult<()> {
        expect(browser)
            .visible(&Self::secondary_navbar_list_selector(list))
            .await
    }

    pub async fn assert_css_is_visible(&self, browser: &dyn Browser, css: &str) -> E2eResult<()> {
        expect(browser).visible(css).await
    }

    pub async fn assert_css_text_equals(&self, browser: &dyn Browser, css: &str, text: &str) -> E2eResult<()> {
        expect(browser).text_equals(css, text).await
    }

    pub async fn assert_css_text_contains(&self, browser: &dyn Browser, css: &str, text: &str) -> E2eResult<()> {
        expect(browser).text_contains(css, text).await
    }
}

#[async_trait]
impl PageObject for AdminUiApp {
    fn name(&self) -> &'static str {
        "adminUIApp"
    }

    fn elements(&self) -> &'static [(&'static str, &'static str)] {
        ELEMENTS
    }
}
