use async_trait::async_trait;

use super::PageObject;
use crate::browser::Browser;
use crate::error::E2eResult;

const DELETE_ELEMENTS: &[(&str, &str)] = &[
    ("deleteButton", "button[data-button-type=\"confirm\"]"),
    ("cancelButton", "button[data-button-type=\"cancel\"]"),
];

const RESET_ELEMENTS: &[(&str, &str)] = &[
    ("resetButton", "button.Button.Button--danger"),
    ("cancelButton", "button.Button.Button--link-cancel"),
];

/// Modal shown before an item is deleted
#[derive(Debug, Clone, Default)]
pub struct AdminUiDeleteConfirmation;

impl AdminUiDeleteConfirmation {
    pub async fn delete(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "deleteButton").await
    }

    pub async fn cancel(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "cancelButton").await
    }
}

#[async_trait]
impl PageObject for AdminUiDeleteConfirmation {
    fn name(&self) -> &'static str {
        "adminUIDeleteConfirmation"
    }

    fn elements(&self) -> &'static [(&'static str, &'static str)] {
        DELETE_ELEMENTS
    }
}

/// Modal shown before unsaved changes are reset
#[derive(Debug, Clone, Default)]
pub struct AdminUiResetConfirmation;

impl AdminUiResetConfirmation {
    pub async fn reset(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "resetButton").await
    }

    pub async fn cancel(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "cancelButton").await
    }
}

#[async_trait]
impl PageObject for AdminUiResetConfirmation {
    fn name(&self) -> &'static str {
        "adminUIResetConfirmation"
    }

    fn elements(&self) -> &'static [(&'static str, &'static str)] {
        RESET_ELEMENTS
    }
}
