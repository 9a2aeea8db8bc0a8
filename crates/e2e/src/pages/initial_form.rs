use async_trait::async_trait;

use super::{FieldForm, FieldSpec, PageObject};
use crate::browser::Browser;
use crate::error::E2eResult;
use crate::fields::ModelTestConfig;

const OWNER: &str = "adminUIInitialForm";

const FORM_SELECTOR: &str = ".Modal-dialog .create-form";

const ELEMENTS: &[(&str, &str)] = &[("flashError", ".Alert--danger")];

/// Create-item modal shown from the list screen or a home screen tab
#[derive(Debug, Clone)]
pub struct AdminUiInitialForm {
    form: FieldForm,
}

impl Default for AdminUiInitialForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminUiInitialForm {
    pub fn new() -> Self {
        Self {
            form: FieldForm::new(OWNER, FORM_SELECTOR),
        }
    }

    pub fn form(&self) -> &FieldForm {
        &self.form
    }

    pub fn set_default_model_test_config(&mut self, model: ModelTestConfig) {
        self.form.set_default_model_test_config(model);
    }

    pub async fn assert_field_ui_visible(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        self.form.assert_field_ui_visible(browser, fields).await
    }

    pub async fn assert_field_ui_not_visible(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        self.form.assert_field_ui_not_visible(browser, fields).await
    }

    pub async fn assert_field_dom_present(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        self.form.assert_field_dom_present(browser, fields).await
    }

    pub async fn assert_field_dom_not_present(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        self.form.assert_field_dom_not_present(browser, fields).await
    }

    pub async fn click_field_ui(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        self.form.click_field_ui(browser, fields).await
    }

    pub async fn fill_field_inputs(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        self.form.fill_field_inputs(browser, fields).await
    }

    pub async fn assert_field_inputs(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        self.form.assert_field_inputs(browser, fields).await
    }

    pub async fn save(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.form
            .click(browser, "button[class=\"Button Button--success\"]")
            .await
    }

    pub async fn cancel(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.form
            .click(browser, "button[class=\"Button Button--link-cancel\"]")
            .await
    }
}

#[async_trait]
impl PageObject for AdminUiInitialForm {
    fn name(&self) -> &'static str {
        OWNER
    }

    fn elements(&self) -> &'static [(&'static str, &'static str)] {
        ELEMENTS
    }
}
