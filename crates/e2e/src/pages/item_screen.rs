use async_trait::async_trait;

use super::{FieldForm, FieldSpec, PageObject};
use crate::browser::Browser;
use crate::error::E2eResult;
use crate::fields::ModelTestConfig;

const OWNER: &str = "adminUIItemScreen";

const FORM_SELECTOR: &str = ".keystone-body .EditForm-container";

const ELEMENTS: &[(&str, &str)] = &[
    ("listBreadcrumb", "a[data-e2e-editform-header-back=\"true\"]"),
    ("searchInputIcon", ".EditForm__header__search input[class=\"FormInput EditForm__header__search-input\"]"),
    ("newItemButton", ".Toolbar__section button[data-e2e-item-create-button=\"true\"]"),
    ("flashMessage", ".Alert--success"),
    ("flashError", ".Alert--danger"),
    ("readOnlyNameHeader", ".EditForm__name-field h2"),
    ("editableNameHeader", ".EditForm__name-field input[class*=\"item-name-field\"]"),
    ("idLabel", ".EditForm__key-or-id span[class=\"EditForm__key-or-id__label\"]"),
    ("idValue", ".EditForm__key-or-id span[class=\"EditForm__key-or-id__field\"]"),
    ("metaHeader", ".EditForm h3[class=\"form-heading\"]"),
    ("metaCreatedAtLabel", ".EditForm .FormField[for=\"createdAt\"] label[for=\"createdAt\"]"),
    ("metaCreatedAtValue", ".EditForm .FormField[for=\"createdAt\"] .FormInput-noedit"),
    ("metaCreatedByLabel", ".EditForm .FormField[for=\"createdBy\"] label[for=\"createdBy\"]"),
    ("metaCreatedByValue", ".EditForm .FormField[for=\"createdBy\"] .FormInput-noedit"),
    ("metaUpdatedAtLabel", ".EditForm .FormField[for=\"updatedAt\"] label[for=\"updatedAt\"]"),
    ("metaUpdatedAtValue", ".EditForm .FormField[for=\"updatedAt\"] .FormInput-noedit"),
    ("metaUpdatedByLabel", ".EditForm .FormField[for=\"updatedBy\"] label[for=\"updatedBy\"]"),
    ("metaUpdatedByValue", ".EditForm .FormField[for=\"updatedBy\"] .FormInput-noedit"),
    ("saveButton", ".EditForm-container button[data-button=update]"),
    ("resetButton", ".EditForm-container button[data-button=reset]"),
    ("resetButtonText", ".EditForm-container button[data-button=reset] span"),
    ("deleteButton", ".EditForm-container button[data-button=delete]"),
    ("deleteButtonText", ".EditForm-container button[data-button=delete] span"),
    ("firstRelationshipItemLink", "div.Relationships > div > div > div > table > tbody > tr > td > a"),
];

/// Edit screen of a single item
#[derive(Debug, Clone)]
pub struct AdminUiItemScreen {
    form: FieldForm,
}

impl Default for AdminUiItemScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminUiItemScreen {
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

    pub async fn navigate_to_first_relationship(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "firstRelationshipItemLink").await
    }

    /// Back to the list via the breadcrumb
    pub async fn back(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "listBreadcrumb").await
    }

    pub async fn new_item(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "newItemButton").await
    }

    pub async fn save(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.form.click(browser, "button[data-button=update]").await
    }

    pub async fn reset(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.form.click(browser, "button[data-button=reset]").await
    }

    pub async fn delete(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.form.click(browser, "button[data-button=delete]").await
    }
}

#[async_trait]
impl PageObject for AdminUiItemScreen {
    fn name(&self) -> &'static str {
        OWNER
    }

    fn elements(&self) -> &'static [(&'static str, &'static str)] {
        ELEMENTS
    }
}
