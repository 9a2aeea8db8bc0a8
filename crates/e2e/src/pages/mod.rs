//! Admin UI page objects
//!
//! A page object names the elements of one screen and offers the commands a
//! test needs against it. Screens that host edit forms (item screen, initial
//! create form) route field-level commands through [`FieldForm`], which looks
//! the field up in a [`ModelTestConfig`] and calls the matching
//! [`FieldTestObject`] capability.

mod app;
mod confirmation;
mod home_screen;
mod initial_form;
mod item_screen;
mod list_screen;
mod signin;

pub use app::AdminUiApp;
pub use confirmation::{AdminUiDeleteConfirmation, AdminUiResetConfirmation};
pub use home_screen::{AdminUiHomeScreen, HomeScreenGroup, HomeScreenTab, TabClickable};
pub use initial_form::AdminUiInitialForm;
pub use item_screen::AdminUiItemScreen;
pub use list_screen::{AdminUiListScreen, ItemFieldSpec, ItemPosition};
pub use signin::{AdminUiSignin, SigninConfig};

use async_trait::async_trait;

use crate::browser::{expect, Browser};
use crate::error::{E2eError, E2eResult};
use crate::fields::{FieldInput, FieldOptions, FieldTestObject, ModelTestConfig};

/// Named elements plus the element-level assertions every screen shares
#[async_trait]
pub trait PageObject: Send + Sync {
    fn name(&self) -> &'static str;

    fn elements(&self) -> &'static [(&'static str, &'static str)];

    fn element(&self, key: &str) -> E2eResult<&'static str> {
        self.elements()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, css)| *css)
            .ok_or_else(|| E2eError::UnknownElement {
                owner: self.name().to_string(),
                element: key.to_string(),
            })
    }

    async fn assert_element_is_visible(&self, browser: &dyn Browser, element: &str) -> E2eResult<()> {
        expect(browser).visible(self.element(element)?).await
    }

    async fn assert_element_is_not_visible(&self, browser: &dyn Browser, element: &str) -> E2eResult<()> {
        expect(browser).not_visible(self.element(element)?).await
    }

    async fn assert_element_is_present(&self, browser: &dyn Browser, element: &str) -> E2eResult<()> {
        expect(browser).present(self.element(element)?).await
    }

    async fn assert_element_is_not_present(&self, browser: &dyn Browser, element: &str) -> E2eResult<()> {
        expect(browser).not_present(self.element(element)?).await
    }

    async fn assert_element_text_equals(&self, browser: &dyn Browser, element: &str, text: &str) -> E2eResult<()> {
        expect(browser).text_equals(self.element(element)?, text).await
    }

    async fn assert_element_text_not_equals(&self, browser: &dyn Browser, element: &str, text: &str) -> E2eResult<()> {
        expect(browser)
            .text_not_equals(self.element(element)?, text)
            .await
    }

    async fn assert_element_text_contains(&self, browser: &dyn Browser, element: &str, text: &str) -> E2eResult<()> {
        expect(browser).text_contains(self.element(element)?, text).await
    }

    async fn assert_element_has_attribute(
        &self,
        browser: &dyn Browser,
        element: &str,
        attribute: &str,
        value: &str,
    ) -> E2eResult<()> {
        expect(browser)
            .attribute_contains(self.element(element)?, attribute, value)
            .await
    }

    async fn click_element(&self, browser: &dyn Browser, element: &str) -> E2eResult<()> {
        browser.click(self.element(element)?).await
    }
}

/// One field addressed by a form-level command
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    pub name: String,
    pub input: Option<FieldInput>,
    pub options: FieldOptions,
    /// Element to click, for `click_field_ui`
    pub click: Option<String>,
    /// Overrides the page's default model test config
    pub model: Option<ModelTestConfig>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn input(mut self, input: FieldInput) -> Self {
        self.input = Some(input);
        self
    }

    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    pub fn click(mut self, element: impl Into<String>) -> Self {
        self.click = Some(element.into());
        self
    }

    pub fn model(mut self, model: ModelTestConfig) -> Self {
        self.model = Some(model);
        self
    }
}

/// Resolve a field by name against an explicit or default model config
pub(crate) fn resolve_field(
    owner: &str,
    name: &str,
    form_selector: &str,
    model: Option<&ModelTestConfig>,
    default_model: Option<&ModelTestConfig>,
) -> E2eResult<Box<dyn FieldTestObject>> {
    let model = model.or(default_model).ok_or_else(|| {
        E2eError::InvalidSpec(format!("{}: no model test config given", owner))
    })?;
    model
        .field(name, form_selector)
        .ok_or_else(|| E2eError::UnknownField {
            page: owner.to_string(),
            field: name.to_string(),
        })
}

pub(crate) fn require_specs<T>(owner: &str, specs: &[T]) -> E2eResult<()> {
    if specs.is_empty() {
        return Err(E2eError::InvalidSpec(format!(
            "{}: invalid field specification",
            owner
        )));
    }
    Ok(())
}

/// An edit form scoped under `selector`
#[derive(Debug, Clone)]
pub struct FieldForm {
    owner: &'static str,
    selector: &'static str,
    default_model: Option<ModelTestConfig>,
}

impl FieldForm {
    pub(crate) fn new(owner: &'static str, selector: &'static str) -> Self {
        Self {
            owner,
            selector,
            default_model: None,
        }
    }

    pub fn selector(&self) -> &'static str {
        self.selector
    }

    pub fn set_default_model_test_config(&mut self, model: ModelTestConfig) {
        self.default_model = Some(model);
    }

    fn resolve(&self, spec: &FieldSpec) -> E2eResult<Box<dyn FieldTestObject>> {
        resolve_field(
            self.owner,
            &spec.name,
            self.selector,
            spec.model.as_ref(),
            self.default_model.as_ref(),
        )
    }

    fn input_of<'a>(&self, spec: &'a FieldSpec) -> E2eResult<&'a FieldInput> {
        spec.input.as_ref().ok_or_else(|| {
            E2eError::InvalidSpec(format!("{}: no input given for field {}", self.owner, spec.name))
        })
    }

    pub async fn assert_field_ui_visible(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        require_specs(self.owner, fields)?;
        for spec in fields {
            self.resolve(spec)?
                .assert_field_ui_visible(browser, &spec.options)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_field_ui_not_visible(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        require_specs(self.owner, fields)?;
        for spec in fields {
            self.resolve(spec)?
                .assert_field_ui_not_visible(browser, &spec.options)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_field_dom_present(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        require_specs(self.owner, fields)?;
        for spec in fields {
            self.resolve(spec)?
                .assert_field_dom_present(browser, &spec.options)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_field_dom_not_present(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        require_specs(self.owner, fields)?;
        for spec in fields {
            self.resolve(spec)?
                .assert_field_dom_not_present(browser, &spec.options)
                .await?;
        }
        Ok(())
    }

    pub async fn click_field_ui(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        require_specs(self.owner, fields)?;
        for spec in fields {
            let element = spec.click.as_deref().ok_or_else(|| {
                E2eError::InvalidSpec(format!("{}: no clickable given for field {}", self.owner, spec.name))
            })?;
            self.resolve(spec)?.click_field_ui(browser, element).await?;
        }
        Ok(())
    }

    pub async fn fill_field_inputs(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        require_specs(self.owner, fields)?;
        for spec in fields {
            let input = self.input_of(spec)?;
            self.resolve(spec)?
                .fill_field_inputs(browser, input, &spec.options)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_field_inputs(&self, browser: &dyn Browser, fields: &[FieldSpec]) -> E2eResult<()> {
        require_specs(self.owner, fields)?;
        for spec in fields {
            let input = self.input_of(spec)?;
            self.resolve(spec)?
                .assert_field_inputs(browser, input, &spec.options)
                .await?;
        }
        Ok(())
    }

    /// Click a form-level element such as the save button
    pub(crate) async fn click(&self, browser: &dyn Browser, css: &str) -> E2eResult<()> {
        browser.click(&format!("{} {}", self.selector, css)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKind;

    #[test]
    fn field_resolution_needs_a_model() {
        let err = resolve_field("adminUIItemScreen", "name", ".EditForm", None, None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("no model test config"));
    }

    #[test]
    fn explicit_model_beats_default() {
        let default = ModelTestConfig::new().with_field("name", FieldKind::Name);
        let explicit = ModelTestConfig::new().with_field("name", FieldKind::Select);
        let field = resolve_field("page", "name", ".form", Some(&explicit), Some(&default)).unwrap();
        assert_eq!(field.kind(), FieldKind::Select);
    }

    #[test]
    fn unknown_field_names_the_page() {
        let model = ModelTestConfig::new().with_field("name", FieldKind::Name);
        let err = resolve_field("adminUIInitialForm", "email", ".form", Some(&model), None)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            E2eError::UnknownField { ref page, ref field } if page == "adminUIInitialForm" && field == "email"
        ));
    }

    #[test]
    fn empty_field_list_is_rejected() {
        assert!(require_specs::<FieldSpec>("page", &[]).is_err());
    }
}
