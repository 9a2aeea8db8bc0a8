use async_trait::async_trait;

use super::{plain_value, assert_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::{expect, Browser};
use crate::error::{E2eError, E2eResult};

/// Checkbox rendered as a toggle button; the list screen shows an octicon
pub struct BooleanField {
    selectors: FieldSelectors,
}

impl BooleanField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(
            config,
            format!("[data-field-name={}][data-field-type=boolean]", name),
        )
        .element("button", "button")
        .element("label", "span")
        .element("value", format!("label input[name=\"{}\"]", name))
        .list_screen_elements(&[
            ("ui", "span.octicon"),
            ("checked", "span.octicon-check"),
            ("notChecked", "span.octicon-x"),
            ("link", "a"),
        ]);
        Self { selectors }
    }

    fn list_value_elem(&self, value: &str) -> E2eResult<String> {
        match value {
            "true" => self.selectors.list_elem("checked"),
            "false" => self.selectors.list_elem("notChecked"),
            other => Err(E2eError::InvalidInput {
                field: self.selectors.field_name.clone(),
                reason: format!("list value must be \"true\" or \"false\", got {:?}", other),
            }),
        }
    }
}

#[async_trait]
impl FieldTestObject for BooleanField {
    fn kind(&self) -> FieldKind {
        FieldKind::Boolean
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, _options: &FieldOptions) -> Vec<String> {
        vec!["label".into(), "button".into()]
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let wanted = plain_value(&self.selectors, input)?;
        let current = browser.value(&self.selectors.elem("value")?).await?;
        if current.as_deref() != Some(wanted) {
            browser.click(&self.selectors.elem("button")?).await?;
        }
        Ok(())
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let wanted = plain_value(&self.selectors, input)?;
        assert_value(browser, &self.selectors.elem("value")?, wanted).await
    }

    async fn assert_list_screen_field_value_equals(&self, browser: &dyn Browser, value: &str) -> E2eResult<()> {
        expect(browser).visible(&self.list_value_elem(value)?).await
    }

    async fn assert_list_screen_field_value_contains(&self, browser: &dyn Browser, value: &str) -> E2eResult<()> {
        expect(browser).visible(&self.list_value_elem(value)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_uses_data_attributes() {
        let field = BooleanField::new(&FieldConfig::new("isAdmin", ".EditForm"));
        assert_eq!(
            field.selectors().elem("value").unwrap(),
            ".EditForm [data-field-name=isAdmin][data-field-type=boolean] label input[name=\"isAdmin\"]"
        );
    }

    #[test]
    fn list_value_must_be_boolean_text() {
        let field = BooleanField::new(&FieldConfig::new("isAdmin", "td"));
        assert_eq!(field.list_value_elem("true").unwrap(), "td span.octicon-check");
        assert_eq!(field.list_value_elem("false").unwrap(), "td span.octicon-x");
        assert!(matches!(
            field.list_value_elem("yes").unwrap_err(),
            E2eError::InvalidInput { .. }
        ));
    }
}
