use async_trait::async_trait;

use super::{invalid_input, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::{expect, keys, wait_for_visible, Browser};
use crate::error::{E2eError, E2eResult};

/// Relationship picker, a react-select backed by an async option list
pub struct RelationshipField {
    selectors: FieldSelectors,
}

impl RelationshipField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(config, format!(".field-type-relationship[for=\"{}\"]", name))
            .element("label", format!("label[for=\"{}\"]", name))
            .element("placeholder", ".Select-placeholder")
            .element("value", ".Select-input input")
            .element("filledValue", ".Select-value-label")
            .element("arrow", ".Select-arrow-zone")
            .element("clear", ".Select-clear-zone")
            .element("option1", ".Select-option:nth-of-type(1)")
            .element("option2", ".Select-option:nth-of-type(2)");
        Self { selectors }
    }
}

#[async_trait]
impl FieldTestObject for RelationshipField {
    fn kind(&self) -> FieldKind {
        FieldKind::Relationship
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, _options: &FieldOptions) -> Vec<String> {
        vec!["label".into(), "placeholder".into()]
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        match input {
            FieldInput::Relationship {
                option: Some(option),
                ..
            } => {
                browser.click(&self.selectors.elem("arrow")?).await?;
                wait_for_visible(browser, &self.selectors.elem("option1")?).await?;
                browser.click(&self.selectors.elem(option)?).await
            }
            FieldInput::Relationship {
                value: Some(value), ..
            }
            | FieldInput::Value(value) => {
                browser.clear_value(&self.selectors.elem("value")?).await?;
                browser
                    .send_keys_to_active(&format!("{}{}", value, keys::ENTER))
                    .await
            }
            FieldInput::Relationship { .. } => Err(E2eError::InvalidInput {
                field: self.selectors.field_name.clone(),
                reason: "relationship input needs an option or a value".to_string(),
            }),
            other => Err(invalid_input(&self.selectors, "relationship", other)),
        }
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let value = match input {
            FieldInput::Relationship { value: Some(value), .. } | FieldInput::Value(value) => value,
            other => return Err(invalid_input(&self.selectors, "relationship value", other)),
        };
        let filled = self.selectors.elem("filledValue")?;
        wait_for_visible(browser, &filled).await?;
        expect(browser).text_equals(&filled, value).await
    }
}
