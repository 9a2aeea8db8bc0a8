use async_trait::async_trait;

use super::{assert_value, invalid_input, replace_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::Browser;
use crate::error::E2eResult;

/// First/last name pair
pub struct NameField {
    selectors: FieldSelectors,
}

impl NameField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(config, format!(".field-type-name[for=\"{}\"]", name))
            .element("label", format!("label[for=\"{}\"]", name))
            .element("firstName", format!("input[name=\"{}.first\"]", name))
            .element("firstNamePlaceholder", "input[placeholder=\"First name\"]")
            .element("lastName", format!("input[name=\"{}.last\"]", name))
            .element("lastNamePlaceholder", "input[placeholder=\"Last name\"]");
        Self { selectors }
    }

    fn parts<'a>(&self, input: &'a FieldInput) -> E2eResult<(&'a str, &'a str)> {
        match input {
            FieldInput::Name { first, last } => Ok((first, last)),
            other => Err(invalid_input(&self.selectors, "name", other)),
        }
    }
}

#[async_trait]
impl FieldTestObject for NameField {
    fn kind(&self) -> FieldKind {
        FieldKind::Name
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, _options: &FieldOptions) -> Vec<String> {
        ["label", "firstName", "firstNamePlaceholder", "lastName", "lastNamePlaceholder"]
            .map(String::from)
            .to_vec()
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let (first, last) = self.parts(input)?;
        replace_value(browser, &self.selectors.elem("firstName")?, first).await?;
        replace_value(browser, &self.selectors.elem("lastName")?, last).await
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let (first, last) = self.parts(input)?;
        assert_value(browser, &self.selectors.elem("firstName")?, first).await?;
        assert_value(browser, &self.selectors.elem("lastName")?, last).await
    }
}
