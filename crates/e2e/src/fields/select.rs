use async_trait::async_trait;

use super::{plain_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::{expect, keys, Browser};
use crate::error::E2eResult;

/// react-select dropdown
pub struct SelectField {
    selectors: FieldSelectors,
}

impl SelectField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(config, format!(".field-type-select[for=\"{}\"]", name))
            .element("label", format!("label[for=\"{}\"]", name))
            .element("selectField", ".Select")
            .element("selectValue", ".Select-value-label")
            .element("placeholder", ".Select-placeholder")
            .element("dropdownArrow", ".Select-arrow-zone")
            .element("optionOne", ".Select-menu-outer option[value=\"One\"]");
        Self { selectors }
    }
}

#[async_trait]
impl FieldTestObject for SelectField {
    fn kind(&self) -> FieldKind {
        FieldKind::Select
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, options: &FieldOptions) -> Vec<String> {
        let mut names = vec!["label".to_string(), "selectField".to_string()];
        // Only rendered while nothing is selected
        if options.placeholder {
            names.push("placeholder".to_string());
        }
        names.push("dropdownArrow".to_string());
        names
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let value = plain_value(&self.selectors, input)?;
        browser.click(&self.selectors.elem("selectField")?).await?;
        browser
            .send_keys_to_active(&format!("{}{}", value, keys::ENTER))
            .await
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let value = plain_value(&self.selectors, input)?;
        expect(browser)
            .text_equals(&self.selectors.elem("selectValue")?, value)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_only_checked_on_request() {
        let field = SelectField::new(&FieldConfig::new("select", ".EditForm"));
        let without = field.ui_elements(&FieldOptions::default());
        assert!(!without.contains(&"placeholder".to_string()));
        let with = field.ui_elements(&FieldOptions {
            placeholder: true,
            ..Default::default()
        });
        assert_eq!(with, vec!["label", "selectField", "placeholder", "dropdownArrow"]);
    }
}
