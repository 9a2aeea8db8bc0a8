use async_trait::async_trait;

use super::{assert_value, invalid_input, replace_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::Browser;
use crate::error::E2eResult;

/// Repeating list of inputs (text or date) with add and delete buttons.
/// Entries are named `<prefix><n>`, their delete buttons `<prefix><n>Delete`.
pub struct ArrayField {
    kind: FieldKind,
    selectors: FieldSelectors,
}

impl ArrayField {
    pub fn text(config: &FieldConfig) -> Self {
        Self::build(config, FieldKind::TextArray, "textarray", "text")
    }

    pub fn date(config: &FieldConfig) -> Self {
        Self::build(config, FieldKind::DateArray, "datearray", "date")
    }

    fn build(config: &FieldConfig, kind: FieldKind, css_type: &str, prefix: &str) -> Self {
        let name = &config.field_name;
        let mut selectors = FieldSelectors::new(config, format!(".field-type-{}[for=\"{}\"]", css_type, name))
            .element("label", format!("label[for=\"{}\"]", name))
            .element("addButton", ".Button--default");
        for n in 1..=2 {
            selectors = selectors
                .element(
                    &format!("{}{}", prefix, n),
                    format!(".FormField:nth-of-type({}) input[type=\"text\"]", n),
                )
                .element(
                    &format!("{}{}Delete", prefix, n),
                    format!(".FormField:nth-of-type({}) .Button--link-cancel", n),
                );
        }
        Self { kind, selectors }
    }

    fn entries<'a>(&self, input: &'a FieldInput) -> E2eResult<&'a [(String, String)]> {
        match input {
            FieldInput::Indexed(entries) => Ok(entries),
            other => Err(invalid_input(&self.selectors, "indexed", other)),
        }
    }
}

#[async_trait]
impl FieldTestObject for ArrayField {
    fn kind(&self) -> FieldKind {
        self.kind
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, options: &FieldOptions) -> Vec<String> {
        let mut names = vec!["label".to_string(), "addButton".to_string()];
        for input in &options.inputs {
            names.push(input.clone());
            names.push(format!("{}Delete", input));
        }
        names
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        for (entry, value) in self.entries(input)? {
            replace_value(browser, &self.selectors.elem(entry)?, value).await?;
        }
        Ok(())
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        for (entry, value) in self.entries(input)? {
            assert_value(browser, &self.selectors.elem(entry)?, value).await?;
        }
        Ok(())
    }
}
