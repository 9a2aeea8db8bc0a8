use async_trait::async_trait;

use super::{FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::Browser;
use crate::error::{E2eError, E2eResult};

/// Upload widget; only its presence can be asserted
pub struct FileField {
    selectors: FieldSelectors,
}

impl FileField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(
            config,
            format!("[data-field-name={}][data-field-type=file]", name),
        )
        .element("label", format!("label[for=\"{}\"]", name))
        .element("button", "button");
        Self { selectors }
    }

    fn unsupported(&self, command: &str) -> E2eError {
        E2eError::UnsupportedCommand {
            field: self.selectors.field_name.clone(),
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl FieldTestObject for FileField {
    fn kind(&self) -> FieldKind {
        FieldKind::File
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, _options: &FieldOptions) -> Vec<String> {
        vec!["label".into(), "button".into()]
    }

    async fn fill_field_inputs(&self, _browser: &dyn Browser, _input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        Err(self.unsupported("fillFieldInputs"))
    }

    async fn assert_field_inputs(&self, _browser: &dyn Browser, _input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        Err(self.unsupported("assertFieldInputs"))
    }
}
