use async_trait::async_trait;
use serde_json::Value;

use super::{assert_script_result, plain_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::Browser;
use crate::error::E2eResult;

const SET_CODE: &str = "var field = document.querySelector(arguments[0]);\
 field.getElementsByClassName('CodeMirror')[0].CodeMirror.setValue(arguments[1]);";

const GET_CODE: &str = "var field = document.querySelector(arguments[0]);\
 return field.getElementsByClassName('CodeMirror')[0].CodeMirror.getValue();";

/// CodeMirror editor, driven through its JS API
pub struct CodeField {
    selectors: FieldSelectors,
}

impl CodeField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(config, format!(".field-type-code[for=\"{}\"]", name))
            .element("label", format!("label[for=\"{}\"]", name))
            .element("lineNumber", ".CodeMirror-gutter-wrapper > .CodeMirror-linenumber")
            .element("codeMirror", ".CodeMirror-container");
        Self { selectors }
    }
}

#[async_trait]
impl FieldTestObject for CodeField {
    fn kind(&self) -> FieldKind {
        FieldKind::Code
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, _options: &FieldOptions) -> Vec<String> {
        vec!["label".into(), "lineNumber".into(), "codeMirror".into()]
    }

    fn ui_texts(&self) -> Vec<(&'static str, String)> {
        vec![
            ("label", self.selectors.label_text()),
            ("lineNumber", "1".to_string()),
        ]
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let code = plain_value(&self.selectors, input)?;
        browser
            .execute(
                SET_CODE,
                vec![
                    Value::String(self.selectors.field_selector()),
                    Value::String(code.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let code = plain_value(&self.selectors, input)?;
        let selector = self.selectors.field_selector();
        let actual = browser
            .execute(GET_CODE, vec![Value::String(selector.clone())])
            .await?;
        assert_script_result(&selector, &actual, code)
    }
}
