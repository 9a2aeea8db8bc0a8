use async_trait::async_trait;
use serde_json::Value;

use super::{assert_script_result, assert_value, invalid_input, replace_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::{wait_for_visible, Browser};
use crate::error::{E2eError, E2eResult};

const TOOLBAR: [(&str, &str); 13] = [
    ("bold", "Bold"),
    ("italic", "Italic"),
    ("h1", "Heading 1"),
    ("h2", "Heading 2"),
    ("h3", "Heading 3"),
    ("h4", "Heading 4"),
    ("link", "URL/Link"),
    ("image", "Image"),
    ("ul", "Unordered List"),
    ("ol", "Ordered List"),
    ("quote", "Quote"),
    ("code", "Code"),
    ("previewToggle", "Preview"),
];

const PREVIEW_HTML: &str = "return document.querySelector(arguments[0]).innerHTML;";

/// Markdown editor with its toolbar and rendered preview
pub struct MarkdownField {
    selectors: FieldSelectors,
}

impl MarkdownField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let mut selectors = FieldSelectors::new(config, format!(".field-type-markdown[for=\"{}\"]", name))
            .element("label", format!("label[for=\"{}\"]", name))
            .element("value", format!("textarea[name=\"{}.md\"]", name));
        for (key, title) in TOOLBAR {
            selectors = selectors.element(key, format!("button[title=\"{}\"]", title));
        }
        let selectors = selectors.element("preview", ".md-editor__preview");
        Self { selectors }
    }
}

#[async_trait]
impl FieldTestObject for MarkdownField {
    fn kind(&self) -> FieldKind {
        FieldKind::Markdown
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, _options: &FieldOptions) -> Vec<String> {
        let mut names = vec!["label".to_string(), "value".to_string()];
        names.extend(TOOLBAR.iter().map(|(key, _)| key.to_string()));
        names
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let md = match input {
            FieldInput::Markdown { md: Some(md), .. } | FieldInput::Value(md) => md,
            other => return Err(invalid_input(&self.selectors, "markdown source", other)),
        };
        replace_value(browser, &self.selectors.elem("value")?, md).await
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        match input {
            FieldInput::Markdown { md: Some(md), .. } | FieldInput::Value(md) => {
                let textarea = self.selectors.elem("value")?;
                wait_for_visible(browser, &textarea).await?;
                assert_value(browser, &textarea, md).await
            }
            FieldInput::Markdown { html: Some(html), .. } => {
                let preview = self.selectors.elem("preview")?;
                let actual = browser
                    .execute(PREVIEW_HTML, vec![Value::String(preview.clone())])
                    .await?;
                assert_script_result(&preview, &actual, html)
            }
            FieldInput::Markdown { .. } => Err(E2eError::InvalidInput {
                field: self.selectors.field_name.clone(),
                reason: "markdown input needs md or html".to_string(),
            }),
            other => Err(invalid_input(&self.selectors, "markdown", other)),
        }
    }
}
