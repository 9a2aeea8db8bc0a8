use async_trait::async_trait;
use serde_json::Value;

use super::{assert_script_result, assert_value, plain_value, replace_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::{wait_for_visible, Browser};
use crate::error::E2eResult;

const SET_WYSIWYG: &str = "var body = document.querySelector(arguments[0])\
.querySelector('iframe').contentDocument.querySelector('.mce-content-body');\
 body.innerHTML = arguments[1];";

const GET_WYSIWYG: &str = "var body = document.querySelector(arguments[0])\
.querySelector('iframe').contentDocument.querySelector('.mce-content-body');\
 return body.innerHTML;";

/// Html field: a plain textarea, or a TinyMCE iframe when `wysiwyg` is on
pub struct HtmlField {
    selectors: FieldSelectors,
}

impl HtmlField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(config, format!(".field-type-html[for=\"{}\"]", name))
            .element("label", ".FormLabel")
            .element("value", format!("textarea[name=\"{}\"]", name))
            .element("wysiwyg", "iframe");
        Self { selectors }
    }
}

#[async_trait]
impl FieldTestObject for HtmlField {
    fn kind(&self) -> FieldKind {
        FieldKind::Html
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, options: &FieldOptions) -> Vec<String> {
        let editor = if options.wysiwyg { "wysiwyg" } else { "value" };
        vec!["label".into(), editor.into()]
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, options: &FieldOptions) -> E2eResult<()> {
        let html = plain_value(&self.selectors, input)?;
        if options.wysiwyg {
            let iframe = self.selectors.elem("wysiwyg")?;
            wait_for_visible(browser, &iframe).await?;
            browser.click(&iframe).await?;
            browser
                .execute(
                    SET_WYSIWYG,
                    vec![
                        Value::String(self.selectors.field_selector()),
                        Value::String(html.to_string()),
                    ],
                )
                .await?;
            Ok(())
        } else {
            replace_value(browser, &self.selectors.elem("value")?, html).await
        }
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, options: &FieldOptions) -> E2eResult<()> {
        let html = plain_value(&self.selectors, input)?;
        if options.wysiwyg {
            wait_for_visible(browser, &self.selectors.elem("wysiwyg")?).await?;
            let selector = self.selectors.field_selector();
            let actual = browser
                .execute(GET_WYSIWYG, vec![Value::String(selector.clone())])
                .await?;
            assert_script_result(&selector, &actual, html)
        } else {
            let textarea = self.selectors.elem("value")?;
            wait_for_visible(browser, &textarea).await?;
            assert_value(browser, &textarea, html).await
        }
    }
}
