//! Field test objects
//!
//! Each admin UI field widget gets one type implementing [`FieldTestObject`].
//! A widget is described by its [`FieldSelectors`]: the field selector, scoped
//! under the form that contains it, plus named sub-elements for the edit form
//! and for list-screen cells. Most assertions are derived from that table; the
//! widget types only supply what differs (which elements make up the UI, how
//! input is typed in and read back).

mod array;
mod boolean;
mod code;
mod datetime;
mod file;
mod geo_point;
mod html;
mod markdown;
mod name;
mod relationship;
mod select;

pub use array::ArrayField;
pub use boolean::BooleanField;
pub use code::CodeField;
pub use datetime::DatetimeField;
pub use file::FileField;
pub use geo_point::GeoPointField;
pub use html::HtmlField;
pub use markdown::MarkdownField;
pub use name::NameField;
pub use relationship::RelationshipField;
pub use select::SelectField;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::browser::{expect, Browser};
use crate::error::{E2eError, E2eResult};
use crate::utils::titlecase;

/// Where a field lives: its name and the form (or list cell) containing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    pub field_name: String,
    pub form_selector: String,
}

impl FieldConfig {
    pub fn new(field_name: impl Into<String>, form_selector: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            form_selector: form_selector.into(),
        }
    }
}

/// Selector table of one widget instance
#[derive(Debug, Clone)]
pub struct FieldSelectors {
    pub field_name: String,
    pub form_selector: String,
    pub selector: String,
    elements: Vec<(String, String)>,
    list_screen_elements: Vec<(String, String)>,
}

impl FieldSelectors {
    /// New table with the list-screen elements most widgets share
    pub fn new(config: &FieldConfig, selector: impl Into<String>) -> Self {
        Self {
            field_name: config.field_name.clone(),
            form_selector: config.form_selector.clone(),
            selector: selector.into(),
            elements: Vec::new(),
            list_screen_elements: vec![
                ("ui".to_string(), "a.ItemList__value".to_string()),
                ("value".to_string(), "a.ItemList__value".to_string()),
                ("link".to_string(), "a".to_string()),
            ],
        }
    }

    pub fn element(mut self, name: &str, css: impl Into<String>) -> Self {
        self.elements.push((name.to_string(), css.into()));
        self
    }

    /// Replace the list-screen elements wholesale
    pub fn list_screen_elements(mut self, elements: &[(&str, &str)]) -> Self {
        self.list_screen_elements = elements
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.elements.iter().any(|(k, _)| k == name)
    }

    /// Full selector of an edit-form element: form, field, element
    pub fn elem(&self, name: &str) -> E2eResult<String> {
        let css = lookup(&self.elements, name).ok_or_else(|| E2eError::UnknownElement {
            owner: self.field_name.clone(),
            element: name.to_string(),
        })?;
        Ok(format!("{} {} {}", self.form_selector, self.selector, css))
    }

    /// Full selector of a list-screen element: cell, element
    pub fn list_elem(&self, name: &str) -> E2eResult<String> {
        let css = lookup(&self.list_screen_elements, name).ok_or_else(|| {
            E2eError::UnknownElement {
                owner: self.field_name.clone(),
                element: name.to_string(),
            }
        })?;
        Ok(format!("{} {}", self.form_selector, css))
    }

    /// Label text the admin UI renders for this field
    pub fn label_text(&self) -> String {
        titlecase(&self.field_name)
    }

    /// Selector of the field container alone, for scripts run in the page
    pub fn field_selector(&self) -> String {
        format!("{} {}", self.form_selector, self.selector)
    }
}

fn lookup<'a>(table: &'a [(String, String)], name: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Widget-specific switches for UI assertions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    /// Select widgets: the placeholder is only shown while empty
    pub placeholder: bool,

    /// Html widgets: assert and fill the rich-text editor instead of the textarea
    pub wysiwyg: bool,

    /// Array widgets: which entries (`text1`, `date2`, ...) should be on screen
    pub inputs: Vec<String>,
}

/// Value typed into (or expected from) a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Value(String),
    Name { first: String, last: String },
    GeoPoint { lat: String, lng: String },
    Datetime { date: String, time: String },
    /// Entry name to value, e.g. `text1 -> "a"`
    Indexed(Vec<(String, String)>),
    /// Pick an option element (`option1`), or type a value and press enter
    Relationship {
        option: Option<String>,
        value: Option<String>,
    },
    Markdown {
        md: Option<String>,
        html: Option<String>,
    },
}

impl FieldInput {
    pub fn value(value: impl Into<String>) -> Self {
        FieldInput::Value(value.into())
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldInput::Value(_) => "value",
            FieldInput::Name { .. } => "name",
            FieldInput::GeoPoint { .. } => "geopoint",
            FieldInput::Datetime { .. } => "datetime",
            FieldInput::Indexed(_) => "indexed",
            FieldInput::Relationship { .. } => "relationship",
            FieldInput::Markdown { .. } => "markdown",
        }
    }
}

pub(crate) fn invalid_input(selectors: &FieldSelectors, expected: &str, got: &FieldInput) -> E2eError {
    E2eError::InvalidInput {
        field: selectors.field_name.clone(),
        reason: format!("expected {} input, got {}", expected, got.describe()),
    }
}

pub(crate) fn plain_value<'a>(selectors: &FieldSelectors, input: &'a FieldInput) -> E2eResult<&'a str> {
    match input {
        FieldInput::Value(v) => Ok(v),
        other => Err(invalid_input(selectors, "value", other)),
    }
}

/// Clear an input and type a new value into it
pub(crate) async fn replace_value(browser: &dyn Browser, selector: &str, value: &str) -> E2eResult<()> {
    browser.clear_value(selector).await?;
    browser.set_value(selector, value).await
}

/// Read back an input's value and compare
pub(crate) async fn assert_value(browser: &dyn Browser, selector: &str, expected: &str) -> E2eResult<()> {
    let actual = browser.value(selector).await?;
    if actual.as_deref() == Some(expected) {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "expected value of <{}> to equal {:?}, got {:?}",
            selector, expected, actual
        )))
    }
}

pub(crate) fn assert_script_result(selector: &str, actual: &serde_json::Value, expected: &str) -> E2eResult<()> {
    if actual.as_str() == Some(expected) {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "expected content of <{}> to equal {:?}, got {}",
            selector, expected, actual
        )))
    }
}

/// Capabilities shared by every field widget
#[async_trait]
pub trait FieldTestObject: Send + Sync {
    fn kind(&self) -> FieldKind;

    fn selectors(&self) -> &FieldSelectors;

    /// Elements making up the widget UI, in assertion order
    fn ui_elements(&self, options: &FieldOptions) -> Vec<String>;

    /// Fixed text shown by visible UI elements
    fn ui_texts(&self) -> Vec<(&'static str, String)> {
        vec![("label", self.selectors().label_text())]
    }

    async fn assert_field_ui_visible(&self, browser: &dyn Browser, options: &FieldOptions) -> E2eResult<()> {
        let texts = self.ui_texts();
        for name in self.ui_elements(options) {
            let selector = self.selectors().elem(&name)?;
            expect(browser).visible(&selector).await?;
            if let Some((_, text)) = texts.iter().find(|(k, _)| *k == name) {
                expect(browser).text_equals(&selector, text).await?;
            }
        }
        Ok(())
    }

    async fn assert_field_ui_not_visible(&self, browser: &dyn Browser, options: &FieldOptions) -> E2eResult<()> {
        let texts = self.ui_texts();
        for name in self.ui_elements(options) {
            let selector = self.selectors().elem(&name)?;
            expect(browser).not_visible(&selector).await?;
            if let Some((_, text)) = texts.iter().find(|(k, _)| *k == name) {
                expect(browser).text_not_equals(&selector, text).await?;
            }
        }
        Ok(())
    }

    async fn assert_field_dom_present(&self, browser: &dyn Browser, options: &FieldOptions) -> E2eResult<()> {
        for name in self.ui_elements(options) {
            expect(browser).present(&self.selectors().elem(&name)?).await?;
        }
        Ok(())
    }

    async fn assert_field_dom_not_present(&self, browser: &dyn Browser, options: &FieldOptions) -> E2eResult<()> {
        for name in self.ui_elements(options) {
            expect(browser).not_present(&self.selectors().elem(&name)?).await?;
        }
        Ok(())
    }

    async fn fill_field_inputs(
        &self,
        browser: &dyn Browser,
        input: &FieldInput,
        options: &FieldOptions,
    ) -> E2eResult<()>;

    async fn assert_field_inputs(
        &self,
        browser: &dyn Browser,
        input: &FieldInput,
        options: &FieldOptions,
    ) -> E2eResult<()>;

    /// Click a named element of the widget (add button, toolbar button, ...)
    async fn click_field_ui(&self, browser: &dyn Browser, element: &str) -> E2eResult<()> {
        browser.click(&self.selectors().elem(element)?).await
    }

    async fn assert_list_screen_field_ui_visible(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser).visible(&self.selectors().list_elem("ui")?).await
    }

    async fn assert_list_screen_field_ui_not_visible(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser).not_visible(&self.selectors().list_elem("ui")?).await
    }

    async fn assert_list_screen_field_ui_present(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser).present(&self.selectors().list_elem("ui")?).await
    }

    async fn assert_list_screen_field_ui_not_present(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser).not_present(&self.selectors().list_elem("ui")?).await
    }

    async fn assert_list_screen_field_value_equals(&self, browser: &dyn Browser, value: &str) -> E2eResult<()> {
        expect(browser)
            .text_equals(&self.selectors().list_elem("value")?, value)
            .await
    }

    async fn assert_list_screen_field_value_contains(&self, browser: &dyn Browser, value: &str) -> E2eResult<()> {
        expect(browser)
            .text_contains(&self.selectors().list_elem("value")?, value)
            .await
    }

    async fn click_list_screen_field_value(&self, browser: &dyn Browser) -> E2eResult<()> {
        browser.click(&self.selectors().list_elem("link")?).await
    }
}

/// Every widget type the admin UI renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Boolean,
    Code,
    DateArray,
    Datetime,
    File,
    GeoPoint,
    Html,
    Markdown,
    Name,
    Relationship,
    Select,
    TextArray,
}

impl FieldKind {
    pub const ALL: [FieldKind; 12] = [
        FieldKind::Boolean,
        FieldKind::Code,
        FieldKind::DateArray,
        FieldKind::Datetime,
        FieldKind::File,
        FieldKind::GeoPoint,
        FieldKind::Html,
        FieldKind::Markdown,
        FieldKind::Name,
        FieldKind::Relationship,
        FieldKind::Select,
        FieldKind::TextArray,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Code => "code",
            FieldKind::DateArray => "datearray",
            FieldKind::Datetime => "datetime",
            FieldKind::File => "file",
            FieldKind::GeoPoint => "geopoint",
            FieldKind::Html => "html",
            FieldKind::Markdown => "markdown",
            FieldKind::Name => "name",
            FieldKind::Relationship => "relationship",
            FieldKind::Select => "select",
            FieldKind::TextArray => "textarray",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn build(self, config: &FieldConfig) -> Box<dyn FieldTestObject> {
        match self {
            FieldKind::Boolean => Box::new(BooleanField::new(config)),
            FieldKind::Code => Box::new(CodeField::new(config)),
            FieldKind::DateArray => Box::new(ArrayField::date(config)),
            FieldKind::Datetime => Box::new(DatetimeField::new(config)),
            FieldKind::File => Box::new(FileField::new(config)),
            FieldKind::GeoPoint => Box::new(GeoPointField::new(config)),
            FieldKind::Html => Box::new(HtmlField::new(config)),
            FieldKind::Markdown => Box::new(MarkdownField::new(config)),
            FieldKind::Name => Box::new(NameField::new(config)),
            FieldKind::Relationship => Box::new(RelationshipField::new(config)),
            FieldKind::Select => Box::new(SelectField::new(config)),
            FieldKind::TextArray => Box::new(ArrayField::text(config)),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Field names of a Keystone list mapped to their widget kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTestConfig {
    #[serde(flatten)]
    fields: BTreeMap<String, FieldKind>,
}

impl ModelTestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    /// Instantiate the named field's test object inside `form_selector`
    pub fn field(&self, name: &str, form_selector: &str) -> Option<Box<dyn FieldTestObject>> {
        self.kind_of(name)
            .map(|kind| kind.build(&FieldConfig::new(name, form_selector)))
    }
}
