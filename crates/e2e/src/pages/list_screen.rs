use async_trait::async_trait;

use super::{require_specs, resolve_field, PageObject};
use crate::browser::{expect, Browser};
use crate::error::{E2eError, E2eResult};
use crate::fields::{FieldTestObject, ModelTestConfig};

const OWNER: &str = "adminUIListScreen";

const ELEMENTS: &[(&str, &str)] = &[
    ("noItemsFoundText", ".BlankState__heading"),
    ("itemDeleteIcon", ".Table.ItemList .ItemList__col--control.ItemList__col--delete"),
    ("searchInputField", "[data-search-input-field]"),
    ("searchInputFieldClearIcon", "[data-search-input-field-clear-icon]"),
    ("filterDropdown", "#listHeaderFilterButton"),
    ("columnSelectionDropdown", "#listHeaderColumnButton"),
    ("downloadDropdown", "#listHeaderDownloadButton"),
    ("expandTableIcon", "div.InputGroup_section:nth-child(5) > button:nth-child(1)"),
    ("createItemButton", "button[data-e2e-list-create-button]"),
    ("pageItemCount", ".Pagination__count"),
];

/// One-based cell position in the item table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPosition {
    pub row: usize,
    pub column: usize,
}

impl ItemPosition {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    fn validate(&self, command: &str) -> E2eResult<()> {
        if self.row == 0 || self.column == 0 {
            return Err(E2eError::InvalidSpec(format!(
                "{}:{}: invalid field config row/column",
                OWNER, command
            )));
        }
        Ok(())
    }

    pub fn cell_selector(&self) -> String {
        format!(
            ".ItemList-wrapper tbody tr:nth-of-type({}) td:nth-of-type({})",
            self.row, self.column
        )
    }

    pub fn delete_icon_selector(&self) -> String {
        format!("{} button", self.cell_selector())
    }
}

/// Header column is one-based and skips the delete-control column
pub fn item_list_header_selector(column: usize) -> String {
    format!(".ItemList-wrapper thead th:nth-of-type({})", column + 1)
}

/// A field in a list-screen cell
#[derive(Debug, Clone)]
pub struct ItemFieldSpec {
    pub name: String,
    pub position: ItemPosition,
    pub value: Option<String>,
    pub model: Option<ModelTestConfig>,
}

impl ItemFieldSpec {
    pub fn new(name: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            name: name.into(),
            position: ItemPosition::new(row, column),
            value: None,
            model: None,
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn model(mut self, model: ModelTestConfig) -> Self {
        self.model = Some(model);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminUiListScreen {
    default_model: Option<ModelTestConfig>,
}

impl AdminUiListScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model used by field commands that don't carry their own
    pub fn set_default_model_test_config(&mut self, model: ModelTestConfig) {
        self.default_model = Some(model);
    }

    fn resolve(&self, spec: &ItemFieldSpec, command: &str) -> E2eResult<Box<dyn FieldTestObject>> {
        spec.position.validate(command)?;
        resolve_field(
            OWNER,
            &spec.name,
            &spec.position.cell_selector(),
            spec.model.as_ref(),
            self.default_model.as_ref(),
        )
    }

    fn value_of<'a>(&self, spec: &'a ItemFieldSpec) -> E2eResult<&'a str> {
        spec.value.as_deref().ok_or_else(|| {
            E2eError::InvalidSpec(format!("{}: no value given for field {}", OWNER, spec.name))
        })
    }

    pub async fn click_search_input_clear_icon(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "searchInputFieldClearIcon").await
    }

    pub async fn click_create_item_button(&self, browser: &dyn Browser) -> E2eResult<()> {
        self.click_element(browser, "createItemButton").await
    }

    pub async fn assert_item_list_header_visible(&self, browser: &dyn Browser, column: usize) -> E2eResult<()> {
        expect(browser)
            .visible(&item_list_header_selector(column))
            .await
    }

    pub async fn assert_item_list_header_contains(&self, browser: &dyn Browser, column: usize, value: &str) -> E2eResult<()> {
        expect(browser)
            .text_contains(&item_list_header_selector(column), value)
            .await
    }

    pub async fn assert_item_list_header_equals(&self, browser: &dyn Browser, column: usize, value: &str) -> E2eResult<()> {
        expect(browser)
            .text_equals(&item_list_header_selector(column), value)
            .await
    }

    pub async fn assert_item_field_ui_visible(&self, browser: &dyn Browser, fields: &[ItemFieldSpec]) -> E2eResult<()> {
        require_specs(OWNER, fields)?;
        for spec in fields {
            self.resolve(spec, "assertItemFieldUIVisible")?
                .assert_list_screen_field_ui_visible(browser)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_item_field_ui_not_visible(&self, browser: &dyn Browser, fields: &[ItemFieldSpec]) -> E2eResult<()> {
        require_specs(OWNER, fields)?;
        for spec in fields {
            self.resolve(spec, "assertItemFieldUINotVisible")?
                .assert_list_screen_field_ui_not_visible(browser)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_item_field_ui_present(&self, browser: &dyn Browser, fields: &[ItemFieldSpec]) -> E2eResult<()> {
        require_specs(OWNER, fields)?;
        for spec in fields {
            self.resolve(spec, "assertItemFieldUIPresent")?
                .assert_list_screen_field_ui_present(browser)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_item_field_ui_not_present(&self, browser: &dyn Browser, fields: &[ItemFieldSpec]) -> E2eResult<()> {
        require_specs(OWNER, fields)?;
        for spec in fields {
            self.resolve(spec, "assertItemFieldUINotPresent")?
                .assert_list_screen_field_ui_not_present(browser)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_item_field_value_equals(&self, browser: &dyn Browser, fields: &[ItemFieldSpec]) -> E2eResult<()> {
        require_specs(OWNER, fields)?;
        for spec in fields {
            let value = self.value_of(spec)?;
            self.resolve(spec, "assertItemFieldValueEquals")?
                .assert_list_screen_field_value_equals(browser, value)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_item_field_value_contains(&self, browser: &dyn Browser, fields: &[ItemFieldSpec]) -> E2eResult<()> {
        require_specs(OWNER, fields)?;
        for spec in fields {
            let value = self.value_of(spec)?;
            self.resolve(spec, "assertItemFieldValueContains")?
                .assert_list_screen_field_value_contains(browser, value)
                .await?;
        }
        Ok(())
    }

    pub async fn click_item_field_value(&self, browser: &dyn Browser, fields: &[ItemFieldSpec]) -> E2eResult<()> {
        require_specs(OWNER, fields)?;
        for spec in fields {
            self.resolve(spec, "clickItemFieldValue")?
                .click_list_screen_field_value(browser)
                .await?;
        }
        Ok(())
    }

    pub async fn assert_item_delete_icon_visible(&self, browser: &dyn Browser, icons: &[ItemPosition]) -> E2eResult<()> {
        if icons.is_empty() {
            return Err(E2eError::InvalidSpec(format!("{}: invalid icons specification", OWNER)));
        }
        for icon in icons {
            expect(browser).visible(&icon.delete_icon_selector()).await?;
        }
        Ok(())
    }

    pub async fn click_delete_item_icon(&self, browser: &dyn Browser, icons: &[ItemPosition]) -> E2eResult<()> {
        if icons.is_empty() {
            return Err(E2eError::InvalidSpec(format!("{}: invalid icons specification", OWNER)));
        }
        for icon in icons {
            browser.click(&icon.delete_icon_selector()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PageObject for AdminUiListScreen {
    fn name(&self) -> &'static str {
        OWNER
    }

    fn elements(&self) -> &'static [(&'static str, &'static str)] {
        ELEMENTS
    }
}
