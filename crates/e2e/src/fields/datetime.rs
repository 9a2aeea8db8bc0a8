use async_trait::async_trait;

use super::{assert_value, invalid_input, replace_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::Browser;
use crate::error::E2eResult;

pub struct DatetimeField {
    selectors: FieldSelectors,
}

impl DatetimeField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(config, format!(".field-type-datetime[for=\"{}\"]", name))
            .element("label", format!("label[for=\"{}\"]", name))
            .element("nowButton", "button")
            .element("date", format!("input[name=\"{}_date\"]", name))
            .element("datePlaceholder", "input[placeholder=\"YYYY-MM-DD\"]")
            .element("time", format!("input[name=\"{}_time\"]", name))
            .element("timePlaceholder", "input[placeholder=\"HH:MM:SS am/pm\"]");
        Self { selectors }
    }

    fn parts<'a>(&self, input: &'a FieldInput) -> E2eResult<(&'a str, &'a str)> {
        match input {
            FieldInput::Datetime { date, time } => Ok((date, time)),
            other => Err(invalid_input(&self.selectors, "datetime", other)),
        }
    }
}

#[async_trait]
impl FieldTestObject for DatetimeField {
    fn kind(&self) -> FieldKind {
        FieldKind::Datetime
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, _options: &FieldOptions) -> Vec<String> {
        ["label", "nowButton", "date", "datePlaceholder", "time", "timePlaceholder"]
            .map(String::from)
            .to_vec()
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let (date, time) = self.parts(input)?;
        replace_value(browser, &self.selectors.elem("date")?, date).await?;
        replace_value(browser, &self.selectors.elem("time")?, time).await
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let (date, time) = self.parts(input)?;
        assert_value(browser, &self.selectors.elem("date")?, date).await?;
        assert_value(browser, &self.selectors.elem("time")?, time).await
    }
}
