use async_trait::async_trait;

use super::{assert_value, invalid_input, replace_value, FieldConfig, FieldInput, FieldKind, FieldOptions, FieldSelectors, FieldTestObject};
use crate::browser::{wait_for_visible, Browser};
use crate::error::E2eResult;

/// Latitude/longitude pair. Keystone stores `[lng, lat]`, hence the indices.
pub struct GeoPointField {
    selectors: FieldSelectors,
}

impl GeoPointField {
    pub fn new(config: &FieldConfig) -> Self {
        let name = &config.field_name;
        let selectors = FieldSelectors::new(config, format!(".field-type-geopoint[for=\"{}\"]", name))
            .element("label", format!("label[for=\"{}\"]", name))
            .element("valueLat", format!("input[name=\"{}[1]\"][placeholder=\"Latitude\"]", name))
            .element("valueLng", format!("input[name=\"{}[0]\"][placeholder=\"Longitude\"]", name));
        Self { selectors }
    }

    fn parts<'a>(&self, input: &'a FieldInput) -> E2eResult<(&'a str, &'a str)> {
        match input {
            FieldInput::GeoPoint { lat, lng } => Ok((lat, lng)),
            other => Err(invalid_input(&self.selectors, "geopoint", other)),
        }
    }
}

#[async_trait]
impl FieldTestObject for GeoPointField {
    fn kind(&self) -> FieldKind {
        FieldKind::GeoPoint
    }

    fn selectors(&self) -> &FieldSelectors {
        &self.selectors
    }

    fn ui_elements(&self, _options: &FieldOptions) -> Vec<String> {
        vec!["label".into(), "valueLat".into(), "valueLng".into()]
    }

    async fn fill_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let (lat, lng) = self.parts(input)?;
        replace_value(browser, &self.selectors.elem("valueLat")?, lat).await?;
        replace_value(browser, &self.selectors.elem("valueLng")?, lng).await
    }

    async fn assert_field_inputs(&self, browser: &dyn Browser, input: &FieldInput, _options: &FieldOptions) -> E2eResult<()> {
        let (lat, lng) = self.parts(input)?;
        let lat_elem = self.selectors.elem("valueLat")?;
        wait_for_visible(browser, &lat_elem).await?;
        assert_value(browser, &lat_elem, lat).await?;
        let lng_elem = self.selectors.elem("valueLng")?;
        wait_for_visible(browser, &lng_elem).await?;
        assert_value(browser, &lng_elem, lng).await
    }
}
