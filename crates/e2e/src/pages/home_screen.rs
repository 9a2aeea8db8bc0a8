use async_trait::async_trait;

use super::{AdminUiApp, PageObject};
use crate::browser::{expect, Browser};
use crate::error::{E2eError, E2eResult};
use crate::utils::{key_to_label, key_to_path};

const ELEMENTS: &[(&str, &str)] = &[("dashboardHeader", ".dashboard-heading")];

/// Clickable parts of a dashboard tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabClickable {
    Label,
    ItemCount,
    PlusIcon,
}

impl TabClickable {
    fn element(&self) -> &'static str {
        match self {
            TabClickable::Label => ".dashboard-group__list-label",
            TabClickable::ItemCount => ".dashboard-group__list-count",
            TabClickable::PlusIcon => "a.dashboard-group__list-create.octicon.octicon-plus",
        }
    }
}

/// Dashboard tab linking to one list
#[derive(Debug, Clone)]
pub struct HomeScreenTab {
    pub list_name: String,
    pub items: String,
    list_label: String,
    selector: String,
}

impl HomeScreenTab {
    pub fn new(list_name: &str, items: &str) -> E2eResult<Self> {
        if list_name.is_empty() {
            return Err(E2eError::InvalidSpec(
                "HomeScreenGroup: no tab list name specified".to_string(),
            ));
        }
        if items.is_empty() {
            return Err(E2eError::InvalidSpec(format!(
                "HomeScreenGroup: no tab items specified for {}",
                list_name
            )));
        }
        let list_path = key_to_path(list_name, true);
        Ok(Self {
            list_name: list_name.to_string(),
            items: items.to_string(),
            list_label: key_to_label(&list_path),
            selector: format!(".dashboard-group__list[data-list-path=\"{}\"]", list_path),
        })
    }

    fn elem(&self, clickable: TabClickable) -> String {
        format!("{} {}", self.selector, clickable.element())
    }

    fn ui(&self) -> [String; 3] {
        [
            self.elem(TabClickable::Label),
            self.elem(TabClickable::PlusIcon),
            self.elem(TabClickable::ItemCount),
        ]
    }

    pub async fn assert_tab_ui_visible(&self, browser: &dyn Browser) -> E2eResult<()> {
        for css in self.ui() {
            expect(browser).visible(&css).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_ui_not_visible(&self, browser: &dyn Browser) -> E2eResult<()> {
        for css in self.ui() {
            expect(browser).not_visible(&css).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_dom_present(&self, browser: &dyn Browser) -> E2eResult<()> {
        for css in self.ui() {
            expect(browser).present(&css).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_dom_not_present(&self, browser: &dyn Browser) -> E2eResult<()> {
        for css in self.ui() {
            expect(browser).not_present(&css).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_text_equals(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser)
            .text_equals(&self.elem(TabClickable::Label), &self.list_label)
            .await?;
        expect(browser)
            .text_equals(&self.elem(TabClickable::ItemCount), &self.items)
            .await
    }

    pub async fn assert_tab_text_contains(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser)
            .text_contains(&self.elem(TabClickable::Label), &self.list_label)
            .await?;
        expect(browser)
            .text_contains(&self.elem(TabClickable::ItemCount), &self.items)
            .await
    }

    /// Click the tab, then wait for the list screen (label, count) or the create form (plus)
    pub async fn click_tab_ui(&self, browser: &dyn Browser, app: &AdminUiApp, clickable: TabClickable) -> E2eResult<()> {
        browser.click(&self.elem(clickable)).await?;
        match clickable {
            TabClickable::Label | TabClickable::ItemCount => app.wait_for_list_screen(browser).await,
            TabClickable::PlusIcon => app.wait_for_initial_form_screen(browser).await,
        }
    }
}

/// Dashboard group: a heading plus its tabs
#[derive(Debug, Clone)]
pub struct HomeScreenGroup {
    pub name: String,
    tabs: Vec<HomeScreenTab>,
    selector: String,
}

impl HomeScreenGroup {
    /// `tabs` pairs a list name with its expected item count text
    pub fn new(name: &str, tabs: &[(&str, &str)]) -> E2eResult<Self> {
        let tabs = tabs
            .iter()
            .map(|(list, items)| HomeScreenTab::new(list, items))
            .collect::<E2eResult<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            tabs,
            selector: format!(".dashboard-group[data-section-label=\"{}\"]", name),
        })
    }

    pub fn tabs(&self) -> &[HomeScreenTab] {
        &self.tabs
    }

    pub fn tab(&self, list_name: &str) -> Option<&HomeScreenTab> {
        self.tabs.iter().find(|t| t.list_name == list_name)
    }

    fn heading(&self) -> String {
        format!("{} .dashboard-group__heading", self.selector)
    }

    pub async fn assert_tab_ui_visible(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser).visible(&self.heading()).await?;
        for tab in &self.tabs {
            tab.assert_tab_ui_visible(browser).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_ui_not_visible(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser).not_visible(&self.heading()).await?;
        for tab in &self.tabs {
            tab.assert_tab_ui_not_visible(browser).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_dom_present(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser).present(&self.heading()).await?;
        for tab in &self.tabs {
            tab.assert_tab_dom_present(browser).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_dom_not_present(&self, browser: &dyn Browser) -> E2eResult<()> {
        expect(browser).not_present(&self.heading()).await?;
        for tab in &self.tabs {
            tab.assert_tab_dom_not_present(browser).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_text_equals(&self, browser: &dyn Browser) -> E2eResult<()> {
        for tab in &self.tabs {
            tab.assert_tab_text_equals(browser).await?;
        }
        Ok(())
    }

    pub async fn assert_tab_text_contains(&self, browser: &dyn Browser) -> E2eResult<()> {
        for tab in &self.tabs {
            tab.assert_tab_text_contains(browser).await?;
        }
        Ok(())
    }

    pub async fn click_tab_ui(
        &self,
        browser: &dyn Browser,
        app: &AdminUiApp,
        list_name: &str,
        clickable: TabClickable,
    ) -> E2eResult<()> {
        let tab = self.tab(list_name).ok_or_else(|| {
            E2eError::InvalidSpec(format!(
                "HomeScreenGroup: no tab list name found matching: {}",
                list_name
            ))
        })?;
        tab.click_tab_ui(browser, app, clickable).await
    }
}

/// Dashboard shown after signin
#[derive(Debug, Clone)]
pub struct AdminUiHomeScreen {
    groups: Vec<HomeScreenGroup>,
}

impl AdminUiHomeScreen {
    pub fn new(groups: Vec<HomeScreenGroup>) -> Self {
        Self { groups }
    }

    /// Groups of the bundled e2e test application
    pub fn with_default_groups() -> E2eResult<Self> {
        Ok(Self::new(vec![
            HomeScreenGroup::new("Access", &[("users", "2 Items")])?,
            HomeScreenGroup::new(
                "Fields",
                &[
                    ("booleans", "0 Items"),
                    ("codes", "0 Items"),
                    ("emails", "0 Items"),
                    ("names", "0 Items"),
                    ("numbers", "0 Items"),
                    ("selects", "0 Items"),
                ],
            )?,
            HomeScreenGroup::new("Other", &[("other-lists", "0 Items")])?,
        ]))
    }

    pub fn groups(&self) -> &[HomeScreenGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> E2eResult<&HomeScreenGroup> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| E2eError::InvalidSpec(format!("adminUIHomeScreen: unknown group {}", name)))
    }

    /// Click a tab by list name, whichever group it sits in
    pub async fn click_tab_ui(
        &self,
        browser: &dyn Browser,
        app: &AdminUiApp,
        list_name: &str,
        clickable: TabClickable,
    ) -> E2eResult<()> {
        let tab = self
            .groups
            .iter()
            .find_map(|g| g.tab(list_name))
            .ok_or_else(|| {
                E2eError::InvalidSpec(format!(
                    "HomeScreenGroup: no tab list name found matching: {}",
                    list_name
                ))
            })?;
        tab.click_tab_ui(browser, app, clickable).await
    }
}

#[async_trait]
impl PageObject for AdminUiHomeScreen {
    fn name(&self) -> &'static str {
        "adminUIHomeScreen"
    }

    fn elements(&self) -> &'static [(&'static str, &'static str)] {
        ELEMENTS
    }
}
