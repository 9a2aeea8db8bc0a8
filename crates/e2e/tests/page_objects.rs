//! Page and field commands against a recording browser

mod support;

use keystone_e2e::fields::{FieldInput, FieldKind, ModelTestConfig};
use keystone_e2e::pages::{
    AdminUiApp, AdminUiHomeScreen, AdminUiInitialForm, AdminUiItemScreen, AdminUiListScreen, AdminUiSignin,
    FieldSpec, ItemFieldSpec, ItemPosition, PageObject, SigninConfig, TabClickable,
};
use keystone_e2e::{E2eError, KeystoneTarget};
use support::RecordingBrowser;

const NAME_FIELD: &str = ".keystone-body .EditForm-container .field-type-name[for=\"name\"]";

fn user_model() -> ModelTestConfig {
    ModelTestConfig::new()
        .with_field("name", FieldKind::Name)
        .with_field("isAdmin", FieldKind::Boolean)
        .with_field("avatar", FieldKind::File)
}

fn item_screen() -> AdminUiItemScreen {
    let mut screen = AdminUiItemScreen::new();
    screen.set_default_model_test_config(user_model());
    screen
}

fn name_input() -> FieldInput {
    FieldInput::Name {
        first: "Jed".to_string(),
        last: "Watson".to_string(),
    }
}

#[tokio::test]
async fn fill_then_assert_name_field_on_item_screen() {
    let browser = RecordingBrowser::new();
    let screen = item_screen();
    let fields = [FieldSpec::new("name").input(name_input())];

    screen.fill_field_inputs(&browser, &fields).await.unwrap();
    screen.assert_field_inputs(&browser, &fields).await.unwrap();

    let first = format!("{} input[name=\"name.first\"]", NAME_FIELD);
    let actions = browser.actions();
    assert_eq!(actions[0], format!("clear {}", first));
    assert_eq!(actions[1], format!("set {} = Jed", first));
}

#[tokio::test]
async fn assert_inputs_fails_on_mismatch() {
    let browser = RecordingBrowser::new();
    let screen = item_screen();
    screen
        .fill_field_inputs(&browser, &[FieldSpec::new("name").input(name_input())])
        .await
        .unwrap();

    let wrong = FieldSpec::new("name").input(FieldInput::Name {
        first: "Jed".to_string(),
        last: "Smith".to_string(),
    });
    let err = screen.assert_field_inputs(&browser, &[wrong]).await.unwrap_err();

    assert!(matches!(err, E2eError::AssertionFailed(_)));
}

#[tokio::test]
async fn field_ui_visible_checks_label_text() {
    let browser = RecordingBrowser::all_visible();
    let screen = item_screen();
    let fields = [FieldSpec::new("name")];

    let err = screen.assert_field_ui_visible(&browser, &fields).await.unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed(_)));

    browser.set_text(&format!("{} label[for=\"name\"]", NAME_FIELD), "Name");
    screen.assert_field_ui_visible(&browser, &fields).await.unwrap();
}

#[tokio::test]
async fn hidden_field_passes_not_visible_assertion() {
    let browser = RecordingBrowser::new();
    let screen = item_screen();

    screen
        .assert_field_ui_not_visible(&browser, &[FieldSpec::new("name")])
        .await
        .unwrap();
    screen
        .assert_field_dom_not_present(&browser, &[FieldSpec::new("name")])
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_field_names_the_screen() {
    let browser = RecordingBrowser::new();
    let err = item_screen()
        .fill_field_inputs(&browser, &[FieldSpec::new("email").input(FieldInput::value("a@b.c"))])
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "adminUIItemScreen: invalid field name 'email'");
}

#[tokio::test]
async fn empty_field_list_is_rejected() {
    let browser = RecordingBrowser::new();
    let err = item_screen().assert_field_inputs(&browser, &[]).await.unwrap_err();
    assert!(matches!(err, E2eError::InvalidSpec(_)));
}

#[tokio::test]
async fn wrong_input_shape_is_invalid_input() {
    let browser = RecordingBrowser::new();
    let err = item_screen()
        .fill_field_inputs(&browser, &[FieldSpec::new("name").input(FieldInput::value("Jed"))])
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::InvalidInput { ref field, .. } if field == "name"));
    assert!(browser.actions().is_empty());
}

#[tokio::test]
async fn file_field_has_no_fill_command() {
    let browser = RecordingBrowser::new();
    let err = item_screen()
        .fill_field_inputs(&browser, &[FieldSpec::new("avatar").input(FieldInput::value("x.png"))])
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::UnsupportedCommand { .. }));
}

#[tokio::test]
async fn initial_form_without_model_is_rejected() {
    let browser = RecordingBrowser::new();
    let err = AdminUiInitialForm::new()
        .fill_field_inputs(&browser, &[FieldSpec::new("name").input(name_input())])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no model test config"));
}

#[tokio::test]
async fn field_model_overrides_screen_default() {
    let browser = RecordingBrowser::new();
    let mut form = AdminUiInitialForm::new();
    form.set_default_model_test_config(ModelTestConfig::new());

    form.fill_field_inputs(
        &browser,
        &[FieldSpec::new("name").input(name_input()).model(user_model())],
    )
    .await
    .unwrap();

    assert!(browser.actions()[0].starts_with("clear .Modal-dialog .create-form .field-type-name"));
}

#[tokio::test]
async fn list_screen_cell_value() {
    let browser = RecordingBrowser::new();
    let mut list = AdminUiListScreen::new();
    list.set_default_model_test_config(user_model());
    browser.set_text(
        ".ItemList-wrapper tbody tr:nth-of-type(1) td:nth-of-type(2) a.ItemList__value",
        "Jed Watson",
    );

    list.assert_item_field_value_equals(&browser, &[ItemFieldSpec::new("name", 1, 2).value("Jed Watson")])
        .await
        .unwrap();
    list.assert_item_field_value_contains(&browser, &[ItemFieldSpec::new("name", 1, 2).value("Watson")])
        .await
        .unwrap();
}

#[tokio::test]
async fn list_screen_rejects_zero_row() {
    let browser = RecordingBrowser::new();
    let mut list = AdminUiListScreen::new();
    list.set_default_model_test_config(user_model());

    let err = list
        .click_item_field_value(&browser, &[ItemFieldSpec::new("name", 0, 2)])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("invalid field config row/column"));
    let err = list.click_delete_item_icon(&browser, &[]).await.unwrap_err();
    assert!(matches!(err, E2eError::InvalidSpec(_)));
    list.click_delete_item_icon(&browser, &[ItemPosition::new(1, 1)])
        .await
        .unwrap();
}

#[tokio::test]
async fn boolean_list_value_must_be_true_or_false() {
    let browser = RecordingBrowser::all_visible();
    let mut list = AdminUiListScreen::new();
    list.set_default_model_test_config(user_model());

    list.assert_item_field_value_equals(&browser, &[ItemFieldSpec::new("isAdmin", 1, 3).value("true")])
        .await
        .unwrap();
    let err = list
        .assert_item_field_value_equals(&browser, &[ItemFieldSpec::new("isAdmin", 1, 3).value("yes")])
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::InvalidInput { .. }));
}

#[tokio::test]
async fn home_tab_click_waits_for_list_screen() {
    let browser = RecordingBrowser::new();
    let app = AdminUiApp::new(&KeystoneTarget::default());
    let home = AdminUiHomeScreen::with_default_groups().unwrap();

    let err = home
        .click_tab_ui(&browser, &app, "users", TabClickable::Label)
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::Timeout(_)));

    browser.show("div[data-screen-id=\"list\"]");
    home.click_tab_ui(&browser, &app, "users", TabClickable::Label)
        .await
        .unwrap();
    assert_eq!(
        browser.actions().last().unwrap(),
        "click .dashboard-group__list[data-list-path=\"users\"] .dashboard-group__list-label"
    );
}

#[tokio::test]
async fn home_tab_plus_icon_waits_for_create_form() {
    let browser = RecordingBrowser::new();
    browser.show(".Modal-dialog");
    let app = AdminUiApp::new(&KeystoneTarget::default());
    let home = AdminUiHomeScreen::with_default_groups().unwrap();

    home.group("Other")
        .unwrap()
        .click_tab_ui(&browser, &app, "other-lists", TabClickable::PlusIcon)
        .await
        .unwrap();

    let err = home
        .click_tab_ui(&browser, &app, "posts", TabClickable::Label)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no tab list name found matching: posts"));
}

#[tokio::test]
async fn home_group_text_assertions() {
    let browser = RecordingBrowser::new();
    let home = AdminUiHomeScreen::with_default_groups().unwrap();
    let tab = ".dashboard-group__list[data-list-path=\"users\"]";
    browser.set_text(&format!("{} .dashboard-group__list-label", tab), "Users");
    browser.set_text(&format!("{} .dashboard-group__list-count", tab), "2 Items");

    home.group("Access")
        .unwrap()
        .assert_tab_text_equals(&browser)
        .await
        .unwrap();
    assert!(home
        .group("Fields")
        .unwrap()
        .assert_tab_text_contains(&browser)
        .await
        .is_err());
}

#[tokio::test]
async fn signin_fills_credentials_and_waits_for_home() {
    let browser = RecordingBrowser::new();
    browser.show("div[data-screen-id=\"home\"]");
    let app = AdminUiApp::new(&KeystoneTarget::new("127.0.0.1", 4000));

    app.goto_signin_screen(&browser, false).await.unwrap();
    AdminUiSignin
        .signin(&browser, &app, &SigninConfig::default())
        .await
        .unwrap();

    assert_eq!(
        browser.actions(),
        vec![
            "navigate http://127.0.0.1:4000/keystone/",
            "set input[name=email] = user@test.e2e",
            "set input[name=password] = test",
            "click button[type=submit]",
        ]
    );
}

#[tokio::test]
async fn unknown_page_element_is_reported() {
    let browser = RecordingBrowser::new();
    let err = AdminUiSignin
        .click_element(&browser, "rememberMe")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "adminUISignin: unknown element 'rememberMe'");
}
