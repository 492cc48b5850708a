//! Tests for capability sets

use super::*;
use serde_json::json;

fn android_caps() -> Capabilities {
    Capabilities::new()
        .with("platformName", "Android")
        .with("appPackage", "C:\\apps\\a.apk")
}

#[test]
fn test_quoted_form_on_windows() {
    let arg = capabilities_to_cmdline_arg(&android_caps(), true, Platform::Windows);
    assert_eq!(
        arg,
        r#"{\"platformName\": \"Android\", \"appPackage\": \"C:/apps/a.apk\"}"#
    );
}

#[test]
fn test_json_form_when_quoting_disabled() {
    let arg = capabilities_to_cmdline_arg(&android_caps(), false, Platform::Windows);
    assert!(!arg.contains("\\\""));
    assert!(arg.starts_with(r#"{"platformName":"Android""#));

    let parsed: Value = serde_json::from_str(&arg).unwrap();
    assert_eq!(parsed["appPackage"], "C:\\apps\\a.apk");
}

#[test]
fn test_json_form_off_windows_even_when_requested() {
    for platform in [Platform::Linux, Platform::Mac, Platform::Unix] {
        let arg = capabilities_to_cmdline_arg(&android_caps(), true, platform);
        assert_eq!(arg, android_caps().to_json());
    }
}

#[test]
fn test_json_keeps_nulls_and_does_not_escape_html() {
    let caps = Capabilities::new()
        .with("appium:udid", Value::Null)
        .with("appium:webviewDevtoolsPort", "<9222>&");
    assert_eq!(
        caps.to_json(),
        r#"{"appium:udid":null,"appium:webviewDevtoolsPort":"<9222>&"}"#
    );
}

#[test]
fn test_quoted_form_skips_nulls() {
    let caps = Capabilities::new()
        .with("deviceName", Value::Null)
        .with("platformName", "iOS");
    assert_eq!(caps.to_quoted_cmdline_arg(), r#"{\"platformName\": \"iOS\"}"#);
}

#[test]
fn test_quoted_form_stringifies_other_values() {
    let caps = Capabilities::new()
        .with("appium:newCommandTimeout", 60)
        .with("appium:noReset", true)
        .with("appium:otherApps", json!(["a", "b"]));
    assert_eq!(
        caps.to_quoted_cmdline_arg(),
        r#"{\"appium:newCommandTimeout\": 60, \"appium:noReset\": true, \"appium:otherApps\": ["a","b"]}"#
    );
}

#[test]
fn test_quoted_form_rewrites_prefixed_path_capabilities() {
    let caps = Capabilities::new()
        .with("appium:app", "C:\\builds\\app.apk")
        .with("appium:chromedriverExecutable", "C:\\drivers\\chromedriver.exe")
        .with("appium:deviceName", "C:\\not\\a\\path");
    let arg = caps.to_quoted_cmdline_arg();
    assert!(arg.contains(r#"\"appium:app\": \"C:/builds/app.apk\""#));
    assert!(arg.contains(r#"\"appium:chromedriverExecutable\": \"C:/drivers/chromedriver.exe\""#));
    assert!(arg.contains(r#"\"appium:deviceName\": \"C:\not\a\path\""#));
}

#[test]
fn test_quoted_form_of_empty_set() {
    assert_eq!(Capabilities::new().to_quoted_cmdline_arg(), "{}");
}

#[test]
fn test_merge_later_set_wins() {
    let first = Capabilities::new()
        .with("platformName", "Android")
        .with("appium:deviceName", "emulator-5554");
    let second = Capabilities::new()
        .with("appium:deviceName", "Pixel 7")
        .with("appium:automationName", "UiAutomator2");

    let merged = first.merge(&second);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged.get_capability("appium:deviceName"), Some(&json!("Pixel 7")));
    assert_eq!(merged.get_capability("platformName"), Some(&json!("Android")));
    // merge leaves the inputs untouched
    assert_eq!(first.get_capability("appium:deviceName"), Some(&json!("emulator-5554")));
}

#[test]
fn test_merge_preserves_insertion_order() {
    let merged = Capabilities::new()
        .with("b", 1)
        .with("a", 2)
        .merge(&Capabilities::new().with("c", 3).with("b", 4));
    let names: Vec<&String> = merged.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["b", "a", "c"]);
}

#[test]
fn test_score() {
    assert_eq!(score(&Capabilities::new()), 0);
    assert_eq!(score(&Capabilities::new().with("platformName", "Android")), 1);
    assert_eq!(
        score(
            &Capabilities::new()
                .with("platformName", "Android")
                .with("browserName", "Chrome")
        ),
        2
    );
    assert_eq!(score(&Capabilities::new().with("browserName", "safari")), 1);
    assert_eq!(score(&Capabilities::new().with("browserName", "firefox")), 0);
    assert_eq!(score(&Capabilities::new().with("platformName", Value::Null)), 0);
}

#[test]
fn test_deserialize_from_toml_table() {
    let table: Capabilities = toml::from_str(
        r#"
platformName = "Android"
"appium:noReset" = true
"#,
    )
    .unwrap();
    assert_eq!(table.platform_name(), Some(&json!("Android")));
    assert_eq!(table.get_capability("appium:noReset"), Some(&json!(true)));
}
