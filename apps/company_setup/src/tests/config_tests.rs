use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = layer_settings(None, no_env).expect("defaults");
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let raw = r#"
        api_base_url = "https://billing.example.com/api/"
        bearer_token = "file-token"
        sign_in_path = "/login"
    "#;
    let settings = layer_settings(Some(raw), no_env).expect("file settings");
    assert_eq!(settings.api_base_url, "https://billing.example.com/api");
    assert_eq!(settings.bearer_token.as_deref(), Some("file-token"));
    assert_eq!(settings.sign_in_path, "/login");
}

#[test]
fn prefixed_env_wins_over_plain_env_and_file() {
    let raw = r#"api_base_url = "http://from-file.test""#;
    let settings = layer_settings(Some(raw), |key| match key {
        "API_BASE_URL" => Some("http://plain-env.test".into()),
        "APP__API_BASE_URL" => Some("http://prefixed-env.test".into()),
        "APP__BEARER_TOKEN" => Some("env-token".into()),
        _ => None,
    })
    .expect("env settings");
    assert_eq!(settings.api_base_url, "http://prefixed-env.test");
    assert_eq!(settings.bearer_token.as_deref(), Some("env-token"));
}

#[test]
fn blank_token_is_treated_as_absent() {
    let settings = layer_settings(None, |key| {
        (key == "APP__BEARER_TOKEN").then(|| "  ".to_string())
    })
    .expect("settings");
    assert!(settings.bearer_token.is_none());
}

#[test]
fn rejects_non_http_base_url() {
    assert!(normalize_api_base_url("ftp://files.example.com").is_err());
    assert!(normalize_api_base_url("not a url").is_err());
}

#[test]
fn rejects_malformed_file() {
    assert!(layer_settings(Some("api_base_url = 42"), no_env).is_err());
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("company_setup_missing_{suffix}.toml"));
    assert!(load_settings(&path).is_ok());
}

#[test]
fn reads_config_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("company_setup_config_{suffix}.toml"));
    fs::write(&path, "sign_in_path = \"/auth/sign-in\"\n").expect("write config");

    let settings = load_settings(&path).expect("load settings");
    assert_eq!(settings.sign_in_path, "/auth/sign-in");

    fs::remove_file(path).expect("cleanup");
}
