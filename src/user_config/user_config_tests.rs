use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_empty_toml_produces_defaults() {
    let cfg: UserConfig = toml::from_str("").expect("Should parse empty TOML");
    assert_eq!(cfg, UserConfig::default());
    assert!(cfg.providers.is_empty());
}

#[test]
fn test_provider_table() {
    let toml_str = "[providers.github]\ntoken = \"ghp_abc\"\n";
    let cfg: UserConfig = toml::from_str(toml_str).expect("Should parse providers table");

    let creds = cfg.credentials_for("github");
    assert_eq!(creds.token.as_deref(), Some("ghp_abc"));
    assert_eq!(creds.token_command, None);
}

#[test]
fn test_token_command() {
    let toml_str = "[providers.github]\ntoken_command = \"gh auth token\"\n";
    let cfg: UserConfig = toml::from_str(toml_str).expect("Should parse token_command");

    assert_eq!(
        cfg.credentials_for("github").token_command.as_deref(),
        Some("gh auth token")
    );
}

#[test]
fn test_credentials_for_unknown_provider_are_empty() {
    let cfg = UserConfig::default();
    assert_eq!(cfg.credentials_for("gitlab"), ProviderCredentials::default());
}

#[test]
fn test_unknown_credential_key_is_rejected() {
    let toml_str = "[providers.github]\npassword = \"hunter2\"\n";
    assert!(toml::from_str::<UserConfig>(toml_str).is_err());
}

#[test]
fn test_roundtrip_serialization() {
    let mut cfg = UserConfig::default();
    cfg.providers.insert(
        "github".to_string(),
        ProviderCredentials {
            token: None,
            token_command: Some("pass github".to_string()),
        },
    );
    let serialized = toml::to_string(&cfg).expect("Should serialize");
    let deserialized: UserConfig = toml::from_str(&serialized).expect("Should deserialize");
    assert_eq!(cfg, deserialized);
}

#[test]
fn test_load_from_absent_file() {
    let dir = tempdir().expect("tempdir");
    let cfg = load_user_config_from(&dir.path().join("config.toml")).expect("defaults");
    assert_eq!(cfg, UserConfig::default());
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "# notebridge user config\n\n[providers.github]\ntoken = \"t\"\n",
    )
    .expect("write config");

    let cfg = load_user_config_from(&config_path).expect("parse config");
    assert_eq!(cfg.credentials_for("github").token.as_deref(), Some("t"));
}

#[test]
fn test_load_from_invalid_file() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[providers\n").expect("write config");

    assert!(matches!(
        load_user_config_from(&config_path),
        Err(UserConfigError::Toml(_))
    ));
}
