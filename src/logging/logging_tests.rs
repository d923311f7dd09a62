use super::*;

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.log_level, Level::INFO);
    assert!(!config.json_format);
    assert!(config.log_dir.ends_with(".notebridge/logs"));
}

#[test]
fn test_log_file_path() {
    let config = LogConfig {
        log_dir: PathBuf::from("/var/log/nb"),
        ..LogConfig::default()
    };
    assert_eq!(config.log_file(), PathBuf::from("/var/log/nb/notebridge.log"));
}

#[test]
fn test_parse_rotation_hourly() {
    let rotation = parse_rotation("hourly");
    // Rotation doesn't impl PartialEq, so use debug
    assert_eq!(format!("{rotation:?}"), format!("{:?}", Rotation::HOURLY));
}

#[test]
fn test_parse_rotation_never_case_insensitive() {
    let rotation = parse_rotation("Never");
    assert_eq!(format!("{rotation:?}"), format!("{:?}", Rotation::NEVER));
}

#[test]
fn test_parse_rotation_unknown_defaults_to_daily() {
    let rotation = parse_rotation("weekly");
    assert_eq!(format!("{rotation:?}"), format!("{:?}", Rotation::DAILY));
}

#[test]
fn test_log_file_path_unset_is_empty_or_stable() {
    let first = get_log_file_path();
    set_log_file_path("/tmp/notebridge-test.log".to_string());
    let second = get_log_file_path();
    assert!(first.is_empty() || first == second);
    assert!(!second.is_empty());
}
