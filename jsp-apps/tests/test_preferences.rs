use std::io::Write;

use jsp_apps::{Error, Preferences};

#[test]
fn verify_sample_configs() {
    let preferences = Preferences::try_new("config/joint_state_publisher.toml").unwrap();
    assert_eq!(preferences, Preferences::default());
}

#[test]
fn ser_default_config() {
    let s = toml::to_string(&Preferences::default()).unwrap();
    assert_eq!(
        Preferences::from_str(&s, "default.toml").unwrap(),
        Preferences::default()
    );
}

#[test]
fn test_partial_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"ros_bridge_url = "ws://192.168.1.2:9090"

[publisher]
topic_name = "/joint_states""#
    )
    .unwrap();
    let preferences = Preferences::try_new(file.path()).unwrap();
    assert_eq!(preferences.ros_bridge_url, "ws://192.168.1.2:9090");
    assert_eq!(preferences.publisher.topic_name, "/joint_states");
    assert_eq!(preferences.publisher.param_name, "robot_description");
    assert_eq!(preferences.publisher.div_id, "sliders");
    assert_eq!(
        preferences.ros_bridge_url().unwrap().host_str(),
        Some("192.168.1.2")
    );
}

#[test]
fn test_unknown_field() {
    let result = Preferences::from_str("ros_bridge_port = 9090", "bad.toml");
    assert!(matches!(result, Err(Error::TomlParseFailure(..))));
    let result = Preferences::from_str("[publisher]\nframe_id = \"base\"", "bad.toml");
    assert!(matches!(result, Err(Error::TomlParseFailure(..))));
}

#[test]
fn test_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Preferences::try_new(dir.path().join("missing.toml"));
    assert!(matches!(result, Err(Error::NoFile(..))));
}
