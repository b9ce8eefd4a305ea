//! Unit tests for configuration validation and conversion.

use rackspace_driver::{RackspaceConfig, config::ConfigError};
use rstest::*;

#[fixture]
fn valid_config() -> RackspaceConfig {
    RackspaceConfig {
        username: String::from("rax-user"),
        api_key: String::from("rax-api-key"),
        region: String::from("IAD"),
        endpoint_type: String::from("publicURL"),
        identity_endpoint: None,
        flavor_id: String::from("general1-1"),
        image_id: String::from("59a3fadd-93e7-4674-886a-64883e17115f"),
        machine_name: None,
        machine_id: None,
        network_id: None,
        key_pair_name: None,
        security_groups: None,
    }
}

#[test]
fn config_validation_rejects_missing_api_key_with_actionable_error() {
    let cfg = RackspaceConfig {
        api_key: String::new(),
        ..valid_config()
    };

    let error = cfg.validate().expect_err("api key is required");
    let ConfigError::MissingField(ref message) = error else {
        panic!("expected MissingField error");
    };
    assert!(
        message.contains("OS_API_KEY"),
        "error should mention env var: {message}"
    );
    assert!(
        message.contains("rackspace-driver.toml"),
        "error should mention config file: {message}"
    );
}

#[rstest]
#[case::username(|cfg: &mut RackspaceConfig| cfg.username.clear(), "OS_USERNAME", "username")]
#[case::region(|cfg: &mut RackspaceConfig| cfg.region.clear(), "OS_REGION", "region")]
#[case::flavor(|cfg: &mut RackspaceConfig| cfg.flavor_id = String::from("  "), "OS_FLAVOR_ID", "flavor_id")]
#[case::image(|cfg: &mut RackspaceConfig| cfg.image_id.clear(), "OS_IMAGE_ID", "image_id")]
fn config_validation_produces_actionable_errors(
    valid_config: RackspaceConfig,
    #[case] mutate: fn(&mut RackspaceConfig),
    #[case] env_var: &str,
    #[case] toml_key: &str,
) {
    let mut cfg = valid_config;
    mutate(&mut cfg);
    let message = cfg.validate().expect_err("validation should fail").to_string();
    assert!(
        message.contains(env_var),
        "error should mention env var {env_var}: {message}"
    );
    assert!(
        message.contains(toml_key),
        "error should mention TOML key {toml_key}: {message}"
    );
}

#[rstest]
#[case(None, &[])]
#[case(Some("default"), &["default"])]
#[case(Some("web, db ,,"), &["web", "db"])]
fn security_groups_split_on_commas(
    valid_config: RackspaceConfig,
    #[case] raw: Option<&str>,
    #[case] expected: &[&str],
) {
    let cfg = RackspaceConfig {
        security_groups: raw.map(str::to_owned),
        ..valid_config
    };
    assert_eq!(cfg.security_group_list(), expected);
}

#[rstest]
fn driver_config_generates_machine_name(valid_config: RackspaceConfig) {
    let driver = valid_config
        .as_driver_config()
        .unwrap_or_else(|err| panic!("valid config yields driver config: {err}"));
    assert!(
        driver.machine_name.starts_with("rax-"),
        "unexpected name: {}",
        driver.machine_name
    );
    assert!(driver.machine_name.len() > "rax-".len());
}

#[rstest]
fn driver_config_carries_configured_values(valid_config: RackspaceConfig) {
    let cfg = RackspaceConfig {
        machine_name: Some(String::from("build-box")),
        machine_id: Some(String::from("srv-42")),
        network_id: Some(String::from("abc")),
        key_pair_name: Some(String::from("deploy-key")),
        security_groups: Some(String::from("default,web")),
        identity_endpoint: Some(String::from("uk")),
        ..valid_config
    };

    let driver = cfg
        .as_driver_config()
        .unwrap_or_else(|err| panic!("valid config yields driver config: {err}"));
    assert_eq!(driver.machine_name, "build-box");
    assert_eq!(driver.machine_id.as_deref(), Some("srv-42"));
    assert_eq!(driver.target_network(), Some("abc"));
    assert_eq!(driver.key_pair_name.as_deref(), Some("deploy-key"));
    assert_eq!(driver.security_groups, ["default", "web"]);
    assert_eq!(driver.identity_endpoint.as_deref(), Some("uk"));
    assert_eq!(driver.region, cfg.region);
    assert_eq!(driver.endpoint_type, cfg.endpoint_type);
}

#[rstest]
fn driver_config_ignores_blank_machine_id(valid_config: RackspaceConfig) {
    let cfg = RackspaceConfig {
        machine_id: Some(String::new()),
        ..valid_config
    };
    let driver = cfg
        .as_driver_config()
        .unwrap_or_else(|err| panic!("blank machine id is not an error: {err}"));
    assert_eq!(driver.machine_id, None);
}
