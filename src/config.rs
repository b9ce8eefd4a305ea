//! Configuration loading via `ortho-config`.

use crate::backend::DriverConfig;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Rackspace specific configuration derived from environment variables,
/// configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "OS",
    discovery(
        app_name = "rackspace-driver",
        env_var = "RACKSPACE_DRIVER_CONFIG_PATH",
        config_file_name = "rackspace-driver.toml",
        dotfile_name = ".rackspace-driver.toml",
        project_file_name = "rackspace-driver.toml"
    )
)]
pub struct RackspaceConfig {
    /// Rackspace account user name. This value is required.
    pub username: String,
    /// API key paired with the user name. This value is required.
    pub api_key: String,
    /// Region hosting the machine. Defaults to `IAD`.
    #[ortho_config(default = "IAD".to_owned())]
    pub region: String,
    /// Endpoint visibility selector. Defaults to `publicURL`.
    #[ortho_config(default = "publicURL".to_owned())]
    pub endpoint_type: String,
    /// Identity service selector (`us`, `uk`, or a URL). Defaults to the US
    /// identity service when unset.
    pub identity_endpoint: Option<String>,
    /// Flavor for new machines. Defaults to `general1-1`.
    #[ortho_config(default = "general1-1".to_owned())]
    pub flavor_id: String,
    /// Image for new machines. Defaults to Ubuntu 14.04 LTS (PVHVM).
    #[ortho_config(default = "59a3fadd-93e7-4674-886a-64883e17115f".to_owned())]
    pub image_id: String,
    /// Name for new machines; a unique `rax-` name is generated when unset.
    pub machine_name: Option<String>,
    /// Identifier of an existing machine, required by inspection commands.
    pub machine_id: Option<String>,
    /// Network whose address is reported and attached at creation.
    pub network_id: Option<String>,
    /// Key pair injected into new machines.
    pub key_pair_name: Option<String>,
    /// Comma-separated security group names.
    pub security_groups: Option<String>,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl RackspaceConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to rackspace-driver.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("rackspace-driver")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the configured security groups, splitting on commas.
    #[must_use]
    pub fn security_group_list(&self) -> Vec<String> {
        self.security_groups
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Builds a [`DriverConfig`] from the configured values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn as_driver_config(&self) -> Result<DriverConfig, ConfigError> {
        self.validate()?;
        let machine_name = self
            .machine_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("rax-{}", Uuid::new_v4().simple()));
        DriverConfig::builder()
            .username(&self.username)
            .api_key(&self.api_key)
            .region(&self.region)
            .endpoint_type(&self.endpoint_type)
            .identity_endpoint(self.identity_endpoint.clone())
            .machine_name(machine_name)
            .machine_id(self.machine_id.clone())
            .flavor_id(&self.flavor_id)
            .image_id(&self.image_id)
            .network_id(self.network_id.clone())
            .security_groups(self.security_group_list())
            .key_pair_name(self.key_pair_name.clone())
            .build()
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.username,
            &FieldMetadata::new("Rackspace user name", "OS_USERNAME", "username"),
        )?;
        Self::require_field(
            &self.api_key,
            &FieldMetadata::new("Rackspace API key", "OS_API_KEY", "api_key"),
        )?;
        Self::require_field(
            &self.region,
            &FieldMetadata::new("region", "OS_REGION", "region"),
        )?;
        Self::require_field(
            &self.flavor_id,
            &FieldMetadata::new("flavor", "OS_FLAVOR_ID", "flavor_id"),
        )?;
        Self::require_field(
            &self.image_id,
            &FieldMetadata::new("image", "OS_IMAGE_ID", "image_id"),
        )?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
