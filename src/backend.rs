//! Generic driver surface shared by compute providers.
//!
//! The orchestration layer talks to providers exclusively through
//! [`ComputeClient`], handing each call the full [`DriverConfig`] for the
//! machine being managed.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Machine settings supplied by the orchestration driver.
#[derive(Clone, Eq, PartialEq)]
pub struct DriverConfig {
    /// Account user name used for authentication.
    pub username: String,
    /// API credential paired with [`DriverConfig::username`].
    pub api_key: String,
    /// Region code hosting the machine (for example `IAD`).
    pub region: String,
    /// Endpoint visibility selector (`publicURL`, `internalURL`, `adminURL`).
    pub endpoint_type: String,
    /// Identity endpoint selector: a region alias or an explicit URL.
    pub identity_endpoint: Option<String>,
    /// Name given to the machine at creation time.
    pub machine_name: String,
    /// Provider identifier of an existing machine.
    pub machine_id: Option<String>,
    /// Flavor reference used when creating the machine.
    pub flavor_id: String,
    /// Image reference used when creating the machine.
    pub image_id: String,
    /// Target network identifier; `None` keeps the provider defaults.
    pub network_id: Option<String>,
    /// Security groups applied to the machine.
    pub security_groups: Vec<String>,
    /// Key pair injected into the machine, when any.
    pub key_pair_name: Option<String>,
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("username", &self.username)
            .field("api_key", &"***")
            .field("region", &self.region)
            .field("endpoint_type", &self.endpoint_type)
            .field("identity_endpoint", &self.identity_endpoint)
            .field("machine_name", &self.machine_name)
            .field("machine_id", &self.machine_id)
            .field("flavor_id", &self.flavor_id)
            .field("image_id", &self.image_id)
            .field("network_id", &self.network_id)
            .field("security_groups", &self.security_groups)
            .field("key_pair_name", &self.key_pair_name)
            .finish()
    }
}

impl DriverConfig {
    /// Starts a builder for a [`DriverConfig`].
    #[must_use]
    pub fn builder() -> DriverConfigBuilder {
        DriverConfigBuilder::new()
    }

    /// Validates the configuration, returning the first empty required field.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Validation`] when a required field is empty.
    pub fn validate(&self) -> Result<(), BackendError> {
        let required = [
            ("username", &self.username),
            ("api_key", &self.api_key),
            ("region", &self.region),
            ("machine_name", &self.machine_name),
            ("flavor_id", &self.flavor_id),
            ("image_id", &self.image_id),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(BackendError::Validation(field.to_owned()));
            }
        }
        Ok(())
    }

    /// Returns the requested target network, ignoring blank identifiers.
    #[must_use]
    pub fn target_network(&self) -> Option<&str> {
        self.network_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Builder for [`DriverConfig`] that trims inputs and validates on build.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DriverConfigBuilder {
    username: String,
    api_key: String,
    region: String,
    endpoint_type: String,
    identity_endpoint: Option<String>,
    machine_name: String,
    machine_id: Option<String>,
    flavor_id: String,
    image_id: String,
    network_id: Option<String>,
    security_groups: Vec<String>,
    key_pair_name: Option<String>,
}

impl DriverConfigBuilder {
    /// Creates an empty builder; required fields must be populated before build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user name.
    #[must_use]
    pub fn username(mut self, value: impl Into<String>) -> Self {
        self.username = value.into();
        self
    }

    /// Sets the API credential.
    #[must_use]
    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = value.into();
        self
    }

    /// Sets the region code.
    #[must_use]
    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = value.into();
        self
    }

    /// Sets the endpoint visibility selector.
    #[must_use]
    pub fn endpoint_type(mut self, value: impl Into<String>) -> Self {
        self.endpoint_type = value.into();
        self
    }

    /// Sets the optional identity endpoint selector.
    #[must_use]
    pub fn identity_endpoint(mut self, value: Option<String>) -> Self {
        self.identity_endpoint = value;
        self
    }

    /// Sets the machine name.
    #[must_use]
    pub fn machine_name(mut self, value: impl Into<String>) -> Self {
        self.machine_name = value.into();
        self
    }

    /// Sets the optional machine identifier.
    #[must_use]
    pub fn machine_id(mut self, value: Option<String>) -> Self {
        self.machine_id = value;
        self
    }

    /// Sets the flavor reference.
    #[must_use]
    pub fn flavor_id(mut self, value: impl Into<String>) -> Self {
        self.flavor_id = value.into();
        self
    }

    /// Sets the image reference.
    #[must_use]
    pub fn image_id(mut self, value: impl Into<String>) -> Self {
        self.image_id = value.into();
        self
    }

    /// Sets the optional target network.
    #[must_use]
    pub fn network_id(mut self, value: Option<String>) -> Self {
        self.network_id = value;
        self
    }

    /// Sets the security groups.
    #[must_use]
    pub fn security_groups(mut self, value: impl IntoIterator<Item = String>) -> Self {
        self.security_groups = value.into_iter().collect();
        self
    }

    /// Sets the optional key pair name.
    #[must_use]
    pub fn key_pair_name(mut self, value: Option<String>) -> Self {
        self.key_pair_name = value;
        self
    }

    /// Builds and validates the [`DriverConfig`], trimming string inputs.
    ///
    /// Optional values that trim to nothing are treated as absent. Operations
    /// that act on an existing machine reject a missing identifier themselves.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Validation`] when a required field is empty.
    pub fn build(self) -> Result<DriverConfig, BackendError> {
        let config = DriverConfig {
            username: self.username.trim().to_owned(),
            api_key: self.api_key.trim().to_owned(),
            region: self.region.trim().to_owned(),
            endpoint_type: self.endpoint_type.trim().to_owned(),
            identity_endpoint: non_blank(self.identity_endpoint),
            machine_name: self.machine_name.trim().to_owned(),
            machine_id: non_blank(self.machine_id),
            flavor_id: self.flavor_id.trim().to_owned(),
            image_id: self.image_id.trim().to_owned(),
            network_id: non_blank(self.network_id),
            security_groups: self
                .security_groups
                .iter()
                .map(|group| group.trim())
                .filter(|group| !group.is_empty())
                .map(str::to_owned)
                .collect(),
            key_pair_name: non_blank(self.key_pair_name),
        };
        config.validate()?;
        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|inner| inner.trim().to_owned())
        .filter(|inner| !inner.is_empty())
}

/// Distinguishes statically assigned addresses from floating ones.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AddressType {
    /// Address assigned on the instance's own network port.
    Fixed,
    /// Externally routed address associated after creation.
    Floating,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => f.write_str("fixed"),
            Self::Floating => f.write_str("floating"),
        }
    }
}

/// Address reported for an instance on one of its networks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IpAddress {
    /// Human readable network name.
    pub network: String,
    /// Address literal; empty while the provider has not assigned one yet.
    pub address: String,
    /// Whether the address is fixed or floating.
    pub address_type: AddressType,
}

/// Errors raised by the generic driver surface.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum BackendError {
    /// Raised when a configuration is missing a required field.
    #[error("missing or empty field: {0}")]
    Validation(String),
}

/// Future returned by backend operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Interface a compute provider exposes to the orchestration driver.
pub trait ComputeClient {
    /// Provider specific error type returned by the client.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Establishes the provider session. Repeated calls are no-ops.
    fn authenticate<'a>(&'a self, config: &'a DriverConfig) -> BackendFuture<'a, (), Self::Error>;

    /// Creates a new instance and returns its provider identifier.
    fn create_instance<'a>(
        &'a self,
        config: &'a DriverConfig,
    ) -> BackendFuture<'a, String, Self::Error>;

    /// Reports the addresses of the instance on the configured network.
    fn get_instance_ip_addresses<'a>(
        &'a self,
        config: &'a DriverConfig,
    ) -> BackendFuture<'a, Vec<IpAddress>, Self::Error>;

    /// Reports the provider-side status of the instance.
    fn get_instance_state<'a>(
        &'a self,
        config: &'a DriverConfig,
    ) -> BackendFuture<'a, String, Self::Error>;

    /// Powers the instance on.
    fn start_instance<'a>(&'a self, config: &'a DriverConfig) -> BackendFuture<'a, (), Self::Error>;

    /// Powers the instance off.
    fn stop_instance<'a>(&'a self, config: &'a DriverConfig) -> BackendFuture<'a, (), Self::Error>;

    /// Deletes the instance.
    fn delete_instance<'a>(
        &'a self,
        config: &'a DriverConfig,
    ) -> BackendFuture<'a, (), Self::Error>;
}
