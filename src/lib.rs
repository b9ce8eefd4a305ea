//! Rackspace driver for provisioning and inspecting cloud servers.
//!
//! The crate exposes a generic [`ComputeClient`] surface consumed by machine
//! orchestration tooling and a Rackspace implementation that authenticates
//! with API keys, resolves account networks, and reports instance addresses.

pub mod backend;
pub mod config;
pub mod logging;
pub mod rackspace;
pub mod test_support;

pub use backend::{
    AddressType, BackendFuture, ComputeClient, DriverConfig, DriverConfigBuilder, IpAddress,
};
pub use config::RackspaceConfig;
pub use rackspace::api::{HttpProviderApi, ProviderApi};
pub use rackspace::network::{NetworkCatalog, NetworkDescriptor};
pub use rackspace::{RackspaceClient, RackspaceError};
