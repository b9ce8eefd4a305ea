//! Rackspace specialisation of the generic compute client.
//!
//! Authentication uses API-key credentials, network addresses are resolved
//! through the account's network catalog, and lifecycle actions Rackspace
//! does not offer are rejected up front.

pub mod api;
mod error;
mod lifecycle;
mod listing;
pub mod network;
pub mod session;
pub mod types;

use crate::backend::{BackendFuture, ComputeClient, DriverConfig, IpAddress};
use api::{
    Availability, AuthRequest, EndpointOpts, HttpProviderApi, IdentityEndpoint, ProviderApi,
    ServiceClient,
};
use session::{Session, USER_AGENT};

pub use error::RackspaceError;

/// Compute client that provisions and inspects Rackspace cloud servers.
#[derive(Debug)]
pub struct RackspaceClient<A: ProviderApi = HttpProviderApi> {
    api: A,
    session: Session,
}

impl RackspaceClient<HttpProviderApi> {
    /// Creates a client that talks to the Rackspace HTTPS APIs.
    #[must_use]
    pub fn http() -> Self {
        Self::new(HttpProviderApi::new())
    }
}

impl<A: ProviderApi> RackspaceClient<A> {
    /// Creates a client over the given provider API with a fresh session.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: Session::new(),
        }
    }

    /// Returns the provider API the client drives.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Returns the session state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn auth_request(config: &DriverConfig) -> AuthRequest {
        AuthRequest {
            username: config.username.clone(),
            api_key: config.api_key.clone(),
            identity: IdentityEndpoint::from_selector(config.identity_endpoint.as_deref()),
            user_agent: USER_AGENT.to_owned(),
        }
    }

    fn endpoint_opts(config: &DriverConfig) -> EndpointOpts {
        EndpointOpts {
            region: config.region.clone(),
            availability: Availability::from_endpoint_type(&config.endpoint_type),
        }
    }

    fn machine_id(config: &DriverConfig) -> Result<&str, RackspaceError> {
        config
            .machine_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RackspaceError::Validation("machine_id".to_owned()))
    }

    /// Authenticates the session if needed.
    ///
    /// # Errors
    ///
    /// Surfaces the provider's authentication or transport error unchanged.
    pub async fn authenticate_session(&self, config: &DriverConfig) -> Result<(), RackspaceError> {
        self.session
            .authenticate(&self.api, &Self::auth_request(config))
            .await
            .map(|_| ())
    }

    /// Initialises the network sub-client scoped to the configured region
    /// and endpoint visibility.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceError::NotAuthenticated`] before authentication, or
    /// the catalog lookup error.
    pub async fn init_network_client(
        &self,
        config: &DriverConfig,
    ) -> Result<&ServiceClient, RackspaceError> {
        self.session
            .init_network_client(&self.api, &Self::endpoint_opts(config))
            .await
    }

    async fn compute_client(
        &self,
        config: &DriverConfig,
    ) -> Result<&ServiceClient, RackspaceError> {
        self.authenticate_session(config).await?;
        self.session
            .init_compute_client(&self.api, &Self::endpoint_opts(config))
            .await
    }
}

impl<A: ProviderApi> ComputeClient for RackspaceClient<A> {
    type Error = RackspaceError;

    fn authenticate<'a>(&'a self, config: &'a DriverConfig) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move { self.authenticate_session(config).await })
    }

    fn create_instance<'a>(
        &'a self,
        config: &'a DriverConfig,
    ) -> BackendFuture<'a, String, Self::Error> {
        Box::pin(async move {
            let compute = self.compute_client(config).await?;
            let server_id = self.create_server(compute, config).await?;
            Ok(server_id.into_inner())
        })
    }

    fn get_instance_ip_addresses<'a>(
        &'a self,
        config: &'a DriverConfig,
    ) -> BackendFuture<'a, Vec<IpAddress>, Self::Error> {
        Box::pin(async move {
            let machine_id = Self::machine_id(config)?;
            let compute = self.compute_client(config).await?;
            self.instance_addresses(compute, config, machine_id).await
        })
    }

    fn get_instance_state<'a>(
        &'a self,
        config: &'a DriverConfig,
    ) -> BackendFuture<'a, String, Self::Error> {
        Box::pin(async move {
            let machine_id = Self::machine_id(config)?;
            let compute = self.compute_client(config).await?;
            let server = self.api.server_detail(compute, machine_id).await?;
            Ok(server.status)
        })
    }

    fn start_instance<'a>(
        &'a self,
        _config: &'a DriverConfig,
    ) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async { Err(RackspaceError::unsupported("start")) })
    }

    fn stop_instance<'a>(
        &'a self,
        _config: &'a DriverConfig,
    ) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async { Err(RackspaceError::unsupported("stop")) })
    }

    fn delete_instance<'a>(
        &'a self,
        config: &'a DriverConfig,
    ) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let machine_id = Self::machine_id(config)?;
            let compute = self.compute_client(config).await?;
            self.api.delete_server(compute, machine_id).await
        })
    }
}
