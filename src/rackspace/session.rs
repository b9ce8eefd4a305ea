//! Lazily established provider session and its sub-clients.
//!
//! Each handle is initialised at most once; later calls return the stored
//! handle without touching the provider. `OnceCell` also serialises
//! concurrent first use, so only one exchange or construction ever runs.

use tokio::sync::OnceCell;
use tracing::debug;

use super::api::{AuthRequest, EndpointOpts, ProviderApi, ProviderSession, ServiceClient};
use super::error::RackspaceError;

/// Client identification tag prepended to outgoing requests.
pub const USER_AGENT: &str = concat!("rackspace-driver/v", env!("CARGO_PKG_VERSION"));

/// Authenticated session state owned by a Rackspace client.
#[derive(Debug, Default)]
pub struct Session {
    provider: OnceCell<ProviderSession>,
    network: OnceCell<ServiceClient>,
    compute: OnceCell<ServiceClient>,
}

impl Session {
    /// Creates an unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a provider session has been established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.provider.initialized()
    }

    /// Returns the provider session when authenticated.
    #[must_use]
    pub fn provider(&self) -> Option<&ProviderSession> {
        self.provider.get()
    }

    /// Authenticates against the identity service unless already done.
    ///
    /// # Errors
    ///
    /// Surfaces the provider's authentication or transport error unchanged.
    pub async fn authenticate<A: ProviderApi>(
        &self,
        api: &A,
        request: &AuthRequest,
    ) -> Result<&ProviderSession, RackspaceError> {
        self.provider
            .get_or_try_init(|| async {
                debug!(username = %request.username, "Authenticating to Rackspace.");
                api.authenticate(request).await
            })
            .await
    }

    /// Builds the network sub-client unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceError::NotAuthenticated`] before a successful
    /// [`Session::authenticate`], or the construction error from the provider.
    pub async fn init_network_client<A: ProviderApi>(
        &self,
        api: &A,
        opts: &EndpointOpts,
    ) -> Result<&ServiceClient, RackspaceError> {
        let provider = self.provider.get().ok_or(RackspaceError::NotAuthenticated)?;
        self.network
            .get_or_try_init(|| async {
                debug!(
                    region = %opts.region,
                    availability = %opts.availability,
                    "Initialising network client."
                );
                api.network_client(provider, opts)
            })
            .await
    }

    /// Builds the compute sub-client unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceError::NotAuthenticated`] before a successful
    /// [`Session::authenticate`], or the construction error from the provider.
    pub async fn init_compute_client<A: ProviderApi>(
        &self,
        api: &A,
        opts: &EndpointOpts,
    ) -> Result<&ServiceClient, RackspaceError> {
        let provider = self.provider.get().ok_or(RackspaceError::NotAuthenticated)?;
        self.compute
            .get_or_try_init(|| async {
                debug!(
                    region = %opts.region,
                    availability = %opts.availability,
                    "Initialising compute client."
                );
                api.compute_client(provider, opts)
            })
            .await
    }
}
