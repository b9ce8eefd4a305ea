//! Capability interface the Rackspace client drives, plus the value types
//! exchanged across it.
//!
//! [`ProviderApi`] is the seam between the adapter logic and the wire: the
//! production implementation is [`HttpProviderApi`], while tests substitute a
//! scripted double.

mod catalog;
mod http;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::backend::BackendFuture;
use crate::rackspace::error::RackspaceError;
use crate::rackspace::network::NetworkDescriptor;
use crate::rackspace::types::{NetworkId, ServerId};

pub use catalog::{CatalogEndpoint, CatalogService, ServiceCatalog};
pub use http::HttpProviderApi;

/// Identity endpoint for accounts hosted in the US.
pub const US_IDENTITY_URL: &str = "https://identity.api.rackspacecloud.com/v2.0/";
/// Identity endpoint for accounts hosted in the UK.
pub const UK_IDENTITY_URL: &str = "https://lon.identity.api.rackspacecloud.com/v2.0/";

/// Identity service used to authenticate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum IdentityEndpoint {
    /// US identity service.
    #[default]
    Us,
    /// UK identity service.
    Uk,
    /// Explicit identity base URL.
    Custom(String),
}

impl IdentityEndpoint {
    /// Interprets a configuration selector. `us` and `uk` (case-insensitive)
    /// pick the hosted services; any other non-empty value is used as a URL.
    #[must_use]
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector.map(str::trim) {
            None | Some("") => Self::Us,
            Some(value) if value.eq_ignore_ascii_case("us") => Self::Us,
            Some(value) if value.eq_ignore_ascii_case("uk") => Self::Uk,
            Some(value) => Self::Custom(value.to_owned()),
        }
    }

    /// Returns the base URL of the identity service.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Us => US_IDENTITY_URL,
            Self::Uk => UK_IDENTITY_URL,
            Self::Custom(url) => url.as_str(),
        }
    }
}

/// Opaque bearer token; never printed.
#[derive(Clone, Eq, PartialEq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a token issued by the identity service.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for use in request headers.
    #[must_use]
    pub const fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Credentials exchange sent to the identity service.
#[derive(Clone, Eq, PartialEq)]
pub struct AuthRequest {
    /// Account user name.
    pub username: String,
    /// API key credential.
    pub api_key: String,
    /// Identity service to contact.
    pub identity: IdentityEndpoint,
    /// Client identification tag sent as `User-Agent`.
    pub user_agent: String,
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("username", &self.username)
            .field("api_key", &"***")
            .field("identity", &self.identity)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Authenticated provider session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderSession {
    /// Token attached to every authenticated request.
    pub token: AuthToken,
    /// Service catalog returned with the token.
    pub catalog: ServiceCatalog,
    /// Client identification tag carried over from authentication.
    pub user_agent: String,
}

/// Endpoint visibility tier of a catalog entry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Availability {
    /// Publicly routable endpoint.
    #[default]
    Public,
    /// Endpoint reachable from the provider's internal network.
    Internal,
    /// Administrative endpoint.
    Admin,
}

impl Availability {
    /// Maps an endpoint-type selector to a tier, defaulting to public for
    /// anything unrecognised.
    #[must_use]
    pub fn from_endpoint_type(endpoint_type: &str) -> Self {
        match endpoint_type {
            "internalURL" => Self::Internal,
            "adminURL" => Self::Admin,
            _ => Self::Public,
        }
    }

    /// Returns the lowercase tier name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope used to pick a service endpoint from the catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndpointOpts {
    /// Region code of the endpoint.
    pub region: String,
    /// Visibility tier of the endpoint.
    pub availability: Availability,
}

/// Handle for one provider API, bound to a region and visibility tier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceClient {
    /// Base URL of the service, without a trailing slash.
    pub endpoint: String,
    /// Token used for authenticated requests.
    pub token: AuthToken,
    /// Client identification tag sent as `User-Agent`.
    pub user_agent: String,
}

impl ServiceClient {
    /// Builds an absolute URL for a path below the service endpoint.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

/// One page of the network listing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NetworkPage {
    /// Networks decoded from the page, in listing order.
    pub networks: Vec<NetworkDescriptor>,
    /// Token (URL) of the following page, when one exists.
    pub next: Option<String>,
}

/// Network port requested at server creation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkAttachment {
    /// Network to attach.
    pub uuid: NetworkId,
}

/// Provider-level server creation request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateServerRequest {
    /// Server name.
    pub name: String,
    /// Flavor reference.
    pub flavor_ref: String,
    /// Image reference.
    pub image_ref: String,
    /// Security group names.
    pub security_groups: Vec<String>,
    /// Explicit network attachments; empty keeps the provider defaults.
    pub networks: Vec<NetworkAttachment>,
    /// Key pair injected into the server.
    pub key_name: Option<String>,
}

/// Current provider-side representation of a server.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ServerDetail {
    /// Server identifier.
    pub id: String,
    /// Server name.
    #[serde(default)]
    pub name: String,
    /// Provider status (for example `ACTIVE` or `BUILD`).
    #[serde(default)]
    pub status: String,
    /// Raw per-network address records keyed by network name.
    #[serde(default)]
    pub addresses: BTreeMap<String, serde_json::Value>,
}

/// Remote capabilities required by the Rackspace client.
pub trait ProviderApi: Send + Sync {
    /// Exchanges credentials for an authenticated session.
    fn authenticate<'a>(
        &'a self,
        request: &'a AuthRequest,
    ) -> BackendFuture<'a, ProviderSession, RackspaceError>;

    /// Builds the network sub-client for the given scope.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceError::EndpointNotFound`] when the catalog has no
    /// matching network endpoint.
    fn network_client(
        &self,
        session: &ProviderSession,
        opts: &EndpointOpts,
    ) -> Result<ServiceClient, RackspaceError> {
        let endpoint = session.catalog.locate("network", None, opts)?;
        Ok(ServiceClient {
            endpoint,
            token: session.token.clone(),
            user_agent: session.user_agent.clone(),
        })
    }

    /// Builds the compute sub-client for the given scope.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceError::EndpointNotFound`] when the catalog has no
    /// matching compute endpoint.
    fn compute_client(
        &self,
        session: &ProviderSession,
        opts: &EndpointOpts,
    ) -> Result<ServiceClient, RackspaceError> {
        let endpoint = session
            .catalog
            .locate("compute", Some("cloudServersOpenStack"), opts)?;
        Ok(ServiceClient {
            endpoint,
            token: session.token.clone(),
            user_agent: session.user_agent.clone(),
        })
    }

    /// Fetches one page of custom network definitions. `next` is `None` for
    /// the first page.
    fn list_networks_page<'a>(
        &'a self,
        client: &'a ServiceClient,
        next: Option<&'a str>,
    ) -> BackendFuture<'a, NetworkPage, RackspaceError>;

    /// Creates a server and returns its identifier.
    fn create_server<'a>(
        &'a self,
        client: &'a ServiceClient,
        request: &'a CreateServerRequest,
    ) -> BackendFuture<'a, ServerId, RackspaceError>;

    /// Fetches the current representation of a server.
    fn server_detail<'a>(
        &'a self,
        client: &'a ServiceClient,
        server_id: &'a str,
    ) -> BackendFuture<'a, ServerDetail, RackspaceError>;

    /// Deletes a server.
    fn delete_server<'a>(
        &'a self,
        client: &'a ServiceClient,
        server_id: &'a str,
    ) -> BackendFuture<'a, (), RackspaceError>;
}
