//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::{BackendFuture, DriverConfig};
use crate::rackspace::RackspaceError;
use crate::rackspace::api::{
    AuthRequest, AuthToken, CatalogEndpoint, CatalogService, CreateServerRequest, EndpointOpts,
    NetworkPage, ProviderApi, ProviderSession, ServerDetail, ServiceCatalog, ServiceClient,
};
use crate::rackspace::network::NetworkDescriptor;
use crate::rackspace::types::ServerId;

/// Region served by [`sample_catalog`].
pub const SAMPLE_REGION: &str = "IAD";
/// Public network endpoint in [`sample_catalog`].
pub const SAMPLE_NETWORK_URL: &str = "https://iad.networks.example.test/v2.0";
/// Public compute endpoint in [`sample_catalog`].
pub const SAMPLE_COMPUTE_URL: &str = "https://iad.servers.example.test/v2/123456";
/// Internal compute endpoint in [`sample_catalog`].
pub const SAMPLE_COMPUTE_INTERNAL_URL: &str = "https://snet-iad.servers.example.test/v2/123456";
/// Identifier returned for every server created through [`ScriptedProvider`].
pub const SCRIPTED_SERVER_ID: &str = "srv-0001";

/// Builds a catalog with network and compute endpoints in [`SAMPLE_REGION`].
#[must_use]
pub fn sample_catalog() -> ServiceCatalog {
    ServiceCatalog {
        services: vec![
            CatalogService {
                service_type: String::from("network"),
                name: String::from("cloudNetworks"),
                endpoints: vec![CatalogEndpoint {
                    region: Some(String::from(SAMPLE_REGION)),
                    public_url: Some(String::from(SAMPLE_NETWORK_URL)),
                    ..CatalogEndpoint::default()
                }],
            },
            CatalogService {
                service_type: String::from("compute"),
                name: String::from("cloudServersOpenStack"),
                endpoints: vec![CatalogEndpoint {
                    region: Some(String::from(SAMPLE_REGION)),
                    public_url: Some(format!("{SAMPLE_COMPUTE_URL}/")),
                    internal_url: Some(String::from(SAMPLE_COMPUTE_INTERNAL_URL)),
                    admin_url: None,
                }],
            },
        ],
    }
}

/// Builds a valid driver configuration for [`SAMPLE_REGION`].
///
/// # Errors
///
/// Returns the builder's validation error; the fixed values always pass.
pub fn sample_driver_config(
    network_id: Option<&str>,
    machine_id: Option<&str>,
) -> Result<DriverConfig, crate::backend::BackendError> {
    DriverConfig::builder()
        .username("rax-user")
        .api_key("rax-api-key")
        .region(SAMPLE_REGION)
        .endpoint_type("publicURL")
        .machine_name("rax-test-machine")
        .machine_id(machine_id.map(str::to_owned))
        .flavor_id("general1-1")
        .image_id("image-ref")
        .network_id(network_id.map(str::to_owned))
        .security_groups([String::from("default")])
        .key_pair_name(Some(String::from("deploy-key")))
        .build()
}

#[derive(Debug, Default)]
struct State {
    catalog: ServiceCatalog,
    auth_failure: Option<RackspaceError>,
    creation_failure: Option<RackspaceError>,
    detail_failure: Option<RackspaceError>,
    pages: VecDeque<Result<NetworkPage, RackspaceError>>,
    server: ServerDetail,
    auth_requests: Vec<AuthRequest>,
    network_client_calls: usize,
    compute_client_calls: usize,
    page_requests: Vec<Option<String>>,
    created: Vec<CreateServerRequest>,
    detail_requests: Vec<String>,
    deleted: Vec<String>,
}

/// Scripted provider API that serves pre-seeded responses and records every
/// call made through it.
#[derive(Clone, Debug, Default)]
pub struct ScriptedProvider {
    state: Arc<Mutex<State>>,
}

impl ScriptedProvider {
    /// Creates a provider whose sessions carry [`sample_catalog`].
    #[must_use]
    pub fn new() -> Self {
        let provider = Self::default();
        provider.state().catalog = sample_catalog();
        provider
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the catalog returned by authentication.
    pub fn set_catalog(&self, catalog: ServiceCatalog) {
        self.state().catalog = catalog;
    }

    /// Makes every authentication attempt fail with `error`.
    pub fn fail_authentication(&self, error: RackspaceError) {
        self.state().auth_failure = Some(error);
    }

    /// Makes every server creation fail with `error`.
    pub fn fail_creation(&self, error: RackspaceError) {
        self.state().creation_failure = Some(error);
    }

    /// Makes every server detail fetch fail with `error`.
    pub fn fail_detail(&self, error: RackspaceError) {
        self.state().detail_failure = Some(error);
    }

    /// Queues a listing page. `next` is the token handed back for the
    /// following page.
    pub fn push_network_page(&self, networks: &[(&str, &str)], next: Option<&str>) {
        let page = NetworkPage {
            networks: networks
                .iter()
                .map(|(id, name)| NetworkDescriptor::new(*id, *name))
                .collect(),
            next: next.map(str::to_owned),
        };
        self.state().pages.push_back(Ok(page));
    }

    /// Queues a failing listing page.
    pub fn push_network_failure(&self, error: RackspaceError) {
        self.state().pages.push_back(Err(error));
    }

    /// Sets the address collection reported for the server.
    ///
    /// `addresses` must be a JSON object keyed by network name; any other
    /// value clears the collection.
    pub fn set_addresses(&self, addresses: &serde_json::Value) {
        let map = addresses
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .map(|(name, records)| (name.clone(), records.clone()))
                    .collect::<BTreeMap<_, _>>()
            })
            .unwrap_or_default();
        self.state().server.addresses = map;
    }

    /// Sets the status reported for the server.
    pub fn set_status(&self, status: &str) {
        self.state().server.status = status.to_owned();
    }

    /// Returns every authentication request received.
    #[must_use]
    pub fn auth_requests(&self) -> Vec<AuthRequest> {
        self.state().auth_requests.clone()
    }

    /// Returns how many network sub-clients were constructed.
    #[must_use]
    pub fn network_client_calls(&self) -> usize {
        self.state().network_client_calls
    }

    /// Returns how many compute sub-clients were constructed.
    #[must_use]
    pub fn compute_client_calls(&self) -> usize {
        self.state().compute_client_calls
    }

    /// Returns the page tokens requested, in order.
    #[must_use]
    pub fn page_requests(&self) -> Vec<Option<String>> {
        self.state().page_requests.clone()
    }

    /// Returns the server creation requests received.
    #[must_use]
    pub fn created(&self) -> Vec<CreateServerRequest> {
        self.state().created.clone()
    }

    /// Returns the server identifiers whose detail was fetched.
    #[must_use]
    pub fn detail_requests(&self) -> Vec<String> {
        self.state().detail_requests.clone()
    }

    /// Returns the server identifiers deleted.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.state().deleted.clone()
    }
}

impl ProviderApi for ScriptedProvider {
    fn authenticate<'a>(
        &'a self,
        request: &'a AuthRequest,
    ) -> BackendFuture<'a, ProviderSession, RackspaceError> {
        Box::pin(async move {
            let mut state = self.state();
            state.auth_requests.push(request.clone());
            if let Some(error) = state.auth_failure.clone() {
                return Err(error);
            }
            Ok(ProviderSession {
                token: AuthToken::new("scripted-token"),
                catalog: state.catalog.clone(),
                user_agent: request.user_agent.clone(),
            })
        })
    }

    fn network_client(
        &self,
        session: &ProviderSession,
        opts: &EndpointOpts,
    ) -> Result<ServiceClient, RackspaceError> {
        self.state().network_client_calls += 1;
        Ok(ServiceClient {
            endpoint: session.catalog.locate("network", None, opts)?,
            token: session.token.clone(),
            user_agent: session.user_agent.clone(),
        })
    }

    fn compute_client(
        &self,
        session: &ProviderSession,
        opts: &EndpointOpts,
    ) -> Result<ServiceClient, RackspaceError> {
        self.state().compute_client_calls += 1;
        Ok(ServiceClient {
            endpoint: session
                .catalog
                .locate("compute", Some("cloudServersOpenStack"), opts)?,
            token: session.token.clone(),
            user_agent: session.user_agent.clone(),
        })
    }

    fn list_networks_page<'a>(
        &'a self,
        _client: &'a ServiceClient,
        next: Option<&'a str>,
    ) -> BackendFuture<'a, NetworkPage, RackspaceError> {
        Box::pin(async move {
            let mut state = self.state();
            state.page_requests.push(next.map(str::to_owned));
            state
                .pages
                .pop_front()
                .unwrap_or_else(|| Ok(NetworkPage::default()))
        })
    }

    fn create_server<'a>(
        &'a self,
        _client: &'a ServiceClient,
        request: &'a CreateServerRequest,
    ) -> BackendFuture<'a, ServerId, RackspaceError> {
        Box::pin(async move {
            let mut state = self.state();
            state.created.push(request.clone());
            state
                .creation_failure
                .clone()
                .map_or_else(|| Ok(ServerId::from(SCRIPTED_SERVER_ID)), Err)
        })
    }

    fn server_detail<'a>(
        &'a self,
        _client: &'a ServiceClient,
        server_id: &'a str,
    ) -> BackendFuture<'a, ServerDetail, RackspaceError> {
        Box::pin(async move {
            let mut state = self.state();
            state.detail_requests.push(server_id.to_owned());
            if let Some(error) = state.detail_failure.clone() {
                return Err(error);
            }
            Ok(ServerDetail {
                id: server_id.to_owned(),
                ..state.server.clone()
            })
        })
    }

    fn delete_server<'a>(
        &'a self,
        _client: &'a ServiceClient,
        server_id: &'a str,
    ) -> BackendFuture<'a, (), RackspaceError> {
        Box::pin(async move {
            self.state().deleted.push(server_id.to_owned());
            Ok(())
        })
    }
}
