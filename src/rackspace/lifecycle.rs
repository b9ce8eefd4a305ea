//! Instance creation and address reporting.

use tracing::info;

use super::api::{CreateServerRequest, ProviderApi, ServiceClient};
use super::error::RackspaceError;
use super::network::server_networks;
use super::types::ServerId;
use super::RackspaceClient;
use crate::backend::{AddressType, DriverConfig, IpAddress};

impl<A: ProviderApi> RackspaceClient<A> {
    /// Translates the driver configuration into a provider creation request.
    ///
    /// Network attachments are only listed when a target network was
    /// requested; otherwise the provider's default attachments apply.
    #[must_use]
    pub fn server_request(config: &DriverConfig) -> CreateServerRequest {
        CreateServerRequest {
            name: config.machine_name.clone(),
            flavor_ref: config.flavor_id.clone(),
            image_ref: config.image_id.clone(),
            security_groups: config.security_groups.clone(),
            networks: config.target_network().map(server_networks).unwrap_or_default(),
            key_name: config.key_pair_name.clone(),
        }
    }

    pub(in crate::rackspace) async fn create_server(
        &self,
        compute: &ServiceClient,
        config: &DriverConfig,
    ) -> Result<ServerId, RackspaceError> {
        let request = Self::server_request(config);
        info!(
            name = %request.name,
            flavor = %request.flavor_ref,
            image = %request.image_ref,
            "Creating machine..."
        );
        self.api.create_server(compute, &request).await
    }

    pub(in crate::rackspace) async fn instance_addresses(
        &self,
        compute: &ServiceClient,
        config: &DriverConfig,
        machine_id: &str,
    ) -> Result<Vec<IpAddress>, RackspaceError> {
        let server = self.api.server_detail(compute, machine_id).await?;
        let network = self.init_network_client(config).await?;
        let catalog = self.build_catalog(network).await?;

        let network_id = config.target_network().unwrap_or_default();
        let name = catalog.resolve_name(network_id)?.to_owned();
        let address = catalog.resolve_address(network_id, &server.addresses)?;

        Ok(vec![IpAddress {
            network: name,
            address,
            address_type: AddressType::Fixed,
        }])
    }
}
