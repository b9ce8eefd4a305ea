//! Network listing: custom networks from the networking API merged with the
//! reserved public and private networks.

use tracing::debug;

use super::api::{ProviderApi, ServiceClient};
use super::error::RackspaceError;
use super::network::{NetworkCatalog, NetworkDescriptor};
use super::RackspaceClient;

impl<A: ProviderApi> RackspaceClient<A> {
    /// Lists every custom network, following pagination to the last page.
    ///
    /// Paging stops at a page without a `next` link, at an empty page, or
    /// when the provider hands back the link that was just requested. The
    /// listing is all-or-nothing: the first failing page discards the
    /// networks accumulated so far.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error of the first failing page.
    pub async fn fetch_custom_networks(
        &self,
        network: &ServiceClient,
    ) -> Result<Vec<NetworkDescriptor>, RackspaceError> {
        let mut networks = Vec::new();
        let mut next: Option<String> = None;
        loop {
            let page = self.api.list_networks_page(network, next.as_deref()).await?;
            debug!(count = page.networks.len(), "Received network listing page.");
            if page.networks.is_empty() {
                break;
            }
            networks.extend(page.networks);
            match page.next {
                Some(link) if next.as_deref() != Some(link.as_str()) => next = Some(link),
                _ => break,
            }
        }
        Ok(networks)
    }

    /// Builds a fresh catalog of custom and reserved networks.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`RackspaceClient::fetch_custom_networks`].
    pub async fn build_catalog(
        &self,
        network: &ServiceClient,
    ) -> Result<NetworkCatalog, RackspaceError> {
        let discovered = self.fetch_custom_networks(network).await?;
        Ok(NetworkCatalog::from_discovered(discovered))
    }
}
