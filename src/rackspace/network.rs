//! Network catalog and address resolution.
//!
//! Rackspace exposes two reserved networks on every account, `public` and
//! `private`, identified by fixed sentinel identifiers. Custom networks are
//! discovered through the networking API and precede the reserved pair in a
//! [`NetworkCatalog`], so lookups prefer a discovered entry when identifiers
//! collide.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::api::NetworkAttachment;
use super::error::RackspaceError;
use super::types::NetworkId;

/// Sentinel identifier of the reserved public network.
pub const PUBLIC_NETWORK_ID: &str = "00000000-0000-0000-0000-000000000000";
/// Name of the reserved public network.
pub const PUBLIC_NETWORK_NAME: &str = "public";
/// Sentinel identifier of the reserved private network.
pub const PRIVATE_NETWORK_ID: &str = "11111111-1111-1111-1111-111111111111";
/// Name of the reserved private network.
pub const PRIVATE_NETWORK_NAME: &str = "private";

/// A network known to the provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkDescriptor {
    /// Network identifier.
    pub id: NetworkId,
    /// Display name, which also keys the server's address collection.
    pub name: String,
}

impl NetworkDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(id: impl Into<NetworkId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The reserved public network.
    #[must_use]
    pub fn public() -> Self {
        Self::new(PUBLIC_NETWORK_ID, PUBLIC_NETWORK_NAME)
    }

    /// The reserved private network.
    #[must_use]
    pub fn private() -> Self {
        Self::new(PRIVATE_NETWORK_ID, PRIVATE_NETWORK_NAME)
    }
}

/// Returns `true` for the public and private sentinel identifiers.
#[must_use]
pub fn is_builtin_network(id: &str) -> bool {
    id == PUBLIC_NETWORK_ID || id == PRIVATE_NETWORK_ID
}

/// Computes the attachment list for a server that targets `requested`.
///
/// The reserved networks are always attached first; the requested network is
/// appended only when it is not one of them.
#[must_use]
pub fn server_networks(requested: &str) -> Vec<NetworkAttachment> {
    let mut attachments = vec![
        NetworkAttachment {
            uuid: NetworkId::from(PUBLIC_NETWORK_ID),
        },
        NetworkAttachment {
            uuid: NetworkId::from(PRIVATE_NETWORK_ID),
        },
    ];
    if !is_builtin_network(requested) {
        attachments.push(NetworkAttachment {
            uuid: NetworkId::from(requested),
        });
    }
    attachments
}

/// Address record as reported in a server's address collection.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct AddressRecord {
    /// IP version, 4 or 6.
    pub version: u8,
    /// Address literal.
    pub addr: String,
}

/// Ordered set of networks used to resolve identifiers.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NetworkCatalog {
    networks: Vec<NetworkDescriptor>,
}

impl NetworkCatalog {
    /// Builds a catalog from discovered networks, appending the reserved
    /// public and private networks after them.
    #[must_use]
    pub fn from_discovered(discovered: Vec<NetworkDescriptor>) -> Self {
        let mut networks = discovered;
        networks.push(NetworkDescriptor::public());
        networks.push(NetworkDescriptor::private());
        Self { networks }
    }

    /// Returns the catalog entries in lookup order.
    #[must_use]
    pub fn networks(&self) -> &[NetworkDescriptor] {
        &self.networks
    }

    /// Returns the name of the first network whose identifier matches.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceError::NetworkNotFound`] when no entry matches.
    pub fn resolve_name(&self, id: &str) -> Result<&str, RackspaceError> {
        self.networks
            .iter()
            .find(|network| network.id.as_str() == id)
            .map(|network| network.name.as_str())
            .ok_or_else(|| RackspaceError::NetworkNotFound {
                network_id: id.to_owned(),
            })
    }

    /// Resolves the IPv4 address a server holds on the identified network.
    ///
    /// A network missing from `addresses` has not been assigned an address
    /// yet and yields an empty string. When several IPv4 records are present
    /// the first one wins.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceError::NetworkNotFound`] when the identifier is not
    /// in the catalog and [`RackspaceError::Decode`] when the address records
    /// for the network are malformed.
    pub fn resolve_address(
        &self,
        id: &str,
        addresses: &BTreeMap<String, serde_json::Value>,
    ) -> Result<String, RackspaceError> {
        let name = self.resolve_name(id)?;
        let Some(raw) = addresses.get(name) else {
            return Ok(String::new());
        };

        let records = Vec::<AddressRecord>::deserialize(raw)
            .map_err(|err| RackspaceError::decode(format!("addresses for network {name}"), err))?;

        Ok(records
            .into_iter()
            .find(|record| record.version == 4)
            .map(|record| record.addr)
            .unwrap_or_default())
    }
}
