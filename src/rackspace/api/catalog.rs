//! Service catalog returned by the identity service.

use serde::Deserialize;

use super::{Availability, EndpointOpts};
use crate::rackspace::error::RackspaceError;

/// Services the authenticated account can reach.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct ServiceCatalog {
    /// Catalog entries in the order the identity service listed them.
    pub services: Vec<CatalogService>,
}

/// One service in the catalog.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CatalogService {
    /// Service type (for example `compute` or `network`).
    #[serde(rename = "type")]
    pub service_type: String,
    /// Service name (for example `cloudServersOpenStack`).
    #[serde(default)]
    pub name: String,
    /// Regional endpoints of the service.
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

/// Regional endpoint of a catalog service.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct CatalogEndpoint {
    /// Region code; global services omit it.
    #[serde(default)]
    pub region: Option<String>,
    /// Public URL.
    #[serde(rename = "publicURL", default)]
    pub public_url: Option<String>,
    /// Internal URL.
    #[serde(rename = "internalURL", default)]
    pub internal_url: Option<String>,
    /// Administrative URL.
    #[serde(rename = "adminURL", default)]
    pub admin_url: Option<String>,
}

impl CatalogEndpoint {
    fn url_for(&self, availability: Availability) -> Option<&str> {
        match availability {
            Availability::Public => self.public_url.as_deref(),
            Availability::Internal => self.internal_url.as_deref(),
            Availability::Admin => self.admin_url.as_deref(),
        }
    }

    fn serves_region(&self, region: &str) -> bool {
        self.region
            .as_deref()
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(region))
    }
}

impl ServiceCatalog {
    /// Resolves the base URL of a service endpoint.
    ///
    /// Exactly one endpoint must match the service type, optional service
    /// name and region; its URL for the requested tier is returned without a
    /// trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`RackspaceError::EndpointNotFound`] when no endpoint or more
    /// than one endpoint matches, or when the match lacks a URL for the tier.
    pub fn locate(
        &self,
        service_type: &str,
        name: Option<&str>,
        opts: &EndpointOpts,
    ) -> Result<String, RackspaceError> {
        let not_found = || RackspaceError::EndpointNotFound {
            service: service_type.to_owned(),
            region: opts.region.clone(),
            availability: opts.availability.to_string(),
        };

        let mut matches = self
            .services
            .iter()
            .filter(|service| service.service_type == service_type)
            .filter(|service| name.is_none_or(|wanted| service.name == wanted))
            .flat_map(|service| service.endpoints.iter())
            .filter(|endpoint| endpoint.serves_region(&opts.region));

        let endpoint = matches.next().ok_or_else(not_found)?;
        if matches.next().is_some() {
            return Err(not_found());
        }

        endpoint
            .url_for(opts.availability)
            .map(|url| url.trim_end_matches('/').to_owned())
            .ok_or_else(not_found)
    }
}
