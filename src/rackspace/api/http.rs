//! `reqwest` implementation of [`ProviderApi`] against the Rackspace identity,
//! networking and next-generation compute APIs.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    AuthRequest, AuthToken, CatalogService, CreateServerRequest, NetworkPage, ProviderApi,
    ProviderSession, ServerDetail, ServiceCatalog, ServiceClient,
};
use crate::backend::BackendFuture;
use crate::rackspace::error::RackspaceError;
use crate::rackspace::network::NetworkDescriptor;
use crate::rackspace::types::ServerId;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Provider API backed by HTTPS calls.
#[derive(Clone, Debug)]
pub struct HttpProviderApi {
    http: reqwest::Client,
}

impl Default for HttpProviderApi {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProviderApi {
    /// Creates a client with the default request timeout.
    #[must_use]
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }

    fn authorised(
        &self,
        method: reqwest::Method,
        client: &ServiceClient,
        url: &str,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(USER_AGENT, &client.user_agent)
            .header(AUTH_TOKEN_HEADER, client.token.expose())
    }
}

#[derive(Serialize)]
struct AuthBody<'a> {
    auth: AuthCredentials<'a>,
}

#[derive(Serialize)]
struct AuthCredentials<'a> {
    #[serde(rename = "RAX-KSKEY:apiKeyCredentials")]
    api_key_credentials: ApiKeyCredentials<'a>,
}

#[derive(Serialize)]
struct ApiKeyCredentials<'a> {
    username: &'a str,
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: TokenBody,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogService>,
}

#[derive(Deserialize)]
struct TokenBody {
    id: String,
}

#[derive(Deserialize)]
struct NetworksResponse {
    networks: Vec<NetworkEntry>,
    #[serde(default)]
    networks_links: Vec<Link>,
}

#[derive(Deserialize)]
struct NetworkEntry {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Serialize)]
struct CreateServerBody<'a> {
    server: ServerCreate<'a>,
}

#[derive(Serialize)]
struct ServerCreate<'a> {
    name: &'a str,
    #[serde(rename = "flavorRef")]
    flavor_ref: &'a str,
    #[serde(rename = "imageRef")]
    image_ref: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    security_groups: Vec<NamedGroup<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    networks: Vec<NetworkUuid<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<&'a str>,
}

#[derive(Serialize)]
struct NamedGroup<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct NetworkUuid<'a> {
    uuid: &'a str,
}

#[derive(Deserialize)]
struct CreateServerResponse {
    server: CreatedServer,
}

#[derive(Deserialize)]
struct CreatedServer {
    id: String,
}

#[derive(Deserialize)]
struct ServerDetailResponse {
    server: ServerDetail,
}

async fn send(
    request: reqwest::RequestBuilder,
    context: &str,
) -> Result<(StatusCode, Vec<u8>), RackspaceError> {
    let response = request
        .send()
        .await
        .map_err(|err| RackspaceError::transport(format!("{context}: {err}")))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| RackspaceError::transport(format!("{context}: {err}")))?;
    Ok((status, body.to_vec()))
}

fn require_success(status: StatusCode, body: &[u8], context: &str) -> Result<(), RackspaceError> {
    if status.is_success() {
        return Ok(());
    }
    Err(RackspaceError::Transport {
        message: format!(
            "{context} returned {status}: {}",
            String::from_utf8_lossy(body)
        ),
    })
}

fn next_link(links: Vec<Link>) -> Option<String> {
    links
        .into_iter()
        .find(|link| link.rel == "next")
        .map(|link| link.href)
}

impl ProviderApi for HttpProviderApi {
    fn authenticate<'a>(
        &'a self,
        request: &'a AuthRequest,
    ) -> BackendFuture<'a, ProviderSession, RackspaceError> {
        Box::pin(async move {
            let url = format!("{}/tokens", request.identity.url().trim_end_matches('/'));
            let payload = AuthBody {
                auth: AuthCredentials {
                    api_key_credentials: ApiKeyCredentials {
                        username: &request.username,
                        api_key: &request.api_key,
                    },
                },
            };
            let (status, body) = send(
                self.http
                    .post(&url)
                    .header(USER_AGENT, &request.user_agent)
                    .json(&payload),
                "authentication",
            )
            .await?;

            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                return Err(RackspaceError::Authentication {
                    message: String::from_utf8_lossy(&body).into_owned(),
                });
            }
            require_success(status, &body, "authentication")?;

            let parsed: AuthResponse = serde_json::from_slice(&body)
                .map_err(|err| RackspaceError::decode("authentication response", err))?;
            Ok(ProviderSession {
                token: AuthToken::new(parsed.access.token.id),
                catalog: ServiceCatalog {
                    services: parsed.access.service_catalog,
                },
                user_agent: request.user_agent.clone(),
            })
        })
    }

    fn list_networks_page<'a>(
        &'a self,
        client: &'a ServiceClient,
        next: Option<&'a str>,
    ) -> BackendFuture<'a, NetworkPage, RackspaceError> {
        Box::pin(async move {
            let url = next.map_or_else(|| client.url("networks"), str::to_owned);
            debug!(url = %url, "Fetching network listing page.");
            let (status, body) = send(
                self.authorised(reqwest::Method::GET, client, &url),
                "network listing",
            )
            .await?;
            require_success(status, &body, "network listing")?;

            let parsed: NetworksResponse = serde_json::from_slice(&body)
                .map_err(|err| RackspaceError::decode("network listing page", err))?;
            Ok(NetworkPage {
                networks: parsed
                    .networks
                    .into_iter()
                    .map(|entry| NetworkDescriptor::new(entry.id, entry.name))
                    .collect(),
                next: next_link(parsed.networks_links),
            })
        })
    }

    fn create_server<'a>(
        &'a self,
        client: &'a ServiceClient,
        request: &'a CreateServerRequest,
    ) -> BackendFuture<'a, ServerId, RackspaceError> {
        Box::pin(async move {
            let payload = CreateServerBody {
                server: ServerCreate {
                    name: &request.name,
                    flavor_ref: &request.flavor_ref,
                    image_ref: &request.image_ref,
                    security_groups: request
                        .security_groups
                        .iter()
                        .map(|name| NamedGroup { name })
                        .collect(),
                    networks: request
                        .networks
                        .iter()
                        .map(|attachment| NetworkUuid {
                            uuid: attachment.uuid.as_str(),
                        })
                        .collect(),
                    key_name: request.key_name.as_deref(),
                },
            };
            let url = client.url("servers");
            let (status, body) = send(
                self.authorised(reqwest::Method::POST, client, &url)
                    .json(&payload),
                "server creation",
            )
            .await?;
            require_success(status, &body, "server creation")?;

            let parsed: CreateServerResponse = serde_json::from_slice(&body)
                .map_err(|err| RackspaceError::decode("server creation response", err))?;
            Ok(ServerId::from(parsed.server.id))
        })
    }

    fn server_detail<'a>(
        &'a self,
        client: &'a ServiceClient,
        server_id: &'a str,
    ) -> BackendFuture<'a, ServerDetail, RackspaceError> {
        Box::pin(async move {
            let url = client.url(&format!("servers/{server_id}"));
            let (status, body) = send(
                self.authorised(reqwest::Method::GET, client, &url),
                "server detail",
            )
            .await?;
            require_success(status, &body, "server detail")?;

            let parsed: ServerDetailResponse = serde_json::from_slice(&body)
                .map_err(|err| RackspaceError::decode("server detail", err))?;
            Ok(parsed.server)
        })
    }

    fn delete_server<'a>(
        &'a self,
        client: &'a ServiceClient,
        server_id: &'a str,
    ) -> BackendFuture<'a, (), RackspaceError> {
        Box::pin(async move {
            let url = client.url(&format!("servers/{server_id}"));
            let (status, body) = send(
                self.authorised(reqwest::Method::DELETE, client, &url),
                "server deletion",
            )
            .await?;
            require_success(status, &body, "server deletion")
        })
    }
}

#[cfg(test)]
mod tests;
