//! Unit tests for the HTTP wire layer.

use rstest::rstest;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use super::*;
use crate::rackspace::api::{IdentityEndpoint, NetworkAttachment};
use crate::rackspace::types::NetworkId;

/// Accepts one connection, records the raw request and answers with
/// `status` and a JSON `body`.
async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|err| panic!("bind listener: {err}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|err| panic!("listener addr: {err}"));
    let response = format!(
        "HTTP/1.1 {status} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let handle = tokio::spawn(async move {
        let (mut stream, _peer) = listener
            .accept()
            .await
            .unwrap_or_else(|err| panic!("accept: {err}"));
        let request = read_request(&mut stream).await;
        stream
            .write_all(response.as_bytes())
            .await
            .unwrap_or_else(|err| panic!("write response: {err}"));
        request
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let read = stream
            .read(&mut chunk)
            .await
            .unwrap_or_else(|err| panic!("read request: {err}"));
        if read == 0 {
            break;
        }
        buf.extend_from_slice(chunk.get(..read).unwrap_or_default());
        let Some(header_end) = buf
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|pos| pos + 4)
        else {
            continue;
        };
        let headers = String::from_utf8_lossy(buf.get(..header_end).unwrap_or_default())
            .to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + body_len {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn loopback_api() -> HttpProviderApi {
    HttpProviderApi {
        http: reqwest::Client::builder()
            .no_proxy()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|err| panic!("build http client: {err}")),
    }
}

fn auth_request(base: &str) -> AuthRequest {
    AuthRequest {
        username: String::from("rax-user"),
        api_key: String::from("rax-api-key"),
        identity: IdentityEndpoint::Custom(format!("{base}/v2.0/")),
        user_agent: String::from("rackspace-driver/v0.0.0"),
    }
}

fn service_client(base: &str) -> ServiceClient {
    ServiceClient {
        endpoint: format!("{base}/v2.0"),
        token: AuthToken::new("token-123"),
        user_agent: String::from("rackspace-driver/v0.0.0"),
    }
}

fn create_request(networks: &[&str], key_name: Option<&str>) -> CreateServerRequest {
    CreateServerRequest {
        name: String::from("rax-machine"),
        flavor_ref: String::from("general1-1"),
        image_ref: String::from("image-ref"),
        security_groups: Vec::new(),
        networks: networks
            .iter()
            .map(|id| NetworkAttachment {
                uuid: NetworkId::from(*id),
            })
            .collect(),
        key_name: key_name.map(str::to_owned),
    }
}

#[test]
fn auth_body_uses_api_key_credentials() {
    let body = AuthBody {
        auth: AuthCredentials {
            api_key_credentials: ApiKeyCredentials {
                username: "rax-user",
                api_key: "rax-api-key",
            },
        },
    };
    let value = serde_json::to_value(&body).unwrap_or_else(|err| panic!("serialise: {err}"));
    assert_eq!(
        value,
        json!({
            "auth": {
                "RAX-KSKEY:apiKeyCredentials": {
                    "username": "rax-user",
                    "apiKey": "rax-api-key"
                }
            }
        })
    );
}

#[test]
fn create_body_carries_every_field() {
    let body = CreateServerBody {
        server: ServerCreate {
            name: "rax-machine",
            flavor_ref: "general1-1",
            image_ref: "image-ref",
            security_groups: vec![NamedGroup { name: "default" }],
            networks: vec![NetworkUuid { uuid: "net-x" }],
            key_name: Some("deploy-key"),
        },
    };
    let value = serde_json::to_value(&body).unwrap_or_else(|err| panic!("serialise: {err}"));
    assert_eq!(
        value,
        json!({
            "server": {
                "name": "rax-machine",
                "flavorRef": "general1-1",
                "imageRef": "image-ref",
                "security_groups": [{"name": "default"}],
                "networks": [{"uuid": "net-x"}],
                "key_name": "deploy-key"
            }
        })
    );
}

#[test]
fn create_body_skips_empty_fields() {
    let body = CreateServerBody {
        server: ServerCreate {
            name: "rax-machine",
            flavor_ref: "general1-1",
            image_ref: "image-ref",
            security_groups: Vec::new(),
            networks: Vec::new(),
            key_name: None,
        },
    };
    let value = serde_json::to_value(&body).unwrap_or_else(|err| panic!("serialise: {err}"));
    assert_eq!(
        value,
        json!({
            "server": {
                "name": "rax-machine",
                "flavorRef": "general1-1",
                "imageRef": "image-ref"
            }
        })
    );
}

#[rstest]
#[case(&[("previous", "https://net/prev"), ("next", "https://net/next")], Some("https://net/next"))]
#[case(&[("previous", "https://net/prev")], None)]
#[case(&[], None)]
fn next_link_selects_next_relation(
    #[case] links: &[(&str, &str)],
    #[case] expected: Option<&str>,
) {
    let links = links
        .iter()
        .map(|(rel, href)| Link {
            href: (*href).to_owned(),
            rel: (*rel).to_owned(),
        })
        .collect();
    assert_eq!(next_link(links).as_deref(), expected);
}

#[test]
fn require_success_accepts_success_statuses() {
    assert_eq!(require_success(StatusCode::OK, b"", "listing"), Ok(()));
    assert_eq!(require_success(StatusCode::ACCEPTED, b"", "creation"), Ok(()));
}

#[test]
fn require_success_reports_status_and_body() {
    let err = require_success(
        StatusCode::INTERNAL_SERVER_ERROR,
        b"{\"computeFault\":{}}",
        "server detail",
    )
    .expect_err("server error");
    let RackspaceError::Transport { ref message } = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(message.starts_with("server detail returned 500"), "{message}");
    assert!(message.contains("computeFault"), "{message}");
}

#[rstest]
#[case(401)]
#[case(403)]
#[tokio::test]
async fn authentication_maps_rejection_statuses(#[case] status: u16) {
    let (base, server) = serve_once(status, "{\"unauthorized\":{\"code\":401}}").await;

    let err = loopback_api()
        .authenticate(&auth_request(&base))
        .await
        .expect_err("credentials rejected");
    server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    assert!(
        matches!(err, RackspaceError::Authentication { ref message } if message.contains("unauthorized")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn authentication_maps_other_failures_to_transport() {
    let (base, server) = serve_once(503, "{\"serviceUnavailable\":{}}").await;

    let err = loopback_api()
        .authenticate(&auth_request(&base))
        .await
        .expect_err("identity unavailable");
    server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    let RackspaceError::Transport { ref message } = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(message.contains("503"), "{message}");
    assert!(message.contains("serviceUnavailable"), "{message}");
}

#[tokio::test]
async fn authentication_decodes_token_and_catalog() {
    let response = json!({
        "access": {
            "token": {"id": "token-abc"},
            "serviceCatalog": [{
                "type": "network",
                "name": "cloudNetworks",
                "endpoints": [{"region": "IAD", "publicURL": "https://iad.networks.example.test/v2.0"}]
            }]
        }
    })
    .to_string();
    let (base, server) = serve_once(200, &response).await;

    let session = loopback_api()
        .authenticate(&auth_request(&base))
        .await
        .unwrap_or_else(|err| panic!("authenticate: {err}"));
    let request = server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    assert_eq!(session.token.expose(), "token-abc");
    assert_eq!(session.catalog.services.len(), 1);
    assert!(request.starts_with("POST /v2.0/tokens "), "{request}");
    assert!(
        request
            .to_ascii_lowercase()
            .contains("user-agent: rackspace-driver/v0.0.0"),
        "{request}"
    );
    assert!(request.contains("RAX-KSKEY:apiKeyCredentials"), "{request}");
    assert!(request.contains("\"apiKey\":\"rax-api-key\""), "{request}");
}

#[tokio::test]
async fn malformed_authentication_response_is_a_decode_error() {
    let (base, server) = serve_once(200, "{\"access\":{}}").await;

    let err = loopback_api()
        .authenticate(&auth_request(&base))
        .await
        .expect_err("missing token");
    server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    assert!(
        matches!(err, RackspaceError::Decode { ref context, .. } if context == "authentication response"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn listing_page_extracts_networks_and_next_link() {
    let response = json!({
        "networks": [{"id": "abc", "name": "custom-net"}],
        "networks_links": [{"rel": "next", "href": "https://iad.networks.example.test/v2.0/networks?marker=abc"}]
    })
    .to_string();
    let (base, server) = serve_once(200, &response).await;
    let client = service_client(&base);

    let page = loopback_api()
        .list_networks_page(&client, None)
        .await
        .unwrap_or_else(|err| panic!("listing: {err}"));
    let request = server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    assert_eq!(page.networks, [NetworkDescriptor::new("abc", "custom-net")]);
    assert_eq!(
        page.next.as_deref(),
        Some("https://iad.networks.example.test/v2.0/networks?marker=abc")
    );
    assert!(request.starts_with("GET /v2.0/networks "), "{request}");
    assert!(
        request.to_ascii_lowercase().contains("x-auth-token: token-123"),
        "{request}"
    );
}

#[tokio::test]
async fn create_posts_server_and_returns_identifier() {
    let (base, server) =
        serve_once(202, "{\"server\":{\"id\":\"srv-77\",\"adminPass\":\"x\"}}").await;
    let client = service_client(&base);

    let id = loopback_api()
        .create_server(&client, &create_request(&["net-x"], None))
        .await
        .unwrap_or_else(|err| panic!("create: {err}"));
    let request = server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    assert_eq!(id.as_str(), "srv-77");
    assert!(request.starts_with("POST /v2.0/servers "), "{request}");
    assert!(request.contains("\"networks\":[{\"uuid\":\"net-x\"}]"), "{request}");
    assert!(!request.contains("key_name"), "{request}");
}

#[tokio::test]
async fn create_failure_carries_status_and_body() {
    let (base, server) =
        serve_once(413, "{\"overLimit\":{\"message\":\"Quota exceeded\"}}").await;
    let client = service_client(&base);

    let err = loopback_api()
        .create_server(&client, &create_request(&[], Some("deploy-key")))
        .await
        .expect_err("quota exceeded");
    server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    let RackspaceError::Transport { ref message } = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(message.starts_with("server creation returned 413"), "{message}");
    assert!(message.contains("Quota exceeded"), "{message}");
}

#[tokio::test]
async fn server_detail_decodes_status_and_addresses() {
    let response = json!({
        "server": {
            "id": "srv-42",
            "name": "rax-machine",
            "status": "ACTIVE",
            "addresses": {"private": [{"version": 4, "addr": "10.176.0.9"}]}
        }
    })
    .to_string();
    let (base, server) = serve_once(200, &response).await;
    let client = service_client(&base);

    let detail = loopback_api()
        .server_detail(&client, "srv-42")
        .await
        .unwrap_or_else(|err| panic!("detail: {err}"));
    let request = server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    assert_eq!(detail.status, "ACTIVE");
    assert!(detail.addresses.contains_key("private"));
    assert!(request.starts_with("GET /v2.0/servers/srv-42 "), "{request}");
}
