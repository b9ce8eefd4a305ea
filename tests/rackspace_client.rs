//! Behavioural tests for the Rackspace client driven through the public API
//! with a scripted provider.

use rackspace_driver::rackspace::network::{PRIVATE_NETWORK_ID, PUBLIC_NETWORK_ID};
use rackspace_driver::test_support::{
    SAMPLE_NETWORK_URL, SCRIPTED_SERVER_ID, ScriptedProvider, sample_driver_config,
};
use rackspace_driver::{
    AddressType, ComputeClient, DriverConfig, IpAddress, RackspaceClient, RackspaceError,
};
use serde_json::json;

fn config(network_id: Option<&str>, machine_id: Option<&str>) -> DriverConfig {
    sample_driver_config(network_id, machine_id).expect("valid config")
}

#[tokio::test]
async fn create_then_inspect_server_on_custom_network() {
    let provider = ScriptedProvider::new();
    provider.push_network_page(&[("abc", "custom-net")], Some("page-2"));
    provider.push_network_page(&[("def", "backend-net")], None);
    provider.set_addresses(&json!({
        "public": [{"version": 4, "addr": "198.51.100.7"}],
        "custom-net": [{"version": 4, "addr": "10.0.0.5"}]
    }));
    let client = RackspaceClient::new(provider.clone());

    let server_id = client
        .create_instance(&config(Some("abc"), None))
        .await
        .expect("created");
    assert_eq!(server_id, SCRIPTED_SERVER_ID);

    let addresses = client
        .get_instance_ip_addresses(&config(Some("abc"), Some(&server_id)))
        .await
        .expect("addresses");
    assert_eq!(
        addresses,
        [IpAddress {
            network: String::from("custom-net"),
            address: String::from("10.0.0.5"),
            address_type: AddressType::Fixed,
        }]
    );
    assert_eq!(
        provider.page_requests(),
        [None, Some(String::from("page-2"))]
    );
    assert_eq!(provider.auth_requests().len(), 1);
}

#[tokio::test]
async fn public_network_address_resolves_without_listing_entries() {
    let provider = ScriptedProvider::new();
    provider.set_addresses(&json!({
        "public": [
            {"version": 6, "addr": "2001:db8::7"},
            {"version": 4, "addr": "198.51.100.7"}
        ]
    }));
    let client = RackspaceClient::new(provider);

    let addresses = client
        .get_instance_ip_addresses(&config(Some(PUBLIC_NETWORK_ID), Some("srv-42")))
        .await
        .expect("addresses");
    let [address] = addresses.as_slice() else {
        panic!("expected one address, got {addresses:?}");
    };
    assert_eq!(address.network, "public");
    assert_eq!(address.address, "198.51.100.7");
}

#[tokio::test]
async fn unassigned_address_is_reported_as_empty() {
    let provider = ScriptedProvider::new();
    let client = RackspaceClient::new(provider);

    let addresses = client
        .get_instance_ip_addresses(&config(Some(PRIVATE_NETWORK_ID), Some("srv-42")))
        .await
        .expect("addresses");
    let [address] = addresses.as_slice() else {
        panic!("expected one address, got {addresses:?}");
    };
    assert_eq!(address.network, "private");
    assert!(address.address.is_empty());
}

#[tokio::test]
async fn listing_failure_surfaces_and_next_call_retries() {
    let provider = ScriptedProvider::new();
    provider.push_network_page(&[("abc", "custom-net")], Some("page-2"));
    provider.push_network_failure(RackspaceError::Transport {
        message: String::from("connection reset"),
    });
    let client = RackspaceClient::new(provider.clone());
    let cfg = config(Some("abc"), Some("srv-42"));

    let err = client
        .get_instance_ip_addresses(&cfg)
        .await
        .expect_err("listing fails");
    assert!(matches!(err, RackspaceError::Transport { .. }));

    provider.push_network_page(&[("abc", "custom-net")], None);
    let addresses = client
        .get_instance_ip_addresses(&cfg)
        .await
        .expect("retry succeeds");
    assert_eq!(
        addresses.first().map(|address| address.network.as_str()),
        Some("custom-net")
    );
}

#[tokio::test]
async fn network_client_is_built_once_per_client() {
    let provider = ScriptedProvider::new();
    let client = RackspaceClient::new(provider.clone());
    let cfg = config(None, None);

    let err = client
        .init_network_client(&cfg)
        .await
        .expect_err("session not yet authenticated");
    assert_eq!(err, RackspaceError::NotAuthenticated);

    client.authenticate(&cfg).await.expect("auth");
    let first = client
        .init_network_client(&cfg)
        .await
        .expect("network client")
        .clone();
    let second = client
        .init_network_client(&cfg)
        .await
        .expect("network client");

    assert_eq!(&first, second);
    assert_eq!(first.endpoint, SAMPLE_NETWORK_URL);
    assert_eq!(provider.network_client_calls(), 1);
    assert_eq!(provider.auth_requests().len(), 1);
}

#[tokio::test]
async fn missing_region_endpoint_is_reported() {
    let provider = ScriptedProvider::new();
    let client = RackspaceClient::new(provider);
    let cfg = DriverConfig {
        region: String::from("SYD"),
        ..config(None, Some("srv-42"))
    };

    let err = client
        .get_instance_state(&cfg)
        .await
        .expect_err("no SYD endpoint");
    assert_eq!(
        err,
        RackspaceError::EndpointNotFound {
            service: String::from("compute"),
            region: String::from("SYD"),
            availability: String::from("public"),
        }
    );
}
