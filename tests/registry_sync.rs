use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use stellar_console::models::{EndpointDescriptor, EndpointIdentity, HttpMethod, NetworkId};
use stellar_console::registry::{sync, RegistryCache, RegistryClient, RegistryMutation};
use stellar_console::RegistryError;

fn client(server: &MockServer) -> RegistryClient {
    RegistryClient::new(reqwest::Client::new(), server.url("/api"))
}

#[tokio::test]
async fn fetch_keeps_collection_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/testnet");
            then.status(200).json_body(json!({
                "Zeta": [{"method": "GET", "path": "/z", "description": "z"}],
                "Alpha": [{
                    "method": "POST",
                    "path": "/a",
                    "description": "a",
                    "requestBody": {"amount": 1}
                }]
            }));
        })
        .await;

    let registry = client(&server).fetch(NetworkId::Testnet).await.unwrap();
    mock.assert_async().await;

    let names: Vec<&str> = registry.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Zeta", "Alpha"]);
    assert_eq!(registry["Alpha"][0].request_body, Some(json!({"amount": 1})));
}

#[tokio::test]
async fn fetch_of_null_is_an_empty_registry() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/kipaji");
            then.status(200).body("null");
        })
        .await;

    let registry = client(&server).fetch(NetworkId::Kipaji).await.unwrap();
    assert!(registry.is_empty());
}

#[tokio::test]
async fn non_success_status_is_a_registry_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/public");
            then.status(503).body("maintenance");
        })
        .await;

    let err = client(&server).fetch(NetworkId::Public).await.unwrap_err();
    assert_eq!(
        err,
        RegistryError::Status {
            status: 503,
            body: "maintenance".to_string()
        }
    );
}

#[tokio::test]
async fn unreachable_registry_is_a_transport_error() {
    let client = RegistryClient::new(reqwest::Client::new(), "http://127.0.0.1:1/api");
    let err = client.fetch(NetworkId::Testnet).await.unwrap_err();
    assert!(matches!(err, RegistryError::Transport(_)));
}

#[tokio::test]
async fn upsert_then_refresh_sees_the_write() {
    let server = MockServer::start_async().await;
    let endpoint = EndpointDescriptor::new(HttpMethod::POST, "/payments", "Send payment")
        .with_body(json!({"to": "GABC"}));

    let write = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/endpoints/testnet/collections/Payments/endpoints")
                .json_body(json!({
                    "method": "POST",
                    "path": "/payments",
                    "description": "Send payment",
                    "requestBody": {"to": "GABC"}
                }));
            then.status(200);
        })
        .await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/testnet");
            then.status(200).json_body(json!({
                "Payments": [{
                    "method": "POST",
                    "path": "/payments",
                    "description": "Send payment",
                    "requestBody": {"to": "GABC"}
                }]
            }));
        })
        .await;

    let mutation = RegistryMutation::UpsertEndpoint {
        collection: "Payments".to_string(),
        endpoint: endpoint.clone(),
        replaces: None,
    };
    let registry = sync::apply(&client(&server), NetworkId::Testnet, &mutation)
        .await
        .unwrap();

    write.assert_async().await;
    read.assert_async().await;
    assert_eq!(registry["Payments"], vec![endpoint]);
}

#[tokio::test]
async fn delete_endpoint_sends_identity_body() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/endpoints/public/collections/Accounts/endpoints")
                .json_body(json!({"method": "GET", "path": "/accounts"}));
            then.status(204);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/public");
            then.status(200).json_body(json!({"Accounts": []}));
        })
        .await;

    let mutation = RegistryMutation::DeleteEndpoint {
        collection: "Accounts".to_string(),
        identity: EndpointIdentity {
            method: HttpMethod::GET,
            path: "/accounts".to_string(),
        },
    };
    let registry = sync::apply(&client(&server), NetworkId::Public, &mutation)
        .await
        .unwrap();

    delete.assert_async().await;
    assert!(registry["Accounts"].is_empty());
}

#[tokio::test]
async fn rename_onto_existing_collection_merges() {
    let server = MockServer::start_async().await;

    let mut cache = RegistryCache::new(NetworkId::Testnet);
    let mut seeded = stellar_console::CollectionRegistry::new();
    seeded.insert(
        "A".to_string(),
        vec![EndpointDescriptor::new(HttpMethod::GET, "/a", "a")],
    );
    seeded.insert(
        "B".to_string(),
        vec![EndpointDescriptor::new(HttpMethod::GET, "/b", "b")],
    );
    cache.replace(NetworkId::Testnet, seeded);

    let mutation = cache.plan_rename_collection("A", "B").unwrap();

    let put = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/endpoints/testnet/collections/B")
                .json_body(json!({"endpoints": [
                    {"method": "GET", "path": "/b", "description": "b"},
                    {"method": "GET", "path": "/a", "description": "a"}
                ]}));
            then.status(200);
        })
        .await;
    let remove = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/endpoints/testnet/collections/A");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/testnet");
            then.status(200).json_body(json!({"B": [
                {"method": "GET", "path": "/b", "description": "b"},
                {"method": "GET", "path": "/a", "description": "a"}
            ]}));
        })
        .await;

    let registry = sync::apply(&client(&server), NetworkId::Testnet, &mutation)
        .await
        .unwrap();
    put.assert_async().await;
    remove.assert_async().await;

    assert!(cache.replace(NetworkId::Testnet, registry));
    assert!(!cache.contains("A"));
    let paths: Vec<&str> = cache
        .endpoints("B")
        .unwrap()
        .iter()
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(paths, vec!["/b", "/a"]);
}

#[tokio::test]
async fn failed_write_skips_the_refresh() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/endpoints/testnet/collections/NewOne");
            then.status(500).body("boom");
        })
        .await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/testnet");
            then.status(200).json_body(json!({}));
        })
        .await;

    let mutation = RegistryMutation::CreateCollection {
        name: "NewOne".to_string(),
    };
    let err = sync::apply(&client(&server), NetworkId::Testnet, &mutation)
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::Status { status: 500, .. }));
    read.assert_hits_async(0).await;
}

#[tokio::test]
async fn create_collection_posts_empty_list() {
    let server = MockServer::start_async().await;
    let put = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/endpoints/kipaji/collections/MyTests")
                .json_body(json!({"endpoints": []}));
            then.status(201);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/kipaji");
            then.status(200).json_body(json!({"MyTests": []}));
        })
        .await;

    let cache = RegistryCache::new(NetworkId::Kipaji);
    let mutation = cache.plan_create_collection("My Tests").unwrap();
    let registry = sync::apply(&client(&server), NetworkId::Kipaji, &mutation)
        .await
        .unwrap();

    put.assert_async().await;
    assert!(registry.contains_key("MyTests"));
}

#[tokio::test]
async fn edit_with_new_path_removes_the_old_endpoint() {
    let server = MockServer::start_async().await;
    let write = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/endpoints/testnet/collections/Health/endpoints")
                .json_body(json!({"method": "GET", "path": "/health", "description": "Health"}));
            then.status(200);
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/endpoints/testnet/collections/Health/endpoints")
                .json_body(json!({"method": "GET", "path": "/ping"}));
            then.status(204);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/endpoints/testnet");
            then.status(200).json_body(json!({"Health": [
                {"method": "GET", "path": "/health", "description": "Health"}
            ]}));
        })
        .await;

    let mutation = RegistryMutation::UpsertEndpoint {
        collection: "Health".to_string(),
        endpoint: EndpointDescriptor::new(HttpMethod::GET, "/health", "Health"),
        replaces: Some(EndpointIdentity {
            method: HttpMethod::GET,
            path: "/ping".to_string(),
        }),
    };
    let registry = sync::apply(&client(&server), NetworkId::Testnet, &mutation)
        .await
        .unwrap();

    write.assert_async().await;
    delete.assert_async().await;
    assert_eq!(registry["Health"].len(), 1);
}
