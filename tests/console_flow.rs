use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_json::json;

use stellar_console::app::{ConsolePhase, ConsoleState};
use stellar_console::models::{
    CollectionRegistry, EndpointDescriptor, ExchangeKind, HttpMethod, NetworkId, ResponsePayload,
    ResponseRecord,
};
use stellar_console::{NetworkCommand, NetworkResponse};

fn health_registry() -> CollectionRegistry {
    let mut registry = CollectionRegistry::new();
    registry.insert(
        "Health".to_string(),
        vec![
            EndpointDescriptor::new(HttpMethod::GET, "/ping", "Ping"),
            EndpointDescriptor::new(HttpMethod::POST, "/echo", "Echo")
                .with_body(json!({"message": "hi"})),
            EndpointDescriptor::new(HttpMethod::PUT, "/blank", "No sample"),
        ],
    );
    registry
}

fn state_with_registry() -> ConsoleState {
    let mut state = ConsoleState::new(NetworkId::Testnet);
    state
        .environments
        .set_variable(NetworkId::Testnet, "BASE_URL", "https://x/testnet");
    state.handle_response(NetworkResponse::RegistryLoaded {
        id: 0,
        network: NetworkId::Testnet,
        registry: health_registry(),
    });
    state
}

fn endpoint(state: &ConsoleState, path: &str) -> EndpointDescriptor {
    state
        .registry
        .endpoints("Health")
        .and_then(|eps| eps.iter().find(|e| e.path == path))
        .cloned()
        .unwrap()
}

fn send(state: &mut ConsoleState) -> u64 {
    match state.send_request() {
        Some(NetworkCommand::ExecuteRequest { id, .. }) => id,
        other => panic!("expected ExecuteRequest, got {:?}", other),
    }
}

fn ok(body: &str) -> ResponseRecord {
    ResponseRecord::http(200, body, IndexMap::new(), 5)
}

#[test]
fn selection_seeds_body_buffer() {
    let mut state = state_with_registry();

    let echo = endpoint(&state, "/echo");
    state.select_endpoint("Health", echo);
    assert_eq!(
        state.pending.as_ref().unwrap().body,
        "{\n  \"message\": \"hi\"\n}"
    );

    let blank = endpoint(&state, "/blank");
    state.select_endpoint("Health", blank);
    assert_eq!(state.pending.as_ref().unwrap().body, "{}");
}

#[test]
fn ping_round_trip_is_recorded() {
    let mut state = state_with_registry();
    assert_eq!(state.phase(), ConsolePhase::Idle);

    let ping = endpoint(&state, "/ping");
    state.select_endpoint("Health", ping);
    assert_eq!(state.phase(), ConsolePhase::Viewing);

    let request = match state.send_request() {
        Some(NetworkCommand::ExecuteRequest { id, request }) => {
            assert_eq!(request.url, "https://x/testnet/ping");
            assert!(request.body.is_none());
            (id, request)
        }
        other => panic!("expected ExecuteRequest, got {:?}", other),
    };
    assert_eq!(state.phase(), ConsolePhase::Sending);

    state.handle_response(NetworkResponse::RequestCompleted {
        id: request.0,
        record: ok(r#"{"ok":true}"#),
    });

    assert_eq!(state.phase(), ConsolePhase::Viewing);
    let record = state.response.as_ref().unwrap();
    assert_eq!(record.status, 200);
    assert_eq!(record.payload, ResponsePayload::Body(json!({"ok": true})));

    let history = state.history.list();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].method, HttpMethod::GET);
    assert_eq!(history[0].path, "/ping");
    assert_eq!(history[0].network, NetworkId::Testnet);
}

#[test]
fn invalid_body_is_a_preflight_failure_without_history() {
    let mut state = state_with_registry();
    let echo = endpoint(&state, "/echo");
    state.select_endpoint("Health", echo);
    state.pending.as_mut().unwrap().body = "{not json".to_string();

    assert!(state.send_request().is_none());

    let record = state.response.as_ref().unwrap();
    assert_eq!(record.status, 500);
    assert_eq!(record.kind, ExchangeKind::Preflight);
    assert!(record.payload.pretty().starts_with("Invalid JSON body"));
    assert!(state.history.is_empty());
    assert_eq!(state.phase(), ConsolePhase::Viewing);
}

#[test]
fn transport_failure_is_recorded() {
    let mut state = state_with_registry();
    let ping = endpoint(&state, "/ping");
    state.select_endpoint("Health", ping);
    let id = send(&mut state);

    state.handle_response(NetworkResponse::RequestCompleted {
        id,
        record: ResponseRecord::transport_failure(30_000),
    });

    let record = state.response.as_ref().unwrap();
    assert_eq!(record.status, 0);
    assert_eq!(record.payload.pretty(), "No response received from server");
    assert!(record.headers.is_empty());
    assert_eq!(state.history.len(), 1);
}

#[test]
fn history_keeps_the_ten_newest() {
    let mut state = state_with_registry();
    let paths: Vec<String> = (1..=11).map(|i| format!("/call/{}", i)).collect();

    for path in &paths {
        state.select_endpoint(
            "Health",
            EndpointDescriptor::new(HttpMethod::GET, path.clone(), "call"),
        );
        let id = send(&mut state);
        state.handle_response(NetworkResponse::RequestCompleted {
            id,
            record: ok("{}"),
        });
    }

    let history = state.history.list();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].path, "/call/11");
    assert!(history.iter().all(|e| e.path != "/call/1"));
}

#[test]
fn network_switch_discards_late_result() {
    let mut state = state_with_registry();
    let ping = endpoint(&state, "/ping");
    state.select_endpoint("Health", ping);
    let id = send(&mut state);

    let cmd = state.switch_network(NetworkId::Public);
    assert!(matches!(
        cmd,
        Some(NetworkCommand::RefreshRegistry { network: NetworkId::Public, .. })
    ));
    assert!(state.response.is_none());
    assert_eq!(state.phase(), ConsolePhase::Idle);
    assert!(state.registry.collections().is_empty());

    state.handle_response(NetworkResponse::RequestCompleted {
        id,
        record: ok(r#"{"late":true}"#),
    });
    assert!(state.response.is_none());
    assert_eq!(state.network, NetworkId::Public);
}

#[test]
fn registry_for_previous_network_is_ignored() {
    let mut state = state_with_registry();
    state.switch_network(NetworkId::Kipaji);

    let mut stale = CollectionRegistry::new();
    stale.insert("Old".to_string(), Vec::new());
    state.handle_response(NetworkResponse::RegistryLoaded {
        id: 99,
        network: NetworkId::Testnet,
        registry: stale,
    });
    assert!(!state.registry.contains("Old"));
}

#[test]
fn replay_restores_method_path_and_body() {
    let mut state = state_with_registry();
    let echo = endpoint(&state, "/echo");
    state.select_endpoint("Health", echo);
    state.pending.as_mut().unwrap().body = r#"{"message":"replayed"}"#.to_string();
    let id = send(&mut state);
    state.handle_response(NetworkResponse::RequestCompleted {
        id,
        record: ok("{}"),
    });

    state.switch_network(NetworkId::Public);
    let cmd = state.replay_history(0);
    assert!(matches!(
        cmd,
        Some(NetworkCommand::RefreshRegistry { network: NetworkId::Testnet, .. })
    ));

    let pending = state.pending.as_ref().unwrap();
    assert_eq!(state.network, NetworkId::Testnet);
    assert_eq!(pending.endpoint.method, HttpMethod::POST);
    assert_eq!(pending.endpoint.path, "/echo");
    assert_eq!(pending.body, r#"{"message":"replayed"}"#);
    assert!(state.response.is_none());
}

#[test]
fn cross_network_replay_finds_its_collection_after_refresh() {
    let mut state = state_with_registry();
    let echo = endpoint(&state, "/echo");
    state.select_endpoint("Health", echo);
    state.pending.as_mut().unwrap().body = r#"{"message":"again"}"#.to_string();
    let id = send(&mut state);
    state.handle_response(NetworkResponse::RequestCompleted {
        id,
        record: ok("{}"),
    });

    state.switch_network(NetworkId::Kipaji);
    let refresh_id = match state.replay_history(0) {
        Some(NetworkCommand::RefreshRegistry { id, network }) => {
            assert_eq!(network, NetworkId::Testnet);
            id
        }
        other => panic!("expected RefreshRegistry, got {:?}", other),
    };
    assert_eq!(state.pending.as_ref().unwrap().group, "History");

    state.handle_response(NetworkResponse::RegistryLoaded {
        id: refresh_id,
        network: NetworkId::Testnet,
        registry: health_registry(),
    });

    let pending = state.pending.as_ref().unwrap();
    assert_eq!(pending.group, "Health");
    assert_eq!(pending.endpoint.description, "Echo");
    assert_eq!(pending.body, r#"{"message":"again"}"#);
}
