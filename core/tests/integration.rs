//! End-to-end tests against the live mock backend.
//!
//! # Design
//! Starts the mock server on a random port, then drives every resource
//! client over real HTTP through `UreqTransport`. Validates that envelopes,
//! error shaping and payload decoding agree with an actual server.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ghar_core::{
    ApiClient, ApiError, ChangePassword, ClientConfig, MaintenanceFilter, MaintenanceStatus,
    NewComment, Payload, StaticToken, TechnicianAssignment, TokenStore,
};
use ghar_mock_server::Store;
use serde_json::json;

/// Serve `store` on a random local port from a background runtime.
fn spawn_server(store: Store) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            ghar_mock_server::run_with(listener, store).await
        })
        .unwrap();
    });

    addr
}

/// Answer exactly one request with a canned JSON body, bypassing the mock.
fn serve_raw_json(body: String) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut seen = Vec::new();
        let mut buf = [0u8; 1024];
        while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return;
            }
            seen.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(body.as_bytes()).unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::from_config(ClientConfig::with_base_url(&format!("http://{addr}/"))).unwrap()
}

#[test]
fn property_lifecycle() {
    let client = client_for(spawn_server(Store::new()));
    let properties = client.properties();

    // Step 1: nothing listed yet.
    assert!(properties.list().unwrap().is_empty());

    // Step 2: create; the server assigns the id.
    let created = properties
        .create(&json!({"title": "Sunrise Villa", "owner": "u1", "rent": 21000}))
        .unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.str_field("title"), Some("Sunrise Villa"));
    let id = created.id.clone();

    // Step 3: get and list agree with the create.
    assert_eq!(properties.get(&id).unwrap(), created);
    assert_eq!(properties.list().unwrap().len(), 1);
    assert_eq!(properties.list_by_owner("u1").unwrap().len(), 1);
    assert!(properties.list_by_owner("someone-else").unwrap().is_empty());

    // Step 4: full update keeps the id.
    let updated = properties
        .update(&id, &json!({"title": "Sunrise Villa", "owner": "u1", "rent": 23000}))
        .unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.get("rent"), Some(&json!(23000)));

    // Step 5: delete answers 204 and yields unit.
    properties.delete(&id).unwrap();

    // Step 6: the record is gone.
    let err = properties.get(&id).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Property not found");

    // Step 7: deleting again is a 404 as well.
    let err = properties.delete(&id).unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn maintenance_lifecycle() {
    let client = client_for(spawn_server(Store::new()));
    let maintenance = client.maintenance();

    // A tenant with no requests gets an empty list, not an error.
    assert!(maintenance
        .list_by_tenant("t1", &MaintenanceFilter::default())
        .unwrap()
        .is_empty());

    let created = maintenance
        .create(&json!({
            "title": "Leaking tap",
            "tenantId": "t1",
            "landlordId": "l1",
            "propertyId": "p1",
            "priority": "High",
        }))
        .unwrap();
    let id = created.id.clone();
    assert_eq!(created.str_field("status"), Some("Pending"));

    let updated = maintenance.update_status(&id, MaintenanceStatus::InProgress).unwrap();
    assert_eq!(updated.str_field("status"), Some("In Progress"));
    assert_eq!(updated.str_field("title"), Some("Leaking tap"));

    let commented = maintenance
        .add_comment(
            &id,
            &NewComment {
                text: "Plumber booked for Tuesday".into(),
                author: Some("landlord".into()),
            },
        )
        .unwrap();
    assert_eq!(commented.get("comments").and_then(|c| c.as_array()).map(Vec::len), Some(1));

    let assigned = maintenance
        .assign_technician(
            &id,
            &TechnicianAssignment {
                technician: "Ravi".into(),
                phone: None,
                scheduled_date: Some("2026-10-20".into()),
                notes: None,
            },
        )
        .unwrap();
    assert_eq!(assigned.str_field("technician"), Some("Ravi"));
    assert_eq!(assigned.str_field("status"), Some("In Progress"));

    let in_progress = MaintenanceFilter {
        status: Some(MaintenanceStatus::InProgress),
        ..MaintenanceFilter::default()
    };
    assert_eq!(maintenance.list_by_landlord("l1", &in_progress).unwrap().len(), 1);
    let completed = MaintenanceFilter {
        status: Some(MaintenanceStatus::Completed),
        ..MaintenanceFilter::default()
    };
    assert!(maintenance.list_by_landlord("l1", &completed).unwrap().is_empty());
    assert_eq!(maintenance.list_by_property("p1").unwrap().len(), 1);

    let stats = maintenance.stats("l1").unwrap();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["inProgress"], 1);

    let replaced = maintenance
        .update(&id, &json!({"title": "Leaking tap (kitchen)", "tenantId": "t1", "landlordId": "l1", "status": "Completed"}))
        .unwrap();
    assert_eq!(replaced.id, id);
    assert!(replaced.get("technician").is_none());

    maintenance.delete(&id).unwrap();
    assert!(maintenance.get(&id).unwrap_err().is_not_found());
}

#[test]
fn validation_message_is_surfaced_verbatim() {
    let client = client_for(spawn_server(Store::new()));
    let err = client.maintenance().create(&json!({"tenantId": "t1"})).unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Title is required");
    assert_eq!(err.body(), Some(&Payload::Json(json!({"message": "Title is required"}))));
}

#[test]
fn non_json_failure_body_becomes_the_message() {
    let client = client_for(spawn_server(Store::new()));
    let err = client
        .properties()
        .create("this is a JSON string, not an object")
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Request body must be a JSON object");

    // Bodies the server cannot parse are rejected with plain text.
    let request = client
        .build_request::<()>(
            ghar_core::HttpMethod::Post,
            &["properties"],
            None,
            None,
            &[],
        )
        .map(|mut request| {
            request.body = Some("{not json".to_string());
            request
        })
        .unwrap();
    let err = client.send(request).unwrap_err();
    let Some(Payload::Text(raw)) = err.body() else {
        panic!("expected a text body, got {err:?}");
    };
    assert!(err.status().is_some_and(|status| (400..500).contains(&status)));
    assert_eq!(&err.to_string(), raw);
}

#[test]
fn profile_uses_the_stored_token() {
    let store = Store::new().with_profile(json!({"name": "Asha", "email": "asha@example.com"}), "secret");
    let addr = spawn_server(store);
    let tokens = TokenStore::new();
    let client = client_for(addr).with_credentials(Arc::new(tokens.clone()));

    // No token: the request goes out unauthenticated and the server refuses it.
    let err = client.profile().get().unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Unauthorized");

    // Legacy key is honored until migrated.
    tokens.set(ghar_core::credentials::LEGACY_TOKEN_KEY, "legacy-token");
    assert_eq!(client.profile().get().unwrap().str_field("name"), Some("Asha"));
    assert!(tokens.migrate_legacy());

    let updated = client.profile().update(&json!({"phone": "98450 12345"})).unwrap();
    assert_eq!(updated.str_field("phone"), Some("98450 12345"));
    assert_eq!(updated.str_field("name"), Some("Asha"));

    let change = ChangePassword {
        email: "asha@example.com".into(),
        old_password: "wrong".into(),
        new_password: "n3w-secret".into(),
    };
    let err = client.profile().change_password(&change).unwrap_err();
    assert_eq!(err.to_string(), "Current password is incorrect");

    let change = ChangePassword {
        old_password: "secret".into(),
        ..change
    };
    let confirmation = client.profile().change_password(&change).unwrap();
    assert_eq!(confirmation["message"], "Password updated successfully");
}

#[test]
fn tenants_are_listed_and_counted() {
    let mut store = Store::new();
    let meera = store.insert_tenant(json!({"name": "Meera", "status": "active"}));
    store.insert_tenant(json!({"name": "Karan", "status": "inactive"}));
    let client = client_for(spawn_server(store))
        .with_credentials(Arc::new(StaticToken("landlord-token".into())));

    let tenants = client.tenants().list().unwrap();
    assert_eq!(tenants.len(), 2);

    let id = meera["id"].as_str().unwrap();
    assert_eq!(client.tenants().get(id).unwrap().str_field("name"), Some("Meera"));
    assert!(client.tenants().get("missing").unwrap_err().is_not_found());

    let stats = client.tenants().stats().unwrap();
    assert_eq!(stats["active"], 1);
    assert_eq!(stats["inactive"], 1);
}

#[test]
fn concurrent_calls_are_independent() {
    let client = client_for(spawn_server(Store::new()));
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let client = client.clone();
            std::thread::spawn(move || {
                client
                    .properties()
                    .create(&json!({"title": format!("Unit {n}"), "owner": "u1"}))
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(client.properties().list_by_owner("u1").unwrap().len(), 4);
}

#[test]
fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client_for(addr);

    let err = client.properties().list().unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
    assert_eq!(err.status(), None);
    assert_eq!(err.to_string(), ghar_core::error::NETWORK_ERROR_MESSAGE);
}

#[test]
fn large_success_body_is_decoded() {
    let notes = "x".repeat(11 * 1024 * 1024);
    let addr = serve_raw_json(format!(r#"[{{"id":"p1","notes":"{notes}"}}]"#));
    let client = client_for(addr);

    let properties = client.properties().list().unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].id, "p1");
    assert_eq!(properties[0].str_field("notes").map(str::len), Some(notes.len()));
}

#[test]
fn silent_server_hits_the_deadline() {
    // The kernel completes the handshake from the backlog; nobody ever answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ClientConfig::with_base_url(&format!("http://{addr}"))
        .with_timeout(Duration::from_millis(300));
    let client = ApiClient::from_config(config).unwrap();

    let err = client.properties().list().unwrap_err();
    assert!(err.is_timeout(), "expected a timeout, got {err:?}");
    assert!(!err.is_network());
    assert_eq!(err.status(), None);
    drop(listener);
}
