// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use agentstore_core::domain::lifecycle::LifecycleCommand;
use agentstore_core::domain::listing::{ListingId, ListingStatus};
use agentstore_core::domain::repository::{ApiError, MarketplaceApi};
use agentstore_core::domain::session::{Session, SessionStore};
use agentstore_core::domain::support::NewSubscription;
use agentstore_core::domain::user::Role;
use agentstore_core::infrastructure::session_store::InMemorySessionStore;
use agentstore_sdk::MarketplaceClient;
use mockito::Matcher;
use serde_json::json;

fn logged_in() -> Arc<InMemorySessionStore> {
    Arc::new(InMemorySessionStore::with_session(Session::new(
        "tok-123",
        Role::Admin,
        Some("admin-1".to_string()),
    )))
}

fn client(url: &str, session: Arc<InMemorySessionStore>) -> MarketplaceClient {
    MarketplaceClient::new(url, Duration::from_secs(5), session).unwrap()
}

#[tokio::test]
async fn test_list_sends_bearer_and_decodes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/agents")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "_id": "a1", "name": "Echo", "status": "active", "reviewStatus": "Approved" },
                { "_id": "a2", "name": "Draft bot", "status": "Draft", "pricing": "Free" }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let listings = client(&server.url(), logged_in()).list_listings().await.unwrap();
    mock.assert_async().await;
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].status, Some(ListingStatus::Live));
    assert_eq!(listings[1].id, ListingId::from("a2"));
}

#[tokio::test]
async fn test_no_session_sends_no_auth_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/agents")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"data":[]}"#)
        .create_async()
        .await;

    let listings = client(&server.url(), Arc::new(InMemorySessionStore::new()))
        .list_listings()
        .await
        .unwrap();
    mock.assert_async().await;
    assert!(listings.is_empty());
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/admin/stats")
        .with_status(401)
        .with_body(r#"{"message":"jwt expired"}"#)
        .create_async()
        .await;

    let session = logged_in();
    let err = client(&server.url(), session.clone()).admin_stats().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(session.load().is_none());
}

#[tokio::test]
async fn test_business_rule_message_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/agents/a1")
        .with_status(403)
        .with_body(r#"{"message":"cannot delete non-owned app"}"#)
        .create_async()
        .await;

    let err = client(&server.url(), logged_in())
        .execute(&ListingId::from("a1"), &LifecycleCommand::RequestDeletion)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 403,
            message: "cannot delete non-owned app".to_string()
        }
    );
    assert!(!err.is_unavailable());
}

#[tokio::test]
async fn test_not_found_and_server_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/agents/missing")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/reports")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let client = client(&server.url(), logged_in());
    assert!(matches!(
        client.get_listing(&ListingId::from("missing")).await,
        Err(ApiError::NotFound(_))
    ));

    let err = client.list_reports().await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_reject_posts_reason() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/agents/reject/a1")
        .match_body(Matcher::Json(json!({ "reason": "Missing privacy policy" })))
        .with_status(200)
        .with_body(r#"{"message":"rejected"}"#)
        .create_async()
        .await;

    client(&server.url(), logged_in())
        .execute(
            &ListingId::from("a1"),
            &LifecycleCommand::Reject {
                reason: "Missing privacy policy".to_string(),
            },
        )
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_subscribe_and_block_bodies() {
    let mut server = mockito::Server::new_async().await;
    let purchase = server
        .mock("POST", "/purchases")
        .match_body(Matcher::Json(json!({ "agentId": "a1", "plan": "Pro" })))
        .with_status(201)
        .with_body(r#"{"_id":"p1","agentId":"a1","plan":"Pro"}"#)
        .create_async()
        .await;
    let block = server
        .mock("PUT", "/user/u1/block")
        .match_body(Matcher::Json(json!({ "isBlocked": true })))
        .with_status(200)
        .create_async()
        .await;

    let client = client(&server.url(), logged_in());
    let subscription = client
        .subscribe(&NewSubscription {
            agent_id: ListingId::from("a1"),
            plan: Some("Pro".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(subscription.id, "p1");
    client.set_user_blocked("u1", true).await.unwrap();

    purchase.assert_async().await;
    block.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/user/all")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let err = client(&server.url(), logged_in()).list_users().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unrecognised_status_does_not_break_the_list() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/agents")
        .with_status(200)
        .with_body(
            json!({ "data": [
                { "_id": "a1", "name": "Echo", "status": "Live" },
                { "_id": "a2", "name": "Queued", "status": "Pending Review" }
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let listings = client(&server.url(), logged_in()).list_listings().await.unwrap();
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[1].status, Some(ListingStatus::Unknown));
    assert!(!listings[1].is_publicly_visible(true));
}

#[tokio::test]
async fn test_decode_error_describes_the_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/agents")
        .with_status(200)
        .with_body(json!([{ "_id": "a1", "name": "Echo", "pricing": "Premium" }]).to_string())
        .create_async()
        .await;

    let err = client(&server.url(), logged_in()).list_listings().await.unwrap_err();
    match err {
        ApiError::Decode(message) => assert!(message.contains("Premium"), "{message}"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_backend_times_out_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let slow = server
        .mock("GET", "/admin/stats")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_secs(3));
            w.write_all(b"{}")
        })
        .expect(1)
        .create_async()
        .await;

    let client = MarketplaceClient::new(server.url(), Duration::from_secs(1), logged_in()).unwrap();
    let err = client.admin_stats().await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
    assert!(err.is_unavailable());
    slow.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // port 9 (discard) is not expected to accept HTTP connections
    let err = client("http://127.0.0.1:9", logged_in())
        .list_notifications()
        .await
        .unwrap_err();
    assert!(err.is_unavailable());
}
