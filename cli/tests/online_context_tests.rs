// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::path::Path;

use agentstore_cli::context::AppContext;
use agentstore_core::application::BrowseQuery;
use agentstore_core::domain::client_config::ClientConfigManifest;
use agentstore_core::domain::fetch::{DegradedSource, Fetched};
use agentstore_core::domain::listing::ListingId;
use agentstore_core::domain::session::{Session, SessionStore};
use agentstore_core::domain::user::Role;
use serde_json::json;

fn online_config(url: &str, dir: &Path, snapshot: Option<serde_json::Value>) -> ClientConfigManifest {
    let mut config = ClientConfigManifest::default();
    config.spec.api.base_url = url.to_string();
    config.spec.api.timeout_seconds = 5;
    config.spec.session.path = Some(dir.join("session.json"));
    if let Some(snapshot) = snapshot {
        let path = dir.join("snapshot.json");
        std::fs::write(&path, snapshot.to_string()).unwrap();
        config.spec.fallback.snapshot_path = Some(path);
    }
    config
}

#[tokio::test]
async fn test_unreachable_backend_serves_snapshot_listings() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/agents")
        .with_status(503)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let snapshot = json!({
        "listings": [
            { "id": "a1", "name": "Echo", "status": "Live" },
            { "id": "a2", "name": "Hidden", "status": "Draft" }
        ]
    });
    let ctx = AppContext::build(online_config(&server.url(), dir.path(), Some(snapshot)), false, false)
        .unwrap();

    let listings = ctx.marketplace().browse(&BrowseQuery::default()).await.unwrap();
    match &listings {
        Fetched::Degraded { value, source, .. } => {
            assert_eq!(*source, DegradedSource::Cached);
            assert_eq!(value.len(), 1);
            assert_eq!(value[0].name, "Echo");
        }
        Fetched::Live(_) => panic!("expected degraded listings"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_without_snapshot_is_empty() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/agents")
        .with_status(502)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ctx = AppContext::build(online_config(&server.url(), dir.path(), None), false, false).unwrap();

    let listings = ctx.marketplace().browse(&BrowseQuery::default()).await.unwrap();
    assert!(listings.is_degraded());
    assert!(listings.value().is_empty());
}

#[tokio::test]
async fn test_expired_token_clears_session() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/agents/a1")
        .with_status(401)
        .with_body(r#"{"message":"jwt expired"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ctx = AppContext::build(online_config(&server.url(), dir.path(), None), false, false).unwrap();
    ctx.sessions()
        .save(&Session::new("old-token", Role::Vendor, Some("v1".to_string())))
        .unwrap();

    let err = ctx.vendor().listing(&ListingId::from("a1")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(ctx.session().is_none());
    assert!(ctx.require_role(Role::Vendor).is_err());
}
