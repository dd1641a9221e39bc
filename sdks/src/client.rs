// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for the AgentStore backend
//!
//! Every request carries `Authorization: Bearer <token>` when a session is
//! stored. A `401` clears the stored session. Requests are never retried.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use agentstore_core::domain::client_config::ClientConfigManifest;
use agentstore_core::domain::lifecycle::LifecycleCommand;
use agentstore_core::domain::listing::{AgentListing, ListingId, NewListing};
use agentstore_core::domain::repository::{ApiError, MarketplaceApi};
use agentstore_core::domain::revenue::Transaction;
use agentstore_core::domain::session::SessionStore;
use agentstore_core::domain::support::{
    AdminStats, NewReport, NewSubscription, Notification, Report, Subscription,
};
use agentstore_core::domain::user::User;

use crate::types::{decode_body, ApproveBody, BlockBody, ErrorBody, ReasonBody, ResolveBody, UrlBody};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// HTTP method, path and optional JSON body of one backend call
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl Route {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            body: None,
        }
    }

    fn with_body<B: Serialize>(mut self, body: &B) -> Self {
        self.body = serde_json::to_value(body).ok();
        self
    }
}

/// The endpoint that performs `command` on listing `id`
pub fn lifecycle_route(id: &ListingId, command: &LifecycleCommand) -> Route {
    match command {
        LifecycleCommand::SubmitForReview => {
            Route::new(Method::POST, format!("/agents/submit-review/{id}"))
        }
        LifecycleCommand::Approve { message } => {
            Route::new(Method::POST, format!("/agents/approve/{id}")).with_body(&ApproveBody {
                message: message.clone(),
            })
        }
        LifecycleCommand::Reject { reason } => Route::new(Method::POST, format!("/agents/reject/{id}"))
            .with_body(&ReasonBody {
                reason: reason.trim().to_string(),
            }),
        LifecycleCommand::ForceLive => {
            Route::new(Method::POST, format!("/agents/admin/force-live/{id}"))
        }
        LifecycleCommand::Deactivate => Route::new(Method::PATCH, format!("/agents/{id}/deactivate")),
        LifecycleCommand::Reactivate => Route::new(Method::PATCH, format!("/agents/{id}/reactivate")),
        LifecycleCommand::EditUrl { url } => Route::new(Method::PATCH, format!("/agents/{id}"))
            .with_body(&UrlBody {
                url: url.trim().to_string(),
            }),
        LifecycleCommand::RequestDeletion => Route::new(Method::DELETE, format!("/agents/{id}")),
        LifecycleCommand::ApproveDeletion => {
            Route::new(Method::POST, format!("/agents/admin/approve-deletion/{id}"))
        }
        LifecycleCommand::RejectDeletion { reason } => {
            Route::new(Method::POST, format!("/agents/admin/reject-deletion/{id}")).with_body(
                &ReasonBody {
                    reason: reason.trim().to_string(),
                },
            )
        }
    }
}

/// Client for the AgentStore REST API
pub struct MarketplaceClient {
    base_url: String,
    client: Client,
    session: Arc<dyn SessionStore>,
}

impl MarketplaceClient {
    /// Create a client for `base_url`, e.g. `https://api.agentstore.io/api`
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        url::Url::parse(&base_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: base_url.clone(),
            source,
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            session,
        })
    }

    pub fn from_config(
        config: &ClientConfigManifest,
        session: Arc<dyn SessionStore>,
    ) -> anyhow::Result<Self> {
        Self::new(
            config.spec.api.base_url.clone(),
            Duration::from_secs(config.spec.api.timeout_seconds),
            session,
        )
        .context("Failed to create marketplace client")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(session) = self.session.load() {
            req = req.bearer_auth(session.token);
        }
        req
    }

    async fn dispatch(&self, method: Method, path: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        debug!(%method, path, "Sending request");
        metrics::counter!("agentstore_api_requests_total", "method" => method.to_string()).increment(1);

        let response = req.send().await.map_err(|e| {
            let err = transport_error(&e);
            metrics::counter!("agentstore_api_failures_total", "kind" => "transport").increment(1);
            warn!(%method, path, "Request failed: {}", err);
            err
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        metrics::counter!("agentstore_api_failures_total", "kind" => "status").increment(1);

        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "Backend answered 401, clearing stored session");
            if let Err(e) = self.session.clear() {
                warn!("Failed to clear session: {}", e);
            }
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(message));
        }

        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn call<T: DeserializeOwned>(&self, route: Route) -> Result<T, ApiError> {
        let path = route.path.clone();
        let response = self.send(route).await?;
        let text = response.text().await.map_err(|e| transport_error(&e))?;
        decode_body(&text).map_err(|e| {
            warn!(path, "Failed to decode response: {}", e);
            ApiError::Decode(e)
        })
    }

    async fn call_unit(&self, route: Route) -> Result<(), ApiError> {
        self.send(route).await?;
        Ok(())
    }

    async fn send(&self, route: Route) -> Result<Response, ApiError> {
        let mut req = self.request(route.method.clone(), &route.path);
        if let Some(body) = &route.body {
            req = req.json(body);
        }
        self.dispatch(route.method, &route.path, req).await
    }

    fn get(path: impl Into<String>) -> Route {
        Route::new(Method::GET, path.into())
    }
}

fn transport_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_decode() {
        ApiError::Decode(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

#[async_trait]
impl MarketplaceApi for MarketplaceClient {
    async fn list_listings(&self) -> Result<Vec<AgentListing>, ApiError> {
        self.call(Self::get("/agents")).await
    }

    async fn get_listing(&self, id: &ListingId) -> Result<AgentListing, ApiError> {
        self.call(Self::get(format!("/agents/{id}"))).await
    }

    async fn create_listing(&self, listing: &NewListing) -> Result<AgentListing, ApiError> {
        self.call(Route::new(Method::POST, "/agents".to_string()).with_body(listing))
            .await
    }

    async fn execute(&self, id: &ListingId, command: &LifecycleCommand) -> Result<(), ApiError> {
        self.call_unit(lifecycle_route(id, command)).await
    }

    async fn subscribe(&self, subscription: &NewSubscription) -> Result<Subscription, ApiError> {
        self.call(Route::new(Method::POST, "/purchases".to_string()).with_body(subscription))
            .await
    }

    async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        self.call(Self::get("/admin/stats")).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.call(Self::get("/user/all")).await
    }

    async fn set_user_blocked(&self, user_id: &str, blocked: bool) -> Result<(), ApiError> {
        self.call_unit(
            Route::new(Method::PUT, format!("/user/{user_id}/block"))
                .with_body(&BlockBody { is_blocked: blocked }),
        )
        .await
    }

    async fn admin_revenue(&self) -> Result<Vec<Transaction>, ApiError> {
        self.call(Self::get("/revenue/admin")).await
    }

    async fn vendor_revenue(&self) -> Result<Vec<Transaction>, ApiError> {
        self.call(Self::get("/revenue/vendor")).await
    }

    async fn list_reports(&self) -> Result<Vec<Report>, ApiError> {
        self.call(Self::get("/reports")).await
    }

    async fn create_report(&self, report: &NewReport) -> Result<Report, ApiError> {
        self.call(Route::new(Method::POST, "/reports".to_string()).with_body(report))
            .await
    }

    async fn resolve_report(&self, report_id: &str, note: &str) -> Result<(), ApiError> {
        self.call_unit(
            Route::new(Method::PUT, format!("/reports/{report_id}/resolve")).with_body(&ResolveBody {
                resolution_note: note.to_string(),
            }),
        )
        .await
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.call(Self::get("/notifications")).await
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.call_unit(Route::new(
            Method::PUT,
            format!("/notifications/{notification_id}/read"),
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentstore_core::infrastructure::session_store::InMemorySessionStore;

    #[test]
    fn test_lifecycle_routes() {
        let id = ListingId::from("a1");

        let route = lifecycle_route(&id, &LifecycleCommand::SubmitForReview);
        assert_eq!(route.method, Method::POST);
        assert_eq!(route.path, "/agents/submit-review/a1");
        assert!(route.body.is_none());

        let route = lifecycle_route(&id, &LifecycleCommand::Deactivate);
        assert_eq!((route.method, route.path.as_str()), (Method::PATCH, "/agents/a1/deactivate"));

        let route = lifecycle_route(&id, &LifecycleCommand::RequestDeletion);
        assert_eq!((route.method, route.path.as_str()), (Method::DELETE, "/agents/a1"));

        let route = lifecycle_route(
            &id,
            &LifecycleCommand::RejectDeletion {
                reason: " still in use ".to_string(),
            },
        );
        assert_eq!(route.path, "/agents/admin/reject-deletion/a1");
        assert_eq!(route.body, Some(serde_json::json!({ "reason": "still in use" })));

        let route = lifecycle_route(
            &id,
            &LifecycleCommand::EditUrl {
                url: "https://a1.example.com".to_string(),
            },
        );
        assert_eq!(route.method, Method::PATCH);
        assert_eq!(route.body, Some(serde_json::json!({ "url": "https://a1.example.com" })));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = MarketplaceClient::new(
            "not a url",
            Duration::from_secs(1),
            Arc::new(InMemorySessionStore::new()),
        );
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = MarketplaceClient::new(
            "http://localhost:5000/api/",
            Duration::from_secs(1),
            Arc::new(InMemorySessionStore::new()),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }
}
