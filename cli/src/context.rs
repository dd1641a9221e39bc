// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wiring from configuration to application services
//!
//! Online mode talks to the backend through [`MarketplaceClient`]. Offline
//! mode runs against an in-memory backend seeded from the configured snapshot
//! and writes the snapshot back after each command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{debug, info};

use agentstore_core::application::{AdminService, MarketplaceService, SupportService, VendorService};
use agentstore_core::domain::client_config::ClientConfigManifest;
use agentstore_core::domain::events::MarketplaceEvent;
use agentstore_core::domain::repository::MarketplaceApi;
use agentstore_core::domain::session::{Session, SessionStore};
use agentstore_core::domain::user::Role;
use agentstore_core::infrastructure::session_store::FileSessionStore;
use agentstore_core::infrastructure::snapshot::Snapshot;
use agentstore_core::infrastructure::{
    EventBus, EventReceiver, Identity, InMemoryMarketplace, ResilientMarketplace,
};
use agentstore_sdk::MarketplaceClient;

use crate::output;

/// Flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub api_url: Option<String>,
    pub offline: bool,
    pub json: bool,
}

pub struct AppContext {
    pub config: ClientConfigManifest,
    pub json: bool,
    sessions: Arc<FileSessionStore>,
    gateway: Arc<ResilientMarketplace>,
    event_bus: Arc<EventBus>,
    changes: EventReceiver,
    offline: Option<InMemoryMarketplace>,
}

impl AppContext {
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let mut config = ClientConfigManifest::load_or_default(args.config.clone())
            .context("Failed to load configuration")?;
        if let Some(url) = &args.api_url {
            config.spec.api.base_url = url.clone();
        }
        config
            .validate()
            .context("Configuration validation failed")?;
        Self::build(config, args.offline, args.json)
    }

    pub fn build(config: ClientConfigManifest, offline: bool, json: bool) -> Result<Self> {
        let session_path = config
            .session_path()
            .context("Cannot determine session file location; set spec.session.path")?;
        let sessions = Arc::new(FileSessionStore::new(session_path));

        let snapshot = match &config.spec.fallback.snapshot_path {
            Some(path) => Some(Snapshot::load(path)?),
            None => None,
        };

        let session = sessions.load();
        let (api, offline): (Arc<dyn MarketplaceApi>, Option<InMemoryMarketplace>) = if offline {
            let backend = InMemoryMarketplace::from_snapshot(snapshot.clone().unwrap_or_default());
            let identity = Identity {
                user_id: session.as_ref().and_then(|s| s.user_id.clone()),
                role: session.as_ref().map(|s| s.role),
            };
            info!("Running offline against the in-memory backend");
            (Arc::new(backend.acting_as(identity)), Some(backend))
        } else {
            let client = MarketplaceClient::from_config(&config, sessions.clone())?;
            debug!(base_url = client.base_url(), "Using marketplace backend");
            (Arc::new(client), None)
        };

        let gateway = ResilientMarketplace::new(api).with_fallback(config.spec.fallback.enabled);
        if let Some(snapshot) = &snapshot {
            let vendor_id = session
                .as_ref()
                .filter(|s| s.role == Role::Vendor)
                .and_then(|s| s.user_id.as_deref());
            gateway.seed_from_snapshot(snapshot, vendor_id);
        }

        let event_bus = Arc::new(EventBus::with_default_capacity());
        let changes = event_bus.subscribe();

        Ok(Self {
            config,
            json,
            sessions,
            gateway: Arc::new(gateway),
            event_bus,
            changes,
            offline,
        })
    }

    pub fn sessions(&self) -> &FileSessionStore {
        &self.sessions
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.load()
    }

    pub fn is_offline(&self) -> bool {
        self.offline.is_some()
    }

    /// Refuse a command when the stored session has the wrong role.
    /// Offline mode runs without a session.
    pub fn require_role(&self, role: Role) -> Result<()> {
        match self.session() {
            Some(session) if session.role == role => Ok(()),
            Some(session) => anyhow::bail!(
                "This command needs a {} session, but you are logged in as {}",
                role,
                session.role
            ),
            None if self.is_offline() => Ok(()),
            None => anyhow::bail!("Not logged in. Run `agentstore session login` first"),
        }
    }

    pub fn vendor(&self) -> VendorService {
        let vendor_id = self.session().and_then(|s| s.user_id);
        VendorService::new(self.gateway.clone(), self.event_bus.clone(), vendor_id)
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.gateway.clone(), self.event_bus.clone())
    }

    pub fn marketplace(&self) -> MarketplaceService {
        MarketplaceService::new(
            self.gateway.clone(),
            self.event_bus.clone(),
            self.config.spec.marketplace.unset_status_visible,
        )
    }

    pub fn support(&self) -> SupportService {
        SupportService::new(self.gateway.clone(), self.event_bus.clone())
    }

    /// Events published by the services since the context was built
    pub fn take_changes(&mut self) -> Vec<MarketplaceEvent> {
        self.changes.drain()
    }

    /// Report what the command changed and persist offline changes back to
    /// the snapshot file, if one is configured
    pub fn finish(mut self) -> Result<()> {
        let changes = self.take_changes();
        for event in &changes {
            debug!(?event, "Marketplace changed");
        }
        if !self.json {
            if let Some(notice) = output::change_notice(&changes) {
                eprintln!("{}", notice.dimmed());
            }
        }

        if let (Some(backend), Some(path)) = (&self.offline, &self.config.spec.fallback.snapshot_path) {
            backend.snapshot().save(path)?;
            debug!("Saved offline state to {:?}", path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config(dir: &std::path::Path) -> ClientConfigManifest {
        let snapshot = dir.join("snapshot.json");
        std::fs::write(
            &snapshot,
            r#"{"listings":[{"id":"a1","name":"Echo","status":"Live"}]}"#,
        )
        .unwrap();
        let mut config = ClientConfigManifest::default();
        config.spec.session.path = Some(dir.join("session.json"));
        config.spec.fallback.snapshot_path = Some(snapshot);
        config
    }

    #[tokio::test]
    async fn test_offline_context_reads_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::build(offline_config(dir.path()), true, false).unwrap();
        assert!(ctx.is_offline());
        assert!(ctx.require_role(Role::Admin).is_ok());

        let listings = ctx
            .marketplace()
            .browse(&Default::default())
            .await
            .unwrap()
            .into_value();
        assert_eq!(listings.len(), 1);
        ctx.finish().unwrap();
    }

    #[tokio::test]
    async fn test_service_changes_reach_the_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = AppContext::build(offline_config(dir.path()), true, false).unwrap();
        assert!(ctx.take_changes().is_empty());

        let report = ctx
            .support()
            .file_report(agentstore_core::domain::support::NewReport {
                subject: "Broken endpoint".to_string(),
                description: "Echo returns 500".to_string(),
                agent_id: None,
            })
            .await
            .unwrap();

        let changes = ctx.take_changes();
        assert!(matches!(
            changes.as_slice(),
            [MarketplaceEvent::ReportCreated { report_id, .. }] if *report_id == report.id
        ));
        assert!(ctx.take_changes().is_empty());
        ctx.finish().unwrap();
    }

    #[test]
    fn test_role_mismatch_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::build(offline_config(dir.path()), true, false).unwrap();
        ctx.sessions()
            .save(&Session::new("t", Role::Vendor, Some("v1".to_string())))
            .unwrap();
        assert!(ctx.require_role(Role::Vendor).is_ok());
        assert!(ctx.require_role(Role::Admin).is_err());
    }

    fn write_config(dir: &std::path::Path, timeout_seconds: u64) -> PathBuf {
        let path = dir.join(format!("config-{timeout_seconds}.yaml"));
        let yaml = format!(
            "apiVersion: agentstore.io/v1\n\
             kind: ClientConfig\n\
             metadata:\n  name: test\n\
             spec:\n  api:\n    timeout_seconds: {timeout_seconds}\n  \
             session:\n    path: {}\n",
            dir.join("session.json").display()
        );
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn test_load_rejects_invalid_configuration() {
        let dir = tempfile::tempdir().unwrap();

        let args = GlobalArgs {
            config: Some(write_config(dir.path(), 0)),
            ..Default::default()
        };
        let err = AppContext::load(&args).err().unwrap();
        assert!(format!("{err:#}").contains("timeout_seconds"));

        let valid = write_config(dir.path(), 10);
        let args = GlobalArgs {
            config: Some(valid.clone()),
            ..Default::default()
        };
        assert!(AppContext::load(&args).is_ok());

        let args = GlobalArgs {
            config: Some(valid),
            api_url: Some("ftp://files.example.com".to_string()),
            ..Default::default()
        };
        let err = AppContext::load(&args).err().unwrap();
        assert!(format!("{err:#}").contains("http or https"));
    }

    #[test]
    fn test_online_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfigManifest::default();
        config.spec.session.path = Some(dir.path().join("session.json"));
        let ctx = AppContext::build(config, false, false).unwrap();
        assert!(ctx.require_role(Role::User).is_err());
    }
}
