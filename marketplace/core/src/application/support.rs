// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::ServiceError;
use crate::domain::events::MarketplaceEvent;
use crate::domain::fetch::Fetched;
use crate::domain::support::{self, NewReport, Notification, Report, SupportError};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::fallback::ResilientMarketplace;

/// Support tickets and notifications
pub struct SupportService {
    gateway: Arc<ResilientMarketplace>,
    event_bus: Arc<EventBus>,
}

impl SupportService {
    pub fn new(gateway: Arc<ResilientMarketplace>, event_bus: Arc<EventBus>) -> Self {
        Self { gateway, event_bus }
    }

    pub async fn reports(&self, open_only: bool) -> Result<Fetched<Vec<Report>>, ServiceError> {
        let reports = self.gateway.reports().await?;
        Ok(reports.map(|all| all.into_iter().filter(|r| !open_only || r.is_open()).collect()))
    }

    pub async fn file_report(&self, report: NewReport) -> Result<Report, ServiceError> {
        report.validate()?;
        let created = self.gateway.api().create_report(&report).await?;
        info!(report_id = %created.id, "Filed report");
        self.event_bus.publish(MarketplaceEvent::ReportCreated {
            report_id: created.id.clone(),
            created_at: Utc::now(),
        });
        Ok(created)
    }

    /// Resolve an open report with a non-empty note
    pub async fn resolve_report(&self, report_id: &str, note: &str) -> Result<(), ServiceError> {
        support::validate_resolution_note(note)?;

        let reports = self.gateway.api().list_reports().await?;
        if let Some(report) = reports.iter().find(|r| r.id == report_id) {
            if !report.is_open() {
                return Err(SupportError::AlreadyResolved(report_id.to_string()).into());
            }
        }

        self.gateway.api().resolve_report(report_id, note.trim()).await?;
        info!(report_id, "Resolved report");
        self.event_bus.publish(MarketplaceEvent::ReportResolved {
            report_id: report_id.to_string(),
            resolved_at: Utc::now(),
        });
        Ok(())
    }

    pub async fn notifications(
        &self,
        unread_only: bool,
    ) -> Result<Fetched<Vec<Notification>>, ServiceError> {
        let notifications = self.gateway.notifications().await?;
        Ok(notifications.map(|all| all.into_iter().filter(|n| !unread_only || !n.read).collect()))
    }

    pub async fn unread_count(&self) -> Result<Fetched<usize>, ServiceError> {
        Ok(self.notifications(true).await?.map(|unread| unread.len()))
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<(), ServiceError> {
        self.gateway.api().mark_notification_read(notification_id).await?;
        self.event_bus.publish(MarketplaceEvent::NotificationRead {
            notification_id: notification_id.to_string(),
            read_at: Utc::now(),
        });
        Ok(())
    }
}
