//! NotificationManager — resolves recipients, renders, fans out across
//! channels, and sweeps failed deliveries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aegis_core::config::NotifyConfig;
use aegis_core::errors::{AegisResult, NotifyError};
use aegis_core::models::{
    Channel, DeliveryResult, DeliveryStatus, Notification, OverrideRecord, SuspensionReason,
};
use aegis_core::traits::{IDeliveryChannel, IRecipientDirectory, ISuspensionNotifier, Recipient};
use aegis_storage::queries::notification_ops;
use aegis_storage::StorageEngine;

use crate::template::{self, Rendered};

/// Outcome of one retry sweep.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RetrySummary {
    pub retried: usize,
    pub delivered: usize,
    pub marked_dead: usize,
}

pub struct NotificationManager {
    engine: Arc<StorageEngine>,
    directory: Arc<dyn IRecipientDirectory>,
    channels: Vec<Arc<dyn IDeliveryChannel>>,
    config: NotifyConfig,
}

impl NotificationManager {
    pub fn new(
        engine: Arc<StorageEngine>,
        directory: Arc<dyn IRecipientDirectory>,
        channels: Vec<Arc<dyn IDeliveryChannel>>,
        config: NotifyConfig,
    ) -> Self {
        Self {
            engine,
            directory,
            channels,
            config,
        }
    }

    /// Enqueue and attempt one notice per (recipient, configured channel).
    /// Each channel attempt is independent; one failing never fails the
    /// others. Failures stay queued for the retry sweep.
    fn dispatch(&self, project_id: &str, rendered: &Rendered) -> AegisResult<Vec<DeliveryResult>> {
        let recipients = self.directory.recipients_for(project_id)?;
        if recipients.is_empty() {
            tracing::warn!(project_id, "no recipients resolved, nothing dispatched");
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for recipient in &recipients {
            for channel in &self.channels {
                if !self.config.channels.contains(&channel.kind()) {
                    continue;
                }
                results.push(self.attempt_one(project_id, recipient, channel.as_ref(), rendered)?);
            }
        }
        Ok(results)
    }

    fn attempt_one(
        &self,
        project_id: &str,
        recipient: &Recipient,
        channel: &dyn IDeliveryChannel,
        rendered: &Rendered,
    ) -> AegisResult<DeliveryResult> {
        let address = match channel.kind() {
            Channel::Email => recipient.email.clone(),
            Channel::InApp => recipient.user_id.clone(),
        };
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            project_id: project_id.to_string(),
            channel: channel.kind(),
            recipient: address,
            subject: rendered.subject.clone(),
            body: rendered.body.clone(),
            status: DeliveryStatus::Pending,
            attempt_count: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        };
        self.engine
            .pool()
            .writer
            .with_conn_sync(|conn| notification_ops::insert_notification(conn, &notification))?;

        let outcome = channel.deliver(&notification);
        self.record_outcome(&notification, &outcome)?;

        Ok(DeliveryResult {
            notification_id: notification.id,
            channel: notification.channel,
            recipient: notification.recipient,
            delivered: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
        })
    }

    fn record_outcome(
        &self,
        notification: &Notification,
        outcome: &Result<(), NotifyError>,
    ) -> AegisResult<()> {
        let (status, error) = match outcome {
            Ok(()) => (DeliveryStatus::Sent, None),
            Err(e) => {
                tracing::warn!(
                    notification_id = %notification.id,
                    channel = notification.channel.as_str(),
                    error = %e,
                    "delivery attempt failed"
                );
                (DeliveryStatus::Failed, Some(e.to_string()))
            }
        };
        self.engine.pool().writer.with_conn_sync(|conn| {
            notification_ops::mark_attempt(conn, &notification.id, status, error.as_deref())
        })
    }

    /// Re-attempt failed notifications below the attempt ceiling; mark the
    /// ones at the ceiling dead rather than retrying forever.
    pub fn retry_failed(&self, max_attempts: u32) -> AegisResult<RetrySummary> {
        let candidates = self
            .engine
            .pool()
            .writer
            .with_conn_sync(|conn| notification_ops::retry_candidates(conn, max_attempts))?;

        let mut summary = RetrySummary {
            retried: candidates.len(),
            ..Default::default()
        };

        for notification in &candidates {
            let channel = self
                .channels
                .iter()
                .find(|c| c.kind() == notification.channel);
            let Some(channel) = channel else {
                // Channel no longer configured; leave for the ceiling.
                continue;
            };
            let outcome = channel.deliver(notification);
            if outcome.is_ok() {
                summary.delivered += 1;
            }
            self.record_outcome(notification, &outcome)?;
        }

        summary.marked_dead = self
            .engine
            .pool()
            .writer
            .with_conn_sync(|conn| notification_ops::mark_dead_at_ceiling(conn, max_attempts))?;

        if summary.retried > 0 || summary.marked_dead > 0 {
            tracing::info!(
                retried = summary.retried,
                delivered = summary.delivered,
                marked_dead = summary.marked_dead,
                "notification retry sweep complete"
            );
        }
        Ok(summary)
    }

    /// All notifications recorded for a project (status surfaces, tests).
    pub fn notifications_for(&self, project_id: &str) -> AegisResult<Vec<Notification>> {
        self.engine
            .with_reader(|conn| notification_ops::list_by_project(conn, project_id))
    }
}

impl ISuspensionNotifier for NotificationManager {
    fn send_suspension_notice(
        &self,
        project_id: &str,
        reason: SuspensionReason,
        suspended_at: DateTime<Utc>,
    ) -> AegisResult<Vec<DeliveryResult>> {
        let rendered = template::suspension_notice(project_id, reason, suspended_at);
        self.dispatch(project_id, &rendered)
    }

    fn send_override_notice(
        &self,
        project_id: &str,
        record: &OverrideRecord,
    ) -> AegisResult<Vec<DeliveryResult>> {
        let rendered = template::override_notice(project_id, record);
        self.dispatch(project_id, &rendered)
    }
}
