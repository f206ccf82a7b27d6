//! Notification manager: fan-out, channel-failure isolation, retry sweep.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;

use aegis_core::config::NotifyConfig;
use aegis_core::errors::{AegisResult, NotifyError};
use aegis_core::models::{Channel, DeliveryStatus, Notification, SuspensionReason};
use aegis_core::traits::{IDeliveryChannel, IRecipientDirectory, ISuspensionNotifier, Recipient};
use aegis_notify::NotificationManager;
use aegis_storage::StorageEngine;

struct StaticDirectory {
    recipients: Vec<Recipient>,
}

impl IRecipientDirectory for StaticDirectory {
    fn recipients_for(&self, _project_id: &str) -> AegisResult<Vec<Recipient>> {
        Ok(self.recipients.clone())
    }
}

/// Channel whose deliveries can be toggled to fail, counting attempts.
struct ScriptedChannel {
    kind: Channel,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl ScriptedChannel {
    fn new(kind: Channel, failing: bool) -> Arc<Self> {
        Arc::new(Self {
            kind,
            failing: AtomicBool::new(failing),
            attempts: AtomicUsize::new(0),
        })
    }
}

impl IDeliveryChannel for ScriptedChannel {
    fn kind(&self) -> Channel {
        self.kind
    }

    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(NotifyError::DeliveryFailed {
                channel: self.kind.as_str().to_string(),
                recipient: notification.recipient.clone(),
                reason: "transport down".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn owner() -> Recipient {
    Recipient {
        user_id: "user-1".to_string(),
        email: "owner@example.com".to_string(),
    }
}

fn manager(
    engine: &Arc<StorageEngine>,
    recipients: Vec<Recipient>,
    channels: Vec<Arc<ScriptedChannel>>,
) -> NotificationManager {
    NotificationManager::new(
        Arc::clone(engine),
        Arc::new(StaticDirectory { recipients }),
        channels.into_iter().map(|c| c as _).collect(),
        NotifyConfig::default(),
    )
}

#[test]
fn test_fans_out_per_recipient_and_channel() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let email = ScriptedChannel::new(Channel::Email, false);
    let in_app = ScriptedChannel::new(Channel::InApp, false);
    let manager = manager(
        &engine,
        vec![
            owner(),
            Recipient {
                user_id: "user-2".to_string(),
                email: "admin@example.com".to_string(),
            },
        ],
        vec![Arc::clone(&email), Arc::clone(&in_app)],
    );

    let results = manager
        .send_suspension_notice("proj-a", SuspensionReason::ErrorRate, Utc::now())
        .unwrap();

    // 2 recipients x 2 channels.
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.delivered));
    assert_eq!(email.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(in_app.attempts.load(Ordering::SeqCst), 2);

    let stored = manager.notifications_for("proj-a").unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|n| n.status == DeliveryStatus::Sent));
    assert!(stored[0].subject.contains("proj-a"));
    // Email goes to the address, in-app to the user id.
    assert!(stored
        .iter()
        .any(|n| n.channel == Channel::Email && n.recipient == "owner@example.com"));
    assert!(stored
        .iter()
        .any(|n| n.channel == Channel::InApp && n.recipient == "user-1"));
}

#[test]
fn test_failing_channel_does_not_fail_the_others() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let email = ScriptedChannel::new(Channel::Email, true);
    let in_app = ScriptedChannel::new(Channel::InApp, false);
    let manager = manager(
        &engine,
        vec![owner()],
        vec![Arc::clone(&email), Arc::clone(&in_app)],
    );

    let results = manager
        .send_suspension_notice("proj-a", SuspensionReason::Spike, Utc::now())
        .unwrap();

    assert_eq!(results.len(), 2);
    let by_channel: HashMap<Channel, bool> =
        results.iter().map(|r| (r.channel, r.delivered)).collect();
    assert!(!by_channel[&Channel::Email]);
    assert!(by_channel[&Channel::InApp]);

    let stored = manager.notifications_for("proj-a").unwrap();
    let failed = stored
        .iter()
        .find(|n| n.channel == Channel::Email)
        .unwrap();
    assert_eq!(failed.status, DeliveryStatus::Failed);
    assert!(failed
        .last_error
        .as_deref()
        .unwrap()
        .contains("transport down"));
}

#[test]
fn test_no_recipients_dispatches_nothing() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let email = ScriptedChannel::new(Channel::Email, false);
    let manager = manager(&engine, Vec::new(), vec![Arc::clone(&email)]);

    let results = manager
        .send_suspension_notice("proj-a", SuspensionReason::Manual, Utc::now())
        .unwrap();
    assert!(results.is_empty());
    assert_eq!(email.attempts.load(Ordering::SeqCst), 0);
    assert!(manager.notifications_for("proj-a").unwrap().is_empty());
}

#[test]
fn test_retry_sweep_delivers_after_transport_recovers() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let email = ScriptedChannel::new(Channel::Email, true);
    let in_app = ScriptedChannel::new(Channel::InApp, false);
    let manager = manager(
        &engine,
        vec![owner()],
        vec![Arc::clone(&email), Arc::clone(&in_app)],
    );

    manager
        .send_suspension_notice("proj-a", SuspensionReason::Pattern, Utc::now())
        .unwrap();

    // Transport recovers; the sweep redelivers the failed email.
    email.failing.store(false, Ordering::SeqCst);
    let summary = manager.retry_failed(5).unwrap();
    assert_eq!(summary.retried, 1);
    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.marked_dead, 0);

    let stored = manager.notifications_for("proj-a").unwrap();
    assert!(stored.iter().all(|n| n.status == DeliveryStatus::Sent));
}

#[test]
fn test_exhausted_notifications_marked_dead() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let email = ScriptedChannel::new(Channel::Email, true);
    let manager = manager(&engine, vec![owner()], vec![Arc::clone(&email)]);

    manager
        .send_suspension_notice("proj-a", SuspensionReason::QuotaExceeded, Utc::now())
        .unwrap();

    // First attempt happened at dispatch. The fourth sweep makes the
    // fifth attempt and buries the notification in the same pass.
    for _ in 0..3 {
        let summary = manager.retry_failed(5).unwrap();
        assert_eq!(summary.retried, 1);
        assert_eq!(summary.delivered, 0);
        assert_eq!(summary.marked_dead, 0);
    }
    let summary = manager.retry_failed(5).unwrap();
    assert_eq!(summary.retried, 1);
    assert_eq!(summary.delivered, 0);
    assert_eq!(summary.marked_dead, 1);

    let stored = manager.notifications_for("proj-a").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, DeliveryStatus::Dead);
    assert_eq!(stored[0].attempt_count, 5);

    // Dead notifications are never retried again.
    let after = manager.retry_failed(5).unwrap();
    assert_eq!(after.retried, 0);
    assert_eq!(after.marked_dead, 0);
    assert_eq!(email.attempts.load(Ordering::SeqCst), 5);
}
