//! Shared fixtures for unit and integration tests.

use crate::adapters::{InMemoryConnectionStore, InMemoryProfileDirectory};
use crate::domain::ConnectionPolicy;
use crate::ports::ConnectionNotifier;
use crate::service::{ConnectionDependencies, ConnectionService};
use parking_lot::Mutex;
use shared_bus::ConnectionEvent;
use shared_types::{UserId, UserProfile};
use std::sync::Arc;

/// Build a valid id, panicking on zero.
pub fn uid(raw: u64) -> UserId {
    match UserId::new(raw) {
        Ok(id) => id,
        Err(e) => panic!("bad test id {}: {}", raw, e),
    }
}

/// Directory with users `1..=count`, named `user-<id>`.
pub fn seeded_directory(count: u64) -> InMemoryProfileDirectory {
    InMemoryProfileDirectory::with_profiles(
        (1..=count).map(|raw| UserProfile::new(uid(raw), format!("user-{}", raw))),
    )
}

/// Notifier that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ConnectionEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ConnectionEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ConnectionNotifier for RecordingNotifier {
    fn notify(&self, event: ConnectionEvent) {
        self.events.lock().push(event);
    }
}

pub type TestService = ConnectionService<
    Arc<InMemoryConnectionStore>,
    Arc<InMemoryProfileDirectory>,
    Arc<RecordingNotifier>,
>;

/// A service plus handles on each of its dependencies.
pub struct TestHarness {
    pub service: Arc<TestService>,
    pub store: Arc<InMemoryConnectionStore>,
    pub profiles: Arc<InMemoryProfileDirectory>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Harness with `users` seeded accounts and the default policy.
pub fn harness(users: u64) -> TestHarness {
    harness_with_policy(users, ConnectionPolicy::default())
}

pub fn harness_with_policy(users: u64, policy: ConnectionPolicy) -> TestHarness {
    let store = Arc::new(InMemoryConnectionStore::new());
    let profiles = Arc::new(seeded_directory(users));
    let notifier = Arc::new(RecordingNotifier::new());
    let service = ConnectionService::new(
        ConnectionDependencies {
            store: Arc::clone(&store),
            profiles: Arc::clone(&profiles),
            notifier: Arc::clone(&notifier),
        },
        policy,
    );
    TestHarness {
        service: Arc::new(service),
        store,
        profiles,
        notifier,
    }
}
