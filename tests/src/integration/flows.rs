//! # Integration Flows
//!
//! The lifecycle engine wired to the real shared-bus and to the durable file
//! store, exercised the way the gateway assembles them.
//!
//! ## Flows tested
//!
//! 1. **Engine → BusNotifier → InMemoryEventBus**: every committed transition
//!    reaches subscribers, filtered per user.
//! 2. **Engine → FileConnectionStore**: state survives a reopen and the
//!    reloaded graph still satisfies every pair invariant.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use bolha_connections::domain::check_graph;
    use bolha_connections::test_utils::{seeded_directory, uid};
    use bolha_connections::{
        BusNotifier, ConnectionApi, ConnectionDependencies, ConnectionError, ConnectionPolicy,
        ConnectionService, FileConnectionStore, InMemoryConnectionStore, NoopNotifier,
        RelationshipStatus, MAX_CONNECTIONS,
    };
    use shared_bus::{ConnectionEvent, EventFilter, EventPublisher, InMemoryEventBus, Subscription};

    // =============================================================================
    // FIXTURES
    // =============================================================================

    fn bus_service(
        users: u64,
    ) -> (
        ConnectionService<
            Arc<InMemoryConnectionStore>,
            Arc<bolha_connections::InMemoryProfileDirectory>,
            BusNotifier,
        >,
        Arc<InMemoryEventBus>,
    ) {
        let bus = Arc::new(InMemoryEventBus::new());
        let service = ConnectionService::new(
            ConnectionDependencies {
                store: Arc::new(InMemoryConnectionStore::new()),
                profiles: Arc::new(seeded_directory(users)),
                notifier: BusNotifier::new(Arc::clone(&bus)),
            },
            ConnectionPolicy::default(),
        );
        (service, bus)
    }

    async fn next_event(subscription: &mut Subscription) -> ConnectionEvent {
        timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("event within deadline")
            .expect("bus open")
    }

    // =============================================================================
    // ENGINE → EVENT BUS
    // =============================================================================

    #[tokio::test]
    async fn test_lifecycle_events_reach_subscribers() {
        let (service, bus) = bus_service(2);
        let mut all = bus.subscribe(EventFilter::all());

        service.propose(uid(1), uid(2)).await.unwrap();
        service.accept(uid(2), uid(1)).await.unwrap();
        service.remove(uid(1), uid(2)).await.unwrap();

        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(next_event(&mut all).await);
        }

        assert_eq!(
            received,
            vec![
                ConnectionEvent::ConnectionRequested {
                    proposer: uid(1),
                    target: uid(2),
                },
                ConnectionEvent::ConnectionAccepted { a: uid(2), b: uid(1) },
                ConnectionEvent::ConnectionRemoved { a: uid(1), b: uid(2) },
            ]
        );
        assert_eq!(bus.events_published(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_pair_events_arrive_in_commit_order() {
        let pairs = 40;
        let (service, bus) = bus_service(pairs * 2);
        let service = Arc::new(service);
        let mut all = bus.subscribe(EventFilter::all());

        let handles: Vec<_> = (1..=pairs)
            .map(|k| {
                let service = Arc::clone(&service);
                let (a, b) = (uid(2 * k - 1), uid(2 * k));
                tokio::spawn(async move {
                    service.propose(a, b).await.unwrap();
                    service.accept(b, a).await.unwrap();
                    service.remove(a, b).await.unwrap();
                })
            })
            .collect();
        for joined in futures::future::join_all(handles).await {
            joined.unwrap();
        }

        // Each pair must read requested, accepted, removed in that order.
        let mut stage = std::collections::HashMap::new();
        for _ in 0..pairs * 3 {
            let event = next_event(&mut all).await;
            let (first, second) = event.participants();
            let key = first.min(second);
            let seen = stage.entry(key).or_insert(0u8);
            let expected = match *seen {
                0 => matches!(event, ConnectionEvent::ConnectionRequested { .. }),
                1 => matches!(event, ConnectionEvent::ConnectionAccepted { .. }),
                _ => matches!(event, ConnectionEvent::ConnectionRemoved { .. }),
            };
            assert!(expected, "out of order for pair of {key}: {event:?} at stage {seen}");
            *seen += 1;
        }
        assert!(stage.values().all(|&seen| seen == 3));
        assert_eq!(bus.events_published(), pairs * 3);
    }

    #[tokio::test]
    async fn test_user_filter_only_sees_own_events() {
        let (service, bus) = bus_service(4);
        let mut for_three = bus.subscribe(EventFilter::for_user(uid(3)));

        service.propose(uid(1), uid(2)).await.unwrap();
        service.propose(uid(4), uid(3)).await.unwrap();

        let event = next_event(&mut for_three).await;
        assert_eq!(
            event,
            ConnectionEvent::ConnectionRequested {
                proposer: uid(4),
                target: uid(3),
            }
        );
        assert!(event.involves(uid(3)));
    }

    #[tokio::test]
    async fn test_failed_operations_publish_nothing() {
        let (service, bus) = bus_service(2);
        let mut all = bus.subscribe(EventFilter::all());

        assert!(service.accept(uid(2), uid(1)).await.is_err());
        assert!(service.propose(uid(1), uid(1)).await.is_err());
        tokio::task::yield_now().await;

        assert!(all.try_recv().unwrap().is_none());
        assert_eq!(bus.events_published(), 0);
    }

    #[tokio::test]
    async fn test_reject_and_cancel_events() {
        let (service, bus) = bus_service(3);
        let mut all = bus.subscribe(EventFilter::all());

        service.propose(uid(1), uid(2)).await.unwrap();
        service.reject(uid(2), uid(1)).await.unwrap();
        service.propose(uid(1), uid(3)).await.unwrap();
        service.cancel(uid(1), uid(3)).await.unwrap();

        let mut received = Vec::new();
        for _ in 0..4 {
            received.push(next_event(&mut all).await);
        }
        assert!(received.contains(&ConnectionEvent::ConnectionRejected {
            target: uid(2),
            proposer: uid(1),
        }));
        assert!(received.contains(&ConnectionEvent::RequestCancelled {
            proposer: uid(1),
            target: uid(3),
        }));
    }

    // =============================================================================
    // ENGINE → FILE STORE
    // =============================================================================

    #[tokio::test]
    async fn test_graph_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let users = 20;

        {
            let store = Arc::new(FileConnectionStore::open(dir.path()).unwrap());
            let service = ConnectionService::new(
                ConnectionDependencies {
                    store: Arc::clone(&store),
                    profiles: Arc::new(seeded_directory(users)),
                    notifier: NoopNotifier,
                },
                ConnectionPolicy::default(),
            );

            // User 1 fills up, user 18 waits on 19, 20 was removed again.
            for peer in 2..=16 {
                service.propose(uid(1), uid(peer)).await.unwrap();
                service.accept(uid(peer), uid(1)).await.unwrap();
            }
            service.propose(uid(18), uid(19)).await.unwrap();
            service.propose(uid(17), uid(20)).await.unwrap();
            service.accept(uid(20), uid(17)).await.unwrap();
            service.remove(uid(20), uid(17)).await.unwrap();
        }

        let store = Arc::new(FileConnectionStore::open(dir.path()).unwrap());
        check_graph(&store.snapshot(), MAX_CONNECTIONS).unwrap();

        let service = ConnectionService::new(
            ConnectionDependencies {
                store,
                profiles: Arc::new(seeded_directory(users)),
                notifier: NoopNotifier,
            },
            ConnectionPolicy::default(),
        );

        let report = service.status(uid(1), uid(17)).await.unwrap();
        assert!(report.a_at_capacity);
        assert_eq!(report.status, RelationshipStatus::None);
        assert_eq!(
            service.status(uid(18), uid(19)).await.unwrap().status,
            RelationshipStatus::OutgoingFromA
        );
        assert_eq!(
            service.status(uid(17), uid(20)).await.unwrap().status,
            RelationshipStatus::None
        );
        assert_eq!(service.list_connections(uid(1)).await.unwrap().len(), 15);

        let err = service.propose(uid(17), uid(1)).await.unwrap_err();
        assert!(matches!(err, ConnectionError::CapacityExceeded { user, .. } if user == uid(1)));
    }
}
