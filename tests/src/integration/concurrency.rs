//! # Concurrency
//!
//! Racing requests on a multi-thread runtime. Every test ends by checking
//! the whole stored graph against the pair invariants and the capacity
//! ceiling.

#[cfg(test)]
mod tests {
    use futures::future::join_all;
    use std::collections::HashSet;

    use bolha_connections::domain::check_graph;
    use bolha_connections::test_utils::{harness, uid, TestHarness};
    use bolha_connections::{
        ConnectionApi, ConnectionError, ErrorKind, ProposeOutcome, RelationshipStatus,
        MAX_CONNECTIONS,
    };

    fn assert_graph_consistent(h: &TestHarness) {
        check_graph(&h.store.snapshot(), MAX_CONNECTIONS).expect("graph invariants hold");
    }

    /// Deterministic pseudo-random sequence (64-bit LCG).
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) % bound
        }
    }

    // =============================================================================
    // CAPACITY UNDER CONTENTION
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fan_in_accepts_respect_capacity() {
        let h = harness(31);
        for proposer in 2..=31 {
            h.service.propose(uid(proposer), uid(1)).await.unwrap();
        }

        let handles: Vec<_> = (2..=31)
            .map(|proposer| {
                let service = h.service.clone();
                tokio::spawn(async move { service.accept(uid(1), uid(proposer)).await })
            })
            .collect();

        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, MAX_CONNECTIONS);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                matches!(err, ConnectionError::CapacityExceeded { user, .. } if *user == uid(1)),
                "unexpected error: {err}"
            );
        }

        let pending = h.service.list_pending(uid(1)).await.unwrap();
        assert_eq!(pending.incoming.len(), 30 - MAX_CONNECTIONS);
        assert_eq!(
            h.service.list_connections(uid(1)).await.unwrap().len(),
            MAX_CONNECTIONS
        );
        assert_graph_consistent(&h);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fan_out_proposals_to_full_peers() {
        let h = harness(40);
        // 2..=16 fill user 1; then 20 users race to propose to user 1.
        for peer in 2..=16 {
            h.service.propose(uid(1), uid(peer)).await.unwrap();
            h.service.accept(uid(peer), uid(1)).await.unwrap();
        }

        let handles: Vec<_> = (21..=40)
            .map(|proposer| {
                let service = h.service.clone();
                tokio::spawn(async move { service.propose(uid(proposer), uid(1)).await })
            })
            .collect();

        for joined in join_all(handles).await {
            let err = joined.unwrap().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Capacity);
        }
        assert!(h.service.list_pending(uid(1)).await.unwrap().incoming.is_empty());
        assert_graph_consistent(&h);
    }

    // =============================================================================
    // CROSSED PROPOSALS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_crossed_proposals_connect_exactly_once() {
        let pairs = 25;
        let h = harness(pairs * 2);

        let handles: Vec<_> = (1..=pairs)
            .flat_map(|k| {
                let (a, b) = (2 * k - 1, 2 * k);
                [(a, b), (b, a)]
            })
            .map(|(actor, target)| {
                let service = h.service.clone();
                tokio::spawn(async move {
                    (actor, service.propose(uid(actor), uid(target)).await)
                })
            })
            .collect();

        let mut outcomes = std::collections::HashMap::new();
        for joined in join_all(handles).await {
            let (actor, result) = joined.unwrap();
            outcomes.insert(actor, result.unwrap());
        }

        for k in 1..=pairs {
            let (a, b) = (2 * k - 1, 2 * k);
            let pair: HashSet<_> = [outcomes[&a], outcomes[&b]].into_iter().collect();
            assert_eq!(
                pair,
                HashSet::from([ProposeOutcome::Requested, ProposeOutcome::Connected])
            );

            let report = h.service.status(uid(a), uid(b)).await.unwrap();
            assert_eq!(report.status, RelationshipStatus::Connected);

            let pending = h.service.list_pending(uid(a)).await.unwrap();
            assert!(pending.incoming.is_empty() && pending.outgoing.is_empty());
        }
        assert_graph_consistent(&h);
    }

    // =============================================================================
    // RESOLUTION RACES
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_accept_races_cancel() {
        let pairs = 20;
        let h = harness(pairs * 2);
        for k in 1..=pairs {
            h.service.propose(uid(2 * k - 1), uid(2 * k)).await.unwrap();
        }

        let handles: Vec<_> = (1..=pairs)
            .map(|k| {
                let service = h.service.clone();
                let (proposer, target) = (uid(2 * k - 1), uid(2 * k));
                tokio::spawn(async move {
                    let (accepted, cancelled) = tokio::join!(
                        service.accept(target, proposer),
                        service.cancel(proposer, target)
                    );
                    (proposer, target, accepted, cancelled)
                })
            })
            .collect();

        for joined in join_all(handles).await {
            let (proposer, target, accepted, cancelled) = joined.unwrap();
            assert!(
                accepted.is_ok() ^ cancelled.is_ok(),
                "exactly one of accept/cancel must win"
            );

            let accept_won = accepted.is_ok();
            let loser = if accept_won { cancelled } else { accepted };
            assert!(matches!(
                loser,
                Err(ConnectionError::NoPendingRequest { .. })
            ));

            let expected = if accept_won {
                RelationshipStatus::Connected
            } else {
                RelationshipStatus::None
            };
            assert_eq!(
                h.service.status(proposer, target).await.unwrap().status,
                expected
            );
        }
        assert_graph_consistent(&h);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_accepts_connect_once() {
        let h = harness(2);
        h.service.propose(uid(1), uid(2)).await.unwrap();
        h.notifier.clear();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = h.service.clone();
                tokio::spawn(async move { service.accept(uid(2), uid(1)).await })
            })
            .collect();

        let ok = join_all(handles)
            .await
            .into_iter()
            .filter(|joined| matches!(joined, Ok(Ok(()))))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(h.notifier.events().len(), 1);
        assert_graph_consistent(&h);
    }

    // =============================================================================
    // MIXED WORKLOAD
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_mixed_workload_keeps_graph_consistent() {
        let users = 24;
        let h = harness(users);
        let mut rng = Lcg(0x5eed);

        let ops: Vec<(u64, u64, u64)> = (0..600)
            .map(|_| {
                let actor = rng.next(users) + 1;
                let peer = rng.next(users) + 1;
                (rng.next(5), actor, peer)
            })
            .collect();

        let handles: Vec<_> = ops
            .into_iter()
            .map(|(op, actor, peer)| {
                let service = h.service.clone();
                tokio::spawn(async move {
                    let (actor, peer) = (uid(actor), uid(peer));
                    match op {
                        0 | 1 => service.propose(actor, peer).await.map(|_| ()),
                        2 => service.accept(actor, peer).await,
                        3 => service.reject(actor, peer).await,
                        _ => service.remove(actor, peer).await,
                    }
                })
            })
            .collect();

        for joined in join_all(handles).await {
            if let Err(err) = joined.unwrap() {
                assert!(
                    matches!(
                        err.kind(),
                        ErrorKind::Validation
                            | ErrorKind::Capacity
                            | ErrorKind::Conflict
                            | ErrorKind::NotFound
                    ),
                    "unexpected error under load: {err}"
                );
            }
        }
        assert_graph_consistent(&h);
    }
}
