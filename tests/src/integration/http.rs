//! # HTTP Round Trips
//!
//! The gateway assembled from a TOML configuration, driven through its
//! router exactly as the binary would serve it.

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    use bolha_gateway::{GatewayConfig, GatewayService};
    use shared_bus::{ConnectionEvent, EventFilter};
    use shared_types::UserId;

    const CONFIG: &str = r#"
        [auth]
        api_key = "proxy-secret"

        [connections]
        capacity = 2
        lock_timeout = "500ms"

        [[profiles]]
        id = 1
        display_name = "Ana"
        avatar_url = "https://cdn.bolha.example/a/1.png"

        [[profiles]]
        id = 2
        display_name = "Bruno"

        [[profiles]]
        id = 3
        display_name = "Carla"

        [[profiles]]
        id = 4
        display_name = "Davi"
    "#;

    fn gateway() -> GatewayService {
        let config = GatewayConfig::from_toml(CONFIG).unwrap();
        GatewayService::new(config).unwrap()
    }

    fn request(method: &str, uri: &str, actor: u64, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", "Bearer proxy-secret")
            .header("x-actor-id", actor.to_string());
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn uid(raw: u64) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn test_full_lifecycle_over_http() {
        let gateway = gateway();
        let router = gateway.router();
        let mut events = gateway.bus().subscribe(EventFilter::all());

        let (code, body) = call(
            &router,
            request("POST", "/connections/request", 2, Some(json!({ "targetId": 1 }))),
        )
        .await;
        assert_eq!((code, body), (StatusCode::OK, json!({ "status": "requested" })));

        let (code, body) = call(&router, request("GET", "/connections/pending", 1, None)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(
            body["data"]["incoming"],
            json!([{ "id": 2, "displayName": "Bruno", "avatarUrl": null }])
        );

        let (code, body) = call(
            &router,
            request("POST", "/connections/accept", 1, Some(json!({ "proposerId": 2 }))),
        )
        .await;
        assert_eq!((code, body), (StatusCode::OK, json!({ "status": "connected" })));

        let (code, body) = call(&router, request("GET", "/connections", 2, None)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "data": [{
                "id": 1,
                "displayName": "Ana",
                "avatarUrl": "https://cdn.bolha.example/a/1.png"
            }] })
        );

        let first = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            first,
            ConnectionEvent::ConnectionRequested {
                proposer: uid(2),
                target: uid(1),
            }
        );
    }

    #[tokio::test]
    async fn test_configured_capacity_applies() {
        let gateway = gateway();
        let router = gateway.router();

        for peer in [2, 3] {
            call(
                &router,
                request("POST", "/connections/request", 1, Some(json!({ "targetId": peer }))),
            )
            .await;
            let (code, _) = call(
                &router,
                request("POST", "/connections/accept", peer, Some(json!({ "proposerId": 1 }))),
            )
            .await;
            assert_eq!(code, StatusCode::OK);
        }

        let (code, body) = call(&router, request("GET", "/connections/status/4", 1, None)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "none", "aAtCapacity": true, "bAtCapacity": false })
        );

        let (code, body) = call(
            &router,
            request("POST", "/connections/request", 4, Some(json!({ "targetId": 1 }))),
        )
        .await;
        assert_eq!(code, StatusCode::CONFLICT);
        assert_eq!(body["error"], "capacity_exceeded");
        assert!(body["message"].as_str().unwrap().contains('1'));
    }

    #[tokio::test]
    async fn test_api_key_enforced() {
        let router = gateway().router();

        let unauthenticated = Request::builder()
            .uri("/connections")
            .header("x-actor-id", "1")
            .body(Body::empty())
            .unwrap();
        let (code, body) = call(&router, unauthenticated).await;
        assert_eq!(code, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthenticated");

        let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (code, body) = call(&router, health).await;
        assert_eq!((code, body), (StatusCode::OK, json!({ "status": "ok" })));
    }

    #[tokio::test]
    async fn test_concurrent_http_proposals() {
        let gateway = gateway();
        let router = gateway.router();

        // 1 and 2 propose to each other at the same time.
        let (left, right) = tokio::join!(
            call(
                &router,
                request("POST", "/connections/request", 1, Some(json!({ "targetId": 2 }))),
            ),
            call(
                &router,
                request("POST", "/connections/request", 2, Some(json!({ "targetId": 1 }))),
            ),
        );
        assert_eq!(left.0, StatusCode::OK);
        assert_eq!(right.0, StatusCode::OK);

        let mut statuses = [
            left.1["status"].as_str().unwrap().to_string(),
            right.1["status"].as_str().unwrap().to_string(),
        ];
        statuses.sort();
        assert_eq!(statuses, ["connected", "requested"]);

        let (_, body) = call(&router, request("GET", "/connections/status/2", 1, None)).await;
        assert_eq!(body["status"], "connected");
    }
}
