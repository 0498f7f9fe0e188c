use serde_json::{Value, json};
use smartlead_async::test_support::{TEST_API_KEY, config_for, gateway_for};
use smartlead_async::{
    AuthPlacement, BackendTarget, Endpoint, ErrorKind, FailureCause, Gateway, GatewayError,
    Method, PRIMARY, Params, RetryPolicy, SMART_DELIVERY,
};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params(v: Value) -> Params {
    match v {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

#[tokio::test]
async fn success_body_is_returned_unmodified() {
    let server = MockServer::start().await;
    let body = json!([{"id": 7, "name": "Q3 outreach", "status": "ACTIVE"}]);

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("api_key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let got = gw.get(PRIMARY, "/campaigns", Params::new()).await.unwrap();
    assert_eq!(got, body);
}

#[tokio::test]
async fn retry_500_500_then_success_follows_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns/7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/campaigns/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "attempt": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri()).with_retry(RetryPolicy::new(3, Duration::from_millis(100)));
    let gw = Gateway::new(cfg).unwrap();

    let started = Instant::now();
    let got = gw.get(PRIMARY, "/campaigns/7", Params::new()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(got, json!({"id": 7, "attempt": 3}));
    assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn not_found_is_rejected_after_one_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns/999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Campaign not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let err = gw
        .get(PRIMARY, "/campaigns/999", Params::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestRejected);
    assert_eq!(err.status(), Some(404));
    match err {
        GatewayError::RequestRejected { message, .. } => assert_eq!(message, "Campaign not found"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/campaigns/create"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "name is required"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let err = gw
        .post(PRIMARY, "/campaigns/create", Params::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("name is required"));
}

#[tokio::test]
async fn retry_429_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/email-accounts/"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "statusCode": 429,
            "message": "Rate limit exceeded"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/email-accounts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let got = gw.get(PRIMARY, "/email-accounts/", Params::new()).await.unwrap();
    assert_eq!(got, json!([]));
}

#[tokio::test]
async fn persistent_503_exhausts_attempt_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/client/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let err = gw.get(PRIMARY, "/client/", Params::new()).await.unwrap_err();

    match &err {
        GatewayError::RetriesExhausted {
            attempts, cause, ..
        } => {
            assert_eq!(*attempts, 3);
            assert_eq!(
                cause,
                &FailureCause::Status {
                    status: 503,
                    message: "Service Unavailable".into()
                }
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn slow_upstream_times_out_per_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri())
        .with_timeout(Duration::from_millis(100))
        .with_retry(RetryPolicy::new(2, Duration::from_millis(10)));
    let gw = Gateway::new(cfg).unwrap();

    let err = gw.get(PRIMARY, "/campaigns", Params::new()).await.unwrap_err();
    match err {
        GatewayError::RetriesExhausted {
            attempts, cause, ..
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(cause, FailureCause::Timeout);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_retried_then_exhausted() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let uri = format!("http://127.0.0.1:{port}");
    let gw = gateway_for(&uri);
    let err = gw.get(PRIMARY, "/campaigns", Params::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn identical_calls_are_not_memoized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leads/fetch-categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(2)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let a = gw.get(PRIMARY, "/leads/fetch-categories", Params::new()).await.unwrap();
    let b = gw.get(PRIMARY, "/leads/fetch-categories", Params::new()).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn api_key_never_appears_in_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": format!("Invalid API key {TEST_API_KEY}")
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/client/"))
        .respond_with(
            ResponseTemplate::new(502).set_body_string(format!("upstream rejected {TEST_API_KEY}")),
        )
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());

    let err = gw.get(PRIMARY, "/campaigns", Params::new()).await.unwrap_err();
    let shown = format!("{err} {err:?}");
    assert!(!shown.contains(TEST_API_KEY), "{shown}");
    assert!(shown.contains("[REDACTED]"));

    let err = gw.get(PRIMARY, "/client/", Params::new()).await.unwrap_err();
    let shown = format!("{err} {err:?}");
    assert!(!shown.contains(TEST_API_KEY), "{shown}");
}

#[tokio::test]
async fn routes_across_three_targets() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("api_key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "primary"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sd/spam-test/seed/providers"))
        .and(query_param("api_key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "smart_delivery"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reports/v2/summary"))
        .and(header("x-api-key", TEST_API_KEY))
        .and(header("x-client", "smartlead-tools"))
        .and(query_param_is_missing("api_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "reporting"})))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri()).with_target(
        BackendTarget::new("reporting", format!("{}/reports/v2", server.uri()))
            .with_auth(AuthPlacement::Header {
                name: "x-api-key".into(),
            })
            .with_header("x-client", "smartlead-tools"),
    );
    let gw = Gateway::new(cfg).unwrap();

    let a = gw.get(PRIMARY, "/campaigns", Params::new()).await.unwrap();
    let b = gw
        .get(SMART_DELIVERY, "/spam-test/seed/providers", Params::new())
        .await
        .unwrap();
    let c = gw.get("reporting", "/summary", Params::new()).await.unwrap();

    assert_eq!(a["from"], "primary");
    assert_eq!(b["from"], "smart_delivery");
    assert_eq!(c["from"], "reporting");
}

#[tokio::test]
async fn call_deadline_bounds_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cfg = config_for(&server.uri())
        .with_retry(RetryPolicy::new(10, Duration::from_millis(200)))
        .with_call_deadline(Some(Duration::from_millis(300)));
    let gw = Gateway::new(cfg).unwrap();

    let started = Instant::now();
    let err = gw.get(PRIMARY, "/campaigns", Params::new()).await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));

    match err {
        GatewayError::RetriesExhausted {
            attempts, cause, ..
        } => {
            assert_eq!(cause, FailureCause::DeadlineElapsed { after_ms: 300 });
            assert!((1..10).contains(&attempts), "attempts {attempts}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let received = server.received_requests().await.unwrap().len();
    assert!(received < 10, "received {received}");
}

#[tokio::test]
async fn empty_and_plain_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/campaigns/7"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/leads/3/unsubscribe"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let deleted = gw.delete(PRIMARY, "/campaigns/7", Params::new()).await.unwrap();
    assert_eq!(deleted, Value::Null);

    let unsub = gw
        .post(PRIMARY, "/leads/3/unsubscribe", Params::new())
        .await
        .unwrap();
    assert_eq!(unsub, json!("ok"));
}

#[tokio::test]
async fn post_sends_json_body_and_key_in_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sd/spam-test/folder"))
        .and(query_param("api_key", TEST_API_KEY))
        .and(body_json(json!({"name": "Q3 tests"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 12})))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let got = gw
        .post(
            SMART_DELIVERY,
            "/spam-test/folder",
            params(json!({"name": "Q3 tests", "description": null})),
        )
        .await
        .unwrap();
    assert_eq!(got, json!({"id": 12}));
}

#[tokio::test]
async fn call_endpoint_fills_path_and_queries_the_rest() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns/42/leads"))
        .and(query_param("offset", "20"))
        .and(query_param("limit", "10"))
        .and(query_param_is_missing("campaign_id"))
        .and(query_param_is_missing("status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total_leads": 0, "data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let ep = Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/leads");
    let got = gw
        .call_endpoint(
            &ep,
            params(json!({"campaign_id": 42, "offset": 20, "limit": 10, "status": null})),
        )
        .await
        .unwrap();
    assert_eq!(got["total_leads"], 0);
}

#[tokio::test]
async fn missing_path_param_never_reaches_network() {
    let server = MockServer::start().await;

    let gw = gateway_for(&server.uri());
    let ep = Endpoint::delete(PRIMARY, "/campaigns/{campaign_id}");
    let err = gw.call_endpoint(&ep, Params::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestRejected);
    assert_eq!(err.status(), None);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn dot_segments_never_reach_network() {
    let server = MockServer::start().await;

    let gw = gateway_for(&server.uri());
    let ep = Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/leads");
    for bad in ["..", "."] {
        let err = gw
            .call_endpoint(&ep, params(json!({ "campaign_id": bad })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestRejected, "{bad:?}");
        assert_eq!(err.status(), None);
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn put_uses_put_method() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/sd/spam-test/5/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stopped": true})))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway_for(&server.uri());
    let got = gw
        .call(SMART_DELIVERY, Method::Put, "/spam-test/5/stop", Params::new())
        .await
        .unwrap();
    assert_eq!(got["stopped"], true);
}
