use serde_json::{Value, json};
use smartlead_async::ErrorKind;
use smartlead_async::test_support::{TEST_API_KEY, gateway_for};
use smartlead_tools::{ToolError, build_registry};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn get_campaign_fills_path_and_formats_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/42"))
        .and(query_param("api_key", TEST_API_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 42, "name": "Q3 outreach"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reg = build_registry(gateway_for(&server.uri())).unwrap();
    let r = reg
        .dispatch("smartlead_get_campaign", json!({"campaign_id": 42}))
        .await;

    assert!(!r.is_error, "{}", r.text());
    let text = r.text();
    assert!(text.starts_with("Campaign\nCampaign: Q3 outreach\n\n"), "{text}");
    assert!(text.contains("\"id\": 42"));
}

#[tokio::test]
async fn list_campaigns_sends_filters_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("client_id", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    let reg = build_registry(gateway_for(&server.uri())).unwrap();
    let r = reg
        .dispatch("smartlead_list_campaigns", json!({"client_id": 12}))
        .await;
    assert!(r.text().contains("Found 2 campaigns"), "{}", r.text());
}

#[tokio::test]
async fn create_client_posts_body_without_nulls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/client/save"))
        .and(body_json(json!({
            "name": "Acme",
            "email": "ops@acme.example",
            "is_whitelabel": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "id": 77})))
        .expect(1)
        .mount(&server)
        .await;

    let reg = build_registry(gateway_for(&server.uri())).unwrap();
    let r = reg
        .dispatch(
            "smartlead_add_client_to_system",
            json!({"name": "Acme", "email": "ops@acme.example"}),
        )
        .await;
    assert!(r.text().contains("Client ID: 77"), "{}", r.text());
}

#[tokio::test]
async fn smart_delivery_tools_route_to_their_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sd/spam-test/99/dkim-details"))
        .and(query_param("api_key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dkim": "pass"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sd/spam-test/sender-account-wise-report"))
        .and(query_param("test_id", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let reg = build_registry(gateway_for(&server.uri())).unwrap();
    let v = reg
        .dispatch_json("smartlead_get_dkim_details", json!({"test_id": 99}))
        .await
        .unwrap();
    assert_eq!(v, json!({"dkim": "pass"}));
    reg.dispatch_json("smartlead_get_sender_account_wise_report", json!({"test_id": 99}))
        .await
        .unwrap();
}

#[tokio::test]
async fn invalid_input_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let reg = build_registry(gateway_for(&server.uri())).unwrap();
    let cases = [
        ("smartlead_get_campaign", json!({}), Some("campaign_id")),
        ("smartlead_get_campaign", json!({"campaign_id": "x"}), Some("campaign_id")),
        ("smartlead_get_lead_by_email", json!({"email": "nope"}), Some("email")),
        (
            "smartlead_analytics_overall_stats_v2",
            json!({"start_date": "2024-12-01", "end_date": "2024-01-01"}),
            Some("end_date"),
        ),
        (
            "smartlead_update_campaign_status",
            json!({"campaign_id": 1, "status": "RUNNING"}),
            Some("status"),
        ),
    ];
    for (tool, args, field) in cases {
        let err = reg.dispatch_json(tool, args).await.unwrap_err();
        let n = err.normalized();
        assert_eq!(n.kind, ErrorKind::Validation, "{tool}: {err}");
        assert_eq!(n.field.as_deref(), field, "{tool}: {err}");
    }
}

#[tokio::test]
async fn upstream_rejection_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/5"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Campaign not found"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let reg = build_registry(gateway_for(&server.uri())).unwrap();
    let err = reg
        .dispatch_json("smartlead_get_campaign", json!({"campaign_id": 5}))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ToolError::RequestRejected {
            status: Some(404),
            message: "Campaign not found".into()
        }
    );

    let r = reg
        .dispatch("smartlead_get_campaign", json!({"campaign_id": 5}))
        .await;
    assert!(r.is_error);
    assert_eq!(r.text(), "Error (request_rejected) HTTP 404: Campaign not found");
    assert!(!r.text().contains(TEST_API_KEY));
}

#[tokio::test]
async fn exhausted_retries_report_the_cause() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(3)
        .mount(&server)
        .await;

    let reg = build_registry(gateway_for(&server.uri())).unwrap();
    let err = reg
        .dispatch_json("smartlead_get_all_clients", Value::Null)
        .await
        .unwrap_err();
    let n = err.normalized();
    assert_eq!(n.kind, ErrorKind::RetriesExhausted);
    assert_eq!(n.status, Some(503));
    assert_eq!(n.cause.as_deref(), Some("HTTP 503: busy"));
}

#[tokio::test]
async fn empty_success_body_is_null_payload() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/client/api-key/8"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let reg = build_registry(gateway_for(&server.uri())).unwrap();
    let r = reg
        .dispatch("smartlead_delete_client_api_key", json!({"api_key_id": 8}))
        .await;
    assert!(!r.is_error);
    assert_eq!(r.text(), "Client API key deleted\n\nnull");
}
