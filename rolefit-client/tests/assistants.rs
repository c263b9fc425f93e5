use httpmock::prelude::*;
use rolefit_client::api::alarms::{AlarmParams, AlarmRuleSpec, Severity};
use rolefit_client::api::llm::ChatRequest;
use rolefit_client::api::llm_config::OutgoingMessage;
use rolefit_devkit::TestHarness;
use serde_json::json;

fn provider(id: &str, free: bool) -> serde_json::Value {
    json!({"id": id, "name": id.to_uppercase(), "default_model": format!("{id}-chat"), "free": free, "models": []})
}

#[tokio::test]
async fn test_simple_chat_uses_query_string() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/llm/chat/simple")
            .query_param("message", "why is WS-01 slow?")
            .query_param_missing("provider")
            .header_missing("content-type");
        then.status(200)
            .json_body(json!({"content": "GPU bound", "model": "glm-4-flash", "provider": "zhipu"}));
    });

    let reply = harness
        .client
        .llm()
        .simple_chat("why is WS-01 slow?", None)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(reply.content, "GPU bound");
    assert_eq!(reply.usage.total_tokens, 0);
}

#[tokio::test]
async fn test_chat_body_skips_unset_options() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/llm/chat")
            .json_body(json!({"message": "hi", "provider": "deepseek"}));
        then.status(200).json_body(json!({
            "content": "hello",
            "model": "deepseek-chat",
            "provider": "deepseek",
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }));
    });

    let request = ChatRequest {
        provider: Some("deepseek".into()),
        ..ChatRequest::new("hi")
    };
    let reply = harness.client.llm().chat(&request).await.unwrap();

    mock.assert();
    assert_eq!(reply.usage.total_tokens, 5);
}

#[tokio::test]
async fn test_free_providers_filtered_locally() {
    let harness = TestHarness::logged_in("t");
    harness.backend.server().mock(|when, then| {
        when.method(GET).path("/api/llm/providers");
        then.status(200)
            .json_body(json!([provider("zhipu", true), provider("openai", false), provider("siliconflow", true)]));
    });

    let free = harness.client.llm().free_providers().await.unwrap();
    let ids: Vec<&str> = free.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["zhipu", "siliconflow"]);
}

#[tokio::test]
async fn test_chat_session_round_trip() {
    let harness = TestHarness::logged_in("t");
    let send = harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/llm-config/chat/s-1")
            .json_body(json!({"role": "user", "content": "ping"}));
        then.status(200)
            .json_body(json!({"role": "assistant", "content": "pong", "session_id": "s-1"}));
    });
    let history = harness.backend.server().mock(|when, then| {
        when.method(GET).path("/api/llm-config/chat/s-1").query_param("limit", "2");
        then.status(200).json_body(json!([
            {"role": "user", "content": "ping"},
            {"role": "assistant", "content": "pong"}
        ]));
    });

    let settings = harness.client.llm_config();
    let reply = settings.send_chat("s-1", &OutgoingMessage::user("ping")).await.unwrap();
    let messages = settings.chat_history("s-1", Some(2)).await.unwrap();

    send.assert();
    history.assert();
    assert_eq!(reply.content, "pong");
    assert!(reply.error.is_none());
    assert_eq!(messages.len(), 2);
}

#[tokio::test]
async fn test_alarm_list_is_bare_array() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(GET)
            .path("/api/alarms")
            .query_param("is_resolved", "false")
            .query_param_missing("severity");
        then.status(200).json_body(json!([{
            "id": "a1",
            "rule_id": null,
            "device_id": "d1",
            "alarm_type": "device_offline",
            "severity": "warning",
            "title": "WS-01 offline",
            "message": "no heartbeat for 10 minutes",
            "is_resolved": false,
            "created_at": "2025-03-01T09:30:00"
        }]));
    });

    let params = AlarmParams {
        is_resolved: Some(false),
        ..Default::default()
    };
    let alarms = harness.client.alarms().list(&params).await.unwrap();

    mock.assert();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0].severity, Severity::Warning);
    assert!(alarms[0].resolved_at.is_none());
}

#[tokio::test]
async fn test_resolve_and_check_send_no_body() {
    let harness = TestHarness::logged_in("t");
    let resolve = harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/alarms/a1/resolve")
            .header_missing("content-type");
        then.status(200).json_body(json!({
            "id": "a1",
            "alarm_type": "test_failed",
            "severity": "critical",
            "title": "t",
            "message": "m",
            "is_resolved": true,
            "resolved_at": "2025-03-01T10:00:00",
            "created_at": "2025-03-01T09:30:00"
        }));
    });
    let check = harness.backend.server().mock(|when, then| {
        when.method(POST).path("/api/alarms/check").header_missing("content-type");
        then.status(200).json_body(json!({"checked": 2, "message": "2 new alarms"}));
    });

    let alarm = harness.client.alarms().resolve("a1").await.unwrap();
    let sweep = harness.client.alarms().check().await.unwrap();

    resolve.assert();
    check.assert();
    assert!(alarm.is_resolved);
    assert!(alarm.resolved_at.is_some());
    assert_eq!(sweep.checked, 2);
}

#[tokio::test]
async fn test_rule_filter_and_create() {
    let harness = TestHarness::logged_in("t");
    let list = harness.backend.server().mock(|when, then| {
        when.method(GET).path("/api/alarms/rules").query_param("enabled", "true");
        then.status(200).json_body(json!([]));
    });
    let create = harness.backend.server().mock(|when, then| {
        when.method(POST).path("/api/alarms/rules").json_body(json!({
            "name": "cpu hot",
            "alarm_type": "performance",
            "condition": "cpu_percent > threshold",
            "threshold": 95.0,
            "enabled": true
        }));
        then.status(200).json_body(json!({
            "id": "r1",
            "name": "cpu hot",
            "alarm_type": "performance",
            "condition": "cpu_percent > threshold",
            "threshold": 95.0,
            "enabled": true,
            "created_at": "2025-03-01T09:30:00"
        }));
    });

    let alarms = harness.client.alarms();
    assert!(alarms.rules(Some(true)).await.unwrap().is_empty());
    let rule = alarms
        .create_rule(&AlarmRuleSpec {
            name: "cpu hot".into(),
            alarm_type: "performance".into(),
            condition: "cpu_percent > threshold".into(),
            threshold: Some(95.0),
            enabled: true,
            notification_channels: vec![],
        })
        .await
        .unwrap();

    list.assert();
    create.assert();
    assert_eq!(rule.id, "r1");
    assert!(rule.notification_channels.is_none());
}
