use httpmock::prelude::*;
use rolefit_client::api::devices::{DeviceParams, DeviceStatus, DeviceUpdate};
use rolefit_client::api::results::ResultParams;
use rolefit_client::api::tasks::{TaskStatus, TaskUpdate};
use rolefit_devkit::{backend_test, Fixtures, TestHarness};
use serde_json::json;

#[tokio::test]
async fn test_list_without_params_sends_no_query() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(GET)
            .path("/api/devices")
            .query_param_missing("page")
            .query_param_missing("page_size")
            .query_param_missing("status")
            .query_param_missing("department")
            .query_param_missing("position")
            .query_param_missing("keyword");
        then.status(200).json_body(Fixtures::page(vec![], 1, 20, 0));
    });

    let page = harness.client.devices().list(&DeviceParams::default()).await.unwrap();
    assert!(page.items.is_empty());
    mock.assert();
}

#[tokio::test]
async fn test_pagination_echo_preserved() {
    let harness = TestHarness::logged_in("t");
    let items = (0..10).map(|i| Fixtures::device(format!("d{i}"), "online")).collect();
    let mock = harness.backend.server().mock(|when, then| {
        when.method(GET)
            .path("/api/devices")
            .query_param("page", "2")
            .query_param("page_size", "10")
            .query_param("status", "online")
            .query_param_missing("keyword");
        then.status(200).json_body(Fixtures::page(items, 2, 10, 35));
    });

    let params = DeviceParams {
        page: Some(2),
        page_size: Some(10),
        status: Some(DeviceStatus::Online),
        ..Default::default()
    };
    let page = harness.client.devices().list(&params).await.unwrap();

    mock.assert();
    assert_eq!((page.page, page.page_size, page.total), (2, 10, 35));
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.page_count(), 4);
    assert!(page.has_next());
}

#[tokio::test]
async fn test_update_sends_only_set_fields() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(PUT)
            .path("/api/devices/d1")
            .json_body(json!({"department": "Render", "notes": "moved to 3F"}));
        then.status(200).json_body(Fixtures::device("d1", "online"));
    });

    let patch = DeviceUpdate {
        department: Some("Render".into()),
        notes: Some("moved to 3F".into()),
        ..Default::default()
    };
    harness.client.devices().update("d1", &patch).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_task_status_patch() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(PUT).path("/api/tasks/t1").json_body(json!({"task_status": "cancelled"}));
        then.status(200).json_body(Fixtures::task("t1", "cancelled"));
    });

    let patch = TaskUpdate {
        task_status: Some(TaskStatus::Cancelled),
        ..Default::default()
    };
    let task = harness.client.tasks().update("t1", &patch).await.unwrap();
    assert!(task.task_status.is_terminal());
    mock.assert();
}

#[tokio::test]
async fn test_execute_posts_device_ids() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/tasks/t1/execute")
            .header("authorization", "Bearer t")
            .json_body(json!({"device_ids": ["d1", "d2"]}));
        then.status(200).json_body(Fixtures::task("t1", "running"));
    });

    let task = harness
        .client
        .tasks()
        .execute("t1", &["d1".to_string(), "d2".to_string()])
        .await
        .unwrap();
    assert_eq!(task.task_status, TaskStatus::Running);
    mock.assert();
}

#[tokio::test]
async fn test_execute_conflict_surfaces_status() {
    let harness = TestHarness::logged_in("t");
    harness.backend.fail(POST, "tasks/t1/execute", 409, "Device d2 is already testing");

    let err = harness
        .client
        .tasks()
        .execute("t1", &["d1".to_string(), "d2".to_string()])
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.status().map(|s| s.as_u16()), Some(409));
    assert_eq!(err.backend_message(), Some("Device d2 is already testing"));
    assert_eq!(harness.session_clears(), 0);
}

#[tokio::test]
async fn test_cancel_without_reason_sends_empty_object() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(POST).path("/api/tasks/t1/cancel").json_body(json!({}));
        then.status(200).json_body(Fixtures::task("t1", "cancelled"));
    });

    harness.client.tasks().cancel("t1", None).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_compare_joins_device_ids() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(GET)
            .path("/api/results/compare")
            .query_param("device_ids", "d1,d2,d3");
        then.status(200).json_body(json!([{
            "device_id": "d1",
            "device_name": "WS-d1",
            "cpu_model": "Ryzen 9",
            "gpu_model": null,
            "ram_total_gb": 64.0,
            "latest_result": null,
            "statistics": {"average_score": null, "max_score": null, "min_score": null, "test_count": 0}
        }]));
    });

    let ids = ["d1", "d2", "d3"].map(String::from);
    let rows = harness.client.results().compare(&ids).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].latest_result.is_none());
    mock.assert();
}

#[tokio::test]
async fn test_result_filters() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(GET)
            .path("/api/results")
            .query_param("device_id", "d1")
            .query_param("is_standard_met", "true")
            .query_param_missing("task_id");
        then.status(200).json_body(Fixtures::page(vec![Fixtures::result("r1", "d1", 88.0)], 1, 20, 1));
    });

    let params = ResultParams {
        device_id: Some("d1".into()),
        is_standard_met: Some(true),
        ..Default::default()
    };
    let page = harness.client.results().list(&params).await.unwrap();
    assert_eq!(page.items[0].scores.overall_score, Some(88.0));
    assert_eq!(page.items[0].is_standard_met, Some(true));
    mock.assert();
}

#[tokio::test]
async fn test_reorder_sends_bare_id_array() {
    let harness = TestHarness::logged_in("t");
    let card = |id: &str, order: i32| {
        json!({
            "id": id, "card_key": id, "title": id, "is_visible": true,
            "sort_order": order, "is_custom": false
        })
    };
    let mock = harness.backend.server().mock(|when, then| {
        when.method(PUT).path("/api/feature-cards/reorder").json_body(json!(["c2", "c1"]));
        then.status(200).json_body(Fixtures::listing(vec![card("c2", 0), card("c1", 1)]));
    });

    let listing = harness
        .client
        .feature_cards()
        .reorder(&["c2".to_string(), "c1".to_string()])
        .await
        .unwrap();
    assert_eq!(listing.total, 2);
    assert_eq!(listing.items[0].id, "c2");
    mock.assert();
}

#[tokio::test]
async fn test_ai_processing_is_returned_not_polled() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/ai/analyze/metrics")
            .query_param("device_id", "d1")
            .query_param("seconds", "120");
        then.status(200).json_body(Fixtures::analysis("d1", "processing"));
    });

    let analysis = harness.client.ai().analyze_metrics("d1", Some(120)).await.unwrap();
    assert!(analysis.is_processing());
    harness.expect_calls(&mock, 1).unwrap();
}

#[tokio::test]
async fn test_leaderboard_limit_is_optional() {
    let harness = TestHarness::logged_in("t");
    let without = harness.backend.server().mock(|when, then| {
        when.method(GET).path("/api/stats/leaderboard/devices").query_param_missing("limit");
        then.status(200).json_body(json!([]));
    });

    assert!(harness.client.stats().leaderboard(None).await.unwrap().is_empty());
    without.assert();
}

#[tokio::test]
async fn test_realtime_metrics_window() {
    let harness = TestHarness::logged_in("t");
    let mock = harness.backend.server().mock(|when, then| {
        when.method(GET)
            .path("/api/performance/metrics/realtime/d1")
            .query_param("seconds", "30");
        then.status(200).json_body(json!({
            "device_id": "d1",
            "metrics": [{
                "id": "m1", "device_id": "d1", "timestamp": "2025-02-01T09:00:00",
                "cpu_percent": 41.5, "gpu_percent": 97.0, "memory_percent": 63.2
            }],
            "averages": {"cpu_percent": 41.5}
        }));
    });

    let window = harness.client.devices().realtime_metrics("d1", Some(30)).await.unwrap();
    assert_eq!(window.metrics.len(), 1);
    assert_eq!(window.averages["cpu_percent"], 41.5);
    mock.assert();
}

#[tokio::test]
async fn test_agent_execution_lifecycle() {
    let harness = TestHarness::logged_in("t");
    let start = harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/agent/executions/start")
            .query_param("script_id", "s1")
            .query_param("device_id", "d1")
            .query_param_missing("task_id");
        then.status(200)
            .json_body(json!({"execution_id": "e1", "start_time": "2025-02-01T09:00:00"}));
    });
    let complete = harness.backend.server().mock(|when, then| {
        when.method(PUT)
            .path("/api/agent/executions/e1/complete")
            .json_body(json!({"exit_code": 0}));
        then.status(200)
            .json_body(json!({"execution_id": "e1", "success": true, "duration_seconds": 300}));
    });

    let agent = harness.client.agent();
    let started = agent.start("s1", "d1", None).await.unwrap();
    let done = agent
        .complete(&started.execution_id, &Default::default())
        .await
        .unwrap();
    assert!(done.success);
    start.assert();
    complete.assert();
}

backend_test!(test_missing_position_is_not_found, |harness| {
    harness.backend.fail(GET, "positions/p404", 404, "Position not found");
    let err = harness.client.positions().get("p404").await.unwrap_err();
    anyhow::ensure!(err.is_not_found() && err.is_client_error(), "unexpected error: {err}");
    Ok(())
});

backend_test!(test_delete_script_accepts_no_content, |harness| {
    let mock = harness.backend.no_content(DELETE, "scripts/s1");
    harness.client.scripts().delete("s1").await?;
    harness.expect_calls(&mock, 1)
});
