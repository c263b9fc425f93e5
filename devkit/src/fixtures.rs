/*!
Fixtures JSON du backend RoleFit

Chaque constructeur renvoie un `serde_json::Value` au format exact des
réponses du backend, prêt à être servi par `MockBackend::respond`.
*/

use serde_json::{json, Value};

pub struct Fixtures;

impl Fixtures {
    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    /// Corps d'erreur FastAPI
    pub fn error_detail<S: Into<String>>(detail: S) -> Value {
        json!({ "detail": detail.into() })
    }

    /// Réponse paginée `{total, page, page_size, items}`
    pub fn page(items: Vec<Value>, page: u32, page_size: u32, total: u64) -> Value {
        json!({
            "total": total,
            "page": page,
            "page_size": page_size,
            "items": items
        })
    }

    /// Réponse non paginée `{total, items}`
    pub fn listing(items: Vec<Value>) -> Value {
        json!({
            "total": items.len(),
            "items": items
        })
    }

    pub fn user<S: Into<String>>(username: S) -> Value {
        json!({
            "id": "u-1",
            "username": username.into(),
            "email": "ops@rolefit.local",
            "full_name": "Ops Team",
            "role": "admin",
            "is_active": true,
            "created_at": "2025-01-01T00:00:00",
            "updated_at": "2025-01-01T00:00:00"
        })
    }

    /// Réponse de `/auth/login` et `/auth/refresh`
    pub fn token_response<S: Into<String>>(access_token: S) -> Value {
        json!({
            "access_token": access_token.into(),
            "refresh_token": "refresh-xyz",
            "expires_in": 1800,
            "token_type": "bearer",
            "user": Self::user("admin")
        })
    }

    pub fn device<S: Into<String>>(id: S, status: &str) -> Value {
        let id = id.into();
        json!({
            "id": id,
            "device_name": format!("WS-{id}"),
            "mac_address": "AA:BB:CC:DD:EE:01",
            "ip_address": "192.168.1.20",
            "hostname": format!("ws-{id}"),
            "department": "Render",
            "position": "3D Artist",
            "status": status,
            "last_seen_at": Self::now(),
            "registered_at": "2025-01-10T08:00:00",
            "cpu_model": "AMD Ryzen 9 7950X",
            "cpu_cores": 16,
            "cpu_threads": 32,
            "gpu_model": "NVIDIA RTX 4090",
            "gpu_vram_mb": 24576,
            "ram_total_gb": 64.0,
            "disk_type": "NVMe",
            "os_name": "Windows 11 Pro"
        })
    }

    pub fn task<S: Into<String>>(id: S, status: &str) -> Value {
        json!({
            "id": id.into(),
            "task_name": "Render benchmark",
            "task_type": "benchmark",
            "task_status": status,
            "target_device_ids": ["d1", "d2"],
            "target_departments": [],
            "target_positions": [],
            "test_script_id": "s1",
            "test_duration_seconds": 300,
            "sample_interval_ms": 1000,
            "schedule_type": "immediate",
            "created_by": "u-1",
            "created_at": "2025-02-01T09:00:00Z",
            "updated_at": Self::now()
        })
    }

    pub fn result<S: Into<String>>(id: S, device_id: &str, overall: f64) -> Value {
        json!({
            "id": id.into(),
            "task_id": "t1",
            "device_id": device_id,
            "test_type": "benchmark",
            "test_status": "passed",
            "start_time": "2025-02-01T09:00:00",
            "end_time": "2025-02-01T09:05:00",
            "duration_seconds": 300,
            "overall_score": overall,
            "cpu_score": overall + 2.0,
            "gpu_score": overall - 3.0,
            "memory_score": overall,
            "disk_score": overall + 1.0,
            "is_standard_met": overall >= 80.0,
            "fail_reasons": null,
            "performance_summary": {"avg_fps": 58.2},
            "created_at": "2025-02-01T09:05:01"
        })
    }

    pub fn execution<S: Into<String>>(id: S, exit_code: i32) -> Value {
        json!({
            "id": id.into(),
            "task_id": "t1",
            "script_id": "s1",
            "device_id": "d1",
            "start_time": "2025-02-01T09:00:00",
            "end_time": if exit_code >= 0 { json!("2025-02-01T09:05:00") } else { Value::Null },
            "duration_seconds": if exit_code >= 0 { json!(300) } else { Value::Null },
            "exit_code": exit_code,
            "error_message": null,
            "created_at": "2025-02-01T09:00:00"
        })
    }

    pub fn position<S: Into<String>>(id: S, department: &str) -> Value {
        json!({
            "id": id.into(),
            "position_name": "3D Artist",
            "position_code": "ART3D",
            "department": department,
            "description": null,
            "is_active": true,
            "created_at": "2025-01-01T00:00:00"
        })
    }

    pub fn dashboard() -> Value {
        json!({
            "total_devices": 42,
            "online_devices": 30,
            "offline_devices": 10,
            "testing_devices": 2,
            "total_tasks": 12,
            "pending_tasks": 3,
            "running_tasks": 1,
            "completed_tasks": 8,
            "total_tests": 120,
            "passed_tests": 100,
            "failed_tests": 20,
            "average_score": 82.5
        })
    }

    pub fn analysis(device_id: &str, status: &str) -> Value {
        json!({
            "id": if status == "processing" { Value::Null } else { json!("rep-1") },
            "device_id": device_id,
            "analysis_type": "metrics",
            "title": "Realtime performance analysis",
            "summary": "GPU bound under load",
            "details": {"gpu_avg": 97.1},
            "conclusions": null,
            "recommendations": null,
            "status": status
        })
    }
}
