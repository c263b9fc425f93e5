//! Devices and their performance telemetry.
//!
//! CRUD lives under `/devices`; metrics, status rollup and benchmarks live
//! under `/performance` but are keyed by device, so they are exposed here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::{Listing, Page};
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Registered,
    Online,
    Offline,
    Testing,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub device_name: String,
    /// Unique per device on the backend; never checked here.
    pub mac_address: String,
    pub ip_address: Option<String>,
    pub hostname: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub status: DeviceStatus,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_seen_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub registered_at: DateTime<Utc>,
    #[serde(flatten)]
    pub hardware: HardwareInventory,
}

/// Hardware snapshot reported by the agent. Flat on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareInventory {
    pub cpu_model: Option<String>,
    pub cpu_cores: Option<u32>,
    pub cpu_threads: Option<u32>,
    pub cpu_base_clock: Option<f64>,
    pub gpu_model: Option<String>,
    pub gpu_vram_mb: Option<u64>,
    pub gpu_driver_version: Option<String>,
    #[serde(default)]
    pub all_gpus: Option<Vec<GpuInfo>>,
    pub ram_total_gb: Option<f64>,
    pub ram_frequency: Option<u32>,
    pub ram_sticks: Option<u32>,
    #[serde(default)]
    pub all_memory: Option<Vec<MemoryModule>>,
    pub disk_model: Option<String>,
    pub disk_capacity_tb: Option<f64>,
    pub disk_type: Option<String>,
    #[serde(default)]
    pub all_disks: Option<Vec<DiskInfo>>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub os_build: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuInfo {
    pub name: String,
    pub vram_mb: u64,
    pub driver_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryModule {
    pub capacity_mb: u64,
    pub speed: Option<u32>,
    pub manufacturer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskInfo {
    pub model: String,
    pub capacity_tb: f64,
    #[serde(rename = "type")]
    pub disk_type: Option<String>,
    pub interface: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceCreate {
    pub device_name: String,
    pub mac_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update: only the fields set here are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub id: String,
    pub device_id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: Option<f64>,
    pub gpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_read_mbps: Option<f64>,
    pub disk_write_mbps: Option<f64>,
    pub network_sent_mbps: Option<f64>,
    pub network_recv_mbps: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Serialize)]
struct DeviceMetricQuery<'a> {
    device_id: &'a str,
    #[serde(flatten)]
    window: &'a MetricParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeMetrics {
    pub device_id: String,
    pub metrics: Vec<PerformanceMetric>,
    #[serde(default)]
    pub averages: serde_json::Value,
}

/// Latest metric + pending alerts + recent benchmarks, computed server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatusRollup {
    pub device_id: String,
    pub latest_metric: Option<PerformanceMetric>,
    pub pending_alerts_count: u32,
    #[serde(default)]
    pub recent_benchmarks: Vec<serde_json::Value>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benchmark {
    pub id: String,
    pub device_id: String,
    pub software_code: String,
    pub benchmark_type: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BenchmarkParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

pub struct Devices<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Devices<'_> {
    pub async fn list(&self, params: &DeviceParams) -> Result<Page<Device>, ApiError> {
        self.client.get_with(&["devices"], params).await
    }

    pub async fn get(&self, id: &str) -> Result<Device, ApiError> {
        self.client.get(&["devices", id]).await
    }

    pub async fn create(&self, device: &DeviceCreate) -> Result<Device, ApiError> {
        self.client.post(&["devices"], device).await
    }

    pub async fn update(&self, id: &str, patch: &DeviceUpdate) -> Result<Device, ApiError> {
        self.client.put(&["devices", id], patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&["devices", id]).await
    }

    pub async fn metrics(&self, device_id: &str, window: &MetricParams) -> Result<Listing<PerformanceMetric>, ApiError> {
        let query = DeviceMetricQuery { device_id, window };
        self.client.get_with(&["performance", "metrics"], &query).await
    }

    pub async fn latest_metric(&self, device_id: &str) -> Result<PerformanceMetric, ApiError> {
        self.client
            .get_with(&["performance", "metrics", "latest"], &[("device_id", device_id)])
            .await
    }

    /// Metrics recorded over the last `seconds`; the backend picks its own
    /// default window when `None`.
    pub async fn realtime_metrics(&self, device_id: &str, seconds: Option<u32>) -> Result<RealtimeMetrics, ApiError> {
        let segments = ["performance", "metrics", "realtime", device_id];
        match seconds {
            Some(seconds) => self.client.get_with(&segments, &[("seconds", seconds)]).await,
            None => self.client.get(&segments).await,
        }
    }

    pub async fn status(&self, device_id: &str) -> Result<DeviceStatusRollup, ApiError> {
        self.client
            .get(&["performance", "devices", device_id, "status"])
            .await
    }

    pub async fn benchmarks(&self, params: &BenchmarkParams) -> Result<Listing<Benchmark>, ApiError> {
        self.client.get_with(&["performance", "benchmarks"], params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_decodes_flat_hardware() {
        let device: Device = serde_json::from_value(serde_json::json!({
            "id": "d1",
            "device_name": "WS-01",
            "mac_address": "AA:BB:CC:DD:EE:01",
            "status": "online",
            "registered_at": "2025-01-10T08:00:00",
            "cpu_model": "Ryzen 9 7950X",
            "cpu_cores": 16,
            "all_gpus": [{"name": "RTX 4090", "vram_mb": 24576, "driver_version": "552.22"}],
            "all_disks": [{"model": "990 PRO", "capacity_tb": 2.0, "type": "NVMe", "interface": "PCIe 4.0"}]
        }))
        .unwrap();

        assert_eq!(device.status, DeviceStatus::Online);
        assert_eq!(device.hardware.cpu_cores, Some(16));
        assert_eq!(device.hardware.all_gpus.as_ref().unwrap()[0].vram_mb, 24576);
        assert_eq!(device.hardware.all_disks.as_ref().unwrap()[0].disk_type.as_deref(), Some("NVMe"));
        assert!(device.last_seen_at.is_none());
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let status: DeviceStatus = serde_json::from_str("\"maintenance\"").unwrap();
        assert_eq!(status, DeviceStatus::Unknown);
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let patch = DeviceUpdate {
            department: Some("Render".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), serde_json::json!({"department": "Render"}));
    }
}
