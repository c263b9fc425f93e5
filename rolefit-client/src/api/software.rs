//! Software catalog: what can be installed and benchmarked on a device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Page;
use crate::timestamp;
use crate::transport::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareType {
    Installer,
    Portable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    Exe,
    Msi,
    Zip,
    Rar,
    #[serde(rename = "7z")]
    SevenZip,
}

/// How the agent decides the software is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    File,
    Process,
    Registry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Software {
    pub id: String,
    pub software_name: String,
    pub software_code: String,
    pub vendor: Option<String>,
    pub category: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub launch_params: Option<String>,
    pub icon: Option<String>,
    #[serde(flatten)]
    pub install: InstallSpec,
    pub is_active: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Installation and detection settings, flat on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_type: Option<SoftwareType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_format: Option<PackageFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_install_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subfolder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent_install_cmd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_exe_relative_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<DetectionMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_keyword: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SoftwareCreate {
    pub software_name: String,
    pub software_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub install: InstallSpec,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SoftwareUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub install: InstallSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SoftwareParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

pub struct SoftwareCatalog<'a> {
    pub(crate) client: &'a ApiClient,
}

impl SoftwareCatalog<'_> {
    pub async fn list(&self, params: &SoftwareParams) -> Result<Page<Software>, ApiError> {
        self.client.get_with(&["software"], params).await
    }

    pub async fn get(&self, id: &str) -> Result<Software, ApiError> {
        self.client.get(&["software", id]).await
    }

    pub async fn create(&self, software: &SoftwareCreate) -> Result<Software, ApiError> {
        self.client.post(&["software"], software).await
    }

    pub async fn update(&self, id: &str, patch: &SoftwareUpdate) -> Result<Software, ApiError> {
        self.client.put(&["software", id], patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&["software", id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_with_install_fields_stays_flat() {
        let patch = SoftwareUpdate {
            version: Some("4.1".into()),
            install: InstallSpec {
                package_format: Some(PackageFormat::SevenZip),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"version": "4.1", "package_format": "7z"})
        );
    }
}
