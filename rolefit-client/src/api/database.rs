//! Database export and import.
//!
//! Both calls move files, not JSON, so they skip the decoding path of the
//! transport and map HTTP failures themselves.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::transport::{ensure_success, ApiClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Sqlite,
    Mysql,
    Postgresql,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Sqlite, ExportFormat::Mysql, ExportFormat::Postgresql];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Sqlite => "sqlite",
            ExportFormat::Mysql => "mysql",
            ExportFormat::Postgresql => "postgresql",
        }
    }

    /// Extension of the dump the backend produces.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Sqlite => "db",
            ExportFormat::Mysql | ExportFormat::Postgresql => "sql",
        }
    }

    fn fallback_filename(self) -> String {
        format!("rolefit_export.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(ExportFormat::Sqlite),
            "mysql" => Ok(ExportFormat::Mysql),
            "postgresql" | "postgres" => Ok(ExportFormat::Postgresql),
            other => Err(format!("unknown export format '{other}' (expected sqlite, mysql or postgresql)")),
        }
    }
}

/// A downloaded file, kept as raw bytes.
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub success: bool,
    pub message: String,
    /// Name of the backup the backend took before replacing its data.
    pub backup_file: Option<String>,
}

pub struct Database<'a> {
    pub(crate) client: &'a ApiClient,
}

impl Database<'_> {
    pub async fn export(&self, format: ExportFormat) -> Result<Download, ApiError> {
        let builder = self
            .client
            .request(Method::GET, &["db", "export", format.as_str()])?;
        let response = ensure_success(self.client.execute_raw(builder).await?).await?;

        let headers = response.headers();
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format.fallback_filename());
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(ApiError::Transport)?.to_vec();
        Ok(Download {
            filename,
            content_type,
            bytes,
        })
    }

    /// Export and write the dump into `dir`, returning the written path.
    pub async fn export_to(&self, format: ExportFormat, dir: &Path) -> Result<PathBuf, ApiError> {
        let download = self.export(format).await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&download.filename);
        tokio::fs::write(&path, &download.bytes).await?;
        info!(path = %path.display(), bytes = download.bytes.len(), "database export written");
        Ok(path)
    }

    /// Upload a `.db`, `.sqlite` or `.sql` file as multipart field `file`.
    pub async fn import(&self, path: &Path) -> Result<ImportSummary, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "import.db".to_string());

        info!(file = %filename, bytes = bytes.len(), "uploading database import");
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
        let builder = self
            .client
            .request(Method::POST, &["db", "import"])?
            .multipart(form);
        let response = ensure_success(self.client.execute_raw(builder).await?).await?;

        let body = response.bytes().await.map_err(ApiError::Transport)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Extract a bare file name from a `Content-Disposition` header.
///
/// Handles `filename="x"`, `filename=x` and RFC 5987 `filename*=UTF-8''x`,
/// preferring the extended form. Any directory part is dropped.
fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename" => plain = Some(value.trim().trim_matches('"').to_string()),
            "filename*" => {
                let value = value.trim();
                let encoded = value.rsplit_once("''").map_or(value, |(_, rest)| rest);
                let decoded = urlencoding::decode_binary(encoded.as_bytes());
                extended = Some(String::from_utf8_lossy(&decoded).into_owned());
            }
            _ => {}
        }
    }

    let name = extended.or(plain)?;
    let name = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(ExportFormat::Sqlite.extension(), "db");
        assert_eq!(ExportFormat::Mysql.extension(), "sql");
        assert_eq!(ExportFormat::Postgresql.extension(), "sql");
        assert_eq!("Postgres".parse::<ExportFormat>().unwrap(), ExportFormat::Postgresql);
        assert!("oracle".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_disposition_variants() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="rolefit_pro_backup_20250301_101500.db""#).as_deref(),
            Some("rolefit_pro_backup_20250301_101500.db")
        );
        assert_eq!(filename_from_disposition("attachment; filename=dump.sql").as_deref(), Some("dump.sql"));
        assert_eq!(
            filename_from_disposition("attachment; filename=\"a.sql\"; filename*=UTF-8''b%20c.sql").as_deref(),
            Some("b c.sql")
        );
        assert_eq!(filename_from_disposition("attachment").as_deref(), None);
    }

    #[test]
    fn test_extended_filename_decodes_utf8() {
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''%E6%B5%8B%E8%AF%95_export.sql").as_deref(),
            Some("测试_export.sql")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''half%2").as_deref(),
            Some("half%2")
        );
    }

    #[test]
    fn test_disposition_strips_directories() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="../../etc/passwd""#).as_deref(),
            Some("passwd")
        );
        assert_eq!(filename_from_disposition(r#"attachment; filename="..""#), None);
    }
}
