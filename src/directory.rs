//! Seoul open data subway station lookup

use crate::runtime::StationDirectory;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://openapi.seoul.go.kr:8088";
const SERVICE: &str = "SearchInfoBySubwayNameService";
const SUCCESS_CODE: &str = "INFO-000";

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no API key configured")]
    NotConfigured,
    #[error("invalid directory URL: {0}")]
    Url(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("directory returned HTTP {0}")]
    Status(u16),
    #[error("malformed directory response: {0}")]
    Parse(String),
}

pub struct SeoulSubwayDirectory {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl SeoulSubwayDirectory {
    pub fn new(api_key: Option<String>, base_url: Option<&str>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        }
    }

    /// `{base}/{key}/json/SearchInfoBySubwayNameService/1/5/{name}/`
    fn lookup_url(&self, api_key: &str, name: &str) -> Result<Url, DirectoryError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| DirectoryError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| DirectoryError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend([api_key, "json", SERVICE, "1", "5", name, ""]);
        Ok(url)
    }

    async fn lookup(&self, name: &str) -> Result<bool, DirectoryError> {
        let api_key = self.api_key.as_deref().ok_or(DirectoryError::NotConfigured)?;
        let url = self.lookup_url(api_key, name)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DirectoryError::Parse(e.to_string()))?;
        interpret_response(&body)
    }
}

/// Extract the result code and compare it against the success code.
///
/// The code sits under the service key when rows were found and at the top
/// level for "no data" and error responses.
pub fn interpret_response(body: &Value) -> Result<bool, DirectoryError> {
    let code = body
        .get(SERVICE)
        .and_then(|service| service.get("RESULT"))
        .or_else(|| body.get("RESULT"))
        .and_then(|result| result.get("CODE"))
        .and_then(Value::as_str)
        .ok_or_else(|| DirectoryError::Parse("missing RESULT.CODE".to_string()))?;
    Ok(code == SUCCESS_CODE)
}

#[async_trait]
impl StationDirectory for SeoulSubwayDirectory {
    async fn is_subway_station(&self, name: &str) -> bool {
        match self.lookup(name).await {
            Ok(found) => {
                tracing::debug!(station = %name, found, "Subway lookup");
                found
            }
            Err(e) => {
                tracing::warn!(station = %name, error = %e, "Subway lookup failed, treating as not a station");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_code_under_service() {
        let body = json!({
            "SearchInfoBySubwayNameService": {
                "list_total_count": 1,
                "RESULT": {"CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다"},
                "row": [{"STATION_NM": "강남", "LINE_NUM": "02호선"}]
            }
        });
        assert!(interpret_response(&body).unwrap());
    }

    #[test]
    fn test_no_data_code_at_top_level() {
        let body = json!({"RESULT": {"CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다."}});
        assert!(!interpret_response(&body).unwrap());
    }

    #[test]
    fn test_missing_code_is_error() {
        assert!(interpret_response(&json!({"unexpected": true})).is_err());
    }

    #[test]
    fn test_lookup_url_encodes_name() {
        let directory = SeoulSubwayDirectory::new(Some("KEY".into()), Some("http://localhost:8088/"));
        let url = directory.lookup_url("KEY", "강남").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8088/KEY/json/SearchInfoBySubwayNameService/1/5/%EA%B0%95%EB%82%A8/"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_closed() {
        let directory = SeoulSubwayDirectory::new(None, None);
        assert!(!directory.is_subway_station("강남").await);
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_closed() {
        let directory = SeoulSubwayDirectory::new(Some("KEY".into()), Some("http://127.0.0.1:1"));
        assert!(!directory.is_subway_station("강남").await);
    }
}
