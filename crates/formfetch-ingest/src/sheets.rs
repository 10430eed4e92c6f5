//! Spreadsheet row source
//!
//! Thin client for the spreadsheet values REST endpoint. The sheet is read
//! as a header row plus record rows; each record is surfaced as a
//! column-name to cell map. Any failure here means no candidates can be
//! retrieved at all, so every error maps to
//! [`IngestError::SourceUnavailable`] (or a credentials error), the single
//! fatal condition of a run.

use crate::auth::TokenProvider;
use crate::error::{IngestError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Response body of the values endpoint
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Client for the spreadsheet row source
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: Url,
    sheet_id: String,
    range: String,
    token: Arc<dyn TokenProvider>,
}

impl SheetsClient {
    /// Create a new client
    ///
    /// `base_url` is configurable so tests can point the client at a local
    /// mock server.
    pub fn new(
        base_url: &str,
        sheet_id: impl Into<String>,
        range: impl Into<String>,
        token: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| IngestError::config(format!("invalid sheets base URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("formfetch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            sheet_id: sheet_id.into(),
            range: range.into(),
            token,
        })
    }

    /// Fetch all record rows as column-name to cell maps
    ///
    /// The first sheet row is the header; cells missing from short rows are
    /// surfaced as empty strings.
    pub async fn all_rows(&self) -> Result<Vec<HashMap<String, String>>> {
        let values = self.values().await?;

        let mut rows = values.into_iter();
        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        debug!(?header, "sheet header row");

        let mapped = rows
            .map(|row| {
                header
                    .iter()
                    .enumerate()
                    .map(|(i, column)| {
                        (column.clone(), row.get(i).cloned().unwrap_or_default())
                    })
                    .collect()
            })
            .collect();

        Ok(mapped)
    }

    /// Fetch the header row (diagnostics only)
    pub async fn header_row(&self) -> Result<Vec<String>> {
        let values = self.values().await?;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    async fn values(&self) -> Result<Vec<Vec<String>>> {
        let token = self.token.token()?;
        let url = self.values_url()?;

        debug!(url = %url, "fetching sheet values");

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IngestError::source_unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::source_unavailable(format!(
                "sheet request returned HTTP {}",
                status
            )));
        }

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| IngestError::source_unavailable(format!("invalid sheet response: {}", e)))?;

        Ok(body.values)
    }

    fn values_url(&self) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IngestError::config("sheets base URL cannot be a base"))?
            .extend(["v4", "spreadsheets", &self.sheet_id, "values", &self.range]);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: &str, token_dir: &std::path::Path) -> SheetsClient {
        let token_path = token_dir.join("token");
        std::fs::write(&token_path, "test-token").unwrap();
        SheetsClient::new(
            base,
            "sheet1",
            "Responses",
            Arc::new(StaticTokenProvider::new(token_path)),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_values_url() {
        let dir = tempfile::tempdir().unwrap();
        let c = client("https://sheets.example", dir.path());
        assert_eq!(
            c.values_url().unwrap().as_str(),
            "https://sheets.example/v4/spreadsheets/sheet1/values/Responses"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let token = Arc::new(StaticTokenProvider::new("/tmp/token"));
        let result = SheetsClient::new(
            "not a url",
            "sheet1",
            "A:Z",
            token,
            Duration::from_secs(5),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_all_rows_zips_header() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet1/values/Responses"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [
                    ["Timestamp", "Photo", "Count"],
                    ["2024-01-01 10:00:00", "https://x.example/a.jpg", "3"],
                    // short row: trailing cells come back empty
                    ["2024-01-02 11:00:00"],
                ]
            })))
            .mount(&server)
            .await;

        let c = client(&server.uri(), dir.path());

        let header_row = c.header_row().await.unwrap();
        assert_eq!(header_row, vec!["Timestamp", "Photo", "Count"]);

        let rows = c.all_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Photo"], "https://x.example/a.jpg");
        assert_eq!(rows[1]["Timestamp"], "2024-01-02 11:00:00");
        assert_eq!(rows[1]["Photo"], "");
    }

    #[tokio::test]
    async fn test_server_error_is_source_unavailable() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let c = client(&server.uri(), dir.path());
        assert!(matches!(
            c.all_rows().await,
            Err(IngestError::SourceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_sheet_yields_no_rows() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let c = client(&server.uri(), dir.path());
        assert!(c.all_rows().await.unwrap().is_empty());
        assert!(c.header_row().await.unwrap().is_empty());
    }
}
