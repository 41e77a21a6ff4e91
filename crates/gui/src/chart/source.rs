//! Where chart data comes from: a local file, a URL or inline text.

use std::path::PathBuf;

use shared::{parse_records, DataError, TabularRecord};

pub const DEFAULT_SOURCE: &str = "data/stock_dummy_data.csv";

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
    /// CSV text held in memory
    Inline(String),
}

impl DataSource {
    /// `http://` and `https://` locations are URLs, anything else is a path
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Url(u) => u.clone(),
            Self::Inline(text) => format!("inline ({} bytes)", text.len()),
        }
    }

    pub async fn fetch_text(&self) -> Result<String, DataError> {
        match self {
            Self::Path(path) => Ok(tokio::fs::read_to_string(path).await?),
            Self::Url(url) => {
                let response = reqwest::get(url.as_str())
                    .await
                    .map_err(|e| DataError::Http(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(DataError::Http(format!("{url} returned {status}")));
                }
                response
                    .text()
                    .await
                    .map_err(|e| DataError::Http(e.to_string()))
            }
            Self::Inline(text) => Ok(text.clone()),
        }
    }

    /// Fetch and decode
    pub async fn load(&self) -> Result<Vec<TabularRecord>, DataError> {
        let text = self.fetch_text().await?;
        tracing::debug!(source = %self.describe(), bytes = text.len(), "dataset fetched");
        parse_records(&text)
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Path(PathBuf::from(DEFAULT_SOURCE))
    }
}
