use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::AppState;
use shared::{parse_records, DataError, SeriesSummary};

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Row statistics for the served dataset
pub async fn summary(
    State(state): State<AppState>,
) -> Result<Json<SeriesSummary>, (StatusCode, Json<Value>)> {
    let text = tokio::fs::read_to_string(state.dataset_path())
        .await
        .map_err(|e| reject(DataError::Io(e)))?;
    let rows = parse_records(&text).map_err(reject)?;
    Ok(Json(SeriesSummary::from_records(&rows)))
}

fn reject(err: DataError) -> (StatusCode, Json<Value>) {
    let status = match err {
        DataError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        DataError::Io(_) | DataError::Http(_) | DataError::Build(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        DataError::Csv(_) | DataError::MissingColumn(_) | DataError::Empty => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    tracing::error!("Summary error: {err}");
    (status, Json(json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn state_for(dir: PathBuf, dataset: &str) -> AppState {
        AppState {
            data_dir: dir,
            dataset: dataset.to_string(),
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stockwalk-server-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_summary_counts_valid_rows() {
        let dir = temp_dir("ok");
        std::fs::write(dir.join("s.csv"), "date,open,close\nd1,10,12\nd2,abc,3\nd3,12,9\n").unwrap();

        let Json(summary) = summary(State(state_for(dir, "s.csv"))).await.unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.valid_rows, 2);
        assert_eq!(summary.max_close, Some(12.0));
    }

    #[tokio::test]
    async fn test_summary_missing_file() {
        let dir = temp_dir("missing");
        let (status, _) = summary(State(state_for(dir, "nope.csv"))).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_summary_bad_header() {
        let dir = temp_dir("bad");
        std::fs::write(dir.join("b.csv"), "day,price\n1,2\n").unwrap();
        let (status, _) = summary(State(state_for(dir, "b.csv"))).await.unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(v) = health().await;
        assert_eq!(v["status"], "ok");
    }
}
