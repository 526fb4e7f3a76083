//! HTTP surface of the dataset service: one read-only fetch endpoint plus a
//! health check. The dashboard client fetches once, decompresses, and runs
//! filtering and aggregation locally.

use std::io::ErrorKind;
use std::sync::Arc;

use serde::Deserialize;
use tokio::task;
use tracing::{debug, info, warn};
use warp::http::{header, Response, StatusCode};
use warp::hyper::Body;
use warp::{Filter, Rejection, Reply};

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::records::{parse_records, Dataset};
use crate::transport::{self, GzipPayload};

/// Pagination hints the endpoint accepts. The whole dataset is returned
/// regardless; the parameters exist for interface compatibility only.
#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

/// All routes of the service.
pub fn routes(
    config: Arc<ServiceConfig>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path("health").and(warp::get()).and_then(health_check);

    let with_config = warp::any().map(move || config.clone());
    let fetch = warp::path!("api" / "csv")
        .and(warp::get())
        .and(warp::query::<FetchParams>())
        .and(with_config)
        .and_then(fetch_dataset);

    health.or(fetch)
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "ev-dashboard-data",
    })))
}

/// GET /api/csv — parse the configured export and stream it back gzipped.
async fn fetch_dataset(
    params: FetchParams,
    config: Arc<ServiceConfig>,
) -> Result<Response<Body>, Rejection> {
    if params.page.is_some() || params.page_size.is_some() {
        // accepted but not honored; the client always gets the full set
        debug!(page = ?params.page, page_size = ?params.page_size, "ignoring pagination hints");
    }

    match load_and_encode(&config).await {
        Ok(payload) => {
            info!(compressed_bytes = payload.len(), "serving dataset");
            let body = Body::wrap_stream(payload.into_stream(config.chunk_bytes));
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_ENCODING, "gzip")
                .body(body)
                .map_err(|e| warp::reject::custom(ReplyBuild(e.to_string())))
        }
        Err(err) => {
            warn!(%err, "fetch dataset failed");
            Ok(error_response(&err))
        }
    }
}

/// Read, parse and compress the whole export. The file handle is scoped to
/// the read and released on every path; parsing runs on the blocking pool.
async fn load_and_encode(config: &ServiceConfig) -> Result<GzipPayload, ServiceError> {
    let raw = tokio::fs::read(&config.data_path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ServiceError::NotFound
        } else {
            ServiceError::Internal(format!("reading {}: {e}", config.data_path.display()))
        }
    })?;

    let records: Dataset = task::spawn_blocking(move || parse_records(&raw))
        .await
        .map_err(|e| ServiceError::Internal(format!("parser task failed: {e}")))??;

    transport::encode(&records)
}

/// Uncompressed `{"error": ...}` envelope with the status for the fault.
fn error_response(err: &ServiceError) -> Response<Body> {
    let body = warp::reply::json(&serde_json::json!({ "error": err.to_string() }));
    warp::reply::with_status(body, status_for(err)).into_response()
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Parse(_) | ServiceError::Serialization(_) | ServiceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Debug)]
struct ReplyBuild(String);
impl warp::reject::Reject for ReplyBuild {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fields;
    use crate::records::Record;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_for(path: &std::path::Path) -> Arc<ServiceConfig> {
        Arc::new(ServiceConfig {
            data_path: path.to_path_buf(),
            ..ServiceConfig::default()
        })
    }

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write csv");
        file
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let file = write_csv("Make,VIN (1-10)\n");
        let routes = routes(config_for(file.path()));
        let res = warp::test::request().path("/health").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn missing_file_is_404_with_error_body() {
        let dir = tempfile::tempdir().unwrap();
        let routes = routes(config_for(&dir.path().join("nope.csv")));

        let res = warp::test::request().path("/api/csv").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"], "CSV file not found");
    }

    #[tokio::test]
    async fn serves_gzipped_records() {
        let file = write_csv(
            "Make,Model,VIN (1-10)\nTesla,Model 3,5YJ3\nNissan,Leaf,1N4A\n",
        );
        let routes = routes(config_for(file.path()));

        let res = warp::test::request().path("/api/csv").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_ENCODING.as_str()], "gzip");
        assert_eq!(res.headers()[header::CONTENT_TYPE.as_str()], "application/json");

        let records: Vec<Record> = transport::decode(res.body()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field(fields::MAKE), Some("Tesla"));
        assert_eq!(records[1].field(fields::VIN), Some("1N4A"));
    }

    #[tokio::test]
    async fn pagination_hints_are_accepted_but_ignored() {
        let file = write_csv("Make,VIN (1-10)\nTesla,1\nNissan,2\nFord,3\n");
        let routes = routes(config_for(file.path()));

        let res = warp::test::request()
            .path("/api/csv?page=1&pageSize=1")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);

        let records: Vec<Record> = transport::decode(res.body()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn unreadable_input_is_500() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Make,VIN (1-10)\n\xff\xfe\x00,1\n").unwrap();
        let routes = routes(config_for(file.path()));

        let res = warp::test::request().path("/api/csv").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("CSV parsing failed"), "got: {message}");
    }
}
