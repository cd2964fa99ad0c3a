use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("unexpected status {status} for {path}")]
    Status { path: String, status: u16 },

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Plain GET of a path relative to the data origin.
#[async_trait]
pub trait HttpGet: Send + Sync {
    async fn get(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

/// Outcome of the fetch boundary. Every failure has already been logged.
#[derive(Clone, Debug, PartialEq)]
pub enum Fetched<T> {
    Ok(T),
    Unavailable,
}

impl<T> Fetched<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Ok(value) => Some(value),
            Fetched::Unavailable => None,
        }
    }
}

pub async fn fetch_json<T: DeserializeOwned>(http: &dyn HttpGet, path: &str) -> Fetched<T> {
    let result = match http.get(path).await {
        Ok(body) => serde_json::from_slice::<T>(&body).map_err(FetchError::from),
        Err(err) => Err(err),
    };
    match result {
        Ok(value) => Fetched::Ok(value),
        Err(err) => {
            tracing::warn!(path, error = %err, "resource unavailable");
            Fetched::Unavailable
        }
    }
}

/// reqwest-backed [`HttpGet`] rooted at a base URL, sharing one client-wide timeout.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn resolve(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl HttpGet for ReqwestFetcher {
    async fn get(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.resolve(path);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::Project;
    use crate::data::testing::FakeHttp;
    use axum::{Router, http::StatusCode, routing::get};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/data")
    }

    #[test]
    fn resolve_joins_base_and_path_with_one_slash() {
        let fetcher =
            ReqwestFetcher::new("http://localhost:3000/data/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            fetcher.resolve("/projects.json"),
            "http://localhost:3000/data/projects.json"
        );
        assert_eq!(
            fetcher.resolve("projects.json"),
            "http://localhost:3000/data/projects.json"
        );
    }

    #[tokio::test]
    async fn fetch_json_parses_success_payload() {
        let http = FakeHttp::new().with_body(
            "projects.json",
            r#"[{"title":"Project 1","description":"Description 1","url":"https://example.com/1"}]"#,
        );
        let fetched: Fetched<Vec<Project>> = fetch_json(&http, "projects.json").await;
        let projects = fetched.into_option().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].url, "https://example.com/1");
    }

    #[tokio::test]
    async fn fetch_json_collapses_status_and_decode_failures() {
        let http = FakeHttp::new()
            .with_status("missing.json", 404)
            .with_body("broken.json", "{ invalid json");
        let missing: Fetched<Vec<Project>> = fetch_json(&http, "missing.json").await;
        let broken: Fetched<Vec<Project>> = fetch_json(&http, "broken.json").await;
        assert_eq!(missing, Fetched::Unavailable);
        assert_eq!(broken, Fetched::Unavailable);
    }

    #[tokio::test]
    async fn reqwest_fetcher_reads_body_and_maps_status() {
        let router = Router::new()
            .route(
                "/data/projects.json",
                get(|| async { r#"[{"title":"A","description":"B","url":""}]"# }),
            )
            .route(
                "/data/gone.json",
                get(|| async { (StatusCode::NOT_FOUND, "nope") }),
            );
        let base = serve(router).await;
        let fetcher = ReqwestFetcher::new(base, Duration::from_secs(5)).unwrap();

        let body = fetcher.get("projects.json").await.unwrap();
        let projects: Vec<Project> = serde_json::from_slice(&body).unwrap();
        assert_eq!(projects[0].title, "A");

        match fetcher.get("gone.json").await {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reqwest_fetcher_times_out() {
        let router = Router::new().route(
            "/data/slow.json",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "[]"
            }),
        );
        let base = serve(router).await;
        let fetcher = ReqwestFetcher::new(base, Duration::from_millis(100)).unwrap();
        assert!(matches!(
            fetcher.get("slow.json").await,
            Err(FetchError::Timeout(_))
        ));
    }
}
