use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;

use super::fetch::{Fetched, HttpGet, fetch_json};

/// Shape a resource settles into once its single fetch has finished.
///
/// Lists settle to an empty vector when unavailable, single records to `None`.
pub trait Settled: Clone + Send + Sync + 'static {
    type Payload: DeserializeOwned + Send + 'static;

    fn settle(fetched: Fetched<Self::Payload>) -> Self;

    fn unavailable() -> Self {
        Self::settle(Fetched::Unavailable)
    }
}

impl<T> Settled for Vec<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Payload = Vec<T>;

    fn settle(fetched: Fetched<Vec<T>>) -> Self {
        fetched.into_option().unwrap_or_default()
    }
}

impl<T> Settled for Option<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Payload = T;

    fn settle(fetched: Fetched<T>) -> Self {
        fetched.into_option()
    }
}

enum Slot<T> {
    NotStarted,
    InFlight(Shared<BoxFuture<'static, T>>),
    Resolved(T),
}

/// Lazy, memoized, single-flight accessor for one JSON document.
///
/// The first caller starts the fetch; everyone arriving while it is in flight
/// awaits the same shared handle. The outcome is kept for the lifetime of the
/// value and never refreshed.
pub struct CachedResource<T: Settled> {
    path: &'static str,
    http: Arc<dyn HttpGet>,
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T: Settled> CachedResource<T> {
    pub fn new(path: &'static str, http: Arc<dyn HttpGet>) -> Self {
        Self {
            path,
            http,
            slot: Arc::new(Mutex::new(Slot::NotStarted)),
        }
    }

    pub async fn get(&self) -> T {
        let pending = {
            let mut slot = lock(&self.slot);
            let attached = match &*slot {
                Slot::Resolved(value) => return value.clone(),
                Slot::InFlight(pending) => Some(pending.clone()),
                Slot::NotStarted => None,
            };
            match attached {
                Some(pending) => pending,
                None => self.start(&mut slot),
            }
        };
        pending.await
    }

    /// The settled value, if the fetch has finished. Never starts I/O.
    pub fn peek(&self) -> Option<T> {
        match &*lock(&self.slot) {
            Slot::Resolved(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Starts the fetch in the background unless it already started.
    pub fn prime(&self) {
        let mut slot = lock(&self.slot);
        if matches!(*slot, Slot::NotStarted) {
            let _pending = self.start(&mut slot);
        }
    }

    // The spawned task stores the outcome itself, so the fetch completes and
    // is retained even if every caller awaiting it is dropped.
    fn start(&self, slot: &mut Slot<T>) -> Shared<BoxFuture<'static, T>> {
        let http = Arc::clone(&self.http);
        let cell = Arc::clone(&self.slot);
        let path = self.path;
        tracing::debug!(path, "fetching resource");

        let task = tokio::spawn(async move {
            let value = T::settle(fetch_json::<T::Payload>(http.as_ref(), path).await);
            *lock(&cell) = Slot::Resolved(value.clone());
            value
        });

        let pending = async move {
            match task.await {
                Ok(value) => value,
                Err(err) => {
                    tracing::error!(path, error = %err, "resource fetch task failed");
                    T::unavailable()
                }
            }
        }
        .boxed()
        .shared();

        *slot = Slot::InFlight(pending.clone());
        pending
    }
}

fn lock<T>(slot: &Arc<Mutex<Slot<T>>>) -> MutexGuard<'_, Slot<T>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::models::{AboutMe, Project};
    use crate::data::testing::{ABOUT_JSON, FakeHttp, PROJECTS_JSON};

    fn projects(http: &Arc<FakeHttp>) -> CachedResource<Vec<Project>> {
        CachedResource::new("projects.json", http.clone() as Arc<dyn HttpGet>)
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let http = Arc::new(
            FakeHttp::new()
                .with_body("projects.json", PROJECTS_JSON)
                .with_delay(Duration::from_millis(50)),
        );
        let resource = Arc::new(projects(&http));

        let callers = (0..16).map(|_| {
            let resource = Arc::clone(&resource);
            tokio::spawn(async move { resource.get().await })
        });
        let results = futures::future::join_all(callers).await;

        assert_eq!(http.calls("projects.json"), 1);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.len(), 2);
        for result in &results {
            assert_eq!(result.as_ref().unwrap(), first);
        }
    }

    #[tokio::test]
    async fn later_calls_reuse_the_settled_value() {
        let http = Arc::new(FakeHttp::new().with_body("projects.json", PROJECTS_JSON));
        let resource = projects(&http);

        let first = resource.get().await;
        for _ in 0..5 {
            assert_eq!(resource.get().await, first);
        }
        assert_eq!(http.calls("projects.json"), 1);
    }

    #[tokio::test]
    async fn failure_is_memoized_too() {
        let http = Arc::new(FakeHttp::new().with_status("projects.json", 500));
        let resource = projects(&http);

        assert!(resource.get().await.is_empty());
        assert!(resource.get().await.is_empty());
        assert_eq!(http.calls("projects.json"), 1);
    }

    #[tokio::test]
    async fn record_shape_settles_to_none_on_failure() {
        let http = Arc::new(FakeHttp::new().with_body("aboutme.json", "{ invalid json"));
        let resource: CachedResource<Option<AboutMe>> =
            CachedResource::new("aboutme.json", http.clone() as Arc<dyn HttpGet>);
        assert_eq!(resource.get().await, None);
    }

    #[tokio::test]
    async fn record_shape_keeps_parsed_value() {
        let http = Arc::new(FakeHttp::new().with_body("aboutme.json", ABOUT_JSON));
        let resource: CachedResource<Option<AboutMe>> =
            CachedResource::new("aboutme.json", http.clone() as Arc<dyn HttpGet>);
        let about = resource.get().await.unwrap();
        assert_eq!(about.skills, vec!["Rust", "TypeScript"]);
    }

    #[tokio::test]
    async fn peek_does_not_fetch_and_prime_fetches_once() {
        let http = Arc::new(
            FakeHttp::new()
                .with_body("projects.json", PROJECTS_JSON)
                .with_delay(Duration::from_millis(20)),
        );
        let resource = projects(&http);

        assert_eq!(resource.peek(), None);
        assert_eq!(http.total_calls(), 0);

        resource.prime();
        resource.prime();
        assert_eq!(resource.peek(), None);

        let value = resource.get().await;
        assert_eq!(resource.peek(), Some(value));
        assert_eq!(http.calls("projects.json"), 1);
    }

    #[tokio::test]
    async fn dropped_caller_does_not_cancel_the_fetch() {
        let http = Arc::new(
            FakeHttp::new()
                .with_body("projects.json", PROJECTS_JSON)
                .with_delay(Duration::from_millis(30)),
        );
        let resource = projects(&http);

        let abandoned = tokio::time::timeout(Duration::from_millis(1), resource.get()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(resource.peek().map(|p| p.len()), Some(2));
        assert_eq!(http.calls("projects.json"), 1);
    }
}
