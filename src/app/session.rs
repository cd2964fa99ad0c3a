use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rand::Rng;

use crate::data::{HttpGet, Services};

const SESSION_ID_LEN: usize = 24;
const MAX_SESSION_ID_LEN: usize = 64;

/// One [`Services`] bundle per page load, keyed by the id embedded in the page.
///
/// Holds at most `capacity` sessions; the oldest is dropped first.
pub struct SessionStore {
    http: Arc<dyn HttpGet>,
    capacity: usize,
    sessions: Mutex<Sessions>,
}

#[derive(Default)]
struct Sessions {
    by_id: HashMap<String, Arc<Services>>,
    order: VecDeque<String>,
}

impl SessionStore {
    pub fn new(http: Arc<dyn HttpGet>, capacity: usize) -> Self {
        Self {
            http,
            capacity: capacity.max(1),
            sessions: Mutex::new(Sessions::default()),
        }
    }

    /// Starts a page session with a fresh, unfetched bundle.
    pub fn open(&self) -> (String, Arc<Services>) {
        let id = new_session_id();
        let services = Arc::new(Services::new(Arc::clone(&self.http)));
        self.insert(id.clone(), Arc::clone(&services));
        (id, services)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Services>> {
        self.lock().by_id.get(id).cloned()
    }

    /// The bundle for `id`, recreated if it was evicted. Malformed ids are rejected.
    pub fn resume(&self, id: &str) -> Option<Arc<Services>> {
        if !is_valid_id(id) {
            return None;
        }
        if let Some(services) = self.get(id) {
            return Some(services);
        }
        tracing::debug!(session = id, "resuming evicted session");
        let services = Arc::new(Services::new(Arc::clone(&self.http)));
        self.insert(id.to_string(), Arc::clone(&services));
        Some(services)
    }

    fn insert(&self, id: String, services: Arc<Services>) {
        let mut sessions = self.lock();
        if sessions.by_id.insert(id.clone(), services).is_some() {
            return;
        }
        sessions.order.push_back(id);
        while sessions.order.len() > self.capacity {
            if let Some(oldest) = sessions.order.pop_front() {
                sessions.by_id.remove(&oldest);
                tracing::debug!(session = %oldest, "session evicted");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().by_id.len()
    }
}

fn new_session_id() -> String {
    let charset = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..SESSION_ID_LEN)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_SESSION_ID_LEN && id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::full_site;

    fn store(capacity: usize) -> SessionStore {
        SessionStore::new(Arc::new(full_site()), capacity)
    }

    #[test]
    fn open_hands_out_distinct_bundles() {
        let store = store(8);
        let (a, first) = store.open();
        let (b, second) = store.open();
        assert_ne!(a, b);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&store.get(&a).unwrap(), &first));
    }

    #[test]
    fn oldest_session_is_evicted_at_capacity() {
        let store = store(2);
        let (first, _) = store.open();
        let (second, _) = store.open();
        let (third, _) = store.open();

        assert_eq!(store.len(), 2);
        assert!(store.get(&first).is_none());
        assert!(store.get(&second).is_some());
        assert!(store.get(&third).is_some());
    }

    #[test]
    fn resume_recreates_evicted_session() {
        let store = store(1);
        let (first, original) = store.open();
        store.open();

        let resumed = store.resume(&first).unwrap();
        assert!(!Arc::ptr_eq(&resumed, &original));
        assert!(Arc::ptr_eq(&store.resume(&first).unwrap(), &resumed));
    }

    #[test]
    fn resume_rejects_malformed_ids() {
        let store = store(4);
        assert!(store.resume("").is_none());
        assert!(store.resume("../etc").is_none());
        assert!(store.resume(&"a".repeat(MAX_SESSION_ID_LEN + 1)).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn session_ids_are_alphanumeric() {
        let id = new_session_id();
        assert_eq!(id.len(), SESSION_ID_LEN);
        assert!(is_valid_id(&id));
    }
}
