//! Static path → view routing and the navigation history.
//!
//! Views are built on first resolve and cached for the router's lifetime.
//! `History` is cheap to clone so it can be captured by the builder's
//! auth-expiry hook while the router keeps reading from it.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::store::EmployeeStore;

pub const ROOT_PATH: &str = "/";

struct Route<V> {
    path: &'static str,
    name: &'static str,
    load: fn() -> V,
    view: OnceLock<V>,
}

pub struct Router<V> {
    routes: Vec<Route<V>>,
    history: History,
}

impl<V> Router<V> {
    pub fn new(history: History) -> Self {
        Self {
            routes: Vec::new(),
            history,
        }
    }

    pub fn route(mut self, path: &'static str, name: &'static str, load: fn() -> V) -> Self {
        self.routes.push(Route {
            path,
            name,
            load,
            view: OnceLock::new(),
        });
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Name of the route registered for `path`.
    pub fn name_of(&self, path: &str) -> Option<&'static str> {
        self.find(path).map(|route| route.name)
    }

    /// The view for `path`, loading it if this is the first visit.
    pub fn resolve(&self, path: &str) -> Option<&V> {
        self.find(path)
            .map(|route| route.view.get_or_init(route.load))
    }

    /// The view for wherever the history currently points.
    pub fn current(&self) -> Option<&V> {
        self.resolve(&self.history.current())
    }

    /// Whether `path`'s view has been built yet.
    pub fn is_loaded(&self, path: &str) -> bool {
        self.find(path).is_some_and(|route| route.view.get().is_some())
    }

    fn find(&self, path: &str) -> Option<&Route<V>> {
        self.routes.iter().find(|route| route.path == path)
    }
}

/// Navigation stack. Starts at `/`.
#[derive(Debug, Clone)]
pub struct History {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(vec![ROOT_PATH.to_string()])),
        }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> String {
        self.lock().last().cloned().unwrap_or_else(|| ROOT_PATH.to_string())
    }

    pub fn push(&self, path: &str) {
        self.lock().push(path.to_string());
    }

    /// Swap the current entry for `path` without growing the stack.
    pub fn replace(&self, path: &str) {
        let mut entries = self.lock();
        entries.pop();
        entries.push(path.to_string());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The employee listing shown at `/`.
#[derive(Debug, Default)]
pub struct EmployeeIndex;

impl EmployeeIndex {
    pub fn render(&self, store: &EmployeeStore) -> String {
        if store.loading() {
            return "Loading employees...".to_string();
        }
        if store.employees().is_empty() {
            return "No employees.".to_string();
        }
        store
            .employees()
            .iter()
            .map(|e| {
                let mut line = format!("#{} {}", e.id, e.name);
                if let Some(email) = &e.email {
                    line.push_str(&format!(" <{email}>"));
                }
                if let Some(position) = &e.position {
                    line.push_str(&format!(" ({position})"));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The application's only route: `/` → `EmployeeIndex`.
pub fn employee_router(history: History) -> Router<EmployeeIndex> {
    Router::new(history).route(ROOT_PATH, "employee", EmployeeIndex::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_resolves_to_employee_view() {
        let router = employee_router(History::new());
        assert_eq!(router.name_of("/"), Some("employee"));
        assert!(router.resolve("/").is_some());
        assert!(router.resolve("/employees/1").is_none());
    }

    #[test]
    fn view_loads_lazily_once() {
        let router = employee_router(History::new());
        assert!(!router.is_loaded("/"));

        let first = router.resolve("/").unwrap() as *const EmployeeIndex;
        assert!(router.is_loaded("/"));
        let second = router.resolve("/").unwrap() as *const EmployeeIndex;
        assert_eq!(first, second);
    }

    #[test]
    fn replace_does_not_grow_history() {
        let history = History::new();
        history.push("/settings");
        assert_eq!(history.len(), 2);

        history.replace("/");
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), "/");
    }

    #[test]
    fn current_follows_shared_history() {
        let history = History::new();
        let router = employee_router(history.clone());
        history.push("/unknown");
        assert!(router.current().is_none());

        history.replace(ROOT_PATH);
        assert!(router.current().is_some());
    }

    #[test]
    fn empty_store_renders_placeholder() {
        assert_eq!(EmployeeIndex.render(&EmployeeStore::new()), "No employees.");
    }
}
