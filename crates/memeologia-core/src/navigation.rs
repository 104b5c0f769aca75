//! Client-side navigation.
//!
//! The login view only ever asks for a route change through `Navigator`;
//! `Router` is the in-process implementation the clients use.

use tracing::debug;

/// Path of the main screen, pushed after a successful login
pub const ROOT_PATH: &str = "/";

/// Path of the login screen
pub const LOGIN_PATH: &str = "/login";

/// Path of the sign-up screen linked from the login form
pub const REGISTER_PATH: &str = "/registro";

/// Most routes kept for `back`; older entries are dropped first
const MAX_HISTORY: usize = 32;

/// Performs a client-side route change.
pub trait Navigator {
    fn push(&mut self, path: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    NotFound(String),
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path {
            ROOT_PATH | "" => Route::Home,
            LOGIN_PATH => Route::Login,
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Home => ROOT_PATH,
            Route::Login => LOGIN_PATH,
            Route::NotFound(path) => path,
        }
    }
}

/// Route history with the current route on top.
#[derive(Debug, Clone)]
pub struct Router {
    history: Vec<Route>,
}

impl Router {
    pub fn new(initial: Route) -> Self {
        Self {
            history: vec![initial],
        }
    }

    pub fn current(&self) -> &Route {
        // history is never empty: new() seeds it and back() keeps one entry
        &self.history[self.history.len() - 1]
    }

    /// Return to the previous route. Returns false at the first entry.
    pub fn back(&mut self) -> bool {
        if self.history.len() > 1 {
            self.history.pop();
            true
        } else {
            false
        }
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }
}

impl Navigator for Router {
    fn push(&mut self, path: &str) {
        let route = Route::from_path(path);
        debug!(path = path, ?route, "Navigating");
        if self.current() == &route {
            return;
        }
        if self.history.len() == MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push(route);
    }
}
