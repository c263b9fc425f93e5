//! Route guard
//!
//! Decides, from token presence alone, whether a navigation may proceed:
//! - protected route without a token: redirect to [`RouteName::Login`]
//! - `Login` with a token: redirect to [`RouteName::Dashboard`]
//! - anything else: proceed
//!
//! The token is never validated here; an expired token is discovered by the
//! first request that comes back 401, which clears it.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::session::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Login,
    Dashboard,
    DeviceList,
    DeviceDetail,
    TaskList,
    TaskCreate,
    ResultList,
    ResultDetail,
    DeviceCompare,
    StandardManage,
    Settings,
    TestSoftware,
    PositionList,
    SoftwareList,
    ScriptList,
    ExecutionList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: RouteName,
    /// Path pattern; `:param` segments match any single segment.
    pub path: &'static str,
    pub requires_auth: bool,
}

const fn protected(name: RouteName, path: &'static str) -> Route {
    Route {
        name,
        path,
        requires_auth: true,
    }
}

pub const ROUTES: &[Route] = &[
    Route {
        name: RouteName::Login,
        path: "/login",
        requires_auth: false,
    },
    protected(RouteName::Dashboard, "/"),
    protected(RouteName::DeviceList, "/devices"),
    protected(RouteName::DeviceDetail, "/devices/:id"),
    protected(RouteName::TaskList, "/tasks"),
    protected(RouteName::TaskCreate, "/tasks/create"),
    protected(RouteName::ResultList, "/results"),
    protected(RouteName::ResultDetail, "/results/:id"),
    protected(RouteName::DeviceCompare, "/compare"),
    protected(RouteName::StandardManage, "/standards"),
    protected(RouteName::Settings, "/settings"),
    protected(RouteName::TestSoftware, "/test-software"),
    protected(RouteName::PositionList, "/positions"),
    protected(RouteName::SoftwareList, "/software"),
    protected(RouteName::ScriptList, "/scripts"),
    protected(RouteName::ExecutionList, "/executions"),
];

impl RouteName {
    pub fn route(self) -> &'static Route {
        // Every variant has exactly one entry in ROUTES.
        ROUTES
            .iter()
            .find(|r| r.name == self)
            .unwrap_or(&ROUTES[0])
    }

    pub fn path(self) -> &'static str {
        self.route().path
    }

    pub fn requires_auth(self) -> bool {
        self.route().requires_auth
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Route {
    fn matches(&self, path: &str) -> bool {
        let pattern: Vec<&str> = self.path.split('/').filter(|s| !s.is_empty()).collect();
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        pattern.len() == actual.len()
            && pattern
                .iter()
                .zip(&actual)
                .all(|(p, a)| p.starts_with(':') || p == a)
    }
}

/// Resolve a concrete path such as `/devices/42`. Literal routes win over
/// parameterized ones (`/tasks/create` is never a task id).
pub fn resolve(path: &str) -> Option<&'static Route> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    ROUTES
        .iter()
        .filter(|r| r.matches(path))
        .min_by_key(|r| r.path.contains(':'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(RouteName),
}

/// Pure decision for a navigation to `target` in `state`.
pub fn decide(target: RouteName, state: AuthState) -> Navigation {
    match (target.requires_auth(), state) {
        (true, AuthState::Unauthenticated) => Navigation::Redirect(RouteName::Login),
        (false, AuthState::Authenticated) if target == RouteName::Login => {
            Navigation::Redirect(RouteName::Dashboard)
        }
        _ => Navigation::Proceed,
    }
}

#[derive(Clone)]
pub struct AuthGuard {
    tokens: Arc<dyn TokenStore>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }

    /// A store that cannot be read counts as no session.
    pub fn state(&self) -> AuthState {
        match self.tokens.load() {
            Ok(Some(_)) => AuthState::Authenticated,
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                debug!("token store unreadable, treating as logged out: {e}");
                AuthState::Unauthenticated
            }
        }
    }

    pub fn check(&self, target: RouteName) -> Navigation {
        let decision = decide(target, self.state());
        debug!(route = %target, ?decision, "route guard");
        decision
    }

    /// Guard a navigation by concrete path. Unknown paths are left alone.
    pub fn check_path(&self, path: &str) -> Option<Navigation> {
        resolve(path).map(|route| self.check(route.name))
    }
}

impl fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGuard").field("state", &self.state()).finish()
    }
}
