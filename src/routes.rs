//! Route guard: which view a navigation lands on.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/login` is the only public view. Everything else requires a signed-in
//! user once the session has finished loading; while `restore()` is still in
//! flight the requested view is kept so a page refresh does not bounce
//! through the login screen.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::session::SessionSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Planning,
    Tracking,
    Intelligence,
    Settings,
}

impl View {
    pub const ALL: [Self; 6] =
        [Self::Login, Self::Dashboard, Self::Planning, Self::Tracking, Self::Intelligence, Self::Settings];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Planning => "/planning",
            Self::Tracking => "/tracking",
            Self::Intelligence => "/intelligence",
            Self::Settings => "/settings",
        }
    }

    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Login)
    }

    fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.path() == path)
    }
}

/// Outcome of resolving a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    Redirect(View),
}

impl Navigation {
    #[must_use]
    pub fn view(self) -> View {
        match self {
            Self::Render(view) | Self::Redirect(view) => view,
        }
    }
}

/// True when auth has loaded and no user is present.
#[must_use]
pub fn should_redirect_unauth(session: &SessionSnapshot) -> bool {
    !session.is_loading && session.user.is_none()
}

/// Resolve `path` against the route table and the current session.
#[must_use]
pub fn resolve(path: &str, session: &SessionSnapshot) -> Navigation {
    let path = normalize(path);
    let Some(view) = View::from_path(&path) else {
        return guard(View::Dashboard, session, true);
    };
    guard(view, session, false)
}

fn guard(view: View, session: &SessionSnapshot, redirected: bool) -> Navigation {
    if !view.is_public() && should_redirect_unauth(session) {
        return Navigation::Redirect(View::Login);
    }
    if redirected { Navigation::Redirect(view) } else { Navigation::Render(view) }
}

/// Drop query/fragment and trailing slashes; keep a lone `/`.
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_owned() } else { trimmed.to_owned() }
}
