use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use crate::auth::session::{resolve_session, token_from_headers};
use crate::models::user::Role;
use crate::state::AppState;

pub const EMPLOYER_PREFIX: &str = "/dashboard/employer";
pub const SEEKER_PREFIX: &str = "/dashboard/seeker";

#[derive(Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect,
}

/// Decides whether a user with `role` may open `path`.
pub fn decide(path: &str, role: Option<Role>) -> GateDecision {
    let Some(role) = role else {
        return GateDecision::Redirect;
    };
    if under(path, EMPLOYER_PREFIX) && role != Role::Employer {
        return GateDecision::Redirect;
    }
    if under(path, SEEKER_PREFIX) && role != Role::Seeker {
        return GateDecision::Redirect;
    }
    GateDecision::Allow
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Middleware guarding the role dashboards. Mismatched or anonymous
/// requests are sent back to `/`.
pub async fn role_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    let session = match token_from_headers(request.headers()) {
        Some(token) => match resolve_session(&state.db, &state.sessions, &token).await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Role gate could not resolve session: {e}");
                None
            }
        },
        None => None,
    };

    let role = session.as_ref().and_then(|s| s.role());
    match decide(&path, role) {
        GateDecision::Allow => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        GateDecision::Redirect => {
            debug!("Role gate redirecting {path} (role: {role:?})");
            Redirect::to("/").into_response()
        }
    }
}
