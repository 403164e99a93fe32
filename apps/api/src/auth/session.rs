use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::auth::token::SessionKeys;
use crate::errors::AppError;
use crate::models::user::{Role, UserRow};
use crate::state::AppState;
use crate::users::queries::find_by_email;

pub const SESSION_COOKIE: &str = "session_token";

/// The signed-in user, resolved from the session token on every request.
/// The role is read from the stored user, never from the token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserRow,
}

/// Session payload returned to clients.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Option<Role>,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Option<Role> {
        self.user.role()
    }

    /// Fails with 403 unless the stored role matches.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role() == Some(role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Only {role}s can perform this action")))
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.user.id,
            name: self.user.name.clone(),
            email: self.user.email.clone(),
            image: self.user.image.clone(),
            role: self.role(),
        }
    }
}

/// Pulls the session token from `Authorization: Bearer` or the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Verifies the token and loads the stored user it names.
pub async fn resolve_session(
    pool: &PgPool,
    keys: &SessionKeys,
    token: &str,
) -> Result<Session, AppError> {
    let claims = keys.verify(token)?;
    let user = find_by_email(pool, &claims.email).await?.ok_or_else(|| {
        warn!("Session for unknown user {}", claims.email);
        AppError::Unauthorized
    })?;
    Ok(Session { user })
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }
        let token = token_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        resolve_session(&state.db, &state.sessions, &token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};
    use chrono::Utc;

    fn user(role: Option<&str>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            image: None,
            role: role.map(String::from),
            department: None,
            skills: vec![],
            resume_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_bearer_token_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(COOKIE, HeaderValue::from_static("session_token=xyz"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_cookie_token_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session_token=xyz"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn test_require_role() {
        let employer = Session {
            user: user(Some("employer")),
        };
        assert!(employer.require_role(Role::Employer).is_ok());
        assert!(matches!(
            employer.require_role(Role::Seeker),
            Err(AppError::Forbidden(_))
        ));

        let unset = Session { user: user(None) };
        assert!(unset.require_role(Role::Seeker).is_err());
        assert_eq!(unset.view().role, None);
    }
}
