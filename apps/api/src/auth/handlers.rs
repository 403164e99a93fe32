use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::session::{Session, SessionView, SESSION_COOKIE};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use crate::users::queries::{upsert_user, Identity};

pub const GATEWAY_KEY_HEADER: &str = "x-gateway-key";

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub session: SessionView,
}

/// POST /api/v1/auth/sign-in
///
/// Called by the OAuth gateway after the provider confirmed the identity.
pub async fn handle_sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<(CookieJar, Json<SignInResponse>), AppError> {
    let presented = headers
        .get(GATEWAY_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented != Some(state.config.gateway_key.as_str()) {
        warn!("Sign-in rejected: missing or wrong gateway key");
        return Err(AppError::Unauthorized);
    }

    let name = req.name.trim();
    let email = req.email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(AppError::Validation("name and email are required".to_string()));
    }

    let user = upsert_user(
        &state.db,
        Identity {
            name,
            email,
            image: req.image.as_deref().filter(|s| !s.trim().is_empty()),
        },
    )
    .await?;
    info!("User {} signed in", user.id);

    let token = state.sessions.issue(user.id, &user.email)?;
    let cookie = session_cookie(
        token.clone(),
        state.sessions.ttl(),
        state.config.cookie_secure,
    );

    let session = Session { user };
    Ok((
        jar.add(cookie),
        Json(SignInResponse {
            token,
            session: session.view(),
        }),
    ))
}

/// Session cookie that expires together with the token it carries.
fn session_cookie(token: String, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// GET /api/v1/auth/session
pub async fn handle_get_session(session: Session) -> Json<SessionView> {
    Json(session.view())
}

/// POST /api/v1/auth/sign-out
///
/// Always answers with an expired cookie, whether or not one was sent.
pub async fn handle_sign_out(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    jar.add(cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_lives_as_long_as_the_token() {
        let cookie = session_cookie("tok".to_string(), chrono::Duration::hours(2), true);
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::seconds(7200)));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));

        let header = cookie.to_string();
        assert!(header.contains("Max-Age=7200"));
        assert!(header.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_secure_follows_config() {
        let cookie = session_cookie("tok".to_string(), chrono::Duration::hours(1), false);
        assert_eq!(cookie.secure(), Some(false));
        assert!(!cookie.to_string().contains("Secure"));
    }
}
