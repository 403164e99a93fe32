use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::session::{Session, SessionView};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::clean_skills;
use crate::models::user::{Role, UserRow};
use crate::state::AppState;
use crate::users::queries;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub department: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserRow,
}

/// PUT /api/v1/user/role
pub async fn handle_set_role(
    State(state): State<AppState>,
    session: Session,
    AppJson(req): AppJson<SetRoleRequest>,
) -> Result<Json<SessionView>, AppError> {
    let role: Role = req
        .role
        .parse()
        .map_err(|_| AppError::Validation("Invalid role".to_string()))?;

    let user = queries::set_role(&state.db, session.user_id(), role).await?;
    info!("User {} chose role {role}", user.id);

    Ok(Json(Session { user }.view()))
}

/// GET /api/v1/seeker/profile
pub async fn handle_get_profile(session: Session) -> Json<ProfileResponse> {
    Json(ProfileResponse { user: session.user })
}

/// PUT /api/v1/seeker/profile
///
/// Replaces department and skills wholesale.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    session: Session,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let department = req
        .department
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let skills = clean_skills(&req.skills);

    let user = queries::update_profile(&state.db, session.user_id(), department, &skills).await?;
    Ok(Json(ProfileResponse { user }))
}
