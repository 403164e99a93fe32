use axum::{extract::State, Json};
use serde::Serialize;

use crate::applications::handlers::RECENT_LIMIT;
use crate::applications::queries::{applications_for_seeker, ApplicationWithJob};
use crate::auth::session::{Session, SessionView};
use crate::errors::AppError;
use crate::jobs::recommend::recommend_for;
use crate::jobs::stats::{employer_overview, EmployerStats};
use crate::models::job::JobRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EmployerDashboard {
    pub user: SessionView,
    pub stats: EmployerStats,
    pub jobs: Vec<JobRow>,
}

#[derive(Debug, Serialize)]
pub struct SeekerDashboard {
    pub user: SessionView,
    pub application_count: usize,
    pub recent_applications: Vec<ApplicationWithJob>,
    pub recommended_jobs: Vec<JobRow>,
}

/// GET /dashboard/employer
pub async fn handle_employer_dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<EmployerDashboard>, AppError> {
    let overview = employer_overview(&state.db, session.user_id()).await?;
    Ok(Json(EmployerDashboard {
        user: session.view(),
        stats: overview.stats,
        jobs: overview.jobs,
    }))
}

/// GET /dashboard/seeker
pub async fn handle_seeker_dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<SeekerDashboard>, AppError> {
    let applications = applications_for_seeker(&state.db, session.user_id()).await?;
    let recommended_jobs = recommend_for(&state.db, &session.user).await?;

    Ok(Json(SeekerDashboard {
        user: session.view(),
        application_count: applications.len(),
        recent_applications: applications.into_iter().take(RECENT_LIMIT).collect(),
        recommended_jobs,
    }))
}
