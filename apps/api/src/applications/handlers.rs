//! Axum route handlers for job applications.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::queries::{self, ApplicationWithJob, NewApplication};
use crate::applications::upload::{read_application_form, validate_resume};
use crate::auth::session::Session;
use crate::errors::{is_unique_violation, AppError};
use crate::extract::AppJson;
use crate::jobs::handlers::owned_job;
use crate::jobs::queries::find_job;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::user::Role;
use crate::state::AppState;
use crate::storage::resume_key;

pub const RECENT_LIMIT: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitApplicationResponse {
    pub message: String,
    pub application: ApplicationRow,
}

#[derive(Debug, Serialize)]
pub struct MyApplicationsResponse {
    pub count: usize,
    pub recent: Vec<ApplicationWithJob>,
    pub data: Vec<ApplicationWithJob>,
}

impl MyApplicationsResponse {
    pub fn from_newest_first(data: Vec<ApplicationWithJob>) -> Self {
        let recent = data.iter().take(RECENT_LIMIT).cloned().collect();
        Self {
            count: data.len(),
            recent,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AppliedJobIdsResponse {
    pub applied_job_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub job_id: Option<Uuid>,
    pub seeker_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub message: String,
    pub application: ApplicationRow,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/applications
///
/// Multipart form: `job_id`, `cover_letter`, `location`, `resume` (PDF).
/// The resume goes to object storage before the application row is written.
pub async fn handle_submit_application(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitApplicationResponse>), AppError> {
    session.require_role(Role::Seeker)?;

    let form = read_application_form(multipart).await?;
    let (Some(job_id), Some(resume)) = (form.job_id.as_deref(), form.resume.as_ref()) else {
        return Err(AppError::Validation("Missing job_id or file".to_string()));
    };
    let job_id: Uuid = job_id
        .parse()
        .map_err(|_| AppError::Validation("Invalid job_id".to_string()))?;

    validate_resume(resume, state.config.max_resume_bytes)?;

    let job = find_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    if !job.is_active {
        return Err(AppError::Conflict(
            "This job is no longer accepting applications".to_string(),
        ));
    }

    let seeker_id = session.user_id();
    if queries::find_by_job_and_seeker(&state.db, job_id, seeker_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }

    let key = resume_key(Utc::now().timestamp_millis(), Uuid::new_v4());
    let resume_url = state.resumes.put_pdf(&key, resume.bytes.clone()).await?;

    let application = queries::insert_application(
        &state.db,
        NewApplication {
            job_id,
            seeker_id,
            seeker_email: &session.user.email,
            cover_letter: form.cover_letter.as_deref(),
            location: form.location.as_deref(),
            resume_url: &resume_url,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            // Lost a race with a concurrent submit; the uploaded object is orphaned.
            warn!("Duplicate application for job {job_id} by {seeker_id}, resume {key} unused");
        }
        duplicate_or_database(e)
    })?;

    info!(
        "Seeker {seeker_id} applied to job {job_id} (application {})",
        application.id
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitApplicationResponse {
            message: "Application submitted successfully".to_string(),
            application,
        }),
    ))
}

/// A unique violation on insert means the seeker already applied.
fn duplicate_or_database(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict("You have already applied to this job".to_string())
    } else {
        AppError::Database(err)
    }
}

/// GET /api/v1/applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<MyApplicationsResponse>, AppError> {
    let data = queries::applications_for_seeker(&state.db, session.user_id()).await?;
    Ok(Json(MyApplicationsResponse::from_newest_first(data)))
}

/// GET /api/v1/applications/user
pub async fn handle_applied_job_ids(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AppliedJobIdsResponse>, AppError> {
    let applied_job_ids = queries::applied_job_ids(&state.db, session.user_id()).await?;
    Ok(Json(AppliedJobIdsResponse { applied_job_ids }))
}

/// PUT /api/v1/applications/status
///
/// Employers set an applicant's status on one of their own jobs.
pub async fn handle_update_status(
    State(state): State<AppState>,
    session: Session,
    AppJson(req): AppJson<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, AppError> {
    session.require_role(Role::Employer)?;

    let (Some(job_id), Some(seeker_id), Some(status)) = (req.job_id, req.seeker_id, req.status)
    else {
        return Err(AppError::Validation(
            "Missing job_id, seeker_id, or status".to_string(),
        ));
    };
    let status: ApplicationStatus = status
        .parse()
        .map_err(|_| AppError::Validation("Invalid status value".to_string()))?;

    owned_job(&state.db, job_id, session.user_id()).await?;

    let application = queries::find_by_job_and_seeker(&state.db, job_id, seeker_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let application = queries::set_status(&state.db, application.id, status).await?;
    info!("Application {} set to {status}", application.id);

    Ok(Json(UpdateStatusResponse {
        message: "Application status updated successfully".to_string(),
        application,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::queries::JobSummary;

    fn application(title: &str) -> ApplicationWithJob {
        let job_id = Uuid::new_v4();
        ApplicationWithJob {
            application: ApplicationRow {
                id: Uuid::new_v4(),
                job_id,
                seeker_id: Uuid::new_v4(),
                seeker_email: "grace@example.com".to_string(),
                cover_letter: None,
                location: Some("Oslo".to_string()),
                resume_url: Some("memory://r.pdf".to_string()),
                status: "pending".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            job: JobSummary {
                id: job_id,
                title: title.to_string(),
                location: "Oslo".to_string(),
                salary_range: "n/a".to_string(),
                job_type: "onsite".to_string(),
            },
        }
    }

    #[test]
    fn test_recent_is_capped_at_five() {
        let data: Vec<_> = (0..7).map(|i| application(&format!("Job {i}"))).collect();
        let response = MyApplicationsResponse::from_newest_first(data);
        assert_eq!(response.count, 7);
        assert_eq!(response.recent.len(), RECENT_LIMIT);
        assert_eq!(response.recent[0].job.title, "Job 0");
        assert_eq!(response.data.len(), 7);
    }

    #[test]
    fn test_application_serializes_flat_with_job() {
        let value = serde_json::to_value(application("Rustacean")).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["job"]["title"], "Rustacean");
        assert!(value.get("application").is_none());
    }

    #[test]
    fn test_other_insert_errors_stay_database_errors() {
        let err = duplicate_or_database(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_insert_race_maps_to_conflict(pool: sqlx::PgPool) {
        use crate::db::fixtures;

        let employer = fixtures::user(&pool, "boss@example.com", Role::Employer).await;
        let seeker = fixtures::user(&pool, "seeker@example.com", Role::Seeker).await;
        let job = fixtures::job(&pool, employer.id, "Backend", &["rust"]).await;
        let new = || NewApplication {
            job_id: job.id,
            seeker_id: seeker.id,
            seeker_email: "seeker@example.com",
            cover_letter: None,
            location: None,
            resume_url: "memory://resume.pdf",
        };

        // A concurrent submit that passed the pre-check too.
        queries::insert_application(&pool, new()).await.unwrap();
        let err = queries::insert_application(&pool, new())
            .await
            .map_err(duplicate_or_database)
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
