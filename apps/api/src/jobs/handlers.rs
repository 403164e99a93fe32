//! Axum route handlers for job postings.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::applications::queries::{applicants_for_job, Applicant};
use crate::auth::session::Session;
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::jobs::queries::{self, NewJob};
use crate::jobs::recommend::recommend_for;
use crate::jobs::stats::{employer_overview, EmployerOverview};
use crate::models::clean_skills;
use crate::models::job::{JobRow, JobType};
use crate::models::user::Role;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Every field is optional at the wire level so a missing one gets the same
/// 400 as a blank one.
#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Comma-separated skill list.
    pub skills: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: JobRow,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobRow>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct ApplicantsResponse {
    pub applicants: Vec<Applicant>,
}

/// Validated form of `CreateJobRequest`.
#[derive(Debug, PartialEq)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub location: String,
    pub salary_range: String,
    pub job_type: JobType,
}

impl CreateJobRequest {
    pub fn validate(&self) -> Result<JobDraft, AppError> {
        let required = |v: &Option<String>| -> Result<String, AppError> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .ok_or_else(|| AppError::Validation("All fields are required".to_string()))
        };

        let title = required(&self.title)?;
        let description = required(&self.description)?;
        let skills_raw = required(&self.skills)?;
        let location = required(&self.location)?;
        let salary_range = required(&self.salary_range)?;
        let job_type: JobType = required(&self.job_type)?
            .parse()
            .map_err(|_| AppError::Validation("Invalid job type".to_string()))?;

        let skills = clean_skills(skills_raw.split(','));
        if skills.is_empty() {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        Ok(JobDraft {
            title,
            description,
            skills,
            location,
            salary_range,
            job_type,
        })
    }
}

/// Loads a job and checks the employer owns it.
pub async fn owned_job(pool: &PgPool, job_id: Uuid, employer_id: Uuid) -> Result<JobRow, AppError> {
    let job = queries::find_job(pool, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    if job.employer_id != employer_id {
        return Err(AppError::Forbidden(
            "This job belongs to another employer".to_string(),
        ));
    }
    Ok(job)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = queries::list_all(&state.db).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// GET /api/v1/jobs/recommended
pub async fn handle_recommended_jobs(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = recommend_for(&state.db, &session.user).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// POST /api/v1/employer/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    session: Session,
    AppJson(req): AppJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    session.require_role(Role::Employer)?;
    let draft = req.validate()?;

    let job = queries::insert_job(
        &state.db,
        NewJob {
            title: &draft.title,
            description: &draft.description,
            skills: &draft.skills,
            location: &draft.location,
            salary_range: &draft.salary_range,
            job_type: draft.job_type,
            employer_id: session.user_id(),
        },
    )
    .await?;
    info!("Employer {} posted job {}", session.user_id(), job.id);

    Ok((StatusCode::CREATED, Json(JobResponse { job })))
}

/// GET /api/v1/employer/jobs
///
/// The employer's jobs, newest first, with applicant stats.
pub async fn handle_list_employer_jobs(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<EmployerOverview>, AppError> {
    session.require_role(Role::Employer)?;
    let overview = employer_overview(&state.db, session.user_id()).await?;
    Ok(Json(overview))
}

/// PATCH /api/v1/employer/jobs/:job_id/active
pub async fn handle_set_job_active(
    State(state): State<AppState>,
    session: Session,
    AppPath(job_id): AppPath<Uuid>,
    AppJson(req): AppJson<SetActiveRequest>,
) -> Result<Json<JobResponse>, AppError> {
    session.require_role(Role::Employer)?;
    owned_job(&state.db, job_id, session.user_id()).await?;
    let job = queries::set_active(&state.db, job_id, req.is_active).await?;
    Ok(Json(JobResponse { job }))
}

/// GET /api/v1/employer/jobs/:job_id/applicants
pub async fn handle_list_applicants(
    State(state): State<AppState>,
    session: Session,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<Json<ApplicantsResponse>, AppError> {
    session.require_role(Role::Employer)?;
    owned_job(&state.db, job_id, session.user_id()).await?;
    let applicants = applicants_for_job(&state.db, job_id).await?;
    Ok(Json(ApplicantsResponse { applicants }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateJobRequest {
        CreateJobRequest {
            title: Some("  Backend Engineer ".to_string()),
            description: Some("Build APIs".to_string()),
            skills: Some("rust, postgres ,, axum".to_string()),
            location: Some("Remote".to_string()),
            salary_range: Some("$120k - $150k".to_string()),
            job_type: Some("remote".to_string()),
        }
    }

    #[test]
    fn test_validate_splits_skills_and_trims_title() {
        let draft = full_request().validate().unwrap();
        assert_eq!(draft.title, "Backend Engineer");
        assert_eq!(draft.skills, vec!["rust", "postgres", "axum"]);
        assert_eq!(draft.job_type, JobType::Remote);
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let req = CreateJobRequest {
            location: None,
            ..full_request()
        };
        let err = req.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "All fields are required"));
    }

    #[test]
    fn test_validate_rejects_blank_field() {
        let req = CreateJobRequest {
            description: Some("   ".to_string()),
            ..full_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_job_type() {
        let req = CreateJobRequest {
            job_type: Some("freelance".to_string()),
            ..full_request()
        };
        let err = req.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid job type"));
    }

    #[test]
    fn test_validate_rejects_skills_of_only_commas() {
        let req = CreateJobRequest {
            skills: Some(" , ,".to_string()),
            ..full_request()
        };
        assert!(req.validate().is_err());
    }
}
