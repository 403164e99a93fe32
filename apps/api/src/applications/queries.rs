use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::application::{ApplicationRow, ApplicationStatus};

/// Parameters for recording a submitted application.
pub struct NewApplication<'a> {
    pub job_id: Uuid,
    pub seeker_id: Uuid,
    pub seeker_email: &'a str,
    pub cover_letter: Option<&'a str>,
    pub location: Option<&'a str>,
    pub resume_url: &'a str,
}

/// Seeker fields projected into an employer's applicant list.
#[derive(Debug, Clone, Serialize)]
pub struct SeekerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Applicant {
    #[serde(flatten)]
    pub application: ApplicationRow,
    pub seeker: SeekerSummary,
}

/// Job fields projected into a seeker's application list.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub salary_range: String,
    pub job_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: ApplicationRow,
    pub job: JobSummary,
}

#[derive(Debug, FromRow)]
struct ApplicantRow {
    id: Uuid,
    job_id: Uuid,
    seeker_id: Uuid,
    seeker_email: String,
    cover_letter: Option<String>,
    location: Option<String>,
    resume_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
    user_department: Option<String>,
    user_skills: Vec<String>,
}

impl From<ApplicantRow> for Applicant {
    fn from(row: ApplicantRow) -> Self {
        Applicant {
            seeker: SeekerSummary {
                id: row.seeker_id,
                name: row.user_name,
                email: row.user_email,
                department: row.user_department,
                skills: row.user_skills,
            },
            application: ApplicationRow {
                id: row.id,
                job_id: row.job_id,
                seeker_id: row.seeker_id,
                seeker_email: row.seeker_email,
                cover_letter: row.cover_letter,
                location: row.location,
                resume_url: row.resume_url,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct ApplicationJobRow {
    id: Uuid,
    job_id: Uuid,
    seeker_id: Uuid,
    seeker_email: String,
    cover_letter: Option<String>,
    location: Option<String>,
    resume_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    job_title: String,
    job_location: String,
    job_salary_range: String,
    job_type: String,
}

impl From<ApplicationJobRow> for ApplicationWithJob {
    fn from(row: ApplicationJobRow) -> Self {
        ApplicationWithJob {
            job: JobSummary {
                id: row.job_id,
                title: row.job_title,
                location: row.job_location,
                salary_range: row.job_salary_range,
                job_type: row.job_type,
            },
            application: ApplicationRow {
                id: row.id,
                job_id: row.job_id,
                seeker_id: row.seeker_id,
                seeker_email: row.seeker_email,
                cover_letter: row.cover_letter,
                location: row.location,
                resume_url: row.resume_url,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Inserts the application and bumps the job's applicant counter
/// in one transaction.
pub async fn insert_application(
    pool: &PgPool,
    new: NewApplication<'_>,
) -> Result<ApplicationRow, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications
            (id, job_id, seeker_id, seeker_email, cover_letter, location, resume_url, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.job_id)
    .bind(new.seeker_id)
    .bind(new.seeker_email)
    .bind(new.cover_letter)
    .bind(new.location)
    .bind(new.resume_url)
    .bind(ApplicationStatus::Pending.as_str())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE jobs SET applicants_count = applicants_count + 1, updated_at = now() WHERE id = $1",
    )
    .bind(new.job_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

pub async fn find_by_job_and_seeker(
    pool: &PgPool,
    job_id: Uuid,
    seeker_id: Uuid,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE job_id = $1 AND seeker_id = $2",
    )
    .bind(job_id)
    .bind(seeker_id)
    .fetch_optional(pool)
    .await
}

pub async fn set_status(
    pool: &PgPool,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<ApplicationRow, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(status.as_str())
    .bind(application_id)
    .fetch_one(pool)
    .await
}

pub async fn applied_job_ids(pool: &PgPool, seeker_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT job_id FROM applications WHERE seeker_id = $1")
        .bind(seeker_id)
        .fetch_all(pool)
        .await
}

/// Applications for a job, newest first, with seeker details.
pub async fn applicants_for_job(pool: &PgPool, job_id: Uuid) -> Result<Vec<Applicant>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ApplicantRow>(
        r#"
        SELECT a.*,
               u.name AS user_name,
               u.email AS user_email,
               u.department AS user_department,
               u.skills AS user_skills
        FROM applications a
        JOIN users u ON u.id = a.seeker_id
        WHERE a.job_id = $1
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Applicant::from).collect())
}

/// A seeker's applications, newest first, with job details.
pub async fn applications_for_seeker(
    pool: &PgPool,
    seeker_id: Uuid,
) -> Result<Vec<ApplicationWithJob>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ApplicationJobRow>(
        r#"
        SELECT a.*,
               j.title AS job_title,
               j.location AS job_location,
               j.salary_range AS job_salary_range,
               j.job_type AS job_type
        FROM applications a
        JOIN jobs j ON j.id = a.job_id
        WHERE a.seeker_id = $1
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(seeker_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ApplicationWithJob::from).collect())
}
