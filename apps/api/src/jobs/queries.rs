use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job::{JobRow, JobType};

/// Parameters for inserting a new job posting.
pub struct NewJob<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub skills: &'a [String],
    pub location: &'a str,
    pub salary_range: &'a str,
    pub job_type: JobType,
    pub employer_id: Uuid,
}

pub async fn insert_job(pool: &PgPool, job: NewJob<'_>) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (id, title, description, skills, location, salary_range, job_type, employer_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.title)
    .bind(job.description)
    .bind(job.skills)
    .bind(job.location)
    .bind(job.salary_range)
    .bind(job.job_type.as_str())
    .bind(job.employer_id)
    .fetch_one(pool)
    .await
}

/// Open jobs, newest first. Closed jobs only show up for their employer.
pub async fn list_all(pool: &PgPool) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE is_active ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn list_for_employer(pool: &PgPool, employer_id: Uuid) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC",
    )
    .bind(employer_id)
    .fetch_all(pool)
    .await
}

pub async fn find_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

pub async fn set_active(pool: &PgPool, job_id: Uuid, is_active: bool) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "UPDATE jobs SET is_active = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(is_active)
    .bind(job_id)
    .fetch_one(pool)
    .await
}

/// Number of applications per job, for the given jobs only.
/// Jobs without applications are absent from the result.
pub async fn applicant_counts(
    pool: &PgPool,
    job_ids: &[Uuid],
) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (Uuid, i64)>(
        r#"
        SELECT job_id, COUNT(*)
        FROM applications
        WHERE job_id = ANY($1)
        GROUP BY job_id
        "#,
    )
    .bind(job_ids)
    .fetch_all(pool)
    .await
}
