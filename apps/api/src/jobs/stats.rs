use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::jobs::queries::{applicant_counts, list_for_employer};
use crate::models::job::JobRow;

/// One bar of the employer's applicants-per-job chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStat {
    pub name: String,
    pub applicants: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployerStats {
    pub total_jobs: usize,
    pub total_applicants: i64,
    pub active_jobs: usize,
    pub job_stats: Vec<JobStat>,
}

#[derive(Debug, Serialize)]
pub struct EmployerOverview {
    pub jobs: Vec<JobRow>,
    pub stats: EmployerStats,
}

/// Loads the employer's jobs (newest first) with their stats.
pub async fn employer_overview(pool: &PgPool, employer_id: Uuid) -> Result<EmployerOverview, sqlx::Error> {
    let jobs = list_for_employer(pool, employer_id).await?;
    let job_ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
    let counts = if job_ids.is_empty() {
        Vec::new()
    } else {
        applicant_counts(pool, &job_ids).await?
    };
    let stats = compute_employer_stats(&jobs, &counts);
    Ok(EmployerOverview { jobs, stats })
}

/// Builds stats from jobs and per-job application counts.
/// Counts are taken from the applications table, not the job's counter.
pub fn compute_employer_stats(jobs: &[JobRow], counts: &[(Uuid, i64)]) -> EmployerStats {
    let by_job: HashMap<Uuid, i64> = counts.iter().copied().collect();

    let job_stats: Vec<JobStat> = jobs
        .iter()
        .map(|job| JobStat {
            name: job.title.clone(),
            applicants: by_job.get(&job.id).copied().unwrap_or(0),
        })
        .collect();

    EmployerStats {
        total_jobs: jobs.len(),
        total_applicants: job_stats.iter().map(|s| s.applicants).sum(),
        active_jobs: jobs.iter().filter(|j| j.is_active).count(),
        job_stats,
    }
}
