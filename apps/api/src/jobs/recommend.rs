//! Job recommendations for a seeker.
//!
//! A job qualifies when it is open, the seeker has not applied to it yet and, if the
//! seeker has any skills or a department on file, at least one of:
//! - a job skill is one of the seeker's skills (exact membership)
//! - the department appears case-insensitively in the title or description
//!
//! No scoring or ranking: results come back in the database's natural order.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::applications::queries::applied_job_ids;
use crate::models::job::JobRow;
use crate::models::user::UserRow;

pub const RECOMMENDATION_LIMIT: i64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationFilter {
    pub exclude_job_ids: Vec<Uuid>,
    pub skills: Vec<String>,
    /// Lower-cased department keyword.
    pub department: Option<String>,
}

impl RecommendationFilter {
    pub fn for_user(user: &UserRow, applied: Vec<Uuid>) -> Self {
        let department = user
            .department
            .as_deref()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty());
        Self {
            exclude_job_ids: applied,
            skills: user.skills.clone(),
            department,
        }
    }

    pub fn has_preferences(&self) -> bool {
        !self.skills.is_empty() || self.department.is_some()
    }

    pub fn to_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new("SELECT * FROM jobs WHERE is_active AND NOT (id = ANY(");
        qb.push_bind(&self.exclude_job_ids);
        qb.push("))");

        if self.has_preferences() {
            qb.push(" AND (");
            let mut first = true;
            if !self.skills.is_empty() {
                qb.push("skills && ");
                qb.push_bind(&self.skills);
                first = false;
            }
            if let Some(department) = &self.department {
                if !first {
                    qb.push(" OR ");
                }
                let pattern = contains_pattern(department);
                qb.push("title ILIKE ");
                qb.push_bind(pattern.clone());
                qb.push(" OR description ILIKE ");
                qb.push_bind(pattern);
            }
            qb.push(")");
        }

        qb.push(" LIMIT ");
        qb.push_bind(RECOMMENDATION_LIMIT);
        qb
    }
}

/// `%keyword%` with LIKE metacharacters escaped.
fn contains_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Up to ten jobs matching the user's skills or department that they
/// have not applied to yet.
pub async fn recommend_for(pool: &PgPool, user: &UserRow) -> Result<Vec<JobRow>, sqlx::Error> {
    let applied = applied_job_ids(pool, user.id).await?;
    let filter = RecommendationFilter::for_user(user, applied);
    let mut query = filter.to_query();
    let jobs = query.build_query_as::<JobRow>().fetch_all(pool).await?;
    Ok(jobs)
}
