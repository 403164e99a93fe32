pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::auth::role_gate::role_gate;
use crate::dashboard::handlers as dashboard;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::users::handlers as users;

/// Multipart framing overhead allowed on top of the resume itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

fn upload_limit(max_resume_bytes: usize) -> usize {
    max_resume_bytes.saturating_add(FORM_OVERHEAD_BYTES)
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = upload_limit(state.config.max_resume_bytes);

    let dashboards = Router::new()
        .route("/dashboard/employer", get(dashboard::handle_employer_dashboard))
        .route("/dashboard/seeker", get(dashboard::handle_seeker_dashboard))
        .route_layer(from_fn_with_state(state.clone(), role_gate));

    Router::new()
        .route("/health", get(health::health_handler))
        // Session
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/session", get(auth::handle_get_session))
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/v1/user/role", put(users::handle_set_role))
        // Seeker profile
        .route(
            "/api/v1/seeker/profile",
            get(users::handle_get_profile).put(users::handle_update_profile),
        )
        // Jobs
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs/recommended", get(jobs::handle_recommended_jobs))
        .route(
            "/api/v1/employer/jobs",
            get(jobs::handle_list_employer_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/v1/employer/jobs/:job_id/active",
            patch(jobs::handle_set_job_active),
        )
        .route(
            "/api/v1/employer/jobs/:job_id/applicants",
            get(jobs::handle_list_applicants),
        )
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handle_my_applications).merge(
                post(applications::handle_submit_application)
                    .layer(DefaultBodyLimit::max(upload_limit)),
            ),
        )
        .route(
            "/api/v1/applications/user",
            get(applications::handle_applied_job_ids),
        )
        .route(
            "/api/v1/applications/status",
            put(applications::handle_update_status),
        )
        .merge(dashboards)
        .with_state(state)
}
