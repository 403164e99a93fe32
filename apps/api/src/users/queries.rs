use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{Role, UserRow};

/// Identity asserted by the OAuth gateway on sign-in.
#[derive(Debug, Clone)]
pub struct Identity<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub image: Option<&'a str>,
}

/// Inserts the user or refreshes name and image.
/// Role and profile fields of an existing user are left alone.
pub async fn upsert_user(pool: &PgPool, identity: Identity<'_>) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, name, email, image)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name,
                image = EXCLUDED.image,
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(identity.name)
    .bind(identity.email)
    .bind(identity.image)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn set_role(pool: &PgPool, user_id: Uuid, role: Role) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "UPDATE users SET role = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(role.as_str())
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    department: Option<&str>,
    skills: &[String],
) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET department = $1, skills = $2, updated_at = now()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(department)
    .bind(skills)
    .bind(user_id)
    .fetch_one(pool)
    .await
}
