use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model - SQL persistence layer
///
/// Carries only what notification delivery needs: a name for templating and
/// the addresses of the store-and-forward channels. Authentication and
/// profile data live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub email: Option<String>,
    pub web_push_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a new user
    pub async fn insert(
        first_name: &str,
        email: Option<&str>,
        web_push_token: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (first_name, email, web_push_token)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(first_name)
        .bind(email)
        .bind(web_push_token)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
