use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::EmailPreference;

/// Register an email for notifications. Returns `None` when it was already
/// registered; the existing row is left alone.
pub async fn register(pool: &PgPool, email: &str) -> Result<Option<EmailPreference>, DatabaseError> {
    let row = sqlx::query_as::<_, EmailPreference>(
        r#"
        INSERT INTO base_email_preferences (email)
        VALUES ($1)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, email, base_preference, created_at, updated_at
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find(pool: &PgPool, email: &str) -> Result<Option<EmailPreference>, DatabaseError> {
    let row = sqlx::query_as::<_, EmailPreference>(
        "SELECT id, email, base_preference, created_at, updated_at FROM base_email_preferences WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Overwrite the subscription list of a registered email. `None` means the
/// email was never registered.
pub async fn update(pool: &PgPool, email: &str, base_preference: &str) -> Result<Option<EmailPreference>, DatabaseError> {
    let row = sqlx::query_as::<_, EmailPreference>(
        r#"
        UPDATE base_email_preferences
        SET base_preference = $2, updated_at = now()
        WHERE email = $1
        RETURNING id, email, base_preference, created_at, updated_at
        "#,
    )
    .bind(email)
    .bind(base_preference)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
