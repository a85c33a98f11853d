use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                      // assigned by the store
    pub name: String,
    pub email: String,                // trimmed, lowercase, unique
    #[sqlx(rename = "password")]
    pub password_hash: String,        // Argon2 PHC string
    pub joined_on: OffsetDateTime,    // UTC, write-once
}

/// Row to insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub joined_on: OffsetDateTime,
}
