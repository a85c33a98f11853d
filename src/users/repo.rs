use crate::users::repo_types::{NewUser, User};
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The unique index on `email` rejected the write.
    #[error("email already in use")]
    DuplicateEmail,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            RepoError::DuplicateEmail
        } else {
            RepoError::Database(e)
        }
    }
}

impl User {
    /// All users, newest `joined_on` first.
    pub async fn list_all_ordered_by_joined_desc(db: &SqlitePool) -> Result<Vec<User>, RepoError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, joined_on
            FROM users
            ORDER BY julianday(joined_on) DESC, id DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn get_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, joined_on
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, joined_on
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find another user holding `email`, ignoring the row `id`.
    pub async fn find_by_email_excluding(
        db: &SqlitePool,
        email: &str,
        id: i64,
    ) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, joined_on
            FROM users
            WHERE email = ?1 AND id != ?2
            "#,
        )
        .bind(email)
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn insert(db: &SqlitePool, new: &NewUser) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, joined_on)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, name, email, password, joined_on
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.joined_on)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Writes `name`, `email` and `password`; `joined_on` is never touched.
    pub async fn update(&self, db: &SqlitePool) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?1, email = ?2, password = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&self.name)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Returns the number of rows removed.
    pub async fn delete(db: &SqlitePool, id: i64) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};

    fn new_user(name: &str, email: &str, joined_on: OffsetDateTime) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
            password_hash: "hash".into(),
            joined_on,
        }
    }

    async fn pool() -> SqlitePool {
        crate::db::connect_in_memory().await.expect("pool")
    }

    #[tokio::test]
    async fn insert_assigns_id_and_keeps_joined_on() {
        let db = pool().await;
        let joined_on = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();
        let user = User::insert(&db, &new_user("Ann", "ann@x.com", joined_on))
            .await
            .expect("insert");
        assert!(user.id > 0);
        assert_eq!(user.joined_on, joined_on);

        let fetched = User::get_by_id(&db, user.id).await.unwrap().expect("row");
        assert_eq!(fetched.email, "ann@x.com");
        assert_eq!(fetched.joined_on, joined_on);
    }

    #[tokio::test]
    async fn get_by_id_missing_is_none() {
        let db = pool().await;
        assert!(User::get_by_id(&db, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_by_joined_on_desc_regardless_of_insert_order() {
        let db = pool().await;
        let now = OffsetDateTime::now_utc();
        User::insert(&db, &new_user("Mid", "mid@x.com", now - Duration::hours(1)))
            .await
            .unwrap();
        User::insert(&db, &new_user("Old", "old@x.com", now - Duration::days(2)))
            .await
            .unwrap();
        User::insert(&db, &new_user("New", "new@x.com", now))
            .await
            .unwrap();

        let names: Vec<String> = User::list_all_ordered_by_joined_desc(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, ["New", "Mid", "Old"]);
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicate_insert() {
        let db = pool().await;
        let now = OffsetDateTime::now_utc();
        User::insert(&db, &new_user("A", "a@x.com", now)).await.unwrap();
        let err = User::insert(&db, &new_user("B", "a@x.com", now))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::DuplicateEmail));
        assert_eq!(User::list_all_ordered_by_joined_desc(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_by_email_excluding_skips_own_row() {
        let db = pool().await;
        let now = OffsetDateTime::now_utc();
        let a = User::insert(&db, &new_user("A", "a@x.com", now)).await.unwrap();
        let b = User::insert(&db, &new_user("B", "b@x.com", now)).await.unwrap();

        assert!(User::find_by_email_excluding(&db, "a@x.com", a.id)
            .await
            .unwrap()
            .is_none());
        let other = User::find_by_email_excluding(&db, "b@x.com", a.id)
            .await
            .unwrap()
            .expect("b owns it");
        assert_eq!(other.id, b.id);
        assert!(User::find_by_email(&db, "c@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_changes_fields_but_not_joined_on() {
        let db = pool().await;
        let joined_on = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap() - Duration::days(3);
        let mut user = User::insert(&db, &new_user("A", "a@x.com", joined_on)).await.unwrap();

        user.name = "Alice".into();
        user.email = "alice@x.com".into();
        user.password_hash = "other".into();
        user.joined_on = OffsetDateTime::now_utc();
        user.update(&db).await.unwrap();

        let stored = User::get_by_id(&db, user.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Alice");
        assert_eq!(stored.email, "alice@x.com");
        assert_eq!(stored.password_hash, "other");
        assert_eq!(stored.joined_on, joined_on);
    }

    #[tokio::test]
    async fn update_into_taken_email_is_duplicate() {
        let db = pool().await;
        let now = OffsetDateTime::now_utc();
        let mut a = User::insert(&db, &new_user("A", "a@x.com", now)).await.unwrap();
        User::insert(&db, &new_user("B", "b@x.com", now)).await.unwrap();

        a.email = "b@x.com".into();
        assert!(matches!(a.update(&db).await, Err(RepoError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn delete_removes_only_that_row_and_ids_are_not_reused() {
        let db = pool().await;
        let now = OffsetDateTime::now_utc();
        let a = User::insert(&db, &new_user("A", "a@x.com", now)).await.unwrap();
        let b = User::insert(&db, &new_user("B", "b@x.com", now)).await.unwrap();

        assert_eq!(User::delete(&db, b.id).await.unwrap(), 1);
        assert_eq!(User::delete(&db, b.id).await.unwrap(), 0);
        assert!(User::get_by_id(&db, b.id).await.unwrap().is_none());
        assert!(User::get_by_id(&db, a.id).await.unwrap().is_some());

        let c = User::insert(&db, &new_user("C", "c@x.com", now)).await.unwrap();
        assert!(c.id > b.id);
    }
}
