//! Repository functions for the `users`, `groups` and `group_members` tables.
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::visibility::Scope;

/// Application-level representation of a stored user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub scope: Scope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Determine whether a user row with the given id exists.
pub async fn exists(db: &SqlitePool, user_id: i64) -> sqlx::Result<bool> {
    let cnt: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(cnt.0 > 0)
}

/// Fetch a user by login name.
pub async fn find_by_username(db: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT
            id,
            username,
            password_hash,
            scope,
            created_at,
            updated_at,
            last_login_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        scope: Scope::from_db(row.get::<String, _>("scope").as_str()),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        last_login_at: row.get("last_login_at"),
    }))
}

/// Create a new user row.
pub async fn insert(
    db: &SqlitePool,
    username: &str,
    password_hash: &str,
    scope: Scope,
) -> sqlx::Result<i64> {
    let now = Utc::now();

    let res = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, scope, created_at, updated_at, last_login_at)
        VALUES (?, ?, ?, ?, ?, NULL)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(scope.as_db())
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(res.last_insert_rowid())
}

/// Update the user's last successful login timestamp.
pub async fn update_last_login(db: &SqlitePool, user_id: i64) -> sqlx::Result<()> {
    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE users
        SET last_login_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(())
}

/// Ids of every group the user is a member of. Groups are flat; there is no
/// nesting to chase.
pub async fn groups_of(db: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<i64>> {
    let rows = sqlx::query("SELECT group_id FROM group_members WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(db)
        .await?;

    Ok(rows.iter().map(|row| row.get("group_id")).collect())
}

/// Create a new group, returning its id.
pub async fn insert_group(db: &SqlitePool, name: &str) -> sqlx::Result<i64> {
    let res = sqlx::query("INSERT INTO groups (name) VALUES (?)")
        .bind(name)
        .execute(db)
        .await?;
    Ok(res.last_insert_rowid())
}

/// Add a user to a group; a no-op when the membership already exists.
pub async fn add_group_member(db: &SqlitePool, group_id: i64, user_id: i64) -> sqlx::Result<()> {
    sqlx::query("INSERT OR IGNORE INTO group_members (group_id, user_id) VALUES (?, ?)")
        .bind(group_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Remove a user from a group.
pub async fn remove_group_member(db: &SqlitePool, group_id: i64, user_id: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
        .bind(group_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_db;

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let db = memory_db().await;

        let id = insert(&db, "alice", "hash", Scope::Own).await.unwrap();
        let user = find_by_username(&db, "alice").await.unwrap().unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.scope, Scope::Own);
        assert!(user.last_login_at.is_none());
        assert!(exists(&db, id).await.unwrap());
        assert!(!exists(&db, id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn group_membership_lookup() {
        let db = memory_db().await;

        let alice = insert(&db, "alice", "h", Scope::Own).await.unwrap();
        let ops = insert_group(&db, "ops").await.unwrap();
        let dns = insert_group(&db, "dns").await.unwrap();

        assert!(groups_of(&db, alice).await.unwrap().is_empty());

        add_group_member(&db, ops, alice).await.unwrap();
        add_group_member(&db, dns, alice).await.unwrap();
        // duplicate add is a no-op
        add_group_member(&db, ops, alice).await.unwrap();

        let mut groups = groups_of(&db, alice).await.unwrap();
        groups.sort_unstable();
        assert_eq!(groups, vec![ops, dns]);

        assert!(remove_group_member(&db, ops, alice).await.unwrap());
        assert!(!remove_group_member(&db, ops, alice).await.unwrap());
        assert_eq!(groups_of(&db, alice).await.unwrap(), vec![dns]);
    }
}
