//! Repository functions for the `zone_owners` and `zone_groups` join tables.
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::db::user_repo;

/// One direct owner of a zone, as returned to the API layer.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneOwner {
    pub user_id: i64,
    pub username: String,
}

/// Determine whether a direct ownership row exists for (zone, user).
pub async fn direct_owner_exists(
    db: &SqlitePool,
    zone_id: i64,
    user_id: i64,
) -> sqlx::Result<bool> {
    let cnt: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM zone_owners WHERE zone_id = ? AND user_id = ?")
            .bind(zone_id)
            .bind(user_id)
            .fetch_one(db)
            .await?;
    Ok(cnt.0 > 0)
}

/// Ids of every group assigned to the zone.
pub async fn group_owners_of(db: &SqlitePool, zone_id: i64) -> sqlx::Result<Vec<i64>> {
    let rows = sqlx::query("SELECT group_id FROM zone_groups WHERE zone_id = ?")
        .bind(zone_id)
        .fetch_all(db)
        .await?;
    Ok(rows.iter().map(|row| row.get("group_id")).collect())
}

/// All direct owners of the zone, alphabetically by username.
pub async fn list_owners(db: &SqlitePool, zone_id: i64) -> sqlx::Result<Vec<ZoneOwner>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id AS user_id, u.username
        FROM zone_owners zo
        JOIN users u ON u.id = zo.user_id
        WHERE zo.zone_id = ?
        ORDER BY u.username
        "#,
    )
    .bind(zone_id)
    .fetch_all(db)
    .await?;

    Ok(rows
        .iter()
        .map(|row| ZoneOwner {
            user_id: row.get("user_id"),
            username: row.get("username"),
        })
        .collect())
}

/// Insert a direct ownership row. Returns `false` when the row already
/// existed. A single statement, so two concurrent adds cannot both succeed.
pub async fn add_owner(db: &SqlitePool, zone_id: i64, user_id: i64) -> sqlx::Result<bool> {
    let res =
        sqlx::query("INSERT OR IGNORE INTO zone_owners (zone_id, user_id) VALUES (?, ?)")
            .bind(zone_id)
            .bind(user_id)
            .execute(db)
            .await?;
    Ok(res.rows_affected() > 0)
}

/// Delete a direct ownership row. Returns `false` when no row existed.
pub async fn remove_owner(db: &SqlitePool, zone_id: i64, user_id: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM zone_owners WHERE zone_id = ? AND user_id = ?")
        .bind(zone_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Assign a group to a zone; a no-op when the assignment already exists.
pub async fn assign_group(db: &SqlitePool, zone_id: i64, group_id: i64) -> sqlx::Result<()> {
    sqlx::query("INSERT OR IGNORE INTO zone_groups (zone_id, group_id) VALUES (?, ?)")
        .bind(zone_id)
        .bind(group_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Remove a group assignment from a zone.
pub async fn unassign_group(db: &SqlitePool, zone_id: i64, group_id: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM zone_groups WHERE zone_id = ? AND group_id = ?")
        .bind(zone_id)
        .bind(group_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Per-item classification of a batch owner add.
#[derive(Debug, Default, Serialize)]
pub struct BatchAddOutcome {
    pub added: Vec<i64>,
    pub skipped: Vec<i64>,
    pub not_found: Vec<i64>,
}

/// Add several owners to a zone in one call. Items are processed in order
/// and classified individually; a bad id never fails the rest of the batch.
pub async fn add_owners(
    db: &SqlitePool,
    zone_id: i64,
    user_ids: &[i64],
) -> sqlx::Result<BatchAddOutcome> {
    let mut outcome = BatchAddOutcome::default();

    for &user_id in user_ids {
        if !user_repo::exists(db, user_id).await? {
            outcome.not_found.push(user_id);
        } else if add_owner(db, zone_id, user_id).await? {
            outcome.added.push(user_id);
        } else {
            outcome.skipped.push(user_id);
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_db;
    use crate::db::{user_repo, zone_repo};
    use crate::visibility::Scope;

    #[tokio::test]
    async fn add_list_remove_round_trip() {
        let db = memory_db().await;
        let alice = user_repo::insert(&db, "alice", "h", Scope::Own).await.unwrap();
        let zone = zone_repo::insert(&db, "example.com").await.unwrap();

        assert!(add_owner(&db, zone, alice).await.unwrap());
        assert!(direct_owner_exists(&db, zone, alice).await.unwrap());
        // duplicate add reports the existing row
        assert!(!add_owner(&db, zone, alice).await.unwrap());

        let owners = list_owners(&db, zone).await.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].username, "alice");

        assert!(remove_owner(&db, zone, alice).await.unwrap());
        assert!(!remove_owner(&db, zone, alice).await.unwrap());
        assert!(!direct_owner_exists(&db, zone, alice).await.unwrap());
    }

    #[tokio::test]
    async fn batch_add_partitions_every_item() {
        let db = memory_db().await;
        let alice = user_repo::insert(&db, "alice", "h", Scope::Own).await.unwrap();
        let bob = user_repo::insert(&db, "bob", "h", Scope::Own).await.unwrap();
        let zone = zone_repo::insert(&db, "example.com").await.unwrap();
        add_owner(&db, zone, bob).await.unwrap();

        let missing = bob + 100;
        let outcome = add_owners(&db, zone, &[alice, bob, missing]).await.unwrap();

        assert_eq!(outcome.added, vec![alice]);
        assert_eq!(outcome.skipped, vec![bob]);
        assert_eq!(outcome.not_found, vec![missing]);
    }

    #[tokio::test]
    async fn group_assignment_round_trip() {
        let db = memory_db().await;
        let ops = user_repo::insert_group(&db, "ops").await.unwrap();
        let zone = zone_repo::insert(&db, "example.com").await.unwrap();

        assign_group(&db, zone, ops).await.unwrap();
        assign_group(&db, zone, ops).await.unwrap();
        assert_eq!(group_owners_of(&db, zone).await.unwrap(), vec![ops]);

        assert!(unassign_group(&db, zone, ops).await.unwrap());
        assert!(!unassign_group(&db, zone, ops).await.unwrap());
        assert!(group_owners_of(&db, zone).await.unwrap().is_empty());
    }
}
