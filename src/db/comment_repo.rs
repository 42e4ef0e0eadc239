//! Repository functions for the `comments` and `record_comment_links` tables.
//!
//! Both lookups here are deliberately plain point queries with no ORDER BY:
//! the linked-vs-legacy precedence is applied in [`crate::comments`], so the
//! SQL stays portable across engines with weak correlated-subquery support.
use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Text of the comment explicitly linked to the record, if any.
pub async fn linked_to(db: &SqlitePool, record_id: i64) -> sqlx::Result<Option<String>> {
    let row = sqlx::query(
        r#"
        SELECT c.content
        FROM record_comment_links l
        JOIN comments c ON c.id = l.comment_id
        WHERE l.record_id = ?
        "#,
    )
    .bind(record_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|row| row.get("content")))
}

/// Text of a legacy comment matching the RRset triple. Rows linked to any
/// record are excluded so a comment meant for one record never leaks onto a
/// sibling with the same name and type.
pub async fn matching_unlinked(
    db: &SqlitePool,
    zone_id: i64,
    name: &str,
    rtype: &str,
) -> sqlx::Result<Option<String>> {
    let row = sqlx::query(
        r#"
        SELECT c.content
        FROM comments c
        WHERE c.zone_id = ? AND c.name = ? AND c.rtype = ?
          AND NOT EXISTS (SELECT 1 FROM record_comment_links l WHERE l.comment_id = c.id)
        LIMIT 1
        "#,
    )
    .bind(zone_id)
    .bind(name)
    .bind(rtype)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|row| row.get("content")))
}

/// Insert a legacy comment row keyed only by the RRset triple.
pub async fn insert_legacy(
    db: &SqlitePool,
    zone_id: i64,
    name: &str,
    rtype: &str,
    content: &str,
    account: &str,
) -> sqlx::Result<i64> {
    let res = sqlx::query(
        r#"
        INSERT INTO comments (zone_id, name, rtype, content, account, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(zone_id)
    .bind(name)
    .bind(rtype)
    .bind(content)
    .bind(account)
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(res.last_insert_rowid())
}

/// Set (or replace) the comment linked to a record. The old linked comment
/// row, if any, is removed together with its link.
pub async fn set_record_comment(
    db: &SqlitePool,
    record_id: i64,
    zone_id: i64,
    name: &str,
    rtype: &str,
    content: &str,
    account: &str,
) -> sqlx::Result<()> {
    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM comments
        WHERE id IN (SELECT comment_id FROM record_comment_links WHERE record_id = ?)
        "#,
    )
    .bind(record_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM record_comment_links WHERE record_id = ?")
        .bind(record_id)
        .execute(&mut *tx)
        .await?;

    let res = sqlx::query(
        r#"
        INSERT INTO comments (zone_id, name, rtype, content, account, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(zone_id)
    .bind(name)
    .bind(rtype)
    .bind(content)
    .bind(account)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO record_comment_links (record_id, comment_id) VALUES (?, ?)")
        .bind(record_id)
        .bind(res.last_insert_rowid())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Remove a record's linked comment, if present.
pub async fn clear_record_comment(db: &SqlitePool, record_id: i64) -> sqlx::Result<()> {
    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM comments
        WHERE id IN (SELECT comment_id FROM record_comment_links WHERE record_id = ?)
        "#,
    )
    .bind(record_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM record_comment_links WHERE record_id = ?")
        .bind(record_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_db;
    use crate::db::{record_repo, zone_repo};

    #[tokio::test]
    async fn linked_comment_is_replaced_not_duplicated() {
        let db = memory_db().await;
        let zone = zone_repo::insert(&db, "example.com").await.unwrap();
        let rec = record_repo::insert(&db, zone, "www.example.com", "A", "192.0.2.1", 3600, None, false)
            .await
            .unwrap();

        set_record_comment(&db, rec, zone, "www.example.com", "A", "first", "alice")
            .await
            .unwrap();
        set_record_comment(&db, rec, zone, "www.example.com", "A", "second", "alice")
            .await
            .unwrap();

        assert_eq!(linked_to(&db, rec).await.unwrap().as_deref(), Some("second"));

        let cnt: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(cnt.0, 1);

        clear_record_comment(&db, rec).await.unwrap();
        assert!(linked_to(&db, rec).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn linked_rows_are_excluded_from_legacy_matching() {
        let db = memory_db().await;
        let zone = zone_repo::insert(&db, "example.com").await.unwrap();
        let rec = record_repo::insert(&db, zone, "www.example.com", "A", "192.0.2.1", 3600, None, false)
            .await
            .unwrap();

        set_record_comment(&db, rec, zone, "www.example.com", "A", "linked", "alice")
            .await
            .unwrap();

        // the linked row must not surface as a legacy match for a sibling
        assert!(
            matching_unlinked(&db, zone, "www.example.com", "A")
                .await
                .unwrap()
                .is_none()
        );

        insert_legacy(&db, zone, "www.example.com", "A", "legacy", "").await.unwrap();
        assert_eq!(
            matching_unlinked(&db, zone, "www.example.com", "A")
                .await
                .unwrap()
                .as_deref(),
            Some("legacy")
        );
    }
}
