//! Repository functions for the `records` table.
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Application-level representation of a stored record.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: i64,
    pub zone_id: i64,
    pub name: String,
    pub rtype: String,
    pub content: String,
    pub ttl: i64,
    pub prio: Option<i64>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn record_from_row(row: &SqliteRow) -> Record {
    Record {
        id: row.get("id"),
        zone_id: row.get("zone_id"),
        name: row.get("name"),
        rtype: row.get("rtype"),
        content: row.get("content"),
        ttl: row.get("ttl"),
        prio: row.get("prio"),
        disabled: row.get::<i64, _>("disabled") != 0,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

const RECORD_COLUMNS: &str =
    "id, zone_id, name, rtype, content, ttl, prio, disabled, created_at, updated_at";

/// Fetch a record by id.
pub async fn find(db: &SqlitePool, record_id: i64) -> sqlx::Result<Option<Record>> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?");
    let row = sqlx::query(&sql).bind(record_id).fetch_optional(db).await?;
    Ok(row.as_ref().map(record_from_row))
}

/// All records of a zone, ordered by name then type.
pub async fn list_for_zone(db: &SqlitePool, zone_id: i64) -> sqlx::Result<Vec<Record>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM records WHERE zone_id = ? ORDER BY name, rtype, content"
    );
    let rows = sqlx::query(&sql).bind(zone_id).fetch_all(db).await?;
    Ok(rows.iter().map(|row| record_from_row(row)).collect())
}

/// Every record of one RRset (same zone, name and type).
pub async fn list_rrset(
    db: &SqlitePool,
    zone_id: i64,
    name: &str,
    rtype: &str,
) -> sqlx::Result<Vec<Record>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM records \
         WHERE zone_id = ? AND name = ? AND rtype = ? ORDER BY content"
    );
    let rows = sqlx::query(&sql)
        .bind(zone_id)
        .bind(name)
        .bind(rtype)
        .fetch_all(db)
        .await?;
    Ok(rows.iter().map(|row| record_from_row(row)).collect())
}

/// Insert a record row with an already-composed canonical name.
pub async fn insert(
    db: &SqlitePool,
    zone_id: i64,
    name: &str,
    rtype: &str,
    content: &str,
    ttl: i64,
    prio: Option<i64>,
    disabled: bool,
) -> sqlx::Result<i64> {
    let now = Utc::now();
    let res = sqlx::query(
        r#"
        INSERT INTO records (zone_id, name, rtype, content, ttl, prio, disabled, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(zone_id)
    .bind(name)
    .bind(rtype)
    .bind(content)
    .bind(ttl)
    .bind(prio)
    .bind(if disabled { 1 } else { 0 })
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(res.last_insert_rowid())
}

/// Update the mutable fields of a record in place.
pub async fn update(
    db: &SqlitePool,
    record_id: i64,
    name: &str,
    rtype: &str,
    content: &str,
    ttl: i64,
    prio: Option<i64>,
    disabled: bool,
) -> sqlx::Result<bool> {
    let now = Utc::now();
    let res = sqlx::query(
        r#"
        UPDATE records
        SET name = ?, rtype = ?, content = ?, ttl = ?, prio = ?, disabled = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(rtype)
    .bind(content)
    .bind(ttl)
    .bind(prio)
    .bind(if disabled { 1 } else { 0 })
    .bind(now)
    .bind(record_id)
    .execute(db)
    .await?;

    Ok(res.rows_affected() > 0)
}

/// Delete a record row and its linked comment in one transaction. The
/// comment must go first; an orphaned comment row would otherwise turn into
/// a legacy match for same-named siblings.
pub async fn delete(db: &SqlitePool, record_id: i64) -> sqlx::Result<bool> {
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

    let res = sqlx::query("DELETE FROM records WHERE id = ?")
        .bind(record_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_db;
    use crate::db::zone_repo;

    #[tokio::test]
    async fn insert_find_update_delete_round_trip() {
        let db = memory_db().await;
        let zone = zone_repo::insert(&db, "example.com").await.unwrap();

        let id = insert(&db, zone, "www.example.com", "A", "192.0.2.1", 3600, None, false)
            .await
            .unwrap();

        let rec = find(&db, id).await.unwrap().unwrap();
        assert_eq!(rec.name, "www.example.com");
        assert_eq!(rec.rtype, "A");
        assert!(!rec.disabled);

        assert!(
            update(&db, id, "www.example.com", "A", "192.0.2.2", 300, None, true)
                .await
                .unwrap()
        );
        let rec = find(&db, id).await.unwrap().unwrap();
        assert_eq!(rec.content, "192.0.2.2");
        assert_eq!(rec.ttl, 300);
        assert!(rec.disabled);

        assert!(delete(&db, id).await.unwrap());
        assert!(find(&db, id).await.unwrap().is_none());
        assert!(!delete(&db, id).await.unwrap());
    }

    #[tokio::test]
    async fn rrset_listing_groups_same_name_and_type() {
        let db = memory_db().await;
        let zone = zone_repo::insert(&db, "example.com").await.unwrap();

        insert(&db, zone, "www.example.com", "A", "192.0.2.1", 3600, None, false)
            .await
            .unwrap();
        insert(&db, zone, "www.example.com", "A", "192.0.2.2", 3600, None, false)
            .await
            .unwrap();
        insert(&db, zone, "www.example.com", "AAAA", "2001:db8::1", 3600, None, false)
            .await
            .unwrap();

        let rrset = list_rrset(&db, zone, "www.example.com", "A").await.unwrap();
        assert_eq!(rrset.len(), 2);
        assert!(rrset.iter().all(|r| r.rtype == "A"));

        assert_eq!(list_for_zone(&db, zone).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn deleting_a_record_removes_its_linked_comment() {
        use crate::db::comment_repo;

        let db = memory_db().await;
        let zone = zone_repo::insert(&db, "example.com").await.unwrap();
        let rec = insert(&db, zone, "www.example.com", "A", "192.0.2.1", 3600, None, false)
            .await
            .unwrap();
        let sibling = insert(&db, zone, "www.example.com", "A", "192.0.2.2", 3600, None, false)
            .await
            .unwrap();

        comment_repo::set_record_comment(&db, rec, zone, "www.example.com", "A", "mine", "alice")
            .await
            .unwrap();

        assert!(delete(&db, rec).await.unwrap());

        // the deleted record's comment must not resurface on the sibling
        let leaked = comment_repo::matching_unlinked(&db, zone, "www.example.com", "A")
            .await
            .unwrap();
        assert!(leaked.is_none());
        assert!(find(&db, sibling).await.unwrap().is_some());
    }
}
