//! Repository functions for the `zones` table.
//!
//! Every reading query takes a [`VisibilityFilter`] and appends its predicate
//! unchanged, so listing, counting, the letter index and search all enforce
//! the same ownership rule.
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::record_name::ZoneKind;
use crate::visibility::VisibilityFilter;

/// Application-level representation of a stored zone.
#[derive(Debug, Clone)]
pub struct Zone {
    pub id: i64,
    pub name: String,
    pub kind: ZoneKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn zone_from_row(row: &SqliteRow) -> Zone {
    Zone {
        id: row.get("id"),
        name: row.get("name"),
        kind: ZoneKind::from_db(row.get::<String, _>("kind").as_str()),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

/// Fetch a zone by id.
pub async fn find(db: &SqlitePool, zone_id: i64) -> sqlx::Result<Option<Zone>> {
    let row = sqlx::query(
        "SELECT id, name, kind, created_at, updated_at FROM zones WHERE id = ?",
    )
    .bind(zone_id)
    .fetch_optional(db)
    .await?;

    Ok(row.as_ref().map(zone_from_row))
}

/// Create a new zone row; the kind is derived from the zone name.
pub async fn insert(db: &SqlitePool, name: &str) -> sqlx::Result<i64> {
    let now = Utc::now();
    let name = name.trim_end_matches('.');
    let kind = ZoneKind::of_zone(name);

    let res = sqlx::query(
        "INSERT INTO zones (name, kind, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(kind.as_db())
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(res.last_insert_rowid())
}

/// Additional predicates a caller may AND onto the visibility filter.
#[derive(Debug, Default, Clone)]
pub struct ZoneQuery {
    /// Substring match on the zone name.
    pub search: Option<String>,
    /// Exact match on the uppercased first letter of the zone name.
    pub letter: Option<String>,
}

fn build_where(filter: &VisibilityFilter, query: &ZoneQuery) -> String {
    let mut clauses: Vec<&str> = Vec::new();
    if let Some(predicate) = filter.predicate() {
        clauses.push(predicate);
    }
    if query.letter.is_some() {
        clauses.push("UPPER(SUBSTR(z.name, 1, 1)) = ?");
    }
    if query.search.is_some() {
        clauses.push("z.name LIKE ?");
    }
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

/// Bind parameters in the same order `build_where` emits placeholders:
/// visibility first, then letter, then search.
macro_rules! bind_zone_query {
    ($q:expr, $filter:expr, $query:expr) => {{
        let mut q = $q;
        for _ in 0..$filter.bind_count() {
            q = q.bind($filter.user_id());
        }
        if let Some(letter) = &$query.letter {
            q = q.bind(letter.to_uppercase());
        }
        if let Some(search) = &$query.search {
            q = q.bind(format!("%{search}%"));
        }
        q
    }};
}

/// List the zones visible to the principal, alphabetically.
pub async fn list(
    db: &SqlitePool,
    filter: &VisibilityFilter,
    query: &ZoneQuery,
) -> sqlx::Result<Vec<Zone>> {
    let sql = format!(
        "SELECT z.id, z.name, z.kind, z.created_at, z.updated_at FROM zones z{} ORDER BY z.name",
        build_where(filter, query),
    );

    let rows = bind_zone_query!(sqlx::query(&sql), filter, query)
        .fetch_all(db)
        .await?;

    Ok(rows.iter().map(zone_from_row).collect())
}

/// Count the zones visible to the principal.
pub async fn count(
    db: &SqlitePool,
    filter: &VisibilityFilter,
    query: &ZoneQuery,
) -> sqlx::Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM zones z{}",
        build_where(filter, query),
    );

    let cnt: (i64,) = bind_zone_query!(sqlx::query_as(&sql), filter, query)
        .fetch_one(db)
        .await?;

    Ok(cnt.0)
}

/// Distinct uppercased first letters of the zones visible to the principal,
/// for the alphabetical index.
pub async fn first_letters(
    db: &SqlitePool,
    filter: &VisibilityFilter,
) -> sqlx::Result<Vec<String>> {
    let query = ZoneQuery::default();
    let sql = format!(
        "SELECT DISTINCT UPPER(SUBSTR(z.name, 1, 1)) AS letter FROM zones z{} ORDER BY letter",
        build_where(filter, &query),
    );

    let rows = bind_zone_query!(sqlx::query(&sql), filter, &query)
        .fetch_all(db)
        .await?;

    Ok(rows.iter().map(|row| row.get("letter")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_db;
    use crate::db::{ownership_repo, user_repo};
    use crate::visibility::Scope;

    /// Fixture: alice directly owns example.com; the ops group owns
    /// group.example.org; orphan.example.net has no owner of either kind.
    async fn seed(db: &SqlitePool) -> (i64, i64, i64, i64) {
        let alice = user_repo::insert(db, "alice", "h", Scope::Own).await.unwrap();
        let ops = user_repo::insert_group(db, "ops").await.unwrap();
        user_repo::add_group_member(db, ops, alice).await.unwrap();

        let direct = insert(db, "example.com").await.unwrap();
        let grouped = insert(db, "group.example.org").await.unwrap();
        let orphan = insert(db, "orphan.example.net").await.unwrap();

        ownership_repo::add_owner(db, direct, alice).await.unwrap();
        ownership_repo::assign_group(db, grouped, ops).await.unwrap();

        (alice, direct, grouped, orphan)
    }

    #[tokio::test]
    async fn own_scope_sees_direct_and_group_zones_only() {
        let db = memory_db().await;
        let (alice, direct, grouped, _orphan) = seed(&db).await;

        let filter = VisibilityFilter::new(Scope::Own, alice);
        let zones = list(&db, &filter, &ZoneQuery::default()).await.unwrap();
        let ids: Vec<i64> = zones.iter().map(|z| z.id).collect();

        assert_eq!(ids, vec![direct, grouped]);
        assert_eq!(count(&db, &filter, &ZoneQuery::default()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn all_scope_sees_every_zone_including_orphans() {
        let db = memory_db().await;
        let (alice, ..) = seed(&db).await;

        let filter = VisibilityFilter::new(Scope::All, alice);
        assert_eq!(count(&db, &filter, &ZoneQuery::default()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn outsider_with_no_groups_sees_nothing() {
        let db = memory_db().await;
        seed(&db).await;
        let mallory = user_repo::insert(&db, "mallory", "h", Scope::Own)
            .await
            .unwrap();

        let filter = VisibilityFilter::new(Scope::Own, mallory);
        assert!(list(&db, &filter, &ZoneQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_and_letter_compose_with_the_visibility_filter() {
        let db = memory_db().await;
        let (alice, direct, grouped, _orphan) = seed(&db).await;
        let filter = VisibilityFilter::new(Scope::Own, alice);

        let search = ZoneQuery {
            search: Some("example.org".into()),
            ..ZoneQuery::default()
        };
        let zones = list(&db, &filter, &search).await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id, grouped);

        let letter = ZoneQuery {
            letter: Some("e".into()),
            ..ZoneQuery::default()
        };
        let zones = list(&db, &filter, &letter).await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id, direct);

        // the orphan's letter never shows up under own scope
        let letters = first_letters(&db, &filter).await.unwrap();
        assert_eq!(letters, vec!["E".to_string(), "G".to_string()]);
    }

    #[tokio::test]
    async fn reverse_zone_kinds_are_classified_on_insert() {
        let db = memory_db().await;
        let id = insert(&db, "2.0.192.in-addr.arpa.").await.unwrap();
        let zone = find(&db, id).await.unwrap().unwrap();
        assert_eq!(zone.kind, ZoneKind::ReverseIpv4);
        assert_eq!(zone.name, "2.0.192.in-addr.arpa");
    }
}
