//! Record comment resolution.
//!
//! Precedence, first match wins:
//!   1. the comment explicitly linked to the record,
//!   2. a legacy comment matching the RRset triple and linked to nothing,
//!   3. no comment.
//!
//! Each step is an independent point lookup; the merge happens here rather
//! than in SQL. Some supported engines reject ORDER BY on outer columns
//! inside a correlated subquery, and the two-lookup form behaves identically
//! everywhere.

use crate::db::comment_repo;
use sqlx::SqlitePool;

/// Resolve the single applicable comment for a record. `None` is a normal
/// outcome, not an error.
pub async fn resolve_comment(
    db: &SqlitePool,
    record_id: i64,
    zone_id: i64,
    record_name: &str,
    record_type: &str,
) -> sqlx::Result<Option<String>> {
    if let Some(linked) = comment_repo::linked_to(db, record_id).await? {
        return Ok(Some(linked));
    }
    comment_repo::matching_unlinked(db, zone_id, record_name, record_type).await
}
