//! Ownership-based zone visibility filtering.
//!
//! A [`VisibilityFilter`] yields one SQL predicate fragment that every
//! zone-reading query (listing, counting, first-letter index, search) appends
//! verbatim, so the ownership rule is derived in exactly one place. Under the
//! elevated `all` scope the fragment is absent entirely rather than a
//! constant-true predicate; callers rely on that structurally.

/// Permission scope of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only zones owned directly or through a group assignment.
    Own,
    /// Every zone, ownership ignored.
    All,
}

impl Scope {
    pub fn from_db(value: &str) -> Scope {
        match value {
            "all" => Scope::All,
            _ => Scope::Own,
        }
    }

    pub fn as_db(self) -> &'static str {
        match self {
            Scope::Own => "own",
            Scope::All => "all",
        }
    }
}

/// Predicate over the `zones z` alias. The two placeholders both take the
/// principal's user id, in order.
const OWN_PREDICATE: &str = "(EXISTS (SELECT 1 FROM zone_owners zo \
     WHERE zo.zone_id = z.id AND zo.user_id = ?) \
     OR EXISTS (SELECT 1 FROM zone_groups zg \
     JOIN group_members gm ON gm.group_id = zg.group_id \
     WHERE zg.zone_id = z.id AND gm.user_id = ?))";

/// Ownership filter for a single principal, reusable across every
/// zone-reading query in one request.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFilter {
    scope: Scope,
    user_id: i64,
}

impl VisibilityFilter {
    pub fn new(scope: Scope, user_id: i64) -> Self {
        Self { scope, user_id }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// SQL predicate fragment over the `zones z` alias, or `None` when the
    /// scope imposes no ownership restriction.
    pub fn predicate(&self) -> Option<&'static str> {
        match self.scope {
            Scope::All => None,
            Scope::Own => Some(OWN_PREDICATE),
        }
    }

    /// Number of `?` placeholders in [`predicate`](Self::predicate); each one
    /// binds the principal's user id.
    pub fn bind_count(&self) -> usize {
        match self.scope {
            Scope::All => 0,
            Scope::Own => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_scope_has_no_predicate_at_all() {
        let filter = VisibilityFilter::new(Scope::All, 7);
        assert!(filter.predicate().is_none());
        assert_eq!(filter.bind_count(), 0);
    }

    #[test]
    fn own_scope_predicate_covers_both_ownership_kinds() {
        let filter = VisibilityFilter::new(Scope::Own, 7);
        let sql = filter.predicate().unwrap();
        assert!(sql.contains("zone_owners"));
        assert!(sql.contains("group_members"));
        assert_eq!(sql.matches('?').count(), filter.bind_count());
    }

    #[test]
    fn scope_round_trips_through_db_representation() {
        assert_eq!(Scope::from_db("all"), Scope::All);
        assert_eq!(Scope::from_db("own"), Scope::Own);
        assert_eq!(Scope::from_db("garbage"), Scope::Own);
        assert_eq!(Scope::from_db(Scope::All.as_db()), Scope::All);
    }
}
