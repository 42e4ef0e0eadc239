//! Canonical record-name composition and display.
//!
//! Users enter only the host-identifying part of a record name; the stored
//! name always carries the zone suffix. Reverse zones are the delicate case:
//! a PTR fragment is a run of IPv4 octets or IPv6 nibbles and must survive
//! composition exactly as typed.

use crate::validation::{
    ValidationError, validate_forward_fragment, validate_ipv4_ptr_fragment,
    validate_ipv6_ptr_fragment,
};

/// Lookup direction of a zone, derived from its name at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Forward,
    ReverseIpv4,
    ReverseIpv6,
}

impl ZoneKind {
    /// Classify a zone by its canonical name.
    pub fn of_zone(zone_name: &str) -> ZoneKind {
        let name = zone_name.trim_end_matches('.');
        if name.ends_with("in-addr.arpa") {
            ZoneKind::ReverseIpv4
        } else if name.ends_with("ip6.arpa") {
            ZoneKind::ReverseIpv6
        } else {
            ZoneKind::Forward
        }
    }

    pub fn from_db(value: &str) -> ZoneKind {
        match value {
            "reverse_ipv4" => ZoneKind::ReverseIpv4,
            "reverse_ipv6" => ZoneKind::ReverseIpv6,
            _ => ZoneKind::Forward,
        }
    }

    pub fn as_db(self) -> &'static str {
        match self {
            ZoneKind::Forward => "forward",
            ZoneKind::ReverseIpv4 => "reverse_ipv4",
            ZoneKind::ReverseIpv6 => "reverse_ipv6",
        }
    }
}

/// Derive the canonical stored name for a record from the user-entered
/// fragment.
///
/// Apex input (`@` or empty) maps to the bare zone name. An input that is
/// already fully qualified within the zone is kept unchanged, so composition
/// is idempotent when an edited record is saved again. For PTR records in
/// reverse zones the fragment is validated as octets/nibbles and concatenated
/// verbatim; it is never discarded in favour of the zone name.
pub fn compose(
    zone_name: &str,
    kind: ZoneKind,
    input: &str,
    rtype: &str,
) -> Result<String, ValidationError> {
    let zone = zone_name.trim_end_matches('.');
    let input = input.trim().trim_end_matches('.');

    if input.is_empty() || input == "@" || input == zone {
        return Ok(zone.to_string());
    }

    let suffix = format!(".{zone}");
    let fragment = input.strip_suffix(&suffix).unwrap_or(input);

    match (kind, rtype) {
        (ZoneKind::ReverseIpv4, "PTR") => validate_ipv4_ptr_fragment(fragment)?,
        (ZoneKind::ReverseIpv6, "PTR") => validate_ipv6_ptr_fragment(fragment)?,
        _ => validate_forward_fragment(fragment)?,
    }

    Ok(format!("{fragment}{suffix}"))
}

/// Invert [`compose`] for the edit form: the fragment originally entered by
/// the user, or `@` when the record really is the zone apex.
pub fn display_fragment(zone_name: &str, stored_name: &str) -> String {
    let zone = zone_name.trim_end_matches('.');
    let stored = stored_name.trim_end_matches('.');

    if stored == zone {
        return "@".to_string();
    }
    match stored.strip_suffix(&format!(".{zone}")) {
        Some(fragment) => fragment.to_string(),
        // Name outside the zone; show it untouched rather than guessing.
        None => stored.to_string(),
    }
}
