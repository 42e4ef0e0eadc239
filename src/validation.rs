use regex::Regex;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("record name is empty")]
    Empty,
    #[error("record name too long (max 253 characters)")]
    TooLong,
    #[error("label too long (max 63 characters)")]
    LabelTooLong,
    #[error("record name contains invalid characters")]
    InvalidCharacters,
    #[error("label must not start or end with '-'")]
    LeadingOrTrailingHyphen,
    #[error("wildcard '*' is only allowed as the leftmost label")]
    MisplacedWildcard,
    #[error("PTR name in an IPv4 reverse zone must be dotted decimal octets")]
    InvalidIpv4Octets,
    #[error("PTR name in an IPv6 reverse zone must be single hex nibbles")]
    InvalidIpv6Nibbles,
}

lazy_static::lazy_static! {
    /// Letters, digits, '-' and '_' (underscore for SRV/TXT-style labels).
    static ref LABEL_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
    static ref IPV4_OCTET_RE: Regex = Regex::new(r"^[0-9]{1,3}$").unwrap();
    static ref IPV6_NIBBLE_RE: Regex = Regex::new(r"^[0-9a-fA-F]$").unwrap();
}

/// Validate one hostname label as entered by a user.
pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.is_empty() {
        return Err(ValidationError::Empty);
    }
    if label.len() > 63 {
        return Err(ValidationError::LabelTooLong);
    }
    if !LABEL_RE.is_match(label) {
        return Err(ValidationError::InvalidCharacters);
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(ValidationError::LeadingOrTrailingHyphen);
    }
    Ok(())
}

/// Validate a user-entered name fragment for a forward zone.
///
/// A lone `*` is accepted as the leftmost label; everything else must be a
/// plain hostname label.
pub fn validate_forward_fragment(fragment: &str) -> Result<(), ValidationError> {
    if fragment.is_empty() {
        return Err(ValidationError::Empty);
    }
    if fragment.len() > 253 {
        return Err(ValidationError::TooLong);
    }
    for (i, label) in fragment.split('.').enumerate() {
        if label == "*" {
            if i != 0 {
                return Err(ValidationError::MisplacedWildcard);
            }
            continue;
        }
        validate_label(label)?;
    }
    Ok(())
}

/// Validate a PTR fragment in an IPv4 reverse zone: dot-separated decimal
/// octets, e.g. `"5"` or `"12.0"`.
pub fn validate_ipv4_ptr_fragment(fragment: &str) -> Result<(), ValidationError> {
    if fragment.is_empty() {
        return Err(ValidationError::Empty);
    }
    for part in fragment.split('.') {
        if !IPV4_OCTET_RE.is_match(part) {
            return Err(ValidationError::InvalidIpv4Octets);
        }
        // regex limits to 3 digits; still bounds-check the value
        if part.parse::<u16>().map_err(|_| ValidationError::InvalidIpv4Octets)? > 255 {
            return Err(ValidationError::InvalidIpv4Octets);
        }
    }
    Ok(())
}

/// Validate a PTR fragment in an IPv6 reverse zone: dot-separated single hex
/// nibbles, e.g. `"1.0.0.0.0.0.0.0"`.
pub fn validate_ipv6_ptr_fragment(fragment: &str) -> Result<(), ValidationError> {
    if fragment.is_empty() {
        return Err(ValidationError::Empty);
    }
    for part in fragment.split('.') {
        if !IPV6_NIBBLE_RE.is_match(part) {
            return Err(ValidationError::InvalidIpv6Nibbles);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_wildcard_forward_fragments() {
        assert!(validate_forward_fragment("www").is_ok());
        assert!(validate_forward_fragment("_dmarc").is_ok());
        assert!(validate_forward_fragment("a.b.c").is_ok());
        assert!(validate_forward_fragment("*.staging").is_ok());
    }

    #[test]
    fn rejects_malformed_forward_fragments() {
        assert!(validate_forward_fragment("").is_err());
        assert!(validate_forward_fragment("bad host").is_err());
        assert!(validate_forward_fragment("-lead").is_err());
        assert!(validate_forward_fragment("www.*").is_err());
        assert!(validate_forward_fragment("a..b").is_err());
    }

    #[test]
    fn ipv4_ptr_fragments_are_octets() {
        assert!(validate_ipv4_ptr_fragment("5").is_ok());
        assert!(validate_ipv4_ptr_fragment("12.0").is_ok());
        assert!(validate_ipv4_ptr_fragment("256").is_err());
        assert!(validate_ipv4_ptr_fragment("a").is_err());
    }

    #[test]
    fn ipv6_ptr_fragments_are_nibbles() {
        assert!(validate_ipv6_ptr_fragment("1.0.0.0.0.0.0.0").is_ok());
        assert!(validate_ipv6_ptr_fragment("f").is_ok());
        assert!(validate_ipv6_ptr_fragment("10.0").is_err());
        assert!(validate_ipv6_ptr_fragment("g").is_err());
    }
}
