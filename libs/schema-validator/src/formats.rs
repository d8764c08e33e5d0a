use once_cell::sync::Lazy;
use regex::Regex;

// Local part per RFC 5322 atext (dot-separated), domain needs at least one dot.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,63}$",
    )
    .expect("email regex must compile")
});

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid regex must compile")
});

const MAX_EMAIL_LEN: usize = 254;

pub fn is_email(s: &str) -> bool {
    s.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(s)
}

/// Hyphenated 8-4-4-4-12 hex form only.
pub fn is_uuid(s: &str) -> bool {
    UUID_RE.is_match(s)
}
