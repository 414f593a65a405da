//! Sender address decomposition.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::SenderAddress;

// One capture pattern: optional display name, then the address, with or
// without angle brackets.
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""?([^"<@]*?)"?\s*<?([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})>?"#)
        .expect("address pattern compiles")
});

/// Decompose a free-form sender string into name/email/domain. When no
/// address can be found, the email field falls back to the raw string and
/// the domain stays empty.
pub fn parse_sender(raw: &str) -> SenderAddress {
    let raw = raw.trim();
    match ADDRESS_PATTERN.captures(raw) {
        Some(caps) => {
            let name = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let email = caps
                .get(2)
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            let domain = email
                .split_once('@')
                .map(|(_, d)| d.to_string())
                .unwrap_or_default();
            SenderAddress { name, email, domain }
        }
        None => SenderAddress {
            name: raw.to_string(),
            email: raw.to_string(),
            domain: String::new(),
        },
    }
}
