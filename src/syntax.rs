//! Address syntax gate.
//!
//! A single fixed pattern decides whether an input even enters the pipeline;
//! anything failing it short-circuits to a minimal result. This is a gate,
//! not an RFC 5322 parser.

use std::sync::LazyLock;

use regex::Regex;

static SYNTAX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("syntax pattern"));

/// A parsed address. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub local: String,
    /// Lowercased domain as typed (possibly non-ASCII).
    pub domain: String,
}

impl Address {
    /// Parses `email` against the fixed syntax pattern. Returns `None` when
    /// the pattern does not match.
    pub fn parse(email: &str) -> Option<Self> {
        let input = email.trim();
        if !SYNTAX_PATTERN.is_match(input) {
            return None;
        }
        let (local, domain) = input.rsplit_once('@')?;
        Some(Self {
            local: local.to_string(),
            domain: domain.to_ascii_lowercase(),
        })
    }

    /// IDNA form of the domain, used for DNS lookups and SMTP commands.
    pub fn ascii_domain(&self) -> Result<String, idna::Errors> {
        idna::domain_to_ascii(&self.domain)
    }
}

/// Best-effort domain extraction for inputs that failed the syntax gate,
/// so error results still carry whatever domain was typed.
pub(crate) fn domain_hint(email: &str) -> String {
    email
        .trim()
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
        .unwrap_or_default()
}
