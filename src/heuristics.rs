//! Lexical heuristics on the local part.

use phf::phf_set;

/// Administrative aliases that are rarely personal mailboxes.
static ROLE_ALIASES: phf::Set<&'static str> = phf_set! {
    "admin",
    "support",
    "info",
    "contact",
    "sales",
    "marketing",
    "help",
    "webmaster",
    "postmaster",
    "hostmaster",
    "abuse",
    "noreply",
    "no-reply",
};

/// True when the local part (case-insensitive) is a known role alias.
pub fn is_role_based(local: &str) -> bool {
    ROLE_ALIASES.contains(local.to_ascii_lowercase().as_str())
}

/// True when the local part looks machine-generated: longer than 6 chars
/// with digits making up more than 40% of it. Conservative on purpose,
/// biased toward few false positives over recall.
pub fn is_gibberish(local: &str) -> bool {
    let length = local.chars().count();
    if length <= 6 {
        return false;
    }
    let digits = local.chars().filter(char::is_ascii_digit).count();
    digits as f64 / length as f64 > 0.4
}
