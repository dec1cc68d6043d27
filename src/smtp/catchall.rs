//! Synthetic recipients for catch-all detection.
//!
//! A domain that accepts a recipient nobody could have registered is
//! treated as catch-all, which voids the evidence of the primary probe.
//! The generator is an injectable capability so tests can pin the local
//! part and assert the exact probe payload.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Prefix applied to every synthetic local part so a generated recipient
/// cannot collide with a real mailbox under test.
const SYNTHETIC_PREFIX: &str = "verify-zz";

/// Generator capability for synthetic local parts.
pub type LocalPartGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// The default generator: [`random_local_part`] behind a box.
pub fn default_generator() -> LocalPartGenerator {
    Box::new(random_local_part)
}

/// A prefixed, unpredictable local part, e.g. `verify-zz-x81k2mwq04pd`.
pub fn random_local_part() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("{SYNTHETIC_PREFIX}-{}", suffix.to_ascii_lowercase())
}

/// Builds the full synthetic recipient probed at `domain`.
pub fn synthetic_recipient<G>(generate: &G, domain: &str) -> String
where
    G: Fn() -> String + ?Sized,
{
    format!("{}@{domain}", generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_parts_are_prefixed_and_vary() {
        let a = random_local_part();
        let b = random_local_part();
        assert!(a.starts_with("verify-zz-"));
        assert_eq!(a.len(), "verify-zz-".len() + 12);
        assert_ne!(a, b);
    }

    #[test]
    fn recipient_uses_injected_generator() {
        let fixed = || "verify-zz-fixed".to_string();
        assert_eq!(
            synthetic_recipient(&fixed, "example.com"),
            "verify-zz-fixed@example.com"
        );
    }
}
