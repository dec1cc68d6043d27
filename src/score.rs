//! Scoring engine.
//!
//! Folds every signal into an additive 0–100 score with a fixed weight
//! schedule and one reason string per scoring decision, in evaluation
//! order. Invalid syntax and a blocklisted domain are hard gates: they
//! return immediately with a single reason and no other signal evaluated.

/// SMTP evidence folded into the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpAssessment {
    /// RCPT TO for the real recipient got a positive reply.
    Accepted { catch_all: bool },
    /// A probe ran but the mailbox could not be confirmed (rejection or
    /// timeout — scored identically).
    Unverified,
    /// No probe was attempted (no MX records, or probing disabled). Makes
    /// no scoring decision, so contributes no reason entry.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSignals {
    pub valid_syntax: bool,
    pub disposable: bool,
    pub has_mx: bool,
    pub role_based: bool,
    pub gibberish: bool,
    pub smtp: SmtpAssessment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorecard {
    /// Always within 0..=100; the schedule sums to exactly 100 in the best
    /// case and negative totals clamp to 0.
    pub score: u8,
    pub reasons: Vec<String>,
}

/// Fixed weight schedule: +10 syntax, +30 not disposable, +20 MX, +5 not
/// role-based, +5 not gibberish, +30 mailbox accepted, −40 catch-all.
pub fn score(signals: &ScoreSignals) -> Scorecard {
    if !signals.valid_syntax {
        return Scorecard {
            score: 0,
            reasons: vec!["Invalid email syntax".to_string()],
        };
    }
    if signals.disposable {
        return Scorecard {
            score: 0,
            reasons: vec!["Domain is in disposable email blocklist".to_string()],
        };
    }

    let mut total: i32 = 0;
    let mut reasons = Vec::new();

    total += 10;
    reasons.push("Valid email syntax".to_string());

    // only reachable because disposable short-circuits above
    total += 30;
    reasons.push("Domain is not in disposable email blocklist".to_string());

    if signals.has_mx {
        total += 20;
        reasons.push("Domain has valid MX records".to_string());
    } else {
        reasons.push("Domain has no valid MX records".to_string());
    }

    if signals.role_based {
        reasons.push("Local part is a role-based alias".to_string());
    } else {
        total += 5;
        reasons.push("Local part is not a role-based alias".to_string());
    }

    if signals.gibberish {
        reasons.push("Local part looks machine-generated".to_string());
    } else {
        total += 5;
        reasons.push("Local part does not look machine-generated".to_string());
    }

    match signals.smtp {
        SmtpAssessment::Accepted { catch_all: false } => {
            total += 30;
            reasons.push("Mailbox accepted by SMTP server".to_string());
        }
        SmtpAssessment::Accepted { catch_all: true } => {
            total -= 40;
            reasons.push("Domain accepts any recipient (catch-all)".to_string());
        }
        SmtpAssessment::Unverified => {
            reasons.push("Mailbox could not be verified over SMTP".to_string());
        }
        SmtpAssessment::Skipped => {}
    }

    Scorecard {
        score: total.max(0) as u8,
        reasons,
    }
}
