use std::borrow::Cow;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration knobs for one SMTP probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpProbeOptions {
    pub port: u16,
    /// Identity sent in HELO; defaults to the target domain.
    pub helo_domain: Option<String>,
    /// Local part of the placeholder MAIL FROM sender. The sender does not
    /// need to be deliverable since no message is ever sent.
    pub sender_local: String,
    /// Wall-clock budget for the whole transaction, connect included.
    pub timeout_ms: u64,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: None,
            sender_local: "probe".to_string(),
            timeout_ms: 4_000,
        }
    }
}

impl SmtpProbeOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    pub fn helo_name<'a>(&'a self, fallback: &'a str) -> Cow<'a, str> {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed(fallback))
    }

    /// The placeholder envelope sender, `<sender_local>@<domain>`.
    pub fn envelope_sender(&self, domain: &str) -> String {
        format!("{}@{domain}", self.sender_local)
    }
}
