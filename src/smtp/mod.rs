//! SMTP probing.
//!
//! A probe drives a partial transaction (HELO / MAIL FROM / RCPT TO) against
//! one mail exchange and observes the reply to RCPT TO; no message is ever
//! sent. The protocol logic lives in a pure state machine
//! ([`ProbeMachine`]), the socket and deadline handling in the session
//! driver, so the protocol can be tested without a connection.

pub mod catchall;
mod machine;
mod options;
mod probe;
mod reply;
mod session;

use serde::{Deserialize, Serialize};

pub use machine::{ProbeMachine, ProbeState, Step};
pub use options::SmtpProbeOptions;
pub use probe::probe;
pub use reply::ReplyCode;

/// Tri-state result of one SMTP probe. Exactly one probe runs per
/// (host, recipient) pair; there are no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    /// Final positive reply (250/251) to RCPT TO.
    Accepted,
    /// Negative or unexpected reply at any step, or any connection failure.
    Rejected,
    /// No terminal reply before the transaction deadline.
    TimedOut,
}

impl ProbeOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}
