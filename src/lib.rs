#![forbid(unsafe_code)]
//! mailscore — email deliverability scoring without sending mail.
//!
//! An address is judged by combining a disposable-domain blocklist, DNS MX
//! resolution, lexical heuristics on the local part, and a live SMTP probe
//! (with a second, synthetic-recipient probe to detect catch-all domains).
//! Every signal is folded into a 0–100 score with one reason string per
//! scoring decision.

pub mod blocklist;
pub mod heuristics;
pub mod mx;
pub mod score;
pub mod smtp;
pub mod syntax;
pub mod verifier;

pub use blocklist::BlocklistStore;
pub use mx::{check_mx, LookupMx, MxError, MxRecord, MxStatus};
pub use score::{score, Scorecard, ScoreSignals, SmtpAssessment};
pub use smtp::{probe, ProbeMachine, ProbeOutcome, ProbeState, SmtpProbeOptions, Step};
pub use syntax::Address;
pub use verifier::{ProbeRunner, TcpProbe, VerificationResult, Verifier, VerifyOptions};
