//! Verification pipeline.
//!
//! One [`Verifier`] serves many independent requests: each call to
//! [`Verifier::verify`] runs syntax → blocklist → MX → heuristics → SMTP
//! as a sequential pipeline and always produces a complete
//! [`VerificationResult`] — network failures become scoring signals, never
//! errors surfaced to the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trust_dns_resolver::Resolver;

use crate::blocklist::BlocklistStore;
use crate::heuristics::{is_gibberish, is_role_based};
use crate::mx::{resolve_with, LookupMx, MxError, MxStatus};
use crate::score::{score, ScoreSignals, SmtpAssessment};
use crate::smtp::catchall::{self, LocalPartGenerator};
use crate::smtp::{self, ProbeOutcome, SmtpProbeOptions};
use crate::syntax::{domain_hint, Address};

/// Probe seam: the verifier drives SMTP through this trait so tests can
/// script outcomes and record payloads without a socket.
pub trait ProbeRunner: Send + Sync {
    fn probe(
        &self,
        host: &str,
        domain: &str,
        recipient: &str,
        options: &SmtpProbeOptions,
    ) -> ProbeOutcome;
}

/// Default runner backed by a real TCP connection.
pub struct TcpProbe;

impl ProbeRunner for TcpProbe {
    fn probe(
        &self,
        host: &str,
        domain: &str,
        recipient: &str,
        options: &SmtpProbeOptions,
    ) -> ProbeOutcome {
        smtp::probe(host, domain, recipient, options)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOptions {
    pub smtp: SmtpProbeOptions,
    /// When false the SMTP probe is skipped entirely and only the passive
    /// signals are scored.
    pub probe_smtp: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            smtp: SmtpProbeOptions::default(),
            probe_smtp: true,
        }
    }
}

/// Per-request verdict. Field names are a wire contract; serialization must
/// keep them stable for existing consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub email: String,
    pub domain: String,
    pub is_valid_syntax: bool,
    pub is_disposable: bool,
    pub has_mx: bool,
    pub is_role: bool,
    pub is_gibberish: bool,
    pub smtp_valid: bool,
    pub is_catch_all: bool,
    pub score: u8,
    pub reasons: Vec<String>,
}

pub struct Verifier {
    resolver: Box<dyn LookupMx + Send + Sync>,
    blocklist: BlocklistStore,
    runner: Box<dyn ProbeRunner>,
    random_local: LocalPartGenerator,
    options: VerifyOptions,
}

impl Verifier {
    /// A verifier backed by the system resolver and real TCP probes.
    pub fn new(blocklist: BlocklistStore, options: VerifyOptions) -> Result<Self, MxError> {
        let resolver = Resolver::from_system_conf()
            .map_err(|source| MxError::ResolverInit { source })?;
        Ok(Self::with_parts(
            Box::new(resolver),
            blocklist,
            Box::new(TcpProbe),
            catchall::default_generator(),
            options,
        ))
    }

    /// Assembles a verifier from explicit collaborators. This is the seam
    /// used to substitute stub resolvers, scripted probes, or a
    /// deterministic synthetic-recipient generator.
    pub fn with_parts(
        resolver: Box<dyn LookupMx + Send + Sync>,
        blocklist: BlocklistStore,
        runner: Box<dyn ProbeRunner>,
        random_local: LocalPartGenerator,
        options: VerifyOptions,
    ) -> Self {
        Self {
            resolver,
            blocklist,
            runner,
            random_local,
            options,
        }
    }

    /// Scores one address. Infallible by design: every failure along the
    /// pipeline degrades the score instead of aborting the request.
    pub fn verify(&self, email: &str) -> VerificationResult {
        let email = email.trim();

        let Some(address) = Address::parse(email) else {
            let card = score(&ScoreSignals {
                valid_syntax: false,
                disposable: false,
                has_mx: false,
                role_based: false,
                gibberish: false,
                smtp: SmtpAssessment::Skipped,
            });
            return VerificationResult {
                email: email.to_string(),
                domain: domain_hint(email),
                is_valid_syntax: false,
                is_disposable: false,
                has_mx: false,
                is_role: false,
                is_gibberish: false,
                smtp_valid: false,
                is_catch_all: false,
                score: card.score,
                reasons: card.reasons,
            };
        };

        // hard gate: a blocklisted domain skips every other signal
        if self.blocklist.contains(&address.domain) {
            let card = score(&ScoreSignals {
                valid_syntax: true,
                disposable: true,
                has_mx: false,
                role_based: false,
                gibberish: false,
                smtp: SmtpAssessment::Skipped,
            });
            return VerificationResult {
                email: email.to_string(),
                domain: address.domain,
                is_valid_syntax: true,
                is_disposable: true,
                has_mx: false,
                is_role: false,
                is_gibberish: false,
                smtp_valid: false,
                is_catch_all: false,
                score: card.score,
                reasons: card.reasons,
            };
        }

        let ascii_domain = match address.ascii_domain() {
            Ok(ascii) => Some(ascii),
            Err(_) => {
                warn!(domain = %address.domain, "IDNA conversion failed");
                None
            }
        };

        let records = match &ascii_domain {
            Some(ascii) => match resolve_with(self.resolver.as_ref(), ascii) {
                Ok(status) => match status {
                    MxStatus::Records(records) => records,
                    MxStatus::NoRecords => Vec::new(),
                },
                Err(err) => {
                    warn!(domain = %address.domain, error = %err, "MX resolution failed");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        let has_mx = !records.is_empty();

        let is_role = is_role_based(&address.local);
        let gibberish = is_gibberish(&address.local);

        let mut smtp_valid = false;
        let mut is_catch_all = false;
        let smtp = match (self.options.probe_smtp, records.first(), &ascii_domain) {
            (true, Some(best), Some(ascii)) => {
                // only the most-preferred exchange is probed; secondary MX
                // hosts are deliberately not tried
                let recipient = format!("{}@{ascii}", address.local);
                match self.runner.probe(&best.exchange, ascii, &recipient, &self.options.smtp) {
                    ProbeOutcome::Accepted => {
                        smtp_valid = true;
                        let synthetic =
                            catchall::synthetic_recipient(&self.random_local, ascii);
                        is_catch_all = self
                            .runner
                            .probe(&best.exchange, ascii, &synthetic, &self.options.smtp)
                            .is_accepted();
                        SmtpAssessment::Accepted {
                            catch_all: is_catch_all,
                        }
                    }
                    outcome => {
                        debug!(host = %best.exchange, ?outcome, "mailbox not verified");
                        SmtpAssessment::Unverified
                    }
                }
            }
            _ => SmtpAssessment::Skipped,
        };

        let card = score(&ScoreSignals {
            valid_syntax: true,
            disposable: false,
            has_mx,
            role_based: is_role,
            gibberish,
            smtp,
        });

        VerificationResult {
            email: email.to_string(),
            domain: address.domain,
            is_valid_syntax: true,
            is_disposable: false,
            has_mx,
            is_role,
            is_gibberish: gibberish,
            smtp_valid,
            is_catch_all,
            score: card.score,
            reasons: card.reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mx::tests::StubResolver;
    use crate::mx::MxRecord;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use trust_dns_resolver::error::ResolveError;

    #[derive(Default)]
    struct ScriptedProbe {
        outcomes: Mutex<VecDeque<ProbeOutcome>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedProbe {
        fn new(outcomes: impl IntoIterator<Item = ProbeOutcome>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl ProbeRunner for Arc<ScriptedProbe> {
        fn probe(
            &self,
            host: &str,
            _domain: &str,
            recipient: &str,
            _options: &SmtpProbeOptions,
        ) -> ProbeOutcome {
            self.calls
                .lock()
                .expect("calls lock")
                .push((host.to_string(), recipient.to_string()));
            self.outcomes
                .lock()
                .expect("outcomes lock")
                .pop_front()
                .unwrap_or(ProbeOutcome::Rejected)
        }
    }

    fn fixed_generator() -> LocalPartGenerator {
        Box::new(|| "verify-zz-fixed".to_string())
    }

    fn example_records() -> Vec<MxRecord> {
        vec![
            MxRecord::new(20, "backup.example.com"),
            MxRecord::new(10, "primary.example.com"),
        ]
    }

    fn make_verifier(
        resolver: StubResolver,
        probe: Arc<ScriptedProbe>,
        blocked: &str,
    ) -> Verifier {
        Verifier::with_parts(
            Box::new(resolver),
            BlocklistStore::from_lines(blocked),
            Box::new(probe),
            fixed_generator(),
            VerifyOptions::default(),
        )
    }

    #[test]
    fn disposable_domain_scores_zero_with_one_reason() {
        let probe = ScriptedProbe::new([]);
        let verifier = make_verifier(
            StubResolver::with_records(example_records()),
            Arc::clone(&probe),
            "knowndisposable.test\n",
        );

        let result = verifier.verify("x@knowndisposable.test");
        assert!(result.is_disposable);
        assert!(result.is_valid_syntax);
        assert_eq!(result.score, 0);
        assert_eq!(result.reasons.len(), 1);
        // kill-switch: neither DNS nor SMTP was consulted
        assert!(!result.has_mx);
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn invalid_syntax_scores_zero() {
        let probe = ScriptedProbe::new([]);
        let verifier = make_verifier(
            StubResolver::with_records(example_records()),
            Arc::clone(&probe),
            "",
        );

        let result = verifier.verify("not-an-email");
        assert!(!result.is_valid_syntax);
        assert_eq!(result.score, 0);
        assert_eq!(result.reasons, vec!["Invalid email syntax"]);
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn role_address_with_accepted_mailbox_scores_95() {
        let probe = ScriptedProbe::new([ProbeOutcome::Accepted, ProbeOutcome::Rejected]);
        let verifier = make_verifier(
            StubResolver::with_records(example_records()),
            Arc::clone(&probe),
            "",
        );

        let result = verifier.verify("admin@example.com");
        assert!(result.is_role);
        assert!(result.smtp_valid);
        assert!(!result.is_catch_all);
        assert_eq!(result.score, 95);

        // both probes hit the most-preferred exchange; the second carries
        // the synthetic recipient from the injected generator
        assert_eq!(
            probe.calls(),
            vec![
                (
                    "primary.example.com".to_string(),
                    "admin@example.com".to_string()
                ),
                (
                    "primary.example.com".to_string(),
                    "verify-zz-fixed@example.com".to_string()
                ),
            ]
        );
    }

    #[test]
    fn gibberish_address_with_timeout_scores_65() {
        let probe = ScriptedProbe::new([ProbeOutcome::TimedOut]);
        let verifier = make_verifier(
            StubResolver::with_records(example_records()),
            Arc::clone(&probe),
            "",
        );

        let result = verifier.verify("a1b2c3d4e5@example.com");
        assert!(result.is_gibberish);
        assert!(!result.smtp_valid);
        assert!(!result.is_catch_all);
        assert_eq!(result.score, 65);
        // a timeout ends the request's probing; no catch-all attempt
        assert_eq!(probe.calls().len(), 1);
    }

    #[test]
    fn catch_all_domain_scores_30() {
        let probe = ScriptedProbe::new([ProbeOutcome::Accepted, ProbeOutcome::Accepted]);
        let resolver = StubResolver::with_records(vec![MxRecord::new(10, "mx.catchall.test")]);
        let verifier = make_verifier(resolver, Arc::clone(&probe), "");

        let result = verifier.verify("real@catchall.test");
        assert!(result.smtp_valid);
        assert!(result.is_catch_all);
        assert_eq!(result.score, 30);
    }

    #[test]
    fn no_mx_records_skips_probing_entirely() {
        let probe = ScriptedProbe::new([ProbeOutcome::Accepted]);
        let verifier = make_verifier(
            StubResolver::with_records(Vec::new()),
            Arc::clone(&probe),
            "",
        );

        let result = verifier.verify("alice@example.com");
        assert!(!result.has_mx);
        assert!(!result.smtp_valid);
        assert!(!result.is_catch_all);
        assert_eq!(result.score, 50);
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn dns_failure_degrades_to_missing_mx() {
        let probe = ScriptedProbe::new([]);
        let resolver = StubResolver::new(|_| Err(ResolveError::from("resolver unavailable")));
        let verifier = make_verifier(resolver, Arc::clone(&probe), "");

        let result = verifier.verify("alice@example.com");
        assert!(result.is_valid_syntax);
        assert!(!result.has_mx);
        assert_eq!(result.score, 50);
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn rejected_primary_probe_never_triggers_catch_all_probe() {
        let probe = ScriptedProbe::new([ProbeOutcome::Rejected, ProbeOutcome::Accepted]);
        let verifier = make_verifier(
            StubResolver::with_records(example_records()),
            Arc::clone(&probe),
            "",
        );

        let result = verifier.verify("ghost@example.com");
        assert!(!result.smtp_valid);
        assert!(!result.is_catch_all);
        assert_eq!(probe.calls().len(), 1);
    }

    #[test]
    fn probing_can_be_disabled() {
        let probe = ScriptedProbe::new([ProbeOutcome::Accepted]);
        let verifier = Verifier::with_parts(
            Box::new(StubResolver::with_records(example_records())),
            BlocklistStore::new(),
            Box::new(Arc::clone(&probe)),
            fixed_generator(),
            VerifyOptions {
                probe_smtp: false,
                ..VerifyOptions::default()
            },
        );

        let result = verifier.verify("alice@example.com");
        assert!(result.has_mx);
        assert!(!result.smtp_valid);
        assert_eq!(result.score, 70);
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn idn_domain_is_probed_in_ascii_form() {
        let probe = ScriptedProbe::new([ProbeOutcome::Accepted, ProbeOutcome::Rejected]);
        let resolver = StubResolver::new(|domain| {
            assert_eq!(domain, "xn--exmple-cua.com");
            Ok(vec![MxRecord::new(10, "mx.xn--exmple-cua.com")])
        });
        let verifier = make_verifier(resolver, Arc::clone(&probe), "");

        let result = verifier.verify("alice@exämple.com");
        assert!(result.smtp_valid);
        assert_eq!(result.domain, "exämple.com");
        assert_eq!(
            probe.calls()[0].1,
            "alice@xn--exmple-cua.com".to_string()
        );
    }

    #[test]
    fn json_field_names_are_stable() {
        let probe = ScriptedProbe::new([]);
        let verifier = make_verifier(
            StubResolver::with_records(Vec::new()),
            Arc::clone(&probe),
            "",
        );

        let value =
            serde_json::to_value(verifier.verify("alice@example.com")).expect("serialize");
        let object = value.as_object().expect("object");
        for key in [
            "email",
            "domain",
            "isValidSyntax",
            "isDisposable",
            "hasMx",
            "isRole",
            "isGibberish",
            "smtpValid",
            "isCatchAll",
            "score",
            "reasons",
        ] {
            assert!(object.contains_key(key), "missing field {key}");
        }
        assert_eq!(object.len(), 11);
    }
}
