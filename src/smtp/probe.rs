use std::time::Instant;

use tracing::debug;

use super::machine::{ProbeMachine, Step};
use super::options::SmtpProbeOptions;
use super::session::{SessionError, SmtpSession};
use super::ProbeOutcome;

/// Runs one bounded SMTP transaction against `host` and reports whether
/// `recipient` was accepted.
///
/// Opens exactly one outbound connection; the whole exchange shares a single
/// wall-clock deadline taken from `options`. Connection failures and
/// protocol deviations report as [`ProbeOutcome::Rejected`], deadline expiry
/// as [`ProbeOutcome::TimedOut`]. The connection is dropped without QUIT —
/// no message is ever sent.
pub fn probe(
    host: &str,
    domain: &str,
    recipient: &str,
    options: &SmtpProbeOptions,
) -> ProbeOutcome {
    let deadline = Instant::now() + options.timeout();
    let helo = options.helo_name(domain);
    let sender = options.envelope_sender(domain);
    let mut machine = ProbeMachine::new(helo.as_ref(), &sender, recipient);

    let mut session = match SmtpSession::connect(host, options.port, deadline) {
        Ok(session) => session,
        Err(err) => return finish(host, recipient, outcome_of(err)),
    };

    loop {
        let code = match session.read_code() {
            Ok(code) => code,
            Err(err) => return finish(host, recipient, outcome_of(err)),
        };
        match machine.on_reply(code) {
            Step::Send(command) => {
                if let Err(err) = session.send_line(&command) {
                    return finish(host, recipient, outcome_of(err));
                }
            }
            Step::Finish(outcome) => return finish(host, recipient, outcome),
        }
    }
}

fn outcome_of(err: SessionError) -> ProbeOutcome {
    match err {
        SessionError::TimedOut => ProbeOutcome::TimedOut,
        SessionError::Failed => ProbeOutcome::Rejected,
    }
}

fn finish(host: &str, recipient: &str, outcome: ProbeOutcome) -> ProbeOutcome {
    debug!(host, recipient, ?outcome, "probe finished");
    outcome
}
