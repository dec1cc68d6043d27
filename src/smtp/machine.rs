use super::reply::ReplyCode;
use super::ProbeOutcome;

/// Protocol position of a probe. States advance strictly in order; any
/// unexpected reply transitions straight to [`ProbeState::Done`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    AwaitGreeting,
    AwaitHeloAck,
    AwaitMailAck,
    AwaitRcptAck,
    Done,
}

/// What the driver should do after feeding one reply to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Write this command (CRLF appended by the session) and await a reply.
    Send(String),
    /// The transaction is over; close the connection without QUIT.
    Finish(ProbeOutcome),
}

/// Pure SMTP probe state machine. Consumes the leading reply code of each
/// server response and yields the next command or the terminal outcome;
/// it never touches a socket, so transitions are testable with synthetic
/// codes.
#[derive(Debug)]
pub struct ProbeMachine {
    state: ProbeState,
    helo_domain: String,
    sender: String,
    recipient: String,
}

impl ProbeMachine {
    pub fn new(helo_domain: &str, sender: &str, recipient: &str) -> Self {
        Self {
            state: ProbeState::AwaitGreeting,
            helo_domain: helo_domain.to_string(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn on_reply(&mut self, code: ReplyCode) -> Step {
        let (next, step) = match (self.state, code.0) {
            (ProbeState::AwaitGreeting, 220) => (
                ProbeState::AwaitHeloAck,
                Step::Send(format!("HELO {}", self.helo_domain)),
            ),
            (ProbeState::AwaitHeloAck, 250) => (
                ProbeState::AwaitMailAck,
                Step::Send(format!("MAIL FROM:<{}>", self.sender)),
            ),
            (ProbeState::AwaitMailAck, 250) => (
                ProbeState::AwaitRcptAck,
                Step::Send(format!("RCPT TO:<{}>", self.recipient)),
            ),
            (ProbeState::AwaitRcptAck, 250 | 251) => {
                (ProbeState::Done, Step::Finish(ProbeOutcome::Accepted))
            }
            _ => (ProbeState::Done, Step::Finish(ProbeOutcome::Rejected)),
        };
        self.state = next;
        step
    }
}
