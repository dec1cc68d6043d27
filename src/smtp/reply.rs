/// The three-digit code taken from the first line of a server reply.
///
/// Continuation lines of multi-line replies are not parsed; only the leading
/// code of the first line matters to the probe. Servers whose greeting spans
/// multiple lines therefore read as a rejection one step later, a documented
/// trade-off of this design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyCode(pub u16);

impl ReplyCode {
    /// Parses the leading three digits of a reply line.
    pub fn parse(line: &str) -> Option<Self> {
        let code = line.get(..3)?.parse::<u16>().ok()?;
        (100..600).contains(&code).then_some(Self(code))
    }
}
