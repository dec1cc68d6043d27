//! Socket driver for one probe transaction.
//!
//! One wall-clock deadline covers the whole exchange; every connect, read
//! and write borrows from the remaining budget. Expiry anywhere maps to
//! [`SessionError::TimedOut`], every other failure to
//! [`SessionError::Failed`], which the probe reports as a rejection.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::trace;

use super::reply::ReplyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionError {
    TimedOut,
    Failed,
}

pub(crate) struct SmtpSession {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    deadline: Instant,
}

impl SmtpSession {
    pub(crate) fn connect(host: &str, port: u16, deadline: Instant) -> Result<Self, SessionError> {
        let addrs = resolve_addrs(host, port)?;
        let mut last = SessionError::Failed;
        for addr in addrs {
            let budget = remaining(deadline)?;
            match TcpStream::connect_timeout(&addr, budget) {
                Ok(stream) => {
                    let reader = stream
                        .try_clone()
                        .map(BufReader::new)
                        .map_err(|_| SessionError::Failed)?;
                    trace!(%addr, "connected");
                    return Ok(Self {
                        stream,
                        reader,
                        deadline,
                    });
                }
                Err(err) => last = classify(&err),
            }
        }
        Err(last)
    }

    /// Reads one reply line and parses its leading code. Continuation lines
    /// of multi-line replies are left in the buffer on purpose.
    pub(crate) fn read_code(&mut self) -> Result<ReplyCode, SessionError> {
        let budget = remaining(self.deadline)?;
        self.stream
            .set_read_timeout(Some(budget))
            .map_err(|_| SessionError::Failed)?;

        let mut line = String::new();
        let bytes = self
            .reader
            .read_line(&mut line)
            .map_err(|err| classify(&err))?;
        if bytes == 0 {
            // server hung up
            return Err(SessionError::Failed);
        }
        trace!(line = line.trim_end(), "smtp reply");
        ReplyCode::parse(&line).ok_or(SessionError::Failed)
    }

    pub(crate) fn send_line(&mut self, command: &str) -> Result<(), SessionError> {
        let budget = remaining(self.deadline)?;
        self.stream
            .set_write_timeout(Some(budget))
            .map_err(|_| SessionError::Failed)?;

        trace!(command, "smtp send");
        self.stream
            .write_all(command.as_bytes())
            .and_then(|()| self.stream.write_all(b"\r\n"))
            .and_then(|()| self.stream.flush())
            .map_err(|err| classify(&err))
    }
}

fn resolve_addrs(host: &str, port: u16) -> Result<Vec<SocketAddr>, SessionError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|_| SessionError::Failed)?
        .collect();
    if addrs.is_empty() {
        return Err(SessionError::Failed);
    }
    Ok(addrs)
}

fn remaining(deadline: Instant) -> Result<Duration, SessionError> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|budget| !budget.is_zero())
        .ok_or(SessionError::TimedOut)
}

fn classify(err: &io::Error) -> SessionError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SessionError::TimedOut,
        _ => SessionError::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn remaining_expires_at_the_deadline() {
        let past = Instant::now() - Duration::from_millis(1);
        assert_eq!(remaining(past), Err(SessionError::TimedOut));
        let future = Instant::now() + Duration::from_secs(1);
        assert!(remaining(future).is_ok());
    }

    #[test]
    fn classify_maps_timeouts_apart_from_failures() {
        let timeout = io::Error::new(io::ErrorKind::TimedOut, "t");
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "r");
        assert_eq!(classify(&timeout), SessionError::TimedOut);
        assert_eq!(classify(&refused), SessionError::Failed);
    }

    #[test]
    #[ignore = "requires loopback TCP binding"]
    fn reads_first_line_code_and_sends_crlf_commands() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            stream
                .write_all(b"220 mock.example ESMTP\r\n")
                .expect("greeting");
            let mut buf = [0u8; 64];
            let n = stream.read(&mut buf).expect("read command");
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut session = SmtpSession::connect("127.0.0.1", port, deadline).expect("connect");
        assert_eq!(session.read_code(), Ok(ReplyCode(220)));
        session.send_line("HELO example.com").expect("send");
        assert_eq!(server.join().expect("server"), "HELO example.com\r\n");
    }

    #[test]
    #[ignore = "requires loopback TCP binding"]
    fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let server = thread::spawn(move || {
            // accept but never greet; hold the socket past the deadline
            let (stream, _) = listener.accept().expect("accept");
            thread::sleep(Duration::from_millis(500));
            drop(stream);
        });

        let deadline = Instant::now() + Duration::from_millis(200);
        let mut session = SmtpSession::connect("127.0.0.1", port, deadline).expect("connect");
        assert_eq!(session.read_code(), Err(SessionError::TimedOut));
        server.join().expect("server");
    }
}
