// (c) 2025 Ross Younger

//! Register and Login command senders
//!
//! The server-side halves of these commands live with the session state
//! machine ([`crate::server`]), since they are what drives its transitions.

use anyhow::Result;
use tracing::trace;

use crate::protocol::common::{ReceivingStream, SendReceivePair, SendingStream};
use crate::protocol::session::{Credentials, RequestCode};
use crate::session::common::{check_ok, recv_expected_response};
use crate::transport;

/// Requests creation of a new account. Whatever the outcome, the server
/// ends the session after answering; log in on a fresh connection.
pub(crate) async fn register<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    username: &str,
    password: &str,
) -> Result<()> {
    send_credentials(stream, RequestCode::Register, username, password).await
}

/// Authenticates this session. On success the connection stays open for
/// file commands.
pub(crate) async fn login<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    username: &str,
    password: &str,
) -> Result<()> {
    send_credentials(stream, RequestCode::Login, username, password).await
}

async fn send_credentials<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    code: RequestCode,
    username: &str,
    password: &str,
) -> Result<()> {
    let creds = Credentials {
        username: username.to_string(),
        password: password.to_string(),
    };
    trace!("sending command");
    transport::send_request(&mut stream.send, code, &creds.encode()).await?;

    trace!("await response");
    let (status, _) = recv_expected_response(&mut stream.recv, code.response()).await?;
    check_ok(status)
}
