// (c) 2025 Ross Younger

//! Create Directory command: client sender and server handler
//!
//! The client pre-validates the name (relative, alphanumeric segments; see
//! [`crate::client`]); the server still independently checks for an
//! existing entry before creating.

use anyhow::Result;
use tracing::{debug, trace};

use crate::protocol::common::{ReceivingStream, SendReceivePair, SendingStream};
use crate::protocol::session::{encode_name, RequestCode, ResponseCode, Status};
use crate::session::common::{check_ok, recv_expected_response, send_status};
use crate::storage::UserRoot;
use crate::transport;

/// Client side.
pub(crate) async fn send<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    dir_name: &str,
) -> Result<()> {
    trace!("sending command");
    transport::send_request(
        &mut stream.send,
        RequestCode::CreateDirectory,
        &encode_name(dir_name),
    )
    .await?;
    let (status, _) =
        recv_expected_response(&mut stream.recv, ResponseCode::CreateDirectory).await?;
    check_ok(status)
}

/// Server side. Creates intermediate segments as needed.
pub(crate) async fn handle<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    root: &UserRoot,
    dir_name: &str,
) -> Result<()> {
    trace!("begin");
    let path = root.resolve(dir_name);
    if path.exists() {
        return send_status(
            &mut stream.send,
            ResponseCode::CreateDirectory,
            Status::DirectoryAlreadyExists,
        )
        .await;
    }
    tokio::fs::create_dir_all(&path).await?;
    debug!("created {path:?}");
    send_status(&mut stream.send, ResponseCode::CreateDirectory, Status::Ok).await
}
