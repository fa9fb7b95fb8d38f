// (c) 2025 Ross Younger

//! Common functions within the session protocol

use anyhow::Result;
use thiserror::Error;

use crate::protocol::common::{ReceivingStream, SendingStream};
use crate::protocol::session::{ResponseCode, Status};
use crate::transport;

/// A response arrived bearing the wrong response code for the request just
/// sent. The request flow it belongs to is abandoned; the session itself
/// survives.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("expected response code {expected}, got {got}")]
pub(crate) struct ResponseMismatch {
    pub(crate) expected: u32,
    pub(crate) got: u32,
}

/// A response carried a status value outside the registry.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("unknown status value {0}")]
pub(crate) struct UnknownStatus(pub(crate) u32);

/// Reads a response header and vets it: the code must answer `expected`
/// and the status must be in the registry. Returns the status and the
/// declared payload length.
pub(crate) async fn recv_expected_response<R: ReceivingStream>(
    recv: &mut R,
    expected: ResponseCode,
) -> Result<(Status, usize)> {
    let header = transport::recv_response(recv).await?;
    if header.code != expected as u32 {
        return Err(ResponseMismatch {
            expected: expected as u32,
            got: header.code,
        }
        .into());
    }
    let status = Status::from_repr(header.status).ok_or(UnknownStatus(header.status))?;
    Ok((status, header.length as usize))
}

/// Maps a terminal non-Ok status to an error so command senders can `?` it.
pub(crate) fn check_ok(status: Status) -> Result<()> {
    match status {
        Status::Ok => Ok(()),
        other => Err(other.into()),
    }
}

/// Sends a payload-less response.
pub(crate) async fn send_status<W: SendingStream>(
    send: &mut W,
    code: ResponseCode,
    status: Status,
) -> Result<()> {
    Ok(transport::send_response(send, code, status, &[]).await?)
}
