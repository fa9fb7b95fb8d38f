// (c) 2025 Ross Younger

//! Reliable delivery primitives over a stream socket
//!
//! A stream socket has no message boundaries and no atomicity guarantee for
//! large writes. The receive side therefore accumulates reads until the
//! byte count the header promised has arrived, and bulk file content goes
//! out in bounded chunks rather than one arbitrarily large write.
//!
//! Headers are written as-is; everything else passes through the
//! [obfuscation layer](crate::protocol::mask) on its way to or from the
//! socket.

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tracing::trace;

use crate::protocol::common::{ReceivingStream, SendingStream};
use crate::protocol::frame::{FrameError, RequestHeader, ResponseHeader};
use crate::protocol::mask::{mask, mask_in_place};
use crate::protocol::session::{RequestCode, ResponseCode, Status};

/// Bytes handed to the socket per write while streaming file content
pub const TRANSFER_CHUNK: usize = 1000;

/// Transport-level failures. All are terminal for the affected connection;
/// nothing here is retried.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the connection mid-message
    #[error("connection broken: peer closed mid-message")]
    ConnectionBroken,
    /// A header failed to decode
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// The underlying socket reported an error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes a header, unobfuscated, in full.
pub async fn send_header<W: SendingStream>(
    send: &mut W,
    header: &[u8],
) -> Result<(), TransportError> {
    send.write_all(header).await?;
    Ok(())
}

/// Obfuscates a structured payload and writes it in full.
/// No length prefix is added; the header already declared the length.
pub async fn send_payload<W: SendingStream>(
    send: &mut W,
    payload: &[u8],
) -> Result<(), TransportError> {
    send.write_all(&mask(payload)).await?;
    Ok(())
}

/// Reads exactly `len` bytes, however the peer fragments them, then
/// de-obfuscates the result.
pub async fn recv_exact<R: ReceivingStream>(
    recv: &mut R,
    len: usize,
) -> Result<Vec<u8>, TransportError> {
    let mut buffer = BytesMut::zeroed(len);
    let mut filled = 0;
    while filled < len {
        let n = recv.read(&mut buffer[filled..]).await?;
        if n == 0 {
            return Err(TransportError::ConnectionBroken);
        }
        filled += n;
    }
    let mut out = buffer.to_vec();
    mask_in_place(&mut out);
    Ok(out)
}

/// Obfuscates `content` once up front, then writes it in
/// [`TRANSFER_CHUNK`]-byte slices until all of it has been sent.
pub async fn send_file_content<W: SendingStream>(
    send: &mut W,
    content: &[u8],
) -> Result<(), TransportError> {
    let masked = mask(content);
    let mut sent = 0;
    while sent < masked.len() {
        let end = usize::min(sent + TRANSFER_CHUNK, masked.len());
        let n = send.write(&masked[sent..end]).await?;
        if n == 0 {
            return Err(TransportError::ConnectionBroken);
        }
        sent += n;
    }
    Ok(())
}

/////////////////////////////////////////////////////////////////////////////////////////////
// FRAME-LEVEL COMPOSITES: one frame = header + payload

/// Sends a request frame.
#[allow(clippy::cast_possible_truncation)]
pub async fn send_request<W: SendingStream>(
    send: &mut W,
    code: RequestCode,
    payload: &[u8],
) -> Result<(), TransportError> {
    trace!("sending {code} request, {} payload bytes", payload.len());
    let header = RequestHeader {
        code: code as u32,
        length: payload.len() as u32,
    };
    send_header(send, &header.encode()).await?;
    send_payload(send, payload).await
}

/// Reads one request frame: the header, then exactly the payload it
/// declared.
pub async fn recv_request<R: ReceivingStream>(
    recv: &mut R,
) -> Result<(RequestHeader, Vec<u8>), TransportError> {
    let mut buf = [0u8; RequestHeader::SIZE];
    read_exact_raw(recv, &mut buf).await?;
    let header = RequestHeader::decode(&buf)?;
    let payload = recv_exact(recv, header.length as usize).await?;
    Ok((header, payload))
}

/// Sends a response frame.
#[allow(clippy::cast_possible_truncation)]
pub async fn send_response<W: SendingStream>(
    send: &mut W,
    code: ResponseCode,
    status: Status,
    payload: &[u8],
) -> Result<(), TransportError> {
    trace!("responding {status}");
    let header = ResponseHeader {
        code: code as u32,
        status: status as u32,
        length: payload.len() as u32,
    };
    send_header(send, &header.encode()).await?;
    send_payload(send, payload).await
}

/// Reads a response header. Any payload is left on the stream for the
/// caller to collect with [`recv_exact`] once it has vetted the header.
pub async fn recv_response<R: ReceivingStream>(
    recv: &mut R,
) -> Result<ResponseHeader, TransportError> {
    let mut buf = [0u8; ResponseHeader::SIZE];
    read_exact_raw(recv, &mut buf).await?;
    Ok(ResponseHeader::decode(&buf)?)
}

/// Header bytes travel in the clear; this is the no-deobfuscation read
/// loop.
async fn read_exact_raw<R: ReceivingStream>(
    recv: &mut R,
    buf: &mut [u8],
) -> Result<(), TransportError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = recv.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(TransportError::ConnectionBroken);
        }
        filled += n;
    }
    Ok(())
}
