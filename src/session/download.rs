// (c) 2025 Ross Younger

//! Download command: client sender and server handler
//!
//! On success the response payload carries only the content length; the
//! content itself follows out-of-band via the chunked transfer primitive.

use anyhow::Result;
use indicatif::ProgressBar;
use tracing::trace;

use crate::protocol::common::{ReceivingStream, SendReceivePair, SendingStream};
use crate::protocol::session::{
    decode_file_len, encode_file_len, encode_name, RequestCode, ResponseCode, Status,
};
use crate::session::common::{check_ok, recv_expected_response, send_status};
use crate::storage::UserRoot;
use crate::transport;

/// Client side: requests `file_name` and returns its content.
#[allow(clippy::cast_possible_truncation)]
pub(crate) async fn send<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    file_name: &str,
    progress: &ProgressBar,
) -> Result<Vec<u8>> {
    trace!("sending command");
    transport::send_request(
        &mut stream.send,
        RequestCode::DownloadFile,
        &encode_name(file_name),
    )
    .await?;

    trace!("await response");
    let (status, len) =
        recv_expected_response(&mut stream.recv, ResponseCode::DownloadFile).await?;
    check_ok(status)?;

    let payload = transport::recv_exact(&mut stream.recv, len).await?;
    let file_len = decode_file_len(&payload)?;
    progress.set_length(file_len);

    trace!("receiving {file_len} bytes");
    let mut inbound = progress.wrap_async_read(&mut stream.recv);
    let content = transport::recv_exact(&mut inbound, file_len as usize).await?;
    Ok(content)
}

/// Server side: vets the path, then responds with the length and streams
/// the content.
#[allow(clippy::cast_possible_truncation)]
pub(crate) async fn handle<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    root: &UserRoot,
    file_name: &str,
) -> Result<()> {
    trace!("begin");
    let path = root.resolve(file_name);
    if !path.exists() {
        return send_status(
            &mut stream.send,
            ResponseCode::DownloadFile,
            Status::FileNotFound,
        )
        .await;
    }
    if path.is_dir() {
        return send_status(
            &mut stream.send,
            ResponseCode::DownloadFile,
            Status::IsADirectory,
        )
        .await;
    }

    let content = tokio::fs::read(&path).await?;
    trace!("responding OK, {} bytes", content.len());
    transport::send_response(
        &mut stream.send,
        ResponseCode::DownloadFile,
        Status::Ok,
        &encode_file_len(content.len() as u64),
    )
    .await?;
    transport::send_file_content(&mut stream.send, &content).await?;
    Ok(())
}
