// (c) 2025 Ross Younger

//! Upload command: client sender and server handler
//!
//! Upload is two-phase: the client declares length and destination, the
//! server vets the offer before any bulk data moves, and only a
//! continuation status opens the streaming phase. A refused upload costs
//! two small frames, not a wasted transfer.

use anyhow::Result;
use indicatif::ProgressBar;
use tracing::{debug, trace};

use crate::protocol::common::{ReceivingStream, SendReceivePair, SendingStream};
use crate::protocol::session::{RequestCode, ResponseCode, Status, UploadArgs};
use crate::session::common::{check_ok, recv_expected_response, send_status};
use crate::storage::UserRoot;
use crate::transport;

/// The server's verdict on an upload offer. Continuation is its own
/// category, neither success nor failure: it means "start streaming now".
enum Gate {
    Proceed,
    Terminal(Status),
}

impl From<Status> for Gate {
    fn from(status: Status) -> Self {
        match status {
            Status::StartUpload => Gate::Proceed,
            other => Gate::Terminal(other),
        }
    }
}

/// Client side: offers the file, and streams it if the server agrees.
#[allow(clippy::cast_possible_truncation)]
pub(crate) async fn send<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    file_name: &str,
    dir_name: &str,
    content: &[u8],
    progress: &ProgressBar,
) -> Result<()> {
    let args = UploadArgs {
        file_len: content.len() as u64,
        file_name: file_name.to_string(),
        dir_name: dir_name.to_string(),
    };
    trace!("sending command");
    transport::send_request(&mut stream.send, RequestCode::UploadFile, &args.encode()).await?;

    trace!("await response");
    let (status, _) = recv_expected_response(&mut stream.recv, ResponseCode::UploadFile).await?;
    match Gate::from(status) {
        Gate::Proceed => (),
        Gate::Terminal(other) => return Err(other.into()),
    }

    trace!("streaming {} bytes", args.file_len);
    let mut outbound = progress.wrap_async_write(&mut stream.send);
    transport::send_file_content(&mut outbound, content).await?;

    trace!("await transfer status");
    let (status, _) = recv_expected_response(&mut stream.recv, ResponseCode::UploadFile).await?;
    check_ok(status)
}

/// Server side: vets the destination, then receives and writes the file.
#[allow(clippy::cast_possible_truncation)]
pub(crate) async fn handle<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    root: &UserRoot,
    args: &UploadArgs,
) -> Result<()> {
    trace!("begin");
    let dir_path = root.resolve(&args.dir_name);
    let file_path = dir_path.join(&args.file_name);

    if !dir_path.is_dir() {
        return send_status(
            &mut stream.send,
            ResponseCode::UploadFile,
            Status::DirectoryNotFound,
        )
        .await;
    }
    if file_path.exists() {
        return send_status(
            &mut stream.send,
            ResponseCode::UploadFile,
            Status::FileAlreadyExists,
        )
        .await;
    }

    trace!("responding continuation");
    send_status(&mut stream.send, ResponseCode::UploadFile, Status::StartUpload).await?;

    let content = transport::recv_exact(&mut stream.recv, args.file_len as usize).await?;
    tokio::fs::write(&file_path, &content).await?;
    debug!("stored {:?} ({} bytes)", file_path, args.file_len);

    send_status(&mut stream.send, ResponseCode::UploadFile, Status::Ok).await
}
