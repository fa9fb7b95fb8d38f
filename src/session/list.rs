// (c) 2025 Ross Younger

//! List command: client sender and server handler

use anyhow::Result;
use tracing::trace;

use crate::protocol::common::{ReceivingStream, SendReceivePair, SendingStream};
use crate::protocol::session::{decode_listing, encode_listing, RequestCode, ResponseCode, Status};
use crate::session::common::{check_ok, recv_expected_response};
use crate::storage::UserRoot;
use crate::transport;

/// Client side: returns the delimiter-joined listing of everything stored.
pub(crate) async fn send<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
) -> Result<String> {
    trace!("sending command");
    transport::send_request(&mut stream.send, RequestCode::ListFiles, &[]).await?;
    let (status, len) = recv_expected_response(&mut stream.recv, ResponseCode::ListFiles).await?;
    check_ok(status)?;
    let payload = transport::recv_exact(&mut stream.recv, len).await?;
    Ok(decode_listing(&payload)?)
}

/// Server side.
pub(crate) async fn handle<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    root: &UserRoot,
) -> Result<()> {
    trace!("begin");
    let listing = root.listing()?;
    Ok(transport::send_response(
        &mut stream.send,
        ResponseCode::ListFiles,
        Status::Ok,
        &encode_listing(&listing),
    )
    .await?)
}

#[cfg(test)]
mod tests {
    use super::{handle, send};
    use crate::protocol::session::{Request, LISTING_SEPARATOR};
    use crate::storage::UserRoot;
    use crate::transport;
    use crate::util::test_protocol::{test_plumbing, TestPair};
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    async fn list_main(root: &UserRoot) -> (Result<String>, Result<()>) {
        let (mut near, far) = test_plumbing();
        let sender = send(&mut near);
        let handler = serve_one(far, root);
        tokio::join!(sender, handler)
    }

    async fn serve_one(mut stream: TestPair, root: &UserRoot) -> Result<()> {
        let (header, payload) = transport::recv_request(&mut stream.recv).await?;
        let request = Request::decode(header.code, &payload)?;
        anyhow::ensure!(request == Request::ListFiles, "expected a list request");
        handle(&mut stream, root).await
    }

    #[tokio::test]
    async fn empty_then_populated() {
        let dir = tempfile::tempdir().unwrap();
        let root = UserRoot::ensure(dir.path(), "somebody").await.unwrap();

        let (listing, r2) = list_main(&root).await;
        r2.unwrap();
        assert_eq!(listing.unwrap(), "");

        tokio::fs::create_dir(root.resolve("d")).await.unwrap();
        tokio::fs::write(root.resolve("f"), b"x").await.unwrap();
        let (listing, r2) = list_main(&root).await;
        r2.unwrap();
        let mut entries: Vec<String> = listing
            .unwrap()
            .split(LISTING_SEPARATOR)
            .map(String::from)
            .collect();
        entries.sort();
        assert_eq!(entries, ["d", "f"]);
    }
}
