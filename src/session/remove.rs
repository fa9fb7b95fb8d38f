// (c) 2025 Ross Younger

//! Remove command: client sender and server handler
//!
//! Removes a file, or a directory with everything in it.

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
    name: &str,
) -> Result<()> {
    trace!("sending command");
    transport::send_request(&mut stream.send, RequestCode::RemoveFile, &encode_name(name))
        .await?;
    let (status, _) = recv_expected_response(&mut stream.recv, ResponseCode::RemoveFile).await?;
    check_ok(status)
}

/// Server side.
pub(crate) async fn handle<S: SendingStream, R: ReceivingStream>(
    stream: &mut SendReceivePair<S, R>,
    root: &UserRoot,
    name: &str,
) -> Result<()> {
    trace!("begin");
    let path = root.resolve(name);
    if !path.exists() {
        return send_status(
            &mut stream.send,
            ResponseCode::RemoveFile,
            Status::FileNotFound,
        )
        .await;
    }
    if path.is_dir() {
        tokio::fs::remove_dir_all(&path).await?;
    } else {
        tokio::fs::remove_file(&path).await?;
    }
    debug!("removed {path:?}");
    send_status(&mut stream.send, ResponseCode::RemoveFile, Status::Ok).await
}

#[cfg(test)]
mod tests {
    use super::{handle, send};
    use crate::protocol::session::{Request, Status};
    use crate::storage::UserRoot;
    use crate::transport;
    use crate::util::test_protocol::{test_plumbing, TestPair};
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    async fn remove_main(root: &UserRoot, name: &str) -> (Result<()>, Result<()>) {
        let (mut near, far) = test_plumbing();
        let sender = send(&mut near, name);
        let handler = serve_one(far, root);
        tokio::join!(sender, handler)
    }

    async fn serve_one(mut stream: TestPair, root: &UserRoot) -> Result<()> {
        let (header, payload) = transport::recv_request(&mut stream.recv).await?;
        let Request::RemoveFile(name) = Request::decode(header.code, &payload)? else {
            anyhow::bail!("expected a remove request");
        };
        handle(&mut stream, root, &name).await
    }

    async fn scratch_root() -> (tempfile::TempDir, UserRoot) {
        let dir = tempfile::tempdir().unwrap();
        let root = UserRoot::ensure(dir.path(), "somebody").await.unwrap();
        (dir, root)
    }

    #[tokio::test]
    async fn removes_a_file() {
        let (_dir, root) = scratch_root().await;
        tokio::fs::write(root.resolve("f"), b"x").await.unwrap();
        let (r1, r2) = remove_main(&root, "f").await;
        r1.unwrap();
        r2.unwrap();
        assert!(!root.resolve("f").exists());
    }

    #[tokio::test]
    async fn removes_a_directory_recursively() {
        let (_dir, root) = scratch_root().await;
        tokio::fs::create_dir_all(root.resolve("d/e")).await.unwrap();
        tokio::fs::write(root.resolve("d/e/f"), b"x").await.unwrap();
        let (r1, r2) = remove_main(&root, "d").await;
        r1.unwrap();
        r2.unwrap();
        assert!(!root.resolve("d").exists());
    }

    #[tokio::test]
    async fn absent_target_refused() {
        let (_dir, root) = scratch_root().await;
        let (r1, r2) = remove_main(&root, "ghost").await;
        r2.unwrap();
        let err = r1.unwrap_err();
        assert_eq!(err.downcast_ref::<Status>(), Some(&Status::FileNotFound));
    }
}
