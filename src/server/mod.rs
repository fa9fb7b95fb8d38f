// (c) 2025 Ross Younger

//! server-side event loop

use std::path::PathBuf;

use anyhow::Context as _;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, trace};

use crate::config::Configuration;
use crate::protocol::common::SendReceivePair;
use crate::store::UserStore;
use crate::transport::TransportError;

mod session;
use session::Session;

/// Server event loop: bind, then hand each accepted connection its own
/// task. Runs until interrupted.
pub(crate) async fn server_main(config: &Configuration) -> anyhow::Result<()> {
    let users =
        UserStore::open(&config.database_path()).with_context(|| "opening user database")?;
    let storage_dir = config.storage_path();
    tokio::fs::create_dir_all(&storage_dir)
        .await
        .with_context(|| "creating storage directory")?;

    let listener = TcpListener::bind((config.address.as_str(), config.port))
        .await
        .with_context(|| format!("binding {}:{}", config.address, config.port))?;
    info!("listening on {}", listener.local_addr()?);

    tokio::select! {
        result = accept_loop(listener, users, storage_dir) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}

/// Accepts connections forever. Workers share nothing but the credential
/// store handle; a failure in one session never disturbs another.
async fn accept_loop(
    listener: TcpListener,
    users: UserStore,
    storage_dir: PathBuf,
) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("accepted connection from {peer}");
        let users = users.clone();
        let storage_dir = storage_dir.clone();
        let _task = tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, users, storage_dir).await {
                match e.downcast_ref::<TransportError>() {
                    Some(TransportError::ConnectionBroken) => {
                        debug!("{peer}: connection closed by peer");
                    }
                    _ => error!("{peer}: session failed: {e:#}"),
                }
            }
            trace!("{peer}: connection completed");
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    users: UserStore,
    storage_dir: PathBuf,
) -> anyhow::Result<()> {
    let (recv, send) = stream.into_split();
    Session::new(SendReceivePair { send, recv }, users, storage_dir).run().await
}

#[cfg(test)]
mod tests {
    use super::accept_loop;
    use crate::protocol::common::SendReceivePair;
    use crate::session::{auth, download, list, upload};
    use crate::store::UserStore;
    use indicatif::ProgressBar;
    use pretty_assertions::assert_eq;
    use tokio::net::{TcpListener, TcpStream};

    /// Everything again, but over real sockets: two clients of one server.
    #[tokio::test]
    async fn end_to_end_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        let users = UserStore::open(&dir.path().join("users.db")).unwrap();
        let storage = dir.path().join("user_files");
        std::fs::create_dir_all(&storage).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(accept_loop(listener, users, storage));

        // connection 1: register (single-shot per connection)
        let (recv, send) = TcpStream::connect(addr)
            .await
            .unwrap()
            .into_split();
        let mut client = SendReceivePair { send, recv };
        auth::register(&mut client, "someuser", "secret1A")
            .await
            .unwrap();
        drop(client);

        // connection 2: log in and move a file through the system
        let (recv, send) = TcpStream::connect(addr)
            .await
            .unwrap()
            .into_split();
        let mut client = SendReceivePair { send, recv };
        auth::login(&mut client, "someuser", "secret1A")
            .await
            .unwrap();

        let content: Vec<u8> = (0..4096u32).map(|b| (b % 256) as u8).collect();
        upload::send(&mut client, "blob", "", &content, &ProgressBar::hidden())
            .await
            .unwrap();
        let fetched = download::send(&mut client, "blob", &ProgressBar::hidden())
            .await
            .unwrap();
        assert_eq!(fetched, content);
        assert_eq!(list::send(&mut client).await.unwrap(), "blob");

        drop(client);
        server.abort();
    }
}
