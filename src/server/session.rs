// (c) 2025 Ross Younger

//! Per-connection session state machine
//!
//! One [`Session`] exists per accepted connection and is never shared.
//! Authentication state gates every file operation: the only promotion to
//! `Authenticated` is a successful Login, and `Terminated` is a state of
//! its own, not a loop flag.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, trace, trace_span, Instrument as _};

use crate::protocol::common::{ReceivingStream, SendReceivePair, SendingStream};
use crate::protocol::session::{Credentials, Request, RequestCode, ResponseCode, Status};
use crate::session::common::send_status;
use crate::session::{download, list, mkdir, remove, upload};
use crate::storage::UserRoot;
use crate::store::{StoreError, UserStore};
use crate::transport;

/// Authentication and lifecycle state of one connection
#[derive(Debug)]
enum State {
    Unauthenticated,
    Authenticated(UserRoot),
    Terminated,
}

/// Server-side half of one client connection
pub(crate) struct Session<S: SendingStream, R: ReceivingStream> {
    stream: SendReceivePair<S, R>,
    users: UserStore,
    storage_dir: PathBuf,
    state: State,
}

impl<S: SendingStream, R: ReceivingStream> Session<S, R> {
    pub(crate) fn new(
        stream: SendReceivePair<S, R>,
        users: UserStore,
        storage_dir: PathBuf,
    ) -> Self {
        Self {
            stream,
            users,
            storage_dir,
            state: State::Unauthenticated,
        }
    }

    /// Request loop: read one frame, dispatch, repeat until this session
    /// terminates. No request is processed after termination.
    pub(crate) async fn run(mut self) -> Result<()> {
        while !matches!(self.state, State::Terminated) {
            let (header, payload) = transport::recv_request(&mut self.stream.recv).await?;
            let request = Request::decode(header.code, &payload)?;
            self.dispatch(request).await?;
        }
        trace!("session terminated");
        Ok(())
    }

    async fn dispatch(&mut self, request: Request) -> Result<()> {
        match request {
            Request::Register(creds) => self.handle_register(creds).await,
            Request::Login(creds) => self.handle_login(creds).await,
            Request::Quit => {
                trace!("quit requested");
                self.state = State::Terminated;
                Ok(())
            }
            Request::RemoveFile(name) => {
                let Some(root) = self.authenticated(RequestCode::RemoveFile).await? else {
                    return Ok(());
                };
                remove::handle(&mut self.stream, &root, &name)
                    .instrument(trace_span!("SERVER:REMOVE", filename = name.clone()))
                    .await
            }
            Request::DownloadFile(name) => {
                let Some(root) = self.authenticated(RequestCode::DownloadFile).await? else {
                    return Ok(());
                };
                download::handle(&mut self.stream, &root, &name)
                    .instrument(trace_span!("SERVER:DOWNLOAD", filename = name.clone()))
                    .await
            }
            Request::UploadFile(args) => {
                let Some(root) = self.authenticated(RequestCode::UploadFile).await? else {
                    return Ok(());
                };
                upload::handle(&mut self.stream, &root, &args)
                    .instrument(trace_span!("SERVER:UPLOAD", filename = args.file_name.clone()))
                    .await
            }
            Request::ListFiles => {
                let Some(root) = self.authenticated(RequestCode::ListFiles).await? else {
                    return Ok(());
                };
                list::handle(&mut self.stream, &root)
                    .instrument(trace_span!("SERVER:LIST"))
                    .await
            }
            Request::CreateDirectory(name) => {
                let Some(root) = self.authenticated(RequestCode::CreateDirectory).await? else {
                    return Ok(());
                };
                mkdir::handle(&mut self.stream, &root, &name)
                    .instrument(trace_span!("SERVER:MKDIR", filename = name.clone()))
                    .await
            }
        }
    }

    /// Returns the user's root if logged in; otherwise answers
    /// `NotLoggedIn` on the paired response code and returns None.
    /// A session is never promoted here: Login is the only way in.
    async fn authenticated(&mut self, code: RequestCode) -> Result<Option<UserRoot>> {
        match &self.state {
            State::Authenticated(root) => Ok(Some(root.clone())),
            _ => {
                trace!("rejecting {code}: not logged in");
                send_status(&mut self.stream.send, code.response(), Status::NotLoggedIn).await?;
                Ok(None)
            }
        }
    }

    async fn handle_register(&mut self, creds: Credentials) -> Result<()> {
        let status = match self.users.create(&creds.username, &creds.password) {
            Ok(()) => {
                let _ = UserRoot::ensure(&self.storage_dir, &creds.username).await?;
                info!("registered user {}", creds.username);
                Status::Ok
            }
            Err(StoreError::UserAlreadyExists(_)) => Status::UserAlreadyExists,
            Err(e) => return Err(e.into()),
        };
        send_status(&mut self.stream.send, ResponseCode::Register, status).await?;
        // Registration is single-shot: logging in requires a fresh connection.
        self.state = State::Terminated;
        Ok(())
    }

    async fn handle_login(&mut self, creds: Credentials) -> Result<()> {
        if !self.users.exists(&creds.username)? {
            send_status(&mut self.stream.send, ResponseCode::Login, Status::UserNotFound).await?;
            self.state = State::Terminated;
            return Ok(());
        }
        if !self.users.verify(&creds.username, &creds.password)? {
            send_status(
                &mut self.stream.send,
                ResponseCode::Login,
                Status::IncorrectPassword,
            )
            .await?;
            self.state = State::Terminated;
            return Ok(());
        }
        let root = UserRoot::ensure(&self.storage_dir, &creds.username).await?;
        info!("user {} logged in", root.username());
        self.state = State::Authenticated(root);
        send_status(&mut self.stream.send, ResponseCode::Login, Status::Ok).await
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::protocol::frame::RequestHeader;
    use crate::protocol::session::{RequestCode, Status, LISTING_SEPARATOR};
    use crate::session::{auth, download, list, mkdir, remove, upload};
    use crate::store::UserStore;
    use crate::transport;
    use crate::util::test_protocol::{test_plumbing, TestPair};
    use anyhow::Result;
    use indicatif::ProgressBar;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tokio::task::JoinHandle;

    struct Fixture {
        _dir: tempfile::TempDir,
        users: UserStore,
        storage: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let users = UserStore::open(&dir.path().join("users.db")).unwrap();
            let storage = dir.path().join("user_files");
            std::fs::create_dir_all(&storage).unwrap();
            Self {
                _dir: dir,
                users,
                storage,
            }
        }

        /// Starts a fresh session (one per connection, as in production)
        /// and hands back the client's end of the wire.
        fn connect(&self) -> (TestPair, JoinHandle<Result<()>>) {
            let (near, far) = test_plumbing();
            let session = Session::new(far, self.users.clone(), self.storage.clone());
            (near, tokio::spawn(session.run()))
        }
    }

    async fn register(fx: &Fixture, username: &str, password: &str) -> Result<()> {
        let (mut client, server) = fx.connect();
        let result = auth::register(&mut client, username, password).await;
        server.await.unwrap().unwrap();
        result
    }

    /// Logs in on a fresh connection, leaving the session running.
    async fn login(fx: &Fixture, username: &str, password: &str) -> (TestPair, JoinHandle<Result<()>>) {
        let (mut client, server) = fx.connect();
        auth::login(&mut client, username, password).await.unwrap();
        (client, server)
    }

    async fn quit(mut client: TestPair, server: JoinHandle<Result<()>>) {
        transport::send_request(&mut client.send, RequestCode::Quit, &[])
            .await
            .unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn register_twice() {
        let fx = Fixture::new();
        register(&fx, "someuser", "secret1A").await.unwrap();
        // registration also creates the user's storage root
        assert!(fx.storage.join("someuser").is_dir());

        let err = register(&fx, "someuser", "other2B!").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<Status>(),
            Some(&Status::UserAlreadyExists)
        );
    }

    #[tokio::test]
    async fn login_unknown_user() {
        let fx = Fixture::new();
        let (mut client, server) = fx.connect();
        let err = auth::login(&mut client, "nobody", "whatever")
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<Status>(), Some(&Status::UserNotFound));
        // a failed login terminates the session
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn login_wrong_password() {
        let fx = Fixture::new();
        register(&fx, "someuser", "secret1A").await.unwrap();
        let (mut client, server) = fx.connect();
        let err = auth::login(&mut client, "someuser", "wrong")
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<Status>(),
            Some(&Status::IncorrectPassword)
        );
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn file_commands_require_login() {
        let fx = Fixture::new();
        let (mut client, server) = fx.connect();

        let err = upload::send(&mut client, "f", "", b"data", &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<Status>(), Some(&Status::NotLoggedIn));

        // the session survives a rejection, and keeps rejecting
        let err = list::send(&mut client).await.unwrap_err();
        assert_eq!(err.downcast_ref::<Status>(), Some(&Status::NotLoggedIn));
        let err = download::send(&mut client, "f", &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<Status>(), Some(&Status::NotLoggedIn));
        let err = remove::send(&mut client, "f").await.unwrap_err();
        assert_eq!(err.downcast_ref::<Status>(), Some(&Status::NotLoggedIn));
        let err = mkdir::send(&mut client, "d").await.unwrap_err();
        assert_eq!(err.downcast_ref::<Status>(), Some(&Status::NotLoggedIn));

        // and no side effects happened
        assert!(std::fs::read_dir(&fx.storage).unwrap().next().is_none());

        quit(client, server).await;
    }

    #[tokio::test]
    async fn full_session_flow() {
        let fx = Fixture::new();
        register(&fx, "someuser", "secret1A").await.unwrap();
        let (mut client, server) = login(&fx, "someuser", "secret1A").await;

        mkdir::send(&mut client, "docs").await.unwrap();

        let content = b"the usual test corpus".to_vec();
        upload::send(&mut client, "a.txt", "docs", &content, &ProgressBar::hidden())
            .await
            .unwrap();

        // duplicate upload is refused and leaves the original alone
        let err = upload::send(&mut client, "a.txt", "docs", b"usurper", &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<Status>(),
            Some(&Status::FileAlreadyExists)
        );

        let fetched = download::send(&mut client, "docs/a.txt", &ProgressBar::hidden())
            .await
            .unwrap();
        assert_eq!(fetched, content);

        let mut entries: Vec<String> = list::send(&mut client)
            .await
            .unwrap()
            .split(LISTING_SEPARATOR)
            .map(String::from)
            .collect();
        entries.sort();
        assert_eq!(entries, ["docs", "docs/a.txt"]);

        remove::send(&mut client, "docs").await.unwrap();
        assert_eq!(list::send(&mut client).await.unwrap(), "");

        quit(client, server).await;
    }

    #[tokio::test]
    async fn unknown_opcode_drops_the_session() {
        let fx = Fixture::new();
        let (mut client, server) = fx.connect();
        let bogus = RequestHeader {
            code: 4242,
            length: 0,
        };
        transport::send_header(&mut client.send, &bogus.encode())
            .await
            .unwrap();
        assert!(server.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn peer_disconnect_ends_the_session() {
        let fx = Fixture::new();
        let (client, server) = fx.connect();
        drop(client);
        assert!(server.await.unwrap().is_err());
    }
}
