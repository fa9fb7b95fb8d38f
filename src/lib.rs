// (c) 2025 Ross Younger

//! Cubby is a small personal file-storage service.
//!
//! Clients register or sign in, then upload, download, list, create
//! directories and remove files on their own slice of a remote store, over
//! a persistent TCP session.
//!
//! ## Overview
//! - One binary, two modes: `cubby serve` and `cubby connect`
//! - A compact binary [protocol]: fixed-layout clear-text headers,
//!   obfuscated payloads, chunked bulk transfer
//! - Per-user storage roots on the server; a [store] of credentials with
//!   registration enforced atomically at the storage layer
//!
//! The payload obfuscation is a reversible keyed transform, not
//! encryption; treat the wire as readable by anyone who holds the binary.
//!
//! ## How a session runs
//! 1. The client connects and either registers (single-shot per
//!    connection) or logs in.
//! 1. Once logged in, each command is one request/response exchange;
//!    uploads and downloads additionally stream file content in bounded
//!    chunks.
//! 1. The session ends at Quit, or when either side drops the connection.

pub(crate) mod cli;
pub use cli::cli;
pub use cli::styles;
pub(crate) mod client;
pub mod config;
pub mod protocol;
pub(crate) mod server;
pub(crate) mod session;
pub(crate) mod storage;
pub mod store;
pub mod transport;
pub mod util;
