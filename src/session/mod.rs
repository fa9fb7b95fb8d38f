// (c) 2025 Ross Younger

//! Session protocol command senders and handlers
//!
//! Each module pairs the client-side sender with the server-side handler
//! for one command, so both halves of an exchange are read together.

pub(crate) mod auth;
pub(crate) mod common;
pub(crate) mod download;
pub(crate) mod list;
pub(crate) mod mkdir;
pub(crate) mod remove;
pub(crate) mod upload;
