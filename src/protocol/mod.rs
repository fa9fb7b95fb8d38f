// (c) 2025 Ross Younger

//! Protocol definitions for cubby
//!
//! # On-Wire Framing
//!
//! All messages are sent in two parts:
//!
//! * a fixed-size clear-text header ([`frame`])
//! * an obfuscated payload ([`mask`]) of exactly the length the header
//!   declares
//!
//! Requests carry `{code, length}`; responses carry `{code, status,
//! length}`. File content travels out-of-band after the relevant response,
//! obfuscated and chunked (see [`crate::transport`]).
//!
//! There is no negotiation phase: byte order, obfuscation key and the
//! command registries ([`session`]) are compiled in, so both ends must be
//! built from the same definitions.

pub mod common;
pub mod frame;
pub mod mask;
pub mod session;
