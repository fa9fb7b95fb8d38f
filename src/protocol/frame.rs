// (c) 2025 Ross Younger

//! On-wire frame headers
//!
//! Every message is a fixed-size clear-text header followed by `length`
//! bytes of obfuscated payload. All header fields are unsigned
//! little-endian; the byte order is compiled in, not negotiated, so both
//! ends must be built from the same definitions.

use thiserror::Error;

/// Errors arising from header decode
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum FrameError {
    /// Fewer bytes than the fixed header size were available
    #[error("malformed header: expected {expected} bytes, got {got}")]
    MalformedHeader {
        /// The fixed header size
        expected: usize,
        /// What actually arrived
        got: usize,
    },
}

/// Header of a client request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Numeric request code
    pub code: u32,
    /// Exact byte count of the payload that follows on the wire
    pub length: u32,
}

impl RequestHeader {
    /// The on-wire size of this struct, which is fixed (any change would
    /// constitute a breaking protocol change)
    pub const SIZE: usize = 8;

    /// Packs this header for the wire.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..4].copy_from_slice(&self.code.to_le_bytes());
        out[4..].copy_from_slice(&self.length.to_le_bytes());
        out
    }

    /// Unpacks a header from the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < Self::SIZE {
            return Err(FrameError::MalformedHeader {
                expected: Self::SIZE,
                got: bytes.len(),
            });
        }
        Ok(Self {
            code: u32::from_le_bytes(bytes[..4].try_into().unwrap()),
            length: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        })
    }
}

/// Header of a server response. Unlike a request it carries a status field;
/// the payload length comes last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Numeric response code, paired with the request code it answers
    pub code: u32,
    /// One status value from the registry
    pub status: u32,
    /// Exact byte count of the payload that follows on the wire
    pub length: u32,
}

impl ResponseHeader {
    /// The on-wire size of this struct, which is fixed (any change would
    /// constitute a breaking protocol change)
    pub const SIZE: usize = 12;

    /// Packs this header for the wire.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..4].copy_from_slice(&self.code.to_le_bytes());
        out[4..8].copy_from_slice(&self.status.to_le_bytes());
        out[8..].copy_from_slice(&self.length.to_le_bytes());
        out
    }

    /// Unpacks a header from the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < Self::SIZE {
            return Err(FrameError::MalformedHeader {
                expected: Self::SIZE,
                got: bytes.len(),
            });
        }
        Ok(Self {
            code: u32::from_le_bytes(bytes[..4].try_into().unwrap()),
            status: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            length: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
        })
    }
}
