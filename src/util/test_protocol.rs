// (c) 2025 Ross Younger

//! Shared plumbing for protocol unit tests

use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

use crate::protocol::common::SendReceivePair;

/// The stream pair type used by in-memory endpoint tests
pub(crate) type TestPair = SendReceivePair<WriteHalf<DuplexStream>, ReadHalf<DuplexStream>>;

/// Creates a connected pair of in-memory endpoints. The buffer is large
/// enough that single-sided tests never stall on the far end.
pub(crate) fn test_plumbing() -> (TestPair, TestPair) {
    let (one, two) = tokio::io::duplex(1024 * 1024);
    let (recv1, send1) = tokio::io::split(one);
    let (recv2, send2) = tokio::io::split(two);
    (
        SendReceivePair::from((send1, recv1)),
        SendReceivePair::from((send2, recv2)),
    )
}
