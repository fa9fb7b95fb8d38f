// (c) 2025 Ross Younger

//! Stream typedefs shared by client and server

use tokio::io::{AsyncRead, AsyncWrite};

/// Marker trait for streams used for sending data
pub trait SendingStream: AsyncWrite + Send + Unpin {}
impl<T: AsyncWrite + Send + Unpin> SendingStream for T {}

/// Marker trait for streams used for receiving data
pub trait ReceivingStream: AsyncRead + Send + Unpin {}
impl<T: AsyncRead + Send + Unpin> ReceivingStream for T {}

/// Syntactic sugar helper type
#[derive(Debug)]
pub struct SendReceivePair<S: SendingStream, R: ReceivingStream> {
    /// outbound data
    pub send: S,
    /// inbound data
    pub recv: R,
}

impl<S: SendingStream, R: ReceivingStream> From<(S, R)> for SendReceivePair<S, R> {
    fn from(value: (S, R)) -> Self {
        Self {
            send: value.0,
            recv: value.1,
        }
    }
}

/// The pair type of a live client or server connection
pub(crate) type TcpStreamPair =
    SendReceivePair<tokio::net::tcp::OwnedWriteHalf, tokio::net::tcp::OwnedReadHalf>;
