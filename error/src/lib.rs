//! The single error type shared by every layer of the blockchain agent
//! client: transport, framing, session, codec, certificate parsing, and
//! address resolution all return `Result<T, Error>`.
//!
//! Each variant corresponds to one row of the error-kind table: a library
//! boundary failure, never a panic. `Error` carries no secret material --
//! callers can log it freely.

use thiserror::Error;

/// A library-boundary failure kind.
///
/// `Success` from the table this mirrors is not represented here: a
/// successful call returns `Ok`, not an `Error::Success` variant.
#[derive(Error, Debug)]
pub enum Error {
    /// Null/out-of-range parameter at the library boundary.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Allocation failure.
    #[error("out of memory")]
    OutOfMemory,

    /// Transport read failed or returned fewer bytes than requested.
    #[error("read error: {0}")]
    Read(#[source] std::io::Error),

    /// Transport write failed or accepted fewer bytes than requested.
    #[error("write error: {0}")]
    Write(#[source] std::io::Error),

    /// A decoded frame had the wrong length for its fixed schema.
    #[error("unexpected payload size: {0}")]
    UnexpectedPayloadSize(String),

    /// A fixed field (request id, version, suite id, tag) did not match
    /// what was expected.
    #[error("unexpected value: {0}")]
    UnexpectedValue(String),

    /// An authenticated-packet type, size, or MAC tag check failed.
    #[error("unauthorized packet")]
    UnauthorizedPacket,

    /// The underlying cryptographic primitive reported a failure.
    #[error("crypto failure: {0}")]
    CryptoFailure(String),

    /// A hostname could not be resolved to an address.
    #[error("inet resolution failure: {0}")]
    InetResolutionFailure(String),

    /// The transport connection was refused by the remote peer.
    #[error("connection refused")]
    ConnectionRefused,

    /// The local socket could not be created.
    #[error("socket create failed: {0}")]
    SocketCreateFailed(#[source] std::io::Error),

    /// A textual address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
