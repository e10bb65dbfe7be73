//! The byte-stream abstraction: raw, exact-count read/write over an
//! opaque transport. Synchronous, blocking, and ignorant of any
//! cryptographic state -- framing and session layers are built on top of
//! it, never folded into it.

mod mock;
mod tcp;

pub use mock::MockStream;

pub use tcp::TcpByteStream;

use bcagent_error::Result;

/// Exact-count read/write over an opaque transport.
///
/// A short read or write is always an error -- callers never have to
/// handle partial transfers themselves. Closing the handle (via `Drop`)
/// releases the underlying descriptor exactly once; there is no separate
/// `close` method to forget to call.
pub trait ByteStream: Send {
    /// Read exactly `buf.len()` bytes, or fail.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write exactly `buf.len()` bytes, or fail.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
}

/// Resolve `hostaddr`, open a TCP connection to `(hostaddr, port)`, and
/// wrap it in the byte-stream abstraction.
pub fn connect(hostaddr: &str, port: u16) -> Result<TcpByteStream> {
    tcp::connect(hostaddr, port)
}
