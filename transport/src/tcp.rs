use std::io::{self, Read, Write};
use std::net::TcpStream;

use bcagent_error::{Error, Result};
use bcagent_resolve::{AddressFamily, AddressResolver, SystemResolver};

use crate::ByteStream;

/// A `TcpStream`-backed byte stream. Dropping it closes the socket
/// exactly once, via `TcpStream`'s own `Drop` impl -- there is no manual
/// dispose step for callers to remember.
pub struct TcpByteStream {
    inner: TcpStream,
}

impl TcpByteStream {
    /// Wrap an already-connected socket.
    pub fn new(inner: TcpStream) -> Self {
        TcpByteStream { inner }
    }
}

impl ByteStream for TcpByteStream {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(Error::Read)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_all(buf).map_err(Error::Write)
    }
}

pub(crate) fn connect(hostaddr: &str, port: u16) -> Result<TcpByteStream> {
    let resolver = SystemResolver;
    let addr = resolver.resolve(hostaddr, AddressFamily::Ipv4).or_else(|_| {
        resolver.resolve(hostaddr, AddressFamily::Ipv6)
    })?;

    log::debug!("connecting to {}:{}", addr, port);

    let stream = TcpStream::connect((addr.as_str(), port)).map_err(|e| {
        if e.kind() == io::ErrorKind::ConnectionRefused {
            Error::ConnectionRefused
        } else {
            Error::SocketCreateFailed(e)
        }
    })?;

    Ok(TcpByteStream::new(stream))
}
