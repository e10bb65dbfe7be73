#![forbid(unsafe_code)]
//! Client-side core of the blockchain agent protocol: session
//! establishment, authenticated framing, and the request/response codec
//! used to converse with a remote blockchain agent over a byte-stream
//! transport.
//!
//! This crate re-exports the focused workspace members underneath it
//! into one cohesive surface:
//!
//! - [`suite`] -- the crypto suite abstraction ([`CryptoSuite`], sizes,
//!   primitives) a caller negotiates and threads through everything else.
//! - [`transport`] -- the [`ByteStream`] abstraction and a TCP
//!   [`connect`] helper.
//! - [`wire`] -- typed and authenticated framing.
//! - [`cert`] -- entity certificate parsing ([`PublicCert`],
//!   [`PrivateCert`]).
//! - [`resolve`] -- the address-resolution collaborator.
//! - [`protocol`] -- [`Session`], [`Handshake`], and the request/response
//!   codec.
//!
//! A typical client drives a connection as:
//!
//! ```no_run
//! use bcagent::{suite_by_id, Handshake, SUITE_DEMO};
//!
//! # fn run() -> bcagent::Result<()> {
//! let suite = suite_by_id(SUITE_DEMO)?;
//! let (client_privkey, _client_pubkey) = suite.generate_keypair()?;
//! let mut sock = bcagent::connect("agent.example.com", 4433)?;
//!
//! let mut handshake = Handshake::new(suite_by_id(SUITE_DEMO)?, [0u8; 16], client_privkey);
//! handshake.send_req(&mut sock)?;
//! let outcome = handshake.recv_resp(&mut sock)?;
//! // caller checks the returned server_pubkey against a trust anchor here
//! // before calling send_ack -- see Handshake's docs.
//! let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub use bcagent_error::{Error, Result};

pub mod suite {
    //! Crypto suite abstraction. See [`bcagent_suite`] for the full docs.
    pub use bcagent_suite::*;
}

pub mod transport {
    //! Byte-stream abstraction. See [`bcagent_transport`] for the full docs.
    pub use bcagent_transport::*;
}

pub mod wire {
    //! Typed and authenticated framing. See [`bcagent_wire`] for the full docs.
    pub use bcagent_wire::*;
}

pub mod cert {
    //! Entity certificate parsing. See [`bcagent_cert`] for the full docs.
    pub use bcagent_cert::*;
}

pub mod resolve {
    //! Address resolution collaborator. See [`bcagent_resolve`] for the full docs.
    pub use bcagent_resolve::*;
}

pub mod protocol {
    //! Session state, handshake driver, and request/response codec. See
    //! [`bcagent_protocol`] for the full docs.
    pub use bcagent_protocol::*;
}

// Flatten the most-used items onto the crate root so callers don't have
// to spell out the full submodule path for everyday types.
pub use bcagent_cert::{PrivateCert, PublicCert};
pub use bcagent_protocol::{Handshake, HandshakeOutcome, Session};
pub use bcagent_resolve::{AddressFamily, AddressResolver, SystemResolver};
pub use bcagent_suite::{suite_by_id, CryptoSuite, ShortMac, StreamCipher, SUITE_DEMO};
pub use bcagent_transport::{connect, ByteStream, MockStream, TcpByteStream};
