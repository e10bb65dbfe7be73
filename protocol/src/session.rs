//! Post-handshake session state: the shared secret and the two
//! directional IV counters, plus the per-call helpers that wrap
//! authenticated framing with IV bookkeeping.

use zeroize::Zeroize;

use bcagent_error::Result;
use bcagent_suite::CryptoSuite;
use bcagent_transport::ByteStream;
use bcagent_wire::{read_authed, write_authed};

use crate::ids::Uuid;

/// The client-IV value a session starts at once the handshake
/// acknowledgement has been sent.
pub const INITIAL_CLIENT_IV: u64 = 0x0000_0000_0000_0001;

/// The server-IV value a session starts at once the handshake
/// acknowledgement has been sent. The high bit keeps the two
/// directions' IV spaces disjoint.
pub const INITIAL_SERVER_IV: u64 = 0x8000_0000_0000_0001;

/// Post-handshake connection state: one shared secret, two independent
/// monotonic IV counters, and the negotiated agent identity.
///
/// Every packet is sent or received with a fresh stream cipher and MAC
/// context (see `bcagent_wire`); the only state carried between
/// packets is the IV counter for that direction. The shared secret is
/// zeroized when the session is dropped.
pub struct Session {
    suite: Box<dyn CryptoSuite>,
    shared_secret: Vec<u8>,
    client_iv: u64,
    server_iv: u64,
    agent_uuid: Uuid,
}

impl Session {
    /// Construct a session already at the post-handshake IV values.
    /// Ordinary applications get a [`Session`] from
    /// [`crate::Handshake::send_ack`] instead; this constructor exists
    /// for server implementations and test doubles that need to drive
    /// the wire format directly, per spec.md §6's "the same codec can
    /// serve server implementations and test doubles."
    pub fn new(suite: Box<dyn CryptoSuite>, shared_secret: Vec<u8>, agent_uuid: Uuid) -> Self {
        Session::with_ivs(suite, shared_secret, agent_uuid, INITIAL_CLIENT_IV, INITIAL_SERVER_IV)
    }

    /// Construct a session at caller-supplied IV values. Used by the
    /// handshake driver, whose `send_ack` consumes `client_iv == 1`
    /// before the session is handed to the caller; also useful for a
    /// server-side peer, which starts at the same two IV values but
    /// sends under `server_iv` and receives under `client_iv`.
    pub fn with_ivs(
        suite: Box<dyn CryptoSuite>,
        shared_secret: Vec<u8>,
        agent_uuid: Uuid,
        client_iv: u64,
        server_iv: u64,
    ) -> Self {
        Session {
            suite,
            shared_secret,
            client_iv,
            server_iv,
            agent_uuid,
        }
    }

    pub fn agent_uuid(&self) -> &Uuid {
        &self.agent_uuid
    }

    pub fn client_iv(&self) -> u64 {
        self.client_iv
    }

    pub fn server_iv(&self) -> u64 {
        self.server_iv
    }

    /// Write `payload` (a fully-encoded request, including its own
    /// request-id/offset header) as an authenticated packet under
    /// `client_iv`, then advance `client_iv`.
    pub fn send_request(&mut self, sock: &mut dyn ByteStream, offset: u32, payload: &[u8]) -> Result<()> {
        log::debug!("sending request at offset {:#010x}, iv {}", offset, self.client_iv);
        write_authed(sock, self.client_iv, payload, self.suite.as_ref(), &self.shared_secret)?;
        self.client_iv = self.client_iv.wrapping_add(1);
        Ok(())
    }

    /// Read one authenticated packet under `server_iv`, then advance
    /// `server_iv`. Returns the cleartext response bytes (a generic
    /// response header followed by that message's body).
    pub fn recv_response(&mut self, sock: &mut dyn ByteStream) -> Result<Vec<u8>> {
        let cleartext = read_authed(sock, self.server_iv, self.suite.as_ref(), &self.shared_secret)?;
        log::debug!("received response, iv {}", self.server_iv);
        self.server_iv = self.server_iv.wrapping_add(1);
        Ok(cleartext)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shared_secret.zeroize();
    }
}
