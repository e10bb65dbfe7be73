//! Client-side handshake state machine.
//!
//! ```text
//! Init ──send_req──▶ AwaitingResp ──recv_resp──▶ AwaitingAck ──send_ack──▶ Open
//!  │                      │                           │
//!  └──any error──▶ Failed◀┘                           └──any error──▶ Failed
//! ```
//!
//! This is one struct carrying an internal state tag rather than a
//! typestate (`Handshake<Init>`, `Handshake<AwaitingResp>`, ...):
//! the MITM trust-anchor check the caller must perform between
//! `recv_resp` and `send_ack` needs to inspect `server_pubkey` off the
//! very value it will later call `send_ack` on, and a typestate split
//! would force callers to thread that value through an awkward rewrap.

use byteorder::{BigEndian, ByteOrder};

use bcagent_error::{Error, Result};
use bcagent_suite::CryptoSuite;
use bcagent_transport::ByteStream;
use bcagent_wire::{read_typed_data, write_typed_data};

use crate::codec::Reader;
use crate::ids::{Uuid, PROTOCOL_VERSION_DEMO, REQ_ID_HANDSHAKE_INITIATE};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeState {
    Init,
    AwaitingResp,
    AwaitingAck,
    Open,
    Failed,
}

/// What `recv_resp` found once the wire-level decode itself succeeded.
pub enum HandshakeOutcome {
    /// The server accepted the initiate and the response's MAC
    /// verified. `server_pubkey` must be checked by the caller against
    /// a cached trust anchor before `send_ack` is called -- this crate
    /// does not perform that check itself.
    Accepted { server_pubkey: Vec<u8> },
    /// The server rejected the initiate; `status` is its reported
    /// reason. The handshake cannot proceed; construct a new
    /// `Handshake` to retry.
    Rejected { status: u32 },
}

/// Client-side handshake driver for one connection attempt.
pub struct Handshake {
    suite: Box<dyn CryptoSuite>,
    state: HandshakeState,
    client_uuid: Uuid,
    client_privkey: Vec<u8>,
    client_key_nonce: Vec<u8>,
    client_challenge_nonce: Vec<u8>,
    shared_secret: Option<Vec<u8>>,
    server_challenge_nonce: Option<Vec<u8>>,
    agent_uuid: Option<Uuid>,
}

impl Handshake {
    /// Start a new handshake. `client_privkey` is this entity's
    /// private encryption key (from its entity private certificate);
    /// it never leaves this struct except as an input to the suite's
    /// key-agreement primitive.
    pub fn new(suite: Box<dyn CryptoSuite>, client_uuid: Uuid, client_privkey: Vec<u8>) -> Self {
        Handshake {
            suite,
            state: HandshakeState::Init,
            client_uuid,
            client_privkey,
            client_key_nonce: Vec::new(),
            client_challenge_nonce: Vec::new(),
            shared_secret: None,
            server_challenge_nonce: None,
            agent_uuid: None,
        }
    }

    fn require_state(&self, expected: HandshakeState, what: &str) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidArgument(format!(
                "{} called in state {:?}, expected {:?}",
                what, self.state, expected
            )));
        }
        Ok(())
    }

    /// Draw fresh nonces and send the Handshake-Initiate record.
    pub fn send_req(&mut self, sock: &mut dyn ByteStream) -> Result<()> {
        self.require_state(HandshakeState::Init, "send_req")?;

        self.client_key_nonce = self.suite.generate_nonce();
        self.client_challenge_nonce = self.suite.generate_nonce();

        let mut buf = Vec::with_capacity(16 + self.client_key_nonce.len() + self.client_challenge_nonce.len());
        let mut header = [0u8; 4];
        BigEndian::write_u32(&mut header, REQ_ID_HANDSHAKE_INITIATE);
        buf.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, 0); // offset
        buf.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, PROTOCOL_VERSION_DEMO);
        buf.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, self.suite.suite_id());
        buf.extend_from_slice(&header);
        buf.extend_from_slice(&self.client_uuid);
        buf.extend_from_slice(&self.client_key_nonce);
        buf.extend_from_slice(&self.client_challenge_nonce);

        write_typed_data(sock, &buf)?;
        self.state = HandshakeState::AwaitingResp;
        Ok(())
    }

    /// Read and verify the Handshake-Response record.
    pub fn recv_resp(&mut self, sock: &mut dyn ByteStream) -> Result<HandshakeOutcome> {
        self.require_state(HandshakeState::AwaitingResp, "recv_resp")?;

        match self.recv_resp_inner(sock) {
            Ok(outcome) => {
                if let HandshakeOutcome::Accepted { .. } = outcome {
                    self.state = HandshakeState::AwaitingAck;
                } else {
                    self.state = HandshakeState::Failed;
                }
                Ok(outcome)
            }
            Err(e) => {
                self.state = HandshakeState::Failed;
                Err(e)
            }
        }
    }

    fn recv_resp_inner(&mut self, sock: &mut dyn ByteStream) -> Result<HandshakeOutcome> {
        let packet = read_typed_data(sock)?;
        let mut r = Reader::new(&packet);

        let request_id = r.read_u32()?;
        if request_id != REQ_ID_HANDSHAKE_INITIATE {
            return Err(Error::UnexpectedValue(format!(
                "handshake response carried request id {:#010x}",
                request_id
            )));
        }
        let _offset = r.read_u32()?;
        let status = r.read_u32()?;

        if status != 0 {
            log::warn!("handshake rejected by server, status {:#010x}", status);
            return Ok(HandshakeOutcome::Rejected { status });
        }

        let protocol_version = r.read_u32()?;
        if protocol_version != PROTOCOL_VERSION_DEMO {
            return Err(Error::UnexpectedValue(format!(
                "handshake response carried protocol version {:#010x}",
                protocol_version
            )));
        }
        let suite_id = r.read_u32()?;
        if suite_id != self.suite.suite_id() {
            return Err(Error::UnexpectedValue(format!(
                "handshake response carried suite id {:#010x}",
                suite_id
            )));
        }

        let agent_uuid = r.read_uuid()?;

        let mac_start = packet.len() - self.suite.mac_size();
        let pubkey = {
            let start = r.remaining_offset();
            let slice = packet
                .get(start..start + self.suite.pubkey_size())
                .ok_or_else(|| Error::UnexpectedPayloadSize("handshake response truncated".into()))?;
            r.skip(self.suite.pubkey_size())?;
            slice.to_vec()
        };
        let server_key_nonce = {
            let start = r.remaining_offset();
            let slice = packet
                .get(start..start + self.suite.nonce_size())
                .ok_or_else(|| Error::UnexpectedPayloadSize("handshake response truncated".into()))?;
            r.skip(self.suite.nonce_size())?;
            slice.to_vec()
        };
        let server_challenge_nonce = {
            let start = r.remaining_offset();
            let slice = packet
                .get(start..start + self.suite.nonce_size())
                .ok_or_else(|| Error::UnexpectedPayloadSize("handshake response truncated".into()))?;
            r.skip(self.suite.nonce_size())?;
            slice.to_vec()
        };

        if r.remaining_offset() != mac_start {
            return Err(Error::UnexpectedPayloadSize(
                "handshake response body size does not match suite parameters".into(),
            ));
        }
        let server_mac = &packet[mac_start..];
        if server_mac.len() != self.suite.mac_size() {
            return Err(Error::UnexpectedPayloadSize(
                "handshake response MAC has the wrong size".into(),
            ));
        }

        let shared_secret = self.suite.key_agreement_short_term(
            &self.client_privkey,
            &pubkey,
            &server_key_nonce,
            &self.client_key_nonce,
        )?;

        let mut mac = self.suite.new_short_mac(&shared_secret);
        mac.update(&packet[..mac_start]);
        mac.update(&self.client_challenge_nonce);
        let computed = mac.finalize();

        use subtle::ConstantTimeEq;
        if computed.ct_eq(server_mac).unwrap_u8() != 1 {
            return Err(Error::UnexpectedValue(
                "handshake response MAC did not verify".into(),
            ));
        }

        self.shared_secret = Some(shared_secret);
        self.server_challenge_nonce = Some(server_challenge_nonce);
        self.agent_uuid = Some(agent_uuid);

        Ok(HandshakeOutcome::Accepted { server_pubkey: pubkey })
    }

    /// Send the Handshake-Acknowledgement and produce the open
    /// [`Session`]. The caller must have validated `server_pubkey`
    /// from the preceding [`HandshakeOutcome::Accepted`] before
    /// calling this.
    pub fn send_ack(mut self, sock: &mut dyn ByteStream) -> Result<Session> {
        self.require_state(HandshakeState::AwaitingAck, "send_ack")?;

        let shared_secret = self.shared_secret.take().expect("AwaitingAck implies shared_secret is set");
        let server_challenge_nonce = self
            .server_challenge_nonce
            .take()
            .expect("AwaitingAck implies server_challenge_nonce is set");
        let agent_uuid = self.agent_uuid.expect("AwaitingAck implies agent_uuid is set");

        let mut mac = self.suite.new_short_mac(&shared_secret);
        mac.update(&server_challenge_nonce);
        let tag = mac.finalize();

        bcagent_wire::write_authed(sock, crate::session::INITIAL_CLIENT_IV, &tag, self.suite.as_ref(), &shared_secret)?;

        self.state = HandshakeState::Open;

        Ok(Session::with_ivs(
            self.suite,
            shared_secret,
            agent_uuid,
            crate::session::INITIAL_CLIENT_IV + 1,
            crate::session::INITIAL_SERVER_IV,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcagent_suite::suite_by_id;
    use bcagent_transport::MockStream;

    /// Runs both sides of the handshake in-process (the server side
    /// implemented by hand, matching spec.md §4.5's response
    /// algorithm) over a pair of mock streams wired to each other.
    #[test]
    fn full_handshake_reaches_open_with_matching_shared_secret() {
        let suite = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let client_uuid = [9u8; 16];
        let (client_privkey, client_pubkey) = suite.generate_keypair().unwrap();
        let (server_privkey, server_pubkey) = suite.generate_keypair().unwrap();
        let agent_uuid = [3u8; 16];

        let mut handshake = Handshake::new(suite_by_id(bcagent_suite::SUITE_DEMO).unwrap(), client_uuid, client_privkey);

        let mut to_server = MockStream::new();
        handshake.send_req(&mut to_server).unwrap();
        let initiate_bytes = to_server.take_outbound();

        // --- server side, by hand, grounded in spec.md §4.5/§3 ---
        let suite_server = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let mut server_reader = MockStream::new();
        server_reader.push_inbound(&initiate_bytes);
        let initiate = read_typed_data(&mut server_reader).unwrap();
        let mut r = Reader::new(&initiate);
        let _request_id = r.read_u32().unwrap();
        let _offset = r.read_u32().unwrap();
        let _protocol_version = r.read_u32().unwrap();
        let _suite_id = r.read_u32().unwrap();
        let _client_uuid_echo = r.read_uuid().unwrap();
        const INITIATE_HEADER_LEN: usize = 4 + 4 + 4 + 4 + 16; // request_id, offset, protocol_version, suite_id, client_uuid
        let client_key_nonce =
            initiate[INITIATE_HEADER_LEN..INITIATE_HEADER_LEN + suite_server.nonce_size()].to_vec();
        let client_challenge_nonce = initiate[INITIATE_HEADER_LEN + suite_server.nonce_size()
            ..INITIATE_HEADER_LEN + 2 * suite_server.nonce_size()]
            .to_vec();

        let server_key_nonce = suite_server.generate_nonce();
        let server_challenge_nonce = suite_server.generate_nonce();
        let server_shared_secret = suite_server
            .key_agreement_short_term(&server_privkey, &client_pubkey, &server_key_nonce, &client_key_nonce)
            .unwrap();

        let mut response = Vec::new();
        let mut header = [0u8; 4];
        BigEndian::write_u32(&mut header, REQ_ID_HANDSHAKE_INITIATE);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, 0);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, 0); // status success
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, PROTOCOL_VERSION_DEMO);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, suite_server.suite_id());
        response.extend_from_slice(&header);
        response.extend_from_slice(&agent_uuid);
        response.extend_from_slice(&server_pubkey);
        response.extend_from_slice(&server_key_nonce);
        response.extend_from_slice(&server_challenge_nonce);

        let mut mac = suite_server.new_short_mac(&server_shared_secret);
        mac.update(&response);
        mac.update(&client_challenge_nonce);
        let tag = mac.finalize();
        response.extend_from_slice(&tag);

        let mut to_client = MockStream::new();
        write_typed_data(&mut to_client, &response).unwrap();

        // --- back to the client under test ---
        let mut from_server = MockStream::new();
        from_server.push_inbound(&to_client.take_outbound());
        let outcome = handshake.recv_resp(&mut from_server).unwrap();
        let returned_server_pubkey = match outcome {
            HandshakeOutcome::Accepted { server_pubkey } => server_pubkey,
            HandshakeOutcome::Rejected { status } => panic!("server rejected with status {}", status),
        };
        assert_eq!(returned_server_pubkey, server_pubkey);

        let mut ack_sock = MockStream::new();
        let session = handshake.send_ack(&mut ack_sock).unwrap();

        assert_eq!(session.client_iv(), 2);
        assert_eq!(session.server_iv(), crate::session::INITIAL_SERVER_IV);
        assert_eq!(session.agent_uuid(), &agent_uuid);
    }

    #[test]
    fn rejected_status_does_not_advance_to_open() {
        let suite = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let (client_privkey, _client_pubkey) = suite.generate_keypair().unwrap();
        let mut handshake = Handshake::new(suite, [1u8; 16], client_privkey);

        let mut to_server = MockStream::new();
        handshake.send_req(&mut to_server).unwrap();

        let mut response = Vec::new();
        let mut header = [0u8; 4];
        BigEndian::write_u32(&mut header, REQ_ID_HANDSHAKE_INITIATE);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, 0);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, 7); // non-zero status
        response.extend_from_slice(&header);

        let mut to_client = MockStream::new();
        write_typed_data(&mut to_client, &response).unwrap();
        let mut from_server = MockStream::new();
        from_server.push_inbound(&to_client.take_outbound());

        let outcome = handshake.recv_resp(&mut from_server).unwrap();
        assert!(matches!(outcome, HandshakeOutcome::Rejected { status: 7 }));

        let mut ack_sock = MockStream::new();
        assert!(handshake.send_ack(&mut ack_sock).is_err());
    }

    #[test]
    fn tampered_response_mac_is_rejected() {
        let suite = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let (client_privkey, client_pubkey) = suite.generate_keypair().unwrap();
        let mut handshake = Handshake::new(suite_by_id(bcagent_suite::SUITE_DEMO).unwrap(), [1u8; 16], client_privkey);

        let mut to_server = MockStream::new();
        handshake.send_req(&mut to_server).unwrap();

        let suite_server = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let (server_privkey, server_pubkey) = suite_server.generate_keypair().unwrap();
        let server_key_nonce = suite_server.generate_nonce();
        let server_challenge_nonce = suite_server.generate_nonce();
        let shared_secret = suite_server
            .key_agreement_short_term(&server_privkey, &client_pubkey, &server_key_nonce, &[0u8; 32])
            .unwrap();

        let mut response = Vec::new();
        let mut header = [0u8; 4];
        BigEndian::write_u32(&mut header, REQ_ID_HANDSHAKE_INITIATE);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, 0);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, 0);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, PROTOCOL_VERSION_DEMO);
        response.extend_from_slice(&header);
        BigEndian::write_u32(&mut header, suite_server.suite_id());
        response.extend_from_slice(&header);
        response.extend_from_slice(&[5u8; 16]);
        response.extend_from_slice(&server_pubkey);
        response.extend_from_slice(&server_key_nonce);
        response.extend_from_slice(&server_challenge_nonce);
        response.extend_from_slice(&vec![0xFFu8; suite_server.mac_size()]); // bogus MAC

        let mut to_client = MockStream::new();
        write_typed_data(&mut to_client, &response).unwrap();
        let mut from_server = MockStream::new();
        from_server.push_inbound(&to_client.take_outbound());

        assert!(handshake.recv_resp(&mut from_server).is_err());
    }
}
