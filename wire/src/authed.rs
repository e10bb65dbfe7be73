//! Authenticated framing: the encrypt-then-MAC boxed-packet format every
//! post-handshake message rides on.
//!
//! ```text
//!  offset 0:      type          u32 big-endian  (== AUTHED_PACKET_TYPE)
//!  offset 4:      payload size  u32 big-endian  (bounded <= 250 MiB)
//!  offset 8:      MAC tag       suite.mac_size() bytes
//!  offset 8+mac:  payload       payload_size bytes (ciphertext)
//! ```
//!
//! The header (type + size) and the payload are encrypted by the same
//! stream-cipher instance, used first on the header and then, without
//! being re-keyed, on the payload -- mirroring how the two
//! `vccrypt_stream_decrypt` calls in the original `ssock_read_authed_data`
//! share one continuing stream context. The MAC covers the *ciphertext*
//! of header and payload, never the tag itself, and is compared in
//! constant time.
//!
//! The IV is supplied by the caller and is never incremented here --
//! that bookkeeping belongs to the session layer, which must use a
//! fresh, never-reused IV for every call.

use byteorder::{BigEndian, ByteOrder};
use subtle::ConstantTimeEq;

use bcagent_error::{Error, Result};
use bcagent_suite::CryptoSuite;
use bcagent_transport::ByteStream;

/// The only type tag authenticated framing ever writes or accepts. Must
/// match [`crate::typed::TypedTag::AuthedPacket`].
const AUTHED_PACKET_TYPE: u32 = 0x0000_0030;

/// Normative payload-size ceiling: 250 MiB.
pub const MAX_PAYLOAD_SIZE: usize = 250 * 1024 * 1024;

/// Legacy defensive ceiling an implementation may opt into via
/// [`FramingOptions`]; not the default.
pub const LEGACY_MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Tunable limits for the authenticated-framing layer. The only
/// configurable concern this layer has -- everything else (suite choice,
/// secret, IV) is supplied per call, not stashed in a global.
#[derive(Debug, Clone, Copy)]
pub struct FramingOptions {
    /// Maximum accepted payload size, in bytes.
    pub max_payload_size: usize,
}

impl Default for FramingOptions {
    fn default() -> Self {
        FramingOptions {
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl FramingOptions {
    /// Apply the legacy 10 MiB defensive ceiling instead of the
    /// normative 250 MiB one.
    pub fn with_legacy_ceiling() -> Self {
        FramingOptions {
            max_payload_size: LEGACY_MAX_PAYLOAD_SIZE,
        }
    }
}

/// Write an authenticated (encrypt-then-MAC) packet.
pub fn write_authed(
    sock: &mut dyn ByteStream,
    iv: u64,
    payload: &[u8],
    suite: &dyn CryptoSuite,
    secret: &[u8],
) -> Result<()> {
    let mac_size = suite.mac_size();
    let mut packet = vec![0u8; 8 + mac_size + payload.len()];

    let mut cipher = suite.new_stream_cipher(secret, iv);

    BigEndian::write_u32(&mut packet[0..4], AUTHED_PACKET_TYPE);
    BigEndian::write_u32(&mut packet[4..8], payload.len() as u32);
    cipher.apply_keystream(&mut packet[0..8]);

    let payload_start = 8 + mac_size;
    packet[payload_start..].copy_from_slice(payload);
    cipher.apply_keystream(&mut packet[payload_start..]);

    let mut mac = suite.new_short_mac(secret);
    mac.update(&packet[0..8]);
    mac.update(&packet[payload_start..]);
    let tag = mac.finalize();
    packet[8..payload_start].copy_from_slice(&tag);

    sock.write_all(&packet)
}

/// Read an authenticated (encrypt-then-MAC) packet, using the normative
/// 250 MiB payload-size ceiling.
pub fn read_authed(
    sock: &mut dyn ByteStream,
    iv: u64,
    suite: &dyn CryptoSuite,
    secret: &[u8],
) -> Result<Vec<u8>> {
    read_authed_with_options(sock, iv, suite, secret, &FramingOptions::default())
}

/// Read an authenticated (encrypt-then-MAC) packet with caller-supplied
/// limits.
pub fn read_authed_with_options(
    sock: &mut dyn ByteStream,
    iv: u64,
    suite: &dyn CryptoSuite,
    secret: &[u8],
    options: &FramingOptions,
) -> Result<Vec<u8>> {
    let mac_size = suite.mac_size();
    let mut header = vec![0u8; 8 + mac_size];
    sock.read_exact(&mut header)?;

    let mut cipher = suite.new_stream_cipher(secret, iv);

    let mut decrypted_header = [0u8; 8];
    decrypted_header.copy_from_slice(&header[0..8]);
    cipher.apply_keystream(&mut decrypted_header);

    let ptype = BigEndian::read_u32(&decrypted_header[0..4]);
    if ptype != AUTHED_PACKET_TYPE {
        log::warn!("authed packet had unexpected type {:#010x}", ptype);
        return Err(Error::UnauthorizedPacket);
    }

    let size = BigEndian::read_u32(&decrypted_header[4..8]) as usize;
    if size > options.max_payload_size {
        log::warn!("authed packet payload {} exceeds ceiling", size);
        return Err(Error::UnauthorizedPacket);
    }

    let mut ciphertext = vec![0u8; size];
    sock.read_exact(&mut ciphertext)?;

    let mut mac = suite.new_short_mac(secret);
    mac.update(&header[0..8]);
    mac.update(&ciphertext);
    let computed_tag = mac.finalize();

    let received_tag = &header[8..8 + mac_size];
    if computed_tag.ct_eq(received_tag).unwrap_u8() != 1 {
        log::warn!("authed packet failed MAC verification");
        return Err(Error::UnauthorizedPacket);
    }

    // The header decryption above already advanced this cipher's
    // keystream by 8 bytes; continuing on the same instance for the
    // payload is equivalent to the original's explicit re-seek to that
    // offset.
    cipher.apply_keystream(&mut ciphertext);
    Ok(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcagent_suite::suite_by_id;
    use bcagent_transport::MockStream;

    #[test]
    fn round_trips_the_literal_scenario() {
        let suite = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let secret = [0u8; 32];
        let payload = b"This is a test.";

        let mut sock = MockStream::new();
        write_authed(&mut sock, 12345, payload, suite.as_ref(), &secret).unwrap();

        let mut reader = MockStream::new();
        reader.push_inbound(sock.outbound());
        let got = read_authed(&mut reader, 12345, suite.as_ref(), &secret).unwrap();
        assert_eq!(got, payload);
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let suite = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let secret = [0u8; 32];
        let payload = b"This is a test.";

        let mut sock = MockStream::new();
        write_authed(&mut sock, 12345, payload, suite.as_ref(), &secret).unwrap();
        let wire_bytes = sock.outbound().to_vec();

        for byte_idx in 0..wire_bytes.len() {
            for bit in 0..8u8 {
                let mut flipped = wire_bytes.clone();
                flipped[byte_idx] ^= 1 << bit;

                let mut reader = MockStream::new();
                reader.push_inbound(&flipped);
                let result = read_authed(&mut reader, 12345, suite.as_ref(), &secret);
                assert!(result.is_err(), "bit flip at byte {} bit {} was accepted", byte_idx, bit);
            }
        }
    }

    #[test]
    fn wrong_iv_fails_authentication() {
        let suite = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let secret = [3u8; 32];
        let payload = b"offset-bound payload";

        let mut sock = MockStream::new();
        write_authed(&mut sock, 1, payload, suite.as_ref(), &secret).unwrap();

        let mut reader = MockStream::new();
        reader.push_inbound(sock.outbound());
        let result = read_authed(&mut reader, 2, suite.as_ref(), &secret);
        assert!(result.is_err());
    }

    #[test]
    fn oversized_payload_is_rejected_before_reading_it() {
        let suite = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let secret = [9u8; 32];

        // Claim a payload far larger than what's actually queued; if the
        // implementation tried to read that many bytes it would error on
        // a short read instead of the size check, so this also pins down
        // that the size check happens first.
        let mut cipher = suite.new_stream_cipher(&secret, 99);
        let mut header = [0u8; 8];
        BigEndian::write_u32(&mut header[0..4], AUTHED_PACKET_TYPE);
        BigEndian::write_u32(&mut header[4..8], (MAX_PAYLOAD_SIZE + 1) as u32);
        cipher.apply_keystream(&mut header);

        let mut sock = MockStream::new();
        sock.push_inbound(&header);
        sock.push_inbound(&vec![0u8; suite.mac_size()]);

        let result = read_authed(&mut sock, 99, suite.as_ref(), &secret);
        assert!(matches!(result, Err(Error::UnauthorizedPacket)));
    }

    #[test]
    fn legacy_ceiling_rejects_payloads_above_ten_mib() {
        let suite = suite_by_id(bcagent_suite::SUITE_DEMO).unwrap();
        let secret = [5u8; 32];

        let mut cipher = suite.new_stream_cipher(&secret, 1);
        let mut header = [0u8; 8];
        BigEndian::write_u32(&mut header[0..4], AUTHED_PACKET_TYPE);
        BigEndian::write_u32(&mut header[4..8], (LEGACY_MAX_PAYLOAD_SIZE + 1) as u32);
        cipher.apply_keystream(&mut header);

        let mut sock = MockStream::new();
        sock.push_inbound(&header);
        sock.push_inbound(&vec![0u8; suite.mac_size()]);

        let result = read_authed_with_options(
            &mut sock,
            1,
            suite.as_ref(),
            &secret,
            &FramingOptions::with_legacy_ceiling(),
        );
        assert!(matches!(result, Err(Error::UnauthorizedPacket)));
    }
}
