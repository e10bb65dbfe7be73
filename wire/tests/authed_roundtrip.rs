//! Property-based coverage of the authenticated-framing round-trip and
//! tamper-detection guarantees from spec.md §8.

use bcagent_suite::{suite_by_id, CryptoSuite, StreamCipher, SUITE_DEMO};
use bcagent_transport::MockStream;
use bcagent_wire::{read_authed, write_authed};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `read_authed(write_authed(p, iv, S, secret), iv, S, secret) == p`
    /// for all payloads up to a few KiB (the 250 MiB ceiling itself is
    /// covered by a dedicated boundary test below; proptest-generated
    /// multi-megabyte vectors would make this suite too slow).
    #[test]
    fn write_then_read_reproduces_the_payload(
        secret in prop::collection::vec(any::<u8>(), 32),
        iv in any::<u64>(),
        payload in prop::collection::vec(any::<u8>(), 0..4096),
    ) {
        let suite = suite_by_id(SUITE_DEMO).unwrap();

        let mut sock = MockStream::new();
        write_authed(&mut sock, iv, &payload, suite.as_ref(), &secret).unwrap();

        let mut reader = MockStream::new();
        reader.push_inbound(sock.outbound());
        let got = read_authed(&mut reader, iv, suite.as_ref(), &secret).unwrap();

        prop_assert_eq!(got, payload);
    }

    /// A receiver using any IV other than the one the sender used must
    /// fail with an authentication error, never succeed.
    #[test]
    fn mismatched_iv_never_authenticates(
        secret in prop::collection::vec(any::<u8>(), 32),
        iv in 0u64..1_000_000,
        iv_offset in 1u64..1_000_000,
        payload in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let suite = suite_by_id(SUITE_DEMO).unwrap();

        let mut sock = MockStream::new();
        write_authed(&mut sock, iv, &payload, suite.as_ref(), &secret).unwrap();

        let mut reader = MockStream::new();
        reader.push_inbound(sock.outbound());
        let result = read_authed(&mut reader, iv.wrapping_add(iv_offset), suite.as_ref(), &secret);

        prop_assert!(result.is_err());
    }

    /// Flipping a single bit anywhere in the on-wire packet must never
    /// produce a successful decode of the original payload.
    #[test]
    fn any_bit_flip_fails_or_changes_the_result(
        secret in prop::collection::vec(any::<u8>(), 32),
        iv in any::<u64>(),
        payload in prop::collection::vec(any::<u8>(), 1..128),
        byte_idx in 0usize..1000,
        bit in 0u8..8,
    ) {
        let suite = suite_by_id(SUITE_DEMO).unwrap();

        let mut sock = MockStream::new();
        write_authed(&mut sock, iv, &payload, suite.as_ref(), &secret).unwrap();
        let mut wire_bytes = sock.outbound().to_vec();

        let idx = byte_idx % wire_bytes.len();
        wire_bytes[idx] ^= 1 << bit;

        let mut reader = MockStream::new();
        reader.push_inbound(&wire_bytes);
        let result = read_authed(&mut reader, iv, suite.as_ref(), &secret);

        prop_assert!(result.is_err());
    }
}

#[test]
fn payload_at_exactly_the_250_mib_boundary_is_accepted() {
    let suite = suite_by_id(SUITE_DEMO).unwrap();
    let secret = [0u8; 32];
    let payload = vec![0xABu8; bcagent_wire::MAX_PAYLOAD_SIZE];

    let mut sock = MockStream::new();
    write_authed(&mut sock, 1, &payload, suite.as_ref(), &secret).unwrap();

    let mut reader = MockStream::new();
    reader.push_inbound(sock.outbound());
    let got = read_authed(&mut reader, 1, suite.as_ref(), &secret).unwrap();
    assert_eq!(got.len(), bcagent_wire::MAX_PAYLOAD_SIZE);
}

#[test]
fn payload_one_byte_past_the_250_mib_boundary_is_rejected() {
    use byteorder::{BigEndian, ByteOrder};

    let suite = suite_by_id(SUITE_DEMO).unwrap();
    let secret = [0u8; 32];

    // Hand-build a header claiming one byte over the ceiling; we don't
    // actually queue that much payload data because the size check must
    // reject before any further read is attempted.
    let mut cipher = suite.new_stream_cipher(&secret, 1);
    let mut header = [0u8; 8];
    BigEndian::write_u32(&mut header[0..4], 0x0000_0030);
    BigEndian::write_u32(&mut header[4..8], (bcagent_wire::MAX_PAYLOAD_SIZE + 1) as u32);
    cipher.apply_keystream(&mut header);

    let mut sock = MockStream::new();
    sock.push_inbound(&header);
    sock.push_inbound(&vec![0u8; suite.mac_size()]);

    let result = read_authed(&mut sock, 1, suite.as_ref(), &secret);
    assert!(result.is_err());
}
