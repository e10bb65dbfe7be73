//! Request encode/decode: one `encode_req_X`/`decode_req_X` pair per
//! fixed-schema request id (the handshake messages and the
//! extended-API family are handled by [`crate::handshake`] and
//! [`crate::extended_api`] respectively).
//!
//! Every encoder allocates a buffer of exactly `8 + body_size` bytes:
//! the big-endian request id, the big-endian offset, then the body.
//! Every decoder is strict: a payload shorter than the fixed minimum
//! for its request id is rejected with *unexpected-payload-size*.

use bcagent_error::{Error, Result};

use crate::codec::{push_u32, push_u64, push_uuid, Reader};
use crate::ids::*;

fn encode_header(request_id: u32, offset: u32, body_len: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + body_len);
    push_u32(&mut buf, request_id);
    push_u32(&mut buf, offset);
    buf
}

fn decode_header(payload: &[u8], expected_request_id: u32) -> Result<(u32, Reader)> {
    let mut r = Reader::new(payload);
    let request_id = r.read_u32()?;
    if request_id != expected_request_id {
        return Err(Error::UnexpectedValue(format!(
            "expected request id {:#010x}, got {:#010x}",
            expected_request_id, request_id
        )));
    }
    let offset = r.read_u32()?;
    Ok((offset, r))
}

/// A request with no body: just the request id and offset. Covers
/// `latest_block_id_get`, `assert_latest_block_id_cancel`,
/// `extended_api_enable`, `status_get`, and `close`.
pub fn encode_empty_req(request_id: u32, offset: u32) -> Vec<u8> {
    encode_header(request_id, offset, 0)
}

/// Decode an empty-body request, returning its offset.
pub fn decode_empty_req(payload: &[u8], expected_request_id: u32) -> Result<u32> {
    let (offset, _r) = decode_header(payload, expected_request_id)?;
    Ok(offset)
}

/// A request whose entire body is a single 16-byte UUID. Covers
/// `block_by_id_get`, `block_id_get_next`, `block_id_get_prev`,
/// `transaction_by_id_get`, `transaction_id_get_next`,
/// `transaction_id_get_prev`, `transaction_id_get_block_id`,
/// `artifact_first_txn`, `artifact_last_txn`, and
/// `assert_latest_block_id`.
pub fn encode_uuid_req(request_id: u32, offset: u32, id: &Uuid) -> Vec<u8> {
    let mut buf = encode_header(request_id, offset, 16);
    push_uuid(&mut buf, id);
    buf
}

pub fn decode_uuid_req(payload: &[u8], expected_request_id: u32) -> Result<(u32, Uuid)> {
    let (offset, mut r) = decode_header(payload, expected_request_id)?;
    let id = r.read_uuid()?;
    Ok((offset, id))
}

/// `block_id_by_height_get` request body: a single `u64` block height.
pub fn encode_req_block_id_by_height_get(offset: u32, block_height: u64) -> Vec<u8> {
    let mut buf = encode_header(REQ_ID_BLOCK_ID_BY_HEIGHT_GET, offset, 8);
    push_u64(&mut buf, block_height);
    buf
}

pub fn decode_req_block_id_by_height_get(payload: &[u8]) -> Result<(u32, u64)> {
    let (offset, mut r) = decode_header(payload, REQ_ID_BLOCK_ID_BY_HEIGHT_GET)?;
    let height = r.read_u64()?;
    Ok((offset, height))
}

/// `transaction_submit` request body: `txn_uuid | artifact_uuid |
/// cert_bytes…` (the certificate occupies the remainder of the
/// payload).
pub fn encode_req_transaction_submit(offset: u32, txn_uuid: &Uuid, artifact_uuid: &Uuid, cert_bytes: &[u8]) -> Vec<u8> {
    let mut buf = encode_header(REQ_ID_TRANSACTION_SUBMIT, offset, 32 + cert_bytes.len());
    push_uuid(&mut buf, txn_uuid);
    push_uuid(&mut buf, artifact_uuid);
    buf.extend_from_slice(cert_bytes);
    buf
}

pub struct TransactionSubmitReq {
    pub offset: u32,
    pub txn_uuid: Uuid,
    pub artifact_uuid: Uuid,
    pub cert_bytes: Vec<u8>,
}

pub fn decode_req_transaction_submit(payload: &[u8]) -> Result<TransactionSubmitReq> {
    let (offset, mut r) = decode_header(payload, REQ_ID_TRANSACTION_SUBMIT)?;
    let txn_uuid = r.read_uuid()?;
    let artifact_uuid = r.read_uuid()?;
    let cert_bytes = r.rest().to_vec();
    Ok(TransactionSubmitReq {
        offset,
        txn_uuid,
        artifact_uuid,
        cert_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_block_id_get_matches_the_literal_scenario() {
        let encoded = encode_empty_req(REQ_ID_LATEST_BLOCK_ID_GET, 0x0000_004C);
        assert_eq!(encoded, hex_literal::hex!("00 00 00 02 00 00 00 4C"));

        let offset = decode_empty_req(&encoded, REQ_ID_LATEST_BLOCK_ID_GET).unwrap();
        assert_eq!(offset, 0x0000_004C);
    }

    #[test]
    fn transaction_submit_round_trips_the_literal_scenario() {
        let txn_uuid = hex_literal::hex!("1f 8c 34 1c 63 e2 46 90 ba 45 9a 35 d4 ec bc 3c");
        let artifact_uuid = hex_literal::hex!("ce 25 a1 53 b9 4d 46 cf ab 18 c2 57 5c 8c 69 13");
        let cert = hex_literal::hex!("03 04 05 06");

        let encoded = encode_req_transaction_submit(0x0000_0061, &txn_uuid, &artifact_uuid, &cert);

        let decoded = decode_req_transaction_submit(&encoded).unwrap();
        assert_eq!(decoded.offset, 0x0000_0061);
        assert_eq!(decoded.txn_uuid, txn_uuid);
        assert_eq!(decoded.artifact_uuid, artifact_uuid);
        assert_eq!(decoded.cert_bytes, cert);
    }

    #[test]
    fn block_id_by_height_get_round_trips() {
        let encoded = encode_req_block_id_by_height_get(5, 11);
        let (offset, height) = decode_req_block_id_by_height_get(&encoded).unwrap();
        assert_eq!(offset, 5);
        assert_eq!(height, 11);
    }

    #[test]
    fn uuid_req_round_trips_for_every_uuid_request_id() {
        let id = [0x42u8; 16];
        for &request_id in &[
            REQ_ID_BLOCK_BY_ID_GET,
            REQ_ID_BLOCK_ID_GET_NEXT,
            REQ_ID_BLOCK_ID_GET_PREV,
            REQ_ID_TRANSACTION_BY_ID_GET,
            REQ_ID_TRANSACTION_ID_GET_NEXT,
            REQ_ID_TRANSACTION_ID_GET_PREV,
            REQ_ID_TRANSACTION_ID_GET_BLOCK_ID,
            REQ_ID_ARTIFACT_FIRST_TXN,
            REQ_ID_ARTIFACT_LAST_TXN,
            REQ_ID_ASSERT_LATEST_BLOCK_ID,
        ] {
            let encoded = encode_uuid_req(request_id, 3, &id);
            let (offset, decoded_id) = decode_uuid_req(&encoded, request_id).unwrap();
            assert_eq!(offset, 3);
            assert_eq!(decoded_id, id);
        }
    }

    #[test]
    fn short_payload_is_rejected_not_panicking() {
        let result = decode_uuid_req(&[0, 0, 0, 4, 0, 0, 0, 1, 9, 9], REQ_ID_BLOCK_BY_ID_GET);
        assert!(matches!(result, Err(Error::UnexpectedPayloadSize(_))));
    }

    #[test]
    fn wrong_request_id_is_rejected() {
        let encoded = encode_uuid_req(REQ_ID_BLOCK_BY_ID_GET, 1, &[0u8; 16]);
        let result = decode_uuid_req(&encoded, REQ_ID_BLOCK_ID_GET_NEXT);
        assert!(matches!(result, Err(Error::UnexpectedValue(_))));
    }
}
