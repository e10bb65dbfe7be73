//! Response encode/decode: the generic `(request_id, status, offset)`
//! header plus the per-message body codecs.
//!
//! The generic header is decodable from any payload of at least 12
//! bytes without allocating -- [`decode_resp_header`] returns plain
//! `u32`s, nothing else. A response body should only be decoded when
//! `status == 0`; otherwise the caller treats the payload as
//! header-only.

use bcagent_error::Result;

use crate::codec::{push_u32, push_u64, push_uuid, Reader};
use crate::ids::*;

/// The generic response header: `(request_id, status, offset)` -- note
/// the field order differs from the request header (`request_id,
/// offset`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespHeader {
    pub request_id: u32,
    pub status: u32,
    pub offset: u32,
}

/// Decode the generic response header from the front of `payload`.
/// Never allocates. Fails with *unexpected-payload-size* if `payload`
/// is shorter than 12 bytes.
pub fn decode_resp_header(payload: &[u8]) -> Result<RespHeader> {
    let mut r = Reader::new(payload);
    let request_id = r.read_u32()?;
    let status = r.read_u32()?;
    let offset = r.read_u32()?;
    Ok(RespHeader {
        request_id,
        status,
        offset,
    })
}

fn encode_header(request_id: u32, status: u32, offset: u32, body_len: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12 + body_len);
    push_u32(&mut buf, request_id);
    push_u32(&mut buf, status);
    push_u32(&mut buf, offset);
    buf
}

/// A response with no body: just the generic header. Covers
/// `transaction_submit`, `assert_latest_block_id`,
/// `assert_latest_block_id_cancel`, `extended_api_enable`, and
/// `close`.
pub fn encode_empty_resp(request_id: u32, status: u32, offset: u32) -> Vec<u8> {
    encode_header(request_id, status, offset, 0)
}

/// A response whose entire body (when `status == 0`) is a single
/// 16-byte UUID. Covers `latest_block_id_get`, `block_id_get_next`,
/// `block_id_get_prev`, `block_id_by_height_get`,
/// `transaction_id_get_next`, `transaction_id_get_prev`,
/// `transaction_id_get_block_id`, `artifact_first_txn`, and
/// `artifact_last_txn`.
pub fn encode_uuid_resp(request_id: u32, status: u32, offset: u32, id: &Uuid) -> Vec<u8> {
    let mut buf = encode_header(request_id, status, offset, 16);
    push_uuid(&mut buf, id);
    buf
}

pub fn decode_uuid_resp(payload: &[u8]) -> Result<(RespHeader, Uuid)> {
    let header = decode_resp_header(payload)?;
    let mut r = Reader::new(payload);
    r.skip(12)?;
    let id = r.read_uuid()?;
    Ok((header, id))
}

/// `status_get` response body: a single `u32` describing agent
/// liveness (distinct from the header's own `status`, which reports
/// this *request's* success/failure).
pub fn encode_resp_status_get(offset: u32, status: u32, agent_status: u32) -> Vec<u8> {
    let mut buf = encode_header(REQ_ID_STATUS_GET, status, offset, 4);
    push_u32(&mut buf, agent_status);
    buf
}

pub fn decode_resp_status_get(payload: &[u8]) -> Result<(RespHeader, u32)> {
    let header = decode_resp_header(payload)?;
    let mut r = Reader::new(payload);
    r.skip(12)?;
    let agent_status = r.read_u32()?;
    Ok((header, agent_status))
}

/// Block-get response body: `block_uuid | prev_block_uuid |
/// next_block_uuid | first_txn_uuid | block_height | cert_bytes…`,
/// with the certificate's length carried explicitly since it's
/// followed by nothing else in the payload.
pub struct BlockGetResp {
    pub header: RespHeader,
    pub block_uuid: Uuid,
    pub prev_block_uuid: Uuid,
    pub next_block_uuid: Uuid,
    pub first_txn_uuid: Uuid,
    pub block_height: u64,
    pub cert_bytes: Vec<u8>,
}

pub fn encode_resp_block_by_id_get(
    status: u32,
    offset: u32,
    block_uuid: &Uuid,
    prev_block_uuid: &Uuid,
    next_block_uuid: &Uuid,
    first_txn_uuid: &Uuid,
    block_height: u64,
    cert_bytes: &[u8],
) -> Vec<u8> {
    let body_len = 16 * 4 + 8 + 8 + cert_bytes.len();
    let mut buf = encode_header(REQ_ID_BLOCK_BY_ID_GET, status, offset, body_len);
    push_uuid(&mut buf, block_uuid);
    push_uuid(&mut buf, prev_block_uuid);
    push_uuid(&mut buf, next_block_uuid);
    push_uuid(&mut buf, first_txn_uuid);
    push_u64(&mut buf, block_height);
    push_u64(&mut buf, cert_bytes.len() as u64);
    buf.extend_from_slice(cert_bytes);
    buf
}

pub fn decode_resp_block_by_id_get(payload: &[u8]) -> Result<BlockGetResp> {
    let header = decode_resp_header(payload)?;
    let mut r = Reader::new(payload);
    r.skip(12)?;
    let block_uuid = r.read_uuid()?;
    let prev_block_uuid = r.read_uuid()?;
    let next_block_uuid = r.read_uuid()?;
    let first_txn_uuid = r.read_uuid()?;
    let block_height = r.read_u64()?;
    let cert_size = r.read_u64()? as usize;
    let cert_bytes = crate::codec::read_sized_tail(&mut r, cert_size)?;
    Ok(BlockGetResp {
        header,
        block_uuid,
        prev_block_uuid,
        next_block_uuid,
        first_txn_uuid,
        block_height,
        cert_bytes,
    })
}

/// Transaction-get response body: `txn_uuid | prev_txn_uuid |
/// next_txn_uuid | artifact_uuid | block_uuid | txn_state |
/// cert_bytes…`.
pub struct TransactionGetResp {
    pub header: RespHeader,
    pub txn_uuid: Uuid,
    pub prev_txn_uuid: Uuid,
    pub next_txn_uuid: Uuid,
    pub artifact_uuid: Uuid,
    pub block_uuid: Uuid,
    pub txn_state: u32,
    pub cert_bytes: Vec<u8>,
}

pub fn encode_resp_transaction_by_id_get(
    status: u32,
    offset: u32,
    txn_uuid: &Uuid,
    prev_txn_uuid: &Uuid,
    next_txn_uuid: &Uuid,
    artifact_uuid: &Uuid,
    block_uuid: &Uuid,
    txn_state: u32,
    cert_bytes: &[u8],
) -> Vec<u8> {
    let body_len = 16 * 5 + 8 + 4 + cert_bytes.len();
    let mut buf = encode_header(REQ_ID_TRANSACTION_BY_ID_GET, status, offset, body_len);
    push_uuid(&mut buf, txn_uuid);
    push_uuid(&mut buf, prev_txn_uuid);
    push_uuid(&mut buf, next_txn_uuid);
    push_uuid(&mut buf, artifact_uuid);
    push_uuid(&mut buf, block_uuid);
    push_u64(&mut buf, cert_bytes.len() as u64);
    push_u32(&mut buf, txn_state);
    buf.extend_from_slice(cert_bytes);
    buf
}

pub fn decode_resp_transaction_by_id_get(payload: &[u8]) -> Result<TransactionGetResp> {
    let header = decode_resp_header(payload)?;
    let mut r = Reader::new(payload);
    r.skip(12)?;
    let txn_uuid = r.read_uuid()?;
    let prev_txn_uuid = r.read_uuid()?;
    let next_txn_uuid = r.read_uuid()?;
    let artifact_uuid = r.read_uuid()?;
    let block_uuid = r.read_uuid()?;
    let cert_size = r.read_u64()? as usize;
    let txn_state = r.read_u32()?;
    let cert_bytes = crate::codec::read_sized_tail(&mut r, cert_size)?;
    Ok(TransactionGetResp {
        header,
        txn_uuid,
        prev_txn_uuid,
        next_txn_uuid,
        artifact_uuid,
        block_uuid,
        txn_state,
        cert_bytes,
    })
}
