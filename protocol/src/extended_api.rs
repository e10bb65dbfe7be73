//! Extended-API request family: the forwarding mechanism a client uses to
//! register as a provider for a third-party verb, have requests for that
//! verb routed to it by the agent, and send the verb's response back.
//!
//! Three messages ride this mechanism:
//! - `extended_api_enable` -- a client opts in to receiving forwarded
//!   requests. Generic header only, no body.
//! - `extended_api_sendrecv` -- a client asks the agent to forward a verb
//!   request to an entity. Ordinary 32-bit-offset request header.
//! - `extended_api_clientreq` -- the agent's notification to a provider
//!   that a client has a pending request for one of its verbs. Carries a
//!   64-bit offset instead of the ordinary 32-bit one (see spec §3: "those
//!   offsets are single-use tokens chosen by the server").
//! - `extended_api_sendresp` -- the provider's reply, carried back to the
//!   agent under the 64-bit offset the `clientreq` notification handed it.
//!   Field order is `request_id, offset, status, body` -- note `status`
//!   sits where a request would have nothing, because this message is
//!   simultaneously "the response to the forwarded verb" and "a request to
//!   the agent to deliver it".

use bcagent_error::{Error, Result};

use crate::codec::{push_u32, push_u64, push_uuid, Reader};
use crate::ids::*;
use crate::request::{decode_empty_req, encode_empty_req};
use crate::response::RespHeader;

/// A client opts in to receiving forwarded extended-API requests. No body
/// beyond the generic header.
pub fn encode_req_extended_api_enable(offset: u32) -> Vec<u8> {
    encode_empty_req(REQ_ID_EXTENDED_API_ENABLE, offset)
}

pub fn decode_req_extended_api_enable(payload: &[u8]) -> Result<u32> {
    decode_empty_req(payload, REQ_ID_EXTENDED_API_ENABLE)
}

/// `extended_api_sendrecv` request body: `entity_uuid | verb_uuid |
/// request_body…`, the remainder of the payload carrying the opaque
/// verb-specific request.
pub struct ExtendedApiSendRecvReq {
    pub offset: u32,
    pub entity_uuid: Uuid,
    pub verb_uuid: Uuid,
    pub request_body: Vec<u8>,
}

pub fn encode_req_extended_api_sendrecv(
    offset: u32,
    entity_uuid: &Uuid,
    verb_uuid: &Uuid,
    request_body: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + 32 + request_body.len());
    push_u32(&mut buf, REQ_ID_EXTENDED_API_SENDRECV);
    push_u32(&mut buf, offset);
    push_uuid(&mut buf, entity_uuid);
    push_uuid(&mut buf, verb_uuid);
    buf.extend_from_slice(request_body);
    buf
}

pub fn decode_req_extended_api_sendrecv(payload: &[u8]) -> Result<ExtendedApiSendRecvReq> {
    let mut r = Reader::new(payload);
    let request_id = r.read_u32()?;
    if request_id != REQ_ID_EXTENDED_API_SENDRECV {
        return Err(Error::UnexpectedValue(format!(
            "expected request id {:#010x}, got {:#010x}",
            REQ_ID_EXTENDED_API_SENDRECV, request_id
        )));
    }
    let offset = r.read_u32()?;
    let entity_uuid = r.read_uuid()?;
    let verb_uuid = r.read_uuid()?;
    let request_body = r.rest().to_vec();
    Ok(ExtendedApiSendRecvReq {
        offset,
        entity_uuid,
        verb_uuid,
        request_body,
    })
}

/// The eventual response to an `extended_api_sendrecv` request, delivered
/// back to the original asker once the provider's reply has been
/// collected. The body is opaque -- the verb's own response bytes,
/// untouched by this layer.
pub fn encode_resp_extended_api_sendrecv(status: u32, offset: u32, response_body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12 + response_body.len());
    push_u32(&mut buf, REQ_ID_EXTENDED_API_SENDRECV);
    push_u32(&mut buf, status);
    push_u32(&mut buf, offset);
    buf.extend_from_slice(response_body);
    buf
}

pub fn decode_resp_extended_api_sendrecv(payload: &[u8]) -> Result<(RespHeader, Vec<u8>)> {
    let header = crate::response::decode_resp_header(payload)?;
    let mut r = Reader::new(payload);
    r.skip(12)?;
    Ok((header, r.rest().to_vec()))
}

/// `extended_api_clientreq`: the agent's notification to a provider that
/// a client has a pending request for one of its verbs. `offset` is a
/// single-use 64-bit token the provider echoes back in its
/// `extended_api_sendresp`.
pub struct ExtendedApiClientReq {
    pub offset: u64,
    pub client_uuid: Uuid,
    pub verb_uuid: Uuid,
    pub client_enc_pubkey: Vec<u8>,
    pub client_sign_pubkey: Vec<u8>,
    pub request_body: Vec<u8>,
}

pub fn encode_notif_extended_api_clientreq(
    offset: u64,
    client_uuid: &Uuid,
    verb_uuid: &Uuid,
    client_enc_pubkey: &[u8],
    client_sign_pubkey: &[u8],
    request_body: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(
        4 + 8 + 4 + 4 + 32 + client_enc_pubkey.len() + client_sign_pubkey.len() + request_body.len(),
    );
    push_u32(&mut buf, REQ_ID_EXTENDED_API_CLIENTREQ);
    push_u64(&mut buf, offset);
    push_u32(&mut buf, client_enc_pubkey.len() as u32);
    push_u32(&mut buf, client_sign_pubkey.len() as u32);
    push_uuid(&mut buf, client_uuid);
    push_uuid(&mut buf, verb_uuid);
    buf.extend_from_slice(client_enc_pubkey);
    buf.extend_from_slice(client_sign_pubkey);
    buf.extend_from_slice(request_body);
    buf
}

pub fn decode_notif_extended_api_clientreq(payload: &[u8]) -> Result<ExtendedApiClientReq> {
    let mut r = Reader::new(payload);
    let request_id = r.read_u32()?;
    if request_id != REQ_ID_EXTENDED_API_CLIENTREQ {
        return Err(Error::UnexpectedValue(format!(
            "expected request id {:#010x}, got {:#010x}",
            REQ_ID_EXTENDED_API_CLIENTREQ, request_id
        )));
    }
    let offset = r.read_u64()?;
    let enc_pubkey_size = r.read_u32()? as usize;
    let sign_pubkey_size = r.read_u32()? as usize;
    let client_uuid = r.read_uuid()?;
    let verb_uuid = r.read_uuid()?;
    let client_enc_pubkey = r.take_vec(enc_pubkey_size)?;
    let client_sign_pubkey = r.take_vec(sign_pubkey_size)?;
    let request_body = r.rest().to_vec();
    Ok(ExtendedApiClientReq {
        offset,
        client_uuid,
        verb_uuid,
        client_enc_pubkey,
        client_sign_pubkey,
        request_body,
    })
}

/// `extended_api_sendresp`: the provider's reply to a forwarded request,
/// echoing the 64-bit offset the `clientreq` notification handed it.
/// Field order is `request_id, offset, status, body` -- distinct from
/// both the ordinary request header (`request_id, offset`) and the
/// ordinary response header (`request_id, status, offset`).
pub fn encode_req_extended_api_sendresp(offset: u64, status: u32, response_body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + response_body.len());
    push_u32(&mut buf, REQ_ID_EXTENDED_API_SENDRESP);
    push_u64(&mut buf, offset);
    push_u32(&mut buf, status);
    buf.extend_from_slice(response_body);
    buf
}

pub struct ExtendedApiSendRespReq {
    pub offset: u64,
    pub status: u32,
    pub response_body: Vec<u8>,
}

pub fn decode_req_extended_api_sendresp(payload: &[u8]) -> Result<ExtendedApiSendRespReq> {
    let mut r = Reader::new(payload);
    let request_id = r.read_u32()?;
    if request_id != REQ_ID_EXTENDED_API_SENDRESP {
        return Err(Error::UnexpectedValue(format!(
            "expected request id {:#010x}, got {:#010x}",
            REQ_ID_EXTENDED_API_SENDRESP, request_id
        )));
    }
    let offset = r.read_u64()?;
    let status = r.read_u32()?;
    let response_body = r.rest().to_vec();
    Ok(ExtendedApiSendRespReq {
        offset,
        status,
        response_body,
    })
}
