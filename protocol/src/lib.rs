#![forbid(unsafe_code)]
//! Session state, handshake driver, and request/response codec for the
//! blockchain agent protocol.
//!
//! This crate owns everything in spec.md §3/§4.4–§4.7: the post-handshake
//! [`Session`], the client-side [`Handshake`] state machine, the
//! fixed-schema request/response codec, and the extended-API forwarding
//! family. Framing itself (`bcagent_wire`) and the crypto primitives
//! (`bcagent_suite`) live one layer down.

mod codec;
mod extended_api;
mod handshake;
mod ids;
mod request;
mod response;
mod session;

pub use extended_api::{
    decode_notif_extended_api_clientreq, decode_req_extended_api_enable,
    decode_req_extended_api_sendrecv, decode_req_extended_api_sendresp,
    decode_resp_extended_api_sendrecv, encode_notif_extended_api_clientreq,
    encode_req_extended_api_enable, encode_req_extended_api_sendrecv,
    encode_req_extended_api_sendresp, encode_resp_extended_api_sendrecv, ExtendedApiClientReq,
    ExtendedApiSendRecvReq, ExtendedApiSendRespReq,
};
pub use handshake::{Handshake, HandshakeOutcome};
pub use ids::*;
pub use request::{
    decode_empty_req, decode_req_block_id_by_height_get, decode_req_transaction_submit,
    decode_uuid_req, encode_empty_req, encode_req_block_id_by_height_get,
    encode_req_transaction_submit, encode_uuid_req, TransactionSubmitReq,
};
pub use response::{
    decode_resp_block_by_id_get, decode_resp_header, decode_resp_status_get,
    decode_resp_transaction_by_id_get, decode_uuid_resp, encode_empty_resp,
    encode_resp_block_by_id_get, encode_resp_status_get, encode_resp_transaction_by_id_get,
    encode_uuid_resp, BlockGetResp, RespHeader, TransactionGetResp,
};
pub use session::{Session, INITIAL_CLIENT_IV, INITIAL_SERVER_IV};
