//! Request-id and protocol-version constants.

/// A raw 16-byte UUID, as every artifact/block/transaction/entity
/// identifier on this wire is carried.
pub type Uuid = [u8; 16];

pub const REQ_ID_HANDSHAKE_INITIATE: u32 = 0x0000_0000;
pub const REQ_ID_HANDSHAKE_ACKNOWLEDGE: u32 = 0x0000_0001;
pub const REQ_ID_LATEST_BLOCK_ID_GET: u32 = 0x0000_0002;
pub const REQ_ID_TRANSACTION_SUBMIT: u32 = 0x0000_0003;
pub const REQ_ID_BLOCK_BY_ID_GET: u32 = 0x0000_0004;
pub const REQ_ID_BLOCK_ID_GET_NEXT: u32 = 0x0000_0005;
pub const REQ_ID_BLOCK_ID_GET_PREV: u32 = 0x0000_0006;
pub const REQ_ID_BLOCK_ID_BY_HEIGHT_GET: u32 = 0x0000_0007;

pub const REQ_ID_TRANSACTION_BY_ID_GET: u32 = 0x0000_0010;
pub const REQ_ID_TRANSACTION_ID_GET_NEXT: u32 = 0x0000_0011;
pub const REQ_ID_TRANSACTION_ID_GET_PREV: u32 = 0x0000_0012;
pub const REQ_ID_TRANSACTION_ID_GET_BLOCK_ID: u32 = 0x0000_0013;

pub const REQ_ID_ARTIFACT_FIRST_TXN: u32 = 0x0000_0020;
pub const REQ_ID_ARTIFACT_LAST_TXN: u32 = 0x0000_0021;

pub const REQ_ID_ASSERT_LATEST_BLOCK_ID: u32 = 0x0000_0030;
pub const REQ_ID_ASSERT_LATEST_BLOCK_ID_CANCEL: u32 = 0x0000_0031;

/// Extended-API family. The original source names these
/// `PROTOCOL_REQ_ID_EXTENDED_API_*` but does not fix their numeric
/// values in the retrieved headers; this crate places them in the
/// next open gap in the id space (see DESIGN.md).
pub const REQ_ID_EXTENDED_API_ENABLE: u32 = 0x0000_0040;
pub const REQ_ID_EXTENDED_API_SENDRECV: u32 = 0x0000_0041;
pub const REQ_ID_EXTENDED_API_SENDRESP: u32 = 0x0000_0042;
pub const REQ_ID_EXTENDED_API_CLIENTREQ: u32 = 0x0000_0043;

pub const REQ_ID_STATUS_GET: u32 = 0x0000_A000;
pub const REQ_ID_CLOSE: u32 = 0x0000_FFFF;

/// The only protocol version this crate speaks.
pub const PROTOCOL_VERSION_DEMO: u32 = 0x0000_0001;

/// Reserved for a future forward-secrecy handshake; rejected today.
pub const PROTOCOL_VERSION_FORWARD_SECRECY_RESERVED: u32 = 0x0000_0002;
