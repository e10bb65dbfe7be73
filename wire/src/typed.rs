//! Typed framing: unauthenticated, length-prefixed typed records used
//! only during the unauthenticated portion of the handshake and in
//! low-level utility paths. Every record starts with a 4-byte big-endian
//! type tag and a 4-byte big-endian length, then the payload.
//!
//! Tag values match the closed set the server also reads, so a wire
//! capture from either side is self-describing.

use byteorder::{BigEndian, ByteOrder};

use bcagent_error::{Error, Result};
use bcagent_transport::ByteStream;

/// The closed set of typed-record tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TypedTag {
    Bom = 0x0000_0000,
    Int64 = 0x0000_0010,
    Uint64 = 0x0000_0011,
    Int32 = 0x0000_0012,
    Uint32 = 0x0000_0013,
    Int16 = 0x0000_0014,
    Uint16 = 0x0000_0015,
    Int8 = 0x0000_0016,
    Uint8 = 0x0000_0017,
    Bool = 0x0000_0018,
    String = 0x0000_0020,
    Data = 0x0000_0022,
    /// The only tag the authenticated-framing layer ever writes or
    /// expects; see `AUTHED_PACKET_TYPE` in [`crate::authed`].
    AuthedPacket = 0x0000_0030,
    Eom = 0x0000_00FF,
}

impl TypedTag {
    fn from_u32(v: u32) -> Result<Self> {
        use TypedTag::*;
        Ok(match v {
            0x0000_0000 => Bom,
            0x0000_0010 => Int64,
            0x0000_0011 => Uint64,
            0x0000_0012 => Int32,
            0x0000_0013 => Uint32,
            0x0000_0014 => Int16,
            0x0000_0015 => Uint16,
            0x0000_0016 => Int8,
            0x0000_0017 => Uint8,
            0x0000_0018 => Bool,
            0x0000_0020 => String,
            0x0000_0022 => Data,
            0x0000_0030 => AuthedPacket,
            0x0000_00FF => Eom,
            other => {
                return Err(Error::UnexpectedValue(format!(
                    "unknown typed-record tag {:#010x}",
                    other
                )))
            }
        })
    }
}

fn write_typed_record(sock: &mut dyn ByteStream, tag: TypedTag, payload: &[u8]) -> Result<()> {
    let mut header = [0u8; 8];
    BigEndian::write_u32(&mut header[0..4], tag as u32);
    BigEndian::write_u32(&mut header[4..8], payload.len() as u32);

    sock.write_all(&header)?;
    sock.write_all(payload)?;
    Ok(())
}

fn read_typed_record(sock: &mut dyn ByteStream, expected: TypedTag) -> Result<Vec<u8>> {
    let mut header = [0u8; 8];
    sock.read_exact(&mut header)?;

    let tag = TypedTag::from_u32(BigEndian::read_u32(&header[0..4]))?;
    if tag != expected {
        return Err(Error::UnexpectedValue(format!(
            "expected typed tag {:?}, got {:?}",
            expected, tag
        )));
    }

    let size = BigEndian::read_u32(&header[4..8]) as usize;
    let mut payload = vec![0u8; size];
    sock.read_exact(&mut payload)?;
    Ok(payload)
}

/// Write an unauthenticated typed data record -- the form the handshake
/// uses to carry the Handshake-Initiate and Handshake-Response messages.
pub fn write_typed_data(sock: &mut dyn ByteStream, payload: &[u8]) -> Result<()> {
    write_typed_record(sock, TypedTag::Data, payload)
}

/// Read an unauthenticated typed data record.
pub fn read_typed_data(sock: &mut dyn ByteStream) -> Result<Vec<u8>> {
    read_typed_record(sock, TypedTag::Data)
}

/// Write an unauthenticated typed scalar/string record. `tag` must not be
/// [`TypedTag::Data`], [`TypedTag::AuthedPacket`], [`TypedTag::Bom`], or
/// [`TypedTag::Eom`] -- those have their own dedicated entry points.
pub fn write_typed_scalar(sock: &mut dyn ByteStream, tag: TypedTag, payload: &[u8]) -> Result<()> {
    write_typed_record(sock, tag, payload)
}

/// Read an unauthenticated typed scalar/string record, verifying the tag
/// matches `expected`.
pub fn read_typed_scalar(sock: &mut dyn ByteStream, expected: TypedTag) -> Result<Vec<u8>> {
    read_typed_record(sock, expected)
}
