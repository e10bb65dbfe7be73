//! Entity certificate parsing.
//!
//! A certificate is an opaque byte sequence carrying a handful of
//! short-tagged fields: a 2-byte big-endian tag, a 2-byte big-endian
//! length, then the field value. [`PublicCert::decode`] and
//! [`PrivateCert::decode`] look fields up by tag, check each one
//! against the sizes the crypto suite fixes, and own a single
//! allocation carrying the UUID and key buffers. The field tags are an
//! internal detail of this parser, not a public wire contract -- no
//! caller needs their numeric values.

use byteorder::{BigEndian, ByteOrder};
use zeroize::Zeroize;

use bcagent_error::{Error, Result};
use bcagent_suite::CryptoSuite;

const TAG_ARTIFACT_ID: u16 = 0x0001;
const TAG_PUBLIC_ENCRYPTION_KEY: u16 = 0x0002;
const TAG_PUBLIC_SIGNING_KEY: u16 = 0x0003;
const TAG_PRIVATE_ENCRYPTION_KEY: u16 = 0x0004;
const TAG_PRIVATE_SIGNING_KEY: u16 = 0x0005;

const ARTIFACT_ID_SIZE: usize = 16;

/// Scan `buffer` for the first field tagged `tag`, returning its value.
fn find_field(buffer: &[u8], tag: u16) -> Result<&[u8]> {
    let mut offset = 0;
    while offset + 4 <= buffer.len() {
        let field_tag = BigEndian::read_u16(&buffer[offset..offset + 2]);
        let field_len = BigEndian::read_u16(&buffer[offset + 2..offset + 4]) as usize;
        let value_start = offset + 4;
        let value_end = value_start
            .checked_add(field_len)
            .ok_or_else(|| Error::UnexpectedPayloadSize("certificate field length overflow".into()))?;
        if value_end > buffer.len() {
            return Err(Error::UnexpectedPayloadSize(
                "certificate field runs past end of buffer".into(),
            ));
        }

        if field_tag == tag {
            return Ok(&buffer[value_start..value_end]);
        }

        offset = value_end;
    }

    Err(Error::UnexpectedValue(format!(
        "certificate is missing field tag {:#06x}",
        tag
    )))
}

fn find_field_with_size(buffer: &[u8], tag: u16, expected_size: usize) -> Result<Vec<u8>> {
    let value = find_field(buffer, tag)?;
    if value.len() != expected_size {
        return Err(Error::UnexpectedPayloadSize(format!(
            "certificate field {:#06x} is {} bytes, expected {}",
            tag,
            value.len(),
            expected_size
        )));
    }
    Ok(value.to_vec())
}

/// The public half of an entity certificate: an artifact identity and
/// the two public keys the protocol's handshake and request/response
/// codec need.
#[derive(Debug, Clone)]
pub struct PublicCert {
    artifact_id: [u8; ARTIFACT_ID_SIZE],
    public_encryption_key: Vec<u8>,
    public_signing_key: Vec<u8>,
}

impl PublicCert {
    /// Decode a public certificate from its wire bytes.
    pub fn decode(buffer: &[u8], suite: &dyn CryptoSuite) -> Result<Self> {
        let artifact_id_bytes = find_field_with_size(buffer, TAG_ARTIFACT_ID, ARTIFACT_ID_SIZE)?;
        let public_encryption_key =
            find_field_with_size(buffer, TAG_PUBLIC_ENCRYPTION_KEY, suite.pubkey_size())?;
        let public_signing_key =
            find_field_with_size(buffer, TAG_PUBLIC_SIGNING_KEY, suite.sign_pubkey_size())?;

        let mut artifact_id = [0u8; ARTIFACT_ID_SIZE];
        artifact_id.copy_from_slice(&artifact_id_bytes);

        Ok(PublicCert {
            artifact_id,
            public_encryption_key,
            public_signing_key,
        })
    }

    pub fn artifact_id(&self) -> &[u8; ARTIFACT_ID_SIZE] {
        &self.artifact_id
    }

    pub fn public_encryption_key(&self) -> &[u8] {
        &self.public_encryption_key
    }

    pub fn public_signing_key(&self) -> &[u8] {
        &self.public_signing_key
    }
}

/// An entity private certificate: the public certificate fields plus
/// the two private keys. Both private keys are zeroized when the value
/// is dropped.
#[derive(Debug, Clone, Zeroize)]
#[zeroize(drop)]
pub struct PrivateCert {
    #[zeroize(skip)]
    public: PublicCert,
    private_encryption_key: Vec<u8>,
    private_signing_key: Vec<u8>,
}

impl PrivateCert {
    /// Decode a private certificate from its wire bytes.
    pub fn decode(buffer: &[u8], suite: &dyn CryptoSuite) -> Result<Self> {
        let public = PublicCert::decode(buffer, suite)?;
        let private_encryption_key =
            find_field_with_size(buffer, TAG_PRIVATE_ENCRYPTION_KEY, suite.privkey_size())?;
        let private_signing_key =
            find_field_with_size(buffer, TAG_PRIVATE_SIGNING_KEY, suite.sign_privkey_size())?;

        Ok(PrivateCert {
            public,
            private_encryption_key,
            private_signing_key,
        })
    }

    /// Borrow the embedded public-cert fields.
    pub fn public_cert(&self) -> &PublicCert {
        &self.public
    }

    pub fn private_encryption_key(&self) -> &[u8] {
        &self.private_encryption_key
    }

    pub fn private_signing_key(&self) -> &[u8] {
        &self.private_signing_key
    }
}
