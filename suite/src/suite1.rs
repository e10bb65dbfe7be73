//! Suite `0x0000_0001`: the one crypto suite this protocol version
//! defines. AES-256-CTR as the stream cipher, HMAC-SHA256 as the short
//! MAC, secp256k1 ECDH plus an HKDF ratchet as the short-term key
//! agreement primitive. Sizes: 32-byte shared secret / nonce / MAC tag,
//! 33-byte compressed public keys, 32-byte private keys.

use aes::Aes256;
use cipher::{KeyIvInit, StreamCipher as _};
use ctr::Ctr64BE;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::RngCore;
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use bcagent_error::{Error, Result};

use crate::{CryptoSuite, ShortMac, StreamCipher, SUITE_DEMO};

const SHARED_SECRET_SIZE: usize = 32;
const MAC_SIZE: usize = 32;
const NONCE_SIZE: usize = 32;
const PUBKEY_SIZE: usize = 33;
const PRIVKEY_SIZE: usize = 32;

type Aes256Ctr64BE = Ctr64BE<Aes256>;
type HmacSha256 = Hmac<Sha256>;

pub struct Suite1;

impl Suite1 {
    pub fn new() -> Self {
        Suite1
    }
}

impl Default for Suite1 {
    fn default() -> Self {
        Self::new()
    }
}

/// sha256 of the compressed shared point, computed via the `mul_tweak`
/// API on the secret scalar.
fn ecdh_point(pubkey: &PublicKey, privkey: &SecretKey) -> Result<[u8; 32]> {
    let secp = Secp256k1::new();
    let scalar = Scalar::from_be_bytes(privkey.secret_bytes())
        .map_err(|_| Error::CryptoFailure("invalid scalar for ECDH".into()))?;
    let shared_point = pubkey
        .mul_tweak(&secp, &scalar)
        .map_err(|e| Error::CryptoFailure(format!("ECDH multiply failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(shared_point.serialize());
    let digest = hasher.finalize();

    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Ok(out)
}

struct Suite1StreamCipher {
    inner: Aes256Ctr64BE,
}

impl StreamCipher for Suite1StreamCipher {
    fn apply_keystream(&mut self, data: &mut [u8]) {
        self.inner.apply_keystream(data);
    }
}

struct Suite1ShortMac {
    inner: HmacSha256,
}

impl ShortMac for Suite1ShortMac {
    fn update(&mut self, data: &[u8]) {
        Mac::update(&mut self.inner, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.inner.finalize().into_bytes().to_vec()
    }
}

impl CryptoSuite for Suite1 {
    fn suite_id(&self) -> u32 {
        SUITE_DEMO
    }

    fn shared_secret_size(&self) -> usize {
        SHARED_SECRET_SIZE
    }

    fn mac_size(&self) -> usize {
        MAC_SIZE
    }

    fn nonce_size(&self) -> usize {
        NONCE_SIZE
    }

    fn pubkey_size(&self) -> usize {
        PUBKEY_SIZE
    }

    fn privkey_size(&self) -> usize {
        PRIVKEY_SIZE
    }

    fn sign_pubkey_size(&self) -> usize {
        PUBKEY_SIZE
    }

    fn sign_privkey_size(&self) -> usize {
        PRIVKEY_SIZE
    }

    fn generate_nonce(&self) -> Vec<u8> {
        let mut nonce = vec![0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        nonce
    }

    fn new_stream_cipher(&self, secret: &[u8], iv: u64) -> Box<dyn StreamCipher> {
        // The IV doubles as the CTR nonce: the high 8 bytes of the 16-byte
        // block are zero, the low 8 bytes are the big-endian packet IV.
        // Header and payload are encrypted by successive calls against the
        // same cipher instance, so the keystream position carries over
        // automatically -- there is no separate "seek" step.
        let mut iv_block = [0u8; 16];
        iv_block[8..].copy_from_slice(&iv.to_be_bytes());

        let cipher = Aes256Ctr64BE::new(secret.into(), (&iv_block).into());
        Box::new(Suite1StreamCipher { inner: cipher })
    }

    fn new_short_mac(&self, secret: &[u8]) -> Box<dyn ShortMac> {
        let mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
        Box::new(Suite1ShortMac { inner: mac })
    }

    fn key_agreement_short_term(
        &self,
        local_privkey: &[u8],
        remote_pubkey: &[u8],
        server_key_nonce: &[u8],
        client_key_nonce: &[u8],
    ) -> Result<Vec<u8>> {
        if local_privkey.len() != PRIVKEY_SIZE {
            return Err(Error::InvalidArgument(
                "local private key has the wrong size for suite 1".into(),
            ));
        }
        if remote_pubkey.len() != PUBKEY_SIZE {
            return Err(Error::InvalidArgument(
                "remote public key has the wrong size for suite 1".into(),
            ));
        }

        let sk = SecretKey::from_slice(local_privkey)
            .map_err(|e| Error::CryptoFailure(format!("invalid private key: {}", e)))?;
        let pk = PublicKey::from_slice(remote_pubkey)
            .map_err(|e| Error::CryptoFailure(format!("invalid public key: {}", e)))?;

        let mut point = ecdh_point(&pk, &sk)?;

        // Mix both handshake nonces into the chaining key used as HKDF
        // salt, so the derived secret is bound to this specific handshake
        // transcript rather than the raw ECDH output alone.
        let mut salt = Vec::with_capacity(server_key_nonce.len() + client_key_nonce.len());
        salt.extend_from_slice(server_key_nonce);
        salt.extend_from_slice(client_key_nonce);

        let hkdf = Hkdf::<Sha256>::new(Some(&salt), &point);
        point.zeroize();

        let mut okm = [0u8; SHARED_SECRET_SIZE];
        hkdf.expand(&[], &mut okm)
            .map_err(|_| Error::CryptoFailure("HKDF expand failed".into()))?;

        Ok(okm.to_vec())
    }

    fn generate_keypair(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let secp = Secp256k1::new();
        let mut rng = rand::thread_rng();
        let (sk, pk) = secp.generate_keypair(&mut rng);
        Ok((sk.secret_bytes().to_vec(), pk.serialize().to_vec()))
    }
}
