//! Convenience layer over CBC and CFB: PKCS#7 padding, IV generation, `IV || ciphertext`
//! bundling, and a high-level [encrypt]/[decrypt] pair that returns a timestamped
//! [EncryptedData] envelope.
//!
//! Every intermediate buffer allocated here (padded plaintext, decrypted padded plaintext)
//! is wiped before it is released. The caller's own buffers are never touched.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng, TryRngCore};
use subtle::{ConstantTimeEq, ConstantTimeGreater};
use tracing::{debug, instrument, warn};
use zeroize::Zeroizing;

use crate::cipher::{decrypt_cbc, decrypt_cfb, encrypt_cbc, encrypt_cfb};
use crate::error::{Error, Result};
use crate::key::KeySize;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Chaining mode used by the envelope helpers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AesMode {
    Cbc,
    Cfb,
}

/// Result of [encrypt]: the IV and ciphertext, stamped with the time of encryption.
///
/// Not a wire format. Use [to_bytes](EncryptedData::to_bytes) and
/// [from_bytes](EncryptedData::from_bytes) for the simple `IV || ciphertext` transport form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    pub timestamp: SystemTime,
    pub iv: [u8; BLOCK_SIZE],
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// `IV || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        add_iv_to_ciphertext(&self.ciphertext, &self.iv)
    }

    /// Parses `IV || ciphertext`. The timestamp is set to the time of parsing.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (iv, ciphertext) = extract_iv_from_ciphertext(bytes)?;
        Ok(Self {
            timestamp: SystemTime::now(),
            iv,
            ciphertext,
        })
    }
}

/// PKCS#7 padding: appends `n` bytes of value `n`, where `n = 16 - (len % 16)`. Block-aligned
/// input still gets a full block of padding.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;

    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}

/// Removes and validates PKCS#7 padding.
///
/// The last byte gives the padding count, which must lie in `[1, 16]` and must not exceed the
/// input length; every one of those trailing bytes must equal the count. All checks fold into
/// one constant-time flag over the whole final window, so a failure does not reveal which
/// check failed or where.
pub fn unpad(data: &[u8]) -> Result<Vec<u8>> {
    let Some(&pad_len) = data.last() else {
        return Err(Error::InvalidPadding);
    };

    let window = &data[data.len().saturating_sub(BLOCK_SIZE)..];
    let window_len = window.len() as u8;

    let mut invalid = pad_len.ct_eq(&0) | pad_len.ct_gt(&window_len);

    for (i, &b) in window.iter().enumerate() {
        // distance from the end, 1 for the last byte
        let position = window_len - i as u8;
        let in_padding = !position.ct_gt(&pad_len);
        invalid |= in_padding & !b.ct_eq(&pad_len);
    }

    if bool::from(invalid) {
        return Err(Error::InvalidPadding);
    }

    Ok(data[..data.len() - pad_len as usize].to_vec())
}

/// Generates a 16-byte IV from the OS RNG. If the OS source is unavailable, falls back to a
/// PRNG seeded from the current time; this fallback is not suitable for high-assurance use.
pub fn generate_iv() -> [u8; BLOCK_SIZE] {
    let mut iv = [0u8; BLOCK_SIZE];
    if let Err(e) = OsRng.try_fill_bytes(&mut iv) {
        warn!(error = %e, "OS RNG unavailable, falling back to time-seeded IV generation");
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        StdRng::seed_from_u64(seed).fill_bytes(&mut iv);
    }
    iv
}

/// Prepends the IV to the ciphertext for transport.
pub fn add_iv_to_ciphertext(ciphertext: &[u8], iv: &[u8; BLOCK_SIZE]) -> Vec<u8> {
    let mut out = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(ciphertext);
    out
}

/// Splits `IV || ciphertext`. Fails with [Error::InputTooShort] if fewer than 16 bytes.
pub fn extract_iv_from_ciphertext(data: &[u8]) -> Result<([u8; BLOCK_SIZE], Vec<u8>)> {
    let Some((iv, ciphertext)) = data.split_first_chunk::<BLOCK_SIZE>() else {
        return Err(Error::InputTooShort { len: data.len() });
    };
    Ok((*iv, ciphertext.to_vec()))
}

/// Pads `plaintext`, encrypts it under a fresh IV in the given mode, and returns the envelope.
/// Key size is inferred from `key.len()`.
#[instrument(level = "debug", skip_all, fields(mode = ?mode, len = plaintext.len()))]
pub fn encrypt(plaintext: &[u8], key: &[u8], mode: AesMode) -> Result<EncryptedData> {
    let key_size = KeySize::from_len(key.len())?;
    debug!(?key_size, "encrypting envelope");

    let iv = generate_iv();
    let padded = Zeroizing::new(pad(plaintext));

    let ciphertext = match mode {
        AesMode::Cbc => encrypt_cbc(&padded, key, &iv)?,
        AesMode::Cfb => encrypt_cfb(&padded, key, &iv)?,
    };

    Ok(EncryptedData {
        timestamp: SystemTime::now(),
        iv,
        ciphertext,
    })
}

/// Text variant of [encrypt].
pub fn encrypt_str(plaintext: &str, key: &[u8], mode: AesMode) -> Result<EncryptedData> {
    encrypt(plaintext.as_bytes(), key, mode)
}

/// Decrypts an envelope produced by [encrypt] and strips its padding.
#[instrument(level = "debug", skip_all, fields(mode = ?mode, len = data.ciphertext.len()))]
pub fn decrypt(data: &EncryptedData, key: &[u8], mode: AesMode) -> Result<Vec<u8>> {
    let key_size = KeySize::from_len(key.len())?;
    debug!(?key_size, "decrypting envelope");

    let padded = Zeroizing::new(match mode {
        AesMode::Cbc => decrypt_cbc(&data.ciphertext, key, &data.iv)?,
        AesMode::Cfb => decrypt_cfb(&data.ciphertext, key, &data.iv)?,
    });

    unpad(&padded).inspect_err(|_| debug!("envelope padding check failed"))
}

/// Text variant of [decrypt]. Fails with [Error::InvalidUtf8] if the plaintext is not UTF-8.
pub fn decrypt_to_string(data: &EncryptedData, key: &[u8], mode: AesMode) -> Result<String> {
    let plain = Zeroizing::new(decrypt(data, key, mode)?);
    Ok(std::str::from_utf8(&plain)?.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_lengths() {
        assert_eq!(pad(&[]), vec![16u8; 16]);
        assert_eq!(pad(&[1, 2, 3]).len(), 16);
        assert_eq!(pad(&[1, 2, 3])[3..], [13u8; 13]);
        assert_eq!(pad(&[0u8; 16]).len(), 32);
        assert_eq!(pad(&[0u8; 16])[16..], [16u8; 16]);
    }

    #[test]
    fn unpad_round_trip() -> Result<()> {
        for len in 0..=48 {
            let data: Vec<u8> = (0..len as u8).collect();
            assert_eq!(unpad(&pad(&data))?, data, "round trip failed for length {len}");
        }
        Ok(())
    }

    #[test]
    fn unpad_rejects_bad_padding() {
        let mut zero_pad = vec![0u8; 16];
        zero_pad[15] = 0;
        assert!(matches!(unpad(&zero_pad), Err(Error::InvalidPadding)));

        let mut too_large = vec![0u8; 16];
        too_large[15] = 17;
        assert!(matches!(unpad(&too_large), Err(Error::InvalidPadding)));

        let mut inconsistent = pad(b"hello");
        inconsistent[10] ^= 0x01;
        assert!(matches!(unpad(&inconsistent), Err(Error::InvalidPadding)));

        // count larger than the input itself
        assert!(matches!(unpad(&[0u8, 3]), Err(Error::InvalidPadding)));
        assert!(matches!(unpad(&[]), Err(Error::InvalidPadding)));
        assert_eq!(unpad(&[7u8, 1]).ok(), Some(vec![7u8]));
    }

    #[test]
    fn iv_bundle() -> Result<()> {
        let iv = [9u8; 16];
        let bundled = add_iv_to_ciphertext(b"abc", &iv);
        assert_eq!(bundled.len(), 19);

        let (got_iv, ct) = extract_iv_from_ciphertext(&bundled)?;
        assert_eq!(got_iv, iv);
        assert_eq!(ct, b"abc");

        // exactly one IV and nothing else is fine
        assert!(extract_iv_from_ciphertext(&iv)?.1.is_empty());
        assert!(matches!(
            extract_iv_from_ciphertext(&[0u8; 15]),
            Err(Error::InputTooShort { len: 15 })
        ));
        Ok(())
    }

    #[test]
    fn generated_ivs_differ() {
        assert_ne!(generate_iv(), generate_iv());
    }

    #[test]
    fn decrypt_checks_key_length_first() -> Result<()> {
        let envelope = encrypt(b"payload", &[0x42; 32], AesMode::Cfb)?;
        assert!(matches!(
            decrypt(&envelope, &[0x42; 31], AesMode::Cfb),
            Err(Error::InvalidKeyLength { len: 31 })
        ));
        assert_eq!(decrypt(&envelope, &[0x42; 32], AesMode::Cfb)?, b"payload");
        Ok(())
    }
}
