//! Byte-oriented AES operations for every supported mode.
//!
//! Each call validates the key, expands a fresh round key schedule, runs the mode, and wipes
//! the schedule before returning. Nothing is cached between calls, so any number of calls may
//! run concurrently on independent threads, even with the same key bytes.

use tracing::{debug, instrument, warn};
use zeroize::Zeroizing;

use crate::core::{decrypt_block, encrypt_block};
use crate::error::{Error, Result};
use crate::key::{Key, expand_key};
use crate::modes::*;

/// Validates `key` and expands it. The schedule is zeroed when the returned value drops.
fn round_keys_for(key: &[u8]) -> Result<Zeroizing<Vec<[u8; 16]>>> {
    let key = Key::try_from_slice(key).inspect_err(|e| debug!(error = %e, "rejected key"))?;
    Ok(expand_key(&key))
}

fn log_failure(e: &Error) {
    debug!(error = %e, "AES operation failed");
}

/// Encrypts a single 16-byte block.
pub fn encrypt_block_with_key(block: &[u8; 16], key: &[u8]) -> Result<[u8; 16]> {
    let round_keys = round_keys_for(key)?;
    Ok(encrypt_block(block, &round_keys))
}

/// Decrypts a single 16-byte block.
pub fn decrypt_block_with_key(block: &[u8; 16], key: &[u8]) -> Result<[u8; 16]> {
    let round_keys = round_keys_for(key)?;
    Ok(decrypt_block(block, &round_keys))
}

/// **Electronic codebook** encryption.
///
/// Encrypts each 16-byte block entirely independently and chains them together.
/// **Vulnerable to pattern emergence in the ciphertext.** `plaintext` must be a multiple of
/// 16 bytes; pad it first with [pad](crate::pad) if needed.
#[instrument(level = "debug", skip_all, fields(mode = "ECB", len = plaintext.len(), key_bits = key.len() * 8))]
pub fn encrypt_ecb(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let round_keys = round_keys_for(key)?;
    ecb_encrypt(plaintext, &round_keys).inspect_err(log_failure)
}

/// **Electronic codebook** decryption.
#[instrument(level = "debug", skip_all, fields(mode = "ECB", len = ciphertext.len(), key_bits = key.len() * 8))]
pub fn decrypt_ecb(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let round_keys = round_keys_for(key)?;
    ecb_decrypt(ciphertext, &round_keys).inspect_err(log_failure)
}

/// **Cipher block chaining** encryption. `plaintext` must be a multiple of 16 bytes.
///
/// **Important**: IVs must be unpredictable; use [generate_iv](crate::generate_iv).
#[instrument(level = "debug", skip_all, fields(mode = "CBC", len = plaintext.len(), key_bits = key.len() * 8))]
pub fn encrypt_cbc(plaintext: &[u8], key: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>> {
    let round_keys = round_keys_for(key)?;
    cbc_encrypt(plaintext, &round_keys, iv).inspect_err(log_failure)
}

/// **Cipher block chaining** decryption.
#[instrument(level = "debug", skip_all, fields(mode = "CBC", len = ciphertext.len(), key_bits = key.len() * 8))]
pub fn decrypt_cbc(ciphertext: &[u8], key: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>> {
    let round_keys = round_keys_for(key)?;
    cbc_decrypt(ciphertext, &round_keys, iv).inspect_err(log_failure)
}

/// **Cipher feedback** (CFB-128) encryption. Input must be a multiple of 16 bytes.
#[instrument(level = "debug", skip_all, fields(mode = "CFB", len = plaintext.len(), key_bits = key.len() * 8))]
pub fn encrypt_cfb(plaintext: &[u8], key: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>> {
    let round_keys = round_keys_for(key)?;
    cfb_encrypt(plaintext, &round_keys, iv).inspect_err(log_failure)
}

/// **Cipher feedback** (CFB-128) decryption.
#[instrument(level = "debug", skip_all, fields(mode = "CFB", len = ciphertext.len(), key_bits = key.len() * 8))]
pub fn decrypt_cfb(ciphertext: &[u8], key: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>> {
    let round_keys = round_keys_for(key)?;
    cfb_decrypt(ciphertext, &round_keys, iv).inspect_err(log_failure)
}

/// **Counter mode** encryption.
///
/// For each 16-byte block of input, the 16-byte counter (initialised to `iv`) is encrypted
/// and XOR'd with the data, then incremented as a big-endian integer. Any input length is
/// accepted; the final block may be partial.
///
/// **Important**: the same IV must never be reused with the same key.
#[instrument(level = "debug", skip_all, fields(mode = "CTR", len = plaintext.len(), key_bits = key.len() * 8))]
pub fn encrypt_ctr(plaintext: &[u8], key: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>> {
    let round_keys = round_keys_for(key)?;
    ctr_core(plaintext, &round_keys, iv).inspect_err(log_failure)
}

/// **Counter mode** decryption. Identical to [encrypt_ctr].
pub fn decrypt_ctr(ciphertext: &[u8], key: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>> {
    encrypt_ctr(ciphertext, key, iv)
}

/// **Galois/counter mode** encryption.
///
/// Encrypts using counter mode and generates a 16-byte tag over the ciphertext and the
/// additional authenticated data (AAD). AAD is authenticated but **not encrypted**.
/// Returns `(ciphertext, tag)`.
#[instrument(
    level = "debug",
    skip_all,
    fields(mode = "GCM", len = plaintext.len(), aad_len = aad.len(), key_bits = key.len() * 8)
)]
pub fn encrypt_gcm(
    plaintext: &[u8],
    key: &[u8],
    nonce: &[u8; GCM_NONCE_LEN],
    aad: &[u8],
) -> Result<(Vec<u8>, [u8; TAG_LEN])> {
    let round_keys = round_keys_for(key)?;
    gcm_encrypt(plaintext, &round_keys, nonce, aad).inspect_err(log_failure)
}

/// **Galois/counter mode** decryption.
///
/// Returns:
/// - plaintext if the tag was authenticated.
/// - [AuthenticationFailure](crate::Error::AuthenticationFailure) if the computed tag did not
///   match `tag`. No plaintext is produced in that case.
#[instrument(
    level = "debug",
    skip_all,
    fields(mode = "GCM", len = ciphertext.len(), aad_len = aad.len(), key_bits = key.len() * 8)
)]
pub fn decrypt_gcm(
    ciphertext: &[u8],
    key: &[u8],
    nonce: &[u8; GCM_NONCE_LEN],
    aad: &[u8],
    tag: &[u8; TAG_LEN],
) -> Result<Vec<u8>> {
    let round_keys = round_keys_for(key)?;
    gcm_decrypt(ciphertext, &round_keys, nonce, aad, tag).inspect_err(|e| match e {
        Error::AuthenticationFailure => warn!("GCM tag verification failed"),
        other => log_failure(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fips_197_example() -> Result<()> {
        // FIPS-197 Appendix C.1
        let key: [u8; 16] = std::array::from_fn(|i| i as u8);
        let plaintext = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, //
            0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, //
        ];
        let ciphertext = encrypt_ecb(&plaintext, &key)?;
        assert_eq!(
            ciphertext,
            [
                0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, //
                0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a, //
            ]
        );
        assert_eq!(decrypt_ecb(&ciphertext, &key)?, plaintext);
        Ok(())
    }

    #[test]
    fn invalid_key_is_rejected_before_mode_checks() {
        // unaligned data AND a bad key: key error wins
        let result = encrypt_cbc(&[0u8; 3], &[0u8; 17], &[0u8; 16]);
        assert!(matches!(result, Err(Error::InvalidKeyLength { len: 17 })));
    }

    #[test]
    fn example_test() -> Result<()> {
        let key = Key::generate(crate::KeySize::Bits256)?;
        let iv = [7u8; 16];
        let plaintext = "Hello, World!".as_bytes();

        // the key size does not need to be explicitly stated
        let ciphertext = encrypt_ctr(plaintext, key.as_bytes(), &iv)?;
        let decrypted = decrypt_ctr(&ciphertext, key.as_bytes(), &iv)?;

        assert_eq!(plaintext, decrypted);
        Ok(())
    }
}
