//! AES-128/192/256 block cipher with ECB, CBC, CFB, CTR and GCM modes, plus a small envelope
//! layer (PKCS#7 padding, IV generation, `IV || ciphertext` bundling).
//!
//! ```
//! # fn main() -> aeskit::Result<()> {
//! use aeskit::{AesMode, Key, KeySize};
//!
//! let key = Key::generate(KeySize::Bits256)?;
//!
//! // authenticated encryption
//! let nonce = [0x42u8; 12];
//! let (ciphertext, tag) = aeskit::encrypt_gcm(b"attack at dawn", key.as_bytes(), &nonce, b"header")?;
//! let plaintext = aeskit::decrypt_gcm(&ciphertext, key.as_bytes(), &nonce, b"header", &tag)?;
//! assert_eq!(plaintext, b"attack at dawn");
//!
//! // padded CBC envelope with a generated IV
//! let envelope = aeskit::encrypt_str("hello", key.as_bytes(), AesMode::Cbc)?;
//! assert_eq!(aeskit::decrypt_to_string(&envelope, key.as_bytes(), AesMode::Cbc)?, "hello");
//! # Ok(())
//! # }
//! ```

mod cipher;
mod core;
mod envelope;
mod error;
mod key;
mod modes;

pub use cipher::{
    decrypt_block_with_key, decrypt_cbc, decrypt_cfb, decrypt_ctr, decrypt_ecb, decrypt_gcm,
    encrypt_block_with_key, encrypt_cbc, encrypt_cfb, encrypt_ctr, encrypt_ecb, encrypt_gcm,
};
pub use envelope::{
    AesMode, BLOCK_SIZE, EncryptedData, add_iv_to_ciphertext, decrypt, decrypt_to_string,
    encrypt, encrypt_str, extract_iv_from_ciphertext, generate_iv, pad, unpad,
};
pub use error::{Error, Result};
pub use key::{Key, KeySize};
pub use modes::{GCM_NONCE_LEN, TAG_LEN};
