use rand::rand_core;
use thiserror::Error;

/// AES Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// AES Error type.
///
/// Every variant is a caller-input error or a security failure; none are transient,
/// so retrying the same call never helps.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Key was not 128, 192, or 256 bits long.
    #[error("invalid key length: {len} bytes (expected 16, 24, or 32)")]
    InvalidKeyLength { len: usize },

    /// Input to a block-aligned mode (ECB, CBC, CFB) was not a multiple of 16 bytes.
    #[error("invalid data length: {len} bytes ({context})")]
    InvalidDataLength { len: usize, context: &'static str },

    /// Padding on decrypted data was missing or corrupt.
    #[error("invalid padding")]
    InvalidPadding,

    /// Computed authentication tag did not match input tag. Ciphertext and/or AAD has been
    /// modified since it was encrypted. No plaintext is returned.
    #[error("GCM authentication failed (invalid tag)")]
    AuthenticationFailure,

    /// Input was too short to hold a 16-byte IV.
    #[error("input too short: {len} bytes (expected at least 16 bytes of IV)")]
    InputTooShort { len: usize },

    /// Input would need more blocks than the counter can address without wrapping.
    #[error("input size caused counter overflow")]
    CounterOverflow,

    /// Decrypted bytes were requested as text but are not valid UTF-8.
    #[error("decrypted data is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// OS RNG failed during random key generation.
    #[error("OS RNG failed in random key generation")]
    Rng(#[from] rand_core::OsError),
}
