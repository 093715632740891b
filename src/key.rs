//! Defines the [`Key`] struct, which holds a valid AES key of 128, 192, or 256 bits, and the
//! AES key schedule that expands it into round keys.

use std::fmt;

use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, Zeroizing};

use crate::core::constants::SBOX;
use crate::core::util::dbl;
use crate::error::{Error, Result};

/// Key-length variant. Fixes `Nk` (key length in 32-bit words) and `Nr` (number of rounds).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum KeySize {
    Bits128,
    Bits192,
    Bits256,
}

impl KeySize {
    /// Infers the variant from a key length in bytes.
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(KeySize::Bits128),
            24 => Ok(KeySize::Bits192),
            32 => Ok(KeySize::Bits256),
            _ => Err(Error::InvalidKeyLength { len }),
        }
    }

    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        self.nk() * 4
    }

    /// Number of 32-bit words in the key: 4, 6, or 8.
    pub fn nk(self) -> usize {
        match self {
            KeySize::Bits128 => 4,
            KeySize::Bits192 => 6,
            KeySize::Bits256 => 8,
        }
    }

    /// Number of rounds: 10, 12, or 14.
    pub fn nr(self) -> usize {
        self.nk() + 6
    }
}

#[derive(Clone, PartialEq, Eq)]
enum KeyBytes {
    K128([u8; 16]),
    K192([u8; 24]),
    K256([u8; 32]),
}

/// Contains a valid AES key. Can be instantiated with a random key, or built from a slice
/// of bytes that is 16, 24, or 32 bytes long. Key bytes are zeroed when the `Key` is dropped.
///
/// ## Examples
/// ```
/// # fn main() -> aeskit::Result<()> {
/// use aeskit::{Key, KeySize};
///
/// let random = Key::generate(KeySize::Bits256)?;
/// assert_eq!(random.as_bytes().len(), 32);
///
/// let key_bytes = [0x2bu8; 24];
/// let key = Key::try_from_slice(&key_bytes)?;
/// assert_eq!(key.size(), KeySize::Bits192);
/// assert_eq!(key.as_bytes(), &key_bytes);
///
/// // anything other than 16, 24, or 32 bytes is rejected
/// assert!(Key::try_from_slice(&key_bytes[..20]).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    bytes: KeyBytes,
}

impl Key {
    /// Generate a random key of the given size. Returns Error if OsRng fails.
    pub fn generate(size: KeySize) -> Result<Self> {
        let mut bytes = match size {
            KeySize::Bits128 => KeyBytes::K128([0u8; 16]),
            KeySize::Bits192 => KeyBytes::K192([0u8; 24]),
            KeySize::Bits256 => KeyBytes::K256([0u8; 32]),
        };
        match &mut bytes {
            KeyBytes::K128(k) => OsRng.try_fill_bytes(k)?,
            KeyBytes::K192(k) => OsRng.try_fill_bytes(k)?,
            KeyBytes::K256(k) => OsRng.try_fill_bytes(k)?,
        }
        Ok(Self { bytes })
    }

    /// Attempts to build a key from a slice of bytes. Will return an InvalidKeyLength error
    /// if the input slice is anything other than 16, 24, or 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        let invalid = || Error::InvalidKeyLength { len: bytes.len() };
        let bytes = match KeySize::from_len(bytes.len())? {
            KeySize::Bits128 => KeyBytes::K128(bytes.try_into().map_err(|_| invalid())?),
            KeySize::Bits192 => KeyBytes::K192(bytes.try_into().map_err(|_| invalid())?),
            KeySize::Bits256 => KeyBytes::K256(bytes.try_into().map_err(|_| invalid())?),
        };
        Ok(Self { bytes })
    }

    /// Returns a reference to the internal key as an array of bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.bytes {
            KeyBytes::K128(k) => k,
            KeyBytes::K192(k) => k,
            KeyBytes::K256(k) => k,
        }
    }

    /// Key-length variant of this key.
    pub fn size(&self) -> KeySize {
        match self.bytes {
            KeyBytes::K128(_) => KeySize::Bits128,
            KeyBytes::K192(_) => KeySize::Bits192,
            KeyBytes::K256(_) => KeySize::Bits256,
        }
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        match &mut self.bytes {
            KeyBytes::K128(k) => k.zeroize(),
            KeyBytes::K192(k) => k.zeroize(),
            KeyBytes::K256(k) => k.zeroize(),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key").field("size", &self.size()).finish_non_exhaustive()
    }
}

/// AES key schedule. Returns 11, 13, or 15 round keys, corresponding with AES-128, AES-192,
/// and AES-256, respectively. The extra round key is the initial round key, which is simply the
/// original key.
///
/// The schedule is as sensitive as the key itself: it is wiped when the returned
/// [Zeroizing] wrapper is dropped, so callers should let it fall out of scope at the end of
/// the operation that created it.
pub(crate) fn expand_key(key: &Key) -> Zeroizing<Vec<[u8; 16]>> {
    let key_bytes = key.as_bytes();

    // Variable names match FIPS-197, NIST specification: https://doi.org/10.6028/NIST.FIPS.197-upd1
    // Nk   The number of 32-bit words comprising the key
    // Nr   The number of rounds
    // w    The result of the key schedule, an array of words that form round keys
    // Nw   The total number of words generated by the key schedule (including initial key)
    let nk = key.size().nk();
    let nr = key.size().nr();
    let nw = (nr + 1) * 4;

    let mut w: Zeroizing<Vec<[u8; 4]>> = Zeroizing::new(vec![[0u8; 4]; nw]);

    // first nk words of w are filled with the initial key
    for (i, &b) in key_bytes.iter().enumerate() {
        w[i / 4][i % 4] = b;
    }

    // rcon = x^(i/Nk - 1), advanced by one doubling each time it is used
    let mut rcon: u8 = 0x01;
    let mut temp = Zeroizing::new(w[nk - 1]);
    for i in nk..nw {
        if i % nk == 0 {
            // rot_word, sub_word, then xor rcon into the first byte
            *temp = [
                SBOX[temp[1] as usize] ^ rcon,
                SBOX[temp[2] as usize],
                SBOX[temp[3] as usize],
                SBOX[temp[0] as usize],
            ];
            rcon = dbl(rcon);
        } else if nk == 8 && i % nk == 4 {
            // additional sub_word for AES-256 only
            *temp = temp.map(|b| SBOX[b as usize]);
        }

        // w[i] = temp ⊕ w[i − Nk]
        let prev = w[i - nk];
        w[i] = std::array::from_fn(|j| temp[j] ^ prev[j]);
        *temp = w[i];
    }

    // pack words into column-major round keys
    let mut round_keys = Zeroizing::new(vec![[0u8; 16]; nr + 1]);
    for (round, words) in w.chunks_exact(4).enumerate() {
        for (col, word) in words.iter().enumerate() {
            round_keys[round][col * 4..col * 4 + 4].copy_from_slice(word);
        }
    }

    round_keys
}
