use zeroize::Zeroize;

use crate::core::{decrypt_block, encrypt_block};
use crate::error::*;
use crate::modes::util::{check_block_aligned, xor_chunks};

/// Core CBC encryption. Each plaintext block is XOR'd with the previous ciphertext block
/// (the IV for the first block) before encryption.
pub fn cbc_encrypt(plaintext: &[u8], round_keys: &[[u8; 16]], iv: &[u8; 16]) -> Result<Vec<u8>> {
    check_block_aligned(plaintext.len(), "CBC input not a multiple of 16 bytes")?;

    let mut ciphertext = Vec::with_capacity(plaintext.len());
    let mut feedback = *iv;

    for pt in plaintext.chunks_exact(16) {
        let mut mixed = xor_chunks(&feedback, pt);
        feedback = encrypt_block(&mixed, round_keys);
        ciphertext.extend_from_slice(&feedback);
        mixed.zeroize();
    }

    Ok(ciphertext)
}

/// Core CBC decryption. The feedback for the next block is the *input* ciphertext block.
pub fn cbc_decrypt(ciphertext: &[u8], round_keys: &[[u8; 16]], iv: &[u8; 16]) -> Result<Vec<u8>> {
    check_block_aligned(ciphertext.len(), "CBC input not a multiple of 16 bytes")?;

    let mut plaintext = Vec::with_capacity(ciphertext.len());
    let mut feedback = *iv;

    for ct in ciphertext.chunks_exact(16) {
        let ct: &[u8; 16] = ct.try_into().unwrap(); // safe unwrap, chunks_exact guarantees 16
        let mut pt = xor_chunks(&feedback, &decrypt_block(ct, round_keys));
        plaintext.extend_from_slice(&pt);
        pt.zeroize();
        feedback = *ct;
    }

    Ok(plaintext)
}
