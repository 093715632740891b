use zeroize::Zeroize;

use crate::core::encrypt_block;
use crate::error::*;
use crate::modes::util::{check_block_aligned, xor_chunks};

/// Core CFB-128 encryption. The feedback block is always *encrypted* to form the keystream;
/// the produced ciphertext becomes the next feedback block.
pub fn cfb_encrypt(plaintext: &[u8], round_keys: &[[u8; 16]], iv: &[u8; 16]) -> Result<Vec<u8>> {
    cfb_core(plaintext, round_keys, iv, Direction::Encrypt)
}

/// Core CFB-128 decryption. The *consumed* ciphertext becomes the next feedback block, which
/// makes the mode self-synchronising.
pub fn cfb_decrypt(ciphertext: &[u8], round_keys: &[[u8; 16]], iv: &[u8; 16]) -> Result<Vec<u8>> {
    cfb_core(ciphertext, round_keys, iv, Direction::Decrypt)
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Direction {
    Encrypt,
    Decrypt,
}

fn cfb_core(
    input: &[u8],
    round_keys: &[[u8; 16]],
    iv: &[u8; 16],
    direction: Direction,
) -> Result<Vec<u8>> {
    check_block_aligned(input.len(), "CFB input not a multiple of 16 bytes")?;

    let mut output = Vec::with_capacity(input.len());
    let mut feedback = *iv;

    for chunk in input.chunks_exact(16) {
        let block: &[u8; 16] = chunk.try_into().unwrap(); // safe unwrap, chunks_exact guarantees 16
        let mut keystream = encrypt_block(&feedback, round_keys);
        let out = xor_chunks(&keystream, block);
        output.extend_from_slice(&out);
        keystream.zeroize();

        feedback = match direction {
            Direction::Encrypt => out,
            Direction::Decrypt => *block,
        };
    }

    feedback.zeroize();
    Ok(output)
}
