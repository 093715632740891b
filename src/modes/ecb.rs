#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{decrypt_block, encrypt_block};
use crate::error::*;
use crate::modes::util::check_block_aligned;

/// Core ECB encryption algorithm. Encrypts each 16-byte block independently; input must
/// already be a whole number of blocks (no padding is applied here).
pub fn ecb_encrypt(plaintext: &[u8], round_keys: &[[u8; 16]]) -> Result<Vec<u8>> {
    check_block_aligned(plaintext.len(), "ECB input not a multiple of 16 bytes")?;
    Ok(map_blocks(plaintext, |block| encrypt_block(block, round_keys)))
}

/// Core ECB decryption algorithm. Mirror of [ecb_encrypt].
pub fn ecb_decrypt(ciphertext: &[u8], round_keys: &[[u8; 16]]) -> Result<Vec<u8>> {
    check_block_aligned(ciphertext.len(), "ECB input not a multiple of 16 bytes")?;
    Ok(map_blocks(ciphertext, |block| decrypt_block(block, round_keys)))
}

/// Applies `f` to every block of an aligned buffer. Blocks are independent, so large inputs
/// are spread across the rayon pool when the `parallel` feature is on.
fn map_blocks<F>(input: &[u8], f: F) -> Vec<u8>
where
    F: Fn(&[u8; 16]) -> [u8; 16] + Sync,
{
    let mut output = vec![0u8; input.len()];

    #[cfg(feature = "parallel")]
    if input.len() > crate::modes::util::PARALLEL_THRESHOLD {
        output
            .par_chunks_exact_mut(16)
            .zip(input.par_chunks_exact(16))
            .for_each(|(out, block)| {
                // chunks_exact guarantees 16 bytes
                let block: &[u8; 16] = block.try_into().unwrap();
                out.copy_from_slice(&f(block));
            });
        return output;
    }

    for (out, block) in output.chunks_exact_mut(16).zip(input.chunks_exact(16)) {
        let block: &[u8; 16] = block.try_into().unwrap(); // safe unwrap, chunks_exact guarantees 16
        out.copy_from_slice(&f(block));
    }

    output
}
