#[cfg(feature = "parallel")]
use rayon::prelude::*;
use zeroize::Zeroize;

use crate::core::encrypt_block;
use crate::error::*;

/// Core counter mode encryption and decryption algorithm (CTR is symmetric).
///
/// The whole 16-byte IV is the initial counter, incremented as one big-endian integer per
/// block. The final block may be partial. Inputs that would need the counter to wrap past
/// `2^128 - 1` are rejected with [Error::CounterOverflow] before any output is produced.
pub fn ctr_core(input: &[u8], round_keys: &[[u8; 16]], iv: &[u8; 16]) -> Result<Vec<u8>> {
    #[cfg(feature = "parallel")]
    if input.len() > crate::modes::util::PARALLEL_THRESHOLD {
        return ctr_core_parallel(input, round_keys, iv);
    }

    ctr_core_serial(input, round_keys, iv)
}

/// Returns the initial counter after checking that `len` bytes fit in the counter space.
fn checked_counter_start(len: usize, iv: &[u8; 16]) -> Result<u128> {
    let start = u128::from_be_bytes(*iv);
    let num_blocks = len.div_ceil(16) as u128;
    if num_blocks > 0 {
        start
            .checked_add(num_blocks - 1)
            .ok_or(Error::CounterOverflow)?;
    }
    Ok(start)
}

pub fn ctr_core_serial(input: &[u8], round_keys: &[[u8; 16]], iv: &[u8; 16]) -> Result<Vec<u8>> {
    let mut ctr = checked_counter_start(input.len(), iv)?;
    let mut output = Vec::with_capacity(input.len());

    for chunk in input.chunks(16) {
        let mut keystream = encrypt_block(&ctr.to_be_bytes(), round_keys);
        // xor each element of input chunk (1-16 bytes) with the keystream
        output.extend(chunk.iter().zip(keystream.iter()).map(|(a, b)| a ^ b));
        keystream.zeroize();
        // cannot overflow on the last block, checked above
        ctr = ctr.wrapping_add(1);
    }

    Ok(output)
}

#[cfg(feature = "parallel")]
pub fn ctr_core_parallel(
    input: &[u8],
    round_keys: &[[u8; 16]],
    iv: &[u8; 16],
) -> Result<Vec<u8>> {
    let start = checked_counter_start(input.len(), iv)?;
    let mut output = vec![0u8; input.len()];

    output
        .par_chunks_mut(16)
        .zip(input.par_chunks(16))
        .enumerate()
        .for_each(|(i, (out_chunk, in_chunk))| {
            let ctr = start.wrapping_add(i as u128);
            let mut keystream = encrypt_block(&ctr.to_be_bytes(), round_keys);

            for (o, (a, b)) in out_chunk.iter_mut().zip(in_chunk.iter().zip(keystream.iter())) {
                *o = a ^ b;
            }
            keystream.zeroize();
        });

    Ok(output)
}
