use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::core::encrypt_block;
use crate::error::*;
use crate::modes::util::{gcm_ctr_block, gf_mul, xor_chunks};

/*
https://csrc.nist.rip/groups/ST/toolkit/BCM/documents/proposedmodes/gcm/gcm-spec.pdf
diagram on page 5

H = block of 0s encrypted with key
start with accumulator s = 0
for each 16-byte block b:
    s = (s ^ b) * H (GF128 multiplication)

where blocks are:
    - all AAD blocks (padded)
    - all ciphertext blocks (padded)
    - one block comprised aad.len || ct.len (bit lengths, big-endian u64 each)

final tag = s ^ encrypt_block(J0, key)

where J0 is:
    - IV || 1u32, so keystream blocks start at counter 2
*/

/// GCM nonce length in bytes.
pub const GCM_NONCE_LEN: usize = 12;
/// GCM tag length in bytes.
pub const TAG_LEN: usize = 16;

// highest counter value is u32::MAX, first keystream block is 2
const MAX_GCM_BLOCKS: u64 = u32::MAX as u64 - 1;

/// GCM encryption. Returns `(ciphertext, tag)`; the ciphertext has the same length as the
/// plaintext.
pub fn gcm_encrypt(
    plaintext: &[u8],
    round_keys: &[[u8; 16]],
    nonce: &[u8; GCM_NONCE_LEN],
    aad: &[u8],
) -> Result<(Vec<u8>, [u8; TAG_LEN])> {
    let ciphertext = gcm_keystream_xor(plaintext, round_keys, nonce)?;
    let tag = compute_tag(&ciphertext, round_keys, nonce, aad);
    Ok((ciphertext, tag))
}

/// GCM decryption. The tag is recomputed over the *received* ciphertext and AAD and compared in
/// constant time before any plaintext is produced, so nothing unauthenticated ever leaves
/// this function.
pub fn gcm_decrypt(
    ciphertext: &[u8],
    round_keys: &[[u8; 16]],
    nonce: &[u8; GCM_NONCE_LEN],
    aad: &[u8],
    tag: &[u8; TAG_LEN],
) -> Result<Vec<u8>> {
    let mut computed = compute_tag(ciphertext, round_keys, nonce, aad);
    let valid: bool = computed.ct_eq(tag).into();
    computed.zeroize();
    if !valid {
        return Err(Error::AuthenticationFailure);
    }

    gcm_keystream_xor(ciphertext, round_keys, nonce)
}

/// CTR keystream over the 32-bit counter suffix, starting at 2.
fn gcm_keystream_xor(
    input: &[u8],
    round_keys: &[[u8; 16]],
    nonce: &[u8; GCM_NONCE_LEN],
) -> Result<Vec<u8>> {
    if input.len().div_ceil(16) as u64 > MAX_GCM_BLOCKS {
        return Err(Error::CounterOverflow);
    }

    let mut output = Vec::with_capacity(input.len());
    let mut ctr: u32 = 2;
    for chunk in input.chunks(16) {
        let mut keystream = encrypt_block(&gcm_ctr_block(nonce, ctr), round_keys);
        let mut out = xor_chunks(&keystream, chunk);
        output.extend_from_slice(&out[..chunk.len()]);
        keystream.zeroize();
        out.zeroize();
        ctr = ctr.wrapping_add(1);
    }

    Ok(output)
}

/// Function to compute GCM cryptographic tag from ciphertext + AAD
pub fn compute_tag(
    ciphertext: &[u8],
    round_keys: &[[u8; 16]],
    nonce: &[u8; GCM_NONCE_LEN],
    aad: &[u8],
) -> [u8; TAG_LEN] {
    // hash subkey and J0 mask are both derived from the data key
    let h = Zeroizing::new(encrypt_block(&[0u8; 16], round_keys));
    let j0_e = Zeroizing::new(encrypt_block(&gcm_ctr_block(nonce, 1), round_keys));

    let mut s = ghash(&h, aad, ciphertext);
    let tag = xor_chunks(&s, &j0_e[..]);
    s.zeroize();
    tag
}

/// GHASH over `aad || pad || ciphertext || pad || len(aad) || len(ciphertext)`.
pub(crate) fn ghash(h: &[u8; 16], aad: &[u8], ciphertext: &[u8]) -> [u8; 16] {
    let mut s = [0u8; 16];

    for aad_chunk in aad.chunks(16) {
        s = gf_mul(xor_chunks(&s, aad_chunk), *h);
    }

    for ct_chunk in ciphertext.chunks(16) {
        s = gf_mul(xor_chunks(&s, ct_chunk), *h);
    }

    let aad_bits = (aad.len() as u64) * 8;
    let ct_bits = (ciphertext.len() as u64) * 8;
    let mut len = [0u8; 16];
    len[..8].copy_from_slice(&aad_bits.to_be_bytes());
    len[8..].copy_from_slice(&ct_bits.to_be_bytes());

    gf_mul(xor_chunks(&s, &len), *h)
}
