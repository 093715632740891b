use super::constants::{MUL_2, MUL_3, SBOX};
use super::util::add_round_key;

/// Core AES encryption function. Encrypts 16 byte block using provided round keys.
///
/// The state is stored column-major: byte `i` of the block is row `i % 4`, column `i / 4`.
/// `round_keys` must hold `Nr + 1` keys for the variant in use (11, 13 or 15).
#[inline(always)]
pub fn encrypt_block(plaintext: &[u8; 16], round_keys: &[[u8; 16]]) -> [u8; 16] {
    let mut state = *plaintext;
    let last_key_idx = round_keys.len() - 1;

    add_round_key(&mut state, &round_keys[0]);

    // rounds 1..Nr-1
    for round_key in &round_keys[1..last_key_idx] {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, round_key);
    }

    // last round skips mixcolumns step
    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, &round_keys[last_key_idx]);

    state
}

/// SubBytes step. Each byte is substituted using the SBOX.
#[inline(always)]
pub(crate) fn sub_bytes(state: &mut [u8; 16]) {
    for byte in state {
        *byte = SBOX[*byte as usize];
    }
}

/// ShiftRows step. Row `r` is rotated left by `r` positions.
#[inline(always)]
pub(crate) fn shift_rows(state: &mut [u8; 16]) {
    let s = *state;
    for row in 1..4 {
        for col in 0..4 {
            state[col * 4 + row] = s[((col + row) & 3) * 4 + row];
        }
    }
}

/// MixColumns step. Each column is multiplied by a constant matrix using Galois field multiplication.
/// [ d0 ]      [ 2  3  1  1 ]  [ b0 ]
/// | d1 |  =   | 1  2  3  1 |  | b1 |
/// | d2 |      | 1  1  2  3 |  | b2 |
/// [ d3 ]      [ 3  1  1  2 ]  [ b3 ]
#[inline(always)]
pub(crate) fn mix_columns(state: &mut [u8; 16]) {
    for column in state.chunks_exact_mut(4) {
        let (a, b, c, d) = (
            column[0] as usize,
            column[1] as usize,
            column[2] as usize,
            column[3] as usize,
        );
        column[0] = MUL_2[a] ^ MUL_3[b] ^ c as u8 ^ d as u8;
        column[1] = a as u8 ^ MUL_2[b] ^ MUL_3[c] ^ d as u8;
        column[2] = a as u8 ^ b as u8 ^ MUL_2[c] ^ MUL_3[d];
        column[3] = MUL_3[a] ^ b as u8 ^ c as u8 ^ MUL_2[d];
    }
}
