use super::constants::{MUL_9, MUL_11, MUL_13, MUL_14, SBOX_INV};
use super::util::add_round_key;

/// Core AES decryption function. Decrypts 16 byte block using provided round keys,
/// starting from round key `Nr` and finishing with round key 0.
#[inline(always)]
pub fn decrypt_block(ciphertext: &[u8; 16], round_keys: &[[u8; 16]]) -> [u8; 16] {
    let mut state = *ciphertext;
    let last_key_idx = round_keys.len() - 1;

    add_round_key(&mut state, &round_keys[last_key_idx]);

    for round_key in round_keys[1..last_key_idx].iter().rev() {
        shift_rows_inv(&mut state);
        sub_bytes_inv(&mut state);
        add_round_key(&mut state, round_key);
        mix_columns_inv(&mut state);
    }

    shift_rows_inv(&mut state);
    sub_bytes_inv(&mut state);
    add_round_key(&mut state, &round_keys[0]);

    state
}

/// Inverse SubBytes step. Each byte is substituted using the inverse SBOX.
#[inline(always)]
pub(crate) fn sub_bytes_inv(state: &mut [u8; 16]) {
    for byte in state {
        *byte = SBOX_INV[*byte as usize];
    }
}

/// Inverse ShiftRows step. Row `r` is rotated right by `r` positions.
/// [
///     01 02 03 04   ---->   01 02 03 04
///     06 07 08 05   ---->   05 06 07 08
///     11 12 09 10   ---->   09 10 11 12
///     16 13 14 15   ---->   13 14 15 16
/// ]
#[inline(always)]
pub(crate) fn shift_rows_inv(state: &mut [u8; 16]) {
    let s = *state;
    for row in 1..4 {
        for col in 0..4 {
            state[col * 4 + row] = s[((col + 4 - row) & 3) * 4 + row];
        }
    }
}

/// Inverse MixColumns step.
/// [ b0 ]      [ 14  11  13  09 ]  [ d0 ]
/// | b1 |  =   | 09  14  11  13 |  | d1 |
/// | b2 |      | 13  09  14  11 |  | d2 |
/// [ b3 ]      [ 11  13  09  14 ]  [ d3 ]
#[inline(always)]
pub(crate) fn mix_columns_inv(state: &mut [u8; 16]) {
    for column in state.chunks_exact_mut(4) {
        let (a, b, c, d) = (
            column[0] as usize,
            column[1] as usize,
            column[2] as usize,
            column[3] as usize,
        );
        column[0] = MUL_14[a] ^ MUL_11[b] ^ MUL_13[c] ^ MUL_9[d];
        column[1] = MUL_9[a] ^ MUL_14[b] ^ MUL_11[c] ^ MUL_13[d];
        column[2] = MUL_13[a] ^ MUL_9[b] ^ MUL_14[c] ^ MUL_11[d];
        column[3] = MUL_11[a] ^ MUL_13[b] ^ MUL_9[c] ^ MUL_14[d];
    }
}
