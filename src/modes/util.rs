use crate::error::{Error, Result};

#[cfg(feature = "parallel")]
pub const PARALLEL_THRESHOLD: usize = 4 * 1024; // process blocks in parallel if input size gt 4 KiB

const GHASH_R: u128 = 0xE100_0000_0000_0000_0000_0000_0000_0000; // x^128 + x^7 + x^2 + x + 1, bit-reflected

/// Rejects input that is not a whole number of 16-byte blocks.
pub(crate) fn check_block_aligned(len: usize, context: &'static str) -> Result<()> {
    if len % 16 != 0 {
        return Err(Error::InvalidDataLength { len, context });
    }
    Ok(())
}

/// Forms the GCM counter block `nonce || ctr` with the counter in big-endian order.
#[inline(always)]
pub(crate) fn gcm_ctr_block(nonce: &[u8; 12], ctr: u32) -> [u8; 16] {
    let cb = ctr.to_be_bytes();
    [
        nonce[00], nonce[01], nonce[02], nonce[03], nonce[04], nonce[05], nonce[06], nonce[07],
        nonce[08], nonce[09], nonce[10], nonce[11], cb[00], cb[01], cb[02], cb[03],
    ]
}

/// XORs up to 16 bytes of `chunk` into a copy of `y`. Bytes of `y` past the end of a short
/// chunk are left untouched.
#[inline(always)]
pub(crate) fn xor_chunks(y: &[u8; 16], chunk: &[u8]) -> [u8; 16] {
    let mut out: [u8; 16] = *y;
    for (o, c) in out.iter_mut().zip(chunk) {
        *o ^= c;
    }
    out
}

/// Multiplication in GF(2^128) as defined for GHASH (NIST SP 800-38D, Algorithm 1).
/// Bits of `x` are consumed most significant first; `v` is shifted right with conditional
/// reduction by R = 11100001 || 0^120.
#[inline(always)]
pub(crate) fn gf_mul(x: [u8; 16], h: [u8; 16]) -> [u8; 16] {
    let x = u128::from_be_bytes(x);
    let mut v = u128::from_be_bytes(h);
    let mut z: u128 = 0;

    for i in 0..128 {
        let bit = (x >> (127 - i)) & 1;
        // z ^= v when the bit is set (branchless)
        z ^= v & (0u128.wrapping_sub(bit));

        // v = v * x; reduce if the bit shifted out was set
        let lsb = v & 1;
        v >>= 1;
        v ^= GHASH_R & (0u128.wrapping_sub(lsb));
    }

    z.to_be_bytes()
}

#[cfg(test)]
pub(crate) mod test_util {
    pub fn hex_to_bytes(s: &str) -> Vec<u8> {
        let s: String = s.split_whitespace().collect();
        assert!(s.len() % 2 == 0, "hex string must have even length");
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    pub fn hex_to_arr_12(hex: &str) -> [u8; 12] {
        hex_to_bytes(hex).try_into().expect("expected 12 bytes")
    }

    pub fn hex_to_arr_16(hex: &str) -> [u8; 16] {
        hex_to_bytes(hex).try_into().expect("expected 16 bytes")
    }

    // all test vectors from
    // https://nvlpubs.nist.gov/nistpubs/Legacy/SP/nistspecialpublication800-38a.pdf
    pub const PLAINTEXT: [u8; 64] = [
        0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, //
        0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17, 0x2a, //
        0xae, 0x2d, 0x8a, 0x57, 0x1e, 0x03, 0xac, 0x9c, //
        0x9e, 0xb7, 0x6f, 0xac, 0x45, 0xaf, 0x8e, 0x51, //
        0x30, 0xc8, 0x1c, 0x46, 0xa3, 0x5c, 0xe4, 0x11, //
        0xe5, 0xfb, 0xc1, 0x19, 0x1a, 0x0a, 0x52, 0xef, //
        0xf6, 0x9f, 0x24, 0x45, 0xdf, 0x4f, 0x9b, 0x17, //
        0xad, 0x2b, 0x41, 0x7b, 0xe6, 0x6c, 0x37, 0x10, //
    ];

    pub const KEY_128: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, //
        0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c, //
    ];

    pub const KEY_192: [u8; 24] = [
        0x8e, 0x73, 0xb0, 0xf7, 0xda, 0x0e, 0x64, 0x52, //
        0xc8, 0x10, 0xf3, 0x2b, 0x80, 0x90, 0x79, 0xe5, //
        0x62, 0xf8, 0xea, 0xd2, 0x52, 0x2c, 0x6b, 0x7b, //
    ];

    pub const KEY_256: [u8; 32] = [
        0x60, 0x3d, 0xeb, 0x10, 0x15, 0xca, 0x71, 0xbe, //
        0x2b, 0x73, 0xae, 0xf0, 0x85, 0x7d, 0x77, 0x81, //
        0x1f, 0x35, 0x2c, 0x07, 0x3b, 0x61, 0x08, 0xd7, //
        0x2d, 0x98, 0x10, 0xa3, 0x09, 0x14, 0xdf, 0xf4, //
    ];

    // CBC and CFB share this IV
    pub const CHAIN_IV: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, //
        0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, //
    ];

    pub const CTR_IV: [u8; 16] = [
        0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, //
        0xf8, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe, 0xff, //
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_util::hex_to_arr_16;

    #[test]
    fn gf_mul_identity_and_zero() {
        // the field's multiplicative identity is the block with only the leftmost bit set
        let one = hex_to_arr_16("80000000000000000000000000000000");
        let h = hex_to_arr_16("66e94bd4ef8a2c3b884cfa59ca342b2e");
        assert_eq!(gf_mul(one, h), h);
        assert_eq!(gf_mul(h, one), h);
        assert_eq!(gf_mul([0u8; 16], h), [0u8; 16]);
    }

    #[test]
    fn gf_mul_commutes() {
        let a = hex_to_arr_16("0388dace60b6a392f328c2b971b2fe78");
        let b = hex_to_arr_16("66e94bd4ef8a2c3b884cfa59ca342b2e");
        assert_eq!(gf_mul(a, b), gf_mul(b, a));
    }

    #[test]
    fn gf_mul_known_product() {
        // McGrew & Viega test case 2: X1 = C1 * H
        let c = hex_to_arr_16("0388dace60b6a392f328c2b971b2fe78");
        let h = hex_to_arr_16("66e94bd4ef8a2c3b884cfa59ca342b2e");
        assert_eq!(gf_mul(c, h), hex_to_arr_16("5e2ec746917062882c85b0685353deb7"));
    }

    #[test]
    fn xor_chunks_partial() {
        let y = [0xffu8; 16];
        let out = xor_chunks(&y, &[0x0f, 0xf0]);
        assert_eq!(&out[..2], &[0xf0, 0x0f]);
        assert_eq!(&out[2..], &[0xffu8; 14]);
    }

    #[test]
    fn block_alignment() {
        assert!(check_block_aligned(0, "test").is_ok());
        assert!(check_block_aligned(32, "test").is_ok());
        assert!(check_block_aligned(17, "test").is_err());
    }
}
