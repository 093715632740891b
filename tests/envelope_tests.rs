// Envelope helpers: padded CBC/CFB round trips, transport form, and failure modes.

use aeskit::{
    AesMode, EncryptedData, Error, Key, KeySize, Result, add_iv_to_ciphertext, decrypt,
    decrypt_cbc, decrypt_to_string, encrypt, encrypt_str, extract_iv_from_ciphertext, pad,
    unpad,
};
use hex_literal::hex;

const KEY_128: [u8; 16] = hex!("2b7e151628aed2a6abf7158809cf4f3c");
const MODES: [AesMode; 2] = [AesMode::Cbc, AesMode::Cfb];

#[test]
fn round_trip_various_lengths() -> Result<()> {
    for size in [KeySize::Bits128, KeySize::Bits192, KeySize::Bits256] {
        let key = Key::generate(size)?;
        for mode in MODES {
            for len in [0, 1, 15, 16, 17, 31, 32, 100] {
                let plaintext: Vec<u8> = (0..len as u8).collect();
                let envelope = encrypt(&plaintext, key.as_bytes(), mode)?;

                assert_eq!(envelope.ciphertext.len(), pad(&plaintext).len());
                assert_eq!(decrypt(&envelope, key.as_bytes(), mode)?, plaintext);
            }
        }
    }
    Ok(())
}

#[test]
fn string_round_trip() -> Result<()> {
    let message = "The quick brown fox jumps over the lazy dog. Ünïcödé ✓";
    for mode in MODES {
        let envelope = encrypt_str(message, &KEY_128, mode)?;
        assert_eq!(decrypt_to_string(&envelope, &KEY_128, mode)?, message);
    }

    let empty = encrypt_str("", &KEY_128, AesMode::Cbc)?;
    assert_eq!(empty.ciphertext.len(), 16);
    assert_eq!(decrypt_to_string(&empty, &KEY_128, AesMode::Cbc)?, "");
    Ok(())
}

#[test]
fn non_utf8_plaintext_fails_string_decrypt() -> Result<()> {
    let envelope = encrypt(&[0xff, 0xfe, 0x00], &KEY_128, AesMode::Cfb)?;
    assert!(matches!(
        decrypt_to_string(&envelope, &KEY_128, AesMode::Cfb),
        Err(Error::InvalidUtf8(_))
    ));
    Ok(())
}

#[test]
fn envelope_is_padded_cbc_under_its_iv() -> Result<()> {
    let plaintext = b"sixteen byte msg plus more";
    let envelope = encrypt(plaintext, &KEY_128, AesMode::Cbc)?;

    let raw = decrypt_cbc(&envelope.ciphertext, &KEY_128, &envelope.iv)?;
    assert_eq!(raw, pad(plaintext));
    assert_eq!(unpad(&raw)?, plaintext);
    Ok(())
}

#[test]
fn fresh_iv_per_encryption() -> Result<()> {
    let a = encrypt(b"same message", &KEY_128, AesMode::Cbc)?;
    let b = encrypt(b"same message", &KEY_128, AesMode::Cbc)?;
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
    Ok(())
}

#[test]
fn transport_form() -> Result<()> {
    let envelope = encrypt(b"over the wire", &KEY_128, AesMode::Cfb)?;

    let bytes = envelope.to_bytes();
    assert_eq!(bytes.len(), 16 + envelope.ciphertext.len());
    assert_eq!(bytes[..16], envelope.iv);

    let parsed = EncryptedData::from_bytes(&bytes)?;
    assert_eq!(parsed.iv, envelope.iv);
    assert_eq!(parsed.ciphertext, envelope.ciphertext);
    assert_eq!(decrypt(&parsed, &KEY_128, AesMode::Cfb)?, b"over the wire");

    let (iv, ciphertext) = extract_iv_from_ciphertext(&add_iv_to_ciphertext(&[], &envelope.iv))?;
    assert_eq!(iv, envelope.iv);
    assert!(ciphertext.is_empty());
    Ok(())
}

#[test]
fn short_transport_input_rejected() {
    assert!(matches!(
        EncryptedData::from_bytes(&[0u8; 15]),
        Err(Error::InputTooShort { len: 15 })
    ));
    assert!(matches!(
        extract_iv_from_ciphertext(&[]),
        Err(Error::InputTooShort { len: 0 })
    ));
}

#[test]
fn wrong_key_does_not_recover_plaintext() -> Result<()> {
    let plaintext = b"for the right key only";
    let other_key = [0x11u8; 16];

    for mode in MODES {
        let envelope = encrypt(plaintext, &KEY_128, mode)?;
        match decrypt(&envelope, &other_key, mode) {
            Err(Error::InvalidPadding) => {}
            Ok(recovered) => assert_ne!(recovered, plaintext),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn invalid_key_length_rejected() -> Result<()> {
    assert!(matches!(
        encrypt(b"data", &[0u8; 10], AesMode::Cbc),
        Err(Error::InvalidKeyLength { len: 10 })
    ));

    let envelope = encrypt(b"data", &KEY_128, AesMode::Cbc)?;
    assert!(matches!(
        decrypt(&envelope, &[0u8; 10], AesMode::Cbc),
        Err(Error::InvalidKeyLength { len: 10 })
    ));
    Ok(())
}

#[test]
fn truncated_ciphertext_rejected() -> Result<()> {
    let mut envelope = encrypt(b"truncate me please", &KEY_128, AesMode::Cbc)?;
    envelope.ciphertext.truncate(20);
    assert!(matches!(
        decrypt(&envelope, &KEY_128, AesMode::Cbc),
        Err(Error::InvalidDataLength { len: 20, .. })
    ));
    Ok(())
}
