//! Envelope sealing using `XSalsa20-Poly1305` (NaCl `crypto_box_afternm`)
//!
//! Wire format, before base64:
//!
//! ```text
//! +------------+-------------------+----------------------------+
//! | nonce (24) | Poly1305 tag (16) | ciphertext (plaintext len) |
//! +------------+-------------------+----------------------------+
//! ```
//!
//! The bytes after the nonce are exactly what NaCl's `box.after` produces,
//! so envelopes interoperate with other NaCl implementations holding the
//! same shared key. The text form is the standard padded base64 of those bytes. Functions in
//! this module are pure: nonces come from the caller, which lets tests and
//! fuzzers pin them. [`crate::CryptoBox`] is the entry point that draws a
//! fresh nonce for every message.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use xsalsa20poly1305::{
    Nonce, XSalsa20Poly1305,
    aead::{Aead, KeyInit},
};

use crate::{error::CryptoError, keys::SharedSecret};

/// `XSalsa20` nonce size (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Encrypt `plaintext` under `secret` and `nonce`.
///
/// Returns `nonce || tag || ciphertext`.
///
/// # Security
///
/// The nonce MUST NOT be reused with the same secret. Reuse leaks the XOR of
/// the two plaintexts and allows forgeries.
pub fn seal_with_nonce(
    secret: &SharedSecret,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Vec<u8> {
    let cipher = XSalsa20Poly1305::new(secret.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(nonce), plaintext) else {
        unreachable!("XSalsa20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut envelope = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    envelope.extend_from_slice(nonce);
    envelope.extend_from_slice(&ciphertext);
    envelope
}

/// Authenticate and decrypt raw envelope bytes.
///
/// # Errors
///
/// - `MalformedEnvelope`: fewer bytes than a nonce
/// - `AuthenticationFailure`: tag mismatch (tampering, wrong secret,
///   corrupted nonce, truncated ciphertext)
pub fn open_envelope(secret: &SharedSecret, envelope: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let Some((nonce, ciphertext)) = envelope.split_first_chunk::<NONCE_SIZE>() else {
        return Err(CryptoError::MalformedEnvelope {
            reason: format!("{} bytes is shorter than the {NONCE_SIZE}-byte nonce", envelope.len()),
        });
    };

    let cipher = XSalsa20Poly1305::new(secret.as_bytes().into());
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

/// Text form of raw envelope bytes.
pub fn encode_envelope(envelope: &[u8]) -> String {
    BASE64.encode(envelope)
}

/// Raw bytes of an envelope's text form.
///
/// # Errors
///
/// - `MalformedEnvelope`: not valid padded base64, or shorter than a nonce
pub fn decode_envelope(text: &str) -> Result<Vec<u8>, CryptoError> {
    let bytes = BASE64
        .decode(text)
        .map_err(|e| CryptoError::MalformedEnvelope { reason: format!("invalid base64: {e}") })?;

    if bytes.len() < NONCE_SIZE {
        return Err(CryptoError::MalformedEnvelope {
            reason: format!("{} bytes is shorter than the {NONCE_SIZE}-byte nonce", bytes.len()),
        });
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_secret(fill: u8) -> SharedSecret {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_add(fill);
        }
        SharedSecret::from_bytes(key)
    }

    #[test]
    fn seal_open_roundtrip() {
        let secret = test_secret(0);
        let plaintext = b"Hello, World!";

        let envelope = seal_with_nonce(&secret, &[0xAB; NONCE_SIZE], plaintext);
        let opened = open_envelope(&secret, &envelope).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn seal_open_empty_message() {
        let secret = test_secret(0);

        let envelope = seal_with_nonce(&secret, &[0x00; NONCE_SIZE], b"");
        assert_eq!(envelope.len(), NONCE_SIZE + TAG_SIZE);

        let opened = open_envelope(&secret, &envelope).unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn seal_open_large_message() {
        let secret = test_secret(7);
        let plaintext = vec![0x42u8; 64 * 1024]; // 64KB

        let envelope = seal_with_nonce(&secret, &[0xFF; NONCE_SIZE], &plaintext);
        let opened = open_envelope(&secret, &envelope).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn envelope_layout() {
        let secret = test_secret(0);
        let nonce = [0x11; NONCE_SIZE];
        let plaintext = b"test message";

        let envelope = seal_with_nonce(&secret, &nonce, plaintext);

        assert_eq!(&envelope[..NONCE_SIZE], &nonce);
        assert_eq!(envelope.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);
    }

    #[test]
    fn matches_nacl_box_vector() {
        // NaCl box test vector: shared key from the RFC 7748 key pairs
        let mut key = [0u8; 32];
        hex::decode_to_slice(
            "1b27556473e985d462cd51197a9a46c76009549eac6474f206c4ee0844f68389",
            &mut key,
        )
        .unwrap();
        let secret = SharedSecret::from_bytes(key);

        let mut nonce = [0u8; NONCE_SIZE];
        hex::decode_to_slice("69696ee955b62b73cd62bda875fc73d68219e0036b7a0b37", &mut nonce)
            .unwrap();

        let plaintext =
            hex::decode("be075fc53c81f2d5cf141316ebeb0c7b5228c52a4c62cbd44b66849b64244ffc")
                .unwrap();

        let envelope = seal_with_nonce(&secret, &nonce, &plaintext);

        // Keystream agrees with NaCl; tag depends on the full message, so
        // only the ciphertext body is compared
        let body = &envelope[NONCE_SIZE + TAG_SIZE..];
        assert_eq!(
            hex::encode(body),
            "8e993b9f48681273c29650ba32fc76ce48332ea7164d96a4476fb8c531a1186a"
        );
        assert_eq!(open_envelope(&secret, &envelope).unwrap(), plaintext);
    }

    #[test]
    fn tag_precedes_ciphertext() {
        let secret = test_secret(0);
        let nonce = [0x22; NONCE_SIZE];

        let letter = seal_with_nonce(&secret, &nonce, b"x");
        let zero = seal_with_nonce(&secret, &nonce, &[0u8]);

        // Same keystream, so the last byte differs by exactly the plaintext
        assert_eq!(letter.len(), NONCE_SIZE + TAG_SIZE + 1);
        assert_eq!(letter[NONCE_SIZE + TAG_SIZE] ^ zero[NONCE_SIZE + TAG_SIZE], b'x');
        assert_ne!(letter[NONCE_SIZE..NONCE_SIZE + TAG_SIZE], zero[NONCE_SIZE..NONCE_SIZE + TAG_SIZE]);
    }

    #[test]
    fn different_nonces_produce_different_ciphertexts() {
        let secret = test_secret(0);

        let first = seal_with_nonce(&secret, &[0x00; NONCE_SIZE], b"test");
        let second = seal_with_nonce(&secret, &[0xFF; NONCE_SIZE], b"test");

        assert_ne!(first[NONCE_SIZE..], second[NONCE_SIZE..]);
    }

    #[test]
    fn wrong_secret_fails_authentication() {
        let envelope = seal_with_nonce(&test_secret(0), &[0x00; NONCE_SIZE], b"secret message");

        let result = open_envelope(&test_secret(1), &envelope);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let secret = test_secret(0);
        let mut envelope = seal_with_nonce(&secret, &[0x00; NONCE_SIZE], b"original message");

        envelope[NONCE_SIZE] ^= 0xFF;

        let result = open_envelope(&secret, &envelope);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn tampered_nonce_fails_authentication() {
        let secret = test_secret(0);
        let mut envelope = seal_with_nonce(&secret, &[0x00; NONCE_SIZE], b"original message");

        envelope[0] ^= 0x01;

        let result = open_envelope(&secret, &envelope);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn nonce_only_envelope_fails_authentication() {
        // Long enough to hold a nonce, too short for a tag
        let result = open_envelope(&test_secret(0), &[0u8; NONCE_SIZE + 3]);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn short_envelope_is_malformed() {
        let result = open_envelope(&test_secret(0), &[0u8; NONCE_SIZE - 1]);
        assert!(matches!(result, Err(CryptoError::MalformedEnvelope { .. })));
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let result = decode_envelope("not-valid-base64!!");
        assert!(matches!(result, Err(CryptoError::MalformedEnvelope { reason }) if reason.contains("base64")));
    }

    #[test]
    fn decode_rejects_short_payload() {
        let text = encode_envelope(&[0u8; 10]);
        let result = decode_envelope(&text);
        assert!(matches!(result, Err(CryptoError::MalformedEnvelope { reason }) if reason.contains("shorter")));
    }

    #[test]
    fn encode_decode_preserves_bytes() {
        let envelope = seal_with_nonce(&test_secret(3), &[0x5A; NONCE_SIZE], b"payload");
        assert_eq!(decode_envelope(&encode_envelope(&envelope)).unwrap(), envelope);
    }
}
