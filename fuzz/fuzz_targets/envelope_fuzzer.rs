//! Fuzz target for envelope sealing and opening
//!
//! # Strategy
//!
//! - Arbitrary shared secrets and nonces
//! - Arbitrary plaintexts sealed with a fixed nonce
//! - Arbitrary envelope text fed straight to the decoder
//! - Single-bit tampering at an arbitrary position
//!
//! # Invariants
//!
//! - Decoding arbitrary text never panics
//! - Seal/open roundtrip returns the plaintext
//! - Any flipped bit fails authentication
//! - A different secret fails authentication

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mailseal_crypto::{
    CryptoError, NONCE_SIZE, SharedSecret, TAG_SIZE,
    envelope::{decode_envelope, encode_envelope, open_envelope, seal_with_nonce},
};

#[derive(Debug, Arbitrary)]
struct EnvelopeScenario {
    secret: [u8; 32],
    other_secret: [u8; 32],
    nonce: [u8; NONCE_SIZE],
    plaintext: Vec<u8>,
    /// Bit to flip in the sealed envelope (wrapped to its length)
    flip_bit: u16,
    /// Raw text handed to the decoder
    text: String,
}

fuzz_target!(|scenario: EnvelopeScenario| {
    let secret = SharedSecret::from_bytes(scenario.secret);

    // INVARIANT 1: Arbitrary text never panics, and short input is malformed
    if let Ok(bytes) = decode_envelope(&scenario.text) {
        assert!(bytes.len() >= NONCE_SIZE, "decoded envelope shorter than nonce");
        let _ = open_envelope(&secret, &bytes);
    }

    // INVARIANT 2: Roundtrip
    let sealed = seal_with_nonce(&secret, &scenario.nonce, &scenario.plaintext);
    assert_eq!(sealed.len(), NONCE_SIZE + scenario.plaintext.len() + TAG_SIZE);

    let text = encode_envelope(&sealed);
    let decoded = decode_envelope(&text).unwrap();
    assert_eq!(open_envelope(&secret, &decoded).unwrap(), scenario.plaintext);

    // INVARIANT 3: Tampering is detected
    let bit = usize::from(scenario.flip_bit) % (sealed.len() * 8);
    let mut tampered = sealed.clone();
    tampered[bit / 8] ^= 1 << (bit % 8);
    assert!(matches!(open_envelope(&secret, &tampered), Err(CryptoError::AuthenticationFailure)));

    // INVARIANT 4: Wrong secret is rejected
    if scenario.other_secret != scenario.secret {
        let other = SharedSecret::from_bytes(scenario.other_secret);
        assert!(matches!(open_envelope(&other, &sealed), Err(CryptoError::AuthenticationFailure)));
    }
});
