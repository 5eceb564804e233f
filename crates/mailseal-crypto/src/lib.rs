//! mailseal Cryptographic Primitives
//!
//! Public-key authenticated encryption for structured messages, plus the two
//! small utilities that sit next to it: random identifiers and salted
//! digests.
//!
//! # Message Sealing
//!
//! ```text
//! own SecretKey + peer PublicKey
//!        │
//!        ▼
//! X25519 → HSalsa20 → SharedSecret (same on both sides)
//!        │
//!        ▼
//! Value → JSON → XSalsa20-Poly1305 (fresh 24-byte nonce) → base64 envelope
//! ```
//!
//! This is NaCl `crypto_box` split into its `beforenm`/`afternm` halves.
//! Envelopes are `base64(nonce || tag || ciphertext)`. Opening one either
//! returns exactly what was sealed or fails; there is no partial result.
//!
//! # Security
//!
//! Confidentiality and Authenticity:
//! - XSalsa20-Poly1305 AEAD, keyed by the shared secret
//! - Any modified bit (nonce, ciphertext or tag) -> `AuthenticationFailure`
//!
//! Nonce Uniqueness:
//! - Every [`CryptoBox::encrypt_message`] call draws a fresh random nonce
//! - 192-bit nonces make random collisions negligible
//!
//! Secret Lifetime:
//! - [`SecretKey`] and [`SharedSecret`] are zeroized on drop
//! - Nothing here stores, caches or logs key material
//!
//! # Randomness
//!
//! Everything random goes through [`RandomSource`]. Production code uses
//! [`OsRandom`]; tests inject seeded sources.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod crypto_box;
pub mod digest;
pub mod envelope;
mod error;
pub mod identifier;
pub mod keys;
mod random;
pub mod value;

pub use crypto_box::{CryptoBox, decrypt_message, encrypt_message, generate_keypair};
pub use digest::{Algorithm, DigestConfig, Digester, Encoding, compute_shasum};
pub use envelope::{NONCE_SIZE, TAG_SIZE};
pub use error::CryptoError;
pub use identifier::{
    Alphabet, DEFAULT_IDENTIFIER_LENGTH, IdentifierConfig, IdentifierGenerator, SAFE_ALPHABET,
    create_safe_identifier,
};
pub use keys::{
    KeyPair, PUBLIC_KEY_SIZE, PublicKey, SECRET_KEY_SIZE, SHARED_SECRET_SIZE, SecretKey,
    SharedSecret, compute_secret, compute_secret_from_bytes,
};
pub use random::{OsRandom, RandomSource};
pub use value::Value;
