//! Salted one-way digests
//!
//! The salt is mixed in as an HMAC key: `digest = HMAC-H(key = salt, data)`
//! for the selected SHA-2 function `H`, then encoded as text. An empty salt
//! is allowed and gives HMAC with an empty key, not the bare hash.

use std::{fmt, str::FromStr};

use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL},
};
use hmac::{Hmac, Mac, digest::KeyInit};
use sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_256};

use crate::error::CryptoError;

/// Hash function used under HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// SHA-224
    Sha224,
    /// SHA-256
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
    /// SHA-512/256
    Sha512_256,
}

impl Algorithm {
    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha512_256 => "sha512-256",
        }
    }

    /// Raw digest size in bytes.
    pub fn output_size(self) -> usize {
        match self {
            Self::Sha224 => 28,
            Self::Sha256 | Self::Sha512_256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    /// Case-insensitive; accepts `sha256` and `sha-256` spellings.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "sha224" | "sha-224" => Ok(Self::Sha224),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha384" | "sha-384" => Ok(Self::Sha384),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            "sha512-256" | "sha-512/256" => Ok(Self::Sha512_256),
            _ => Err(CryptoError::UnsupportedAlgorithm { name: name.to_string() }),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text encoding of the raw digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Standard alphabet with padding
    #[default]
    Base64,
    /// URL-safe alphabet without padding
    Base64Url,
    /// Lowercase hexadecimal
    Hex,
}

impl Encoding {
    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
            Self::Hex => "hex",
        }
    }

    /// Encode raw digest bytes.
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => BASE64.encode(bytes),
            Self::Base64Url => BASE64_URL.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }
}

impl FromStr for Encoding {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "hex" => Ok(Self::Hex),
            _ => Err(CryptoError::UnsupportedEncoding { name: name.to_string() }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigestConfig {
    /// Hash function, SHA-256 by default
    pub algorithm: Algorithm,
    /// Output encoding, base64 by default
    pub encoding: Encoding,
}

/// Computes salted digests with a fixed configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Digester {
    config: DigestConfig,
}

impl Digester {
    /// Digester for `config`.
    pub fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> DigestConfig {
        self.config
    }

    /// Raw digest bytes of `data` salted with `salt`.
    pub fn digest(&self, data: &[u8], salt: &[u8]) -> Vec<u8> {
        match self.config.algorithm {
            Algorithm::Sha224 => keyed::<Hmac<Sha224>>(salt, data),
            Algorithm::Sha256 => keyed::<Hmac<Sha256>>(salt, data),
            Algorithm::Sha384 => keyed::<Hmac<Sha384>>(salt, data),
            Algorithm::Sha512 => keyed::<Hmac<Sha512>>(salt, data),
            Algorithm::Sha512_256 => keyed::<Hmac<Sha512_256>>(salt, data),
        }
    }

    /// Encoded digest of `data` salted with `salt`.
    pub fn compute(&self, data: &[u8], salt: &[u8]) -> String {
        self.config.encoding.encode(&self.digest(data, salt))
    }
}

fn keyed<M: Mac + KeyInit>(salt: &[u8], data: &[u8]) -> Vec<u8> {
    let Ok(mut mac) = <M as KeyInit>::new_from_slice(salt) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Salted digest with algorithm and encoding given by name.
///
/// Pass `"sha256"` and `"base64"` for the defaults.
///
/// # Errors
///
/// - `UnsupportedAlgorithm`: unknown hash name
/// - `UnsupportedEncoding`: unknown encoding name
pub fn compute_shasum(
    data: &[u8],
    salt: &[u8],
    algorithm: &str,
    encoding: &str,
) -> Result<String, CryptoError> {
    let config = DigestConfig { algorithm: algorithm.parse()?, encoding: encoding.parse()? };
    Ok(Digester::new(config).compute(data, salt))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ALGORITHMS: [Algorithm; 5] = [
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Sha512_256,
    ];

    #[test]
    fn hmac_sha256_known_answer() {
        // RFC 4231 test case 2
        let digest =
            compute_shasum(b"what do ya want for nothing?", b"Jefe", "sha256", "hex").unwrap();
        assert_eq!(digest, "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");
    }

    #[test]
    fn hmac_sha512_known_answer() {
        // RFC 4231 test case 2
        let digest =
            compute_shasum(b"what do ya want for nothing?", b"Jefe", "sha512", "hex").unwrap();
        assert_eq!(
            digest,
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn empty_salt_is_hmac_with_empty_key() {
        let digest = compute_shasum(b"", b"", "sha256", "hex").unwrap();
        assert_eq!(digest, "b613679a0814d9ec772f95d778c35fc5ff1697c493715653c6c712144292c5ad");
    }

    #[test]
    fn defaults_are_sha256_base64() {
        let config = DigestConfig::default();
        assert_eq!(config.algorithm, Algorithm::Sha256);
        assert_eq!(config.encoding, Encoding::Base64);

        let by_name = compute_shasum(b"data", b"salt", "sha256", "base64").unwrap();
        assert_eq!(Digester::default().compute(b"data", b"salt"), by_name);
        // 32 bytes -> 44 base64 characters with padding
        assert_eq!(by_name.len(), 44);
        assert!(by_name.ends_with('='));
    }

    #[test]
    fn deterministic() {
        let first = compute_shasum(b"mail body", b"salt", "sha256", "base64").unwrap();
        let second = compute_shasum(b"mail body", b"salt", "sha256", "base64").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn data_and_salt_both_matter() {
        let base = compute_shasum(b"mail body", b"salt", "sha256", "hex").unwrap();
        let other_data = compute_shasum(b"mail bodY", b"salt", "sha256", "hex").unwrap();
        let other_salt = compute_shasum(b"mail body", b"salT", "sha256", "hex").unwrap();

        assert_ne!(base, other_data);
        assert_ne!(base, other_salt);
    }

    #[test]
    fn output_sizes_match_algorithm() {
        for algorithm in ALL_ALGORITHMS {
            let digester = Digester::new(DigestConfig { algorithm, encoding: Encoding::Hex });
            let raw = digester.digest(b"data", b"salt");
            assert_eq!(raw.len(), algorithm.output_size(), "{algorithm}");
            assert_eq!(digester.compute(b"data", b"salt").len(), algorithm.output_size() * 2);
        }
    }

    #[test]
    fn algorithm_names_roundtrip() {
        for algorithm in ALL_ALGORITHMS {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert_eq!("SHA-256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("sha-512/256".parse::<Algorithm>().unwrap(), Algorithm::Sha512_256);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let result = compute_shasum(b"data", b"salt", "md5", "base64");
        assert!(matches!(result, Err(CryptoError::UnsupportedAlgorithm { name }) if name == "md5"));
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let result = compute_shasum(b"data", b"salt", "sha256", "latin1");
        assert!(matches!(result, Err(CryptoError::UnsupportedEncoding { name }) if name == "latin1"));
    }

    #[test]
    fn encodings_agree_on_bytes() {
        let raw = Digester::default().digest(b"data", b"salt");

        let b64 = compute_shasum(b"data", b"salt", "sha256", "base64").unwrap();
        let url = compute_shasum(b"data", b"salt", "sha256", "base64url").unwrap();
        let hex = compute_shasum(b"data", b"salt", "sha256", "hex").unwrap();

        assert_eq!(BASE64.decode(b64).unwrap(), raw);
        assert_eq!(BASE64_URL.decode(&url).unwrap(), raw);
        assert_eq!(hex::decode(hex).unwrap(), raw);
        assert!(!url.contains(['+', '/', '=']));
    }
}
