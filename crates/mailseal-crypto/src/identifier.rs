//! Random identifiers over a restricted alphabet
//!
//! Symbols are picked by masking random bytes down to the smallest power of
//! two covering the alphabet and discarding out-of-range values, so every
//! symbol is equally likely (no modulo bias).

use crate::{
    error::CryptoError,
    random::{OsRandom, RandomSource},
};

/// Alphabet of identifiers already issued: digits without `0`, lowercase
/// letters.
pub const SAFE_ALPHABET: &str = "123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier length when none is given
pub const DEFAULT_IDENTIFIER_LENGTH: usize = 12;

/// Upper bound on random bytes drawn per fill
const MAX_BATCH: usize = 4096;

/// A validated identifier alphabet.
///
/// # Invariants
///
/// - At least one symbol
/// - ASCII only, so one symbol is one byte of the output string
/// - No repeated symbols (repeats would skew the distribution), which
///   caps the size at 128
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
}

impl Alphabet {
    /// Validate an alphabet.
    pub fn new(symbols: &str) -> Result<Self, CryptoError> {
        if symbols.is_empty() {
            return Err(CryptoError::InvalidArgument { reason: "alphabet is empty".to_string() });
        }
        if !symbols.is_ascii() {
            return Err(CryptoError::InvalidArgument {
                reason: "alphabet must be ASCII".to_string(),
            });
        }

        let mut seen = [false; 128];
        for byte in symbols.bytes() {
            let slot = &mut seen[usize::from(byte)];
            if *slot {
                return Err(CryptoError::InvalidArgument {
                    reason: format!("alphabet repeats symbol {:?}", char::from(byte)),
                });
            }
            *slot = true;
        }

        Ok(Self { symbols: symbols.as_bytes().to_vec() })
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; empty alphabets are rejected.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// True if `identifier` only uses symbols from this alphabet.
    pub fn contains_all(&self, identifier: &str) -> bool {
        identifier.bytes().all(|b| self.symbols.contains(&b))
    }

    /// Smallest `2^k - 1` covering every symbol index.
    fn mask(&self) -> usize {
        self.symbols.len().next_power_of_two() - 1
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self { symbols: SAFE_ALPHABET.as_bytes().to_vec() }
    }
}

/// Identifier generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierConfig {
    /// Symbols to draw from
    pub alphabet: Alphabet,
    /// Length used by [`IdentifierGenerator::create`]
    pub length: usize,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self { alphabet: Alphabet::default(), length: DEFAULT_IDENTIFIER_LENGTH }
    }
}

/// Produces random identifiers.
///
/// No uniqueness is enforced; choose a length whose collision probability
/// suits the caller.
#[derive(Debug, Clone, Default)]
pub struct IdentifierGenerator<R = OsRandom> {
    config: IdentifierConfig,
    rng: R,
}

impl IdentifierGenerator<OsRandom> {
    /// Generator over the OS random source.
    pub fn new(config: IdentifierConfig) -> Self {
        Self { config, rng: OsRandom }
    }
}

impl<R: RandomSource> IdentifierGenerator<R> {
    /// Generator drawing from `rng`.
    pub fn with_rng(config: IdentifierConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Active configuration.
    pub fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    /// Identifier of the configured default length.
    pub fn create(&self) -> Result<String, CryptoError> {
        self.create_safe_identifier(self.config.length)
    }

    /// Identifier of exactly `length` symbols.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: `length` is zero
    /// - `Entropy`: the random source failed
    pub fn create_safe_identifier(&self, length: usize) -> Result<String, CryptoError> {
        if length == 0 {
            return Err(CryptoError::InvalidArgument {
                reason: "identifier length must be positive".to_string(),
            });
        }

        let symbols = &self.config.alphabet.symbols;
        let mask = self.config.alphabet.mask();

        // Expected accepted fraction is len / (mask + 1) >= 1/2; over-draw so
        // one batch usually suffices for short identifiers
        let batch = length.saturating_mul(2).clamp(16, MAX_BATCH);
        let mut buffer = vec![0u8; batch];
        let mut id = String::with_capacity(length.min(MAX_BATCH));

        while id.len() < length {
            self.rng.fill_bytes(&mut buffer)?;
            for &byte in &buffer {
                let index = usize::from(byte) & mask;
                if let Some(&symbol) = symbols.get(index) {
                    id.push(char::from(symbol));
                    if id.len() == length {
                        break;
                    }
                }
            }
        }

        Ok(id)
    }
}

/// Identifier over [`SAFE_ALPHABET`] from the OS random source.
pub fn create_safe_identifier(length: usize) -> Result<String, CryptoError> {
    IdentifierGenerator::new(IdentifierConfig::default()).create_safe_identifier(length)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn safe_alphabet_is_exact() {
        assert_eq!(SAFE_ALPHABET.len(), 35);
        assert!(!SAFE_ALPHABET.contains('0'));
        assert!(SAFE_ALPHABET.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(Alphabet::default(), Alphabet::new(SAFE_ALPHABET).unwrap());
    }

    #[test]
    fn default_length_is_twelve() {
        let generator = IdentifierGenerator::new(IdentifierConfig::default());
        assert_eq!(generator.create().unwrap().len(), 12);
    }

    #[test]
    fn requested_length_is_exact() {
        for length in [1, 2, 12, 21, 100, 1000] {
            let id = create_safe_identifier(length).unwrap();
            assert_eq!(id.len(), length);
            assert!(Alphabet::default().contains_all(&id));
        }
    }

    #[test]
    fn zero_length_is_invalid() {
        let result = create_safe_identifier(0);
        assert!(matches!(result, Err(CryptoError::InvalidArgument { .. })));
    }

    #[test]
    fn identifiers_differ() {
        let ids: HashSet<String> = (0..100).map(|_| create_safe_identifier(12).unwrap()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn custom_alphabet_is_respected() {
        let config = IdentifierConfig { alphabet: Alphabet::new("ab").unwrap(), length: 64 };
        let id = IdentifierGenerator::new(config).create().unwrap();

        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn single_symbol_alphabet() {
        let config = IdentifierConfig { alphabet: Alphabet::new("x").unwrap(), length: 5 };
        let id = IdentifierGenerator::new(config).create().unwrap();
        assert_eq!(id, "xxxxx");
    }

    #[test]
    fn invalid_alphabets_are_rejected() {
        assert!(matches!(Alphabet::new(""), Err(CryptoError::InvalidArgument { .. })));
        assert!(matches!(Alphabet::new("aba"), Err(CryptoError::InvalidArgument { .. })));
        assert!(matches!(Alphabet::new("abcé"), Err(CryptoError::InvalidArgument { .. })));
    }

    #[test]
    fn mask_covers_alphabet() {
        assert_eq!(Alphabet::default().mask(), 63);
        assert_eq!(Alphabet::new("ab").unwrap().mask(), 1);
        assert_eq!(Alphabet::new("abc").unwrap().mask(), 3);
        assert_eq!(Alphabet::new("x").unwrap().mask(), 0);
    }

    #[test]
    fn huge_length_does_not_overflow() {
        struct Broken;

        impl RandomSource for Broken {
            fn fill_bytes(&self, _buffer: &mut [u8]) -> Result<(), CryptoError> {
                Err(CryptoError::Entropy { reason: "no entropy".to_string() })
            }
        }

        let generator = IdentifierGenerator::with_rng(IdentifierConfig::default(), Broken);
        for length in [usize::MAX / 2 + 1, usize::MAX] {
            let result = generator.create_safe_identifier(length);
            assert!(matches!(result, Err(CryptoError::Entropy { .. })));
        }
    }

    #[test]
    fn long_identifiers_span_several_batches() {
        let id = create_safe_identifier(3 * MAX_BATCH).unwrap();
        assert_eq!(id.len(), 3 * MAX_BATCH);
        assert!(Alphabet::default().contains_all(&id));
    }

    #[test]
    fn out_of_range_bytes_are_skipped() {
        struct Fixed;

        impl RandomSource for Fixed {
            fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
                // 35 and 63 fall outside the 35-symbol alphabet after masking
                for (i, byte) in buffer.iter_mut().enumerate() {
                    *byte = [35, 0, 63, 34][i % 4];
                }
                Ok(())
            }
        }

        let generator = IdentifierGenerator::with_rng(IdentifierConfig::default(), Fixed);
        assert_eq!(generator.create_safe_identifier(4).unwrap(), "1z1z");
    }
}
