//! Fuzz target for message value decoding
//!
//! Feeds arbitrary bytes to the JSON decoder for `Value`.
//!
//! # Invariants
//!
//! - Decoding never panics
//! - Anything that decodes re-encodes, and decodes to the same value again

#![no_main]

use libfuzzer_sys::fuzz_target;
use mailseal_crypto::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    let encoded = serde_json::to_vec(&value).expect("decoded values must re-encode");
    let decoded: Value = serde_json::from_slice(&encoded).expect("re-encoded value must decode");
    assert_eq!(decoded, value);
});
