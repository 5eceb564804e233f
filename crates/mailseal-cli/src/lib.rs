//! mailseal command-line front end
//!
//! Thin layer over `mailseal-crypto`: parses arguments, reads input from a
//! file or standard input, and writes exactly one result to the output.
//! Keys, secrets and envelopes are exchanged as standard base64 text.
//!
//! # Usage
//!
//! ```bash
//! mailseal keygen
//! mailseal secret --public <PEER_PUBLIC> --secret <OWN_SECRET>
//! echo '{"subject":"hi"}' | mailseal encrypt --secret <SHARED>
//! mailseal decrypt --secret <SHARED> --input envelope.txt
//! mailseal id --length 16
//! mailseal shasum "mail body" --salt pepper --algorithm sha512 --encoding hex
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;

use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use mailseal_crypto::{
    Alphabet, CryptoBox, DEFAULT_IDENTIFIER_LENGTH, DigestConfig, Digester, IdentifierConfig,
    IdentifierGenerator, PublicKey, SAFE_ALPHABET, SecretKey, SharedSecret, Value,
};
use serde::Serialize;
use zeroize::Zeroizing;

pub use crate::error::CliError;

/// mailseal command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mailseal")]
#[command(about = "Public-key sealed messages, identifiers and salted digests")]
#[command(version)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a key pair and print it as JSON
    Keygen,

    /// Derive the shared secret for a peer
    Secret {
        /// Peer public key (base64)
        #[arg(long = "public")]
        public_key: String,

        /// Own secret key (base64)
        #[arg(long = "secret")]
        secret_key: String,
    },

    /// Seal a JSON message into an envelope
    Encrypt {
        /// Shared secret (base64)
        #[arg(long)]
        secret: String,

        /// Read the message from this file instead of standard input
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Open an envelope and print the JSON message
    Decrypt {
        /// Shared secret (base64)
        #[arg(long)]
        secret: String,

        /// Read the envelope from this file instead of standard input
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print a random identifier
    Id {
        /// Number of symbols
        #[arg(short, long, default_value_t = DEFAULT_IDENTIFIER_LENGTH)]
        length: usize,

        /// Symbols to draw from
        #[arg(long, default_value = SAFE_ALPHABET)]
        alphabet: String,
    },

    /// Print the salted digest of a string
    Shasum {
        /// Text to digest
        data: String,

        /// Salt mixed into the digest
        #[arg(long)]
        salt: String,

        /// Hash function (sha224, sha256, sha384, sha512, sha512-256)
        #[arg(long, default_value = "sha256")]
        algorithm: String,

        /// Output encoding (base64, base64url, hex)
        #[arg(long, default_value = "base64")]
        encoding: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeygenOutput<'a> {
    public_key: &'a str,
    secret_key: &'a str,
}

/// Run `command`, reading from `stdin` when no input file is given.
///
/// The result is written to `out` followed by a newline. Nothing is written
/// on failure. Results that may hold key material or plaintext are zeroized
/// once written.
pub fn run(command: &Command, stdin: &mut dyn Read, out: &mut dyn Write) -> Result<(), CliError> {
    let crypto = CryptoBox::new();

    let output = match command {
        Command::Keygen => {
            let pair = crypto.generate_keypair()?;
            let public_key = pair.public.to_base64();
            let secret_key = pair.secret.to_base64();
            tracing::debug!(public_key = %public_key, "generated key pair");

            // No intermediate String holds the secret key
            serde_json::to_writer(
                &mut *out,
                &KeygenOutput { public_key: &public_key, secret_key: &secret_key },
            )?;
            writeln!(out)?;
            return Ok(());
        },
        Command::Secret { public_key, secret_key } => {
            let peer = PublicKey::from_base64(public_key)?;
            let own = SecretKey::from_base64(secret_key)?;
            let shared = crypto.compute_secret(&peer, &own)?;
            tracing::debug!(peer = %public_key, "derived shared secret");

            shared.to_base64()
        },
        Command::Encrypt { secret, input } => {
            let shared = SharedSecret::from_base64(secret)?;
            let text = Zeroizing::new(read_input(input.as_deref(), stdin)?);
            let message: Value = serde_json::from_str(&text)?;

            Zeroizing::new(crypto.encrypt_message(&shared, &message)?)
        },
        Command::Decrypt { secret, input } => {
            let shared = SharedSecret::from_base64(secret)?;
            let text = read_input(input.as_deref(), stdin)?;
            let message: Value = crypto.decrypt_message(&shared, text.trim())?;

            Zeroizing::new(serde_json::to_string(&message)?)
        },
        Command::Id { length, alphabet } => {
            let config = IdentifierConfig { alphabet: Alphabet::new(alphabet)?, length: *length };
            Zeroizing::new(IdentifierGenerator::new(config).create()?)
        },
        Command::Shasum { data, salt, algorithm, encoding } => {
            let config = DigestConfig { algorithm: algorithm.parse()?, encoding: encoding.parse()? };
            tracing::debug!(algorithm = %config.algorithm, encoding = %config.encoding, "computing digest");

            Zeroizing::new(Digester::new(config).compute(data.as_bytes(), salt.as_bytes()))
        },
    };

    writeln!(out, "{}", output.as_str())?;
    Ok(())
}

fn read_input(path: Option<&Path>, stdin: &mut dyn Read) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|source| CliError::ReadInput { path: path.to_path_buf(), source }),
        None => {
            let mut text = String::new();
            stdin.read_to_string(&mut text)?;
            Ok(text)
        },
    }
}
