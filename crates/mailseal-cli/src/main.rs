//! mailseal binary.
//!
//! # Usage
//!
//! ```bash
//! # Generate keys for both sides, then derive the shared secret
//! mailseal keygen
//! mailseal secret --public <PEER_PUBLIC> --secret <OWN_SECRET>
//!
//! # Seal and open a message
//! echo '{"subject":"hi","body":"hello"}' | mailseal encrypt --secret <SHARED> > envelope.txt
//! mailseal decrypt --secret <SHARED> --input envelope.txt
//! ```

use std::io;

use clap::Parser;
use mailseal_cli::{Args, run};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(err) = run(&args.command, &mut stdin.lock(), &mut stdout.lock()) {
        if err.is_integrity_failure() {
            tracing::warn!("Rejected input: {err}");
        } else {
            tracing::error!("{err}");
        }
        return Err(err.into());
    }

    Ok(())
}
