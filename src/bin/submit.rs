use std::env;
use std::process;
use std::time::Duration;

use sealpost::envelope::EnvelopeBuilder;
use sealpost::errors::Result;
use sealpost::key_material::load_seed;
use sealpost::transport::{HttpTransport, Transport};

const DEFAULT_KEY_PATH: &str = "keys/private.pem";
const DEFAULT_URL: &str = "https://localhost:7151/api/v1/verify";
const DEFAULT_MESSAGE: &str = "hello from sealpost";

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        for cause in err.iter().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let key_path = args.next().unwrap_or_else(|| DEFAULT_KEY_PATH.into());
    let url = args.next().unwrap_or_else(|| DEFAULT_URL.into());
    let message = args.next().unwrap_or_else(|| DEFAULT_MESSAGE.into());

    let timeout = env::var("SEALPOST_TIMEOUT_SECS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(10);

    let seed = load_seed(&key_path)?;
    let builder = EnvelopeBuilder::new(&seed);

    // Print the public half only; the seed itself never leaves memory
    println!(
        "Signing as {}",
        base64::encode(builder.public_key().to_bytes())
    );

    let envelope = builder.build(&message)?;
    let outcome = HttpTransport::new(&url, Duration::from_secs(timeout))?.submit(&envelope)?;

    println!();
    println!("{}", outcome.status);
    println!("{}", outcome.body);

    Ok(())
}
