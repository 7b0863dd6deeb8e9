use serde_derive::Deserialize;

use sealpost::api;
use sealpost::datetime_utils::FreshnessWindow;
use sealpost::key_material;
use sealpost::verify::Verifier;

/// Service knobs, read from the `[default.sealpost]` table in Rocket.toml
/// or `ROCKET_SEALPOST_*` environment variables.
#[derive(Deserialize)]
#[serde(default)]
struct ServiceConfig {
    public_key_path: String,
    freshness_secs: f64,
    skew_secs: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            public_key_path: "keys/public.pem".into(),
            freshness_secs: 300.0,
            skew_secs: 30.0,
        }
    }
}

#[rocket::main]
async fn main() {
    let config: ServiceConfig = rocket::Config::figment()
        .extract_inner("sealpost")
        .unwrap_or_default();

    let public_key = key_material::load_verifying_key(&config.public_key_path)
        .expect("failed to load verification key");

    let verifier = Verifier::new(public_key).with_window(FreshnessWindow::new(
        config.freshness_secs,
        config.skew_secs,
    ));

    println!("Verifying envelopes for {}", verifier.public_key_base64());

    api::setup_rocket(verifier)
        .launch()
        .await
        .expect("rocket failed to launch");
}
