use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde_derive::{Deserialize, Serialize};

use crate::datetime_utils::{Clock, SystemClock};
use crate::errors::*;
use crate::key_material::{nonce, Entropy, KeySeed, SystemEntropy};

/// The signed portion of a request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Payload {
    pub message: String, // utf8 data
    pub timestamp: f64,  // fractional seconds since epoch
    pub nonce: String,   // base64url, no padding, 256 bits of entropy
}

impl Payload {
    /// Canonical serialization: the exact bytes that get signed.
    ///
    /// The convention, byte for byte: compact JSON (no whitespace), keys in
    /// the order `message`, `timestamp`, `nonce`, strings escaped the way
    /// serde_json escapes them, and the timestamp printed in shortest
    /// round-trip form (integral values keep a trailing `.0`). Re-serializing
    /// a decoded payload reproduces the signed bytes exactly, which is what
    /// lets the receiver verify without ever seeing the original byte stream.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).chain_err(|| "failed to serialize payload")
    }
}

/// A payload paired with the base64 signature over its canonical bytes.
/// Nested on the wire: `{"payload": {...}, "signature": "..."}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignedEnvelope {
    pub payload: Payload,
    pub signature: String, // base64 encoded 64-byte Ed25519 signature
}

/// Builds signed envelopes from a seed. The clock and entropy source are
/// injected capabilities; defaults are the real system clock and the global
/// secure random generator.
pub struct EnvelopeBuilder {
    signing_key: SigningKey,
    clock: Box<dyn Clock>,
    entropy: Box<dyn Entropy>,
}

impl EnvelopeBuilder {
    pub fn new(seed: &KeySeed) -> Self {
        Self {
            signing_key: seed.signing_key(),
            clock: Box::new(SystemClock),
            entropy: Box::new(SystemEntropy),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_entropy(mut self, entropy: Box<dyn Entropy>) -> Self {
        self.entropy = entropy;
        self
    }

    /// Public half of the keypair derived from the seed.
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Bind `message` to a fresh nonce and the current time, then sign.
    pub fn build(&self, message: &str) -> Result<SignedEnvelope> {
        let payload = Payload {
            message: message.to_owned(),
            timestamp: self.clock.now(),
            nonce: nonce(self.entropy.as_ref())?,
        };

        // Sign the canonical bytes themselves, never a re-serialization
        let signable = payload.canonical_bytes()?;
        let signature = self.signing_key.sign(&signable);

        Ok(SignedEnvelope {
            payload,
            signature: base64::encode(signature.to_bytes()),
        })
    }
}
