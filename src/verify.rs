use std::fmt;

use ed25519_dalek::{Signature, VerifyingKey};
use log::warn;
use serde_derive::{Deserialize, Serialize};

use crate::datetime_utils::{Clock, FreshnessWindow, SystemClock};
use crate::envelope::SignedEnvelope;
use crate::errors::*;
use crate::nonce_cache::NonceCache;

/// Why an envelope failed verification. These are protocol outcomes, not
/// internal faults; on the wire they map to 401 and in logs to warnings so
/// security events stay distinguishable from infrastructure errors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    MalformedSignature,
    BadSignature,
    StaleTimestamp,
    ReplayedNonce,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::MalformedSignature => "malformed_signature",
            InvalidReason::BadSignature => "bad_signature",
            InvalidReason::StaleTimestamp => "stale_timestamp",
            InvalidReason::ReplayedNonce => "replayed_nonce",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the verification state machine: an envelope starts unverified
/// and lands in exactly one of these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Valid,
    Invalid(InvalidReason),
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid)
    }

    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            VerificationResult::Valid => None,
            VerificationResult::Invalid(reason) => Some(*reason),
        }
    }
}

/// Receiver-side mirror of the envelope builder: holds the sender's known
/// public key, the freshness window, and the replay cache.
pub struct Verifier {
    public_key: VerifyingKey,
    signer_id: String, // base64 public key, keys the replay cache
    window: FreshnessWindow,
    nonces: NonceCache,
    clock: Box<dyn Clock>,
}

impl Verifier {
    pub fn new(public_key: VerifyingKey) -> Self {
        let window = FreshnessWindow::default();
        Self {
            signer_id: base64::encode(public_key.to_bytes()),
            public_key,
            nonces: NonceCache::new(window.max_age_secs),
            window,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the freshness window; the replay cache is resized to match,
    /// since nonces only need remembering for as long as a timestamp stays
    /// acceptable.
    pub fn with_window(mut self, window: FreshnessWindow) -> Self {
        self.nonces = NonceCache::new(window.max_age_secs);
        self.window = window;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn public_key_base64(&self) -> &str {
        &self.signer_id
    }

    /// Run the verification state machine over one envelope.
    ///
    /// `Ok(Invalid(_))` is the normal rejection path; `Err(_)` is reserved
    /// for internal faults (the payload failed to re-serialize).
    pub fn verify(&self, envelope: &SignedEnvelope) -> Result<VerificationResult> {
        // Re-serialize with the same canonical convention the signer used
        let signable = envelope.payload.canonical_bytes()?;

        let sig_bytes = match base64::decode(&envelope.signature) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(self.reject(InvalidReason::MalformedSignature, envelope)),
        };
        let sig_raw: [u8; 64] = match sig_bytes.as_slice().try_into() {
            Ok(raw) => raw,
            Err(_) => return Ok(self.reject(InvalidReason::MalformedSignature, envelope)),
        };
        let signature = Signature::from_bytes(&sig_raw);

        if self
            .public_key
            .verify_strict(&signable, &signature)
            .is_err()
        {
            return Ok(self.reject(InvalidReason::BadSignature, envelope));
        }

        let now = self.clock.now();
        if !self.window.permits(envelope.payload.timestamp, now) {
            return Ok(self.reject(InvalidReason::StaleTimestamp, envelope));
        }

        // Atomic check-then-insert; a rejected signature never gets here,
        // so invalid traffic cannot poison the nonce cache
        if !self
            .nonces
            .check_and_insert(&self.signer_id, &envelope.payload.nonce, now)
        {
            return Ok(self.reject(InvalidReason::ReplayedNonce, envelope));
        }

        Ok(VerificationResult::Valid)
    }

    fn reject(&self, reason: InvalidReason, envelope: &SignedEnvelope) -> VerificationResult {
        warn!(
            "rejected envelope ({}): nonce={} timestamp={}",
            reason, envelope.payload.nonce, envelope.payload.timestamp
        );
        VerificationResult::Invalid(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;

    use crate::datetime_utils::FixedClock;
    use crate::envelope::EnvelopeBuilder;
    use crate::key_material::{FixedEntropy, KeySeed};

    const NOW: f64 = 1_700_000_000.0;

    fn seed() -> KeySeed {
        KeySeed::from_bytes(&[9u8; 32]).unwrap()
    }

    fn builder_at(time: f64) -> EnvelopeBuilder {
        EnvelopeBuilder::new(&seed()).with_clock(Box::new(FixedClock(time)))
    }

    fn verifier_at(time: f64) -> Verifier {
        Verifier::new(seed().signing_key().verifying_key()).with_clock(Box::new(FixedClock(time)))
    }

    #[test]
    fn valid_envelope_verifies() {
        let envelope = builder_at(NOW).build("all good").unwrap();
        assert_eq!(
            verifier_at(NOW).verify(&envelope).unwrap(),
            VerificationResult::Valid
        );
    }

    #[test]
    fn any_single_byte_mutation_invalidates() {
        let mut envelope = builder_at(NOW).build("do not touch").unwrap();

        let index = rand::thread_rng().gen_range(0..envelope.payload.message.len());
        let mut bytes = envelope.payload.message.into_bytes();
        bytes[index] ^= 0x01;
        envelope.payload.message = String::from_utf8(bytes).unwrap();

        assert_eq!(
            verifier_at(NOW).verify(&envelope).unwrap(),
            VerificationResult::Invalid(InvalidReason::BadSignature)
        );
    }

    #[test]
    fn tampered_timestamp_invalidates() {
        let mut envelope = builder_at(NOW).build("tick").unwrap();
        envelope.payload.timestamp += 1.0;

        assert_eq!(
            verifier_at(NOW).verify(&envelope).unwrap(),
            VerificationResult::Invalid(InvalidReason::BadSignature)
        );
    }

    #[test]
    fn undecodable_signature_is_malformed() {
        let mut envelope = builder_at(NOW).build("sig checks").unwrap();
        envelope.signature = "!!!not base64!!!".into();

        assert_eq!(
            verifier_at(NOW).verify(&envelope).unwrap(),
            VerificationResult::Invalid(InvalidReason::MalformedSignature)
        );
    }

    #[test]
    fn wrong_length_signature_is_malformed() {
        let mut envelope = builder_at(NOW).build("sig checks").unwrap();
        envelope.signature = base64::encode([0u8; 12]);

        assert_eq!(
            verifier_at(NOW).verify(&envelope).unwrap(),
            VerificationResult::Invalid(InvalidReason::MalformedSignature)
        );
    }

    #[test]
    fn hour_old_envelope_is_stale() {
        // Five minute window, envelope from an hour ago
        let envelope = builder_at(NOW - 3600.0).build("old news").unwrap();

        assert_eq!(
            verifier_at(NOW).verify(&envelope).unwrap(),
            VerificationResult::Invalid(InvalidReason::StaleTimestamp)
        );
    }

    #[test]
    fn future_envelope_beyond_skew_is_stale() {
        let envelope = builder_at(NOW + 120.0).build("from the future").unwrap();

        assert_eq!(
            verifier_at(NOW).verify(&envelope).unwrap(),
            VerificationResult::Invalid(InvalidReason::StaleTimestamp)
        );
    }

    #[test]
    fn small_clock_skew_is_tolerated() {
        let envelope = builder_at(NOW + 10.0).build("clock drift").unwrap();
        assert!(verifier_at(NOW).verify(&envelope).unwrap().is_valid());
    }

    #[test]
    fn replayed_nonce_is_rejected() {
        let builder = builder_at(NOW).with_entropy(Box::new(FixedEntropy([5u8; 32])));
        let verifier = verifier_at(NOW);

        let first = builder.build("pay me once").unwrap();
        let second = builder.build("pay me once").unwrap(); // same nonce on purpose

        assert_eq!(verifier.verify(&first).unwrap(), VerificationResult::Valid);
        assert_eq!(
            verifier.verify(&second).unwrap(),
            VerificationResult::Invalid(InvalidReason::ReplayedNonce)
        );
    }

    #[test]
    fn distinct_nonces_both_verify() {
        let verifier = verifier_at(NOW);
        let builder = builder_at(NOW);

        assert!(verifier
            .verify(&builder.build("first").unwrap())
            .unwrap()
            .is_valid());
        assert!(verifier
            .verify(&builder.build("second").unwrap())
            .unwrap()
            .is_valid());
    }
}
