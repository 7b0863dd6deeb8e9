//! Tamper-evident, replay-resistant request envelopes.
//!
//! A caller turns key material into a 32-byte Ed25519 seed, binds a message
//! to a fresh nonce and timestamp, signs the canonical payload bytes, and
//! ships the `{payload, signature}` envelope to a verification endpoint
//! over HTTPS. The receiving side re-serializes the payload with the
//! identical convention, checks the signature against the sender's known
//! public key, enforces timestamp freshness, and rejects replayed nonces.

pub mod api;
pub mod datetime_utils;
pub mod envelope;
pub mod errors;
pub mod key_material;
pub mod nonce_cache;
pub mod transport;
pub mod verify;
