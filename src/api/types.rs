use serde_derive::{Deserialize, Serialize};

use crate::verify::{InvalidReason, VerificationResult};

/// Wire verdict: `{"valid": <bool>, "reason": <snake_case reason>?}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidReason>,
}

impl From<VerificationResult> for VerifyResponse {
    fn from(result: VerificationResult) -> Self {
        Self {
            valid: result.is_valid(),
            reason: result.reason(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct KeyResponse {
    pub public_key: String, // base64 encoded Ed25519 public key
}
