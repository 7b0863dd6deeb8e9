use std::time::Duration;

use crate::envelope::SignedEnvelope;
use crate::errors::*;

/// What came back from the verification endpoint. The core surfaces it
/// untouched; interpreting the body is the caller's business.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub status: u16,
    pub body: String,
}

/// Boundary to the remote verification endpoint: one envelope in, one
/// response out. No retries, no pooling policy, no response interpretation.
pub trait Transport {
    fn submit(&self, envelope: &SignedEnvelope) -> Result<SubmitOutcome>;
}

/// HTTPS POST transport with a bounded timeout. Certificate validation
/// stays on; there is no knob to turn it off.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::from(ErrorKind::TransportError(e.to_string())))?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }
}

impl Transport for HttpTransport {
    fn submit(&self, envelope: &SignedEnvelope) -> Result<SubmitOutcome> {
        let response = self
            .client
            .post(self.url.as_str())
            .json(envelope)
            .send()
            .map_err(|e| -> Error {
                if e.is_timeout() {
                    ErrorKind::TransportTimeout.into()
                } else {
                    ErrorKind::TransportError(e.to_string()).into()
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Error::from(ErrorKind::TransportError(e.to_string())))?;

        Ok(SubmitOutcome { status, body })
    }
}
