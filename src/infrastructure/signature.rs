use crate::domain::ports::SignatureVerifier;
use crate::error::{RelayError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Checks the lowercase hex HMAC-SHA256 the banking API attaches to each
/// webhook call, keyed by the secret issued when the webhook was created.
pub struct HmacSha256Verifier {
    keyed: HmacSha256,
}

impl HmacSha256Verifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let keyed = HmacSha256::new_from_slice(secret.as_ref())
            .map_err(|e| RelayError::SignatureError(format!("unusable webhook secret: {}", e)))?;
        Ok(Self { keyed })
    }

    /// Computes the signature for `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = self.keyed.clone();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl SignatureVerifier for HmacSha256Verifier {
    fn verify(&self, body: &[u8], signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        let mut mac = self.keyed.clone();
        mac.update(body);
        mac.verify_slice(&expected).is_ok()
    }
}
