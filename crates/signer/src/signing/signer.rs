use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::SigningEngineError;

/// Trait for signing canonical request bytes.
///
/// Implementations are sync — signing is CPU-bound.
pub trait RequestSigner: Send + Sync {
    /// Sign canonical bytes. Returns raw signature bytes.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SigningEngineError>;

    /// Algorithm identifier string (e.g. "SHA256withRSA").
    fn algorithm(&self) -> &str;

    /// Sign and encode as standard base64, padded, without line wrapping.
    fn sign_base64(&self, data: &[u8]) -> Result<String, SigningEngineError> {
        let signature = self.sign(data)?;
        Ok(STANDARD.encode(signature))
    }
}
