use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use sha2::Sha256;

use super::signer::RequestSigner;
use crate::error::{SigningEngineError, SigningStep};

pub(crate) const EXPECTED_KEY_BITS: usize = 2048;

/// RSA PKCS#1 v1.5 signer with SHA-256 digest (`SHA256withRSA`).
///
/// Holds the only copy of the private key; it is never handed back out.
pub struct RsaSigner {
    signing_key: SigningKey<Sha256>,
    key_bits: usize,
}

impl RsaSigner {
    pub(crate) fn new(private_key: RsaPrivateKey) -> Self {
        let key_bits = private_key.size() * 8;
        let signing_key = SigningKey::<Sha256>::new(private_key);
        Self {
            signing_key,
            key_bits,
        }
    }

    /// Modulus size in bits.
    pub fn key_bits(&self) -> usize {
        self.key_bits
    }
}

impl RequestSigner for RsaSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SigningEngineError> {
        let signature = self
            .signing_key
            .try_sign(data)
            .map_err(|e| SigningEngineError::signing(SigningStep::Sign, e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn algorithm(&self) -> &str {
        "SHA256withRSA"
    }
}
