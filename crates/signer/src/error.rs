use std::fmt;
use std::path::PathBuf;

/// Failure to produce a signing key from a PEM or PKCS#12 source.
#[derive(Debug, thiserror::Error)]
pub enum KeyLoadError {
    #[error("Failed to read key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported PEM block `{0}`, expected an unencrypted `PRIVATE KEY` (PKCS#8)")]
    UnsupportedPemLabel(String),
    #[error("Private key payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Private key is not a PKCS#8 RSA key: {0}")]
    Pkcs8(String),
    #[error("Failed to open PKCS#12 container (wrong password or malformed store): {0}")]
    Pkcs12(String),
    #[error("PKCS#12 container holds no private key entry")]
    NoPrivateKey,
    #[error("PKCS#12 container has no entry named `{0}`")]
    AliasNotFound(String),
    /// The alias names a trusted-certificate entry. Certificate bags without
    /// a trust attribute are dropped on decode and surface as `AliasNotFound`.
    #[error("PKCS#12 entry `{0}` holds a certificate, not a private key")]
    AliasNotPrivateKey(String),
    #[error("Signing key is already loaded")]
    AlreadyLoaded,
}

/// Stage of a signing call that rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStep {
    /// The request itself is unusable (bad url path, newline in a single-line field).
    Request,
    /// The system clock could not produce an epoch timestamp.
    Clock,
    /// The RSA primitive refused the key or message.
    Sign,
}

impl fmt::Display for SigningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningStep::Request => f.write_str("request validation"),
            SigningStep::Clock => f.write_str("timestamp capture"),
            SigningStep::Sign => f.write_str("RSA signing"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SigningEngineError {
    #[error(transparent)]
    KeyLoad(#[from] KeyLoadError),
    #[error("Signing key has not been loaded; initialize the key store before signing")]
    NotInitialized,
    #[error("Signing failed during {step}: {reason}")]
    Signing { step: SigningStep, reason: String },
}

impl SigningEngineError {
    pub(crate) fn signing(step: SigningStep, reason: impl Into<String>) -> Self {
        Self::Signing {
            step,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_load_error_is_transparent() {
        let error = SigningEngineError::from(KeyLoadError::NoPrivateKey);
        assert_eq!(
            error.to_string(),
            "PKCS#12 container holds no private key entry"
        );
        assert!(matches!(error, SigningEngineError::KeyLoad(_)));
    }

    #[test]
    fn signing_error_names_the_step() {
        let error =
            SigningEngineError::signing(SigningStep::Request, "url path must start with `/`");
        assert_eq!(
            error.to_string(),
            "Signing failed during request validation: url path must start with `/`"
        );
    }

    #[test]
    fn io_error_mentions_path() {
        let error = KeyLoadError::Io {
            path: PathBuf::from("missing.pem"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(error.to_string().contains("missing.pem"));
    }
}
