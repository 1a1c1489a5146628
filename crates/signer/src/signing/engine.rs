use std::sync::Arc;

use http::Method;
use tracing::debug;

use super::request::{AuthorizationResult, Nonce, SigningRequest, Timestamp};
use super::signer::RequestSigner;
use super::{canonical, header};
use crate::error::{SigningEngineError, SigningStep};
use crate::keys::KeyMaterialStore;

/// Signs gateway requests with the key held by a [`KeyMaterialStore`].
///
/// Cheap to clone and safe to share across threads; every call draws its own
/// timestamp and nonce and only reads the key.
#[derive(Clone)]
pub struct SigningEngine {
    keys: Arc<KeyMaterialStore>,
}

impl SigningEngine {
    pub fn new(keys: Arc<KeyMaterialStore>) -> Self {
        Self { keys }
    }

    pub fn sign(
        &self,
        method: &Method,
        url_path: &str,
        body: &[u8],
        merchant_id: &str,
        serial_no: &str,
    ) -> Result<AuthorizationResult, SigningEngineError> {
        self.sign_parts(
            method,
            url_path,
            body,
            merchant_id,
            serial_no,
            Timestamp::now()?,
            &Nonce::generate(),
        )
    }

    pub fn sign_request(
        &self,
        request: &SigningRequest,
        merchant_id: &str,
        serial_no: &str,
    ) -> Result<AuthorizationResult, SigningEngineError> {
        self.sign(
            &request.method,
            &request.url_path,
            &request.body,
            merchant_id,
            serial_no,
        )
    }

    /// Signs with a caller-chosen timestamp and nonce.
    ///
    /// Reusing either value across requests defeats the gateway's replay
    /// protection; this exists for fixed test vectors.
    pub fn sign_at(
        &self,
        request: &SigningRequest,
        merchant_id: &str,
        serial_no: &str,
        timestamp: Timestamp,
        nonce: &Nonce,
    ) -> Result<AuthorizationResult, SigningEngineError> {
        self.sign_parts(
            &request.method,
            &request.url_path,
            &request.body,
            merchant_id,
            serial_no,
            timestamp,
            nonce,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn sign_parts(
        &self,
        method: &Method,
        url_path: &str,
        body: &[u8],
        merchant_id: &str,
        serial_no: &str,
        timestamp: Timestamp,
        nonce: &Nonce,
    ) -> Result<AuthorizationResult, SigningEngineError> {
        let signer = self.keys.signer()?;
        validate(url_path, nonce)?;

        let message = canonical::build(method, url_path, timestamp, nonce, body);
        debug!(
            canonical_message = %String::from_utf8_lossy(&message),
            "built signing string"
        );

        let signature = signer.sign_base64(&message)?;
        let timestamp = timestamp.to_string();
        let header_value = header::build(
            merchant_id,
            nonce.as_str(),
            &timestamp,
            serial_no,
            &signature,
        );

        Ok(AuthorizationResult {
            header_value,
            timestamp,
            nonce: nonce.as_str().to_owned(),
        })
    }
}

fn validate(url_path: &str, nonce: &Nonce) -> Result<(), SigningEngineError> {
    if !url_path.starts_with('/') {
        return Err(SigningEngineError::signing(
            SigningStep::Request,
            format!("url path `{url_path}` must start with `/`"),
        ));
    }
    if nonce.as_str().is_empty() || nonce.as_str().contains(['\n', '"']) {
        return Err(SigningEngineError::signing(
            SigningStep::Request,
            "nonce must be non-empty and contain no newline or quote",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_PEM: &str = include_str!("../../tests/fixtures/apiclient_key.pem");

    fn loaded_engine() -> SigningEngine {
        let keys = KeyMaterialStore::new();
        keys.load_from_pem_str(FIXTURE_PEM).unwrap();
        SigningEngine::new(Arc::new(keys))
    }

    #[test]
    fn sign_before_load_is_not_initialized() {
        let engine = SigningEngine::new(Arc::new(KeyMaterialStore::new()));
        let error = engine
            .sign(&Method::GET, "/v3/test", b"", "1900000109", "ABCDEF123")
            .unwrap_err();
        assert!(matches!(error, SigningEngineError::NotInitialized));
    }

    #[test]
    fn header_carries_returned_timestamp_and_nonce() {
        let engine = loaded_engine();
        let result = engine
            .sign(&Method::GET, "/v3/test", b"", "1900000109", "ABCDEF123")
            .unwrap();
        assert_eq!(result.nonce.len(), 32);
        assert!(result.header_value.contains(&format!("nonce_str=\"{}\"", result.nonce)));
        assert!(result.header_value.contains(&format!("timestamp=\"{}\"", result.timestamp)));
    }

    #[test]
    fn relative_url_path_is_rejected() {
        let engine = loaded_engine();
        let error = engine
            .sign(&Method::GET, "v3/test", b"", "1900000109", "ABCDEF123")
            .unwrap_err();
        assert!(matches!(
            error,
            SigningEngineError::Signing {
                step: SigningStep::Request,
                ..
            }
        ));
    }

    #[test]
    fn nonce_with_newline_is_rejected() {
        let engine = loaded_engine();
        let error = engine
            .sign_at(
                &SigningRequest::get("/v3/test"),
                "1900000109",
                "ABCDEF123",
                Timestamp::from_secs(1700000000),
                &Nonce::new("abc\ndef"),
            )
            .unwrap_err();
        assert!(matches!(
            error,
            SigningEngineError::Signing {
                step: SigningStep::Request,
                ..
            }
        ));
    }

    #[test]
    fn fixed_timestamp_and_nonce_are_deterministic() {
        let engine = loaded_engine();
        let request =
            SigningRequest::post("/v3/refund/domestic/refunds", r#"{"out_refund_no":"1"}"#);
        let nonce = Nonce::new("593BEC0C930BF1AFEB40B4A08C8FB242");
        let timestamp = Timestamp::from_secs(1554208460);
        let first = engine
            .sign_at(&request, "1900000109", "ABCDEF123", timestamp, &nonce)
            .unwrap();
        let second = engine
            .sign_at(&request, "1900000109", "ABCDEF123", timestamp, &nonce)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SigningEngine>();
    }
}
