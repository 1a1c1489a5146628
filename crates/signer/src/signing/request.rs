use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{SigningEngineError, SigningStep};

use http::Method;
use serde::Serialize;
use uuid::Uuid;

/// An outbound gateway request, reduced to the parts that are signed.
///
/// `url_path` carries the path and any query string exactly as sent on the
/// wire (already percent-encoded, no scheme or host).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    pub method: Method,
    pub url_path: String,
    pub body: Vec<u8>,
}

impl SigningRequest {
    pub fn new(method: Method, url_path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method,
            url_path: url_path.into(),
            body: body.into(),
        }
    }

    pub fn get(url_path: impl Into<String>) -> Self {
        Self::new(Method::GET, url_path, Vec::new())
    }

    pub fn post(url_path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::POST, url_path, body)
    }
}

/// Unix epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn now() -> Result<Self, SigningEngineError> {
        Self::from_system_time(SystemTime::now())
    }

    /// Fails for instants before the Unix epoch; the gateway would reject them.
    pub fn from_system_time(time: SystemTime) -> Result<Self, SigningEngineError> {
        let elapsed = time.duration_since(UNIX_EPOCH).map_err(|e| {
            SigningEngineError::signing(SigningStep::Clock, format!("clock is before 1970: {e}"))
        })?;
        Ok(Self(elapsed.as_secs()))
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single-use random token mixed into every signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nonce(String);

impl Nonce {
    /// 32 lowercase hex characters from a random v4 UUID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a caller gets back from a signing call.
///
/// `header_value` goes into the `Authorization` header; `timestamp` and
/// `nonce` are the values embedded in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationResult {
    pub header_value: String,
    pub timestamp: String,
    pub nonce: String,
}
