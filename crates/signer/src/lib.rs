pub mod error;
pub mod keys;
pub mod signing;

pub use error::{KeyLoadError, SigningEngineError, SigningStep};
pub use keys::{KeyMaterialStore, KeySource};
pub use signing::{
    AuthorizationResult, Nonce, RequestSigner, RsaSigner, SigningEngine, SigningRequest, Timestamp,
};
