pub mod canonical;
pub mod header;
mod engine;
mod request;
pub(crate) mod rsa;
mod signer;

pub use engine::SigningEngine;
pub use request::{AuthorizationResult, Nonce, SigningRequest, Timestamp};
pub use self::rsa::RsaSigner;
pub use signer::RequestSigner;
