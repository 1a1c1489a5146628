pub(crate) mod pem;
mod pkcs12;

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use rsa::RsaPrivateKey;
use tracing::{info, warn};

use crate::error::{KeyLoadError, SigningEngineError};
use crate::signing::{RequestSigner, RsaSigner};
use crate::signing::rsa::EXPECTED_KEY_BITS;

/// Where the loaded key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Pem,
    Pkcs12 { alias: String },
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Pem => f.write_str("PKCS#8 PEM"),
            KeySource::Pkcs12 { alias } => write!(f, "PKCS#12 entry `{alias}`"),
        }
    }
}

struct LoadedKey {
    signer: RsaSigner,
    source: KeySource,
}

/// Holds the merchant's private key once it has been loaded.
///
/// Starts empty. Exactly one load may succeed; afterwards the key is
/// immutable and read without locking. Share it with `Arc` and hand it to
/// [`SigningEngine::new`](crate::SigningEngine::new).
#[derive(Default)]
pub struct KeyMaterialStore {
    key: OnceLock<LoadedKey>,
}

impl KeyMaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an unencrypted PKCS#8 key from a PEM file.
    pub fn load_from_pem(&self, path: impl AsRef<Path>) -> Result<(), KeyLoadError> {
        self.ensure_empty()?;
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| KeyLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_pem_str(&text)
    }

    pub fn load_from_pem_str(&self, text: &str) -> Result<(), KeyLoadError> {
        self.ensure_empty()?;
        let key = pem::parse_pkcs8_pem(text)?;
        self.install(key, KeySource::Pem)
    }

    /// Loads the private key from a password protected PKCS#12 file.
    ///
    /// Gateway-issued containers use the merchant id as password. See
    /// [`load_from_pkcs12_der`](Self::load_from_pkcs12_der) for alias selection.
    pub fn load_from_pkcs12(
        &self,
        path: impl AsRef<Path>,
        password: &str,
        alias: Option<&str>,
    ) -> Result<(), KeyLoadError> {
        self.ensure_empty()?;
        let path = path.as_ref();
        let der = std::fs::read(path).map_err(|source| KeyLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_pkcs12_der(&der, password, alias)
    }

    /// With `alias` unset the first private-key entry is used. Containers
    /// holding several keys should name the entry explicitly.
    pub fn load_from_pkcs12_der(
        &self,
        der: &[u8],
        password: &str,
        alias: Option<&str>,
    ) -> Result<(), KeyLoadError> {
        self.ensure_empty()?;
        let (alias, key) = pkcs12::parse_pkcs12(der, password, alias)?;
        self.install(key, KeySource::Pkcs12 { alias })
    }

    pub fn is_loaded(&self) -> bool {
        self.key.get().is_some()
    }

    pub fn source(&self) -> Option<&KeySource> {
        self.key.get().map(|loaded| &loaded.source)
    }

    pub(crate) fn signer(&self) -> Result<&RsaSigner, SigningEngineError> {
        self.key
            .get()
            .map(|loaded| &loaded.signer)
            .ok_or(SigningEngineError::NotInitialized)
    }

    fn ensure_empty(&self) -> Result<(), KeyLoadError> {
        if self.is_loaded() {
            return Err(KeyLoadError::AlreadyLoaded);
        }
        Ok(())
    }

    fn install(&self, key: RsaPrivateKey, source: KeySource) -> Result<(), KeyLoadError> {
        let signer = RsaSigner::new(key);
        let key_bits = signer.key_bits();
        if key_bits != EXPECTED_KEY_BITS {
            warn!(key_bits, "merchant key is not RSA-2048; the gateway may reject signatures");
        }

        let description = source.to_string();
        let algorithm = signer.algorithm().to_owned();
        self.key
            .set(LoadedKey { signer, source })
            .map_err(|_| KeyLoadError::AlreadyLoaded)?;
        info!(source = %description, key_bits, %algorithm, "merchant private key loaded");
        Ok(())
    }
}

impl fmt::Debug for KeyMaterialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterialStore")
            .field("source", &self.source())
            .finish_non_exhaustive()
    }
}
