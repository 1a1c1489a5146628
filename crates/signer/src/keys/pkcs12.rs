use p12_keystore::{KeyStore, KeyStoreEntry};
use rsa::RsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;

use crate::error::KeyLoadError;

/// Decrypts a PKCS#12 container and extracts one RSA private key.
///
/// The same password unlocks the container and the key entry. With no
/// `alias`, the first private-key entry in alias order is taken, which is
/// the only entry in gateway-issued merchant certificates.
///
/// Returns the alias that was used alongside the key.
pub(crate) fn parse_pkcs12(
    der: &[u8],
    password: &str,
    alias: Option<&str>,
) -> Result<(String, RsaPrivateKey), KeyLoadError> {
    let store = KeyStore::from_pkcs12(der, password)
        .map_err(|e| KeyLoadError::Pkcs12(e.to_string()))?;

    let (alias, chain) = match alias {
        Some(alias) => match store.entry(alias) {
            Some(KeyStoreEntry::PrivateKeyChain(chain)) => (alias, chain),
            Some(_) => return Err(KeyLoadError::AliasNotPrivateKey(alias.to_owned())),
            None => return Err(KeyLoadError::AliasNotFound(alias.to_owned())),
        },
        None => store.private_key_chain().ok_or(KeyLoadError::NoPrivateKey)?,
    };

    let key = RsaPrivateKey::from_pkcs8_der(chain.key())
        .map_err(|e| KeyLoadError::Pkcs8(e.to_string()))?;
    Ok((alias.to_owned(), key))
}
