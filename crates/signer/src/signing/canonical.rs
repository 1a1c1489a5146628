use http::Method;

use super::request::{Nonce, Timestamp};

/// Builds the exact bytes that get signed:
/// `METHOD\nURL_PATH\nTIMESTAMP\nNONCE\nBODY\n`.
///
/// Fields are copied verbatim. The method uses its wire token, which is
/// uppercase for every standard verb; the gateway rejects any other casing.
pub fn build(
    method: &Method,
    url_path: &str,
    timestamp: Timestamp,
    nonce: &Nonce,
    body: &[u8],
) -> Vec<u8> {
    let timestamp = timestamp.to_string();
    let fields: [&[u8]; 5] = [
        method.as_str().as_bytes(),
        url_path.as_bytes(),
        timestamp.as_bytes(),
        nonce.as_str().as_bytes(),
        body,
    ];

    let len = fields.iter().map(|field| field.len() + 1).sum();
    let mut message = Vec::with_capacity(len);
    for field in fields {
        message.extend_from_slice(field);
        message.push(b'\n');
    }
    message
}
