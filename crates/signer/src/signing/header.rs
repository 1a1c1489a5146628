/// Authorization scheme for RSA-2048 / SHA-256 signed requests.
pub const SCHEME: &str = "WECHATPAY2-SHA256-RSA2048";

/// Assembles the `Authorization` header value.
///
/// Field order is fixed by the gateway's parser. Values are inserted without
/// escaping; none of them may contain `"`.
pub fn build(
    merchant_id: &str,
    nonce: &str,
    timestamp: &str,
    serial_no: &str,
    signature: &str,
) -> String {
    format!(
        "{SCHEME} mchid=\"{merchant_id}\",nonce_str=\"{nonce}\",timestamp=\"{timestamp}\",serial_no=\"{serial_no}\",signature=\"{signature}\""
    )
}
