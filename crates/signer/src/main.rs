use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use http::Method;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wechatpay_signer::{AuthorizationResult, KeyMaterialStore, SigningEngine, SigningRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Only the `Authorization` header value.
    Header,
    /// Header value, timestamp and nonce as JSON.
    Json,
}

/// Prints the `Authorization` header for one gateway request.
#[derive(Debug, Parser)]
#[clap(group(ArgGroup::new("key").required(true).args(["private_key", "pkcs12"])))]
struct Args {
    #[clap(long, env = "WECHATPAY_MCHID")]
    mchid: String,
    /// Serial number of the merchant certificate matching the key.
    #[clap(long, env = "WECHATPAY_SERIAL_NO")]
    serial_no: String,

    /// PEM file holding an unencrypted PKCS#8 private key.
    #[clap(long, env = "WECHATPAY_PRIVATE_KEY")]
    private_key: Option<PathBuf>,
    /// PKCS#12 container holding the merchant key.
    #[clap(long, env = "WECHATPAY_PKCS12")]
    pkcs12: Option<PathBuf>,
    /// Container password; defaults to the merchant id.
    #[clap(long, env = "WECHATPAY_PKCS12_PASSWORD", requires = "pkcs12")]
    pkcs12_password: Option<String>,
    /// Entry to take the key from; defaults to the first private key entry.
    #[clap(long, env = "WECHATPAY_PKCS12_ALIAS", requires = "pkcs12")]
    pkcs12_alias: Option<String>,

    #[clap(long, default_value = "GET", value_parser = parse_method)]
    method: Method,
    /// Path and query exactly as sent, e.g. `/v3/certificates?limit=5`.
    #[clap(long)]
    url_path: String,
    #[clap(long, conflicts_with = "body_file")]
    body: Option<String>,
    #[clap(long)]
    body_file: Option<PathBuf>,

    #[clap(long, value_enum, default_value = "header")]
    output: OutputFormat,
    #[clap(long, env = "RUST_LOG", default_value = "info")]
    log: String,
}

impl Args {
    fn load_keys(&self) -> Result<KeyMaterialStore> {
        let keys = KeyMaterialStore::new();
        if let Some(path) = &self.private_key {
            keys.load_from_pem(path)
                .with_context(|| format!("loading private key from {}", path.display()))?;
        } else if let Some(path) = &self.pkcs12 {
            let password = self.pkcs12_password.as_deref().unwrap_or(&self.mchid);
            keys.load_from_pkcs12(path, password, self.pkcs12_alias.as_deref())
                .with_context(|| format!("loading PKCS#12 container {}", path.display()))?;
        }
        Ok(keys)
    }

    fn request(&self) -> Result<SigningRequest> {
        let body = match (&self.body, &self.body_file) {
            (Some(body), _) => body.clone().into_bytes(),
            (None, Some(path)) => std::fs::read(path)
                .with_context(|| format!("reading request body from {}", path.display()))?,
            (None, None) => Vec::new(),
        };
        Ok(SigningRequest::new(self.method.clone(), &self.url_path, body))
    }
}

fn parse_method(value: &str) -> Result<Method, String> {
    Method::from_bytes(value.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid HTTP method `{value}`: {e}"))
}

fn render(result: &AuthorizationResult, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Header => Ok(result.header_value.clone()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(result).context("serializing authorization result")
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .with_writer(std::io::stderr)
        .init();

    let keys = Arc::new(args.load_keys()?);
    let engine = SigningEngine::new(keys);
    let request = args.request()?;

    let result = engine
        .sign_request(&request, &args.mchid, &args.serial_no)
        .context("signing request")?;
    info!(method = %request.method, url_path = %request.url_path, "request signed");

    println!("{}", render(&result, args.output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec![
            "wechatpay-sign",
            "--mchid",
            "1900000109",
            "--serial-no",
            "ABCDEF123",
            "--url-path",
            "/v3/test",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn method_is_uppercased() {
        let args = parse(&["--private-key", "key.pem", "--method", "post"]).unwrap();
        assert_eq!(args.method, Method::POST);
    }

    #[test]
    fn key_source_is_required() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn key_sources_are_exclusive() {
        assert!(parse(&["--private-key", "key.pem", "--pkcs12", "cert.p12"]).is_err());
    }

    #[test]
    fn body_and_body_file_conflict() {
        let args = parse(&["--private-key", "k.pem", "--body", "{}", "--body-file", "b.json"]);
        assert!(args.is_err());
    }

    #[test]
    fn pkcs12_password_falls_back_to_mchid() {
        let args = parse(&["--pkcs12", "tests/fixtures/apiclient_cert.p12"]).unwrap();
        assert!(args.pkcs12_password.is_none());
        let keys = args.load_keys().unwrap();
        assert!(keys.is_loaded());
    }

    #[test]
    fn json_output_has_three_fields() {
        let result = AuthorizationResult {
            header_value: "h".into(),
            timestamp: "1".into(),
            nonce: "n".into(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&render(&result, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
        assert_eq!(render(&result, OutputFormat::Header).unwrap(), "h");
    }
}
