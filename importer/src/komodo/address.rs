//! Normalization of user-supplied Komodo addresses

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::errors::ImportError;

static QUOTES_UNWRAP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"(.*)"$"#).expect("valid quote regex"));

/// A normalized web address
#[derive(Debug, Clone)]
pub struct UrlData {
    pub url: Url,
    /// String form without trailing slash
    pub normal: String,
    /// Explicit port, or the scheme's default
    pub port: u16,
}

/// Normalize an address like `192.168.0.100:9120` into a full URL.
///
/// A missing scheme defaults to `http`, unless the port is 443 in which
/// case `https` is assumed.
pub fn normalize_web_address(val: &str) -> Result<UrlData, ImportError> {
    let mut clean = val.trim().to_string();
    if let Some(caps) = QUOTES_UNWRAP_RE.captures(&clean) {
        clean = caps[1].trim().to_string();
    }
    let had_scheme = clean.contains("://");
    if !had_scheme {
        clean = format!("http://{}", clean);
    }

    let mut url = Url::parse(&clean)
        .map_err(|e| ImportError::ConfigError(format!("Invalid URL '{}': {}", val, e)))?;

    let port = match url.port() {
        Some(port) => {
            if port == 443 && !had_scheme && url.scheme() == "http" {
                url.set_scheme("https").map_err(|_| {
                    ImportError::ConfigError(format!("Could not upgrade '{}' to https", val))
                })?;
            }
            port
        }
        None if url.scheme() == "https" => 443,
        None => 80,
    };

    let normal = url.as_str().trim_end_matches('/').to_string();
    Ok(UrlData { url, normal, port })
}
