//! Request/response transport used by the vault client.
//!
//! [`VaultTransport`] is the seam between the wire client and the network:
//! the client builds [`VaultRequest`]s and interprets [`VaultResponse`]s,
//! the transport only moves bytes. Retries, deadlines and backoff belong
//! to the transport, never to the client.
//!
//! [`HttpTransport`] is the production implementation on a blocking
//! `reqwest` client with rustls.

use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::Url;

use crate::errors::{EdvError, Result};

/// HTTP method of a vault request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to the vault. Bodies are always JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Vec<u8>>,
}

/// What the client needs from a vault response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultResponse {
    pub status: u16,
    /// Value of the `Location` header, if present.
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl VaultResponse {
    /// The body as text, for error messages.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Moves one request to the vault and returns its response.
///
/// Any response the server produced, whatever its status, is `Ok`.
/// `Err` means the request never got an answer and must be an
/// [`EdvError::Transport`].
pub trait VaultTransport: Send + Sync {
    fn send(&self, request: VaultRequest) -> Result<VaultResponse>;
}

/// Lowest TLS protocol version the transport will negotiate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVersion {
    #[default]
    Tls12,
    Tls13,
}

impl std::str::FromStr for TlsVersion {
    type Err = EdvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1.2" => Ok(Self::Tls12),
            "1.3" => Ok(Self::Tls13),
            other => Err(EdvError::Config(format!(
                "unsupported TLS version '{other}' (expected 1.2 or 1.3)"
            ))),
        }
    }
}

/// TLS options for [`HttpTransport`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSettings {
    pub min_version: TlsVersion,

    /// Name to present for SNI and certificate verification instead of the
    /// host in the vault URL. The connection still goes to the URL's host.
    pub server_name: Option<String>,

    /// Extra PEM root certificate to trust.
    pub ca_file: Option<PathBuf>,

    /// Skip certificate verification. Test setups only.
    pub insecure: bool,
}

/// Blocking HTTP transport.
pub struct HttpTransport {
    client: Client,
    server_name: Option<String>,
}

impl HttpTransport {
    /// Build a transport for a vault at `base_url`.
    ///
    /// `base_url` is only inspected when a server name override is set,
    /// to pin the override to the real host's address.
    pub fn new(base_url: &str, tls: &TlsSettings, timeout: Duration) -> Result<Self> {
        let min_version = match tls.min_version {
            TlsVersion::Tls12 => reqwest::tls::Version::TLS_1_2,
            TlsVersion::Tls13 => reqwest::tls::Version::TLS_1_3,
        };

        let mut builder = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .min_tls_version(min_version)
            .danger_accept_invalid_certs(tls.insecure)
            .user_agent(format!("edvault/{}", env!("CARGO_PKG_VERSION")));

        if let Some(ref path) = tls.ca_file {
            let pem = std::fs::read(path).map_err(|e| {
                EdvError::Config(format!("cannot read CA file {}: {e}", path.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| EdvError::Config(format!("invalid CA file {}: {e}", path.display())))?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some(ref name) = tls.server_name {
            let base = Url::parse(base_url)
                .map_err(|e| EdvError::Config(format!("invalid vault URL '{base_url}': {e}")))?;
            let host = base
                .host_str()
                .ok_or_else(|| EdvError::Config(format!("vault URL '{base_url}' has no host")))?;
            let port = base.port_or_known_default().unwrap_or(443);
            let addr = (host, port)
                .to_socket_addrs()
                .map_err(|e| EdvError::Config(format!("cannot resolve vault host {host}: {e}")))?
                .next()
                .ok_or_else(|| EdvError::Config(format!("vault host {host} has no address")))?;
            builder = builder.resolve(name, addr);
        }

        let client = builder
            .build()
            .map_err(|e| EdvError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            server_name: tls.server_name.clone(),
        })
    }

    /// Point `url` at the server name override, if one is configured.
    fn target(&self, url: &str) -> std::result::Result<Url, String> {
        let mut target = Url::parse(url).map_err(|e| e.to_string())?;
        if let Some(ref name) = self.server_name {
            target
                .set_host(Some(name))
                .map_err(|e| format!("invalid server name '{name}': {e}"))?;
        }
        Ok(target)
    }
}

impl VaultTransport for HttpTransport {
    fn send(&self, request: VaultRequest) -> Result<VaultResponse> {
        let transport_err = |message: String| EdvError::Transport {
            method: request.method.as_str(),
            url: request.url.clone(),
            message,
        };

        let target = self.target(&request.url).map_err(transport_err)?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, target);
        if let Some(ref body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = builder.send().map_err(|e| transport_err(e.to_string()))?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .map_err(|e| transport_err(format!("failed to read response body: {e}")))?
            .to_vec();

        Ok(VaultResponse {
            status,
            location,
            body,
        })
    }
}
