//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server by its base address
//! - Reject malformed addresses at construction time
//! - Build health-check and forwarding URIs against the base address

use axum::http::uri::{Authority, PathAndQuery, Scheme, Uri};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Error for a backend address that cannot be used as a base URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("{address:?} is not a valid URL: {reason}")]
    Malformed { address: String, reason: String },

    #[error("{address:?} uses unsupported scheme {scheme:?} (only http is proxied)")]
    UnsupportedScheme { address: String, scheme: String },

    #[error("{address:?} has no host")]
    MissingHost { address: String },
}

/// A single backend server.
///
/// Immutable for the process lifetime; identified by the address string
/// exactly as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// The configured base address (registry key).
    address: String,
    /// Scheme and host[:port] of the backend.
    authority: Authority,
    /// Base path without trailing slash ("" when the address has none).
    base_path: String,
}

impl Backend {
    /// Parse a configured base address such as `http://10.0.0.1:3000`.
    pub fn parse(address: &str) -> Result<Self, BackendError> {
        let url = Url::parse(address).map_err(|e| BackendError::Malformed {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" {
            return Err(BackendError::UnsupportedScheme {
                address: address.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        let host = url.host_str().ok_or_else(|| BackendError::MissingHost {
            address: address.to_string(),
        })?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| BackendError::Malformed {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            address: address.to_string(),
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
        })
    }

    /// The configured address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Host and optional port, as sent in the `Host` header.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// URI of the health endpoint: base address followed by `path`.
    pub fn health_uri(&self, path: &str) -> Result<Uri, axum::http::Error> {
        self.build_uri(path, None)
    }

    /// Rewrite an inbound URI to target this backend.
    ///
    /// The inbound path is appended to the backend's base path and the query
    /// string is kept as is.
    pub fn target_uri(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        self.build_uri(inbound.path(), inbound.query())
    }

    fn build_uri(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let mut path_and_query = String::with_capacity(self.base_path.len() + path.len() + 1);
        path_and_query.push_str(&self.base_path);
        if !path.starts_with('/') {
            path_and_query.push('/');
        }
        path_and_query.push_str(path);
        if let Some(query) = query {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        let path_and_query = PathAndQuery::from_str(&path_and_query)?;
        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
