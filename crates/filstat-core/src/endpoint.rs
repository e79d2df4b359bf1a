//! Metrics endpoint parsing.
//!
//! Accepted forms:
//! - multiaddr: `/ip4/<addr>/tcp/<port>`, `/ip6/<addr>/tcp/<port>`,
//!   `/dns/<host>/tcp/<port>` (also `/dns4`, `/dns6`)
//! - plain `host:port` or `[v6]:port`
//!
//! Either form must reduce to TCP dial arguments; anything else is an
//! `InvalidEndpoint` error.

use std::fmt;
use std::net::Ipv6Addr;

use multiaddr::{Multiaddr, Protocol};

use crate::error::{FilstatError, Result};

/// TCP dial arguments resolved from a configured endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` string suitable for `TcpListener::bind`; IPv6 hosts are bracketed.
    pub fn dial_addr(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dial_addr())
    }
}

/// Parse a configured endpoint into TCP dial arguments.
pub fn parse_endpoint(s: &str) -> Result<Endpoint> {
    let s = s.trim();
    if s.is_empty() {
        return Err(FilstatError::InvalidEndpoint("empty endpoint".into()));
    }
    if s.starts_with('/') {
        parse_multiaddr(s)
    } else {
        parse_host_port(s)
    }
}

fn parse_multiaddr(s: &str) -> Result<Endpoint> {
    let ma: Multiaddr = s
        .parse()
        .map_err(|e| FilstatError::InvalidEndpoint(format!("{s}: {e}")))?;
    let mut it = ma.iter();

    let host = match it.next() {
        Some(Protocol::Ip4(ip)) => ip.to_string(),
        Some(Protocol::Ip6(ip)) => ip.to_string(),
        Some(Protocol::Dns(h)) | Some(Protocol::Dns4(h)) | Some(Protocol::Dns6(h)) => h.to_string(),
        Some(other) => {
            return Err(FilstatError::InvalidEndpoint(format!(
                "{s}: unsupported network protocol {other}"
            )))
        }
        None => return Err(FilstatError::InvalidEndpoint(format!("{s}: empty multiaddr"))),
    };

    let port = match it.next() {
        Some(Protocol::Tcp(port)) => port,
        Some(other) => {
            return Err(FilstatError::InvalidEndpoint(format!(
                "{s}: unsupported transport {other}, expected /tcp"
            )))
        }
        None => return Err(FilstatError::InvalidEndpoint(format!("{s}: missing /tcp/<port>"))),
    };

    if let Some(extra) = it.next() {
        return Err(FilstatError::InvalidEndpoint(format!(
            "{s}: unexpected trailing component {extra}"
        )));
    }

    Ok(Endpoint::new(host, port))
}

fn parse_host_port(s: &str) -> Result<Endpoint> {
    let (host, port) = s
        .rsplit_once(':')
        .ok_or_else(|| FilstatError::InvalidEndpoint(format!("{s}: expected host:port")))?;

    let host = match host.strip_prefix('[') {
        Some(inner) => inner
            .strip_suffix(']')
            .ok_or_else(|| FilstatError::InvalidEndpoint(format!("{s}: unbalanced brackets")))?,
        None if host.contains(':') => {
            return Err(FilstatError::InvalidEndpoint(format!(
                "{s}: IPv6 hosts must be bracketed"
            )))
        }
        None => host,
    };
    if host.is_empty() {
        return Err(FilstatError::InvalidEndpoint(format!("{s}: missing host")));
    }

    let port: u16 = port
        .parse()
        .map_err(|e| FilstatError::InvalidEndpoint(format!("{s}: bad port: {e}")))?;

    Ok(Endpoint::new(host, port))
}
