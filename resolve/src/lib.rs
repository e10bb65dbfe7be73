//! Address resolution collaborator.
//!
//! A thin interface, not part of the protocol core: given a query string
//! and an address family, resolve to a caller-owned canonical textual
//! address. Implementation is free to use the platform resolver; the
//! trait exists so a caller can substitute a fixed/mock resolver for
//! tests without touching the synchronous, blocking concurrency model
//! the rest of the protocol uses.

use std::net::{IpAddr, ToSocketAddrs};

use bcagent_error::{Error, Result};

/// The only two address families the resolver accepts. Any other family
/// is rejected with [`bcagent_error::Error::InvalidArgument`] rather than
/// attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

/// Resolves a hostname to a canonical textual address of the requested
/// family.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self, host: &str, family: AddressFamily) -> Result<String>;
}

/// The default resolver: delegates to the platform's resolver through
/// `std::net::ToSocketAddrs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl AddressResolver for SystemResolver {
    fn resolve(&self, host: &str, family: AddressFamily) -> Result<String> {
        // `ToSocketAddrs` needs a port to do the lookup; 0 is a valid
        // placeholder since we only want the address, not the socket.
        let candidates = (host, 0u16)
            .to_socket_addrs()
            .map_err(|e| Error::InetResolutionFailure(format!("{}: {}", host, e)))?;

        for addr in candidates {
            let ip = addr.ip();
            let matches = match (family, ip) {
                (AddressFamily::Ipv4, IpAddr::V4(_)) => true,
                (AddressFamily::Ipv6, IpAddr::V6(_)) => true,
                _ => false,
            };
            if matches {
                log::debug!("resolved {} to {}", host, ip);
                return Ok(ip.to_string());
            }
        }

        Err(Error::InetResolutionFailure(format!(
            "{} has no address of the requested family",
            host
        )))
    }
}
