//! Per-attempt connection request.

use crate::address::HostAddress;
use crate::driver::{ConnectionProps, DelegateDriver};
use crate::error::DriverError;

/// The resolved form of one connection attempt: the raw URL, its properties,
/// and the address list the delegate's parser yielded for them.
///
/// Transient — built when the facade enters the provisioning path, dropped
/// when the attempt completes. Never persisted.
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    /// Raw connection URL
    pub url: String,
    /// Connection properties
    pub props: ConnectionProps,
    /// Ordered target addresses; empty when the URL is not host/port-addressed
    pub addresses: Vec<HostAddress>,
}

impl ConnectionRequest {
    /// Resolve a URL + properties through the delegate's URL parser.
    pub fn resolve(
        delegate: &dyn DelegateDriver,
        url: &str,
        props: &ConnectionProps,
    ) -> Result<Self, DriverError> {
        let addresses = delegate.parse_addresses(url, props)?;
        Ok(Self {
            url: url.to_owned(),
            props: props.clone(),
            addresses,
        })
    }

    /// First address that denotes the local machine, if any.
    ///
    /// Scan order follows the delegate's parse order, matching how the
    /// delegate itself would try hosts.
    pub fn first_local(&self) -> Option<&HostAddress> {
        self.addresses.iter().find(|address| address.is_local())
    }
}
