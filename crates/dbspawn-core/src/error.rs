//! Error taxonomy for the driver facade.
//!
//! Only [`DriverError::TransientConnection`] triggers the provisioning path;
//! every other driver error passes through the facade untouched. Engine
//! failures are fatal at this layer and are wrapped into
//! [`DriverError::UnableToStartDatabase`] by the provisioning code.

use thiserror::Error;

use crate::address::AddressKey;

/// Errors surfaced by drivers and by the facade itself.
#[derive(Debug, Error)]
pub enum DriverError {
    /// No process is listening at the target address. This is the sole
    /// trigger for embedded-instance provisioning; it is distinct from
    /// authentication or protocol errors, which must never be recovered.
    #[error("no listener at target address: {message}")]
    TransientConnection {
        /// Description of the refused/unreachable connection attempt
        message: String,
    },

    /// The embedded engine could not be created or started for an address.
    /// Fatal configuration state; never retried silently.
    #[error("unable to start database for {key}")]
    UnableToStartDatabase {
        /// Address the instance was being provisioned for
        key: AddressKey,
        /// Underlying engine failure
        #[source]
        source: EngineError,
    },

    /// An optional driver capability this facade deliberately does not offer.
    #[error("capability not supported: {capability}")]
    UnsupportedCapability {
        /// Name of the unoffered capability
        capability: &'static str,
    },

    /// The URL does not conform to the delegate's connection-string grammar.
    #[error("invalid connection url: {message}")]
    InvalidUrl {
        /// Parser diagnostic from the delegate
        message: String,
    },

    /// The server refused the credentials or the operation.
    #[error("access denied: {message}")]
    AccessDenied {
        /// Server diagnostic
        message: String,
    },

    /// Any other SQL-level error reported by the delegate.
    #[error("sql error{}: {message}", .state.as_deref().map(|s| format!(" [{s}]")).unwrap_or_default())]
    Sql {
        /// SQLSTATE-style code, when the delegate reports one
        state: Option<String>,
        /// Server or driver diagnostic
        message: String,
    },

    /// No registered driver accepts the URL (driver-manager lookup miss).
    #[error("no suitable driver for url: {url}")]
    NoSuitableDriver {
        /// The URL that was offered to every registered driver
        url: String,
    },
}

impl DriverError {
    /// Create a transient "nothing is listening" error
    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientConnection {
            message: message.into(),
        }
    }

    /// Wrap an engine failure for the given address
    pub fn unable_to_start(key: AddressKey, source: EngineError) -> Self {
        Self::UnableToStartDatabase { key, source }
    }

    /// Create an unsupported-capability error
    pub fn unsupported(capability: &'static str) -> Self {
        Self::UnsupportedCapability { capability }
    }

    /// Create an invalid-URL error
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Create an access-denied error
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Create a generic SQL error with an optional SQLSTATE code
    pub fn sql(state: Option<&str>, message: impl Into<String>) -> Self {
        Self::Sql {
            state: state.map(str::to_owned),
            message: message.into(),
        }
    }

    /// True only for the transient "no listener" kind
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientConnection { .. })
    }
}

/// Errors from the embedded engine lifecycle. Unretryable at this layer.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be launched
    #[error("failed to launch engine on port {port}: {message}")]
    Spawn {
        /// Port the engine was asked to bind
        port: u16,
        /// Launcher diagnostic
        message: String,
    },

    /// The requested port is already bound by another process
    #[error("port {port} is already in use")]
    PortInUse {
        /// The contested port
        port: u16,
    },

    /// The engine did not stop cleanly
    #[error("engine did not stop cleanly: {message}")]
    Stop {
        /// Shutdown diagnostic
        message: String,
    },
}
