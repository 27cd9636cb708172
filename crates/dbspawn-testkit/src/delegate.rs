//! Mock delegate driver.
//!
//! Implements the full [`DelegateDriver`] surface over a [`ListenerBoard`]
//! with a deliberately tiny URL grammar:
//!
//! ```text
//! mock://host:port[,host:port...][/database]
//! ```
//!
//! Connect succeeds iff some parsed address has a live listener on the
//! board; otherwise it reports the transient "nothing is listening" error.
//! A forced error can be injected for pass-through tests, and every connect
//! attempt is counted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use dbspawn_core::{
    AddressKey, Connection, ConnectionProps, DelegateDriver, Driver, DriverError,
    DriverPropertyInfo, DriverVersion, HostAddress,
};

use crate::board::ListenerBoard;

/// URL scheme prefix the mock delegate accepts.
const SCHEME: &str = "mock://";

/// Mock implementation of the wrapped protocol driver.
#[derive(Debug, Clone)]
pub struct MockDelegate {
    board: ListenerBoard,
    forced_error: Arc<Mutex<Option<DriverError>>>,
    connect_attempts: Arc<AtomicUsize>,
}

impl MockDelegate {
    /// Create a delegate over the given listener board
    pub fn new(board: ListenerBoard) -> Self {
        Self {
            board,
            forced_error: Arc::new(Mutex::new(None)),
            connect_attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The board this delegate consults
    pub fn board(&self) -> &ListenerBoard {
        &self.board
    }

    /// Inject an error to be returned by the next connect attempt instead
    /// of the normal listener lookup. Consumed on use.
    pub fn inject_error(&self, error: DriverError) {
        *self.forced_error.lock() = Some(error);
    }

    /// Number of connect attempts made against this delegate
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    fn parse(&self, url: &str) -> Result<Vec<HostAddress>, DriverError> {
        let rest = url
            .strip_prefix(SCHEME)
            .ok_or_else(|| DriverError::invalid_url(format!("expected {SCHEME} scheme: {url}")))?;
        let authority = rest.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            return Err(DriverError::invalid_url("missing host list"));
        }
        authority
            .split(',')
            .map(|entry| {
                let (host, port) = entry
                    .rsplit_once(':')
                    .ok_or_else(|| DriverError::invalid_url(format!("missing port in {entry:?}")))?;
                let port: u16 = port
                    .parse()
                    .map_err(|_| DriverError::invalid_url(format!("bad port in {entry:?}")))?;
                Ok(HostAddress::new(host, port))
            })
            .collect()
    }
}

impl Driver for MockDelegate {
    fn connect(
        &self,
        url: &str,
        _props: &ConnectionProps,
    ) -> Result<Box<dyn Connection>, DriverError> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.forced_error.lock().take() {
            return Err(error);
        }
        let addresses = self.parse(url)?;
        for address in &addresses {
            if self.board.is_listening(&address.key()) {
                return Ok(Box::new(MockConnection::open(address.key())));
            }
        }
        // rsplit_once above guarantees at least one address here
        let target = addresses
            .first()
            .map(ToString::to_string)
            .unwrap_or_default();
        Err(DriverError::transient(format!(
            "connection refused: {target}"
        )))
    }

    fn accepts_url(&self, url: &str) -> Result<bool, DriverError> {
        Ok(url.starts_with(SCHEME))
    }

    fn property_info(
        &self,
        _url: &str,
        props: &ConnectionProps,
    ) -> Result<Vec<DriverPropertyInfo>, DriverError> {
        Ok(vec![
            DriverPropertyInfo {
                name: "user".to_owned(),
                value: props.get("user").cloned(),
                description: Some("login user".to_owned()),
                required: false,
                choices: Vec::new(),
            },
            DriverPropertyInfo {
                name: "password".to_owned(),
                value: props.get("password").cloned(),
                description: Some("login password".to_owned()),
                required: false,
                choices: Vec::new(),
            },
        ])
    }

    fn version(&self) -> DriverVersion {
        DriverVersion { major: 1, minor: 4 }
    }

    fn compliant(&self) -> bool {
        true
    }

    fn parent_logger(&self) -> Result<String, DriverError> {
        // The real delegate offers one; the facade refuses it.
        Ok("dbspawn_testkit::delegate".to_owned())
    }
}

impl DelegateDriver for MockDelegate {
    fn parse_addresses(
        &self,
        url: &str,
        _props: &ConnectionProps,
    ) -> Result<Vec<HostAddress>, DriverError> {
        self.parse(url)
    }
}

/// Connection handed out by [`MockDelegate`].
#[derive(Debug)]
pub struct MockConnection {
    target: AddressKey,
    closed: bool,
    statements: u64,
}

impl MockConnection {
    fn open(target: AddressKey) -> Self {
        Self {
            target,
            closed: false,
            statements: 0,
        }
    }

    /// The address this connection was opened against
    pub fn target(&self) -> &AddressKey {
        &self.target
    }

    /// Number of statements executed on this connection
    pub fn statements(&self) -> u64 {
        self.statements
    }
}

impl Connection for MockConnection {
    fn execute(&mut self, _sql: &str) -> Result<u64, DriverError> {
        if self.closed {
            return Err(DriverError::sql(Some("08003"), "connection is closed"));
        }
        self.statements += 1;
        Ok(0)
    }

    fn is_valid(&mut self) -> bool {
        !self.closed
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.closed = true;
        Ok(())
    }
}
