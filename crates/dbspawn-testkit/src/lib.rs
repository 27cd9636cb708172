//! Test doubles for the dbspawn workspace.
//!
//! Mock implementations of the `dbspawn-core` capability traits with
//! deterministic, controllable behavior: a [`ListenerBoard`] standing in for
//! the OS socket table, a [`MockDelegate`] driver with a tiny URL grammar
//! and failure injection, and a [`MockEngine`] whose instances register
//! themselves on the board. Production crates never depend on this one.

pub mod board;
pub mod delegate;
pub mod engine;
pub mod logging;

pub use board::ListenerBoard;
pub use delegate::{MockConnection, MockDelegate};
pub use engine::MockEngine;
pub use logging::init_test_logging;
