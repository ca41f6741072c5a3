//! Failure kinds
//!
//! Retry filters compare tags instead of inspecting error types at
//! runtime. Error types opt in by implementing [`Classify`].

use std::fmt;
use std::io;

/// Category of a failure, used to decide whether it is worth another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// An operation ran past its deadline
    Timeout,
    /// A connection could not be established or was dropped
    Connection,
    /// A selector matched nothing
    ElementNotFound,
    /// A matched element could not be clicked, typed into, etc.
    ElementNotInteractable,
    /// A check on page state did not hold
    Assertion,
    /// Any other I/O failure
    Io,
    /// Caller-defined kind, compared by tag
    Custom(&'static str),
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connection => "connection",
            FailureKind::ElementNotFound => "element_not_found",
            FailureKind::ElementNotInteractable => "element_not_interactable",
            FailureKind::Assertion => "assertion",
            FailureKind::Io => "io",
            FailureKind::Custom(tag) => tag,
        }
    }

    /// Kinds that usually clear up on their own in browser tests
    pub fn transient() -> [FailureKind; 4] {
        [
            FailureKind::Timeout,
            FailureKind::Connection,
            FailureKind::ElementNotFound,
            FailureKind::ElementNotInteractable,
        ]
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an error value onto a [`FailureKind`]
pub trait Classify {
    fn kind(&self) -> FailureKind;
}

impl Classify for io::Error {
    fn kind(&self) -> FailureKind {
        match io::Error::kind(self) {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FailureKind::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe => FailureKind::Connection,
            _ => FailureKind::Io,
        }
    }
}

impl Classify for tokio::time::error::Elapsed {
    fn kind(&self) -> FailureKind {
        FailureKind::Timeout
    }
}
