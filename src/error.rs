//! Error types for certificate retrieval.
//!
//! This module defines the error type produced while parsing host inputs and
//! fetching certificates. Per-host failures are rendered through [`std::fmt::Display`]
//! and stored inside the affected record; only batch-level validation failures
//! reach the caller as a `Result::Err`.

use std::fmt;
use std::io;

/// Error type for certificate retrieval failures.
#[derive(Debug)]
pub enum CertCheckError {
    /// DNS resolution failed for the given hostname
    DnsResolution {
        /// The hostname that failed to resolve
        hostname: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TCP connection failed to the target address
    ConnectionFailed {
        /// The address (host:port) that connection failed to
        address: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TLS handshake failed
    HandshakeFailed {
        /// Details about why the handshake failed
        details: String,
    },

    /// Certificate extraction error after a successful handshake
    CertificateError {
        /// Description of what went wrong
        reason: String,
    },

    /// Network operation timeout
    Timeout {
        /// Description of which operation timed out
        operation: String,
    },

    /// The host input could not be split into host and port
    InvalidHostPort {
        /// The input as given
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// The batch was started with an empty host list
    NoHosts,

    /// OpenSSL error occurred
    OpenSSLError {
        /// The underlying OpenSSL error
        details: String,
    },

    /// Generic I/O error
    IoError {
        /// The underlying I/O error
        source: io::Error,
    },

    /// A generic error with a custom message
    Other {
        /// Error message
        message: String,
    },
}

impl fmt::Display for CertCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DnsResolution { hostname, .. } => {
                write!(f, "Failed to resolve hostname: {}", hostname)
            }
            Self::ConnectionFailed { address, source } => {
                write!(f, "Connection failed to {}: {}", address, source)
            }
            Self::HandshakeFailed { details } => {
                write!(f, "TLS handshake failed: {}", details)
            }
            Self::CertificateError { reason } => {
                write!(f, "Certificate error: {}", reason)
            }
            Self::Timeout { operation } => {
                write!(f, "Operation timed out: {}", operation)
            }
            Self::InvalidHostPort { input, reason } => {
                write!(f, "Invalid host:port '{}': {}", input, reason)
            }
            Self::NoHosts => {
                write!(f, "need at least one host to check")
            }
            Self::OpenSSLError { details } => {
                write!(f, "OpenSSL error: {}", details)
            }
            Self::IoError { source } => {
                write!(f, "I/O error: {}", source)
            }
            Self::Other { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for CertCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DnsResolution { source, .. } => Some(source),
            Self::ConnectionFailed { source, .. } => Some(source),
            Self::IoError { source } => Some(source),
            _ => None,
        }
    }
}

// Conversion implementations for compatibility

impl From<io::Error> for CertCheckError {
    fn from(e: io::Error) -> Self {
        // Socket deadlines surface as TimedOut or WouldBlock depending on
        // the platform.
        if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
            return Self::Timeout {
                operation: e.to_string(),
            };
        }

        Self::IoError { source: e }
    }
}

impl From<&str> for CertCheckError {
    fn from(s: &str) -> Self {
        Self::Other {
            message: s.to_string(),
        }
    }
}

impl From<String> for CertCheckError {
    fn from(s: String) -> Self {
        Self::Other { message: s }
    }
}

impl From<openssl::error::ErrorStack> for CertCheckError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSSLError {
            details: e.to_string(),
        }
    }
}

impl<S: fmt::Debug> From<openssl::ssl::HandshakeError<S>> for CertCheckError {
    fn from(e: openssl::ssl::HandshakeError<S>) -> Self {
        Self::HandshakeFailed {
            details: format!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CertCheckError::InvalidHostPort {
            input: "a:b:c".to_string(),
            reason: "too many colons in address".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid host:port 'a:b:c': too many colons in address"
        );
    }

    #[test]
    fn test_no_hosts_display() {
        assert_eq!(
            CertCheckError::NoHosts.to_string(),
            "need at least one host to check"
        );
    }

    #[test]
    fn test_error_from_str() {
        let err: CertCheckError = "test error".into();
        assert_eq!(err.to_string(), "test error");
    }

    #[test]
    fn test_timeout_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::TimedOut, "read timed out");
        let err: CertCheckError = io_err.into();
        assert!(matches!(err, CertCheckError::Timeout { .. }));
    }
}
