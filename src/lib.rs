//! Concurrent TLS certificate inspection.
//!
//! Retrieves the leaf certificate presented by each host in a list, caps the
//! number of simultaneous handshakes, and collects per-host results in input
//! order. Hosts that cannot be reached fail individually; their records carry
//! the error text instead of certificate fields.
//!
//! ```no_run
//! use certscan::Checker;
//!
//! let checker = Checker::new().limit(16);
//! let results = checker.check_hosts(&["example.com".to_string()])?;
//! print!("{}", results.text());
//! # Ok::<(), certscan::CertCheckError>(())
//! ```

pub mod config;
pub mod error;

pub use crate::error::CertCheckError;

use chrono::{Local, TimeZone};
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::nid::Nid;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use openssl::x509::{X509, X509NameRef};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

static TIMEOUT: u64 = 30;

/// Port assumed when a host input carries none.
pub const DEFAULT_PORT: &str = "443";

/// Default cap on simultaneously active fetches.
pub const DEFAULT_CONCURRENCY: usize = 128;

/// Certificate fields retrieved for one requested host.
///
/// Exactly one of the following holds: every descriptive field is populated
/// and `error` is empty, or `error` is non-empty and only `domain_name` is
/// set beside it. The serialized field names are `domainName`, `ip`,
/// `issuer`, `commonName`, `sans`, `notBefore`, `notAfter` and `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// The host as requested, without the port
    #[serde(rename = "domainName")]
    pub domain_name: String,
    /// Resolved peer address, empty on failure
    pub ip: String,
    /// Issuer common name
    pub issuer: String,
    /// Subject common name
    #[serde(rename = "commonName")]
    pub common_name: String,
    /// DNS subject alternative names, in certificate order
    pub sans: Vec<String>,
    /// Start of the validity window, local time
    #[serde(rename = "notBefore")]
    pub not_before: String,
    /// End of the validity window, local time
    #[serde(rename = "notAfter")]
    pub not_after: String,
    /// Why the fetch failed, empty on success
    pub error: String,
}

impl CertificateRecord {
    fn failed(domain_name: &str, err: &CertCheckError) -> Self {
        CertificateRecord {
            domain_name: domain_name.to_string(),
            error: err.to_string(),
            ..CertificateRecord::default()
        }
    }

    /// True when the fetch for this host did not produce a certificate.
    pub fn is_failed(&self) -> bool {
        !self.error.is_empty()
    }
}

/// Leaf certificate fields as returned by a [`Fetch`] implementation.
#[derive(Debug, Clone)]
pub struct PeerCertificate {
    pub ip: String,
    pub issuer: String,
    pub common_name: String,
    pub sans: Vec<String>,
    pub not_before: String,
    pub not_after: String,
}

/// Capability to retrieve the leaf certificate presented at `host:port`.
///
/// Production code uses [`OpensslFetch`]; tests substitute deterministic
/// implementations so no network access is needed.
pub trait Fetch: Send + Sync {
    fn fetch(&self, host: &str, port: &str) -> Result<PeerCertificate, CertCheckError>;
}

/// Fetches the peer certificate over a real TLS connection.
pub struct OpensslFetch {
    skip_verify: bool,
}

impl OpensslFetch {
    pub fn new(skip_verify: bool) -> Self {
        OpensslFetch { skip_verify }
    }
}

impl Fetch for OpensslFetch {
    fn fetch(&self, host: &str, port: &str) -> Result<PeerCertificate, CertCheckError> {
        let port: u16 = port.parse().map_err(|_| CertCheckError::InvalidHostPort {
            input: format!("{}:{}", host, port),
            reason: "port must be a number between 0 and 65535".to_string(),
        })?;

        let mut builder = SslConnector::builder(SslMethod::tls())?;
        if self.skip_verify {
            builder.set_verify(SslVerifyMode::NONE);
        }
        let connector = builder.build();

        let socket_addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| CertCheckError::DnsResolution {
                hostname: host.to_string(),
                source: e,
            })?
            .next()
            .ok_or_else(|| CertCheckError::DnsResolution {
                hostname: host.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no addresses returned",
                ),
            })?;

        let tcp_stream = TcpStream::connect_timeout(&socket_addr, Duration::from_secs(TIMEOUT))
            .map_err(|e| CertCheckError::ConnectionFailed {
                address: socket_addr.to_string(),
                source: e,
            })?;
        tcp_stream.set_read_timeout(Some(Duration::from_secs(TIMEOUT)))?;
        tcp_stream.set_write_timeout(Some(Duration::from_secs(TIMEOUT)))?;

        let ip = tcp_stream.peer_addr()?.ip().to_string();

        let mut ssl_config = connector.configure()?;
        if self.skip_verify {
            ssl_config.set_verify_hostname(false);
        }
        // The stream is dropped on every exit path below, so the connection
        // is released even when extraction fails after the handshake.
        let stream = ssl_config.connect(host, tcp_stream)?;

        let cert = stream
            .ssl()
            .peer_certificate()
            .ok_or_else(|| CertCheckError::CertificateError {
                reason: "peer presented no certificate".to_string(),
            })?;

        Ok(PeerCertificate {
            ip,
            issuer: name_entry(cert.issuer_name(), Nid::COMMONNAME),
            common_name: name_entry(cert.subject_name(), Nid::COMMONNAME),
            sans: dns_sans(&cert),
            not_before: local_timestamp(cert.not_before()),
            not_after: local_timestamp(cert.not_after()),
        })
    }
}

fn name_entry(name: &X509NameRef, nid: Nid) -> String {
    name.entries_by_nid(nid)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|data| data.to_string())
        .unwrap_or_default()
}

fn dns_sans(cert: &X509) -> Vec<String> {
    cert.subject_alt_names()
        .map(|names| {
            names
                .iter()
                .filter_map(|name| name.dnsname())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Renders an ASN.1 time as a local-time timestamp. Falls back to the ASN.1
/// display form when the value cannot be converted.
fn local_timestamp(time: &Asn1TimeRef) -> String {
    let epoch = match Asn1Time::from_unix(0) {
        Ok(epoch) => epoch,
        Err(_) => return time.to_string(),
    };
    let delta = match epoch.diff(time) {
        Ok(delta) => delta,
        Err(_) => return time.to_string(),
    };
    let secs = i64::from(delta.days) * 86_400 + i64::from(delta.secs);
    match Local.timestamp_opt(secs, 0).single() {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S %z").to_string(),
        None => time.to_string(),
    }
}

/// Splits a `host` or `host:port` input, defaulting the port to 443.
///
/// Parsing is positional: a bare hostname has no colon and is never mistaken
/// for an IPv6 address. IPv6 addresses must be bracketed (`[::1]` or
/// `[::1]:8443`); an unbracketed input with more than one colon is rejected.
pub fn parse_host_port(input: &str) -> Result<(String, String), CertCheckError> {
    if let Some(rest) = input.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((host, "")) => Ok((host.to_string(), DEFAULT_PORT.to_string())),
            Some((host, tail)) => match tail.strip_prefix(':') {
                Some(port) => Ok((host.to_string(), port.to_string())),
                None => Err(CertCheckError::InvalidHostPort {
                    input: input.to_string(),
                    reason: "unexpected characters after bracketed address".to_string(),
                }),
            },
            None => Err(CertCheckError::InvalidHostPort {
                input: input.to_string(),
                reason: "missing ']' in address".to_string(),
            }),
        };
    }
    match input.rfind(':') {
        None => Ok((input.to_string(), DEFAULT_PORT.to_string())),
        Some(idx) if input[..idx].contains(':') => Err(CertCheckError::InvalidHostPort {
            input: input.to_string(),
            reason: "too many colons in address".to_string(),
        }),
        Some(idx) => Ok((input[..idx].to_string(), input[idx + 1..].to_string())),
    }
}

/// Counting semaphore gating the number of in-flight fetches.
struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

struct SemaphoreGuard<'a> {
    semaphore: &'a Semaphore,
}

impl Semaphore {
    fn new(permits: usize) -> Self {
        Semaphore {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    fn acquire(&self) -> SemaphoreGuard<'_> {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.available.wait(permits).unwrap();
        }
        *permits -= 1;
        SemaphoreGuard { semaphore: self }
    }
}

impl Drop for SemaphoreGuard<'_> {
    fn drop(&mut self) {
        *self.semaphore.permits.lock().unwrap() += 1;
        self.semaphore.available.notify_one();
    }
}

fn check_with(fetcher: &dyn Fetch, hostport: &str) -> CertificateRecord {
    let (host, port) = match parse_host_port(hostport) {
        Ok(split) => split,
        Err(err) => return CertificateRecord::failed(hostport, &err),
    };
    match fetcher.fetch(&host, &port) {
        Ok(peer) => CertificateRecord {
            domain_name: host,
            ip: peer.ip,
            issuer: peer.issuer,
            common_name: peer.common_name,
            sans: peer.sans,
            not_before: peer.not_before,
            not_after: peer.not_after,
            error: String::new(),
        },
        Err(err) => CertificateRecord::failed(&host, &err),
    }
}

/// Batch certificate collector.
///
/// Each checker instance owns its own concurrency cap, so independent batches
/// can run with different limits.
pub struct Checker {
    limit: usize,
    fetcher: Arc<dyn Fetch>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    /// Creates a checker with the default limit and verification enabled.
    pub fn new() -> Self {
        Checker {
            limit: DEFAULT_CONCURRENCY,
            fetcher: Arc::new(OpensslFetch::new(false)),
        }
    }

    /// Caps the number of simultaneously active fetches.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Disables certificate chain and hostname verification during the
    /// handshake. Overwrites any fetcher set earlier.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.fetcher = Arc::new(OpensslFetch::new(skip));
        self
    }

    /// Replaces the network fetch with a custom implementation.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Retrieves the certificate for a single `host` or `host:port` input.
    ///
    /// Never fails: parse, connection and handshake problems are recorded in
    /// the returned record's `error` field.
    pub fn check_host(&self, hostport: &str) -> CertificateRecord {
        check_with(self.fetcher.as_ref(), hostport)
    }

    /// Fetches certificates for every host in `hosts` concurrently.
    ///
    /// At most `limit` fetches are in flight at once; workers past the cap
    /// wait for a slot. Results come back in input order regardless of
    /// completion order, and the call returns only once every host has a
    /// record. A host that cannot be reached fails only its own record; an
    /// empty input fails the whole call before any network activity.
    pub fn check_hosts(&self, hosts: &[String]) -> Result<ResultSet, CertCheckError> {
        if hosts.is_empty() {
            return Err(CertCheckError::NoHosts);
        }

        let semaphore = Arc::new(Semaphore::new(self.limit));
        let (sender, receiver) = mpsc::channel();
        for (index, host) in hosts.iter().enumerate() {
            let sender = sender.clone();
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let host = host.clone();
            thread::spawn(move || {
                let _slot = semaphore.acquire();
                let record = check_with(fetcher.as_ref(), &host);
                let _ = sender.send((index, record));
            });
        }
        drop(sender);

        let mut slots: Vec<Option<CertificateRecord>> = Vec::new();
        slots.resize_with(hosts.len(), || None);
        for (index, record) in receiver {
            slots[index] = Some(record);
        }
        let records = slots
            .into_iter()
            .map(|slot| slot.expect("every worker delivers exactly one record"))
            .collect();
        Ok(ResultSet { records })
    }
}

/// Ordered collection of per-host results.
///
/// Length and order match the host list the batch was started with. The
/// renderers are pure; none of them modifies the stored records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<CertificateRecord>,
}

impl From<Vec<CertificateRecord>> for ResultSet {
    fn from(records: Vec<CertificateRecord>) -> Self {
        ResultSet { records }
    }
}

impl ResultSet {
    pub fn records(&self) -> &[CertificateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when any record carries an error.
    pub fn has_failures(&self) -> bool {
        self.records.iter().any(CertificateRecord::is_failed)
    }

    /// Renders every record as a labeled block with a blank separator line.
    /// SANs appear as a single bracketed, space-separated list; nothing is
    /// escaped.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            let _ = writeln!(out, "DomainName: {}", record.domain_name);
            let _ = writeln!(out, "IP:         {}", record.ip);
            let _ = writeln!(out, "Issuer:     {}", record.issuer);
            let _ = writeln!(out, "NotBefore:  {}", record.not_before);
            let _ = writeln!(out, "NotAfter:   {}", record.not_after);
            let _ = writeln!(out, "CommonName: {}", record.common_name);
            let _ = writeln!(out, "SANs:       [{}]", record.sans.join(" "));
            let _ = writeln!(out, "Error:      {}", record.error);
            out.push('\n');
        }
        out
    }

    /// Renders a Markdown table, one row per record. Each SAN is suffixed
    /// with `<br/>`, and literal `*` is escaped so wildcard names do not
    /// toggle emphasis. The escape is applied to the output only.
    pub fn markdown(&self) -> String {
        let mut out = String::from(
            "DomainName | IP | Issuer | NotBefore | NotAfter | CN | SANs | Error\n\
             --- | --- | --- | --- | --- | --- | --- | ---\n",
        );
        for record in &self.records {
            let sans: String = record
                .sans
                .iter()
                .map(|san| format!("{}<br/>", san.replace('*', "\\*")))
                .collect();
            let _ = writeln!(
                out,
                "{} | {} | {} | {} | {} | {} | {} | {}",
                record.domain_name,
                record.ip,
                record.issuer,
                record.not_before,
                record.not_after,
                record.common_name,
                sans,
                record.error
            );
        }
        out
    }

    /// Serializes the records in input order using the documented JSON field
    /// names. Records are plain strings and lists, so serialization cannot
    /// fail on well-formed data; a failure here is a programming error.
    pub fn json(&self) -> Vec<u8> {
        serde_json::to_vec(&self.records).expect("certificate records always serialize")
    }
}
