use lazy_static::lazy_static;
use prometheus::{labels, register_gauge, Gauge};

use certscan::CertificateRecord;

lazy_static! {
    static ref CERTSCAN_FETCH_FAILED: Gauge = register_gauge!(
        "certscan_fetch_failed",
        "whether the last fetch for the host failed"
    )
    .unwrap();
    static ref CERTSCAN_SAN_COUNT: Gauge = register_gauge!(
        "certscan_san_count",
        "subject alternative names presented by the host"
    )
    .unwrap();
}

/// Pushes one sample per record to a Prometheus Push Gateway.
/// # Arguments
/// * `records` - Records produced by a batch check
/// * `prometheus_address` - Push Gateway base address
pub fn prometheus_metrics(records: &[CertificateRecord], prometheus_address: &str) {
    for record in records.iter() {
        CERTSCAN_FETCH_FAILED.set(if record.is_failed() { 1.0 } else { 0.0 });
        CERTSCAN_SAN_COUNT.set(record.sans.len() as f64);

        let metric_families = prometheus::gather();
        let prometheus_client = prometheus::push_metrics(
            "certscan",
            labels! {
                "instance".to_owned() => "certscan".to_owned(),
                "job".to_owned() => "certscan".to_owned(),
                "host".to_owned() => record.domain_name.to_owned(),
                "issuer".to_owned() => record.issuer.to_owned(),
                "failed".to_owned() => record.is_failed().to_string(),
            },
            &format!("{}/metrics/job", prometheus_address),
            metric_families,
            None,
        );

        match prometheus_client {
            Ok(_) => {}
            Err(e) => eprintln!("\nFailed to push metrics to prometheus: {}", e),
        }
    }
}
