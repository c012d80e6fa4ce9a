//! Multi-host certificate check with a bounded number of connections.
//!
//! This example demonstrates how to check multiple hosts concurrently
//! while keeping only a few connections in flight at a time.
//!
//! Run with: cargo run --example multiple_hosts

use certscan::Checker;

fn main() {
    println!("=== Multi-Host Certificate Check ===\n");

    let hosts: Vec<String> = [
        "google.com",
        "github.com",
        "rust-lang.org",
        "crates.io",
        "docs.rs",
    ]
    .iter()
    .map(|host| host.to_string())
    .collect();

    let checker = Checker::new().limit(3);
    let results = checker.check_hosts(&hosts).expect("host list is not empty");

    println!(
        "{:<20} {:<16} {:<26} {}",
        "Host", "IP", "Not After", "Issuer"
    );
    println!("{}", "=".repeat(70));

    for record in results.records() {
        if record.is_failed() {
            println!("{:<20} ERROR: {}", record.domain_name, record.error);
        } else {
            println!(
                "{:<20} {:<16} {:<26} {}",
                record.domain_name, record.ip, record.not_after, record.issuer
            );
        }
    }
}
