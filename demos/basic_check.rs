//! Basic single-host certificate check.
//!
//! Run with: cargo run --example basic_check

use certscan::Checker;

fn main() {
    let checker = Checker::new();
    let record = checker.check_host("rust-lang.org");

    if record.is_failed() {
        println!("{}: {}", record.domain_name, record.error);
        return;
    }

    println!("Domain:      {}", record.domain_name);
    println!("IP:          {}", record.ip);
    println!("Common name: {}", record.common_name);
    println!("Issuer:      {}", record.issuer);
    println!("Valid from:  {}", record.not_before);
    println!("Valid to:    {}", record.not_after);
    println!("Subject Alternative Names:");
    for san in &record.sans {
        println!("\tDNS Name: {}", san);
    }
}
