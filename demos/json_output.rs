//! Renders a batch as JSON and as a Markdown table.
//!
//! Run with: cargo run --example json_output

use certscan::Checker;

fn main() {
    let hosts = vec![
        "example.com".to_string(),
        "wrong.host.badssl.com".to_string(),
    ];
    let results = Checker::new().check_hosts(&hosts).expect("host list is not empty");

    println!("{}", String::from_utf8_lossy(&results.json()));
    println!();
    print!("{}", results.markdown());
}
