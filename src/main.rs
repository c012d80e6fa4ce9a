use clap::Parser;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use url::Url;

use certscan::config::Config;
use certscan::{Checker, ResultSet, DEFAULT_CONCURRENCY};

mod metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
    Summary,
}

/// Retrieves and renders the TLS certificates presented by remote hosts.
#[derive(Parser)]
#[command(name = "certscan", version, about)]
struct Cli {
    /// Hosts to check, as `host` or `host:port` (port defaults to 443)
    hosts: Vec<String>,

    /// Output format: text, markdown, json or summary
    #[arg(short, long)]
    output: Option<String>,

    /// Read settings from a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip certificate chain and hostname verification
    #[arg(short = 'k', long)]
    skip_verify: bool,

    /// Maximum number of simultaneous connections
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Exit code to use when any host could not be checked
    #[arg(long, value_name = "CODE")]
    exit_code: Option<i32>,

    /// Push per-host metrics to a Prometheus Push Gateway
    #[arg(long)]
    prometheus: bool,

    /// Prometheus Push Gateway address
    #[arg(long, value_name = "URL")]
    prometheus_address: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    generate_config: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.generate_config {
        println!("{}", Config::example_toml());
        exit(0);
    }

    let mut config = Config::default();
    if let Some(path) = &cli.config {
        match Config::from_file(path) {
            Ok(file_config) => config = config.merge_with(file_config),
            Err(err) => {
                eprintln!("Failed to load {}: {}", path.display(), err);
                exit(1);
            }
        }
    }
    config = config.merge_with(Config::from_cli_args(
        (!cli.hosts.is_empty()).then(|| cli.hosts.clone()),
        cli.output.clone(),
        cli.exit_code,
        cli.skip_verify.then_some(true),
        cli.concurrency,
        cli.prometheus.then_some(true),
        cli.prometheus_address.clone(),
    ));

    let output = config.output.as_deref().unwrap_or("text");
    let format = match OutputFormat::from_str(output) {
        Ok(format) => format,
        Err(_) => {
            eprintln!("Unknown output format: {}", output);
            exit(1);
        }
    };

    let hosts: Vec<String> = config
        .hosts
        .clone()
        .unwrap_or_default()
        .iter()
        .map(|host| normalize_host(host))
        .collect();

    let checker = Checker::new()
        .limit(config.concurrency.unwrap_or(DEFAULT_CONCURRENCY))
        .skip_verify(config.skip_verify.unwrap_or(false));

    let results = match checker.check_hosts(&hosts) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    render(&results, format);

    if let Some(prom) = &config.prometheus {
        if prom.enabled.unwrap_or(false) {
            let address = prom
                .address
                .clone()
                .unwrap_or_else(|| "http://localhost:9091".to_string());
            metrics::prom::prometheus_metrics(results.records(), &address);
        }
    }

    if results.has_failures() {
        exit(config.exit_code.unwrap_or(1));
    }
    exit(0);
}

fn render(results: &ResultSet, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", results.text()),
        OutputFormat::Markdown => print!("{}", results.markdown()),
        OutputFormat::Json => println!("{}", String::from_utf8_lossy(&results.json())),
        OutputFormat::Summary => print_summary(results),
    }
}

fn print_summary(results: &ResultSet) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Domain",
            "IP",
            "Common Name",
            "Issuer",
            "Not After",
            "Error",
        ]);
    for record in results.records() {
        table.add_row(vec![
            record.domain_name.clone(),
            record.ip.clone(),
            record.common_name.clone(),
            record.issuer.clone(),
            record.not_after.clone(),
            record.error.clone(),
        ]);
    }
    println!("{table}");
}

/// Reduces URL-shaped input (`https://host:port/path`) to `host` or
/// `host:port`. Anything else passes through untouched and is validated by
/// the host parser instead.
fn normalize_host(input: &str) -> String {
    if !input.contains("://") {
        return input.to_string();
    }
    match Url::parse(input) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => input.to_string(),
        },
        Err(_) => input.to_string(),
    }
}
