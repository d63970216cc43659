use anyhow::Result;
use clap::Parser;
use log::error;
use std::io::{self, BufRead};
use std::process;
use std::time::Instant;

mod bruteforce;
mod cli;
mod config;
mod engine;
mod output;
mod polling;
mod probe;
mod session;
mod sources;
mod types;
mod utils;

use cli::Args;
use engine::SubScoutEngine;
use probe::PortProbe;
use types::{Config, SourceKind};

const BANNER: &str = r#"   _____       __   _____                  __
  / ___/__  __/ /_ / ___/_________  __  __/ /_
  \__ \/ / / / __ \\__ \/ ___/ __ \/ / / / __/
 ___/ / /_/ / /_/ /__/ / /__/ /_/ / /_/ / /_
/____/\__,_/_.___/____/\___/\____/\__,_/\__/

        Passive Hostname Enumeration
"#;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if !args.silent {
        println!("{}", BANNER);
        println!(
            "        v{} ({} {})\n",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_HASH"),
            env!("BUILD_TIME")
        );
    }

    if args.list_sources {
        list_sources();
        return Ok(());
    }

    let domains = gather_domains(&args);
    if domains.is_empty() {
        error!("No input provided. Use -d <domain>, -l <file>, or pipe domains to stdin");
        process::exit(1);
    }

    let engine = SubScoutEngine::new(&args)
        .map_err(|e| anyhow::anyhow!("Failed to initialize: {}", e))?;

    let start_time = Instant::now();
    let reports = engine
        .run(domains)
        .await
        .map_err(|e| anyhow::anyhow!("Enumeration failed: {}", e))?;

    if let Some(port_spec) = &args.ports {
        let ports = utils::parse_ports(port_spec);
        if ports.is_empty() {
            error!("No valid ports in: {}", port_spec);
        } else {
            let probe = PortProbe::new(ports, engine.config().probe.clone());
            for report in &reports {
                if !args.silent {
                    println!("\n[+] Probing {} hosts for {}", report.hosts.len(), report.domain);
                }
                let probe_reports = probe.scan(&report.hosts).await;
                engine.output_manager().print_probe_reports(&probe_reports);
            }
        }
    }

    if !args.silent {
        let total: usize = reports.iter().map(|r| r.stats.unique_hosts).sum();
        println!(
            "\n[+] Completed in {:.2}s: {} hostnames across {} domain(s)",
            start_time.elapsed().as_secs_f64(),
            total,
            reports.len()
        );
    }

    Ok(())
}

fn list_sources() {
    let sources = sources::get_all_sources(&Config::default());
    let mut search_engines = Vec::new();
    let mut intelligence = Vec::new();

    for source in sources {
        let info = source.info();
        match info.kind {
            SourceKind::SearchEngine => search_engines.push(info.name),
            SourceKind::Intelligence => intelligence.push(info.name),
        }
    }

    println!("Search engine sources ({}):", search_engines.len());
    for name in search_engines {
        println!("  {}", name);
    }
    println!("\nIntelligence sources ({}):", intelligence.len());
    for name in intelligence {
        println!("  {}", name);
    }
    println!("\nAliases: crt, ssl -> crtsh");
}

fn gather_domains(args: &Args) -> Vec<String> {
    let mut domains = Vec::new();

    domains.extend(args.domain.iter().map(|d| d.trim().to_string()));

    if let Some(file_path) = &args.domains_file {
        match utils::read_lines(file_path) {
            Ok(lines) => {
                domains.extend(
                    lines
                        .iter()
                        .map(|d| d.trim().to_string())
                        .filter(|d| !d.is_empty()),
                );
            }
            Err(e) => error!("Failed to read domains from {:?}: {}", file_path, e),
        }
    }

    if args.use_stdin() {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            let domain = line.trim().to_string();
            if !domain.is_empty() {
                domains.push(domain);
            }
        }
    }

    domains
}
