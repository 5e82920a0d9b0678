use clap::Parser;
use dnsrelay_domain::CliOverrides;
use dnsrelay_infrastructure::dns::DnsServerHandler;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "dnsrelay")]
#[command(version)]
#[command(about = "dnsrelay - caching DNS forwarder with a local host table")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Host table file (`IP DOMAIN` per line)
    #[arg(long, value_name = "FILE")]
    hosts: Option<String>,

    /// Upstream resolver, repeatable (replaces the configured list)
    #[arg(short = 'u', long = "upstream", value_name = "ADDR")]
    upstream: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind,
        hosts_file: cli.hosts,
        upstream_servers: cli.upstream,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting dnsrelay v{}", env!("CARGO_PKG_VERSION"));

    let dns_services = di::DnsServices::new(&config);
    let handler = DnsServerHandler::new(dns_services.handler_use_case.clone());

    let dns_addr = config.server.listen_address();
    let num_workers = config.dns.worker_count();

    tokio::select! {
        result = server::start_dns_server(
            dns_addr,
            handler,
            num_workers,
            config.dns.queue_capacity,
        ) => {
            if let Err(e) = result {
                error!(error = %e, "DNS server error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    let sizes = dns_services.cache.pool_sizes();
    info!(
        a = sizes.a,
        aaaa = sizes.aaaa,
        cname = sizes.cname,
        "Server shutdown complete"
    );
    Ok(())
}
