//! The DNS forwarding server binary.

use clap::Parser;

#[derive(Parser)]
#[clap(name = "dnsd", about = "DNS zone-override forwarder")]
struct Args {
    /// Path to the shared configuration file.
    #[clap(long, default_value = "configuration.json")]
    config: String,
    /// Path to the local zone table (FQDN -> A records).
    #[clap(long, default_value = "domain_dns_name_ip.json")]
    zone: String,
    /// Path to the log file.
    #[clap(long, default_value = "DNSLog.txt")]
    log: String,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = Args::parse();

    if let Err(error) = netd_common::logging::init(&args.log, log::Level::Info) {
        eprintln!("failed to open log file {}: {}", args.log, error);
        return std::process::ExitCode::FAILURE;
    }

    let config = match netd_common::Config::load(&args.config) {
        Ok(config) => config,
        Err(error) => {
            log::error!("failed to load configuration from {}: {}", args.config, error);
            return std::process::ExitCode::FAILURE;
        }
    };

    let zone = match netd_common::store::load_zone_table(&args.zone) {
        Ok(zone) => zone,
        Err(error) => {
            log::error!("failed to load zone table from {}: {}", args.zone, error);
            return std::process::ExitCode::FAILURE;
        }
    };

    let client_socket = match dns_server::bind_client_socket().await {
        Ok(socket) => socket,
        Err(error) => {
            log::error!("{}", error);
            return std::process::ExitCode::FAILURE;
        }
    };
    let upstream_socket = match dns_server::bind_upstream_socket().await {
        Ok(socket) => socket,
        Err(error) => {
            log::error!("{}", error);
            return std::process::ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });

    log::info!("dnsd listening on 0.0.0.0:53, {} zone entries, upstream {}", zone.len(), config.upstream_dns);
    match dns_server::run(client_socket, upstream_socket, config, zone, shutdown_rx).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            log::error!("server loop exited with an error: {}", error);
            std::process::ExitCode::FAILURE
        }
    }
}
