//! The DHCP lease-assignment server binary.

use clap::Parser;

#[derive(Parser)]
#[clap(name = "dhcpd", about = "DHCPv4 lease-assignment server")]
struct Args {
    /// Path to the shared configuration file.
    #[clap(long, default_value = "configuration.json")]
    config: String,
    /// Path to the durable busy-address set.
    #[clap(long, default_value = "busy_ip_addresses_dhcp.json")]
    state: String,
    /// Path to the log file.
    #[clap(long, default_value = "DHCPoutput.txt")]
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

    let leased = match netd_common::BusyAddressSet::load(&args.state) {
        Ok(leased) => leased,
        Err(error) => {
            log::error!("failed to load busy-address set from {}: {}", args.state, error);
            return std::process::ExitCode::FAILURE;
        }
    };

    let socket = match dhcp_server::bind() {
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

    log::info!("dhcpd listening on 0.0.0.0:67, pool {}-{}", config.pool_start, config.pool_end);
    match dhcp_server::run(socket, config, leased, shutdown_rx).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            log::error!("server loop exited with an error: {}", error);
            std::process::ExitCode::FAILURE
        }
    }
}
