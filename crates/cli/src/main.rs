//! # Zone Manager
//!
//! Keeps cached copies of the configured DNS zones current and listens for
//! NOTIFY messages from the backend name servers.

mod bootstrap;
mod di;

use clap::Parser;
use tracing::{info, warn};
use zone_manager_application::ports::ConfigurationRepository;
use zone_manager_domain::CliOverrides;

use di::{Repositories, UseCases, ZoneServices};

#[derive(Parser)]
#[command(name = "zone-manager")]
#[command(version)]
#[command(about = "Manages DNS zones through zone transfers, dynamic updates and NOTIFY")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// NOTIFY listener port
    #[arg(short = 'n', long)]
    notify_port: Option<u16>,

    /// NOTIFY listener bind address
    #[arg(short = 'b', long)]
    bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let overrides = CliOverrides {
        notify_port: cli.notify_port,
        bind_address: cli.bind_address,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        notify_port = config.notify.port,
        bind = %config.notify.bind_address,
        views = config.views.len(),
        "Configuration loaded"
    );

    let repositories = Repositories::new(config);
    let services = ZoneServices::new(&repositories);
    let use_cases = UseCases::new(&repositories, &services);

    services.cache.start().await?;
    log_inventory(&repositories, &use_cases).await;

    info!("Zone manager ready, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    services.cache.stop().await;
    Ok(())
}

async fn log_inventory(repositories: &Repositories, use_cases: &UseCases) {
    match use_cases.find_resolvers.execute().await {
        Ok(resolvers) => info!(resolvers = resolvers.len(), "Resolvers configured"),
        Err(e) => warn!(error = %e, "Cannot list resolvers"),
    }
    match use_cases.find_tsig_keys.execute().await {
        Ok(keys) => info!(keys = keys.len(), "TSIG keys configured"),
        Err(e) => warn!(error = %e, "Cannot list TSIG keys"),
    }

    let views = match repositories.config.find_views().await {
        Ok(views) => views,
        Err(e) => {
            warn!(error = %e, "Cannot list views");
            return;
        }
    };

    for view in views {
        let view = match use_cases.find_view.execute(&view.name).await {
            Ok(view) => view,
            Err(e) => {
                warn!(view = %view.name, error = %e, "Cannot read view");
                continue;
            }
        };
        let names = match use_cases.find_zone_names.execute(&view.name).await {
            Ok(names) => names,
            Err(e) => {
                warn!(view = %view.name, error = %e, "Cannot list zones");
                continue;
            }
        };

        for name in names {
            match use_cases.find_zone.execute(&view.name, &name).await {
                Ok(zone) => info!(
                    view = %view.name,
                    zone = %zone.name,
                    zone_type = %zone.zone_type,
                    records = zone.records.len(),
                    "Zone cached"
                ),
                Err(e) => warn!(view = %view.name, zone = %name, error = %e, "Cannot read zone"),
            }
        }
    }
}
