use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hachimura_stats::config::FetchConfig;
use hachimura_stats::fetcher;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    // Credentials are checked here, before any request goes out
    let config = match FetchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid fetcher configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "Fetching {} season {} from {:?}",
        config.player_name,
        config.season,
        config.provider
    );

    match fetcher::run(&config).await {
        Ok(count) => {
            tracing::info!("Wrote {} games to {}", count, config.out_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Fetch failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
