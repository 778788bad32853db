use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

use harvest_blame::config::Config;
use harvest_blame::helpers::email::ResendMailer;
use harvest_blame::helpers::harvest::HarvestClient;
use harvest_blame::service::BlameService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("[%Y-%m-%d %H:%M:%S]".to_string()))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&config_path)?;

    info!(
        "Starting blame run for {} user(s), {}",
        config.users.len(),
        config.range
    );

    let client = HarvestClient::new(&config)?;
    let service = BlameService::new(client, ResendMailer::default(), config);
    service.run().await?;

    Ok(())
}
